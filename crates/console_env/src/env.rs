//!
//! Current environment related stuff.
//!

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Env variable that sets Development/Sandbox/Production env
pub const RUN_ENV: &str = "RUN_ENV";

///
/// Current environment.
///
#[derive(Debug, Default, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum Env {
    /// Development environment.
    #[default]
    Development,
    /// Sandbox environment.
    Sandbox,
    /// Production environment.
    Production,
}

impl Env {
    /// Whether this environment talks to real downstream services.
    ///
    /// Gates TLS certificate validation on outbound calls: Sandbox and
    /// Production validate certificates, Development accepts the self-signed
    /// certificates used by local downstream stubs.
    pub fn is_production_like(self) -> bool {
        matches!(self, Self::Sandbox | Self::Production)
    }
}

/// Name of current environment. Either "Development", "Sandbox" or "Production".
pub fn which() -> Env {
    #[cfg(debug_assertions)]
    let default_env = Env::Development;
    #[cfg(not(debug_assertions))]
    let default_env = Env::Production;

    std::env::var(RUN_ENV).map_or_else(|_| default_env, |v| v.parse().unwrap_or(default_env))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_environment_names() {
        assert_eq!("Production".parse::<Env>().ok(), Some(Env::Production));
        assert_eq!("Sandbox".parse::<Env>().ok(), Some(Env::Sandbox));
        assert!("Staging".parse::<Env>().is_err());
    }

    #[test]
    fn development_is_not_production_like() {
        assert!(!Env::Development.is_production_like());
        assert!(Env::Sandbox.is_production_like());
        assert!(Env::Production.is_production_like());
    }
}
