//!
//! Structure describing secret.
//!

use std::fmt;

use crate::PeekInterface;

/// Wrapper for a secret value.
///
/// Debug output is replaced by the name of the inner type, so a `Secret` can
/// be embedded in logged structures without leaking its content. Access to
/// the value goes through [`PeekInterface::peek`] (borrow) or
/// [`crate::ExposeInterface::expose`] (consume).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Secret<S> {
    pub(crate) inner_secret: S,
}

impl<S> Secret<S> {
    /// Take ownership of a secret value.
    pub fn new(secret: S) -> Self {
        Self {
            inner_secret: secret,
        }
    }

    /// Transform the inner secret without exposing it.
    pub fn map<T>(self, f: impl FnOnce(S) -> T) -> Secret<T> {
        Secret::new(f(self.inner_secret))
    }
}

impl<S> PeekInterface<S> for Secret<S> {
    fn peek(&self) -> &S {
        &self.inner_secret
    }
}

impl<S> From<S> for Secret<S> {
    fn from(secret: S) -> Self {
        Self::new(secret)
    }
}

impl<S> fmt::Debug for Secret<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "*** {} ***", std::any::type_name::<S>())
    }
}

impl<S: Default> Default for Secret<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

impl<'de, S: serde::Deserialize<'de>> serde::Deserialize<'de> for Secret<S> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        S::deserialize(deserializer).map(Self::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_is_masked() {
        let secret: Secret<String> = Secret::new("hunter2".to_string());
        let printed = format!("{secret:?}");
        assert!(!printed.contains("hunter2"));
        assert!(printed.contains("String"));
    }

    #[test]
    fn peek_borrows_the_inner_value() {
        let secret: Secret<String> = "hunter2".to_string().into();
        assert_eq!(secret.peek(), "hunter2");
    }
}
