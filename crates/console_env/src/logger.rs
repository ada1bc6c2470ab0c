//!
//! Logger of the console.
//!

pub mod setup;
pub mod types;

pub use setup::{setup, LogGuard};
pub use tracing::{debug, error, info, trace, warn};
pub use types::*;
