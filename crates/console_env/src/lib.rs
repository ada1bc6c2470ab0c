#![forbid(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

//!
//! Environment of the payment admin console: logger, basic config, its
//! environment awareness, and request-id propagation.
//!

pub mod env;
pub mod logger;
pub mod metrics;
pub mod request_id;

#[doc(inline)]
pub use logger::*;
pub use once_cell;
pub use opentelemetry;
pub use tracing;
pub use tracing::instrument;

#[doc(inline)]
pub use self::env::*;
pub use self::request_id::{current_request_id, with_request_id, RequestId};
