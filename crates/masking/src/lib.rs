#![forbid(unsafe_code)]
#![warn(missing_docs)]

//!
//! Secret-keeping wrapper types and traits which help ensure sensitive values
//! (PSP credentials, API tokens, correlation headers carrying auth material)
//! aren't accidentally logged or otherwise exposed.
//!

mod abs;
mod maskable;
mod secret;

pub use abs::{ExposeInterface, ExposeOptionInterface, PeekInterface};
pub use maskable::{Mask, Maskable};
pub use secret::Secret;
pub use zeroize::{self, Zeroize as ZeroizableSecret};

/// This module should be included with asterisk.
///
/// `use masking::prelude::*;`
pub mod prelude {
    pub use super::{ExposeInterface, ExposeOptionInterface, PeekInterface};
}
