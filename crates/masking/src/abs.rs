//!
//! Abstract data types.
//!

use crate::Secret;

/// Interface to expose a reference to an inner secret.
pub trait PeekInterface<S> {
    /// Only method providing borrowed access to the secret value.
    fn peek(&self) -> &S;
}

/// Interface that consumes a secret and returns the inner value.
pub trait ExposeInterface<S> {
    /// Consume the secret and return the inner value.
    fn expose(self) -> S;
}

/// Interface to expose the inner value of an optional secret.
pub trait ExposeOptionInterface<S> {
    /// Consume the optional secret and return the inner value, defaulted when
    /// absent.
    fn expose_option(self) -> S;
}

impl<S> ExposeInterface<S> for Secret<S> {
    fn expose(self) -> S {
        self.inner_secret
    }
}

impl<S: Default> ExposeOptionInterface<S> for Option<Secret<S>> {
    fn expose_option(self) -> S {
        self.map(ExposeInterface::expose).unwrap_or_default()
    }
}
