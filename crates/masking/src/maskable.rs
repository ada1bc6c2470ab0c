use crate::{ExposeInterface, PeekInterface, Secret};

/// A value which may or may not require masking when displayed.
///
/// Header collections are built from these so that credential-bearing values
/// travel alongside plain ones without losing the masking information.
#[derive(Clone, PartialEq, Eq)]
pub enum Maskable<T: Eq + Clone> {
    /// Variant which masks the data by wrapping it in a [`Secret`].
    Masked(Secret<T>),
    /// Variant which doesn't mask the data.
    Normal(T),
}

impl<T: std::fmt::Debug + Eq + Clone> std::fmt::Debug for Maskable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Masked(secret_value) => std::fmt::Debug::fmt(secret_value, f),
            Self::Normal(value) => std::fmt::Debug::fmt(value, f),
        }
    }
}

impl<T: Eq + Clone + std::hash::Hash> std::hash::Hash for Maskable<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        match self {
            Self::Masked(value) => value.peek().hash(state),
            Self::Normal(value) => value.hash(state),
        }
    }
}

impl<T: Eq + Clone> Maskable<T> {
    /// Get the inner data while consuming self.
    pub fn into_inner(self) -> T {
        match self {
            Self::Masked(inner_secret) => inner_secret.expose(),
            Self::Normal(inner) => inner,
        }
    }

    /// Whether the value is masked.
    pub fn is_masked(&self) -> bool {
        matches!(self, Self::Masked(_))
    }

    /// Borrow the inner data regardless of masking.
    pub fn peek_inner(&self) -> &T {
        match self {
            Self::Masked(inner_secret) => inner_secret.peek(),
            Self::Normal(inner) => inner,
        }
    }
}

/// Trait for wrapping a value into the masked variant of [`Maskable`].
pub trait Mask {
    /// The unmasked type held by the resulting [`Maskable`].
    type Output: Eq + Clone;

    /// Wrap self as masked data.
    fn into_masked(self) -> Maskable<Self::Output>;
}

impl Mask for String {
    type Output = Self;

    fn into_masked(self) -> Maskable<Self::Output> {
        Maskable::Masked(self.into())
    }
}

impl Mask for &str {
    type Output = String;

    fn into_masked(self) -> Maskable<Self::Output> {
        Maskable::Masked(self.to_string().into())
    }
}

impl Mask for Secret<String> {
    type Output = String;

    fn into_masked(self) -> Maskable<Self::Output> {
        Maskable::Masked(self)
    }
}

impl<T: Eq + Clone> From<T> for Maskable<T> {
    fn from(value: T) -> Self {
        Self::Normal(value)
    }
}

impl From<&str> for Maskable<String> {
    fn from(value: &str) -> Self {
        Self::Normal(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masked_debug_output_hides_the_value() {
        let header: Maskable<String> = "sk_live_abc".into_masked();
        assert!(!format!("{header:?}").contains("sk_live_abc"));
    }

    #[test]
    fn normal_debug_output_shows_the_value() {
        let header: Maskable<String> = "application/json".into();
        assert!(format!("{header:?}").contains("application/json"));
    }

    #[test]
    fn into_inner_returns_the_value_for_both_variants() {
        let masked: Maskable<String> = "a".into_masked();
        let normal: Maskable<String> = "b".into();
        assert_eq!(masked.into_inner(), "a");
        assert_eq!(normal.into_inner(), "b");
    }
}
