//! Request ID propagation.
//!
//! Every inbound request to the console is associated with an opaque
//! identifier, either taken from the caller's `x-request-id` header or
//! generated as a time-ordered UUID v7. The identifier is installed for the
//! lifetime of the request's task via [`with_request_id`]; code anywhere
//! below that scope (notably the outbound client's correlation-id hook) can
//! read it back with [`current_request_id`] without threading it through
//! every call signature.
//!
//! The ambient mechanism is a `tokio::task_local!` scope rather than a true
//! global: concurrent requests each see their own identifier, and code
//! running outside any request scope simply sees `None`.

use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
    sync::Arc,
};

use uuid::Uuid;

/// Errors that can occur when working with request IDs.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RequestIdError {
    /// An empty or otherwise unusable value was supplied.
    #[error("Invalid request ID value: {value:?}")]
    InvalidValue {
        /// The offending value.
        value: String,
    },
}

/// Request ID value associated with one logical inbound request.
#[derive(Clone, PartialEq, Eq, Debug, Hash)]
pub struct RequestId(Arc<str>);

impl RequestId {
    /// Generate a fresh time-ordered request ID.
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string().into())
    }

    /// Get a string representation of this request ID.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for RequestId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestId {
    type Err = RequestIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            Err(RequestIdError::InvalidValue {
                value: s.to_string(),
            })
        } else {
            Ok(Self(s.into()))
        }
    }
}

impl From<String> for RequestId {
    fn from(s: String) -> Self {
        Self(s.into())
    }
}

impl From<&str> for RequestId {
    fn from(s: &str) -> Self {
        Self(s.into())
    }
}

tokio::task_local! {
    static CURRENT_REQUEST_ID: RequestId;
}

/// Run `future` with `request_id` installed as the ambient request ID.
///
/// Nested scopes shadow outer ones for their duration.
pub async fn with_request_id<F>(request_id: RequestId, future: F) -> F::Output
where
    F: std::future::Future,
{
    CURRENT_REQUEST_ID.scope(request_id, future).await
}

/// The ambient request ID of the current task, if one is in scope.
pub fn current_request_id() -> Option<RequestId> {
    CURRENT_REQUEST_ID.try_with(Clone::clone).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_values() {
        assert!(RequestId::from_str("").is_err());
        assert!(RequestId::from_str("abc123").is_ok());
    }

    #[test]
    fn generated_ids_are_distinct() {
        assert_ne!(RequestId::generate(), RequestId::generate());
    }

    #[tokio::test]
    async fn ambient_id_is_scoped_to_the_task() {
        assert_eq!(current_request_id(), None);

        let seen = with_request_id("abc123".into(), async { current_request_id() }).await;
        assert_eq!(seen, Some(RequestId::from("abc123")));

        assert_eq!(current_request_id(), None);
    }

    #[tokio::test]
    async fn nested_scopes_shadow_outer_ones() {
        let (outer, inner) = with_request_id("outer".into(), async {
            let inner = with_request_id("inner".into(), async { current_request_id() }).await;
            (current_request_id(), inner)
        })
        .await;

        assert_eq!(outer, Some(RequestId::from("outer")));
        assert_eq!(inner, Some(RequestId::from("inner")));
    }
}
