//! Errors of the outbound client.
//!
//! Internally the transport distinguishes failure kinds with
//! [`HttpClientError`]; everything leaving the crate is folded into the one
//! [`GatewayError`] shape callers program against.

/// A custom datatype that wraps the error variant `<E>` into a report,
/// allowing `error_stack::Report<E>` specific extendability.
pub type CustomResult<T, E> = error_stack::Result<T, E>;

/// Transport-level failures, classified before normalization. The variant
/// drives retry eligibility: only [`Self::ConnectionClosedIncompleteMessage`]
/// is ever retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HttpClientError {
    /// Failed to construct the pooled client.
    #[error("Error while constructing http client")]
    ClientConstructionFailed,
    /// The verb method was called before `configure`.
    #[error("Client used before being configured")]
    ClientNotConfigured,
    /// `configure` was called a second time.
    #[error("Client was already configured")]
    ClientAlreadyConfigured,
    /// The base URL and path did not combine into a valid URL.
    #[error("Error while parsing the request URL")]
    UrlParsingFailed,
    /// A contributed header name or value was not a valid header.
    #[error("Error while constructing the request headers")]
    HeaderMapConstructionFailed,
    /// The request body could not be serialized to JSON.
    #[error("Error while serializing the request body")]
    BodySerializationFailed,
    /// The attempt exceeded the per-attempt timeout.
    #[error("Request timed out before a response was received")]
    RequestTimeoutReceived,
    /// The connection was closed before the response message completed.
    #[error("Connection closed before message could complete")]
    ConnectionClosedIncompleteMessage,
    /// The downstream declared a response body larger than the accepted
    /// maximum.
    #[error("Response payload exceeded the {limit} byte limit")]
    ResponseTooLarge {
        /// The configured payload limit in bytes.
        limit: u64,
    },
    /// Any other failure to obtain a response (DNS, refused connection, TLS).
    #[error("Unable to send request: {0}")]
    RequestNotSent(String),
}

/// Discriminant of a [`GatewayError`]: the HTTP status when a response was
/// received, or the transport failure class when none was.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCode {
    /// The downstream responded with this non-2xx status.
    Status(u16),
    /// The connection was closed before a complete response arrived.
    ConnectionReset,
    /// The attempt timed out.
    Timeout,
    /// Any other transport failure.
    Transport,
}

impl std::fmt::Display for FailureCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Status(status) => write!(f, "{status}"),
            Self::ConnectionReset => f.write_str("connection-reset"),
            Self::Timeout => f.write_str("timeout"),
            Self::Transport => f.write_str("transport-error"),
        }
    }
}

/// The single error shape raised for any failed call.
///
/// Callers discriminate failure kinds only by inspecting [`Self::code`] (and
/// the structured `error_identifier`/`reason` fields), never by message text
/// or by catching different error types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("call to {service} failed with {code}: {message}")]
pub struct GatewayError {
    /// Identity of the downstream service the call was made to.
    pub service: String,
    /// Human-readable description of the failure.
    pub message: String,
    /// HTTP status or transport failure class.
    pub code: FailureCode,
    /// Machine-readable identifier from the downstream error body.
    pub error_identifier: Option<String>,
    /// Free-form reason from the downstream error body.
    pub reason: Option<String>,
}

const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error";

impl GatewayError {
    /// Normalize a non-2xx downstream response.
    ///
    /// Message precedence: the body's `message` field, then its `errors`
    /// field (arrays joined with `", "`), then the raw body, then a generic
    /// fallback.
    pub fn from_error_response(service: impl Into<String>, status: u16, body: &[u8]) -> Self {
        let parsed: Option<serde_json::Value> = serde_json::from_slice(body).ok();

        let message = parsed
            .as_ref()
            .and_then(|body| message_from_error_body(body))
            .or_else(|| {
                let raw = String::from_utf8_lossy(body);
                let raw = raw.trim();
                (!raw.is_empty()).then(|| raw.to_string())
            })
            .unwrap_or_else(|| UNKNOWN_ERROR_MESSAGE.to_string());

        Self {
            service: service.into(),
            message,
            code: FailureCode::Status(status),
            error_identifier: string_field(parsed.as_ref(), "error_identifier"),
            reason: string_field(parsed.as_ref(), "reason"),
        }
    }

    /// Normalize a failure for which no HTTP response exists.
    pub fn from_transport_error(service: impl Into<String>, error: &HttpClientError) -> Self {
        let code = match error {
            HttpClientError::ConnectionClosedIncompleteMessage => FailureCode::ConnectionReset,
            HttpClientError::RequestTimeoutReceived => FailureCode::Timeout,
            _ => FailureCode::Transport,
        };
        Self {
            service: service.into(),
            message: error.to_string(),
            code,
            error_identifier: None,
            reason: None,
        }
    }
}

fn message_from_error_body(body: &serde_json::Value) -> Option<String> {
    if let Some(message) = body.get("message").and_then(serde_json::Value::as_str) {
        return Some(message.to_string());
    }
    match body.get("errors")? {
        serde_json::Value::Array(entries) => {
            let joined = entries
                .iter()
                .map(|entry| match entry {
                    serde_json::Value::String(entry) => entry.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(", ");
            (!joined.is_empty()).then_some(joined)
        }
        serde_json::Value::String(errors) => Some(errors.clone()),
        _ => None,
    }
}

fn string_field(body: Option<&serde_json::Value>, field: &str) -> Option<String> {
    body?
        .get(field)
        .and_then(serde_json::Value::as_str)
        .map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_the_message_field() {
        let body = br#"{"message": "a-message", "errors": ["ignored"]}"#;
        let error = GatewayError::from_error_response("connector", 400, body);
        assert_eq!(error.message, "a-message");
        assert_eq!(error.code, FailureCode::Status(400));
    }

    #[test]
    fn joins_error_arrays() {
        let body = br#"{"errors": ["first problem", "second problem"]}"#;
        let error = GatewayError::from_error_response("connector", 422, body);
        assert_eq!(error.message, "first problem, second problem");
    }

    #[test]
    fn accepts_a_plain_errors_string() {
        let body = br#"{"errors": "just one problem"}"#;
        let error = GatewayError::from_error_response("products", 400, body);
        assert_eq!(error.message, "just one problem");
    }

    #[test]
    fn falls_back_to_the_raw_body() {
        let error = GatewayError::from_error_response("adminusers", 502, b"Bad Gateway");
        assert_eq!(error.message, "Bad Gateway");
    }

    #[test]
    fn falls_back_to_a_generic_message_for_empty_bodies() {
        let error = GatewayError::from_error_response("adminusers", 500, b"");
        assert_eq!(error.message, "Unknown error");
        assert_eq!(error.error_identifier, None);
        assert_eq!(error.reason, None);
    }

    #[test]
    fn carries_identifier_and_reason() {
        let body =
            br#"{"message": "a-message", "error_identifier": "AN-ERROR", "reason": "something"}"#;
        let error = GatewayError::from_error_response("connector", 400, body);
        assert_eq!(error.error_identifier.as_deref(), Some("AN-ERROR"));
        assert_eq!(error.reason.as_deref(), Some("something"));
    }

    #[test]
    fn maps_transport_failure_classes() {
        let reset = GatewayError::from_transport_error(
            "connector",
            &HttpClientError::ConnectionClosedIncompleteMessage,
        );
        assert_eq!(reset.code, FailureCode::ConnectionReset);

        let timeout =
            GatewayError::from_transport_error("connector", &HttpClientError::RequestTimeoutReceived);
        assert_eq!(timeout.code, FailureCode::Timeout);

        let other = GatewayError::from_transport_error(
            "connector",
            &HttpClientError::RequestNotSent("dns failure".to_string()),
        );
        assert_eq!(other.code, FailureCode::Transport);
        assert!(other.message.contains("dns failure"));
    }
}
