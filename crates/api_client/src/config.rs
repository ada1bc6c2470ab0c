//! Client configuration.
//!
//! Wires correlation-id propagation and structured call logging onto a
//! [`ServiceClient`] at startup, without the transport knowing about either.
//! The two concerns are composed as independent hooks; neither depends on the
//! other.

use console_env::{current_request_id, logger, Tag};
use url::Url;

use crate::{
    consts,
    errors::{CustomResult, GatewayError},
    hooks::{CallContext, Hooks},
    request::Headers,
    ServiceClient,
};

/// Configure `client` with the console's standard cross-cutting hooks.
///
/// Calling this twice simply re-runs [`ServiceClient::configure`], which
/// rejects the second call; callers wire each client exactly once at
/// startup.
pub fn configure_client(client: &ServiceClient, base_url: Url) -> CustomResult<(), GatewayError> {
    client.configure(base_url, default_hooks())
}

/// The console's standard hooks: correlation-id header injection plus a
/// pre-dispatch log line for every outbound call.
pub fn default_hooks() -> Hooks {
    Hooks::new()
        .with_request_headers(correlation_headers)
        .with_request_start(log_request_start)
}

// If no correlation id is in scope the call proceeds unheadered; it never
// fails for lack of one.
fn correlation_headers() -> Headers {
    match current_request_id() {
        Some(request_id) => vec![(consts::X_REQUEST_ID.to_string(), request_id.as_str().into())],
        None => Headers::new(),
    }
}

// Logged before dispatch so in-flight calls are observable even if the
// process dies before a response arrives.
fn log_request_start(context: &CallContext) {
    logger::info!(
        tag = ?Tag::ApiOutgoingRequest,
        service = %context.service,
        method = %context.method,
        path = %context.path,
        description = %context.description,
        retry_count = context.retry_count,
        additional_fields = ?context.additional_fields,
        "Calling {} to {}",
        context.service,
        context.description,
    );
}

#[cfg(test)]
mod tests {
    use console_env::with_request_id;

    use super::*;

    #[tokio::test]
    async fn correlation_header_follows_the_ambient_request_id() {
        assert!(correlation_headers().is_empty());

        let headers = with_request_id("abc123".into(), async { correlation_headers() }).await;
        assert_eq!(headers.len(), 1);
        let (name, value) = headers.first().unwrap();
        assert_eq!(name, consts::X_REQUEST_ID);
        assert_eq!(value.peek_inner(), "abc123");
    }
}
