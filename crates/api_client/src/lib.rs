#![warn(missing_docs, missing_debug_implementations)]

//!
//! Outbound REST client core of the admin console.
//!
//! Every network call the console makes to a downstream service (connector,
//! adminusers, products, Stripe) goes through a [`ServiceClient`]: one
//! instance per downstream service, owning a pooled transport, per-call
//! instrumentation hooks, bounded retry on connection-reset failures, and a
//! normalized error shape ([`errors::GatewayError`]) that is the sole error
//! contract the rest of the application programs against.
//!

use std::time::Instant;

use console_env::{instrument, logger, metrics::record_operation_time, Tag};
use error_stack::{report, Report, ResultExt};
use once_cell::sync::OnceCell;
use url::Url;

/// client module
pub mod client;
/// configuration module
pub mod config;
/// constants module
pub mod consts;
/// errors module
pub mod errors;
/// hooks module
pub mod hooks;
/// metrics module
pub mod metrics;
/// request module
pub mod request;

pub use config::configure_client;
pub use errors::{CustomResult, FailureCode, GatewayError};
pub use hooks::{CallConfig, CallContext, Hooks};
pub use request::{Headers, Method};

use crate::errors::HttpClientError;

/// Client for one downstream service.
///
/// Constructed with the service's identity (used only for logging and error
/// attribution), then configured exactly once with
/// [`ServiceClient::configure`] before any verb method is called. The
/// instance is held for the process lifetime and supports concurrent
/// in-flight calls without external locking.
#[derive(Debug)]
pub struct ServiceClient {
    service: String,
    state: OnceCell<ClientState>,
}

#[derive(Debug)]
struct ClientState {
    base_url: Url,
    http_client: reqwest::Client,
    hooks: Hooks,
}

impl ServiceClient {
    /// A client for the named downstream service, not yet configured.
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            state: OnceCell::new(),
        }
    }

    /// The configured service identity.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Establish the base URL, pooled transport and lifecycle hooks.
    ///
    /// Must be called exactly once; a second call fails and leaves the first
    /// configuration in place.
    pub fn configure(&self, base_url: Url, hooks: Hooks) -> CustomResult<(), GatewayError> {
        let http_client = client::create_client(console_env::which())
            .map_err(|error| self.normalize_report(error))?;
        self.state
            .set(ClientState {
                base_url,
                http_client,
                hooks,
            })
            .map_err(|_| self.normalize_report(report!(HttpClientError::ClientAlreadyConfigured)))
    }

    /// Issue a GET request.
    #[instrument(skip_all, fields(service = %self.service, path = %path))]
    pub async fn get(
        &self,
        path: &str,
        description: &str,
        call_config: Option<&CallConfig>,
    ) -> CustomResult<reqwest::Response, GatewayError> {
        self.send(Method::Get, path, None, description, call_config)
            .await
    }

    /// Issue a DELETE request.
    #[instrument(skip_all, fields(service = %self.service, path = %path))]
    pub async fn delete(
        &self,
        path: &str,
        description: &str,
        call_config: Option<&CallConfig>,
    ) -> CustomResult<reqwest::Response, GatewayError> {
        self.send(Method::Delete, path, None, description, call_config)
            .await
    }

    /// Issue a POST request with a JSON body.
    #[instrument(skip_all, fields(service = %self.service, path = %path))]
    pub async fn post<T: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
        description: &str,
        call_config: Option<&CallConfig>,
    ) -> CustomResult<reqwest::Response, GatewayError> {
        let body = self.serialize_body(body)?;
        self.send(Method::Post, path, Some(body), description, call_config)
            .await
    }

    /// Issue a PUT request with a JSON body.
    #[instrument(skip_all, fields(service = %self.service, path = %path))]
    pub async fn put<T: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
        description: &str,
        call_config: Option<&CallConfig>,
    ) -> CustomResult<reqwest::Response, GatewayError> {
        let body = self.serialize_body(body)?;
        self.send(Method::Put, path, Some(body), description, call_config)
            .await
    }

    /// Issue a PATCH request with a JSON body.
    #[instrument(skip_all, fields(service = %self.service, path = %path))]
    pub async fn patch<T: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
        description: &str,
        call_config: Option<&CallConfig>,
    ) -> CustomResult<reqwest::Response, GatewayError> {
        let body = self.serialize_body(body)?;
        self.send(Method::Patch, path, Some(body), description, call_config)
            .await
    }

    fn serialize_body<T: serde::Serialize + ?Sized>(
        &self,
        body: &T,
    ) -> CustomResult<serde_json::Value, GatewayError> {
        serde_json::to_value(body)
            .change_context(HttpClientError::BodySerializationFailed)
            .map_err(|error| self.normalize_report(error))
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
        description: &str,
        call_config: Option<&CallConfig>,
    ) -> CustomResult<reqwest::Response, GatewayError> {
        let state = self
            .state
            .get()
            .ok_or_else(|| self.normalize_report(report!(HttpClientError::ClientNotConfigured)))?;
        let url = join_url(&state.base_url, path).map_err(|error| self.normalize_report(error))?;
        let additional_fields = call_config
            .map(|config| config.additional_logging_fields.clone())
            .unwrap_or_default();
        let attributes = console_env::metric_attributes!(("service", self.service.clone()));

        let mut retry_count = 0u8;
        loop {
            let context = CallContext::new(
                &self.service,
                method,
                path,
                description,
                retry_count,
                additional_fields.clone(),
            );
            state.hooks.notify_request_start(&context);

            let request = self
                .build_request(state, method, url.clone(), body.as_ref())
                .map_err(|error| self.normalize_report(error))?;
            let start = Instant::now();
            let result = record_operation_time(
                dispatch(request),
                &metrics::EXTERNAL_REQUEST_TIME,
                attributes,
            )
            .await;
            let elapsed_ms = start.elapsed().as_millis();

            match result {
                Ok(response) => {
                    // Checked before the status branch so an over-limit
                    // declaration is never buffered, success or not.
                    if let Some(length) = response.content_length() {
                        if length > consts::MAX_RESPONSE_BYTES {
                            let error = HttpClientError::ResponseTooLarge {
                                limit: consts::MAX_RESPONSE_BYTES,
                            };
                            state.hooks.notify_failure(&context.with_failure(
                                FailureCode::Transport,
                                Some(elapsed_ms),
                                false,
                            ));
                            metrics::REQUEST_FAILURE.add(1, attributes);
                            return Err(self
                                .normalize_report(report!(error))
                                .attach_printable(format!("while {description}")));
                        }
                    }
                    if response.status().is_success() {
                        state.hooks.notify_success(
                            &context.with_success(response.status().as_u16(), elapsed_ms),
                        );
                        return Ok(response);
                    }
                    // HTTP-level rejection or failure: never retried,
                    // regardless of status code.
                    let status = response.status().as_u16();
                    let body_bytes = response.bytes().await.unwrap_or_default();
                    state.hooks.notify_failure(&context.with_failure(
                        FailureCode::Status(status),
                        Some(elapsed_ms),
                        false,
                    ));
                    metrics::REQUEST_FAILURE.add(1, attributes);
                    let normalized =
                        GatewayError::from_error_response(&self.service, status, &body_bytes);
                    return Err(Report::new(normalized).attach_printable(format!(
                        "{} responded with {status} while {description}",
                        self.service
                    )));
                }
                Err(error) => {
                    let will_retry = method == Method::Get
                        && error.current_context()
                            == &HttpClientError::ConnectionClosedIncompleteMessage
                        && retry_count < consts::MAX_CONNECTION_RESET_RETRIES;
                    let code = match error.current_context() {
                        HttpClientError::ConnectionClosedIncompleteMessage => {
                            FailureCode::ConnectionReset
                        }
                        HttpClientError::RequestTimeoutReceived => FailureCode::Timeout,
                        _ => FailureCode::Transport,
                    };
                    state.hooks.notify_failure(&context.with_failure(
                        code,
                        Some(elapsed_ms),
                        will_retry,
                    ));

                    if will_retry {
                        logger::info!(
                            tag = ?Tag::ApiOutgoingRetry,
                            service = %self.service,
                            retry_count,
                            "Retrying request due to connection closed before message could complete"
                        );
                        metrics::AUTO_RETRY_CONNECTION_CLOSED.add(1, attributes);
                        retry_count += 1;
                        tokio::time::sleep(consts::RETRY_BACKOFF).await;
                        continue;
                    }

                    metrics::REQUEST_FAILURE.add(1, attributes);
                    return Err(self
                        .normalize_report(error)
                        .attach_printable(format!("while {description}")));
                }
            }
        }
    }

    fn build_request(
        &self,
        state: &ClientState,
        method: Method,
        url: Url,
        body: Option<&serde_json::Value>,
    ) -> CustomResult<reqwest::RequestBuilder, HttpClientError> {
        let mut request = state.http_client.request(method.into(), url);
        let contributed = state.hooks.contributed_headers();
        if !contributed.is_empty() {
            request = request.headers(request::construct_header_map(&contributed)?);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        Ok(request)
    }

    fn normalize_report(&self, error: Report<HttpClientError>) -> Report<GatewayError> {
        let normalized = GatewayError::from_transport_error(&self.service, error.current_context());
        error.change_context(normalized)
    }
}

#[instrument(skip_all)]
async fn dispatch(
    request: reqwest::RequestBuilder,
) -> CustomResult<reqwest::Response, HttpClientError> {
    request
        .send()
        .await
        .map_err(|error| match error {
            error if error.is_timeout() => report!(HttpClientError::RequestTimeoutReceived),
            error if is_connection_closed_before_message_could_complete(&error) => {
                report!(HttpClientError::ConnectionClosedIncompleteMessage)
            }
            error => report!(HttpClientError::RequestNotSent(error.to_string())),
        })
        .attach_printable("Unable to send request to downstream service")
}

// hyper surfaces a connection picked from the idle pool and torn down by the
// server mid-write as an "incomplete message". That racy reuse is the one
// transient failure worth retrying; refused connections, DNS failures and
// timeouts are not treated as resets.
fn is_connection_closed_before_message_could_complete(error: &reqwest::Error) -> bool {
    let mut source = std::error::Error::source(error);
    while let Some(inner) = source {
        if let Some(hyper_error) = inner.downcast_ref::<hyper::Error>() {
            if hyper_error.is_incomplete_message() {
                return true;
            }
        }
        source = inner.source();
    }
    false
}

fn join_url(base_url: &Url, path: &str) -> CustomResult<Url, HttpClientError> {
    let joined = format!(
        "{}/{}",
        base_url.as_str().trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    Url::parse(&joined).change_context(HttpClientError::UrlParsingFailed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_url_normalizes_slashes() {
        let base = Url::parse("http://connector.internal/api/").unwrap();
        assert_eq!(
            join_url(&base, "/v1/accounts/1").unwrap().as_str(),
            "http://connector.internal/api/v1/accounts/1"
        );
        assert_eq!(
            join_url(&base, "v1/accounts/1").unwrap().as_str(),
            "http://connector.internal/api/v1/accounts/1"
        );
    }

    #[test]
    fn configure_is_rejected_the_second_time() {
        let client = ServiceClient::new("connector");
        let base = Url::parse("http://localhost:9100").unwrap();
        client.configure(base.clone(), Hooks::new()).unwrap();

        let error = client.configure(base, Hooks::new()).unwrap_err();
        assert_eq!(error.current_context().service, "connector");
        assert_eq!(error.current_context().code, FailureCode::Transport);
    }

    #[tokio::test]
    async fn verbs_fail_before_configuration() {
        let client = ServiceClient::new("adminusers");
        let error = client
            .get("/v1/users", "fetching user", None)
            .await
            .unwrap_err();
        assert_eq!(error.current_context().code, FailureCode::Transport);
        assert!(error.current_context().message.contains("configured"));
    }
}
