//! Lifecycle hooks and per-call context.
//!
//! The three hooks are the entire observability surface of the client:
//! metrics, logging and anything else plug in here, never by inspecting the
//! transport internals. Hooks are passed at configuration time so one
//! client's behaviour is fully determined by its own configuration.

use std::{panic, sync::Arc};

use console_env::logger;
use serde_json::{Map, Value};

use crate::{
    errors::FailureCode,
    request::{Headers, Method},
};

/// Side-effecting callback receiving the per-attempt [`CallContext`].
pub type HookFn = Arc<dyn Fn(&CallContext) + Send + Sync>;

/// Provider of extra outbound headers, read once per attempt.
pub type HeaderProviderFn = Arc<dyn Fn() -> Headers + Send + Sync>;

/// Per-call configuration accepted by the verb methods.
///
/// `additional_logging_fields` is the one recognized extension point; being
/// a typed structure, unrecognized fields cannot be smuggled through.
#[derive(Clone, Debug, Default)]
pub struct CallConfig {
    /// Structured fields merged verbatim into every hook invocation for this
    /// call.
    pub additional_logging_fields: Map<String, Value>,
}

/// Ephemeral per-attempt metadata passed to hooks.
#[derive(Clone, Debug)]
pub struct CallContext {
    /// Identity of the downstream service.
    pub service: String,
    /// HTTP verb of the call.
    pub method: Method,
    /// URL path relative to the configured base URL.
    pub path: String,
    /// Human-readable description of the call, for observability only.
    pub description: String,
    /// Number of retries already performed; 0 on the first attempt.
    pub retry_count: u8,
    /// Caller-provided structured logging fields.
    pub additional_fields: Map<String, Value>,
    /// HTTP status, present once a response was received.
    pub status: Option<u16>,
    /// Attempt latency in milliseconds, present on completion.
    pub response_time_ms: Option<u128>,
    /// Failure class, present on failed attempts.
    pub code: Option<FailureCode>,
    /// Whether this failed attempt will be retried.
    pub retry: bool,
}

impl CallContext {
    pub(crate) fn new(
        service: &str,
        method: Method,
        path: &str,
        description: &str,
        retry_count: u8,
        additional_fields: Map<String, Value>,
    ) -> Self {
        Self {
            service: service.to_string(),
            method,
            path: path.to_string(),
            description: description.to_string(),
            retry_count,
            additional_fields,
            status: None,
            response_time_ms: None,
            code: None,
            retry: false,
        }
    }

    pub(crate) fn with_success(&self, status: u16, response_time_ms: u128) -> Self {
        let mut context = self.clone();
        context.status = Some(status);
        context.response_time_ms = Some(response_time_ms);
        context
    }

    pub(crate) fn with_failure(
        &self,
        code: FailureCode,
        response_time_ms: Option<u128>,
        retry: bool,
    ) -> Self {
        let mut context = self.clone();
        if let FailureCode::Status(status) = code {
            context.status = Some(status);
        }
        context.code = Some(code);
        context.response_time_ms = response_time_ms;
        context.retry = retry;
        context
    }
}

/// The lifecycle hooks attached to a client at configuration time.
#[derive(Clone, Default)]
pub struct Hooks {
    pub(crate) on_request_start: Option<HookFn>,
    pub(crate) on_success_response: Option<HookFn>,
    pub(crate) on_failure_response: Option<HookFn>,
    pub(crate) request_headers: Option<HeaderProviderFn>,
}

impl std::fmt::Debug for Hooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let set = |hook: bool| if hook { "set" } else { "unset" };
        f.debug_struct("Hooks")
            .field("on_request_start", &set(self.on_request_start.is_some()))
            .field(
                "on_success_response",
                &set(self.on_success_response.is_some()),
            )
            .field(
                "on_failure_response",
                &set(self.on_failure_response.is_some()),
            )
            .field("request_headers", &set(self.request_headers.is_some()))
            .finish()
    }
}

impl Hooks {
    /// Hooks with no callbacks attached.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a callback invoked before each attempt is dispatched.
    pub fn with_request_start(mut self, hook: impl Fn(&CallContext) + Send + Sync + 'static) -> Self {
        self.on_request_start = Some(Arc::new(hook));
        self
    }

    /// Attach a callback invoked after each successful (2xx) response.
    pub fn with_success_response(
        mut self,
        hook: impl Fn(&CallContext) + Send + Sync + 'static,
    ) -> Self {
        self.on_success_response = Some(Arc::new(hook));
        self
    }

    /// Attach a callback invoked after each failed attempt.
    pub fn with_failure_response(
        mut self,
        hook: impl Fn(&CallContext) + Send + Sync + 'static,
    ) -> Self {
        self.on_failure_response = Some(Arc::new(hook));
        self
    }

    /// Attach a provider of extra headers, read once per attempt.
    ///
    /// This is the seam the configuration layer uses to inject the
    /// correlation id.
    pub fn with_request_headers(mut self, provider: impl Fn() -> Headers + Send + Sync + 'static) -> Self {
        self.request_headers = Some(Arc::new(provider));
        self
    }

    pub(crate) fn notify_request_start(&self, context: &CallContext) {
        Self::invoke(self.on_request_start.as_ref(), context);
    }

    pub(crate) fn notify_success(&self, context: &CallContext) {
        Self::invoke(self.on_success_response.as_ref(), context);
    }

    pub(crate) fn notify_failure(&self, context: &CallContext) {
        Self::invoke(self.on_failure_response.as_ref(), context);
    }

    pub(crate) fn contributed_headers(&self) -> Headers {
        let Some(provider) = self.request_headers.as_ref() else {
            return Headers::new();
        };
        panic::catch_unwind(panic::AssertUnwindSafe(|| provider())).unwrap_or_else(|_| {
            logger::warn!("header provider panicked; proceeding without contributed headers");
            Headers::new()
        })
    }

    // A panicking hook must neither fail the call nor corrupt the retry
    // state, so panics are contained here.
    fn invoke(hook: Option<&HookFn>, context: &CallContext) {
        if let Some(hook) = hook {
            if panic::catch_unwind(panic::AssertUnwindSafe(|| hook(context))).is_err() {
                logger::warn!(
                    service = %context.service,
                    path = %context.path,
                    "lifecycle hook panicked; ignoring"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn panicking_hooks_are_contained() {
        let hooks = Hooks::new().with_request_start(|_| panic!("boom"));
        let context = CallContext::new(
            "connector",
            Method::Get,
            "/v1/accounts",
            "fetching account",
            0,
            Map::new(),
        );
        hooks.notify_request_start(&context);
    }

    #[test]
    fn panicking_header_provider_contributes_nothing() {
        let hooks = Hooks::new().with_request_headers(|| panic!("boom"));
        assert!(hooks.contributed_headers().is_empty());
    }

    #[test]
    fn hooks_receive_the_context() {
        static CALLS: AtomicUsize = AtomicUsize::new(0);
        let hooks = Hooks::new().with_success_response(|context| {
            assert_eq!(context.status, Some(200));
            CALLS.fetch_add(1, Ordering::SeqCst);
        });
        let context = CallContext::new(
            "connector",
            Method::Get,
            "/v1/accounts",
            "fetching account",
            0,
            Map::new(),
        );
        hooks.notify_success(&context.with_success(200, 12));
        assert_eq!(CALLS.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failure_context_carries_status_for_http_failures() {
        let context = CallContext::new(
            "connector",
            Method::Post,
            "/v1/accounts",
            "creating account",
            0,
            Map::new(),
        );
        let failure = context.with_failure(FailureCode::Status(409), Some(3), false);
        assert_eq!(failure.status, Some(409));
        assert!(!failure.retry);
    }
}
