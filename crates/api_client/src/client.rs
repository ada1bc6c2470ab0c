//! Pooled client construction.

use console_env::logger;
use error_stack::ResultExt;
use reqwest::header;

use crate::{
    consts,
    errors::{CustomResult, HttpClientError},
};

fn default_headers() -> header::HeaderMap {
    let mut headers = header::HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("application/json"),
    );
    headers.insert(
        header::ACCEPT,
        header::HeaderValue::from_static("application/json"),
    );
    headers
}

/// Build the connection-pooled client shared by all calls of one
/// [`crate::ServiceClient`].
///
/// Certificate validation is enabled in production-like environments and
/// disabled otherwise, so local and test downstream stubs can serve
/// self-signed certificates.
pub(crate) fn create_client(
    env: console_env::Env,
) -> CustomResult<reqwest::Client, HttpClientError> {
    let mut client_builder = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .pool_idle_timeout(consts::POOL_IDLE_TIMEOUT)
        .timeout(consts::REQUEST_TIMEOUT)
        .default_headers(default_headers())
        .use_rustls_tls();

    if !env.is_production_like() {
        logger::debug!(%env, "disabling TLS certificate validation for downstream stubs");
        client_builder = client_builder.danger_accept_invalid_certs(true);
    }

    client_builder
        .build()
        .change_context(HttpClientError::ClientConstructionFailed)
        .attach_printable("Failed to construct pooled client")
}
