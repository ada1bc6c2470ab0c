//! Constants of the outbound client.

use std::time::Duration;

/// Per-attempt request timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Largest response payload accepted from a downstream service, in bytes.
pub const MAX_RESPONSE_BYTES: u64 = 50_000_000;

/// Idle duration after which pooled connections are dropped.
pub const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

/// Retries allowed after a connection-reset failure (attempts = retries + 1).
pub const MAX_CONNECTION_RESET_RETRIES: u8 = 2;

/// Fixed delay between retry attempts.
pub const RETRY_BACKOFF: Duration = Duration::from_millis(500);

/// Header carrying the correlation id across service boundaries.
pub const X_REQUEST_ID: &str = "x-request-id";
