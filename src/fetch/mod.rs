// src/fetch/mod.rs
// =============================================================================
// This module contains all download logic.
//
// Submodules:
// - retry: GET with backoff on HTTP 429
// - file: per-file mode (skip, fetch, validate, write, delay)
// - archive: archive mode (download one zip and extract it)
//
// Requests are strictly sequential; one client is shared by the whole run.
// =============================================================================

mod archive;
mod file;
mod retry;

use std::time::Duration;

use reqwest::Client;

pub use archive::{fetch_archive, ArchiveOptions};
pub use file::{fetch_all, looks_like_not_found, FetchOptions};
pub use retry::{BackoffPolicy, RetryPolicy};

// Per-request timeout; there is no timeout on the run as a whole
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// Builds the HTTP client used for every request of a run
//
// Returns: reqwest Client with timeout and user agent set
//   Error: if the TLS backend cannot be initialised
pub fn build_client() -> reqwest::Result<Client> {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
}

// Client for tests that run on a paused tokio clock: with connection pooling
// off, reqwest keeps no idle-connection timers that the clock could skip to.
#[cfg(test)]
pub(crate) fn test_client() -> Client {
    Client::builder()
        .pool_max_idle_per_host(0)
        .pool_idle_timeout(None)
        .build()
        .unwrap()
}
