// src/fetch/retry.rs
// =============================================================================
// Retry with backoff for rate-limited requests.
//
// Only HTTP 429 is retried. Every other non-success status, and every
// transport error, fails on the first attempt.
//
// The delay before retry number N is computed by a BackoffPolicy, a pure
// function of (unit, attempt). Linear is the default:
//   attempt 1 fails -> wait 1 * unit
//   attempt 2 fails -> wait 2 * unit
//   ...
//   attempt max_attempts fails -> give up, no wait
// =============================================================================

use std::time::Duration;

use clap::ValueEnum;
use reqwest::{Client, Response, StatusCode};
use tracing::{debug, warn};

use crate::console::Console;
use crate::error::FetchError;

// How the wait grows between attempts
//
// Parsed straight from --backoff (linear | exponential)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum BackoffPolicy {
    /// unit * attempt
    #[default]
    Linear,
    /// unit * 2^(attempt - 1)
    Exponential,
}

impl BackoffPolicy {
    // Delay to wait after `attempt` (1-based) failed
    //
    // Pure: the same (unit, attempt) always gives the same delay, so tests
    // can compute expected waits without sleeping.
    pub fn delay(self, unit: Duration, attempt: u32) -> Duration {
        match self {
            BackoffPolicy::Linear => unit.saturating_mul(attempt),
            BackoffPolicy::Exponential => {
                let factor = 1u32.checked_shl(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
                unit.saturating_mul(factor)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of HTTP attempts, including the first one
    pub max_attempts: u32,
    pub unit: Duration,
    pub backoff: BackoffPolicy,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            unit: Duration::from_millis(2000),
            backoff: BackoffPolicy::Linear,
        }
    }
}

impl RetryPolicy {
    // Sum of all backoff sleeps taken before giving up on a URL that always
    // answers 429 (max_attempts requests, max_attempts - 1 sleeps)
    pub fn total_backoff(&self) -> Duration {
        (1..self.max_attempts)
            .map(|attempt| self.backoff.delay(self.unit, attempt))
            .fold(Duration::ZERO, Duration::saturating_add)
    }
}

// GETs a URL, retrying on 429 according to the policy
//
// Parameters:
//   client: reqwest HTTP client (shared by the whole run)
//   url: the URL to fetch
//   policy: attempt ceiling and backoff
//   console: where the "retrying in ..." lines go
//
// Returns: the first successful response, body still unread
//   Error: RateLimitExceeded, Http (no retry), or Request (no retry)
pub async fn get_with_retry(
    client: &Client,
    url: &str,
    policy: &RetryPolicy,
    console: &mut Console,
) -> Result<Response, FetchError> {
    // A zero ceiling would never send a request at all
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        debug!(url, attempt, "GET");
        let response = client.get(url).send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        if status != StatusCode::TOO_MANY_REQUESTS {
            return Err(FetchError::http(status));
        }

        if attempt >= max_attempts {
            return Err(FetchError::RateLimitExceeded { attempts: attempt });
        }

        let delay = policy.backoff.delay(policy.unit, attempt);
        warn!(url, attempt, delay_ms = delay.as_millis() as u64, "rate limited, backing off");
        console.progress(format_args!("   ⏳ Rate limited, retrying in {}ms...", delay.as_millis()));
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why `loop` instead of `for attempt in 1..=max_attempts`?
//    - Every branch of the body either returns or sleeps and continues
//    - With `loop`, the compiler knows the function always returns from inside
//      it, so there is no "fell off the end" case to invent a value for
//
// 2. What does `?` do on `client.get(url).send().await?`?
//    - send() returns Result<Response, reqwest::Error>
//    - FetchError has `#[from] reqwest::Error`, so `?` converts the error into
//      FetchError::Request and returns early
//
// 3. Why is BackoffPolicy `Copy`?
//    - It is a plain enum with no data, so copying it is as cheap as passing a
//      reference, and `self` methods read more naturally
// -----------------------------------------------------------------------------
