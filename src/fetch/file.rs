// src/fetch/file.rs
// =============================================================================
// Per-file mode: download each target one by one.
//
// For every target, in list order:
// 1. Skip it if the destination already exists (existing files are never
//    overwritten unless skipping is turned off)
// 2. Wait the fixed delay if a request was already sent earlier in the run
// 3. GET the file, backing off on 429 (see retry.rs)
// 4. Reject bodies that are really "not found" pages
// 5. Write the body to disk, byte for byte
//
// The delay sits *between* requests: nothing is slept after the last request,
// and skipped targets (which send no request) cost no time at all.
//
// A failure is counted and logged, then the loop moves on. Nothing here
// aborts the run.
// =============================================================================

use std::path::Path;
use std::time::Duration;

use reqwest::Client;
use tracing::{debug, info, warn};

use super::retry::{get_with_retry, RetryPolicy};
use crate::catalog::FetchTarget;
use crate::console::Console;
use crate::error::FetchError;
use crate::report::RunResult;

// Decides whether a successful response body is actually an error page
pub type NotFoundDetector = fn(&str) -> bool;

// Default detector
//
// Some static hosts answer 200 with a short HTML page saying "404" instead of
// a real 404 status. Real component sources are longer than that, so a short
// body mentioning 404 is treated as missing.
pub fn looks_like_not_found(body: &str) -> bool {
    body.contains("404") && body.chars().count() < 1000
}

// Knobs for a per-file run (built from the command line in cli.rs)
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub retry: RetryPolicy,
    /// Pause between consecutive requests
    pub delay: Duration,
    pub skip_existing: bool,
    /// None disables body inspection
    pub not_found: Option<NotFoundDetector>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            delay: Duration::from_millis(1000),
            skip_existing: true,
            not_found: Some(looks_like_not_found),
        }
    }
}

// Downloads one target and writes it to its destination
//
// Parameters:
//   client: reqwest HTTP client
//   target: where to read from and write to
//   options: retry policy and not-found detector
//   console: progress output (retry notices)
//
// Returns: () once the file is on disk
//   Error: the FetchError that stopped it; the destination is left as it was
//
// The body is kept as raw bytes. Decoding it to a String first would strip a
// UTF-8 BOM and re-encode other charsets, so the file on disk would no longer
// match what the server sent.
pub async fn fetch_one(
    client: &Client,
    target: &FetchTarget,
    options: &FetchOptions,
    console: &mut Console,
) -> Result<(), FetchError> {
    let response = get_with_retry(client, &target.source_url, &options.retry, console).await?;
    let body = response.bytes().await?;

    if let Some(detect) = options.not_found {
        if detect(&String::from_utf8_lossy(&body)) {
            return Err(FetchError::NotFound);
        }
    }

    write_atomically(&target.destination_path, &body).await?;
    debug!(file = %target.relative_path, bytes = body.len(), "saved");
    Ok(())
}

// Fetches every target in order and counts the outcomes
//
// Parameters:
//   client: reqwest HTTP client (one for the whole run)
//   targets: files to fetch, in the order they should be requested
//   options: skip policy, delay, retry policy
//   console: progress output
//
// Returns: RunResult with succeeded / failed / skipped counts
pub async fn fetch_all(
    client: &Client,
    targets: &[FetchTarget],
    options: &FetchOptions,
    console: &mut Console,
) -> RunResult {
    let mut result = RunResult::default();
    let mut requested_before = false;

    for target in targets {
        if options.skip_existing && target.destination_path.exists() {
            console.progress(format_args!(
                "⏭️  Skipped (already exists): {}",
                target.destination_path.display()
            ));
            info!(path = %target.destination_path.display(), "destination exists, skipping");
            result.skipped += 1;
            result.succeeded += 1;
            continue;
        }

        // Client-side throttle to stay under the server's rate limit
        if requested_before && !options.delay.is_zero() {
            tokio::time::sleep(options.delay).await;
        }
        requested_before = true;

        match fetch_one(client, target, options, console).await {
            Ok(()) => {
                console.progress(format_args!("✅ Saved: {}", target.destination_path.display()));
                result.succeeded += 1;
            }
            Err(e) => {
                console.progress(format_args!("❌ Failed to download from {}", target.source_url));
                console.progress(format_args!("   Error: {}", e));
                warn!(url = %target.source_url, error = %e, "download failed");
                result.failed += 1;
            }
        }
    }

    result
}

// Writes the contents next to the destination first (`<name>.part`), then
// renames it into place, so a failed write never leaves a truncated file.
async fn write_atomically(path: &Path, contents: &[u8]) -> Result<(), FetchError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| FetchError::io(parent, e))?;
    }

    let mut partial = path.as_os_str().to_owned();
    partial.push(".part");

    tokio::fs::write(&partial, contents)
        .await
        .map_err(|e| FetchError::io(path, e))?;

    if let Err(e) = tokio::fs::rename(&partial, path).await {
        let _ = tokio::fs::remove_file(&partial).await;
        return Err(FetchError::io(path, e));
    }

    Ok(())
}
