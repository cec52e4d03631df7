// src/error.rs
// =============================================================================
// Error types for fetching components.
//
// Per-file errors (FetchError) are caught by the fetch loop and turned into a
// failure count. Archive errors (ArchiveError) end the run, because the
// archive is the whole unit of work.
// =============================================================================

use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

// Why a single file could not be fetched
//
// The fetch loop turns each of these into a failure count and moves on.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The server kept answering 429 until we ran out of attempts
    #[error("rate limit exceeded after {attempts} attempt(s)")]
    RateLimitExceeded { attempts: u32 },

    /// Any non-success status other than 429
    #[error("HTTP {}: {status_text}", status.as_u16())]
    Http {
        status: StatusCode,
        status_text: String,
    },

    /// A 200 response whose body is really a "not found" page
    #[error("file not found (404)")]
    NotFound,

    /// The request never produced a response (connect error, timeout, ...)
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("could not write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FetchError {
    // Builds an Http error from a status, using the canonical reason phrase
    // (e.g. "Too Many Requests") as status text
    pub fn http(status: StatusCode) -> Self {
        FetchError::Http {
            status,
            status_text: status.canonical_reason().unwrap_or("").to_string(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FetchError::Io {
            path: path.into(),
            source,
        }
    }
}

// Fatal errors in archive mode
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("failed to download archive {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: FetchError,
    },

    #[error("failed to read archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("archive I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ArchiveError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ArchiveError::Io {
            path: path.into(),
            source,
        }
    }
}

// The command line is missing something this mode needs
//
// main.rs prints the message plus usage and exits with code 1.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct UsageError(pub String);
