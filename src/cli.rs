// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Examples:
//   component-fetch                  -> theme module, file by file
//   component-fetch forms --file form.tsx --file input.tsx
//   component-fetch forms --archive  -> zips/forms.zip, extracted
//
// Everything that tunes the fetcher (retries, delays, skip policy) is turned
// into FetchOptions / ArchiveOptions here so the fetch module never sees clap
// arguments directly.
// =============================================================================

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use url::Url;

use crate::catalog::DEFAULT_MODULE;
use crate::fetch::{looks_like_not_found, ArchiveOptions, BackoffPolicy, FetchOptions, RetryPolicy};

pub const DEFAULT_BASE_URL: &str =
    "https://raw.githubusercontent.com/AltruisticCraftLab/starter-snippets/main";

#[derive(Parser, Debug)]
#[command(
    name = "component-fetch",
    version,
    about = "Copy UI component sources from a GitHub repository into your project",
    long_about = "component-fetch downloads the source files of a component module into \
                  src/components/<module>/. It backs off when the server rate limits it \
                  and never overwrites files you already have."
)]
pub struct Cli {
    /// Component module to fetch (defaults to "theme"; required with --archive)
    pub module: Option<String>,

    /// Download <base-url>/zips/<module>.zip and extract it instead of fetching
    /// files one by one
    #[arg(long)]
    pub archive: bool,

    /// Base URL the module directories (and zips/) are served from
    #[arg(long, env = "COMPONENT_FETCH_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: Url,

    /// Project root; files land in <project-dir>/src/components/<module>/
    #[arg(long, default_value = ".")]
    pub project_dir: PathBuf,

    /// File to fetch, relative to the module directory (repeatable).
    /// Overrides the module's built-in file list.
    #[arg(long = "file", value_name = "NAME")]
    pub files: Vec<String>,

    /// Total HTTP attempts per file when rate limited (429)
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_retries: u32,

    /// Backoff unit in milliseconds
    #[arg(long, default_value_t = 2000)]
    pub backoff_ms: u64,

    /// How the backoff grows between attempts
    #[arg(long, value_enum, default_value_t = BackoffPolicy::Linear)]
    pub backoff: BackoffPolicy,

    /// Pause between consecutive requests, in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub delay_ms: u64,

    /// Re-download files that already exist locally
    #[arg(long)]
    pub overwrite: bool,

    /// Accept short responses that mention "404" as real files
    #[arg(long = "no-404-check")]
    pub no_404_check: bool,

    /// Directory to create the temporary archive download in (archive mode)
    #[arg(long, value_name = "DIR")]
    pub temp_dir: Option<PathBuf>,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    // The module to work on, falling back to the default module
    //
    // Returns: --module if given, otherwise "theme"
    pub fn module_name(&self) -> &str {
        self.module.as_deref().unwrap_or(DEFAULT_MODULE)
    }

    // Retry policy shared by per-file and archive mode
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_retries,
            unit: Duration::from_millis(self.backoff_ms),
            backoff: self.backoff,
        }
    }

    // Per-file mode knobs
    //
    // The 404-body check is on unless --no-404-check was given; existing files
    // are skipped unless --overwrite was given.
    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            retry: self.retry_policy(),
            delay: Duration::from_millis(self.delay_ms),
            skip_existing: !self.overwrite,
            not_found: if self.no_404_check {
                None
            } else {
                Some(looks_like_not_found)
            },
        }
    }

    // Archive mode knobs
    pub fn archive_options(&self) -> ArchiveOptions {
        ArchiveOptions {
            retry: self.retry_policy(),
            temp_root: self.temp_dir.clone(),
        }
    }
}
