// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Set up diagnostic logging (RUST_LOG, printed to stderr)
// 2. Parse command-line arguments using clap
// 3. Run per-file mode or archive mode
// 4. Print the summary
// 5. Exit with proper code (0 = all files in place, 1 = failure or usage
//    error, 2 = unexpected error)
// =============================================================================

mod catalog;
mod cli;
mod console;
mod error;
mod fetch;
mod report;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use cli::Cli;
use console::Console;
use error::UsageError;
use tracing_subscriber::EnvFilter;

// The #[tokio::main] attribute transforms our async main into a real main function
#[tokio::main]
async fn main() {
    init_logging();

    let cli = Cli::parse();
    let mut console = Console::new(cli.json);

    // Run our application logic and capture the exit code
    let exit_code = match run(&cli, &mut console).await {
        Ok(code) => code,
        Err(e) => {
            // Something we did not plan for (e.g. the HTTP client could not be built)
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Diagnostics (tracing) always go to stderr, filtered by RUST_LOG
// (default: warn). Progress lines follow Console's rules, so with --json the
// only thing on stdout is the JSON summary.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// This is the main application logic
//
// Returns:
//   Ok(0) = every file is in place
//   Ok(1) = a file failed, the archive failed, or the command line was incomplete
//   Err = unexpected error
async fn run(cli: &Cli, console: &mut Console) -> Result<i32> {
    let outcome = if cli.archive {
        run_archive(cli, console).await
    } else {
        run_files(cli, console).await
    };

    match outcome {
        Err(e) if e.is::<UsageError>() => {
            eprintln!("Error: {}", e);
            eprintln!("{}", Cli::command().render_usage());
            Ok(1)
        }
        other => other,
    }
}

// Handles per-file mode
//
// Downloads the module's files one by one into
// <project-dir>/src/components/<module>/
async fn run_files(cli: &Cli, console: &mut Console) -> Result<i32> {
    let module = cli.module_name();
    let files = resolve_files(cli)?;

    let target_dir = catalog::target_dir(&cli.project_dir, module);
    if let Err(e) = tokio::fs::create_dir_all(&target_dir).await {
        let message = format!("Failed to create {}: {}", target_dir.display(), e);
        return report::report_failure(console, &message, cli.json);
    }

    let targets = catalog::build_targets(&cli.base_url, module, &files, &target_dir);
    let client = fetch::build_client().context("Failed to create HTTP client")?;

    let options = cli.fetch_options();
    tracing::debug!(
        retry = ?options.retry,
        worst_case_backoff_ms = options.retry.total_backoff().as_millis() as u64,
        "fetching module {}",
        module
    );

    console.progress(format_args!(
        "⬇️ Downloading {} {} component(s)...",
        targets.len(),
        module
    ));
    let result = fetch::fetch_all(&client, &targets, &options, console).await;

    report::report(console, &result, cli.json)
}

// Handles archive mode
//
// A failed download or extraction ends the run with exit code 1; there is
// nothing else to process.
async fn run_archive(cli: &Cli, console: &mut Console) -> Result<i32> {
    let module = cli
        .module
        .as_deref()
        .ok_or_else(|| UsageError("archive mode needs a module name".to_string()))?;

    let url = catalog::archive_url(&cli.base_url, module);
    let target_dir = catalog::target_dir(&cli.project_dir, module);
    let client = fetch::build_client().context("Failed to create HTTP client")?;

    let outcome = fetch::fetch_archive(
        &client,
        &url,
        module,
        &target_dir,
        &cli.archive_options(),
        console,
    )
    .await;

    match outcome {
        Ok(result) => report::report(console, &result, cli.json),
        Err(e) => report::report_failure(console, &e.to_string(), cli.json),
    }
}

// Picks the list of files to fetch
//
// --file arguments win over the built-in list for the module.
// Returns: UsageError if neither is available
fn resolve_files(cli: &Cli) -> Result<Vec<String>, UsageError> {
    if !cli.files.is_empty() {
        return Ok(cli.files.clone());
    }

    let module = cli.module_name();
    match catalog::module_files(module) {
        Some(files) => Ok(files.iter().map(|f| f.to_string()).collect()),
        None => Err(UsageError(format!(
            "no built-in file list for module '{}' (known: {}); pass --file or use --archive",
            module,
            catalog::known_modules().join(", ")
        ))),
    }
}
