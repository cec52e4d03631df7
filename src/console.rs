// src/console.rs
// =============================================================================
// Where user-facing output goes.
//
// Two streams:
// - progress: one line per file ("✅ Saved: ...", "❌ Failed ...")
// - summary:  the final report, always stdout
//
// In --json mode progress moves to stderr, so stdout carries nothing but the
// JSON summary and can be piped straight into `jq`.
//
// Rust concepts:
// - Trait objects: Box<dyn Write> lets stdout, stderr and in-memory buffers
//   (in tests) sit behind the same field
// =============================================================================

use std::fmt::Display;
use std::io::{self, Write};

pub struct Console {
    progress: Box<dyn Write + Send>,
    summary: Box<dyn Write + Send>,
}

impl Console {
    // Console for a real run
    //
    // Parameters:
    //   json: whether the summary is printed as JSON
    pub fn new(json: bool) -> Self {
        let progress: Box<dyn Write + Send> = if json {
            Box::new(io::stderr())
        } else {
            Box::new(io::stdout())
        };

        Console {
            progress,
            summary: Box::new(io::stdout()),
        }
    }

    // Prints one progress line
    //
    // A closed pipe is not worth failing the download over, so write errors
    // are dropped here.
    pub fn progress(&mut self, line: impl Display) {
        let _ = writeln!(self.progress, "{}", line);
    }

    // Prints (part of) the final summary
    pub fn summary(&mut self, text: impl Display) -> io::Result<()> {
        writeln!(self.summary, "{}", text)?;
        self.summary.flush()
    }
}
