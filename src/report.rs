// src/report.rs
// =============================================================================
// Run counters and the final summary.
//
// Exit code convention:
//   0 = every target succeeded (skipped files count as success)
//   1 = at least one target failed, or the run could not start
//
// The summary is either a human-readable block or a single JSON object; in
// JSON mode a failed run still prints JSON, with an "error" field.
// =============================================================================

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::console::Console;

// Counters accumulated by the fetch loop
//
// A skipped file is counted in both `skipped` and `succeeded`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResult {
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl RunResult {
    pub fn exit_code(&self) -> i32 {
        if self.failed > 0 {
            1
        } else {
            0
        }
    }
}

// Shape of the --json output
#[derive(Debug, Serialize)]
struct JsonSummary<'a> {
    #[serde(flatten)]
    result: &'a RunResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

// Prints the summary and returns the process exit code
//
// Parameters:
//   console: where the summary is written
//   result: counters from the run
//   json: whether to output JSON format
pub fn report(console: &mut Console, result: &RunResult, json: bool) -> Result<i32> {
    if json {
        let summary = JsonSummary {
            result,
            error: None,
        };
        console.summary(serde_json::to_string_pretty(&summary)?)?;
    } else {
        print_summary(console, result)?;
    }
    Ok(result.exit_code())
}

// Reports a run that stopped before any file could be processed
// (archive download failed, target directory could not be created, ...)
//
// Returns: always exit code 1
pub fn report_failure(console: &mut Console, message: &str, json: bool) -> Result<i32> {
    let result = RunResult {
        failed: 1,
        ..RunResult::default()
    };

    if json {
        let summary = JsonSummary {
            result: &result,
            error: Some(message),
        };
        console.summary(serde_json::to_string_pretty(&summary)?)?;
    } else {
        console.summary(format!("❌ {}", message))?;
    }
    Ok(result.exit_code())
}

fn print_summary(console: &mut Console, result: &RunResult) -> std::io::Result<()> {
    let downloaded = result.succeeded.saturating_sub(result.skipped);

    console.summary("")?;
    console.summary("📊 Summary:")?;
    console.summary(format!("   ✅ {} file(s) downloaded successfully", downloaded))?;
    if result.skipped > 0 {
        console.summary(format!("   ⏭️  {} file(s) already present, skipped", result.skipped))?;
    }
    if result.failed > 0 {
        console.summary(format!("   ❌ {} file(s) failed", result.failed))?;
    } else {
        console.summary("🎉 Done! All files added successfully.")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::testing::{capture, silent};

    #[test]
    fn test_exit_code_zero_without_failures() {
        let result = RunResult {
            succeeded: 4,
            failed: 0,
            skipped: 2,
        };
        assert_eq!(result.exit_code(), 0);
        assert_eq!(report(&mut silent(), &result, false).unwrap(), 0);
    }

    #[test]
    fn test_exit_code_one_with_failures() {
        let result = RunResult {
            succeeded: 3,
            failed: 1,
            skipped: 0,
        };
        assert_eq!(report(&mut silent(), &result, true).unwrap(), 1);
    }

    #[test]
    fn test_json_summary_is_the_only_output() {
        let (mut console, progress, summary) = capture();
        let result = RunResult {
            succeeded: 1,
            failed: 2,
            skipped: 1,
        };

        report(&mut console, &result, true).unwrap();

        assert_eq!(progress.contents(), "");
        let value: serde_json::Value = serde_json::from_str(&summary.contents()).unwrap();
        assert_eq!(value["succeeded"], 1);
        assert_eq!(value["failed"], 2);
        assert_eq!(value["skipped"], 1);
        assert!(value.get("error").is_none());
    }

    #[test]
    fn test_failure_is_reported_as_json() {
        let (mut console, _, summary) = capture();

        let code = report_failure(&mut console, "archive missing", true).unwrap();

        assert_eq!(code, 1);
        let value: serde_json::Value = serde_json::from_str(&summary.contents()).unwrap();
        assert_eq!(value["failed"], 1);
        assert_eq!(value["error"], "archive missing");
    }

    #[test]
    fn test_text_summary_mentions_skipped() {
        let (mut console, _, summary) = capture();
        let result = RunResult {
            succeeded: 4,
            failed: 0,
            skipped: 1,
        };

        report(&mut console, &result, false).unwrap();

        let text = summary.contents();
        assert!(text.contains("3 file(s) downloaded"));
        assert!(text.contains("1 file(s) already present"));
    }
}
