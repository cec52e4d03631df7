// src/fetch/archive.rs
// =============================================================================
// Archive mode: download <base_url>/zips/<module>.zip and unpack it.
//
// 1. Download the archive (with the same 429 backoff as per-file mode)
// 2. Save it into a fresh temporary directory
// 3. Load it back into memory and write each entry into the target directory
// 4. Remove the temporary directory
//
// Every error here is fatal: the archive is the whole unit of work.
// =============================================================================

use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

use reqwest::Client;
use tempfile::TempDir;
use tracing::{debug, info, warn};
use zip::ZipArchive;

use super::retry::{get_with_retry, RetryPolicy};
use crate::console::Console;
use crate::error::{ArchiveError, FetchError};
use crate::report::RunResult;

// Knobs for archive mode (built from the command line in cli.rs)
#[derive(Debug, Clone, Default)]
pub struct ArchiveOptions {
    pub retry: RetryPolicy,
    /// Parent of the temporary download directory (system temp dir if None)
    pub temp_root: Option<PathBuf>,
}

// Downloads and extracts a module archive
//
// Parameters:
//   client: reqwest HTTP client
//   url: full URL of <module>.zip
//   module: module name, used to name the temporary archive file
//   target_dir: where the entries are written
//   options: retry policy and temp location
//   console: progress output
//
// Returns: RunResult whose `succeeded` is the number of files written
//   Error: any download, zip or filesystem failure (the temp dir is removed
//   either way, because TempDir deletes itself on drop)
pub async fn fetch_archive(
    client: &Client,
    url: &str,
    module: &str,
    target_dir: &Path,
    options: &ArchiveOptions,
    console: &mut Console,
) -> Result<RunResult, ArchiveError> {
    let temp = match &options.temp_root {
        Some(root) => TempDir::new_in(root).map_err(|e| ArchiveError::io(root, e))?,
        None => TempDir::new().map_err(|e| ArchiveError::io(std::env::temp_dir(), e))?,
    };

    console.progress(format_args!("⬇️ Downloading {}...", url));
    let bytes = download(client, url, &options.retry, console).await?;

    let archive_path = temp.path().join(format!("{}.zip", module));
    tokio::fs::write(&archive_path, &bytes)
        .await
        .map_err(|e| ArchiveError::io(&archive_path, e))?;
    debug!(path = %archive_path.display(), bytes = bytes.len(), "archive saved");

    let data = tokio::fs::read(&archive_path)
        .await
        .map_err(|e| ArchiveError::io(&archive_path, e))?;
    let written = extract_entries(data, target_dir, console)?;

    let temp_path = temp.path().to_path_buf();
    temp.close().map_err(|e| ArchiveError::io(temp_path, e))?;

    info!(url, files = written, "archive extracted");
    Ok(RunResult {
        succeeded: written,
        failed: 0,
        skipped: 0,
    })
}

async fn download(
    client: &Client,
    url: &str,
    retry: &RetryPolicy,
    console: &mut Console,
) -> Result<Vec<u8>, ArchiveError> {
    let wrap = |source: FetchError| ArchiveError::Download {
        url: url.to_string(),
        source,
    };

    let response = get_with_retry(client, url, retry, console)
        .await
        .map_err(wrap)?;
    let bytes = response
        .bytes()
        .await
        .map_err(|e| wrap(FetchError::from(e)))?;
    Ok(bytes.to_vec())
}

// Writes every file entry of the zip held in `data` under `target_dir`
//
// Returns: the number of files written (directory entries and skipped unsafe
// names are not counted)
fn extract_entries(
    data: Vec<u8>,
    target_dir: &Path,
    console: &mut Console,
) -> Result<usize, ArchiveError> {
    let mut archive = ZipArchive::new(Cursor::new(data))?;

    std::fs::create_dir_all(target_dir).map_err(|e| ArchiveError::io(target_dir, e))?;

    let mut written = 0;
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;

        // Entries like "../x" or "/etc/x" would escape the target directory
        let relative = match entry.enclosed_name() {
            Some(name) => name.to_path_buf(),
            None => {
                warn!(entry = entry.name(), "skipping entry with unsafe path");
                continue;
            }
        };
        let dest = target_dir.join(&relative);

        if entry.is_dir() {
            std::fs::create_dir_all(&dest).map_err(|e| ArchiveError::io(&dest, e))?;
            continue;
        }

        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ArchiveError::io(parent, e))?;
        }

        // entry.size() comes from the archive header and is not trusted
        let mut contents = Vec::new();
        entry
            .read_to_end(&mut contents)
            .map_err(|e| ArchiveError::io(&dest, e))?;
        std::fs::write(&dest, &contents).map_err(|e| ArchiveError::io(&dest, e))?;

        console.progress(format_args!("✅ Extracted: {}", dest.display()));
        written += 1;
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::testing::{capture, silent};
    use crate::fetch::retry::BackoffPolicy;
    use std::io::Write;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};
    use zip::write::FileOptions;
    use zip::{CompressionMethod, ZipWriter};

    fn build_zip(entries: &[(&str, &str)]) -> Vec<u8> {
        build_zip_with(entries, CompressionMethod::Deflated)
    }

    fn build_zip_with(entries: &[(&str, &str)], compression: CompressionMethod) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default().compression_method(compression);
        for (name, contents) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(contents.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    fn quick_options(temp_root: &Path) -> ArchiveOptions {
        ArchiveOptions {
            retry: RetryPolicy {
                max_attempts: 2,
                unit: Duration::from_millis(10),
                backoff: BackoffPolicy::Linear,
            },
            temp_root: Some(temp_root.to_path_buf()),
        }
    }

    #[tokio::test]
    async fn test_archive_extracted_and_temp_removed() {
        let server = MockServer::start().await;
        let zip = build_zip(&[
            ("moon-icon.tsx", "export const Moon = 1;"),
            ("sun-icon.tsx", "export const Sun = 2;"),
            ("theme-toggle.tsx", "export const Toggle = 3;"),
        ]);
        Mock::given(method("GET"))
            .and(path("/zips/theme.zip"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(zip))
            .expect(1)
            .mount(&server)
            .await;

        let project = TempDir::new().unwrap();
        let temp_root = TempDir::new().unwrap();
        let target = project.path().join("src/components/theme");
        let url = format!("{}/zips/theme.zip", server.uri());
        let (mut console, progress, _) = capture();

        let result = fetch_archive(
            &Client::new(),
            &url,
            "theme",
            &target,
            &quick_options(temp_root.path()),
            &mut console,
        )
        .await
        .unwrap();

        assert_eq!(result.succeeded, 3);
        assert_eq!(result.exit_code(), 0);
        assert_eq!(
            std::fs::read_to_string(target.join("sun-icon.tsx")).unwrap(),
            "export const Sun = 2;"
        );
        assert!(target.join("moon-icon.tsx").is_file());
        assert!(target.join("theme-toggle.tsx").is_file());
        assert_eq!(progress.contents().matches("Extracted").count(), 3);
        // Nothing left behind in the temp root
        assert_eq!(std::fs::read_dir(temp_root.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_missing_archive_is_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let project = TempDir::new().unwrap();
        let temp_root = TempDir::new().unwrap();
        let url = format!("{}/zips/nope.zip", server.uri());

        let err = fetch_archive(
            &Client::new(),
            &url,
            "nope",
            project.path(),
            &quick_options(temp_root.path()),
            &mut silent(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ArchiveError::Download { .. }));
        assert_eq!(std::fs::read_dir(temp_root.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_corrupt_archive_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not a zip"))
            .mount(&server)
            .await;

        let project = TempDir::new().unwrap();
        let temp_root = TempDir::new().unwrap();
        let url = format!("{}/zips/theme.zip", server.uri());

        let err = fetch_archive(
            &Client::new(),
            &url,
            "theme",
            project.path(),
            &quick_options(temp_root.path()),
            &mut silent(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ArchiveError::Zip(_)));
        assert_eq!(std::fs::read_dir(temp_root.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_nested_and_unsafe_entries() {
        let zip = build_zip(&[
            ("icons/moon.tsx", "moon"),
            ("../escape.tsx", "nope"),
        ]);
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("out");

        let written = extract_entries(zip, &target, &mut silent()).unwrap();

        assert_eq!(written, 1);
        assert_eq!(std::fs::read_to_string(target.join("icons/moon.tsx")).unwrap(), "moon");
        assert!(!dir.path().join("escape.tsx").exists());
    }

    #[test]
    fn test_oversized_header_does_not_drive_allocation() {
        let mut zip = build_zip_with(&[("moon-icon.tsx", "moon")], CompressionMethod::Stored);

        // Claim a ~4 GiB uncompressed size in the central directory record
        // (signature PK\x01\x02, uncompressed size at offset 24)
        let central = zip
            .windows(4)
            .position(|w| w == b"PK\x01\x02")
            .unwrap();
        zip[central + 24..central + 28].copy_from_slice(&0xFFFF_FFFEu32.to_le_bytes());

        let dir = TempDir::new().unwrap();
        let written = extract_entries(zip, dir.path(), &mut silent()).unwrap();

        assert_eq!(written, 1);
        assert_eq!(std::fs::read_to_string(dir.path().join("moon-icon.tsx")).unwrap(), "moon");
    }
}
