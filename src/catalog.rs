// src/catalog.rs
// =============================================================================
// Which files make up a component module, and where each one goes.
//
// Remote layout:  <base_url>/<module>/<file>
// Local layout:   <project_dir>/src/components/<module>/<file>
// =============================================================================

use std::path::{Path, PathBuf};

use url::Url;

// Module used when no module name is given on the command line
pub const DEFAULT_MODULE: &str = "theme";

// Components directory, relative to the project root
pub const COMPONENTS_DIR: &str = "src/components";

// Built-in file lists, keyed by module name
//
// Only the theme module ships a fixed list; other modules are fetched with
// --file or as an archive.
const MODULES: &[(&str, &[&str])] = &[(
    "theme",
    &[
        "moon-icon.tsx",
        "sun-icon.tsx",
        "system-icon.tsx",
        "theme-toggle.tsx",
    ],
)];

// Returns the built-in file list for a module, if we know it
//
// Example:
//   module_files("theme") -> Some(["moon-icon.tsx", ...])
//   module_files("forms") -> None
pub fn module_files(module: &str) -> Option<&'static [&'static str]> {
    MODULES
        .iter()
        .find(|(name, _)| *name == module)
        .map(|(_, files)| *files)
}

// Names of all modules with a built-in file list (for error messages)
pub fn known_modules() -> Vec<&'static str> {
    MODULES.iter().map(|(name, _)| *name).collect()
}

// One remote file and the local path it is written to
//
// Built once at startup and never changed during the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTarget {
    pub relative_path: String,
    pub source_url: String,
    pub destination_path: PathBuf,
}

// Local directory a module's files are written into
pub fn target_dir(project_dir: &Path, module: &str) -> PathBuf {
    project_dir.join(COMPONENTS_DIR).join(module)
}

// Builds the fetch targets for a module's files
//
// Parameters:
//   base_url: root the module directories are served from
//   module: module name (remote subdirectory and local subdirectory)
//   files: file names relative to the module directory
//   target_dir: local directory the files are written into
//
// Returns: one FetchTarget per file, in the same order as `files`
pub fn build_targets<S: AsRef<str>>(
    base_url: &Url,
    module: &str,
    files: &[S],
    target_dir: &Path,
) -> Vec<FetchTarget> {
    files
        .iter()
        .map(|file| {
            let file = file.as_ref();
            FetchTarget {
                relative_path: file.to_string(),
                source_url: join_url(base_url, &[module, file]),
                destination_path: target_dir.join(file),
            }
        })
        .collect()
}

// URL of the zip archive for a module: <base_url>/zips/<module>.zip
pub fn archive_url(base_url: &Url, module: &str) -> String {
    join_url(base_url, &["zips", &format!("{}.zip", module)])
}

// Appends path segments to the base URL, keeping whatever path the base
// already has (e.g. ".../starter-snippets/main").
fn join_url(base_url: &Url, segments: &[&str]) -> String {
    let base = base_url.as_str().trim_end_matches('/');
    format!("{}/{}", base, segments.join("/"))
}
