//! Recursive discovery of asset files under the input root.
//!
//! The scanner walks every directory, tests each file's extension against
//! [`RECOGNIZED_EXTENSIONS`] and collects the matches as [`Candidate`]s.
//! An unreadable directory only loses its own subtree; the error is kept in
//! the [`ScanOutcome`] and the walk continues.

use crate::category::RECOGNIZED_EXTENSIONS;
use glob::Pattern;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// How a file extension is tested against the whitelist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtensionMatch {
    /// The extension must equal a whitelist token.
    #[default]
    Exact,
    /// The extension must contain a whitelist token. First token in
    /// whitelist order wins; `vymx` is admitted through `vym`.
    Contains,
}

impl ExtensionMatch {
    /// Returns the whitelist token that admits `ext`, if any.
    ///
    /// # Examples
    ///
    /// ```
    /// use vypack::scanner::ExtensionMatch;
    ///
    /// assert_eq!(ExtensionMatch::Exact.matching_token("vymac"), Some("vymac"));
    /// assert_eq!(ExtensionMatch::Contains.matching_token("vymac"), Some("vym"));
    /// assert_eq!(ExtensionMatch::Exact.matching_token("png"), None);
    /// ```
    pub fn matching_token(&self, ext: &str) -> Option<&'static str> {
        RECOGNIZED_EXTENSIONS.iter().copied().find(|token| match self {
            ExtensionMatch::Exact => ext == *token,
            ExtensionMatch::Contains => ext.contains(token),
        })
    }
}

impl fmt::Display for ExtensionMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtensionMatch::Exact => f.write_str("exact"),
            ExtensionMatch::Contains => f.write_str("contains"),
        }
    }
}

impl FromStr for ExtensionMatch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exact" => Ok(ExtensionMatch::Exact),
            "contains" => Ok(ExtensionMatch::Contains),
            other => Err(format!(
                "unknown extension match mode '{}': expected 'exact' or 'contains'",
                other
            )),
        }
    }
}

/// A discovered file whose extension passed the whitelist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Full path to the source file.
    pub path: PathBuf,
    /// Original base name, recorded in the manifest.
    pub file_name: String,
    /// The file's own extension, without the dot.
    pub extension: String,
    /// The whitelist token that admitted it.
    pub matched_token: &'static str,
}

/// A directory (or entry) that could not be read.
#[derive(Debug, Error)]
#[error("Failed to read {}: {source}", path.display())]
pub struct ScanError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Everything one scan produced.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub candidates: Vec<Candidate>,
    pub errors: Vec<ScanError>,
}

impl ScanOutcome {
    /// Number of files the run is expected to handle.
    pub fn expected_count(&self) -> usize {
        self.candidates.len()
    }
}

/// Walks an input tree and collects candidates.
#[derive(Debug, Clone, Default)]
pub struct DirectoryScanner {
    extension_match: ExtensionMatch,
    exclude_patterns: Vec<Pattern>,
}

impl DirectoryScanner {
    /// Creates a scanner using the given matching rule and no excludes.
    pub fn new(extension_match: ExtensionMatch) -> Self {
        Self {
            extension_match,
            exclude_patterns: Vec::new(),
        }
    }

    /// Adds glob patterns; a file whose path relative to the scan root
    /// matches any of them is never a candidate.
    pub fn with_excludes(mut self, patterns: Vec<Pattern>) -> Self {
        self.exclude_patterns = patterns;
        self
    }

    /// Recursively scans `root`.
    ///
    /// Entries are visited in name order so repeated scans of the same tree
    /// return candidates in the same order. Symlinked files are followed;
    /// symlinked directories are not.
    pub fn scan(&self, root: &Path) -> ScanOutcome {
        let mut outcome = ScanOutcome::default();
        self.walk(root, root, &mut outcome);
        tracing::debug!(
            "Scan of {} found {} candidate(s), {} error(s)",
            root.display(),
            outcome.candidates.len(),
            outcome.errors.len()
        );
        outcome
    }

    fn walk(&self, root: &Path, dir: &Path, outcome: &mut ScanOutcome) {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                record_error(outcome, dir, e);
                return;
            }
        };

        let mut entries: Vec<_> = entries
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    record_error(outcome, dir, e);
                    None
                }
            })
            .collect();
        entries.sort_by_key(|entry| entry.file_name());

        for entry in entries {
            let path = entry.path();
            let file_type = match entry.file_type() {
                Ok(file_type) => file_type,
                Err(e) => {
                    record_error(outcome, &path, e);
                    continue;
                }
            };

            if file_type.is_dir() {
                self.walk(root, &path, outcome);
            } else if file_type.is_file() || (file_type.is_symlink() && path.is_file()) {
                if let Some(candidate) = self.check_file(root, &path) {
                    outcome.candidates.push(candidate);
                }
            }
        }
    }

    fn check_file(&self, root: &Path, path: &Path) -> Option<Candidate> {
        let extension = path.extension()?.to_str()?;
        let matched_token = self.extension_match.matching_token(extension)?;

        let relative = path.strip_prefix(root).unwrap_or(path);
        if self
            .exclude_patterns
            .iter()
            .any(|pattern| pattern.matches_path(relative))
        {
            tracing::debug!("Excluded by pattern: {}", relative.display());
            return None;
        }

        let file_name = path.file_name()?.to_string_lossy().to_string();
        Some(Candidate {
            path: path.to_path_buf(),
            file_name,
            extension: extension.to_string(),
            matched_token,
        })
    }
}

fn record_error(outcome: &mut ScanOutcome, path: &Path, source: std::io::Error) {
    tracing::warn!("Skipping unreadable entry {}: {}", path.display(), source);
    outcome.errors.push(ScanError {
        path: path.to_path_buf(),
        source,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(base: &Path, rel: &str) {
        let path = base.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent");
        }
        fs::write(&path, b"data").expect("Failed to write file");
    }

    fn names(outcome: &ScanOutcome) -> Vec<&str> {
        outcome
            .candidates
            .iter()
            .map(|c| c.file_name.as_str())
            .collect()
    }

    #[test]
    fn test_scan_filters_by_whitelist() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        touch(base, "a.vyint");
        touch(base, "b.mp3");
        touch(base, "notes.txt");
        touch(base, "image.png");
        touch(base, "README");

        let outcome = DirectoryScanner::default().scan(base);
        assert_eq!(names(&outcome), vec!["a.vyint", "b.mp3"]);
        assert_eq!(outcome.expected_count(), 2);
        assert!(outcome.errors.is_empty());
    }

    #[test]
    fn test_scan_recurses_into_subdirectories() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        touch(base, "ui/menus/main.vyint");
        touch(base, "maps/world/level1.vym");
        touch(base, "top.vyi");

        let outcome = DirectoryScanner::default().scan(base);
        assert_eq!(
            names(&outcome),
            vec!["level1.vym", "top.vyi", "main.vyint"]
        );
    }

    #[test]
    fn test_scan_is_case_sensitive() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        touch(base, "loud.MP3");
        touch(base, "quiet.mp3");

        let outcome = DirectoryScanner::default().scan(base);
        assert_eq!(names(&outcome), vec!["quiet.mp3"]);
    }

    #[test]
    fn test_exact_match_rejects_lookalike_extensions() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        touch(base, "a.vymx");
        touch(base, "b.mp3backup");

        let outcome = DirectoryScanner::new(ExtensionMatch::Exact).scan(base);
        assert!(outcome.candidates.is_empty());
    }

    #[test]
    fn test_contains_match_admits_lookalike_extensions() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        touch(base, "a.vymx");
        touch(base, "b.mp3backup");

        let outcome = DirectoryScanner::new(ExtensionMatch::Contains).scan(base);
        assert_eq!(outcome.candidates.len(), 2);
        assert_eq!(outcome.candidates[0].matched_token, "vym");
        assert_eq!(outcome.candidates[0].extension, "vymx");
        assert_eq!(outcome.candidates[1].matched_token, "mp3");
    }

    #[test]
    fn test_contains_checks_tokens_in_whitelist_order() {
        assert_eq!(ExtensionMatch::Contains.matching_token("vyint"), Some("vyint"));
        assert_eq!(ExtensionMatch::Contains.matching_token("vyi"), Some("vyi"));
        assert_eq!(ExtensionMatch::Contains.matching_token("vymac"), Some("vym"));
        assert_eq!(ExtensionMatch::Exact.matching_token("vymac"), Some("vymac"));
    }

    #[test]
    fn test_exclude_patterns_are_relative_to_root() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        touch(base, "drafts/old.vym");
        touch(base, "final/new.vym");

        let scanner = DirectoryScanner::default()
            .with_excludes(vec![Pattern::new("drafts/**").expect("valid pattern")]);
        let outcome = scanner.scan(base);
        assert_eq!(names(&outcome), vec!["new.vym"]);
    }

    #[test]
    fn test_missing_root_is_a_localized_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let missing = temp_dir.path().join("nope");

        let outcome = DirectoryScanner::default().scan(&missing);
        assert!(outcome.candidates.is_empty());
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].path, missing);
    }

    #[test]
    fn test_entry_errors_are_recorded_and_scan_continues() {
        let mut outcome = ScanOutcome::default();
        let entry = Path::new("assets/broken.vym");

        record_error(
            &mut outcome,
            entry,
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "stat failed"),
        );

        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].path, entry);
        assert_eq!(
            outcome.errors[0].source.kind(),
            std::io::ErrorKind::PermissionDenied
        );
    }

    #[test]
    fn test_extension_match_from_str() {
        assert_eq!("exact".parse::<ExtensionMatch>(), Ok(ExtensionMatch::Exact));
        assert_eq!(
            "contains".parse::<ExtensionMatch>(),
            Ok(ExtensionMatch::Contains)
        );
        assert!("fuzzy".parse::<ExtensionMatch>().is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_subdirectory_does_not_abort_scan() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        touch(base, "locked/hidden.vym");
        touch(base, "open/visible.vym");

        let locked = base.join("locked");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000))
            .expect("Failed to lock directory");

        let outcome = DirectoryScanner::default().scan(base);

        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755))
            .expect("Failed to unlock directory");

        // Root can read anything, so only assert the scan kept going.
        assert!(names(&outcome).contains(&"visible.vym"));
        if !outcome.errors.is_empty() {
            assert_eq!(outcome.errors[0].path, locked);
        }
    }
}
