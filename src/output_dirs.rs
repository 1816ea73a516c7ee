/// Removal of stale category directories before a run.
///
/// Every run starts by deleting the category directories a previous run may
/// have left under the resources directory, so outputs never mix.
use crate::category::Category;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// A category directory that could not be removed.
#[derive(Debug, Error)]
#[error("Failed to clear {}: {source}", path.display())]
pub struct ClearFailure {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Clears per-category output directories.
pub struct OutputDirectoryManager;

impl OutputDirectoryManager {
    /// Recursively deletes `base_dir/<name>` for every name given.
    ///
    /// Missing directories are not an error. Any other failure is logged and
    /// returned; the remaining directories are still processed.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use vypack::output_dirs::OutputDirectoryManager;
    /// use std::path::Path;
    ///
    /// let failures = OutputDirectoryManager::clear(Path::new("out/resources"), &["map", "icon"]);
    /// for failure in &failures {
    ///     eprintln!("{}", failure);
    /// }
    /// ```
    pub fn clear(base_dir: &Path, category_dir_names: &[&str]) -> Vec<ClearFailure> {
        let mut failures = Vec::new();

        for name in category_dir_names {
            let path = base_dir.join(name);
            match fs::remove_dir_all(&path) {
                Ok(()) => tracing::debug!("Cleared {}", path.display()),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!("Could not clear {}: {}", path.display(), e);
                    failures.push(ClearFailure { path, source: e });
                }
            }
        }

        failures
    }

    /// Clears the directory of every [`Category`] under `base_dir`.
    pub fn clear_categories(base_dir: &Path) -> Vec<ClearFailure> {
        Self::clear(base_dir, &Category::dir_names())
    }
}
