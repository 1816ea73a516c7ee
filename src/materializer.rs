/// Copying source assets into the packaged output tree.
///
/// This module provides the copy step of a run: each accepted file is copied
/// byte-for-byte into its category directory under its generated identifier.
/// Sources are never moved or modified.
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while materializing a file.
#[derive(Debug, Error)]
pub enum MaterializeError {
    /// Failed to create the category directory.
    #[error("Failed to create directory {}: {source}", path.display())]
    DirectoryCreationFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Failed to copy the file content.
    #[error("Failed to copy {} to {}: {source}", from.display(), to.display())]
    CopyFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for materialization.
pub type MaterializeResult<T> = Result<T, MaterializeError>;

/// A file that now exists in the output tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Materialized {
    /// Where the copy was written.
    pub destination: PathBuf,
    /// Number of bytes copied.
    pub bytes: u64,
}

/// Copies source files into category directories.
pub struct FileMaterializer;

impl FileMaterializer {
    /// Copies `src_path` to `dest_dir/new_name`, creating `dest_dir` and its
    /// parents as needed.
    ///
    /// An existing file at the destination is overwritten.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use vypack::materializer::FileMaterializer;
    /// use std::path::Path;
    ///
    /// # async fn demo() {
    /// let result = FileMaterializer::copy(
    ///     Path::new("assets/ui/main.vyint"),
    ///     Path::new("out/resources/interface"),
    ///     "k3j9a2x0pq.vyint",
    /// )
    /// .await;
    ///
    /// match result {
    ///     Ok(done) => println!("Wrote {} bytes to {}", done.bytes, done.destination.display()),
    ///     Err(e) => eprintln!("Copy failed: {}", e),
    /// }
    /// # }
    /// ```
    pub async fn copy(
        src_path: &Path,
        dest_dir: &Path,
        new_name: &str,
    ) -> MaterializeResult<Materialized> {
        tokio::fs::create_dir_all(dest_dir).await.map_err(|e| {
            MaterializeError::DirectoryCreationFailed {
                path: dest_dir.to_path_buf(),
                source: e,
            }
        })?;

        let destination = dest_dir.join(new_name);
        let bytes = tokio::fs::copy(src_path, &destination).await.map_err(|e| {
            MaterializeError::CopyFailed {
                from: src_path.to_path_buf(),
                to: destination.clone(),
                source: e,
            }
        })?;

        tracing::debug!(
            "Copied {} -> {} ({} bytes)",
            src_path.display(),
            destination.display(),
            bytes
        );

        Ok(Materialized { destination, bytes })
    }
}
