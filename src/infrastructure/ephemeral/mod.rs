//! Ephemeral file management
//!
//! Repaired image bytes are materialized into short-lived files that
//! backends can read by path. Each file belongs to exactly one analysis
//! and is deleted exactly once, either explicitly or on drop.

use crate::core::CleanupError;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::TempPath;

const FILE_PREFIX: &str = "pictriage-";
const FILE_SUFFIX: &str = ".jpg";

/// Creates ephemeral files in a configured directory
#[derive(Debug, Clone, Default)]
pub struct EphemeralStore {
    dir: Option<PathBuf>,
}

impl EphemeralStore {
    /// Uses `dir` when given, otherwise the system temp directory
    pub fn new(dir: Option<PathBuf>) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// Writes `bytes` to a fresh uniquely-named file
    pub fn materialize(&self, bytes: &[u8]) -> io::Result<EphemeralFile> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(FILE_PREFIX).suffix(FILE_SUFFIX);

        let mut file = match &self.dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        file.write_all(bytes)?;
        file.flush()?;

        let handle = file.into_temp_path();
        let path = handle.to_path_buf();
        tracing::debug!("Materialized {} bytes at {}", bytes.len(), path.display());

        Ok(EphemeralFile {
            path,
            handle: Some(handle),
        })
    }
}

/// A scoped temporary file
///
/// `release` is idempotent. Dropping an unreleased file releases it and
/// logs any cleanup failure.
#[derive(Debug)]
pub struct EphemeralFile {
    path: PathBuf,
    handle: Option<TempPath>,
}

impl EphemeralFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_released(&self) -> bool {
        self.handle.is_none()
    }

    /// Deletes the file; later calls are no-ops
    pub fn release(&mut self) -> Result<(), CleanupError> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };

        match handle.close() {
            Ok(()) => {
                tracing::debug!("Released {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(CleanupError {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

impl Drop for EphemeralFile {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            tracing::warn!("{}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_materialize_writes_bytes() {
        let dir = TempDir::new().unwrap();
        let store = EphemeralStore::new(Some(dir.path().to_path_buf()));

        let file = store.materialize(b"jpeg bytes").unwrap();
        assert!(file.path().starts_with(dir.path()));
        assert_eq!(std::fs::read(file.path()).unwrap(), b"jpeg bytes");
        assert!(file.path().to_string_lossy().ends_with(".jpg"));
    }

    #[test]
    fn test_release_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = EphemeralStore::new(Some(dir.path().to_path_buf()));
        let mut file = store.materialize(b"x").unwrap();
        let path = file.path().to_path_buf();

        file.release().unwrap();
        assert!(!path.exists());
        assert!(file.is_released());

        file.release().unwrap();
        file.release().unwrap();
    }

    #[test]
    fn test_drop_releases() {
        let dir = TempDir::new().unwrap();
        let store = EphemeralStore::new(Some(dir.path().to_path_buf()));
        let path = {
            let file = store.materialize(b"x").unwrap();
            file.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn test_externally_deleted_file_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        let store = EphemeralStore::new(Some(dir.path().to_path_buf()));
        let mut file = store.materialize(b"x").unwrap();

        std::fs::remove_file(file.path()).unwrap();
        assert!(file.release().is_ok());
    }
}
