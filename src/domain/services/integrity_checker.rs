//! Integrity checker service
//!
//! Cheap structural checks run before any decode attempt: existence,
//! size, and whether the header matches the extension's signature.

use crate::core::IntegrityConfig;
use crate::domain::entities::{ImageKind, IntegrityReport};
use std::fs::File;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct IntegrityChecker {
    config: IntegrityConfig,
}

impl IntegrityChecker {
    pub fn new(config: IntegrityConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &IntegrityConfig {
        &self.config
    }

    /// Checks a file; never fails, every problem lands in the report
    ///
    /// Order: existence (short-circuits), size, then header signature.
    /// Unknown extensions skip the signature check silently; a mismatch
    /// on a known extension is only a warning since a lenient decoder
    /// may still read the file.
    pub fn check(&self, path: &Path) -> IntegrityReport {
        let mut report = IntegrityReport::new(path);

        let metadata = match std::fs::metadata(path) {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                report.push_error("File does not exist");
                return report;
            }
            Err(e) => {
                report.push_error(format!("File check failed: {}", e));
                return report;
            }
        };

        if !metadata.is_file() {
            report.push_error("Path is not a regular file");
            return report;
        }

        let size = metadata.len();
        report.set_size(size);

        if size == 0 {
            report.push_error("File size is 0 bytes (zero-byte file)");
            return report;
        }

        if size < self.config.min_reasonable_bytes {
            report.push_warning(format!(
                "File is very small ({} bytes), likely truncated or not an image",
                size
            ));
        }

        let Some(kind) = ImageKind::from_path(path) else {
            return report;
        };

        match read_header(path, self.config.header_probe_len) {
            Ok(header) => {
                if !kind.matches_header(&header) {
                    tracing::warn!(
                        "Header of {} does not match {} signature",
                        path.display(),
                        kind
                    );
                    report.push_warning(format!(
                        "File header does not match the {} signature for extension '{}'",
                        kind,
                        report.extension()
                    ));
                }
            }
            Err(e) => {
                report.push_error(format!("File check failed: {}", e));
            }
        }

        report
    }
}

fn read_header(path: &Path, len: usize) -> std::io::Result<Vec<u8>> {
    let mut header = Vec::with_capacity(len);
    File::open(path)?.take(len as u64).read_to_end(&mut header)?;
    Ok(header)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, data: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, data).unwrap();
        path
    }

    #[test]
    fn test_missing_file_short_circuits() {
        let dir = TempDir::new().unwrap();
        let report = IntegrityChecker::default().check(&dir.path().join("nope.jpg"));

        assert!(report.has_error());
        assert_eq!(report.errors(), ["File does not exist"]);
        assert!(report.warnings().is_empty());
    }

    #[test]
    fn test_directory_is_rejected() {
        let dir = TempDir::new().unwrap();
        let report = IntegrityChecker::default().check(dir.path());
        assert!(report.has_error());
    }

    #[test]
    fn test_unknown_extension_is_permissive() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "data.raw", &[0u8; 512]);
        let report = IntegrityChecker::default().check(&path);

        assert!(!report.has_error());
        assert!(report.warnings().is_empty());
        assert_eq!(report.size_bytes(), 512);
    }

    #[test]
    fn test_small_file_warns_once_per_problem() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "tiny.gif", b"GIF89a\x01\x00");
        let report = IntegrityChecker::default().check(&path);

        assert!(!report.has_error());
        assert_eq!(report.warnings().len(), 1);
        assert!(report.warnings()[0].contains("very small"));
    }
}
