//! Integrity report entity
//!
//! Outcome of the cheap structural pre-check run before any decode.

use serde::Serialize;
use std::path::{Path, PathBuf};

/// Remediation hints attached to every failed validation
pub const VALIDATION_SUGGESTIONS: [&str; 4] = [
    "Check that the image file was downloaded completely",
    "Try opening the file in another image viewer",
    "If this is a screenshot, capture it again",
    "Convert the image to a standard JPEG and retry",
];

/// Findings from checking a file before decoding it
///
/// `errors` are fatal, `warnings` are informational. The report is built
/// fresh for each validation and is not modified after it is returned.
#[derive(Debug, Clone, Serialize)]
pub struct IntegrityReport {
    path: PathBuf,
    size_bytes: u64,
    extension: String,
    errors: Vec<String>,
    warnings: Vec<String>,
    has_error: bool,
}

impl IntegrityReport {
    pub(crate) fn new(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e.to_ascii_lowercase()))
            .unwrap_or_default();

        Self {
            path: path.to_path_buf(),
            size_bytes: 0,
            extension,
            errors: Vec::new(),
            warnings: Vec::new(),
            has_error: false,
        }
    }

    pub(crate) fn set_size(&mut self, size_bytes: u64) {
        self.size_bytes = size_bytes;
    }

    pub(crate) fn push_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
        self.has_error = true;
    }

    pub(crate) fn push_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// Lowercased extension including the leading dot, empty when absent
    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn has_error(&self) -> bool {
        self.has_error
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Multi-line explanation suitable for showing to the uploader
    pub fn detailed_message(&self) -> String {
        if !self.has_error {
            return "Unknown error".to_string();
        }

        let mut lines = vec![
            format!("File: {}", self.file_name()),
            format!("Size: {} bytes", self.size_bytes),
            format!(
                "Format: {}",
                if self.extension.is_empty() {
                    "unknown"
                } else {
                    &self.extension
                }
            ),
        ];

        lines.push(String::new());
        lines.push("Errors:".to_string());
        lines.extend(self.errors.iter().map(|e| format!("  - {}", e)));

        if !self.warnings.is_empty() {
            lines.push(String::new());
            lines.push("Warnings:".to_string());
            lines.extend(self.warnings.iter().map(|w| format!("  - {}", w)));
        }

        lines.push(String::new());
        lines.push("Suggestions:".to_string());
        lines.extend(VALIDATION_SUGGESTIONS.iter().map(|s| format!("  - {}", s)));

        lines.join("\n")
    }
}
