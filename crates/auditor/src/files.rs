//! Single-shot file decoding for user-supplied documents.
//!
//! A file is read at most once per submission, either as UTF-8 text or as
//! raw bytes encoded to base64 for transmission as an inline attachment.
//! There is no retry and no partial-read recovery; a failed read fails the
//! whole submission.

use std::path::{Path, PathBuf};

use base64::Engine;
use tracing::debug;

use crate::error::AuditError;

/// A user-selected file, held only long enough to be read once.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub path: PathBuf,
    pub name: String,
    /// MIME type as declared by the caller, if any. No content sniffing
    /// is performed on top of it.
    pub mime_type: Option<String>,
}

impl UploadedFile {
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            path,
            name,
            mime_type: None,
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Lowercased filename extension, if any.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
    }
}

/// How a file's bytes should be decoded for transmission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadMode {
    Text,
    Base64,
}

/// Decoded content of a file, paired with its MIME type.
#[derive(Debug, Clone, PartialEq)]
pub enum FilePayload {
    Text(String),
    /// Base64-encoded bytes with no data-URL prefix.
    Binary(String),
}

/// Reads a file once, in the requested mode.
pub async fn read_file(file: &UploadedFile, mode: ReadMode) -> Result<FilePayload, AuditError> {
    debug!("Reading {:?} as {:?}", file.path, mode);
    match mode {
        ReadMode::Text => {
            let text = tokio::fs::read_to_string(&file.path).await?;
            Ok(FilePayload::Text(text))
        }
        ReadMode::Base64 => {
            let bytes = tokio::fs::read(&file.path).await?;
            let encoded = base64::engine::general_purpose::STANDARD.encode(&bytes);
            Ok(FilePayload::Binary(encoded))
        }
    }
}

/// Strips the scheme/metadata prefix of a data-URL encoding, up to and
/// including the first comma, leaving only the base64 data portion.
/// Non-data-URL input passes through untouched.
pub fn strip_data_url_prefix(data: &str) -> &str {
    if data.starts_with("data:") {
        match data.find(',') {
            Some(idx) => &data[idx + 1..],
            None => data,
        }
    } else {
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_read_file_text() {
        let mut tmp = NamedTempFile::new().unwrap();
        write!(tmp, "contract A {{}}").unwrap();

        let file = UploadedFile::from_path(tmp.path());
        let payload = read_file(&file, ReadMode::Text).await.unwrap();

        assert_eq!(payload, FilePayload::Text("contract A {}".to_string()));
    }

    #[tokio::test]
    async fn test_read_file_base64() {
        let mut tmp = NamedTempFile::new().unwrap();
        tmp.write_all(b"%PDF-1.4").unwrap();

        let file = UploadedFile::from_path(tmp.path());
        let payload = read_file(&file, ReadMode::Base64).await.unwrap();

        let expected = base64::engine::general_purpose::STANDARD.encode(b"%PDF-1.4");
        assert_eq!(payload, FilePayload::Binary(expected));
    }

    #[tokio::test]
    async fn test_read_missing_file_is_io_error() {
        let file = UploadedFile::from_path("/nonexistent/void.txt");
        let result = read_file(&file, ReadMode::Text).await;
        assert!(matches!(result, Err(AuditError::Io(_))));
    }

    #[test]
    fn test_strip_data_url_prefix() {
        assert_eq!(
            strip_data_url_prefix("data:application/pdf;base64,JVBERi0x"),
            "JVBERi0x"
        );
        assert_eq!(strip_data_url_prefix("JVBERi0x"), "JVBERi0x");
    }

    #[test]
    fn test_extension_is_lowercased() {
        let file = UploadedFile::from_path("/tmp/Whitepaper.PDF");
        assert_eq!(file.extension().as_deref(), Some("pdf"));
    }
}
