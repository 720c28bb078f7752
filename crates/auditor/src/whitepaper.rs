//! Whitepaper payload construction.
//!
//! Classification is extension-first, then declared MIME type. There is
//! deliberately no magic-byte sniffing: a file whose name and MIME type
//! both say nothing is rejected rather than guessed at.

use tracing::debug;

use crate::error::AuditError;
use crate::files::{read_file, strip_data_url_prefix, FilePayload, ReadMode, UploadedFile};

/// OOXML word-processing MIME type, the declared type of `.docx` uploads.
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

pub const PDF_MIME: &str = "application/pdf";

/// Normalized whitepaper content ready to attach to an audit request.
#[derive(Debug, Clone, PartialEq)]
pub struct WhitepaperPayload {
    /// Raw text, or base64 with no data-URL prefix.
    pub data: String,
    pub mime_type: String,
    pub is_text: bool,
}

/// Builds the optional whitepaper payload for a submission.
///
/// No file selected produces `None`; the request builder emits an explicit
/// "no whitepaper" marker in that case rather than omitting the slot.
pub async fn build_whitepaper_payload(
    file: Option<&UploadedFile>,
) -> Result<Option<WhitepaperPayload>, AuditError> {
    let Some(file) = file else {
        return Ok(None);
    };

    let ext = file.extension();
    let mime = file.mime_type.as_deref().unwrap_or("");
    debug!("Classifying whitepaper {:?} (mime: {:?})", file.name, mime);

    let is_text = matches!(ext.as_deref(), Some("txt") | Some("md")) || mime.starts_with("text/");
    if is_text {
        let FilePayload::Text(text) = read_file(file, ReadMode::Text).await? else {
            unreachable!("text mode read returned binary payload");
        };
        let mime_type = if mime.is_empty() {
            "text/plain".to_string()
        } else {
            mime.to_string()
        };
        return Ok(Some(WhitepaperPayload {
            data: text,
            mime_type,
            is_text: true,
        }));
    }

    let binary_mime = if ext.as_deref() == Some("pdf") || mime == PDF_MIME {
        PDF_MIME
    } else if ext.as_deref() == Some("docx") || mime == DOCX_MIME {
        DOCX_MIME
    } else {
        return Err(AuditError::UnsupportedFileType {
            name: file.name.clone(),
        });
    };

    let FilePayload::Binary(encoded) = read_file(file, ReadMode::Base64).await? else {
        unreachable!("base64 mode read returned text payload");
    };
    Ok(Some(WhitepaperPayload {
        data: strip_data_url_prefix(&encoded).to_string(),
        mime_type: binary_mime.to_string(),
        is_text: false,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, content: &[u8]) -> UploadedFile {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content).unwrap();
        UploadedFile::from_path(path)
    }

    #[tokio::test]
    async fn test_no_file_produces_nothing() {
        let payload = build_whitepaper_payload(None).await.unwrap();
        assert!(payload.is_none());
    }

    #[tokio::test]
    async fn test_txt_extension_decodes_as_text_verbatim() {
        let dir = TempDir::new().unwrap();
        let file = write_file(&dir, "doc.txt", b"Our token vests over 4 years.");

        let payload = build_whitepaper_payload(Some(&file)).await.unwrap().unwrap();
        assert!(payload.is_text);
        assert_eq!(payload.data, "Our token vests over 4 years.");
        assert_eq!(payload.mime_type, "text/plain");
    }

    #[tokio::test]
    async fn test_declared_text_mime_wins_for_unknown_extension() {
        let dir = TempDir::new().unwrap();
        let file = write_file(&dir, "notes.rst", b"tokenomics notes")
            .with_mime_type("text/x-rst");

        let payload = build_whitepaper_payload(Some(&file)).await.unwrap().unwrap();
        assert!(payload.is_text);
        assert_eq!(payload.mime_type, "text/x-rst");
    }

    #[tokio::test]
    async fn test_pdf_decodes_as_base64_without_prefix() {
        let dir = TempDir::new().unwrap();
        let file = write_file(&dir, "report.pdf", b"%PDF-1.4 fake");

        let payload = build_whitepaper_payload(Some(&file)).await.unwrap().unwrap();
        assert!(!payload.is_text);
        assert_eq!(payload.mime_type, PDF_MIME);

        let expected = base64::engine::general_purpose::STANDARD.encode(b"%PDF-1.4 fake");
        assert_eq!(payload.data, expected);
        assert!(!payload.data.contains(','));
    }

    #[tokio::test]
    async fn test_docx_gets_ooxml_mime() {
        let dir = TempDir::new().unwrap();
        let file = write_file(&dir, "paper.docx", b"PK\x03\x04");

        let payload = build_whitepaper_payload(Some(&file)).await.unwrap().unwrap();
        assert!(!payload.is_text);
        assert_eq!(payload.mime_type, DOCX_MIME);
    }

    #[tokio::test]
    async fn test_unrecognized_type_is_rejected_by_name() {
        let dir = TempDir::new().unwrap();
        let file = write_file(&dir, "doc.xyz", b"???");

        let err = build_whitepaper_payload(Some(&file)).await.unwrap_err();
        match err {
            AuditError::UnsupportedFileType { name } => assert_eq!(name, "doc.xyz"),
            other => panic!("expected UnsupportedFileType, got {:?}", other),
        }
    }
}
