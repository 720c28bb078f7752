use thiserror::Error;

/// Failure taxonomy for one audit submission.
///
/// Every variant is caught at the orchestrator boundary and shown to the
/// user as a single message. Nothing here is fatal to the process and
/// nothing is retried above the transport layer.
#[derive(Debug, Error)]
pub enum AuditError {
    /// Bad address format or missing file, caught before any I/O.
    #[error("{0}")]
    InvalidInput(String),

    /// Whitepaper extension/MIME type not recognized.
    #[error("Unsupported whitepaper file type: {name}")]
    UnsupportedFileType { name: String },

    /// File read failure. Single-shot reads, so this is terminal for
    /// the submission.
    #[error("File read failed: {0}")]
    Io(#[from] std::io::Error),

    /// Explorer or AI transport/API-level failure, with the upstream
    /// message passed through where one was available.
    #[error("{0}")]
    Upstream(String),

    /// AI output failed validation against the expected result shape.
    #[error("AI response failed validation: {0}")]
    InvalidResponse(String),

    /// Missing credential, detectable before any request is sent.
    #[error("{0}")]
    Configuration(String),
}
