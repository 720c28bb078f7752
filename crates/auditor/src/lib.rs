//! Aegis Auditor - AI-Assisted Smart Contract Audit Pipeline
//!
//! Orchestrates one audit submission end to end: resolve contract source
//! (explorer lookup by address, or a local file), optionally attach a
//! whitepaper document, send a structured multi-part prompt to the AI
//! audit service, and validate the returned JSON into an
//! [`AnalysisResult`] ready for rendering.

pub mod config;
pub mod error;
pub mod explorer;
pub mod files;
pub mod llm;
pub mod orchestrator;
pub mod report;
pub mod schemas;
pub mod source;
pub mod whitepaper;

pub use config::{AuditConfig, ExplorerConfig};
pub use error::AuditError;
pub use explorer::{EtherscanClient, SourceLookup};
pub use files::{FilePayload, ReadMode, UploadedFile};
pub use llm::{AiProvider, GeminiProvider, MockAiProvider};
pub use orchestrator::{AuditPhase, AuditState, AuditSubmission, Orchestrator};
pub use report::{render_report, ReportFormat};
pub use schemas::{AnalysisResult, RedFlag, SeverityLevel, Tokenomics, Vulnerability};
pub use source::{ContractAddress, InputMode};
pub use whitepaper::{build_whitepaper_payload, WhitepaperPayload};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
