//! Top-level audit workflow.
//!
//! One submission flows Idle → Submitting → {Success, Failed}, and the
//! next submission resets the machine. All steps run sequentially on one
//! logical task; there is no concurrent submission support, and a second
//! submit while one is in flight is rejected cooperatively rather than
//! queued or cancelled.

use tracing::{info, warn};

use crate::error::AuditError;
use crate::explorer::SourceLookup;
use crate::files::UploadedFile;
use crate::llm::provider::AiProvider;
use crate::llm::request::build_audit_request;
use crate::schemas::{parse_analysis, AnalysisResult};
use crate::source::{InputMode, SourceResolver};
use crate::whitepaper::build_whitepaper_payload;

/// Human-readable progress label for the in-flight submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditPhase {
    ResolvingSource,
    ReadingWhitepaper,
    ContactingModel,
}

impl AuditPhase {
    pub fn label(&self) -> &'static str {
        match self {
            AuditPhase::ResolvingSource => "Resolving contract source...",
            AuditPhase::ReadingWhitepaper => "Reading whitepaper...",
            AuditPhase::ContactingModel => "Contacting AI audit service...",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AuditState {
    Idle,
    Submitting(AuditPhase),
    Success(AnalysisResult),
    Failed(String),
}

/// One audit submission's inputs, request-scoped.
#[derive(Debug, Clone, Default)]
pub struct AuditSubmission {
    pub mode: InputMode,
    pub address: String,
    pub contract_file: Option<UploadedFile>,
    pub whitepaper: Option<UploadedFile>,
}

pub struct Orchestrator<'a> {
    lookup: &'a dyn SourceLookup,
    provider: &'a dyn AiProvider,
    temperature: f32,
    state: AuditState,
}

impl<'a> Orchestrator<'a> {
    pub fn new(lookup: &'a dyn SourceLookup, provider: &'a dyn AiProvider, temperature: f32) -> Self {
        Self {
            lookup,
            provider,
            temperature,
            state: AuditState::Idle,
        }
    }

    pub fn state(&self) -> &AuditState {
        &self.state
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.state, AuditState::Submitting(_))
    }

    /// Returns the machine to Idle, discarding any prior result or error.
    pub fn reset(&mut self) {
        self.state = AuditState::Idle;
    }

    /// Runs one submission to completion and returns the final state.
    ///
    /// The submit affordance is expected to be disabled while Submitting;
    /// this guard backs that up cooperatively for the single actor.
    pub async fn submit(&mut self, submission: AuditSubmission) -> &AuditState {
        if self.is_submitting() {
            warn!("Submission rejected: one is already in flight");
            return &self.state;
        }

        // Clear prior error/result before starting.
        self.state = AuditState::Submitting(AuditPhase::ResolvingSource);

        self.state = match self.run(submission).await {
            Ok(result) => AuditState::Success(result),
            Err(e) => AuditState::Failed(e.to_string()),
        };
        &self.state
    }

    fn enter_phase(&mut self, phase: AuditPhase) {
        info!("{}", phase.label());
        self.state = AuditState::Submitting(phase);
    }

    async fn run(&mut self, submission: AuditSubmission) -> Result<AnalysisResult, AuditError> {
        self.enter_phase(AuditPhase::ResolvingSource);
        let resolver = SourceResolver::new(self.lookup);
        let source = resolver
            .resolve(
                submission.mode,
                &submission.address,
                submission.contract_file.as_ref(),
            )
            .await?;

        self.enter_phase(AuditPhase::ReadingWhitepaper);
        let whitepaper = build_whitepaper_payload(submission.whitepaper.as_ref()).await?;

        self.enter_phase(AuditPhase::ContactingModel);
        let request = build_audit_request(&source, whitepaper.as_ref(), self.temperature);
        let raw = self.provider.generate(&request).await?;

        parse_analysis(&raw)
    }
}
