//! End-to-end pipeline tests against mock external capabilities.

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tempfile::TempDir;

use aegis_auditor::llm::NO_WHITEPAPER_MARKER;
use aegis_auditor::{
    AuditError, AuditState, AuditSubmission, ContractAddress, InputMode, MockAiProvider,
    Orchestrator, SourceLookup, UploadedFile,
};
use aegis_auditor::llm::RequestPart;

struct MockExplorer {
    source: Result<&'static str, &'static str>,
    calls: AtomicUsize,
}

impl MockExplorer {
    fn verified(source: &'static str) -> Self {
        Self {
            source: Ok(source),
            calls: AtomicUsize::new(0),
        }
    }

    fn erroring(message: &'static str) -> Self {
        Self {
            source: Err(message),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl SourceLookup for MockExplorer {
    async fn fetch_verified_source(
        &self,
        _address: &ContractAddress,
    ) -> Result<String, AuditError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.source {
            Ok(source) => Ok(source.to_string()),
            Err(message) => Err(AuditError::Upstream(format!("Explorer error: {}", message))),
        }
    }
}

fn write_file(dir: &TempDir, name: &str, content: &[u8]) -> UploadedFile {
    let path = dir.path().join(name);
    let mut f = std::fs::File::create(&path).unwrap();
    f.write_all(content).unwrap();
    UploadedFile::from_path(path)
}

#[tokio::test]
async fn test_address_audit_without_whitepaper_is_two_part_request() {
    let explorer = MockExplorer::verified("contract A{}");
    let provider = MockAiProvider::new();
    let mut orchestrator = Orchestrator::new(&explorer, &provider, 0.1);

    let state = orchestrator
        .submit(AuditSubmission {
            mode: InputMode::Address,
            address: "0x1111111111111111111111111111111111111111".to_string(),
            ..Default::default()
        })
        .await;

    assert!(matches!(state, AuditState::Success(_)));
    assert_eq!(explorer.calls.load(Ordering::SeqCst), 1);

    let request = provider.last_request().unwrap();
    assert_eq!(request.parts.len(), 2);
    match &request.parts[0] {
        RequestPart::Text(text) => assert!(text.contains("contract A{}")),
        other => panic!("expected text part, got {:?}", other),
    }
    assert_eq!(
        request.parts[1],
        RequestPart::Text(NO_WHITEPAPER_MARKER.to_string())
    );
}

#[tokio::test]
async fn test_success_stores_result_field_for_field() {
    let explorer = MockExplorer::verified("contract A{}");
    let provider = MockAiProvider::new();
    let mut orchestrator = Orchestrator::new(&explorer, &provider, 0.1);

    let state = orchestrator
        .submit(AuditSubmission {
            mode: InputMode::Address,
            address: "0x1111111111111111111111111111111111111111".to_string(),
            ..Default::default()
        })
        .await
        .clone();

    let expected =
        aegis_auditor::schemas::parse_analysis(&MockAiProvider::sample_result_json()).unwrap();
    assert_eq!(state, AuditState::Success(expected));
}

#[tokio::test]
async fn test_explorer_error_message_passes_through() {
    let explorer = MockExplorer::erroring("rate limited");
    let provider = MockAiProvider::new();
    let mut orchestrator = Orchestrator::new(&explorer, &provider, 0.1);

    let state = orchestrator
        .submit(AuditSubmission {
            mode: InputMode::Address,
            address: "0x1111111111111111111111111111111111111111".to_string(),
            ..Default::default()
        })
        .await;

    match state {
        AuditState::Failed(msg) => assert!(msg.contains("rate limited")),
        other => panic!("expected Failed, got {:?}", other),
    }
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn test_file_audit_with_text_whitepaper() {
    let dir = TempDir::new().unwrap();
    let contract = write_file(&dir, "Token.sol", b"contract Token {}");
    let whitepaper = write_file(&dir, "paper.md", b"# Tokenomics\nFixed supply.");

    let explorer = MockExplorer::verified("unused");
    let provider = MockAiProvider::new();
    let mut orchestrator = Orchestrator::new(&explorer, &provider, 0.1);

    let state = orchestrator
        .submit(AuditSubmission {
            mode: InputMode::File,
            address: String::new(),
            contract_file: Some(contract),
            whitepaper: Some(whitepaper),
        })
        .await;

    assert!(matches!(state, AuditState::Success(_)));
    assert_eq!(explorer.calls.load(Ordering::SeqCst), 0);

    let request = provider.last_request().unwrap();
    assert_eq!(request.parts.len(), 2);
    match &request.parts[1] {
        RequestPart::Text(text) => assert!(text.contains("Fixed supply.")),
        other => panic!("expected text whitepaper part, got {:?}", other),
    }
}

#[tokio::test]
async fn test_pdf_whitepaper_rides_as_inline_attachment() {
    let dir = TempDir::new().unwrap();
    let contract = write_file(&dir, "Token.sol", b"contract Token {}");
    let whitepaper = write_file(&dir, "paper.pdf", b"%PDF-1.4 fake");

    let explorer = MockExplorer::verified("unused");
    let provider = MockAiProvider::new();
    let mut orchestrator = Orchestrator::new(&explorer, &provider, 0.1);

    let state = orchestrator
        .submit(AuditSubmission {
            mode: InputMode::File,
            address: String::new(),
            contract_file: Some(contract),
            whitepaper: Some(whitepaper),
        })
        .await;

    assert!(matches!(state, AuditState::Success(_)));
    match &provider.last_request().unwrap().parts[1] {
        RequestPart::InlineData { mime_type, data } => {
            assert_eq!(mime_type, "application/pdf");
            assert!(!data.contains(','));
        }
        other => panic!("expected inline data part, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unsupported_whitepaper_fails_before_model_call() {
    let dir = TempDir::new().unwrap();
    let contract = write_file(&dir, "Token.sol", b"contract Token {}");
    let whitepaper = write_file(&dir, "doc.xyz", b"???");

    let explorer = MockExplorer::verified("unused");
    let provider = MockAiProvider::new();
    let mut orchestrator = Orchestrator::new(&explorer, &provider, 0.1);

    let state = orchestrator
        .submit(AuditSubmission {
            mode: InputMode::File,
            address: String::new(),
            contract_file: Some(contract),
            whitepaper: Some(whitepaper),
        })
        .await;

    match state {
        AuditState::Failed(msg) => assert!(msg.contains("doc.xyz")),
        other => panic!("expected Failed, got {:?}", other),
    }
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn test_ai_transport_failure_is_failed_state() {
    let explorer = MockExplorer::verified("contract A{}");
    let provider = MockAiProvider::failing();
    let mut orchestrator = Orchestrator::new(&explorer, &provider, 0.1);

    let state = orchestrator
        .submit(AuditSubmission {
            mode: InputMode::Address,
            address: "0x1111111111111111111111111111111111111111".to_string(),
            ..Default::default()
        })
        .await;

    assert!(matches!(state, AuditState::Failed(_)));
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test]
async fn test_new_submission_clears_prior_failure() {
    let explorer = MockExplorer::verified("contract A{}");
    let provider = MockAiProvider::new();
    let mut orchestrator = Orchestrator::new(&explorer, &provider, 0.1);

    orchestrator
        .submit(AuditSubmission {
            mode: InputMode::Address,
            address: "bad".to_string(),
            ..Default::default()
        })
        .await;
    assert!(matches!(orchestrator.state(), AuditState::Failed(_)));

    let state = orchestrator
        .submit(AuditSubmission {
            mode: InputMode::Address,
            address: "0x1111111111111111111111111111111111111111".to_string(),
            ..Default::default()
        })
        .await;
    assert!(matches!(state, AuditState::Success(_)));
}
