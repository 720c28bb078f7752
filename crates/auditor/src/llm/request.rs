//! Audit request assembly.
//!
//! Parts are ordered: the instruction block with the fenced contract
//! source comes first, then exactly one whitepaper slot. Instructions
//! must precede content for the model to interpret the task correctly,
//! and the whitepaper slot is always present, with an explicit marker
//! when no document was supplied.

use serde_json::Value;

use crate::schemas::response_schema;
use crate::whitepaper::WhitepaperPayload;

/// Emitted in place of a whitepaper when none was supplied.
pub const NO_WHITEPAPER_MARKER: &str = "No whitepaper was provided for this audit.";

const AUDIT_INSTRUCTIONS: &str = r#"You are an expert smart contract security auditor. Analyze the smart contract source code below and produce a structured audit covering:

1. VULNERABILITY SCAN: identify concrete security vulnerabilities (reentrancy, access control gaps, integer overflow, unchecked external calls, delegatecall misuse, and similar). For each, give a name, a severity of Critical, High, Medium, Low or Informational, and a description of the risk.

2. TOKENOMICS ANALYSIS: examine supply mechanics, minting and burning rights, fee structures, and holder protections. State whether the tokenomics would pass common audit standards. If a whitepaper is provided, check the implementation against it.

3. EXCHANGE RED FLAGS: detect properties an exchange listing review would flag, such as owner-controlled pausing, blacklists, hidden mint functions, or upgradeable proxies without timelocks.

4. SUMMARY AND RECOMMENDATION: a concise overall assessment and a clear recommendation for the project team.

5. SAFETY SCORE: a single numeric score from 0 (critically unsafe) to 100 (no issues found) summarizing overall risk.

Report only findings supported by the provided source. Do not speculate about code you cannot see."#;

/// One content part of the multi-part prompt.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestPart {
    Text(String),
    /// Base64 payload with its MIME type, sent as an inline attachment.
    InlineData { mime_type: String, data: String },
}

/// The assembled prompt plus the generation settings that make the
/// audit reproducible: a low sampling temperature and the strict
/// response schema derived from the result model.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditRequest {
    pub parts: Vec<RequestPart>,
    pub temperature: f32,
    pub response_schema: Value,
}

/// Assembles the ordered audit request for one submission.
pub fn build_audit_request(
    contract_source: &str,
    whitepaper: Option<&WhitepaperPayload>,
    temperature: f32,
) -> AuditRequest {
    let instructions = format!(
        "{}\n\nContract source code:\n```\n{}\n```",
        AUDIT_INSTRUCTIONS, contract_source
    );

    let whitepaper_part = match whitepaper {
        None => RequestPart::Text(NO_WHITEPAPER_MARKER.to_string()),
        Some(wp) if wp.is_text => {
            RequestPart::Text(format!("Project whitepaper:\n\n{}", wp.data))
        }
        Some(wp) => RequestPart::InlineData {
            mime_type: wp.mime_type.clone(),
            data: wp.data.clone(),
        },
    };

    AuditRequest {
        parts: vec![RequestPart::Text(instructions), whitepaper_part],
        temperature,
        response_schema: response_schema(),
    }
}
