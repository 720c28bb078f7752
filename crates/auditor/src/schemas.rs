//! Audit result data model and the machine-checked output contract.
//!
//! The serde model below is the single source of truth for the result
//! shape; [`response_schema`] derives the schema descriptor handed to the
//! AI service from the same field set, so the two cannot drift apart
//! independently.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::error::AuditError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeverityLevel {
    Critical,
    High,
    Medium,
    Low,
    Informational,
}

impl SeverityLevel {
    pub const ALL: [SeverityLevel; 5] = [
        SeverityLevel::Critical,
        SeverityLevel::High,
        SeverityLevel::Medium,
        SeverityLevel::Low,
        SeverityLevel::Informational,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SeverityLevel::Critical => "Critical",
            SeverityLevel::High => "High",
            SeverityLevel::Medium => "Medium",
            SeverityLevel::Low => "Low",
            SeverityLevel::Informational => "Informational",
        }
    }
}

impl std::fmt::Display for SeverityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vulnerability {
    pub name: String,
    pub severity: SeverityLevel,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tokenomics {
    pub analysis: String,
    pub passed_audit_standards: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedFlag {
    pub flag: String,
    pub description: String,
}

/// The complete audit report returned by the AI service.
///
/// All six fields are required; absence of any one is a validation
/// failure, never a partially-rendered report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Safety score in [0, 100].
    pub score: f64,
    pub recommendation: String,
    pub summary: String,
    pub vulnerabilities: Vec<Vulnerability>,
    pub tokenomics: Tokenomics,
    pub exchange_red_flags: Vec<RedFlag>,
}

/// Schema descriptor for the AI service's structured-output mode,
/// mirroring the [`AnalysisResult`] serde model field for field.
pub fn response_schema() -> Value {
    let severity_values: Vec<&str> = SeverityLevel::ALL.iter().map(|s| s.as_str()).collect();
    json!({
        "type": "OBJECT",
        "properties": {
            "score": { "type": "NUMBER", "description": "Safety score from 0 to 100" },
            "recommendation": { "type": "STRING" },
            "summary": { "type": "STRING" },
            "vulnerabilities": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "name": { "type": "STRING" },
                        "severity": { "type": "STRING", "enum": severity_values },
                        "description": { "type": "STRING" }
                    },
                    "required": ["name", "severity", "description"]
                }
            },
            "tokenomics": {
                "type": "OBJECT",
                "properties": {
                    "analysis": { "type": "STRING" },
                    "passedAuditStandards": { "type": "BOOLEAN" }
                },
                "required": ["analysis", "passedAuditStandards"]
            },
            "exchangeRedFlags": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "flag": { "type": "STRING" },
                        "description": { "type": "STRING" }
                    },
                    "required": ["flag", "description"]
                }
            }
        },
        "required": [
            "score",
            "recommendation",
            "summary",
            "vulnerabilities",
            "tokenomics",
            "exchangeRedFlags"
        ]
    })
}

/// Parses and validates raw AI output into an [`AnalysisResult`].
///
/// The raw text is trimmed and unwrapped from a code fence if the model
/// added one despite the structured-output mode. Any structural failure
/// is `InvalidResponse`; the offending text is logged for operators but
/// never surfaced verbatim to the end user.
pub fn parse_analysis(raw: &str) -> Result<AnalysisResult, AuditError> {
    let cleaned = strip_code_fences(raw);

    let result: AnalysisResult = serde_json::from_str(cleaned).map_err(|e| {
        debug!("Unparseable AI response: {}", raw);
        AuditError::InvalidResponse(e.to_string())
    })?;

    if !(0.0..=100.0).contains(&result.score) {
        debug!("AI response with out-of-range score: {}", raw);
        return Err(AuditError::InvalidResponse(format!(
            "safety score {} outside [0, 100]",
            result.score
        )));
    }

    Ok(result)
}

fn strip_code_fences(text: &str) -> &str {
    let mut s = text.trim();
    if let Some(rest) = s.strip_prefix("```json") {
        s = rest;
    } else if let Some(rest) = s.strip_prefix("```") {
        s = rest;
    } else {
        return s;
    }
    if let Some(rest) = s.trim_end().strip_suffix("```") {
        s = rest;
    }
    s.trim()
}
