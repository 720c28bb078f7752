//! Contract source resolution.
//!
//! Source text comes from one of two places, selected by the form's input
//! mode: a verified-source lookup against the block explorer, or a local
//! file decoded as text. Address validation happens before any network
//! call is attempted.

use std::fmt;

use tracing::{debug, info};

use crate::error::AuditError;
use crate::explorer::SourceLookup;
use crate::files::{read_file, FilePayload, ReadMode, UploadedFile};

/// How the contract source is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Address,
    File,
}

/// A validated EVM contract address: `0x` followed by exactly 40 hex digits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractAddress(String);

impl ContractAddress {
    pub fn parse(input: &str) -> Result<Self, AuditError> {
        let trimmed = input.trim();
        let valid = trimmed
            .strip_prefix("0x")
            .map(|hex| hex.len() == 40 && hex.chars().all(|c| c.is_ascii_hexdigit()))
            .unwrap_or(false);

        if !valid {
            return Err(AuditError::InvalidInput(
                "Please enter a valid contract address (0x followed by 40 hex characters)"
                    .to_string(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContractAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resolves contract source text for one submission.
pub struct SourceResolver<'a> {
    lookup: &'a dyn SourceLookup,
}

impl<'a> SourceResolver<'a> {
    pub fn new(lookup: &'a dyn SourceLookup) -> Self {
        Self { lookup }
    }

    /// Produces the contract source text, or fails.
    ///
    /// In address mode the address is validated first; an invalid address
    /// never reaches the explorer. The returned source is passed through
    /// exactly as the explorer provides it, which for multi-file contracts
    /// may be a bundle the explorer concatenated. It is not reinterpreted
    /// here.
    pub async fn resolve(
        &self,
        mode: InputMode,
        address: &str,
        file: Option<&UploadedFile>,
    ) -> Result<String, AuditError> {
        match mode {
            InputMode::Address => {
                let address = ContractAddress::parse(address)?;
                info!("Fetching verified source for {}", address);
                self.lookup.fetch_verified_source(&address).await
            }
            InputMode::File => {
                let file = file.ok_or_else(|| {
                    AuditError::InvalidInput("Please select a contract source file".to_string())
                })?;
                debug!("Reading contract source from {:?}", file.path);
                // Contract files are always text, no MIME sniffing needed.
                match read_file(file, ReadMode::Text).await? {
                    FilePayload::Text(text) => Ok(text),
                    FilePayload::Binary(_) => unreachable!("text read returned binary"),
                }
            }
        }
    }
}
