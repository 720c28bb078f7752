//! Block explorer verified-source lookup.
//!
//! Etherscan-style API: an HTTP GET selecting the `getsourcecode` action
//! for an address and chain, answered by a JSON envelope with a status
//! flag and a result list. Status "0" is an application-level error whose
//! message rides in the `result` field. The free tier works without an
//! API key.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::ExplorerConfig;
use crate::error::AuditError;
use crate::source::ContractAddress;

/// Seam for the explorer capability, so the pipeline can be exercised
/// without the network.
#[async_trait]
pub trait SourceLookup: Send + Sync {
    /// Returns the verified source text for an address, exactly as the
    /// explorer provides it.
    async fn fetch_verified_source(&self, address: &ContractAddress)
        -> Result<String, AuditError>;
}

#[derive(Debug, Deserialize)]
struct ExplorerEnvelope {
    status: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    result: Value,
}

pub struct EtherscanClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    chain_id: u64,
}

impl EtherscanClient {
    pub fn new(config: &ExplorerConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            chain_id: config.chain_id,
        }
    }

    fn source_from_envelope(envelope: ExplorerEnvelope) -> Result<String, AuditError> {
        if envelope.status == "0" {
            let detail = envelope
                .result
                .as_str()
                .map(str::to_string)
                .unwrap_or(envelope.message);
            warn!("Explorer API error: {}", detail);
            return Err(AuditError::Upstream(format!("Explorer error: {}", detail)));
        }

        let source = envelope
            .result
            .as_array()
            .and_then(|items| items.first())
            .and_then(|item| item.get("SourceCode"))
            .and_then(Value::as_str)
            .ok_or_else(|| {
                AuditError::Upstream("Explorer returned no source code entry".to_string())
            })?;

        if source.is_empty() {
            return Err(AuditError::Upstream(
                "Contract source is not verified on the explorer".to_string(),
            ));
        }

        // May be a multi-file bundle the explorer concatenated; passed
        // through opaque either way.
        Ok(source.to_string())
    }
}

#[async_trait]
impl SourceLookup for EtherscanClient {
    async fn fetch_verified_source(
        &self,
        address: &ContractAddress,
    ) -> Result<String, AuditError> {
        info!("Explorer lookup for {} on chain {}", address, self.chain_id);

        let chain_id = self.chain_id.to_string();
        let mut params = vec![
            ("module", "contract"),
            ("action", "getsourcecode"),
            ("address", address.as_str()),
            ("chainid", chain_id.as_str()),
        ];
        if let Some(ref key) = self.api_key {
            params.push(("apikey", key.as_str()));
        }

        let response = self
            .client
            .get(&self.base_url)
            .query(&params)
            .send()
            .await
            .map_err(|e| AuditError::Upstream(format!("Explorer request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuditError::Upstream(format!(
                "Explorer returned HTTP {}",
                status
            )));
        }

        let envelope: ExplorerEnvelope = response
            .json()
            .await
            .map_err(|e| AuditError::Upstream(format!("Explorer response malformed: {}", e)))?;

        debug!("Explorer status: {}", envelope.status);
        Self::source_from_envelope(envelope)
    }
}
