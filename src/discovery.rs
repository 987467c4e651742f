use crate::config::Config;
use crate::contract::MeluriNft;
use crate::error::{AppError, Result};
use crate::models::{NftRecord, TokenMetadata};
use crate::registry::{self, ChainDescriptor};
use crate::rpc::RpcConnector;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use ethers::providers::Middleware;
use ethers::types::{Address, U256};
use std::time::Duration;

const DATA_URI_BASE64_PREFIX: &str = "data:application/json;base64,";
const DATA_URI_PREFIX: &str = "data:application/json";

/// Aggregates the active identity's tokens across every chain with a
/// deployed contract. Failures are isolated per chain and per token:
/// one dead endpoint or one malformed metadata blob never blocks the
/// rest of the result.
pub struct NftDiscovery {
    connector: RpcConnector,
    http: reqwest::Client,
    metadata_timeout: Duration,
}

impl NftDiscovery {
    pub fn new(config: &Config) -> Self {
        Self {
            connector: RpcConnector::from_config(config),
            http: reqwest::Client::new(),
            metadata_timeout: Duration::from_secs(config.metadata_timeout_secs),
        }
    }

    /// Union of owned tokens in chain-iteration order, then token-index
    /// order within each chain. Partial results are expected: chains
    /// with no reachable endpoint are skipped with a warning.
    pub async fn load_owned_tokens(&self, owner: Address) -> Vec<NftRecord> {
        self.load_from_chains(registry::chains_with_contract(), owner)
            .await
    }

    pub(crate) async fn load_from_chains<'a>(
        &self,
        chains: impl IntoIterator<Item = &'a ChainDescriptor>,
        owner: Address,
    ) -> Vec<NftRecord> {
        let mut all = Vec::new();
        for chain in chains {
            match self.scan_chain(chain, owner).await {
                Ok(mut records) => {
                    tracing::info!("{}: {} token(s)", chain.name, records.len());
                    all.append(&mut records);
                }
                Err(e) => tracing::warn!("skipping {}: {}", chain.name, e),
            }
        }
        all
    }

    async fn scan_chain(
        &self,
        chain: &ChainDescriptor,
        owner: Address,
    ) -> Result<Vec<NftRecord>> {
        let Some(contract_address) = chain.contract_address() else {
            return Ok(Vec::new());
        };

        let provider = self.connector.connect(chain).await?;

        // The registry can list an address before the deployment exists.
        let code = provider
            .get_code(contract_address, None)
            .await
            .map_err(|e| AppError::Rpc(e.to_string()))?;
        if code.as_ref().is_empty() {
            tracing::debug!("contract not deployed on {}", chain.name);
            return Ok(Vec::new());
        }

        let contract = MeluriNft::new(contract_address, std::sync::Arc::new(provider));
        let balance = contract
            .balance_of(owner)
            .call()
            .await
            .map_err(|e| AppError::Rpc(e.to_string()))?;

        let mut records = Vec::new();
        let count = balance.min(U256::from(u64::MAX)).as_u64();
        for index in 0..count {
            let token_id = match contract
                .token_of_owner_by_index(owner, U256::from(index))
                .call()
                .await
            {
                Ok(id) => id,
                Err(e) => {
                    tracing::warn!("{}: token index {} unreadable: {}", chain.name, index, e);
                    continue;
                }
            };

            let mut record = match contract.token_uri(token_id).call().await {
                Ok(uri) => self.resolve_metadata(token_id, &uri).await,
                Err(e) => {
                    tracing::debug!("{}: tokenURI({}) failed: {}", chain.name, token_id, e);
                    NftRecord::placeholder(token_id, chain.chain_id)
                }
            };
            record.chain_id = chain.chain_id.to_string();
            records.push(record);
        }

        Ok(records)
    }

    /// Never fails: unusable metadata degrades to a placeholder record.
    async fn resolve_metadata(&self, token_id: U256, uri: &str) -> NftRecord {
        match self.parse_token_uri(uri).await {
            Ok(metadata) => NftRecord {
                token_id,
                name: metadata
                    .name
                    .unwrap_or_else(|| format!("NFT #{}", token_id)),
                image: metadata.image,
                chain_id: String::new(),
                tx_hash: None,
            },
            Err(e) => {
                tracing::debug!("metadata for token {} unusable: {}", token_id, e);
                NftRecord::placeholder(token_id, "")
            }
        }
    }

    async fn parse_token_uri(&self, uri: &str) -> Result<TokenMetadata> {
        if let Some(payload) = uri.strip_prefix(DATA_URI_BASE64_PREFIX) {
            let raw = BASE64
                .decode(payload)
                .map_err(|e| AppError::Metadata(e.to_string()))?;
            return serde_json::from_slice(&raw).map_err(|e| AppError::Metadata(e.to_string()));
        }

        if uri.starts_with(DATA_URI_PREFIX) {
            let payload = uri
                .splitn(2, ',')
                .nth(1)
                .ok_or_else(|| AppError::Metadata("data URI without payload".to_string()))?;
            return serde_json::from_str(payload).map_err(|e| AppError::Metadata(e.to_string()));
        }

        let response = tokio::time::timeout(self.metadata_timeout, self.http.get(uri).send())
            .await
            .map_err(|_| AppError::Metadata(format!("metadata fetch timed out: {}", uri)))?
            .map_err(|e| AppError::Metadata(e.to_string()))?;
        response
            .json::<TokenMetadata>()
            .await
            .map_err(|e| AppError::Metadata(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{METADATA_FETCH_TIMEOUT_SECS, RPC_PROBE_TIMEOUT_SECS};

    fn discovery() -> NftDiscovery {
        NftDiscovery {
            connector: RpcConnector::new(Duration::from_secs(RPC_PROBE_TIMEOUT_SECS)),
            http: reqwest::Client::new(),
            metadata_timeout: Duration::from_secs(METADATA_FETCH_TIMEOUT_SECS),
        }
    }

    #[tokio::test]
    async fn unreachable_chains_are_skipped_without_raising() {
        let mut first = registry::SUPPORTED_CHAINS[0];
        first.rpc_url = "http://127.0.0.1:9";
        first.fallback_rpc_urls = &[];
        let mut second = registry::SUPPORTED_CHAINS[4];
        second.rpc_url = "http://127.0.0.1:9";
        second.fallback_rpc_urls = &[];

        let discovery = NftDiscovery {
            connector: RpcConnector::new(Duration::from_secs(1)),
            http: reqwest::Client::new(),
            metadata_timeout: Duration::from_secs(1),
        };
        let records = discovery
            .load_from_chains([&first, &second], Address::zero())
            .await;
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn embedded_base64_metadata_parses() {
        let metadata = serde_json::json!({
            "name": "Dragon",
            "description": "AI Generated NFT",
            "image": "https://example.com/dragon.png"
        });
        let uri = format!(
            "data:application/json;base64,{}",
            BASE64.encode(metadata.to_string())
        );

        let record = discovery().resolve_metadata(U256::from(5u64), &uri).await;
        assert_eq!(record.name, "Dragon");
        assert_eq!(record.image.as_deref(), Some("https://example.com/dragon.png"));
    }

    #[tokio::test]
    async fn plain_data_uri_metadata_parses() {
        let uri = r#"data:application/json,{"name":"Inline","image":null}"#;
        let record = discovery().resolve_metadata(U256::from(9u64), uri).await;
        assert_eq!(record.name, "Inline");
        assert!(record.image.is_none());
    }

    #[tokio::test]
    async fn malformed_metadata_degrades_to_placeholder() {
        let uri = "data:application/json;base64,!!!not-base64!!!";
        let record = discovery().resolve_metadata(U256::from(12u64), uri).await;
        assert_eq!(record.name, "NFT #12");
        assert!(record.image.is_none());
    }

    #[tokio::test]
    async fn metadata_without_name_falls_back_to_token_id() {
        let uri = format!(
            "data:application/json;base64,{}",
            BASE64.encode(r#"{"image":"ipfs://x"}"#)
        );
        let record = discovery().resolve_metadata(U256::from(3u64), &uri).await;
        assert_eq!(record.name, "NFT #3");
        assert_eq!(record.image.as_deref(), Some("ipfs://x"));
    }
}
