use ethers::types::{Address, H256, U256};
use serde::Deserialize;

/// One token owned by the active identity. Token ids come straight from
/// the chain and may exceed 64 bits, hence `U256`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NftRecord {
    pub token_id: U256,
    pub name: String,
    pub image: Option<String>,
    pub chain_id: String,
    pub tx_hash: Option<H256>,
}

impl NftRecord {
    /// Fallback record used when a token's metadata cannot be resolved.
    pub fn placeholder(token_id: U256, chain_id: &str) -> Self {
        Self {
            token_id,
            name: format!("NFT #{}", token_id),
            image: None,
            chain_id: chain_id.to_string(),
            tx_hash: None,
        }
    }
}

/// ERC-721 metadata as served by `tokenURI`, embedded or remote.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenMetadata {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// Ephemeral request describing one cross-chain move. Discarded after the
/// transfer is submitted or the flow is cancelled.
#[derive(Debug, Clone)]
pub struct TransferIntent {
    pub token: NftRecord,
    pub destination_chain_id: Option<String>,
    /// Defaults to the active identity's own address.
    pub receiver: Option<Address>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_carries_token_id_and_no_image() {
        let record = NftRecord::placeholder(U256::from(42u64), "97");
        assert_eq!(record.name, "NFT #42");
        assert_eq!(record.chain_id, "97");
        assert!(record.image.is_none());
    }

    #[test]
    fn metadata_tolerates_missing_fields() {
        let meta: TokenMetadata = serde_json::from_str("{}").unwrap();
        assert!(meta.name.is_none());
        assert!(meta.image.is_none());
    }
}
