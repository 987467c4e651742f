use crate::constants::{
    ERR_INTERNAL_UNRECOGNIZED, ERR_REQUEST_PENDING, ERR_UNRECOGNIZED_CHAIN, ERR_USER_REJECTED,
};
use async_trait::async_trait;
use ethers::types::{Address, TransactionReceipt, TransactionRequest, H256};
use serde::Serialize;
use tokio::sync::broadcast;

/// Error surfaced by the injected wallet provider. Carries the EIP-1193
/// numeric code when the provider supplied one; some providers only put
/// the signal in the message text.
#[derive(Debug, Clone, thiserror::Error)]
#[error("provider error {code:?}: {message}")]
pub struct ProviderError {
    pub code: Option<i64>,
    pub message: String,
}

impl ProviderError {
    pub fn new(code: impl Into<Option<i64>>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn is_user_rejected(&self) -> bool {
        self.code == Some(ERR_USER_REJECTED)
    }

    pub fn is_request_pending(&self) -> bool {
        self.code == Some(ERR_REQUEST_PENDING)
    }

    /// The target chain has not been added to the wallet. Providers signal
    /// this with at least two distinct codes, and some only via the message.
    pub fn is_unrecognized_chain(&self) -> bool {
        matches!(
            self.code,
            Some(ERR_UNRECOGNIZED_CHAIN) | Some(ERR_INTERNAL_UNRECOGNIZED)
        ) || self.message.contains("Unrecognized chain")
    }

    /// The active chain changed underneath a pending call. The switch
    /// already took effect, so callers reclassify this as success.
    pub fn is_network_changed(&self) -> bool {
        self.message.contains("network changed")
    }
}

/// Push notification from the wallet provider.
#[derive(Debug, Clone)]
pub enum ProviderEvent {
    AccountsChanged(Vec<Address>),
    /// Hex-encoded chain id, e.g. "0x61".
    ChainChanged(String),
    Disconnected,
}

#[derive(Debug, Clone, Serialize)]
pub struct CurrencyParams {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// EIP-3085 `wallet_addEthereumChain` request body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddChainParams {
    pub chain_id: String,
    pub chain_name: String,
    pub native_currency: CurrencyParams,
    pub rpc_urls: Vec<String>,
    pub block_explorer_urls: Vec<String>,
}

/// The injected wallet boundary: a request/response surface plus a push
/// event surface. The client only consumes it; writes (transactions,
/// chain switches) always go through the wallet so the human stays in
/// the approval loop.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError>;

    /// Hex-encoded id of the wallet's active chain.
    async fn chain_id(&self) -> Result<String, ProviderError>;

    async fn switch_chain(&self, chain_id_hex: &str) -> Result<(), ProviderError>;

    async fn add_chain(&self, params: AddChainParams) -> Result<(), ProviderError>;

    async fn send_transaction(&self, tx: TransactionRequest) -> Result<H256, ProviderError>;

    async fn wait_for_transaction(&self, tx_hash: H256)
        -> Result<TransactionReceipt, ProviderError>;

    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent>;
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrecognized_chain_covers_both_code_conventions() {
        assert!(ProviderError::new(4902, "nope").is_unrecognized_chain());
        assert!(ProviderError::new(-32603, "internal").is_unrecognized_chain());
        assert!(ProviderError::new(None, "Unrecognized chain ID 0xa869").is_unrecognized_chain());
        assert!(!ProviderError::new(4001, "rejected").is_unrecognized_chain());
    }

    #[test]
    fn network_changed_detected_from_message() {
        let err = ProviderError::new(None, "underlying network changed (event=\"changed\")");
        assert!(err.is_network_changed());
        assert!(!err.is_user_rejected());
    }
}
