use crate::constants::DEFAULT_MINT_DESCRIPTION;
use crate::contract::{self, MintCall, TransferFilter};
use crate::error::{AppError, Result};
use crate::registry;
use crate::session::SessionManager;
use crate::status::{Severity, StatusSink};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use ethers::abi::{AbiEncode, RawLog};
use ethers::contract::EthLogDecode;
use ethers::types::{Address, Bytes, TransactionReceipt, TransactionRequest, H256, U256};

/// Everything needed to mint one token. The image reference is already
/// produced by the (external) generation backend: a URL or data URI.
#[derive(Debug, Clone)]
pub struct MintRequest {
    pub name: String,
    pub description: Option<String>,
    pub image: String,
    pub chain_id: String,
}

/// Result of a confirmed mint. The token id comes from the receipt's
/// Transfer event and is `None` when the log is missing; discovery will
/// still pick the token up on the next scan.
#[derive(Debug, Clone)]
pub struct MintOutcome {
    pub tx_hash: H256,
    pub token_id: Option<U256>,
    pub chain_id: String,
}

/// Mints a token on the selected chain through the wallet provider.
pub struct MintService {
    sessions: std::sync::Arc<SessionManager>,
    status: StatusSink,
}

impl MintService {
    pub fn new(sessions: std::sync::Arc<SessionManager>, status: StatusSink) -> Self {
        Self { sessions, status }
    }

    pub async fn mint(&self, request: &MintRequest) -> Result<MintOutcome> {
        if request.name.trim().is_empty() {
            return Err(AppError::BadRequest("NFT name is required".to_string()));
        }
        if request.image.trim().is_empty() {
            return Err(AppError::BadRequest("An image is required".to_string()));
        }

        let chain = registry::chain(&request.chain_id)
            .ok_or_else(|| AppError::ChainNotConfigured(request.chain_id.clone()))?;
        let contract_address = chain
            .contract_address()
            .ok_or_else(|| AppError::ChainNotConfigured(chain.chain_id.to_string()))?;

        let active_chain = self
            .sessions
            .active_chain_id()
            .await
            .ok_or(AppError::NotConnected)?;
        if active_chain != chain.chain_id {
            self.status
                .report(
                    format!("Please switch to {} before minting", chain.name),
                    Severity::Error,
                )
                .await;
            return Err(AppError::WrongNetwork {
                active: active_chain,
                expected: chain.chain_id.to_string(),
            });
        }
        let owner = self
            .sessions
            .active_address()
            .await
            .ok_or(AppError::NotConnected)?;

        let uri = metadata_uri(
            &request.name,
            request.description.as_deref(),
            &request.image,
        );

        self.status
            .report("Minting NFT... Please confirm in wallet", Severity::Info)
            .await;

        let calldata = MintCall {
            to: owner,
            uri,
        }
        .encode();
        let tx = TransactionRequest::new()
            .from(owner)
            .to(contract_address)
            .data(Bytes::from(calldata));

        let wallet = self.sessions.provider()?;
        let tx_hash = wallet.send_transaction(tx).await.map_err(|e| {
            if e.is_user_rejected() {
                AppError::UserRejected
            } else {
                AppError::OnChain(e.message)
            }
        })?;

        self.status
            .report(
                "Transaction submitted. Waiting for confirmation...",
                Severity::Info,
            )
            .await;
        let receipt = wallet
            .wait_for_transaction(tx_hash)
            .await
            .map_err(|e| AppError::OnChain(e.message))?;
        if let Err(e) = contract::ensure_succeeded(&receipt) {
            self.status
                .report("Mint transaction reverted on-chain", Severity::Error)
                .await;
            return Err(e);
        }

        let token_id = token_id_from_receipt(&receipt);
        if token_id.is_none() {
            tracing::warn!("could not extract token id from receipt {:?}", tx_hash);
        }
        let shown = token_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "Unknown".to_string());

        self.status
            .report(
                format!("NFT minted successfully! Token ID: {}", shown),
                Severity::Success,
            )
            .await;

        Ok(MintOutcome {
            tx_hash,
            token_id,
            chain_id: chain.chain_id.to_string(),
        })
    }
}

/// ERC-721 metadata embedded as a base64 data URI, so no off-chain
/// storage is involved in minting.
pub fn metadata_uri(name: &str, description: Option<&str>, image: &str) -> String {
    let metadata = serde_json::json!({
        "name": name,
        "description": description.unwrap_or(DEFAULT_MINT_DESCRIPTION),
        "image": image,
        "attributes": [
            { "trait_type": "AI Generated", "value": "Yes" },
            { "trait_type": "Created", "value": chrono::Utc::now().to_rfc3339() },
        ],
    });
    format!(
        "data:application/json;base64,{}",
        BASE64.encode(metadata.to_string())
    )
}

/// Finds the mint's Transfer event (from the zero address) in the
/// receipt and extracts the token id.
pub(crate) fn token_id_from_receipt(receipt: &TransactionReceipt) -> Option<U256> {
    for log in &receipt.logs {
        let raw = RawLog {
            topics: log.topics.clone(),
            data: log.data.to_vec(),
        };
        if let Ok(event) = TransferFilter::decode_log(&raw) {
            if event.from == Address::zero() {
                return Some(event.token_id);
            }
        }
    }
    None
}
