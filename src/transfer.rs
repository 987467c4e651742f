use crate::constants::{DEFAULT_TRANSFER_FEE, SETTLEMENT_ESTIMATE, TRANSFER_GAS_LIMIT};
use crate::contract::{MeluriNft, TransferCrossChainCall};
use crate::error::{AppError, Result};
use crate::models::TransferIntent;
use crate::registry::{self, ChainDescriptor};
use crate::rpc::RpcConnector;
use crate::session::SessionManager;
use crate::status::{Severity, StatusSink};
use ethers::abi::AbiEncode;
use ethers::types::{Address, Bytes, TransactionRequest, H256, U256};
use ethers::utils::parse_ether;
use std::sync::Arc;

/// Resolves the routing parameter for a transfer. Destination-keyed
/// only: the hub uses the zero-address convention, every other chain
/// must have a routing token configured. A missing routing token is a
/// configuration error, not a transient one.
pub fn resolve_routing_token(destination: &ChainDescriptor) -> Result<Address> {
    if destination.hub {
        return Ok(Address::zero());
    }
    destination
        .routing_token_address()
        .ok_or_else(|| AppError::UnroutableDestination(destination.chain_id.to_string()))
}

/// Resolves the native amount attached to the transfer call. Source-keyed
/// only: each chain's fee is sized to its gas economics, with a
/// conservative default for unlisted sources. Mixing this key with the
/// routing key produces a transfer that reverts or strands funds.
pub fn resolve_fee_amount(source_chain_id: &str) -> U256 {
    let fee = registry::transfer_fee(source_chain_id);
    parse_ether(fee).unwrap_or_else(|_| {
        tracing::error!("unparseable fee entry {} for chain {}", fee, source_chain_id);
        parse_ether(DEFAULT_TRANSFER_FEE).unwrap_or_default()
    })
}

/// Route validity, independent of wallet state: destination selected,
/// both ends configured, different chains, same routing group, and the
/// destination actually runs the contract.
pub(crate) fn check_route(
    source: &ChainDescriptor,
    destination: &ChainDescriptor,
) -> Result<()> {
    if source.chain_id == destination.chain_id {
        return Err(AppError::BadRequest(
            "Destination chain must differ from the token's chain".to_string(),
        ));
    }
    if source.group != destination.group {
        return Err(AppError::UnroutableDestination(
            destination.chain_id.to_string(),
        ));
    }
    if destination.contract_address().is_none() {
        return Err(AppError::UnroutableDestination(
            destination.chain_id.to_string(),
        ));
    }
    Ok(())
}

fn validate_intent(
    intent: &TransferIntent,
) -> Result<(&'static ChainDescriptor, &'static ChainDescriptor)> {
    let destination_id = intent
        .destination_chain_id
        .as_deref()
        .ok_or(AppError::MissingDestination)?;
    let source = registry::chain(&intent.token.chain_id)
        .ok_or_else(|| AppError::ChainNotConfigured(intent.token.chain_id.clone()))?;
    let destination = registry::chain(destination_id)
        .ok_or_else(|| AppError::ChainNotConfigured(destination_id.to_string()))?;
    check_route(source, destination)?;
    Ok((source, destination))
}

/// Maps a wallet-provider failure during submission onto the error
/// taxonomy: user-declined, actionable network mismatch, or on-chain
/// failure with the reason verbatim.
pub(crate) fn classify_submit_error(
    error: crate::provider::ProviderError,
    expected_chain: &str,
    active_chain: &str,
) -> AppError {
    if error.is_user_rejected() {
        AppError::UserRejected
    } else if error.is_network_changed() {
        AppError::WrongNetwork {
            active: active_chain.to_string(),
            expected: expected_chain.to_string(),
        }
    } else {
        AppError::OnChain(error.message)
    }
}

/// Drives one cross-chain move: parameter resolution, live ownership
/// verification, submission through the wallet, confirmation await.
/// Never switches chains itself; the caller runs the network switcher
/// first.
pub struct TransferOrchestrator {
    sessions: Arc<SessionManager>,
    connector: RpcConnector,
    status: StatusSink,
}

impl TransferOrchestrator {
    pub fn new(sessions: Arc<SessionManager>, connector: RpcConnector, status: StatusSink) -> Self {
        Self {
            sessions,
            connector,
            status,
        }
    }

    pub async fn transfer(&self, intent: &TransferIntent) -> Result<H256> {
        let (source, destination) = validate_intent(intent)?;

        let active_chain = self
            .sessions
            .active_chain_id()
            .await
            .ok_or(AppError::NotConnected)?;
        if active_chain != source.chain_id {
            self.status
                .report(
                    format!(
                        "Please switch to {} in your wallet to transfer this NFT",
                        source.name
                    ),
                    Severity::Error,
                )
                .await;
            return Err(AppError::WrongNetwork {
                active: active_chain,
                expected: source.chain_id.to_string(),
            });
        }
        let owner = self
            .sessions
            .active_address()
            .await
            .ok_or(AppError::NotConnected)?;

        self.status.report("Preparing transfer...", Severity::Info).await;

        let contract_address = source
            .contract_address()
            .ok_or_else(|| AppError::ChainNotConfigured(source.chain_id.to_string()))?;
        let routing_token = resolve_routing_token(destination)?;
        let fee = resolve_fee_amount(source.chain_id);
        let receiver = intent.receiver.unwrap_or(owner);

        // The local record can be stale relative to chain state; verify
        // ownership against the chain immediately before submission.
        let provider = self.connector.connect(source).await?;
        let reader = MeluriNft::new(contract_address, Arc::new(provider));
        let on_chain_owner = reader
            .owner_of(intent.token.token_id)
            .call()
            .await
            .map_err(|e| AppError::Rpc(e.to_string()))?;
        if on_chain_owner != owner {
            return Err(AppError::NotOwner(intent.token.token_id.to_string()));
        }

        self.status
            .report("Initiating cross-chain transfer...", Severity::Info)
            .await;

        let calldata = TransferCrossChainCall {
            token_id: intent.token.token_id,
            receiver,
            destination: routing_token,
        }
        .encode();
        let tx = TransactionRequest::new()
            .from(owner)
            .to(contract_address)
            .data(Bytes::from(calldata))
            .value(fee)
            .gas(TRANSFER_GAS_LIMIT);

        let wallet = self.sessions.provider()?;
        self.status.report("Sending transaction...", Severity::Info).await;
        let tx_hash = wallet
            .send_transaction(tx)
            .await
            .map_err(|e| classify_submit_error(e, source.chain_id, &active_chain))?;

        self.status
            .report(
                "Transaction submitted. Waiting for confirmation...",
                Severity::Info,
            )
            .await;
        let receipt = wallet
            .wait_for_transaction(tx_hash)
            .await
            .map_err(|e| classify_submit_error(e, source.chain_id, &active_chain))?;
        if let Err(e) = crate::contract::ensure_succeeded(&receipt) {
            self.status
                .report("Transfer transaction reverted on-chain", Severity::Error)
                .await;
            return Err(e);
        }

        // The destination-chain mint happens asynchronously, off-client.
        self.status
            .report(
                format!(
                    "NFT transfer initiated! It will arrive in {}.",
                    SETTLEMENT_ESTIMATE
                ),
                Severity::Success,
            )
            .await;
        tracing::info!(
            "transfer of token {} submitted: {:?}",
            intent.token.token_id,
            tx_hash
        );
        Ok(tx_hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::RPC_PROBE_TIMEOUT_SECS;
    use crate::models::NftRecord;
    use crate::provider::mock::MockProvider;
    use crate::provider::ProviderError;
    use std::time::Duration;

    fn record_on(chain_id: &str) -> NftRecord {
        NftRecord {
            token_id: U256::from(7u64),
            name: "Dragon".to_string(),
            image: None,
            chain_id: chain_id.to_string(),
            tx_hash: None,
        }
    }

    fn intent(origin: &str, destination: Option<&str>) -> TransferIntent {
        TransferIntent {
            token: record_on(origin),
            destination_chain_id: destination.map(str::to_string),
            receiver: None,
        }
    }

    async fn orchestrator_on(chain_hex: &str) -> TransferOrchestrator {
        let mock = Arc::new(MockProvider::new(chain_hex));
        let status = StatusSink::new();
        let sessions = Arc::new(SessionManager::new(
            Some(mock as Arc<dyn crate::provider::WalletProvider>),
            status.clone(),
        ));
        sessions.connect().await.unwrap();
        TransferOrchestrator::new(
            sessions,
            RpcConnector::new(Duration::from_secs(RPC_PROBE_TIMEOUT_SECS)),
            status,
        )
    }

    #[test]
    fn routing_token_is_destination_keyed_only() {
        let hub = registry::chain("7001").unwrap();
        let bsc = registry::chain("97").unwrap();
        let fuji = registry::chain("43113").unwrap();

        // Transfers into the hub use the zero-address convention,
        // whatever the source.
        assert_eq!(resolve_routing_token(hub).unwrap(), Address::zero());

        // Transfers into a connected chain use that chain's routing
        // token, whatever the source.
        let expected: Address = "0xd97B1de3619ed2c6BEb3860147E30cA8A7dC9891".parse().unwrap();
        assert_eq!(resolve_routing_token(bsc).unwrap(), expected);
        assert_ne!(
            resolve_routing_token(bsc).unwrap(),
            resolve_routing_token(fuji).unwrap()
        );
    }

    #[test]
    fn missing_routing_token_is_a_configuration_error() {
        let mut orphan = *registry::chain("97").unwrap();
        orphan.routing_token = None;
        assert!(matches!(
            resolve_routing_token(&orphan),
            Err(AppError::UnroutableDestination(_))
        ));

        orphan.routing_token = Some("0x0000000000000000000000000000000000000000");
        assert!(matches!(
            resolve_routing_token(&orphan),
            Err(AppError::UnroutableDestination(_))
        ));
    }

    #[test]
    fn fee_amount_is_source_keyed_only() {
        assert_eq!(resolve_fee_amount("7001"), parse_ether("0.5").unwrap());
        assert_eq!(resolve_fee_amount("97"), parse_ether("0.01").unwrap());
        assert_eq!(resolve_fee_amount("1001"), parse_ether("20.0").unwrap());
        // Unlisted source falls back to the conservative default.
        assert_eq!(
            resolve_fee_amount("424242"),
            parse_ether(DEFAULT_TRANSFER_FEE).unwrap()
        );
    }

    #[test]
    fn cross_group_route_is_rejected() {
        let source = registry::chain("97").unwrap();
        let mut foreign = *registry::chain("43113").unwrap();
        foreign.group = "other-bridge";
        assert!(matches!(
            check_route(source, &foreign),
            Err(AppError::UnroutableDestination(_))
        ));
    }

    #[test]
    fn same_chain_route_is_rejected() {
        let source = registry::chain("97").unwrap();
        assert!(matches!(
            check_route(source, source),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn route_to_chain_without_contract_is_rejected() {
        let source = registry::chain("97").unwrap();
        let mut bare = *registry::chain("43113").unwrap();
        bare.contract = None;
        assert!(matches!(
            check_route(source, &bare),
            Err(AppError::UnroutableDestination(_))
        ));
    }

    #[tokio::test]
    async fn missing_destination_fails_first() {
        let orchestrator = orchestrator_on("0x61").await;
        let result = orchestrator.transfer(&intent("97", None)).await;
        assert!(matches!(result, Err(AppError::MissingDestination)));
    }

    #[tokio::test]
    async fn wrong_network_fails_before_submission() {
        // Wallet on BSC testnet, token lives on the hub.
        let orchestrator = orchestrator_on("0x61").await;
        let result = orchestrator.transfer(&intent("7001", Some("97"))).await;
        match result {
            Err(AppError::WrongNetwork { active, expected }) => {
                assert_eq!(active, "97");
                assert_eq!(expected, "7001");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn submit_errors_reclassify_into_the_taxonomy() {
        let rejected = classify_submit_error(ProviderError::new(4001, "denied"), "97", "97");
        assert!(matches!(rejected, AppError::UserRejected));

        let mismatch = classify_submit_error(
            ProviderError::new(None, "underlying network changed"),
            "97",
            "7001",
        );
        assert!(matches!(mismatch, AppError::WrongNetwork { .. }));

        let revert = classify_submit_error(
            ProviderError::new(None, "execution reverted: token escrowed"),
            "97",
            "97",
        );
        match revert {
            AppError::OnChain(reason) => assert!(reason.contains("token escrowed")),
            other => panic!("unexpected: {:?}", other),
        }
    }
}
