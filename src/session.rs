use crate::error::{AppError, Result};
use crate::provider::{ProviderEvent, WalletProvider};
use crate::registry;
use crate::status::{Severity, StatusSink};
use ethers::types::Address;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

/// The one connected identity. The single piece of mutable shared state
/// in the client: read by discovery and the transfer orchestrator,
/// written here and (for the switching flag) by the network switcher.
#[derive(Debug, Clone, Default)]
pub struct WalletSession {
    pub address: Option<Address>,
    /// Decimal string, keyed the same way as the chain registry.
    pub chain_id: Option<String>,
    /// True while a network switch is in flight; suppresses competing
    /// switch requests.
    pub switching: bool,
}

/// Owns the wallet connection lifecycle: connect, disconnect, and
/// reconciliation of externally-triggered account/chain changes.
pub struct SessionManager {
    provider: Option<Arc<dyn WalletProvider>>,
    session: Arc<RwLock<WalletSession>>,
    status: StatusSink,
    subscribed: AtomicBool,
}

impl SessionManager {
    /// `provider: None` models the missing-wallet-extension case.
    pub fn new(provider: Option<Arc<dyn WalletProvider>>, status: StatusSink) -> Self {
        Self {
            provider,
            session: Arc::new(RwLock::new(WalletSession::default())),
            status,
            subscribed: AtomicBool::new(false),
        }
    }

    pub(crate) fn provider(&self) -> Result<Arc<dyn WalletProvider>> {
        self.provider.clone().ok_or(AppError::NoProviderFound)
    }

    pub async fn snapshot(&self) -> WalletSession {
        self.session.read().await.clone()
    }

    pub async fn active_address(&self) -> Option<Address> {
        self.session.read().await.address
    }

    pub async fn active_chain_id(&self) -> Option<String> {
        self.session.read().await.chain_id.clone()
    }

    pub async fn is_switching(&self) -> bool {
        self.session.read().await.switching
    }

    pub(crate) async fn set_switching(&self, switching: bool) {
        self.session.write().await.switching = switching;
    }

    /// Requests account access from the injected provider and populates
    /// the session on success.
    pub async fn connect(&self) -> Result<(Address, String)> {
        let provider = match self.provider() {
            Ok(provider) => provider,
            Err(e) => {
                self.status
                    .report(
                        format!(
                            "No wallet found. Install one at {}",
                            crate::constants::WALLET_INSTALL_URL
                        ),
                        Severity::Error,
                    )
                    .await;
                return Err(e);
            }
        };
        self.status.report("Connecting to wallet...", Severity::Info).await;

        let accounts = provider.request_accounts().await.map_err(|e| {
            if e.is_user_rejected() {
                AppError::UserRejected
            } else if e.is_request_pending() {
                AppError::RequestAlreadyPending
            } else {
                AppError::Provider(e.to_string())
            }
        })?;
        let address = *accounts
            .first()
            .ok_or_else(|| AppError::Provider("No accounts found".to_string()))?;

        let chain_hex = provider
            .chain_id()
            .await
            .map_err(|e| AppError::Provider(e.to_string()))?;
        let chain_id = decimal_chain_id(&chain_hex)?;

        {
            let mut session = self.session.write().await;
            session.address = Some(address);
            session.chain_id = Some(chain_id.clone());
        }

        self.status
            .report("Wallet connected successfully!", Severity::Success)
            .await;
        tracing::info!("wallet connected: {:?} on chain {}", address, chain_id);
        Ok((address, chain_id))
    }

    /// Clears the session locally. Wallets do not support remote
    /// disconnect, so this is all there is; idempotent.
    pub async fn disconnect(&self) {
        Self::clear_session(&self.session, &self.status).await;
    }

    /// Subscribes once to the provider's push events. Repeated calls are
    /// de-duplicated.
    pub fn observe_provider_events(&self) {
        let Ok(provider) = self.provider() else {
            return;
        };
        if self.subscribed.swap(true, Ordering::SeqCst) {
            return;
        }

        let mut rx = provider.subscribe();
        let session = Arc::clone(&self.session);
        let status = self.status.clone();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => Self::apply_event(&session, &status, event).await,
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        tracing::warn!("missed {} provider events", missed);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
    }

    /// Applies one provider notification to the session. Never fails;
    /// malformed payloads are logged and dropped.
    pub(crate) async fn apply_event(
        session: &Arc<RwLock<WalletSession>>,
        status: &StatusSink,
        event: ProviderEvent,
    ) {
        match event {
            ProviderEvent::AccountsChanged(accounts) => match accounts.first() {
                None => Self::clear_session(session, status).await,
                Some(address) => {
                    let changed = {
                        let mut session = session.write().await;
                        if session.address != Some(*address) {
                            session.address = Some(*address);
                            true
                        } else {
                            false
                        }
                    };
                    if changed {
                        status.report("Account changed", Severity::Info).await;
                    }
                }
            },
            ProviderEvent::ChainChanged(chain_hex) => {
                // Authoritative: this is the source of truth for the
                // active chain, and it terminates any in-flight switch.
                match decimal_chain_id(&chain_hex) {
                    Ok(chain_id) => {
                        {
                            let mut session = session.write().await;
                            session.chain_id = Some(chain_id.clone());
                            session.switching = false;
                        }
                        let name = registry::chain_name(&chain_id);
                        status
                            .report(format!("Switched to {}", name), Severity::Info)
                            .await;
                    }
                    Err(e) => {
                        tracing::error!("unparseable chainChanged payload {}: {}", chain_hex, e);
                        session.write().await.switching = false;
                    }
                }
            }
            ProviderEvent::Disconnected => Self::clear_session(session, status).await,
        }
    }

    async fn clear_session(session: &Arc<RwLock<WalletSession>>, status: &StatusSink) {
        *session.write().await = WalletSession::default();
        status.report("Wallet disconnected", Severity::Info).await;
    }
}

/// Parses a hex-encoded chain id ("0x61") into the decimal string form
/// used as the registry key ("97").
pub(crate) fn decimal_chain_id(chain_id_hex: &str) -> Result<String> {
    let trimmed = chain_id_hex.trim_start_matches("0x");
    u64::from_str_radix(trimmed, 16)
        .map(|id| id.to_string())
        .map_err(|_| AppError::Provider(format!("invalid chain id {}", chain_id_hex)))
}
