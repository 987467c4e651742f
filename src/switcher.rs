use crate::error::{AppError, Result};
use crate::registry::{self, ChainDescriptor};
use crate::session::SessionManager;
use crate::status::{Severity, StatusSink};
use std::sync::Arc;

/// Terminal outcome of a switch request. A provider failure is the
/// remaining terminal and surfaces as `Err`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchOutcome {
    /// Provider accepted the switch (or it had already taken effect).
    Switched,
    /// The chain was unknown to the wallet; registering it succeeded,
    /// which implicitly switches.
    Registered,
    /// The session was already on the target chain; no provider calls.
    AlreadyActive,
    /// The user declined the switch or the registration prompt.
    Cancelled,
}

/// Drives the wallet through `Idle -> Switching -> terminal` for one
/// target chain. Does not write the session's chain id itself: the
/// provider's chainChanged notification is the source of truth and
/// arrives asynchronously.
pub struct NetworkSwitcher {
    sessions: Arc<SessionManager>,
    status: StatusSink,
}

impl NetworkSwitcher {
    pub fn new(sessions: Arc<SessionManager>, status: StatusSink) -> Self {
        Self { sessions, status }
    }

    pub async fn switch_to_chain(&self, target_chain_id: &str) -> Result<SwitchOutcome> {
        let Some(chain) = registry::chain(target_chain_id) else {
            self.status
                .report(
                    format!("Configuration missing for network ID: {}", target_chain_id),
                    Severity::Error,
                )
                .await;
            return Err(AppError::ChainNotConfigured(target_chain_id.to_string()));
        };

        if self.sessions.active_chain_id().await.as_deref() == Some(chain.chain_id) {
            self.status
                .report(
                    format!("You are already on {}", chain.name),
                    Severity::Info,
                )
                .await;
            return Ok(SwitchOutcome::AlreadyActive);
        }

        let provider = self.sessions.provider()?;

        if self.sessions.is_switching().await {
            return Err(AppError::RequestAlreadyPending);
        }
        self.sessions.set_switching(true).await;
        self.status
            .report(
                format!("Requesting switch to {}...", chain.name),
                Severity::Info,
            )
            .await;

        let result = self.run(provider.as_ref(), chain).await;

        // Mandatory cleanup on every terminal branch, success or not.
        self.sessions.set_switching(false).await;
        result
    }

    async fn run(
        &self,
        provider: &dyn crate::provider::WalletProvider,
        chain: &ChainDescriptor,
    ) -> Result<SwitchOutcome> {
        match provider.switch_chain(chain.chain_id_hex).await {
            Ok(()) => {
                self.status
                    .report(format!("Switched to {}", chain.name), Severity::Success)
                    .await;
                Ok(SwitchOutcome::Switched)
            }
            Err(e) if e.is_network_changed() => {
                // The chain changed underneath the pending call: the
                // switch already happened.
                self.status
                    .report(format!("Switched to {}", chain.name), Severity::Success)
                    .await;
                Ok(SwitchOutcome::Switched)
            }
            Err(e) if e.is_unrecognized_chain() => {
                tracing::info!(
                    "{} unknown to wallet ({}), requesting registration",
                    chain.name,
                    e
                );
                self.register(provider, chain).await
            }
            Err(e) if e.is_user_rejected() => {
                self.status
                    .report("Network switch cancelled", Severity::Info)
                    .await;
                Ok(SwitchOutcome::Cancelled)
            }
            Err(e) => {
                self.status
                    .report(format!("Failed to switch: {}", e.message), Severity::Error)
                    .await;
                Err(AppError::Provider(e.to_string()))
            }
        }
    }

    async fn register(
        &self,
        provider: &dyn crate::provider::WalletProvider,
        chain: &ChainDescriptor,
    ) -> Result<SwitchOutcome> {
        match provider.add_chain(chain.add_chain_params()).await {
            Ok(()) => {
                self.status
                    .report(format!("Added {}", chain.name), Severity::Success)
                    .await;
                Ok(SwitchOutcome::Registered)
            }
            Err(e) if e.is_user_rejected() => {
                self.status
                    .report("Adding network cancelled", Severity::Info)
                    .await;
                Ok(SwitchOutcome::Cancelled)
            }
            Err(e) => {
                self.status
                    .report(format!("Failed to add {}", chain.name), Severity::Error)
                    .await;
                Err(AppError::Provider(e.to_string()))
            }
        }
    }
}
