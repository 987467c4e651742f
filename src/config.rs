use crate::constants::{
    DEFAULT_MINT_CHAIN, METADATA_FETCH_TIMEOUT_SECS, RPC_PROBE_TIMEOUT_SECS,
};
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub environment: String,

    // RPC
    pub rpc_probe_timeout_secs: u64,
    pub metadata_timeout_secs: u64,

    // Minting
    pub default_mint_chain: String,

    // Optional address for the headless discovery run
    pub owner_address: Option<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Config {
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),

            rpc_probe_timeout_secs: env::var("RPC_PROBE_TIMEOUT_SECS")
                .unwrap_or_else(|_| RPC_PROBE_TIMEOUT_SECS.to_string())
                .parse()?,
            metadata_timeout_secs: env::var("METADATA_FETCH_TIMEOUT_SECS")
                .unwrap_or_else(|_| METADATA_FETCH_TIMEOUT_SECS.to_string())
                .parse()?,

            default_mint_chain: env::var("MELURI_DEFAULT_MINT_CHAIN")
                .unwrap_or_else(|_| DEFAULT_MINT_CHAIN.to_string()),

            owner_address: env::var("MELURI_OWNER_ADDRESS").ok(),
        })
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.rpc_probe_timeout_secs == 0 {
            anyhow::bail!("RPC_PROBE_TIMEOUT_SECS must be > 0");
        }
        if self.metadata_timeout_secs == 0 {
            anyhow::bail!("METADATA_FETCH_TIMEOUT_SECS must be > 0");
        }

        if crate::registry::chain(&self.default_mint_chain).is_none() {
            anyhow::bail!(
                "MELURI_DEFAULT_MINT_CHAIN {} is not a configured chain",
                self.default_mint_chain
            );
        }

        if let Some(owner) = &self.owner_address {
            if owner.parse::<ethers::types::Address>().is_err() {
                anyhow::bail!("MELURI_OWNER_ADDRESS is not a valid address");
            }
        }

        Ok(())
    }

    pub fn is_testnet(&self) -> bool {
        self.environment == "development" || self.environment == "testnet"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            environment: "development".to_string(),
            rpc_probe_timeout_secs: RPC_PROBE_TIMEOUT_SECS,
            metadata_timeout_secs: METADATA_FETCH_TIMEOUT_SECS,
            default_mint_chain: DEFAULT_MINT_CHAIN.to_string(),
            owner_address: None,
        }
    }

    #[test]
    fn default_config_validates() {
        assert!(base_config().validate().is_ok());
        assert!(base_config().is_testnet());
    }

    #[test]
    fn unknown_mint_chain_is_rejected() {
        let mut config = base_config();
        config.default_mint_chain = "999999".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn malformed_owner_address_is_rejected() {
        let mut config = base_config();
        config.owner_address = Some("not-an-address".to_string());
        assert!(config.validate().is_err());
    }
}
