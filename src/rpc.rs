use crate::config::Config;
use crate::error::{AppError, Result};
use crate::registry::ChainDescriptor;
use ethers::providers::{Http, Middleware, Provider};
use std::future::Future;
use std::time::Duration;
use url::Url;

/// Walks an ordered candidate list and returns the first one the probe
/// accepts within the timeout. The one fallback idiom in the client,
/// shared by anything that selects among redundant endpoints.
pub async fn first_reachable<T, U, F, Fut>(
    candidates: impl IntoIterator<Item = T>,
    probe: F,
    probe_timeout: Duration,
) -> Option<U>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = Option<U>>,
{
    for candidate in candidates {
        match tokio::time::timeout(probe_timeout, probe(candidate)).await {
            Ok(Some(ready)) => return Some(ready),
            Ok(None) => continue,
            Err(_) => continue, // probe timed out, next candidate
        }
    }
    None
}

/// Establishes read connections to chains, falling through each chain's
/// ordered endpoint list until one answers a liveness probe.
#[derive(Debug, Clone)]
pub struct RpcConnector {
    probe_timeout: Duration,
}

impl RpcConnector {
    pub fn new(probe_timeout: Duration) -> Self {
        Self { probe_timeout }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(Duration::from_secs(config.rpc_probe_timeout_secs))
    }

    pub async fn connect(&self, chain: &ChainDescriptor) -> Result<Provider<Http>> {
        let urls = std::iter::once(chain.rpc_url).chain(chain.fallback_rpc_urls.iter().copied());

        let provider = first_reachable(
            urls,
            |url| async move {
                if Url::parse(url).is_err() {
                    tracing::debug!("skipping malformed RPC URL {}", url);
                    return None;
                }
                let provider = match Provider::<Http>::try_from(url) {
                    Ok(provider) => provider,
                    Err(e) => {
                        tracing::debug!("cannot build provider for {}: {}", url, e);
                        return None;
                    }
                };
                match provider.get_block_number().await {
                    Ok(_) => {
                        tracing::debug!("connected to {}", url);
                        Some(provider)
                    }
                    Err(e) => {
                        tracing::debug!("RPC {} failed liveness probe: {}", url, e);
                        None
                    }
                }
            },
            self.probe_timeout,
        )
        .await;

        provider.ok_or_else(|| {
            AppError::Rpc(format!("no reachable RPC endpoint for {}", chain.name))
        })
    }
}
