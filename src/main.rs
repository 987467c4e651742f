use ethers::types::Address;
use meluri_client::config::Config;
use meluri_client::discovery::NftDiscovery;
use meluri_client::registry;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "meluri_client=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    config.validate()?;

    tracing::info!("starting meluri-client ({})", config.environment);
    tracing::info!(
        "{} supported chains, {} with a deployed contract",
        registry::SUPPORTED_CHAINS.len(),
        registry::chains_with_contract().count()
    );

    match config.owner_address.as_deref() {
        Some(raw) => {
            let owner: Address = raw
                .parse()
                .map_err(|_| anyhow::anyhow!("invalid owner address: {}", raw))?;
            tracing::info!("scanning chains for tokens owned by {:?}", owner);

            let discovery = NftDiscovery::new(&config);
            let records = discovery.load_owned_tokens(owner).await;
            if records.is_empty() {
                tracing::info!("no tokens found for {:?}", owner);
            }
            for record in records {
                tracing::info!(
                    "token {} \"{}\" on {} (image: {})",
                    record.token_id,
                    record.name,
                    registry::chain_name(&record.chain_id),
                    record.image.as_deref().unwrap_or("none")
                );
            }
        }
        None => {
            tracing::info!(
                "set MELURI_OWNER_ADDRESS to scan the supported chains for owned tokens"
            );
        }
    }

    Ok(())
}
