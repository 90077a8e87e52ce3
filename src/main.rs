use procurement::config::AppConfig;
use procurement::server::ServerBuilder;
use procurement::storage;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("procurement=info,tower_http=info")),
        )
        .init();

    let config = AppConfig::from_env()?;
    config.validate()?;

    let store = storage::open(&config.database).await?;

    ServerBuilder::new()
        .with_config(config)
        .with_store_arc(store)
        .serve()
        .await
}
