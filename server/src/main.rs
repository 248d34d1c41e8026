use anyhow::Result;
use std::net::SocketAddr;
use tracing::{info, Level};

use server::http;
use server::storage;

#[tokio::main]
async fn main() -> Result<()> {
    // Pick up local overrides before reading any configuration
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()),
        )
        .init();

    info!("Starting open-env-config server");

    let storage_config = storage::StorageConfig::from_env()?;

    // Directory-backed stores get their root created on first start.
    match &storage_config {
        storage::StorageConfig::Filesystem { root } => {
            info!("Using filesystem backend at {}", root.display());
            std::fs::create_dir_all(root)?;
        }
        storage::StorageConfig::Local { path, .. } => {
            info!("Using local object-store backend at {}", path.display());
            std::fs::create_dir_all(path)?;
        }
        storage::StorageConfig::S3 { bucket, .. } => {
            info!("Using s3 backend with bucket {}", bucket);
        }
        storage::StorageConfig::Sqlite { path } => {
            info!("Using sqlite backend at {}", path.display());
        }
    }

    let backend = storage::build_backend(storage_config)?;
    let provider = storage::Provider::new(backend);

    let addr = std::env::var("BIND_ADDRESS")
        .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
        .parse::<SocketAddr>()?;

    http::start_server(provider, addr).await?;

    Ok(())
}
