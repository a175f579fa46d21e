mod core;
mod features;
mod modules;
mod shared;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::core::config::Config;
use crate::core::server::{bind_listener, build_router, AppServices};
use crate::features::buckets::BucketService;
use crate::features::objects::ObjectService;
use crate::features::remote::RemoteFileService;
use crate::modules::storage::{MinIOClient, ObjectStore};

fn main() -> anyhow::Result<()> {
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        });

    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .enable_all()
        .build()?
        .block_on(run(worker_threads))
}

async fn run(worker_threads: usize) -> anyhow::Result<()> {
    // .env must be loaded before the subscriber reads RUST_LOG
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;
    tracing::info!(
        "Starting storage gateway: workers={}, pid={}",
        worker_threads,
        std::process::id()
    );

    let minio = MinIOClient::new(config.minio.clone()).context("Failed to initialize MinIO client")?;
    tracing::info!("MinIO client targeting {}", minio.endpoint());
    let store: Arc<dyn ObjectStore> = Arc::new(minio);

    let services = AppServices {
        buckets: Arc::new(BucketService::new(
            Arc::clone(&store),
            config.minio.public_read_on_create,
        )),
        objects: Arc::new(ObjectService::new(
            store,
            config.minio.max_presigned_expiry_secs,
        )),
        remote: Arc::new(
            RemoteFileService::new(&config.remote).context("Failed to build remote HTTP client")?,
        ),
    };

    let app = build_router(&config, services);

    let addr: SocketAddr = config
        .app
        .server_address()
        .parse()
        .context("Invalid HOST/PORT")?;
    let listener = bind_listener(addr)?;

    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
