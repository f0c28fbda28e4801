use std::path::PathBuf;
use std::sync::Arc;

use common::storage::filesystem::FilesystemMediaStore;
use common::storage::s3::S3MediaStore;
use common::MediaStore;
use tracing::info;
use tracing_subscriber::EnvFilter;

use server::captioner::GeminiCaptioner;
use server::config::{AppConfig, StorageBackend};
use server::database::init_db;
use server::state::AppState;
use server::{build_router, seed};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load()?;

    let db = init_db(&config.database.url).await?;
    seed::ensure_indexes(&db).await?;
    seed::ensure_guest_user(&db, &config.seed).await?;

    let media = build_media_store(&config).await?;
    let http = reqwest::Client::new();
    let captioner = Arc::new(GeminiCaptioner::new(&config.captioner, http.clone()));

    let addr = format!("{}:{}", config.server.host, config.server.port);

    let state = AppState {
        db,
        config: Arc::new(config),
        media,
        captioner,
        http,
    };

    let app = build_router(state);

    info!("Server running at http://{}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn build_media_store(config: &AppConfig) -> anyhow::Result<Arc<dyn MediaStore>> {
    let max = config.storage.max_image_size;
    match config.storage.backend {
        StorageBackend::Filesystem => {
            let root = PathBuf::from(&config.storage.root);
            Ok(Arc::new(FilesystemMediaStore::new(root, max).await?))
        }
        StorageBackend::S3 => {
            let s3 = config.storage.s3.as_ref().ok_or_else(|| {
                anyhow::anyhow!("storage.backend is 's3' but [storage.s3] is missing")
            })?;
            Ok(Arc::new(S3MediaStore::new(s3, max)?))
        }
    }
}
