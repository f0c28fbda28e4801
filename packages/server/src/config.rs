use common::storage::s3::S3Config;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_expiry_hours: i64,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Filesystem,
    S3,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Root directory for the filesystem backend.
    pub root: String,
    /// Upload size cap in bytes.
    pub max_image_size: u64,
    /// Required when `backend = "s3"`.
    pub s3: Option<S3Config>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CaptionerConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AvatarConfig {
    /// Unsplash API access key. Without one, registration uses the static
    /// placeholder avatar.
    pub unsplash_access_key: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SeedConfig {
    pub guest_enabled: bool,
    pub guest_email: String,
    pub guest_password: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
    pub captioner: CaptionerConfig,
    #[serde(default)]
    pub avatar: AvatarConfig,
    pub seed: SeedConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8000)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            .set_default("auth.token_expiry_hours", 24)?
            .set_default("storage.backend", "filesystem")?
            .set_default("storage.root", "data/media")?
            .set_default("storage.max_image_size", 10 * 1024 * 1024)?
            .set_default("captioner.api_key", "")?
            .set_default("captioner.model", "gemini-2.5-flash")?
            .set_default(
                "captioner.base_url",
                "https://generativelanguage.googleapis.com",
            )?
            .set_default("seed.guest_enabled", false)?
            .set_default("seed.guest_email", "guest@sharely.app")?
            .set_default("seed.guest_password", "guest1234")?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., SHARELY__AUTH__JWT_SECRET)
            .add_source(Environment::with_prefix("SHARELY").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
