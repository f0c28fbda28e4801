use std::sync::Arc;

use common::MediaStore;
use sea_orm::DatabaseConnection;

use crate::captioner::Captioner;
use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<AppConfig>,
    pub media: Arc<dyn MediaStore>,
    pub captioner: Arc<dyn Captioner>,
    /// Shared HTTP client for outbound calls (avatar fetch).
    pub http: reqwest::Client,
}
