use std::sync::Arc;

use pricing_engine::PricingEngine;
use upload_store::{StoreError, UploadStore};

use crate::config::{ServerConfig, ServerConfigError};

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ServerConfigError),
    #[error("invalid pricing configuration: {0}")]
    Pricing(#[from] pricing_engine::ConfigError),
    #[error("cannot open upload store: {0}")]
    Store(#[from] StoreError),
}

/// Shared, read-only state handed to every request.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub engine: Arc<PricingEngine>,
    pub store: Arc<UploadStore>,
}

impl AppState {
    /// Validate pricing and open the upload store.
    pub fn new(config: ServerConfig) -> Result<Self, StartupError> {
        let engine = PricingEngine::new(config.pricing)?;
        let store = UploadStore::open(&config.upload_dir)?;
        Ok(Self {
            config: Arc::new(config),
            engine: Arc::new(engine),
            store: Arc::new(store),
        })
    }
}
