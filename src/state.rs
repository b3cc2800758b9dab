use crate::certificate::Compositor;
use crate::config::AppConfig;
use crate::storage::{ArtifactStore, StorageError};

/// Shared application state handed to every handler.
#[derive(Debug)]
pub struct AppState {
    pub config: AppConfig,
    pub compositor: Compositor,
}

impl AppState {
    /// Prepare the uploads directory and wire the certificate pipeline.
    pub fn new(config: AppConfig) -> Result<Self, StorageError> {
        let store = ArtifactStore::init(&config.uploads_dir)?;
        let compositor = Compositor::new(store, config.render_timeout);
        Ok(Self { config, compositor })
    }
}
