use std::sync::Arc;

use crate::bias::BiasEngine;
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Stateless engine; shared, never locked.
    pub engine: Arc<BiasEngine>,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            engine: Arc::new(BiasEngine::new(config.engine_config())),
            config,
        }
    }
}
