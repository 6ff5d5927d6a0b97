use foxden_core::publisher::Publisher;

use crate::config::Config;
use crate::store::StoreBackend;

/// Shared application state, held behind an `Arc` by the router.
pub struct AppState {
    pub config: Config,
    pub publisher: Publisher<StoreBackend>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let store = StoreBackend::from_config(&config);
        let publisher = Publisher::new(store, config.api_key.clone());
        Self { config, publisher }
    }
}
