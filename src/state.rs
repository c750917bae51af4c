use std::sync::Arc;

use crate::config::Config;
use crate::database::{mongo::MongoStore, Store};

pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn Store>,
}

impl AppState {
    pub async fn new() -> Arc<Self> {
        let config = Config::load();

        let store = MongoStore::connect(&config)
            .await
            .expect("Database misconfigured!");

        Arc::new(Self {
            config,
            store: Arc::new(store),
        })
    }

    /// Build state around any store implementation. Tests inject the
    /// in-memory one here.
    pub fn with_store(config: Config, store: Arc<dyn Store>) -> Arc<Self> {
        Arc::new(Self { config, store })
    }
}
