//! Application context shared by pages, forms and the CLI

use std::sync::Arc;

use crate::api::{ApiClient, ApiResult};
use crate::config::Config;
use crate::session::AuthStore;
use crate::storage::{FileStorage, Storage};

/// Configuration, session store and API client wired together
#[derive(Clone)]
pub struct App {
    pub config: Arc<Config>,
    pub session: AuthStore,
    pub client: ApiClient,
}

impl App {
    /// Build an app that persists the session in the configured file
    pub fn new(config: Config) -> ApiResult<Self> {
        let storage = Arc::new(FileStorage::new(config.session.file.clone()));
        Self::with_storage(config, storage)
    }

    pub fn with_storage(config: Config, storage: Arc<dyn Storage>) -> ApiResult<Self> {
        let session = AuthStore::new(storage);
        let client = ApiClient::new(&config.api, session.clone())?;

        tracing::debug!(api = %client.base_url(), "App initialized");

        Ok(Self {
            config: Arc::new(config),
            session,
            client,
        })
    }

    /// Hydrate the session store unless already done
    pub async fn ensure_hydrated(&self) {
        if !self.session.is_hydrated().await {
            self.session.hydrate().await;
        }
    }
}
