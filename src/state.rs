use std::sync::Arc;

use crate::config::Config;
use crate::db::{self, PgStore};
use crate::session::Session;
use crate::store::Store;

pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn Store>,
}

impl AppState {
    pub async fn connect(config: Config) -> anyhow::Result<Arc<Self>> {
        let pool = db::connect(&config).await?;
        Ok(Self::with_store(config, Arc::new(PgStore::new(pool))))
    }

    pub fn with_store(config: Config, store: Arc<dyn Store>) -> Arc<Self> {
        Arc::new(Self { config, store })
    }

    pub fn session(&self) -> Session {
        Session::from(&self.config.session)
    }
}
