use std::sync::Arc;

use crate::{
    auth::repo::UserStore,
    config::AppConfig,
    db::PgStore,
    restaurants::repo::RestaurantStore,
    reviews::{moderation::ModerationWorkflow, repo::ReviewStore},
};

/// Shared by every handler. Stores are built once at startup and live for the whole process.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserStore>,
    pub restaurants: Arc<dyn RestaurantStore>,
    pub reviews: Arc<dyn ReviewStore>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let store = Arc::new(PgStore::connect(&config).await?);

        if let Err(e) = store.migrate().await {
            tracing::warn!(error = %e, "migration failed; continuing");
        }

        Ok(Self::from_store(config, store))
    }

    pub fn from_store<S>(config: Arc<AppConfig>, store: Arc<S>) -> Self
    where
        S: UserStore + RestaurantStore + ReviewStore + 'static,
    {
        Self {
            config,
            users: store.clone(),
            restaurants: store.clone(),
            reviews: store,
        }
    }

    pub fn moderation(&self) -> ModerationWorkflow<'_> {
        ModerationWorkflow::new(self.restaurants.as_ref(), self.reviews.as_ref())
    }
}
