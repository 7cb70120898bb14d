use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::warn;

use crate::config::Config;
use crate::db::Store;
use crate::services::mailer::{self, Mailer};
use crate::services::tokens::random_secret;
use crate::services::{
    AccessTokens, AuthService, CatalogService, ConfirmationCodes, ReviewService,
    SeaOrmAuthService, SeaOrmCatalogService, SeaOrmReviewService, SeaOrmUserService,
    UserService,
};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub auth_service: Arc<dyn AuthService>,

    pub catalog_service: Arc<dyn CatalogService>,

    pub review_service: Arc<dyn ReviewService>,

    pub user_service: Arc<dyn UserService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let mailer = mailer::from_config(&config.email);
        Self::with_mailer(config, mailer).await
    }

    /// Builds the state with an explicit mail transport.
    pub async fn with_mailer(config: Config, mailer: Arc<dyn Mailer>) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let secret = if config.auth.secret_key.is_empty() {
            warn!(
                "auth.secret_key is not set; using a random key. \
                 Tokens and confirmation codes will not survive a restart"
            );
            random_secret()
        } else {
            config.auth.secret_key.clone()
        };

        let codes = ConfirmationCodes::new(&secret, config.auth.confirmation_code_ttl_hours);
        let tokens = AccessTokens::new(
            &secret,
            &config.auth.issuer,
            config.auth.access_token_ttl_minutes,
        );

        let auth_service = Arc::new(SeaOrmAuthService::new(
            store.clone(),
            codes,
            tokens,
            mailer,
            config.email.clone(),
        )) as Arc<dyn AuthService>;
        let catalog_service =
            Arc::new(SeaOrmCatalogService::new(store.clone())) as Arc<dyn CatalogService>;
        let review_service =
            Arc::new(SeaOrmReviewService::new(store.clone())) as Arc<dyn ReviewService>;
        let user_service = Arc::new(SeaOrmUserService::new(store.clone())) as Arc<dyn UserService>;

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            store,
            auth_service,
            catalog_service,
            review_service,
            user_service,
        })
    }

    pub async fn config(&self) -> Config {
        self.config.read().await.clone()
    }
}
