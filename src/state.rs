use std::sync::Arc;

use axum::extract::FromRef;

use bastion_auth::TokenService;
use bastion_cache::CacheStore;
use bastion_config::AppConfig;
use bastion_db::UserStore;

use crate::modules::users::{roles::RoleResolver, service::UserService};

/// Shared handles, built once at startup and cloned into every request.
#[derive(Clone, FromRef)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub tokens: Arc<TokenService>,
    pub users: UserService,
    pub roles: RoleResolver,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        store: Arc<dyn UserStore>,
        cache: Arc<dyn CacheStore>,
    ) -> Self {
        let tokens = Arc::new(TokenService::new(&config.jwt));
        let roles = RoleResolver::new(store.clone(), cache, config.cache.role_ttl());
        let users = UserService::new(store, tokens.clone());

        Self {
            config: Arc::new(config),
            tokens,
            users,
            roles,
        }
    }
}
