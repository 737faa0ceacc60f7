//! Cache-aside role resolution.
//!
//! Roles are read from the cache under `user:roles:<unique id>` and fall back
//! to the user store on a miss, an unreadable entry or a cache failure. A
//! store hit repopulates the cache with the full role set. The cache never
//! fails a lookup on its own; only the store can.
//!
//! Concurrent misses for one user each read the store and each write the
//! cache. The writes carry the same kind of snapshot, so the last one simply
//! stands until the ttl runs out.

use std::{sync::Arc, time::Duration};

use tracing::{debug, instrument, warn};

use bastion_cache::{CacheStore, keys};
use bastion_core::errors::{AppException, USER_NOT_FOUND};
use bastion_db::UserStore;
use bastion_models::Role;
use bastion_observability::track_role_cache;

#[derive(Clone)]
pub struct RoleResolver {
    store: Arc<dyn UserStore>,
    cache: Arc<dyn CacheStore>,
    ttl: Duration,
}

impl RoleResolver {
    pub fn new(store: Arc<dyn UserStore>, cache: Arc<dyn CacheStore>, ttl: Duration) -> Self {
        Self { store, cache, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    #[instrument(skip(self))]
    pub async fn resolve_roles(&self, user_unique_id: i64) -> Result<Vec<Role>, AppException> {
        let key = keys::users::roles(user_unique_id);

        match self.cache.get(&key).await {
            Ok(Some(bytes)) => match serde_json::from_slice::<Vec<Role>>(&bytes) {
                Ok(roles) => {
                    track_role_cache("hit");
                    debug!(cache.key = %key, "Role cache hit");
                    return Ok(roles);
                }
                Err(e) => {
                    track_role_cache("corrupt");
                    warn!(cache.key = %key, error = %e, "Discarding unreadable cached roles");
                }
            },
            Ok(None) => {
                track_role_cache("miss");
                debug!(cache.key = %key, "Role cache miss");
            }
            Err(e) => {
                track_role_cache("error");
                warn!(cache.key = %key, error = %e, "Role cache read failed, using store");
            }
        }

        let user = self.store.find_by_unique_id(user_unique_id).await?.ok_or_else(|| {
            AppException::new(USER_NOT_FOUND)
                .with_detail(format!("no user with unique id {user_unique_id}"))
        })?;
        let roles = user.roles;

        match serde_json::to_vec(&roles) {
            Ok(bytes) => {
                if let Err(e) = self.cache.set(&key, &bytes, self.ttl).await {
                    warn!(cache.key = %key, error = %e, "Failed to cache roles");
                }
            }
            Err(e) => warn!(error = %e, "Failed to encode roles for caching"),
        }

        Ok(roles)
    }
}
