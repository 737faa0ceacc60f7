//! Test doubles and fixtures, behind the `test-utils` feature.
//!
//! ```ignore
//! let store = Arc::new(InMemoryUserStore::new().with_user(seeded_admin()));
//! let state = test_state(store.clone(), Arc::new(MemoryCache::new()));
//! let app = init_router(state, None);
//! ```

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;

use bastion_cache::{CacheError, CacheStore};
use bastion_config::AppConfig;
use bastion_core::password;
use bastion_db::{RepoError, UserStore};
use bastion_models::{Role, RoleCode, User};

use crate::state::AppState;

pub const TEST_JWT_SECRET: &str = "bastion-test-secret";
pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "123456";
pub const ADMIN_UNIQUE_ID: i64 = 1001;

/// `UserStore` over a map, counting every lookup.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: Mutex<HashMap<i64, User>>,
    calls: AtomicUsize,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(self, user: User) -> Self {
        self.insert(user);
        self
    }

    pub fn insert(&self, user: User) {
        self.lock().insert(user.unique_id, user);
    }

    pub fn remove(&self, unique_id: i64) -> Option<User> {
        self.lock().remove(&unique_id)
    }

    /// Replaces the roles of a stored user, as an admin edit would.
    pub fn set_roles(&self, unique_id: i64, roles: Vec<Role>) {
        if let Some(user) = self.lock().get_mut(&unique_id) {
            user.roles = roles;
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<i64, User>> {
        self.users.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_unique_id(&self, unique_id: i64) -> Result<Option<User>, RepoError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.lock().get(&unique_id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.lock().values().find(|u| u.email == email).cloned())
    }
}

/// Store that never answers; for deadline tests.
#[derive(Debug, Default)]
pub struct StalledUserStore;

#[async_trait]
impl UserStore for StalledUserStore {
    async fn find_by_unique_id(&self, _unique_id: i64) -> Result<Option<User>, RepoError> {
        std::future::pending().await
    }

    async fn find_by_email(&self, _email: &str) -> Result<Option<User>, RepoError> {
        std::future::pending().await
    }
}

/// Cache whose reads return bytes that are not a role list.
#[derive(Debug, Default)]
pub struct CorruptingCache {
    writes: Mutex<Vec<String>>,
}

impl CorruptingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys written so far, in order.
    pub fn writes(&self) -> Vec<String> {
        self.writes
            .lock()
            .map(|w| w.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

#[async_trait]
impl CacheStore for CorruptingCache {
    async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        Ok(Some(b"{not json".to_vec()))
    }

    async fn set(&self, key: &str, _value: &[u8], _ttl: Duration) -> Result<(), CacheError> {
        if let Ok(mut writes) = self.writes.lock() {
            writes.push(key.to_string());
        }
        Ok(())
    }

    async fn delete(&self, _key: &str) -> Result<(), CacheError> {
        Ok(())
    }
}

/// Cache where every call fails.
#[derive(Debug, Default)]
pub struct FailingCache;

#[async_trait]
impl CacheStore for FailingCache {
    async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        Err(CacheError::Unavailable("cache is down".into()))
    }

    async fn set(&self, _key: &str, _value: &[u8], _ttl: Duration) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("cache is down".into()))
    }

    async fn delete(&self, _key: &str) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("cache is down".into()))
    }
}

pub fn role(id: i64, code: RoleCode) -> Role {
    Role {
        id,
        code,
        name: code.display_name().to_string(),
        created_at: None,
        updated_at: None,
        version: 0,
    }
}

/// A user with a salted hash of `raw_password` (low bcrypt cost).
pub fn user_with_password(unique_id: i64, email: &str, raw_password: &str, roles: Vec<Role>) -> User {
    let salt = password::generate_salt(password::DEFAULT_SALT_SIZE);
    let hashed = password::hash_with_cost(raw_password, &salt, 4)
        .unwrap_or_else(|e| panic!("failed to hash test password: {e}"));

    User {
        id: unique_id,
        unique_id,
        email: email.to_string(),
        mobile: String::new(),
        password: hashed,
        salt,
        nickname: email.split('@').next().unwrap_or_default().to_string(),
        avatar_url: String::new(),
        created_at: None,
        updated_at: None,
        version: 0,
        roles,
    }
}

/// The admin account every environment is seeded with.
pub fn seeded_admin() -> User {
    user_with_password(
        ADMIN_UNIQUE_ID,
        ADMIN_EMAIL,
        ADMIN_PASSWORD,
        vec![role(2, RoleCode::Admin)],
    )
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.jwt.secret = TEST_JWT_SECRET.to_string();
    config
}

pub fn test_state(store: Arc<dyn UserStore>, cache: Arc<dyn CacheStore>) -> AppState {
    AppState::new(test_config(), store, cache)
}
