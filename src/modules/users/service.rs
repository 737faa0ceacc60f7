use std::sync::Arc;

use tracing::{info, instrument};

use bastion_auth::TokenService;
use bastion_core::{
    errors::{AppException, USER_NOT_FOUND, USER_PASSWORD_INCORRECT},
    password,
};
use bastion_db::UserStore;
use bastion_models::{LoginByEmailRequest, LoginByEmailResponse, User};
use bastion_observability::{track_login_failure, track_login_success, track_token_issued};

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
    tokens: Arc<TokenService>,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>, tokens: Arc<TokenService>) -> Self {
        Self { store, tokens }
    }

    #[instrument(skip(self))]
    pub async fn get_user_by_unique_id(&self, unique_id: i64) -> Result<User, AppException> {
        self.store.find_by_unique_id(unique_id).await?.ok_or_else(|| {
            AppException::new(USER_NOT_FOUND).with_detail(format!("no user with unique id {unique_id}"))
        })
    }

    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login_by_email(
        &self,
        request: LoginByEmailRequest,
    ) -> Result<LoginByEmailResponse, AppException> {
        let Some(user) = self.store.find_by_email(&request.email).await? else {
            track_login_failure("unknown_email");
            return Err(AppException::new(USER_NOT_FOUND)
                .with_detail(format!("no user with email {}", request.email)));
        };

        // bcrypt is CPU-bound
        let (raw, salt, hashed) = (request.password, user.salt.clone(), user.password.clone());
        let matched = tokio::task::spawn_blocking(move || password::compare(&raw, &salt, &hashed))
            .await
            .map_err(|e| AppException::internal(format!("password check task failed: {e}")))?;

        if !matched {
            track_login_failure("wrong_password");
            return Err(AppException::new(USER_PASSWORD_INCORRECT));
        }

        let issued = self.tokens.issue(user.unique_id)?;
        track_token_issued("login");
        track_login_success();
        info!(user_unique_id = user.unique_id, "User logged in");

        Ok(LoginByEmailResponse {
            token: issued.token,
            expire_at: issued.expire_at.timestamp_millis(),
            refresh_at: issued.refresh_at.timestamp_millis(),
        })
    }
}
