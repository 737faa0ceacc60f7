use axum::extract::State;

use bastion_auth::CurrentUser;
use bastion_core::{ApiResponse, AppException};
use bastion_models::{LoginByEmailRequest, LoginByEmailResponse, User};

use crate::modules::users::service::UserService;
use crate::validator::ValidatedJson;

/// `POST /api/v1/user/login-by-email`
pub async fn login_by_email(
    State(users): State<UserService>,
    ValidatedJson(request): ValidatedJson<LoginByEmailRequest>,
) -> Result<ApiResponse<LoginByEmailResponse>, AppException> {
    let response = users.login_by_email(request).await?;
    Ok(ApiResponse::success(response))
}

/// `GET /api/v1/user/info`: the caller's own profile, roles included.
pub async fn info(
    State(users): State<UserService>,
    CurrentUser(user_unique_id): CurrentUser,
) -> Result<ApiResponse<User>, AppException> {
    let user = users.get_user_by_unique_id(user_unique_id).await?;
    Ok(ApiResponse::success(user))
}
