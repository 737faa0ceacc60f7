use axum::{Router, routing::get};

use bastion_core::ApiResponse;

use crate::state::AppState;

pub async fn hello() -> ApiResponse<&'static str> {
    ApiResponse::success("Hello, World!")
}

pub fn init_hello_router() -> Router<AppState> {
    Router::new().route("/hello", get(hello))
}
