//! Success envelopes.
//!
//! Errors are rendered by [`crate::errors::AppException`]; this module covers
//! the two success shapes:
//!
//! ```json
//! { "code": 0, "message": "success", "data": ... }
//! { "code": 0, "message": "success", "data": { "list": [...], "total": 12, "pageSize": 5, "page": 1 } }
//! ```

use axum::{
    Json,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

pub const SUCCESS_CODE: i32 = 0;
pub const SUCCESS_MESSAGE: &str = "success";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub message: String,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: SUCCESS_CODE,
            message: SUCCESS_MESSAGE.to_string(),
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// One page of results plus the numbers needed to page through the rest.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageData<T> {
    pub list: Vec<T>,
    pub total: i64,
    pub page_size: i64,
    pub page: i64,
}

pub fn success<T: Serialize>(data: T) -> ApiResponse<T> {
    ApiResponse::success(data)
}

pub fn success_page<T: Serialize>(
    list: Vec<T>,
    total: i64,
    page: i64,
    page_size: i64,
) -> ApiResponse<PageData<T>> {
    ApiResponse::success(PageData {
        list,
        total,
        page_size,
        page,
    })
}
