use std::borrow::Cow;

use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::error::AppError;

/// Envelope every successful response uses: `{ "error": false, "message"?, "data"? }`.
#[derive(Serialize, Debug)]
pub struct ApiResponse<T> {
    error: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<Cow<'static, str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
}

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, AppError>;
pub type Created<T> = Result<(StatusCode, Json<ApiResponse<T>>), AppError>;

impl<T: Serialize> ApiResponse<T> {
    pub const fn data(data: T) -> Json<Self> {
        Json(Self {
            error: false,
            message: None,
            data: Some(data),
        })
    }

    pub fn with_message(data: T, message: impl Into<Cow<'static, str>>) -> Json<Self> {
        Json(Self {
            error: false,
            message: Some(message.into()),
            data: Some(data),
        })
    }

    pub fn created(data: T, message: impl Into<Cow<'static, str>>) -> (StatusCode, Json<Self>) {
        (StatusCode::CREATED, Self::with_message(data, message))
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<Cow<'static, str>>) -> Json<Self> {
        Json(Self {
            error: false,
            message: Some(message.into()),
            data: None,
        })
    }
}
