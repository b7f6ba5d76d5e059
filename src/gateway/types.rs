//! API envelope, request bodies and error mapping
//!
//! - `ApiResponse<T>`: unified `{code, msg, data}` wrapper
//! - `ApiResult<T>`: handler return type
//! - `AppError` to HTTP response, status taken from the error kind

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, ErrorKind};

/// Unified API response wrapper
///
/// - code: 0 = success, non-zero = error code
/// - msg: short message description
/// - data: actual data (success) or absent (error)
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: 0,
            msg: "ok".to_string(),
            data: Some(data),
        }
    }

    pub fn error(code: i32, msg: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            code,
            msg: msg.into(),
            data: None,
        }
    }
}

pub type ApiResult<T> = Result<(StatusCode, Json<ApiResponse<T>>), AppError>;

pub fn ok<T>(data: T) -> ApiResult<T> {
    Ok((StatusCode::OK, Json(ApiResponse::success(data))))
}

pub fn created<T>(data: T) -> ApiResult<T> {
    Ok((StatusCode::CREATED, Json(ApiResponse::success(data))))
}

/// Undecodable body or query string
pub fn rejected(e: impl std::fmt::Display) -> AppError {
    AppError::bad_request(e.to_string())
}

fn status_of(kind: ErrorKind) -> StatusCode {
    StatusCode::from_u16(kind.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        if kind == ErrorKind::Internal {
            tracing::error!(error = %self, "internal error");
        }
        let body = ApiResponse::<()>::error(kind.code(), self.to_string());
        (status_of(kind), Json(body)).into_response()
    }
}

/// POST /accounts
#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub cpf: String,
    pub secret: String,
    #[serde(default)]
    pub balance: i64,
}

/// POST /login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub cpf: String,
    pub secret: String,
}

/// POST /transfers
#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    #[serde(default)]
    pub id: Option<String>,
    pub destination_account_id: String,
    pub amount: i64,
}

/// `?limit=&offset=`; absent means 0
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}
