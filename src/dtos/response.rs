use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// 错误响应体：`{ "data": null, "error": { ... } }`
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub data: Option<()>,
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub status: u16,
    pub name: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(status: StatusCode, name: &str, message: &str) -> Self {
        Self {
            data: None,
            error: ErrorDetail {
                status: status.as_u16(),
                name: name.to_string(),
                message: message.to_string(),
            },
        }
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.error.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}
