// src/core/error.rs
use axum::{http::StatusCode, response::{IntoResponse, Response}};
use thiserror::Error;
use crate::dtos::response::ErrorResponse;

/// 应用程序统一错误类型。覆盖数据库、缓存、验证、认证、授权、限流，
/// 以及启动阶段（配置、IO）的错误。
///
/// 通过实现 `IntoResponse` trait，任何 `AppError` 都可以直接转换为HTTP响应，
/// 响应体统一为 `{ "data": null, "error": { status, name, message } }`。
#[derive(Error, Debug)]
pub enum AppError {
    /// 数据库相关错误。包装 SeaORM 的 `DbErr`，自动转换。
    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::DbErr),

    /// Redis 限流计数存储错误。
    #[error("Redis error: {0}")]
    RedisError(#[from] redis::RedisError),

    /// 输入验证错误。包装 validator crate 的 `ValidationErrors`。返回400。
    #[error("Validation error: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    /// 业务层面的请求错误，如凭证错误、用户名已被占用。返回400 Bad Request。
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// 认证错误。如令牌无效、未登录。返回401 Unauthorized。
    #[error("Authentication failed: {0}")]
    AuthError(String),

    /// 授权错误。如权限不足、不是资源所有者。返回403 Forbidden。
    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// 资源未找到错误。返回404 Not Found。
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// 请求频率限制错误。返回429 Too Many Requests。
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// 服务器内部错误。用于未预期的错误情况。返回500。
    #[error("Internal server error: {0}")]
    InternalServerError(String),

    /// 配置加载失败（仅在启动阶段出现）。
    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),

    /// 监听端口等 IO 失败（仅在启动阶段出现）。
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // 内部错误只记录日志，返回通用消息，避免泄露敏感信息。
        let (status, name, msg) = match &self {
            AppError::DatabaseError(e) => {
                tracing::error!("❌ Database Error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "InternalServerError", "Database service error".to_string())
            },
            AppError::RedisError(e) => {
                tracing::error!("❌ Redis Error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "InternalServerError", "Cache service error".to_string())
            },
            AppError::InternalServerError(msg) => {
                tracing::error!("❌ Internal Error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "InternalServerError", "Internal server error".to_string())
            },
            AppError::ConfigError(_) | AppError::IoError(_) => {
                tracing::error!("❌ {}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, "InternalServerError", "Internal server error".to_string())
            },
            AppError::ValidationError(e) => (StatusCode::BAD_REQUEST, "ValidationError", e.to_string()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "ApplicationError", msg.clone()),
            AppError::AuthError(msg) => (StatusCode::UNAUTHORIZED, "UnauthorizedError", msg.clone()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "ForbiddenError", msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NotFoundError", msg.clone()),
            AppError::RateLimitExceeded(msg) => (StatusCode::TOO_MANY_REQUESTS, "RateLimitError", msg.clone()),
        };

        ErrorResponse::new(status, name, &msg).into_response()
    }
}

impl AppError {
    /// HTTP 状态码，不生成响应体。策略单元测试用它断言拒绝类别。
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::AuthError(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::RateLimitExceeded(_) => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
