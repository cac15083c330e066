use axum::{extract::FromRequestParts, http::request::Parts};
use serde::{Deserialize, Serialize};

use crate::core::error::AppError;

/// 已认证的请求身份。由权限策略解析 Bearer 令牌后写入 request extensions，
/// 之后的策略（is_owner）和处理器从这里读取，不再重复查库。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: i32,
    pub username: String,
    pub role_id: Option<i32>,
}

/// 处理器参数中声明 `identity: Identity` 即要求已登录。
/// 没有经过权限策略（或匿名访问）时直接返回 401，不会进入 Handler。
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .ok_or_else(|| AppError::AuthError("Unauthorized".to_string()))
    }
}
