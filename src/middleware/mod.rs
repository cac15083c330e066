//! 路由策略。每个策略在 Handler 之前执行，可以放行（调用 next 一次）或直接拒绝。
//! 执行顺序由 `routes.rs` 中的路由表声明。

pub mod is_owner;
pub mod permissions;
pub mod rate_limit;

use axum::http::HeaderMap;
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};

/// 从 Authorization 头提取 Bearer 令牌。格式不对按未携带处理。
pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .typed_get::<Authorization<Bearer>>()
        .map(|auth| auth.token().trim().to_string())
        .filter(|token| !token.is_empty())
}
