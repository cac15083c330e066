use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};

use crate::{core::error::AppError, state::AppState};

/// 限流策略：按 “路由 + 客户端地址” 计数，与是否登录无关。
///
/// 超过阈值返回 429，由调用方决定是否重试。
pub async fn enforce(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());
    let client = client_ip(&req, state.config.proxy_enabled);

    state.limiter.check(&format!("{}:{}", route, client)).await?;

    Ok(next.run(req).await)
}

/// 客户端地址：开启代理模式时取 `X-Forwarded-For` 的第一跳，
/// 否则取 TCP 对端地址。都拿不到时归入 `unknown`。
pub fn client_ip(req: &Request, trust_proxy: bool) -> String {
    if trust_proxy {
        let forwarded = req
            .headers()
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());
        if let Some(ip) = forwarded {
            return ip.to_string();
        }
    }

    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
