use axum::{
    extract::{Request, State},
    http::Method,
    middleware::{from_fn, from_fn_with_state, Next},
    routing::{get, post, put, MethodRouter},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::{
    handlers,
    middleware::{is_owner, permissions, rate_limit},
    state::AppState,
};

/// 路由上可声明的策略。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// 按 “路由 + 客户端地址” 的固定窗口限流
    RateLimit,
    /// 角色必须拥有该动作的权限
    Permission(&'static str),
    /// 路由参数 `id` 必须是当前登录用户
    IsOwner,
}

/// 路由表中的一项。`policies` 按声明顺序在 Handler 之前执行，
/// 任何一个拒绝都会短路后面的策略与 Handler。
pub struct RouteDef {
    pub method: Method,
    pub path: &'static str,
    pub handler: MethodRouter<AppState>,
    pub policies: &'static [Policy],
}

/// 全部业务路由。启动时解析一次，之后不再变化。
pub fn route_table() -> Vec<RouteDef> {
    vec![
        // --- 认证 ---
        RouteDef {
            method: Method::POST,
            path: "/api/auth/local/register",
            handler: post(handlers::auth::register),
            policies: &[Policy::RateLimit],
        },
        RouteDef {
            method: Method::POST,
            path: "/api/auth/local",
            handler: post(handlers::auth::login),
            policies: &[Policy::RateLimit],
        },
        // --- 用户 ---
        RouteDef {
            method: Method::GET,
            path: "/api/users/me",
            handler: get(handlers::users::get_me),
            policies: &[Policy::Permission("user.me")],
        },
        RouteDef {
            method: Method::GET,
            path: "/api/users/profile",
            handler: get(handlers::users::get_profile),
            policies: &[Policy::RateLimit, Policy::Permission("user.profile")],
        },
        RouteDef {
            method: Method::GET,
            path: "/api/users/{id}",
            handler: get(handlers::users::find_one),
            policies: &[Policy::Permission("user.findOne"), Policy::IsOwner],
        },
        RouteDef {
            method: Method::PUT,
            path: "/api/users/{id}",
            handler: put(handlers::users::update),
            policies: &[Policy::Permission("user.update"), Policy::IsOwner],
        },
    ]
}

/// 把策略链挂到 Handler 上。
/// route_layer 后添加的在外层，所以倒序添加，第一个声明的策略最先执行。
fn with_policies(handler: MethodRouter<AppState>, policies: &[Policy], state: &AppState) -> MethodRouter<AppState> {
    policies.iter().rev().fold(handler, |handler, policy| match *policy {
        Policy::RateLimit => handler.route_layer(from_fn_with_state(state.clone(), rate_limit::enforce)),
        Policy::Permission(action) => handler.route_layer(from_fn_with_state(
            state.clone(),
            move |State(state): State<AppState>, req: Request, next: Next| {
                permissions::enforce(state, action, req, next)
            },
        )),
        Policy::IsOwner => handler.route_layer(from_fn(is_owner::enforce)),
    })
}

/// 创建应用路由：路由表 + 健康检查 + 全局日志与 CORS。
pub fn create_router(state: AppState) -> Router {
    let mut router = Router::new().route("/_health", get(|| async { "ok" }));

    for route in route_table() {
        tracing::debug!("📍 {} {} {:?}", route.method, route.path, route.policies);
        // 同一路径的不同方法会合并到同一个 MethodRouter
        router = router.route(route.path, with_policies(route.handler, route.policies, &state));
    }

    router
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}
