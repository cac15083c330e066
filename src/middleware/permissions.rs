use axum::{
    extract::Request,
    middleware::Next,
    response::Response,
};

use crate::{
    core::{constants::ROLE_PUBLIC, error::AppError},
    extractors::identity::Identity,
    middleware::bearer_token,
    services::{auth as AuthService, role as RoleService},
    state::AppState,
};

/// 权限策略：校验请求方的角色是否被授予 `action`。
///
/// - 携带了令牌：令牌必须有效，否则 401；角色取用户自身的角色。
/// - 未携带令牌：按 public 角色判断。
/// - 没有权限：匿名返回 401，已登录返回 403。
///
/// 通过后把 `Identity` 写入 request extensions，供后续策略与 Handler 使用。
pub async fn enforce(
    state: AppState,
    action: &'static str,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let identity = match bearer_token(req.headers()) {
        Some(token) => Some(AuthService::authenticate(&state, &token).await?),
        None => None,
    };

    let role_id = match &identity {
        Some(identity) => identity.role_id,
        None => RoleService::find_by_type(&state.db, ROLE_PUBLIC).await?.map(|r| r.id),
    };

    let allowed = match role_id {
        Some(role_id) => RoleService::is_allowed(&state.db, role_id, action).await?,
        None => false,
    };

    if !allowed {
        return Err(match identity {
            None => AppError::AuthError("Unauthorized".to_string()),
            Some(identity) => {
                tracing::warn!("🚫 {} is not allowed to {}", identity.username, action);
                AppError::Forbidden("Forbidden".to_string())
            }
        });
    }

    if let Some(identity) = identity {
        req.extensions_mut().insert::<Identity>(identity);
    }

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::constants::PUBLIC_ACTIONS,
        dtos::auth::RegisterRequest,
        test_support,
    };
    use axum::{
        body::Body,
        extract::State,
        http::{header, StatusCode},
        middleware::from_fn_with_state,
        routing::get,
        Router,
    };
    use tower::ServiceExt;

    fn app(state: AppState, action: &'static str) -> Router {
        Router::new()
            .route(
                "/guarded",
                get(|identity: Result<Identity, AppError>| async move {
                    identity.map(|i| i.username).unwrap_or_else(|_| "anonymous".to_string())
                })
                .route_layer(from_fn_with_state(
                    state.clone(),
                    move |State(state): State<AppState>, req: Request, next: Next| enforce(state, action, req, next),
                )),
            )
            .with_state(state)
    }

    fn get_with(token: Option<&str>) -> Request {
        let mut builder = Request::builder().uri("/guarded");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn jwt(state: &AppState) -> String {
        AuthService::register(
            state,
            RegisterRequest {
                username: "guarded".to_string(),
                email: "guarded@example.com".to_string(),
                password: "TestPassword123!".to_string(),
            },
        )
        .await
        .unwrap()
        .jwt
    }

    #[tokio::test]
    async fn anonymous_is_unauthorized_for_private_action() {
        let state = test_support::state().await;
        let res = app(state, "user.me").oneshot(get_with(None)).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn anonymous_passes_public_action() {
        let state = test_support::state().await;
        let res = app(state, PUBLIC_ACTIONS[0]).oneshot(get_with(None)).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn invalid_token_is_unauthorized_even_for_public_action() {
        let state = test_support::state().await;
        let res = app(state, PUBLIC_ACTIONS[0])
            .oneshot(get_with(Some("invalid-token")))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn authenticated_user_is_forbidden_without_grant() {
        let state = test_support::state().await;
        let token = jwt(&state).await;
        let res = app(state, "admin.settings").oneshot(get_with(Some(&token))).await.unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn granted_user_reaches_handler_with_identity() {
        let state = test_support::state().await;
        let token = jwt(&state).await;
        let res = app(state, "user.me").oneshot(get_with(Some(&token))).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"guarded");
    }
}
