use std::collections::HashMap;

use axum::{
    extract::{rejection::PathRejection, Path, Request},
    middleware::Next,
    response::Response,
};

use crate::{core::error::AppError, extractors::identity::Identity};

/// 所有权判定，按固定顺序检查，三种拒绝互斥：
/// 1. 未登录 → 401 Unauthorized
/// 2. 路由参数 `id` 缺失 → 400 Bad Request
/// 3. 登录用户 id 与参数不一致（按字符串比较）→ 403 Forbidden
pub fn check(identity: Option<&Identity>, params: &HashMap<String, String>) -> Result<(), AppError> {
    let identity = identity.ok_or_else(|| AppError::AuthError("Unauthorized".to_string()))?;
    let target = params
        .get("id")
        .ok_or_else(|| AppError::BadRequest("Bad Request".to_string()))?;

    if identity.id.to_string() != *target {
        tracing::warn!("🚫 {} tried to access user {}", identity.username, target);
        return Err(AppError::Forbidden("Forbidden".to_string()));
    }

    Ok(())
}

/// 所有权策略。必须放在权限策略之后，身份由它写入 extensions。
pub async fn enforce(
    params: Result<Path<HashMap<String, String>>, PathRejection>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let params = params.map(|Path(p)| p).unwrap_or_default();
    check(req.extensions().get::<Identity>(), &params)?;
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::StatusCode,
        middleware::from_fn,
        routing::get,
        Router,
    };
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };
    use tower::ServiceExt;

    fn owner() -> Identity {
        Identity { id: 1, username: "testuser".to_string(), role_id: Some(2) }
    }

    fn params(id: Option<&str>) -> HashMap<String, String> {
        id.map(|id| HashMap::from([("id".to_string(), id.to_string())])).unwrap_or_default()
    }

    #[test]
    fn owner_is_allowed() {
        assert!(check(Some(&owner()), &params(Some("1"))).is_ok());
    }

    #[test]
    fn other_resource_is_forbidden() {
        let err = check(Some(&owner()), &params(Some("999"))).unwrap_err();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
        assert_eq!(err.to_string(), "Permission denied: Forbidden");
    }

    #[test]
    fn anonymous_is_unauthorized_before_anything_else() {
        // 参数缺失时也先报 401
        assert_eq!(check(None, &params(None)).unwrap_err().status(), StatusCode::UNAUTHORIZED);
        assert_eq!(check(None, &params(Some("999"))).unwrap_err().status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn missing_param_is_bad_request_before_ownership() {
        let err = check(Some(&owner()), &params(None)).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    /// 放行时 Handler 恰好执行一次；拒绝时一次也不执行。
    #[tokio::test]
    async fn next_runs_exactly_once_on_success() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let app = Router::new().route(
            "/users/{id}",
            get(move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    "ok"
                }
            })
            .route_layer(from_fn(enforce))
            .route_layer(from_fn(|mut req: Request, next: Next| async move {
                req.extensions_mut().insert(owner());
                next.run(req).await
            })),
        );

        let res = app
            .clone()
            .oneshot(Request::builder().uri("/users/1").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let res = app
            .oneshot(Request::builder().uri("/users/999").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
