use axum::{
    extract::{Json, Path, State},
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    core::error::AppError,
    dtos::user::{ProfileResponse, UpdateUserRequest},
    extractors::identity::Identity,
    services::user as UserService,
    state::AppState,
};

/// 当前登录用户：`GET /api/users/me`
pub async fn get_me(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let profile = UserService::get_user_profile(&state.db, identity.id).await?;
    Ok(Json(profile))
}

/// 扩展资料（带角色）：`GET /api/users/profile`
pub async fn get_profile(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let user = UserService::get_profile_with_role(&state.db, identity.id)
        .await
        .inspect_err(|e| {
            if !matches!(e, AppError::NotFound(_)) {
                tracing::error!("❌ Failed to load profile for {}: {}", identity.id, e);
            }
        })?;
    Ok(Json(ProfileResponse { user }))
}

/// `GET /api/users/{id}`，is_owner 策略已保证 id 属于当前用户。
pub async fn find_one(
    Path(id): Path<i32>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let profile = UserService::get_user_profile(&state.db, id).await?;
    Ok(Json(profile))
}

/// `PUT /api/users/{id}`，只允许修改姓名。
pub async fn update(
    Path(id): Path<i32>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let profile = UserService::update_user_profile(&state.db, id, payload).await?;
    Ok(Json(profile))
}
