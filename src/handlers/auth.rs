// src/handlers/auth.rs
use axum::{
    extract::{Json, State},
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    core::error::AppError,
    dtos::auth::{LoginRequest, RegisterRequest},
    services::auth as AuthService,
    state::AppState,
};

/// 用户注册处理器：`POST /api/auth/local/register`
///
/// 先做格式校验（邮箱、密码长度），校验失败时不会访问数据库。
/// 成功返回 `{ jwt, user }`。
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let response = AuthService::register(&state, payload).await?;
    Ok(Json(response))
}

/// 用户登录处理器：`POST /api/auth/local`
///
/// identifier 支持邮箱或用户名；凭证错误统一返回 400，不区分是哪一项错误。
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let response = AuthService::login(&state, payload).await?;
    Ok(Json(response))
}
