// src/services/user.rs
use chrono::Utc;
use sea_orm::*;

use crate::{
    core::error::AppError,
    dtos::user::{UpdateUserRequest, UserProfile},
    entity::{roles, users},
};

/// 查询用户资料（不含角色）。
pub async fn get_user_profile<C: ConnectionTrait>(db: &C, user_id: i32) -> Result<UserProfile, AppError> {
    let user = users::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    Ok(user.into())
}

/// 查询用户资料并带出所属角色，供 `/api/users/profile` 使用。
pub async fn get_profile_with_role<C: ConnectionTrait>(db: &C, user_id: i32) -> Result<UserProfile, AppError> {
    let (user, role) = users::Entity::find_by_id(user_id)
        .find_also_related(roles::Entity)
        .one(db)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    let mut profile: UserProfile = user.into();
    profile.role = role.map(Into::into);
    Ok(profile)
}

/// 更新姓名字段。未提供的字段保持不变。
pub async fn update_user_profile<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    req: UpdateUserRequest,
) -> Result<UserProfile, AppError> {
    let user = users::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    let mut user_active: users::ActiveModel = user.into();
    if let Some(firstname) = req.firstname {
        user_active.firstname = Set(Some(firstname));
    }
    if let Some(lastname) = req.lastname {
        user_active.lastname = Set(Some(lastname));
    }
    user_active.updated_at = Set(Utc::now());

    let updated_user = user_active.update(db).await?;
    Ok(updated_user.into())
}
