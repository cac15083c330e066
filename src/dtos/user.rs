// src/dtos/user.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::entity::{roles, users};

/// 对外暴露的用户信息。密码哈希、重置令牌、确认令牌都不会出现在这里。
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UserProfile {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub provider: String,
    pub confirmed: bool,
    pub blocked: bool,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<RoleSummary>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RoleSummary {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub r#type: String,
}

impl From<users::Model> for UserProfile {
    fn from(user: users::Model) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            provider: user.provider,
            confirmed: user.confirmed,
            blocked: user.blocked,
            firstname: user.firstname,
            lastname: user.lastname,
            created_at: user.created_at,
            updated_at: user.updated_at,
            role: None,
        }
    }
}

impl From<roles::Model> for RoleSummary {
    fn from(role: roles::Model) -> Self {
        Self {
            id: role.id,
            name: role.name,
            description: role.description,
            r#type: role.r#type,
        }
    }
}

/// `GET /api/users/profile` 的响应：`{ "user": { ..., "role": { ... } } }`
#[derive(Serialize, Debug)]
pub struct ProfileResponse {
    pub user: UserProfile,
}

#[derive(Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 50, message = "Firstname must be between 1 and 50 characters"))]
    pub firstname: Option<String>,
    #[validate(length(min = 1, max = 50, message = "Lastname must be between 1 and 50 characters"))]
    pub lastname: Option<String>,
}
