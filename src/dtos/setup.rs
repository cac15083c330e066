// src/dtos/setup.rs
//! 初始化数据（角色、语言、Webhook、用户、文章）的输入结构。
//! bootstrap 与 seed 共用。

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use validator::Validate;

use crate::core::enums::WebhookEvent;
use crate::dtos::LOCALE_CODE_REGEX;

#[derive(Debug, Clone)]
pub struct RoleSeed {
    pub name: &'static str,
    pub description: &'static str,
    pub r#type: &'static str,
}

#[derive(Debug, Clone, Validate)]
pub struct LocaleSeed {
    pub name: String,
    #[validate(regex(path = *LOCALE_CODE_REGEX, message = "Invalid locale code"))]
    pub code: String,
    pub is_default: bool,
}

#[derive(Debug, Clone)]
pub struct WebhookSeed {
    pub name: String,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub events: Vec<WebhookEvent>,
    pub enabled: bool,
}

#[derive(Debug, Clone)]
pub struct UserSeed {
    pub username: &'static str,
    pub email: &'static str,
    pub password: &'static str,
    pub firstname: &'static str,
    pub lastname: &'static str,
}

#[derive(Debug, Clone)]
pub struct ArticleSeed {
    pub title: &'static str,
    pub slug: &'static str,
    pub content: &'static str,
    pub excerpt: &'static str,
    pub featured: bool,
    pub published_at: DateTime<Utc>,
    pub locale: &'static str,
}
