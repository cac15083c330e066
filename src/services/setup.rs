// src/services/setup.rs
//! 幂等的初始化写入：先按自然键查找，不存在才创建，永不更新已有记录。
//! bootstrap（服务启动时）与 seed 命令共用。

use chrono::Utc;
use sea_orm::*;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    core::error::AppError,
    dtos::setup::{ArticleSeed, LocaleSeed, UserSeed, WebhookSeed},
    entity::{articles, locales, users, webhooks},
    services::auth::hash_password,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Created,
    Existing,
}

/// 一批初始化写入的结果统计。单条失败只记录日志，不中断同批次的其余记录。
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SetupReport {
    pub created: usize,
    pub existing: usize,
    pub failed: usize,
}

impl SetupReport {
    pub fn record(&mut self, kind: &str, key: &str, result: Result<Upsert, AppError>) {
        match result {
            Ok(Upsert::Created) => {
                self.created += 1;
                tracing::info!("✅ {} created: {}", kind, key);
            }
            Ok(Upsert::Existing) => {
                self.existing += 1;
                tracing::info!("⚠️ {} already exists: {}", kind, key);
            }
            Err(e) => {
                self.failed += 1;
                tracing::error!("❌ Failed to create {} {}: {}", kind, key, e);
            }
        }
    }

    pub fn merge(&mut self, other: SetupReport) {
        self.created += other.created;
        self.existing += other.existing;
        self.failed += other.failed;
    }
}

pub async fn ensure_locale<C: ConnectionTrait>(db: &C, seed: &LocaleSeed) -> Result<Upsert, AppError> {
    seed.validate()?;

    let existing = locales::Entity::find()
        .filter(locales::Column::Code.eq(&seed.code))
        .one(db)
        .await?;
    if existing.is_some() {
        return Ok(Upsert::Existing);
    }

    let now = Utc::now();
    locales::ActiveModel {
        name: Set(seed.name.clone()),
        code: Set(seed.code.clone()),
        is_default: Set(seed.is_default),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    Ok(Upsert::Created)
}

pub async fn ensure_webhook<C: ConnectionTrait>(db: &C, seed: &WebhookSeed) -> Result<Upsert, AppError> {
    let existing = webhooks::Entity::find()
        .filter(webhooks::Column::Name.eq(&seed.name))
        .one(db)
        .await?;
    if existing.is_some() {
        return Ok(Upsert::Existing);
    }

    let now = Utc::now();
    webhooks::ActiveModel {
        name: Set(seed.name.clone()),
        url: Set(seed.url.clone()),
        headers: Set(json!(seed.headers)),
        events: Set(json!(seed.events)),
        enabled: Set(seed.enabled),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    Ok(Upsert::Created)
}

/// 用户以邮箱为自然键，密码在这里哈希。
pub async fn ensure_user<C: ConnectionTrait>(db: &C, seed: &UserSeed, role_id: i32) -> Result<Upsert, AppError> {
    let existing = users::Entity::find()
        .filter(users::Column::Email.eq(seed.email))
        .one(db)
        .await?;
    if existing.is_some() {
        return Ok(Upsert::Existing);
    }

    let now = Utc::now();
    users::ActiveModel {
        username: Set(seed.username.to_string()),
        email: Set(seed.email.to_string()),
        password_hash: Set(hash_password(seed.password)?),
        provider: Set("local".to_string()),
        confirmed: Set(true),
        blocked: Set(false),
        firstname: Set(Some(seed.firstname.to_string())),
        lastname: Set(Some(seed.lastname.to_string())),
        role_id: Set(Some(role_id)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    Ok(Upsert::Created)
}

pub async fn ensure_article<C: ConnectionTrait>(db: &C, seed: &ArticleSeed) -> Result<Upsert, AppError> {
    let existing = articles::Entity::find()
        .filter(articles::Column::Slug.eq(seed.slug))
        .one(db)
        .await?;
    if existing.is_some() {
        return Ok(Upsert::Existing);
    }

    let now = Utc::now();
    articles::ActiveModel {
        document_id: Set(Uuid::new_v4().to_string()),
        title: Set(seed.title.to_string()),
        slug: Set(seed.slug.to_string()),
        content: Set(seed.content.trim().to_string()),
        excerpt: Set(Some(seed.excerpt.to_string())),
        featured: Set(seed.featured),
        published: Set(true),
        published_at: Set(Some(seed.published_at)),
        locale: Set(seed.locale.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    Ok(Upsert::Created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::enums::WebhookEvent;
    use crate::test_support;
    use std::collections::BTreeMap;

    fn locale(code: &str) -> LocaleSeed {
        LocaleSeed { name: format!("Locale ({code})"), code: code.to_string(), is_default: false }
    }

    #[tokio::test]
    async fn locale_is_created_once() {
        let db = test_support::database().await;
        assert_eq!(ensure_locale(&db, &locale("es")).await.unwrap(), Upsert::Created);
        assert_eq!(ensure_locale(&db, &locale("es")).await.unwrap(), Upsert::Existing);
        assert_eq!(locales::Entity::find().count(&db).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn malformed_locale_code_is_rejected_before_insert() {
        let db = test_support::database().await;
        let err = ensure_locale(&db, &locale("spanish")).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
        assert_eq!(locales::Entity::find().count(&db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn webhook_stores_headers_and_events_as_json() {
        let db = test_support::database().await;
        let seed = WebhookSeed {
            name: "Hook".to_string(),
            url: "https://hooks.example.com/cms".to_string(),
            headers: BTreeMap::from([("Content-Type".to_string(), "application/json".to_string())]),
            events: vec![WebhookEvent::EntryCreate, WebhookEvent::EntryDelete],
            enabled: true,
        };

        assert_eq!(ensure_webhook(&db, &seed).await.unwrap(), Upsert::Created);
        assert_eq!(ensure_webhook(&db, &seed).await.unwrap(), Upsert::Existing);

        let hook = webhooks::Entity::find().one(&db).await.unwrap().unwrap();
        assert_eq!(hook.events, json!(["entry.create", "entry.delete"]));
        assert_eq!(hook.headers["Content-Type"], "application/json");
    }

    #[test]
    fn report_counts_each_outcome() {
        let mut report = SetupReport::default();
        report.record("role", "public", Ok(Upsert::Created));
        report.record("role", "authenticated", Ok(Upsert::Existing));
        report.record("role", "editor", Err(AppError::InternalServerError("boom".to_string())));
        assert_eq!(report, SetupReport { created: 1, existing: 1, failed: 1 });
    }
}
