// src/bootstrap.rs
use std::collections::BTreeMap;

use sea_orm::{ConnectionTrait, EntityTrait, QuerySelect};
use secrecy::ExposeSecret;
use strum::IntoEnumIterator;

use crate::{
    core::{
        config::Config,
        constants::*,
        enums::WebhookEvent,
        error::AppError,
    },
    dtos::setup::{LocaleSeed, RoleSeed, WebhookSeed},
    entity::roles,
    jobs::{self, ScheduledJobs},
    services::{
        role as RoleService,
        seed::SEED_ROLES,
        setup::{self, SetupReport, Upsert},
    },
    state::AppState,
};

/// 服务启动时执行的初始化流程。每一步都独立处理自己的错误，
/// 任何一步失败都只记录日志，服务照常启动。
///
/// 1. 基础角色（public / authenticated）及其默认权限
/// 2. 默认 Webhook（仅在配置了 WEBHOOK_URL 时）
/// 3. 国际化语言（es 为默认，en）
/// 4. 定时任务
/// 5. 配置检查
pub async fn bootstrap(state: &AppState) -> ScheduledJobs {
    tracing::info!("🏁 Bootstrapping application...");

    setup_default_roles(&state.db).await;
    setup_default_webhook(&state.db, &state.config).await;

    if state.config.i18n_enabled {
        setup_i18n(&state.db).await;
    } else {
        tracing::warn!("⚠️ i18n is disabled, skipping locales");
    }

    let jobs = jobs::spawn(state);

    if let Err(e) = verify_database(&state.db).await {
        tracing::error!("❌ Database verification failed: {}", e);
    }
    for warning in verify_application_config(&state.config) {
        tracing::warn!("⚠️ {}", warning);
    }

    tracing::info!("✅ Bootstrap completed");
    jobs
}

/// 确保 public / authenticated 两个基础角色存在，并补齐默认权限。
pub async fn setup_default_roles<C: ConnectionTrait>(db: &C) -> SetupReport {
    tracing::info!("🔐 Configuring default roles and permissions...");
    let mut report = SetupReport::default();

    let defaults: Vec<&RoleSeed> = SEED_ROLES
        .iter()
        .filter(|r| r.r#type == ROLE_PUBLIC || r.r#type == ROLE_AUTHENTICATED)
        .collect();
    for role in defaults {
        report.record("role", role.name, RoleService::ensure_role(db, role).await);
    }

    for (role_type, actions) in [(ROLE_PUBLIC, PUBLIC_ACTIONS), (ROLE_AUTHENTICATED, AUTHENTICATED_ACTIONS)] {
        if let Err(e) = RoleService::ensure_permissions(db, role_type, actions).await {
            tracing::error!("❌ Failed to grant permissions to {}: {}", role_type, e);
        }
    }

    report
}

pub fn default_webhook(config: &Config) -> Option<WebhookSeed> {
    let url = config.webhook_url.as_ref().filter(|u| !u.is_empty())?;
    let token = config
        .webhook_token
        .as_ref()
        .map(|t| t.expose_secret().to_string())
        .unwrap_or_else(|| DEFAULT_WEBHOOK_TOKEN.to_string());

    Some(WebhookSeed {
        name: WEBHOOK_CONTENT_NOTIFICATIONS.to_string(),
        url: url.clone(),
        headers: BTreeMap::from([
            ("Authorization".to_string(), format!("Bearer {}", token)),
            ("Content-Type".to_string(), "application/json".to_string()),
        ]),
        events: WebhookEvent::iter().collect(),
        enabled: true,
    })
}

/// 内容通知 Webhook。未配置 WEBHOOK_URL 时什么也不做。
pub async fn setup_default_webhook<C: ConnectionTrait>(db: &C, config: &Config) -> Option<Upsert> {
    tracing::info!("🔗 Configuring default webhooks...");
    let Some(seed) = default_webhook(config) else {
        tracing::info!("WEBHOOK_URL not set, skipping");
        return None;
    };

    let mut report = SetupReport::default();
    let result = setup::ensure_webhook(db, &seed).await;
    let outcome = result.as_ref().ok().copied();
    report.record("webhook", &seed.name, result);
    outcome
}

pub async fn setup_i18n<C: ConnectionTrait>(db: &C) -> SetupReport {
    tracing::info!("🌍 Configuring locales...");
    let mut report = SetupReport::default();
    for (code, name, is_default) in DEFAULT_LOCALES {
        let seed = LocaleSeed {
            name: String::from(*name),
            code: String::from(*code),
            is_default: *is_default,
        };
        report.record("locale", code, setup::ensure_locale(db, &seed).await);
    }
    report
}

/// 通过一次最小查询确认数据库可用。
pub async fn verify_database<C: ConnectionTrait>(db: &C) -> Result<(), AppError> {
    roles::Entity::find().limit(1).all(db).await?;
    tracing::info!("✅ Database connection verified");
    Ok(())
}

/// 生产环境的配置检查，返回告警列表；非生产环境始终为空。
pub fn verify_application_config(config: &Config) -> Vec<String> {
    let mut warnings = Vec::new();
    if !config.is_production() {
        return warnings;
    }

    if config.upload_provider.as_deref() == Some("local") {
        warnings.push("Local upload provider in production, use an external storage provider (e.g. S3)".to_string());
    }
    if config.smtp_host.as_deref().is_none_or(str::is_empty) {
        warnings.push("SMTP is not configured for production".to_string());
    }

    let secrets = [
        ("APP_KEYS", config.app_keys.as_ref()),
        ("JWT_SECRET", Some(&config.jwt_secret)),
        ("ADMIN_JWT_SECRET", config.admin_jwt_secret.as_ref()),
    ];
    for (name, value) in secrets {
        if value.is_none_or(|v| v.expose_secret().is_empty()) {
            warnings.push(format!("Missing required environment variable: {}", name));
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::enums::Environment;
    use crate::entity::{locales, webhooks};
    use crate::test_support;
    use sea_orm::PaginatorTrait;
    use secrecy::SecretString;

    #[tokio::test]
    async fn default_roles_are_created_once() {
        let db = test_support::database().await;
        assert_eq!(setup_default_roles(&db).await.created, 2);

        let again = setup_default_roles(&db).await;
        assert_eq!((again.created, again.existing), (0, 2));
        assert_eq!(roles::Entity::find().count(&db).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn webhook_requires_url() {
        let db = test_support::database().await;
        let mut config = Config::for_tests();
        assert_eq!(setup_default_webhook(&db, &config).await, None);

        config.webhook_url = Some("https://hooks.example.com/cms".to_string());
        assert_eq!(setup_default_webhook(&db, &config).await, Some(Upsert::Created));
        assert_eq!(setup_default_webhook(&db, &config).await, Some(Upsert::Existing));

        let hook = webhooks::Entity::find().one(&db).await.unwrap().unwrap();
        assert_eq!(hook.name, WEBHOOK_CONTENT_NOTIFICATIONS);
        assert_eq!(hook.headers["Authorization"], "Bearer default-token");
        assert_eq!(hook.events.as_array().map(Vec::len), Some(5));
    }

    #[tokio::test]
    async fn spanish_is_the_default_locale() {
        let db = test_support::database().await;
        setup_i18n(&db).await;
        setup_i18n(&db).await;

        let all = locales::Entity::find().all(&db).await.unwrap();
        assert_eq!(all.len(), 2);
        let default: Vec<_> = all.iter().filter(|l| l.is_default).map(|l| l.code.as_str()).collect();
        assert_eq!(default, ["es"]);
    }

    #[test]
    fn config_warnings_only_in_production() {
        let mut config = Config::for_tests();
        config.upload_provider = Some("local".to_string());
        assert!(verify_application_config(&config).is_empty());

        config.node_env = Environment::Production;
        let warnings = verify_application_config(&config);
        assert!(warnings.iter().any(|w| w.contains("upload")));
        assert!(warnings.iter().any(|w| w.contains("SMTP")));
        assert!(warnings.iter().any(|w| w.ends_with("APP_KEYS")));
        assert!(warnings.iter().any(|w| w.ends_with("ADMIN_JWT_SECRET")));
        assert!(!warnings.iter().any(|w| w.ends_with(": JWT_SECRET")));

        let mut unsigned = config.clone();
        unsigned.jwt_secret = SecretString::from("");
        assert!(verify_application_config(&unsigned).iter().any(|w| w.ends_with(": JWT_SECRET")));

        config.upload_provider = Some("aws-s3".to_string());
        config.smtp_host = Some("smtp.example.com".to_string());
        config.app_keys = Some(SecretString::from("key1,key2"));
        config.admin_jwt_secret = Some(SecretString::from("admin"));
        assert!(verify_application_config(&config).is_empty());
    }
}
