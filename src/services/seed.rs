// src/services/seed.rs
//! 测试数据：角色、用户、语言、文章、权限。可以反复执行，只补齐缺失的记录。

use chrono::{DateTime, Duration, Utc};
use sea_orm::*;

use crate::{
    core::{
        constants::{AUTHENTICATED_ACTIONS, PUBLIC_ACTIONS, ROLE_AUTHENTICATED, ROLE_PUBLIC},
        error::AppError,
    },
    dtos::setup::{ArticleSeed, RoleSeed, UserSeed},
    entity::{articles, users},
    services::{
        role as RoleService,
        setup::{self, SetupReport},
    },
};

pub const SEED_ROLES: &[RoleSeed] = &[
    RoleSeed {
        name: "Public",
        description: "Default role given to unauthenticated users.",
        r#type: ROLE_PUBLIC,
    },
    RoleSeed {
        name: "Authenticated",
        description: "Default role given to authenticated users.",
        r#type: ROLE_AUTHENTICATED,
    },
    RoleSeed {
        name: "Editor",
        description: "Role for content editors.",
        r#type: "editor",
    },
    RoleSeed {
        name: "Moderator",
        description: "Role for content moderators.",
        r#type: "moderator",
    },
];

pub const SEED_USERS: &[UserSeed] = &[
    UserSeed {
        username: "editor",
        email: "editor@example.com",
        password: "EditorPassword123!",
        firstname: "Content",
        lastname: "Editor",
    },
    UserSeed {
        username: "moderator",
        email: "moderator@example.com",
        password: "ModeratorPassword123!",
        firstname: "Content",
        lastname: "Moderator",
    },
    UserSeed {
        username: "testuser",
        email: "testuser@example.com",
        password: "TestPassword123!",
        firstname: "Test",
        lastname: "User",
    },
];

const WELCOME_ES: &str = r#"
# Bienvenido a Strapi 5

Este es un artículo de prueba creado durante el proceso de seed.

## Características principales

- **TypeScript nativo**: Soporte completo para TypeScript desde el inicio
- **Mejor rendimiento**: Optimizaciones significativas en velocidad
- **Nueva API**: API más intuitiva y potente
- **Plugins mejorados**: Sistema de plugins completamente renovado

## Instalación

```bash
npx create-strapi-app@latest mi-proyecto --typescript
```

¡Disfruta construyendo con Strapi 5!
"#;

const WELCOME_EN: &str = r#"
# Welcome to Strapi 5

This is a sample article created during the seeding process.

## Key Features

- **Native TypeScript**: Full TypeScript support from the start
- **Better Performance**: Significant speed optimizations
- **New API**: More intuitive and powerful API
- **Enhanced Plugins**: Completely renovated plugin system

## Installation

```bash
npx create-strapi-app@latest my-project --typescript
```

Enjoy building with Strapi 5!
"#;

const REST_GUIDE_ES: &str = r#"
# Guía de API REST en Strapi

Esta guía te ayudará a entender cómo usar la API REST de Strapi.

## Endpoints básicos

### Obtener todos los artículos
`GET /api/articles`

### Obtener un artículo específico
`GET /api/articles/:id`

### Crear un nuevo artículo
`POST /api/articles`

### Actualizar un artículo
`PUT /api/articles/:id`

### Eliminar un artículo
`DELETE /api/articles/:id`

## Parámetros de consulta

- `populate`: Para incluir relaciones
- `filters`: Para filtrar resultados
- `sort`: Para ordenar resultados
- `pagination`: Para paginar resultados

Ejemplo:
`GET /api/articles?populate=*&filters[published][$eq]=true&sort=publishedAt:desc`
"#;

/// 文章的发布时间相对 `now` 计算，所以不是常量。
pub fn seed_articles(now: DateTime<Utc>) -> Vec<ArticleSeed> {
    vec![
        ArticleSeed {
            title: "Bienvenido a Strapi 5",
            slug: "bienvenido-strapi-5",
            content: WELCOME_ES,
            excerpt: "Descubre las nuevas características de Strapi 5 y cómo comenzar.",
            featured: true,
            published_at: now,
            locale: "es",
        },
        ArticleSeed {
            title: "Welcome to Strapi 5",
            slug: "welcome-strapi-5",
            content: WELCOME_EN,
            excerpt: "Discover the new features of Strapi 5 and how to get started.",
            featured: true,
            published_at: now,
            locale: "en",
        },
        ArticleSeed {
            title: "Guía de API REST",
            slug: "guia-api-rest",
            content: REST_GUIDE_ES,
            excerpt: "Aprende a usar la API REST de Strapi con ejemplos prácticos.",
            featured: false,
            published_at: now - Duration::days(1),
            locale: "es",
        },
    ]
}

pub async fn create_roles<C: ConnectionTrait>(db: &C) -> SetupReport {
    tracing::info!("🔑 Creating roles...");
    let mut report = SetupReport::default();
    for role in SEED_ROLES {
        report.record("role", role.name, RoleService::ensure_role(db, role).await);
    }
    report
}

/// 所有测试用户归入 authenticated 角色；角色不存在时整体跳过。
/// 查询角色本身失败属于致命错误，向上返回。
pub async fn create_users<C: ConnectionTrait>(db: &C) -> Result<SetupReport, AppError> {
    tracing::info!("👥 Creating users...");
    let mut report = SetupReport::default();

    let Some(role) = RoleService::find_by_type(db, ROLE_AUTHENTICATED).await? else {
        tracing::error!("❌ Role {} not found, skipping users", ROLE_AUTHENTICATED);
        return Ok(report);
    };

    for user in SEED_USERS {
        report.record("user", user.email, setup::ensure_user(db, user, role.id).await);
    }
    Ok(report)
}

pub async fn create_content<C: ConnectionTrait>(db: &C) -> SetupReport {
    tracing::info!("📝 Creating sample content...");
    let mut report = SetupReport::default();
    for article in seed_articles(Utc::now()) {
        report.record("article", article.slug, setup::ensure_article(db, &article).await);
    }
    report
}

/// public 只读，authenticated 拥有全部默认动作。
pub async fn setup_permissions<C: ConnectionTrait>(db: &C) -> SetupReport {
    tracing::info!("🔒 Configuring permissions...");
    let mut report = SetupReport::default();
    for (role_type, actions) in [(ROLE_PUBLIC, PUBLIC_ACTIONS), (ROLE_AUTHENTICATED, AUTHENTICATED_ACTIONS)] {
        let result = RoleService::ensure_permissions(db, role_type, actions).await;
        let outcome = result.map(|created| {
            if created > 0 { setup::Upsert::Created } else { setup::Upsert::Existing }
        });
        report.record("permissions for", role_type, outcome);
    }
    report
}

/// 完整 seed 流程。顺序：角色 → 用户 → 语言 → 文章 → 权限。
pub async fn seed<C: ConnectionTrait>(db: &C, i18n_enabled: bool) -> Result<SetupReport, AppError> {
    tracing::info!("🌱 Starting seed...");

    let mut report = create_roles(db).await;
    report.merge(create_users(db).await?);
    if i18n_enabled {
        report.merge(crate::bootstrap::setup_i18n(db).await);
    } else {
        tracing::warn!("⚠️ i18n is disabled, skipping locales");
    }
    report.merge(create_content(db).await);
    report.merge(setup_permissions(db).await);

    tracing::info!(
        "✅ Seed finished: {} created, {} existing, {} failed",
        report.created, report.existing, report.failed
    );
    for user in SEED_USERS {
        tracing::info!("   - {} (password: {})", user.email, user.password);
    }
    Ok(report)
}

/// 删除测试用户与测试文章（按邮箱 / slug），角色与语言保留。
/// 返回 (删除的用户数, 删除的文章数)。
pub async fn clean<C: ConnectionTrait>(db: &C) -> Result<(u64, u64), AppError> {
    tracing::info!("🧹 Removing seed data...");

    let emails: Vec<&str> = SEED_USERS.iter().map(|u| u.email).collect();
    let removed_users = users::Entity::delete_many()
        .filter(users::Column::Email.is_in(emails))
        .exec(db)
        .await?
        .rows_affected;

    let slugs: Vec<&str> = seed_articles(Utc::now()).iter().map(|a| a.slug).collect();
    let removed_articles = articles::Entity::delete_many()
        .filter(articles::Column::Slug.is_in(slugs))
        .exec(db)
        .await?
        .rows_affected;

    tracing::info!("✅ Removed {} users and {} articles", removed_users, removed_articles);
    Ok((removed_users, removed_articles))
}
