use chrono::Utc;
use sea_orm::*;

use crate::{
    core::error::AppError,
    dtos::setup::RoleSeed,
    entity::{permissions, roles},
    services::setup::Upsert,
};

pub async fn find_by_type<C: ConnectionTrait>(db: &C, role_type: &str) -> Result<Option<roles::Model>, AppError> {
    Ok(roles::Entity::find()
        .filter(roles::Column::Type.eq(role_type))
        .one(db)
        .await?)
}

/// 按 type 查找角色，不存在才创建。已存在的角色不会被修改。
pub async fn ensure_role<C: ConnectionTrait>(db: &C, seed: &RoleSeed) -> Result<Upsert, AppError> {
    if find_by_type(db, seed.r#type).await?.is_some() {
        return Ok(Upsert::Existing);
    }

    let now = Utc::now();
    roles::ActiveModel {
        name: Set(seed.name.to_string()),
        description: Set(Some(seed.description.to_string())),
        r#type: Set(seed.r#type.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    Ok(Upsert::Created)
}

/// 为角色补齐缺失的动作权限，返回新增数量。角色不存在时返回 NotFound。
pub async fn ensure_permissions<C: ConnectionTrait>(
    db: &C,
    role_type: &str,
    actions: &[&str],
) -> Result<usize, AppError> {
    let role = find_by_type(db, role_type)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Role {} not found", role_type)))?;

    let existing: Vec<String> = permissions::Entity::find()
        .filter(permissions::Column::RoleId.eq(role.id))
        .all(db)
        .await?
        .into_iter()
        .map(|p| p.action)
        .collect();

    let mut created = 0;
    for action in actions.iter().filter(|a| !existing.iter().any(|e| e.as_str() == **a)) {
        permissions::ActiveModel {
            role_id: Set(role.id),
            action: Set(String::from(*action)),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(db)
        .await?;
        created += 1;
    }

    Ok(created)
}

/// 角色是否被授予某个动作。
pub async fn is_allowed<C: ConnectionTrait>(db: &C, role_id: i32, action: &str) -> Result<bool, AppError> {
    let count = permissions::Entity::find()
        .filter(permissions::Column::RoleId.eq(role_id))
        .filter(permissions::Column::Action.eq(action))
        .count(db)
        .await?;
    Ok(count > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;

    const EDITOR: RoleSeed = RoleSeed {
        name: "Editor",
        description: "Role for content editors.",
        r#type: "editor",
    };

    #[tokio::test]
    async fn ensure_role_is_idempotent() {
        let db = test_support::database().await;

        assert_eq!(ensure_role(&db, &EDITOR).await.unwrap(), Upsert::Created);
        assert_eq!(ensure_role(&db, &EDITOR).await.unwrap(), Upsert::Existing);

        let count = roles::Entity::find()
            .filter(roles::Column::Type.eq("editor"))
            .count(&db)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn permissions_are_only_added_once() {
        let db = test_support::database().await;
        ensure_role(&db, &EDITOR).await.unwrap();

        assert_eq!(ensure_permissions(&db, "editor", &["article.find", "article.create"]).await.unwrap(), 2);
        assert_eq!(ensure_permissions(&db, "editor", &["article.find", "article.update"]).await.unwrap(), 1);

        let role = find_by_type(&db, "editor").await.unwrap().unwrap();
        assert!(is_allowed(&db, role.id, "article.update").await.unwrap());
        assert!(!is_allowed(&db, role.id, "article.delete").await.unwrap());
    }

    #[tokio::test]
    async fn permissions_for_missing_role_fail() {
        let db = test_support::database().await;
        let err = ensure_permissions(&db, "ghost", &["article.find"]).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
