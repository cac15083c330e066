use sea_orm_migration::prelude::*;

use crate::m20251229_063000_create_roles::Roles;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 时间戳由应用层写入：SQLite 没有 plpgsql 触发器
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Username).string().not_null().unique_key())
                    .col(ColumnDef::new(Users::Email).string().not_null().unique_key())
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Users::Provider).string().not_null().default("local"))
                    .col(ColumnDef::new(Users::Confirmed).boolean().not_null().default(false))
                    .col(ColumnDef::new(Users::Blocked).boolean().not_null().default(false))
                    .col(ColumnDef::new(Users::Firstname).string())
                    .col(ColumnDef::new(Users::Lastname).string())
                    .col(ColumnDef::new(Users::ResetPasswordToken).string())
                    .col(ColumnDef::new(Users::ConfirmationToken).string())
                    .col(ColumnDef::new(Users::RoleId).integer())
                    .col(ColumnDef::new(Users::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Users::UpdatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_users_role")
                            .from(Users::Table, Users::RoleId)
                            .to(Roles::Table, Roles::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Username,
    Email,
    PasswordHash,
    Provider,
    Confirmed,
    Blocked,
    Firstname,
    Lastname,
    ResetPasswordToken,
    ConfirmationToken,
    RoleId,
    CreatedAt,
    UpdatedAt,
}
