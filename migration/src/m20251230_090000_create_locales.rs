use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Locales::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Locales::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Locales::Name).string().not_null())
                    .col(ColumnDef::new(Locales::Code).string().not_null().unique_key())
                    .col(ColumnDef::new(Locales::IsDefault).boolean().not_null().default(false))
                    .col(ColumnDef::new(Locales::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Locales::UpdatedAt).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Locales::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Locales {
    Table,
    Id,
    Name,
    Code,
    IsDefault,
    CreatedAt,
    UpdatedAt,
}
