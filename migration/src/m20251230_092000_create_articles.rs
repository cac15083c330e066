use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Articles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Articles::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Articles::DocumentId).string().not_null().unique_key())
                    .col(ColumnDef::new(Articles::Title).string().not_null())
                    .col(ColumnDef::new(Articles::Slug).string().not_null().unique_key())
                    .col(ColumnDef::new(Articles::Content).text().not_null())
                    .col(ColumnDef::new(Articles::Excerpt).string())
                    .col(ColumnDef::new(Articles::Featured).boolean().not_null().default(false))
                    .col(ColumnDef::new(Articles::Published).boolean().not_null().default(false))
                    .col(ColumnDef::new(Articles::PublishedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Articles::Locale).string().not_null())
                    .col(ColumnDef::new(Articles::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Articles::UpdatedAt).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Articles::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Articles {
    Table,
    Id,
    DocumentId,
    Title,
    Slug,
    Content,
    Excerpt,
    Featured,
    Published,
    PublishedAt,
    Locale,
    CreatedAt,
    UpdatedAt,
}
