pub use sea_orm_migration::prelude::*;

mod m20251229_063000_create_roles;
mod m20251229_063323_create_users;
mod m20251230_090000_create_locales;
mod m20251230_091000_create_webhooks;
mod m20251230_092000_create_articles;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20251229_063000_create_roles::Migration),
            Box::new(m20251229_063323_create_users::Migration),
            Box::new(m20251230_090000_create_locales::Migration),
            Box::new(m20251230_091000_create_webhooks::Migration),
            Box::new(m20251230_092000_create_articles::Migration),
        ]
    }
}
