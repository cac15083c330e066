//! `SeaORM` Entity，与 migration crate 中的表结构一一对应。

pub mod prelude;

pub mod articles;
pub mod locales;
pub mod permissions;
pub mod roles;
pub mod users;
pub mod webhooks;
