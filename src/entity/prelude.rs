pub use super::articles::Entity as Articles;
pub use super::locales::Entity as Locales;
pub use super::permissions::Entity as Permissions;
pub use super::roles::Entity as Roles;
pub use super::users::Entity as Users;
pub use super::webhooks::Entity as Webhooks;
