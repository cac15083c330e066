pub mod auth;
pub mod role;
pub mod seed;
pub mod setup;
pub mod user;
