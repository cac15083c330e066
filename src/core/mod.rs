pub mod config;
pub mod constants;
pub mod database;
pub mod enums;
pub mod error;
pub mod log;
