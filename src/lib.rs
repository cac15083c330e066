// src/lib.rs
pub mod bootstrap;
pub mod core;
pub mod dtos;
pub mod entity;
pub mod extractors;
pub mod handlers;
pub mod jobs;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod start;
pub mod state;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_support;
