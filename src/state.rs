use sea_orm::DatabaseConnection;
use std::sync::Arc;
use crate::{core::config::Config, utils::limiter::RateLimiter};

/// 在所有处理器与策略之间共享的服务上下文，显式传递，不依赖全局变量。
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    /// 限流器（进程内 DashMap 或 Redis），克隆只复制 Arc
    pub limiter: RateLimiter,
    /// 全局配置，使用 Arc 包装以实现廉价克隆
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: DatabaseConnection, limiter: RateLimiter, config: Config) -> Self {
        Self {
            db,
            limiter,
            config: Arc::new(config),
        }
    }
}
