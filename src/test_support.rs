//! 测试辅助：内存 SQLite + 已执行的迁移。

use std::time::Duration;

use sea_orm::DatabaseConnection;

use crate::{
    bootstrap, core::{config::Config, database}, state::AppState, utils::limiter::RateLimiter,
};

/// 只执行迁移的空库。
pub async fn database() -> DatabaseConnection {
    database::connect(&Config::for_tests()).await.unwrap()
}

/// 带有基础角色与默认权限的应用状态，等价于 bootstrap 之后、定时任务之前。
pub async fn state() -> AppState {
    state_with(Config::for_tests()).await
}

pub async fn state_with(config: Config) -> AppState {
    let db = database::connect(&config).await.unwrap();
    bootstrap::setup_default_roles(&db).await;
    let limiter = RateLimiter::in_memory(
        config.rate_limit_max,
        Duration::from_secs(config.rate_limit_window_secs),
    );
    AppState::new(db, limiter, config)
}
