// src/jobs.rs
use std::time::{Duration, Instant as StdInstant};

use chrono::{DateTime, Utc};
use sea_orm::{sea_query::Expr, *};
use tokio::{task::JoinHandle, time};

use crate::{
    core::{
        constants::{RESET_TOKEN_MAX_AGE_SECS, TOKEN_CLEANUP_INTERVAL_SECS},
        error::AppError,
    },
    entity::users,
    state::AppState,
};

/// 后台定时任务的句柄。服务关闭时调用 `shutdown` 终止。
#[derive(Default)]
pub struct ScheduledJobs {
    handles: Vec<JoinHandle<()>>,
}

impl ScheduledJobs {
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn shutdown(self) {
        for handle in self.handles {
            handle.abort();
        }
        tracing::info!("🛑 Scheduled jobs stopped");
    }
}

/// 启动全部定时任务：
/// - 每小时清理超过 24 小时的密码重置令牌
/// - 每个限流窗口清理一次过期的进程内计数（Redis 依赖 EXPIRE，无需清理）
pub fn spawn(state: &AppState) -> ScheduledJobs {
    tracing::info!("⏰ Scheduling background jobs...");
    let mut jobs = ScheduledJobs::default();

    let db = state.db.clone();
    let period = Duration::from_secs(TOKEN_CLEANUP_INTERVAL_SECS);
    jobs.handles.push(tokio::spawn(async move {
        // 第一次执行在一个周期之后，而不是立即执行
        let mut ticker = time::interval_at(time::Instant::now() + period, period);
        loop {
            ticker.tick().await;
            match cleanup_expired_reset_tokens(&db, Utc::now()).await {
                Ok(0) => {}
                Ok(n) => tracing::info!("🧹 Cleared {} expired reset tokens", n),
                Err(e) => tracing::error!("❌ Reset token cleanup failed: {}", e),
            }
        }
    }));

    if let Some(store) = state.limiter.memory_store().cloned() {
        let window = state.limiter.window();
        jobs.handles.push(tokio::spawn(async move {
            let mut ticker = time::interval_at(time::Instant::now() + window, window);
            loop {
                ticker.tick().await;
                let purged = store.purge_expired(window, StdInstant::now());
                if purged > 0 {
                    tracing::debug!("🧹 Purged {} idle rate-limit counters", purged);
                }
            }
        }));
    }

    jobs
}

/// 清空 `updated_at` 早于 `now - 24h` 且仍带有重置令牌的用户的令牌。
/// 不假设独占访问：单条 UPDATE 完成筛选与写入。
pub async fn cleanup_expired_reset_tokens<C: ConnectionTrait>(db: &C, now: DateTime<Utc>) -> Result<u64, AppError> {
    let cutoff = now - chrono::Duration::seconds(RESET_TOKEN_MAX_AGE_SECS);

    let result = users::Entity::update_many()
        .col_expr(users::Column::ResetPasswordToken, Expr::value(Option::<String>::None))
        .filter(users::Column::ResetPasswordToken.is_not_null())
        .filter(users::Column::UpdatedAt.lt(cutoff))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}
