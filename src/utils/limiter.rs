use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use redis::aio::ConnectionManager;
use redis::Script;

use crate::core::{constants::REDIS_PREFIX_RATE_LIMIT, error::AppError};

/// 限流计数存储。`hit` 记录一次请求，返回当前窗口内（含本次）的请求数。
#[async_trait]
pub trait CounterStore: Send + Sync {
    async fn hit(&self, key: &str, window: Duration) -> Result<u64, AppError>;
}

#[derive(Debug, Clone, Copy)]
struct WindowEntry {
    count: u64,
    window_start: Instant,
}

/// 进程内固定窗口计数表。DashMap 的 entry 持有分片写锁，
/// 同一个 key 的“判断过期 → 重置 → 自增”是原子的。
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, WindowEntry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 以给定时刻记录一次请求。
    pub fn hit_at(&self, key: &str, window: Duration, now: Instant) -> u64 {
        let mut entry = self.entries.entry(key.to_string()).or_insert(WindowEntry {
            count: 0,
            window_start: now,
        });

        if now.saturating_duration_since(entry.window_start) >= window {
            entry.count = 0;
            entry.window_start = now;
        }

        entry.count += 1;
        entry.count
    }

    /// 清理窗口已经结束的 key，返回清理数量。
    /// 清理期间可能有新请求写入已扫过的分片，所以只统计 retain 实际删除的条目。
    pub fn purge_expired(&self, window: Duration, now: Instant) -> usize {
        let mut purged = 0;
        self.entries.retain(|_, e| {
            let live = now.saturating_duration_since(e.window_start) < window;
            if !live {
                purged += 1;
            }
            live
        });
        purged
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl CounterStore for MemoryStore {
    async fn hit(&self, key: &str, window: Duration) -> Result<u64, AppError> {
        Ok(self.hit_at(key, window, Instant::now()))
    }
}

/// Redis 计数存储：多个实例共享同一组计数器。
pub struct RedisStore {
    manager: ConnectionManager,
}

impl RedisStore {
    pub fn new(manager: ConnectionManager) -> Self {
        Self { manager }
    }
}

#[async_trait]
impl CounterStore for RedisStore {
    async fn hit(&self, key: &str, window: Duration) -> Result<u64, AppError> {
        let mut conn = self.manager.clone();

        // 原子操作：自增并设置过期时间（如果是窗口内第一次）
        let script = Script::new(r#"
            local count = redis.call("INCR", KEYS[1])
            if count == 1 then
                redis.call("EXPIRE", KEYS[1], ARGV[1])
            end
            return count
        "#);

        let count: u64 = script
            .key(format!("{}{}", REDIS_PREFIX_RATE_LIMIT, key))
            .arg(window.as_secs().max(1))
            .invoke_async(&mut conn)
            .await?;

        Ok(count)
    }
}

/// 固定窗口限流器：窗口内第 `max_requests` 个请求仍放行，之后拒绝。
#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn CounterStore>,
    /// 进程内存储的句柄，供定时清理使用；Redis 依赖 EXPIRE 自行过期。
    memory: Option<Arc<MemoryStore>>,
    max_requests: u64,
    window: Duration,
}

impl RateLimiter {
    pub fn in_memory(max_requests: u64, window: Duration) -> Self {
        let memory = Arc::new(MemoryStore::new());
        Self {
            store: memory.clone(),
            memory: Some(memory),
            max_requests,
            window,
        }
    }

    pub fn redis(manager: ConnectionManager, max_requests: u64, window: Duration) -> Self {
        Self {
            store: Arc::new(RedisStore::new(manager)),
            memory: None,
            max_requests,
            window,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn memory_store(&self) -> Option<&Arc<MemoryStore>> {
        self.memory.as_ref()
    }

    pub async fn check(&self, key: &str) -> Result<(), AppError> {
        let count = self.store.hit(key, self.window).await?;

        if count > self.max_requests {
            tracing::warn!("⛔ Rate limit exceeded: {} ({}/{})", key, count, self.max_requests);
            return Err(AppError::RateLimitExceeded("Too Many Requests".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_secs(60);

    #[test]
    fn counts_reset_when_window_rolls_over() {
        let store = MemoryStore::new();
        let t0 = Instant::now();

        assert_eq!(store.hit_at("a", WINDOW, t0), 1);
        assert_eq!(store.hit_at("a", WINDOW, t0 + Duration::from_secs(59)), 2);
        // 恰好到达窗口边界即开启新窗口
        assert_eq!(store.hit_at("a", WINDOW, t0 + WINDOW), 1);
        assert_eq!(store.hit_at("a", WINDOW, t0 + WINDOW + Duration::from_secs(1)), 2);
    }

    #[test]
    fn keys_are_counted_independently() {
        let store = MemoryStore::new();
        let now = Instant::now();
        for _ in 0..5 {
            store.hit_at("10.0.0.1", WINDOW, now);
        }
        assert_eq!(store.hit_at("10.0.0.2", WINDOW, now), 1);
        assert_eq!(store.hit_at("10.0.0.1", WINDOW, now), 6);
    }

    #[test]
    fn purge_drops_only_expired_windows() {
        let store = MemoryStore::new();
        let t0 = Instant::now();
        store.hit_at("old", WINDOW, t0);
        store.hit_at("fresh", WINDOW, t0 + Duration::from_secs(30));

        assert_eq!(store.purge_expired(WINDOW, t0 + Duration::from_secs(61)), 1);
        assert_eq!(store.len(), 1);
        assert_eq!(store.hit_at("fresh", WINDOW, t0 + Duration::from_secs(61)), 2);
    }

    #[test]
    fn purge_tolerates_concurrent_inserts() {
        let store = Arc::new(MemoryStore::new());
        let t0 = Instant::now();
        let stop = Arc::new(std::sync::atomic::AtomicBool::new(false));

        let writer = {
            let store = store.clone();
            let stop = stop.clone();
            std::thread::spawn(move || {
                let mut i = 0u64;
                while !stop.load(std::sync::atomic::Ordering::Relaxed) {
                    store.hit_at(&format!("client-{i}"), WINDOW, Instant::now());
                    i += 1;
                }
            })
        };

        // 过期窗口的 key 全部被清掉，且统计值不会超过实际删除数
        let mut total = 0;
        for _ in 0..20_000 {
            total += store.purge_expired(WINDOW, t0 + WINDOW * 2);
        }
        stop.store(true, std::sync::atomic::Ordering::Relaxed);
        writer.join().unwrap();

        let remaining = store.len();
        total += store.purge_expired(WINDOW, t0 + WINDOW * 2);
        assert!(store.is_empty());
        assert!(total >= remaining);
    }

    #[tokio::test]
    async fn first_hundred_pass_and_the_next_is_rejected() {
        let limiter = RateLimiter::in_memory(100, WINDOW);

        for _ in 0..100 {
            limiter.check("127.0.0.1").await.unwrap();
        }
        let err = limiter.check("127.0.0.1").await.unwrap_err();
        assert!(matches!(err, AppError::RateLimitExceeded(ref m) if m == "Too Many Requests"));

        // 其它客户端不受影响
        limiter.check("127.0.0.2").await.unwrap();
    }

    #[tokio::test]
    async fn concurrent_hits_are_all_counted() {
        let limiter = RateLimiter::in_memory(1_000, WINDOW);
        let mut handles = Vec::new();
        for _ in 0..8 {
            let limiter = limiter.clone();
            handles.push(tokio::spawn(async move {
                for _ in 0..50 {
                    limiter.check("shared").await.unwrap();
                }
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        let store = limiter.memory_store().unwrap();
        assert_eq!(store.hit_at("shared", WINDOW, Instant::now()), 401);
    }
}
