// src/start.rs
use std::{net::SocketAddr, time::Duration};

use secrecy::ExposeSecret;
use tokio::{net::TcpListener, signal};

use crate::{
    bootstrap,
    core::{config::Config, database, error::AppError, log},
    routes,
    state::AppState,
    utils::limiter::RateLimiter,
};

/// 启动并运行服务：
/// 1. 加载配置、初始化日志
/// 2. 连接数据库并执行迁移
/// 3. 创建限流器（配置了 REDIS_URL 时使用 Redis）
/// 4. 执行 bootstrap（角色、Webhook、语言、定时任务、配置检查）
/// 5. 启动 HTTP 服务，收到关闭信号后优雅退出并停止定时任务
///
/// 前三步失败会直接返回错误，由 `main` 记录并以退出码 1 结束。
pub async fn run() -> Result<(), AppError> {
    let config = Config::load()?;

    // guard 必须存活到函数结束，否则文件日志会丢失
    let _guard = log::init(&config.rust_log, "app.log");
    tracing::info!("🔍 Config loaded successfully. env={}", config.node_env);

    let db = database::connect(&config).await?;
    tracing::info!("✅ Database connected, migrations applied.");

    let limiter = build_limiter(&config).await?;
    let state = AppState::new(db, limiter, config.clone());

    let jobs = bootstrap::bootstrap(&state).await;

    let addr: SocketAddr = format!("{}:{}", config.server_host, config.server_port)
        .parse()
        .map_err(|e| AppError::InternalServerError(format!("Invalid address configuration: {}", e)))?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("🚀 Server listening on http://{}", addr);

    let app = routes::create_router(state);

    // 限流需要对端地址，因此带上 ConnectInfo
    let served = axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await;

    jobs.shutdown();
    served?;

    tracing::info!("👋 Server stopped");
    Ok(())
}

async fn build_limiter(config: &Config) -> Result<RateLimiter, AppError> {
    // 窗口为 0 没有意义，且定时清理的间隔不能为 0
    let window = Duration::from_secs(config.rate_limit_window_secs.max(1));

    match &config.redis_url {
        Some(url) if !url.expose_secret().is_empty() => {
            let client = redis::Client::open(url.expose_secret())?;
            let manager = client.get_connection_manager().await?;
            tracing::info!("✅ Redis connected, rate-limit counters are shared.");
            Ok(RateLimiter::redis(manager, config.rate_limit_max, window))
        }
        _ => {
            tracing::info!("🧮 Using in-process rate-limit counters.");
            Ok(RateLimiter::in_memory(config.rate_limit_max, window))
        }
    }
}

/// 等待 Ctrl+C（SIGINT）或 SIGTERM。
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("❌ Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("❌ Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("🛑 Signal received, starting graceful shutdown...");
}
