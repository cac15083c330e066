use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, registry, util::SubscriberInitExt, EnvFilter,
};

/// 初始化日志：控制台 + 按天滚动的文件（`logs/{file_name}.YYYY-MM-DD`）。
///
/// 服务端与 seed 命令各自使用不同的文件名，避免两个进程写同一个文件。
/// 返回的 guard 必须存活到进程结束，否则尾部日志会丢失。
pub fn init(log_level: &str, file_name: &str) -> WorkerGuard {
    let file_appender = tracing_appender::rolling::daily("logs", file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // 文件层：不带颜色，保留代码位置
    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_writer(non_blocking)
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(true)
        .with_target(false);

    // 控制台层
    let stdout_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(true);

    // RUST_LOG 写错时退回 info，而不是让日志系统初始化失败
    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    guard
}
