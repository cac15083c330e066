// src/main.rs
#[tokio::main]
async fn main() {
    if let Err(e) = cms_backend::start::run().await {
        // 日志系统可能尚未初始化（例如配置加载失败），所以同时写 stderr
        eprintln!("❌ Server failed to start: {e}");
        tracing::error!("❌ Server failed to start: {}", e);
        std::process::exit(1);
    }
}
