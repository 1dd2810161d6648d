// ==========================================
// 工厂生产看板 - 服务主入口
// ==========================================
// 技术栈: axum(WebSocket) + Rust + SQLite
// 系统定位: 多终端实时录入，中心进程持久化并广播
// ==========================================

use anyhow::Context;
use clap::Parser;
use factory_board::app::{serve, AppState};
use factory_board::config::{load_product_catalog, ServerConfig};
use factory_board::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志系统
    logging::init();

    let config = ServerConfig::parse();

    tracing::info!("==================================================");
    tracing::info!("{}", factory_board::APP_NAME);
    tracing::info!("系统版本: {}", factory_board::VERSION);
    tracing::info!("==================================================");

    // 获取数据库路径
    let db_path = config.resolved_db_path();
    tracing::info!("使用数据库: {}", db_path);

    let catalog = load_product_catalog(config.products.as_deref()).context("产品参考表加载失败")?;

    // 创建AppState
    let app_state = AppState::new(db_path, catalog)
        .map_err(anyhow::Error::msg)
        .context("无法初始化AppState")?;

    let addr = config.socket_addr().context("监听地址无效")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("无法监听 {}", addr))?;

    serve(listener, app_state, shutdown_signal())
        .await
        .context("服务运行失败")?;

    tracing::info!("服务已停止");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("无法监听退出信号: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("收到退出信号，正在停止服务...");
}
