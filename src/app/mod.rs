// ==========================================
// 工厂生产看板 - 应用层
// ==========================================
// 职责: HTTP/WebSocket 集成，连接客户端与同步中枢
// ==========================================

pub mod routes;
pub mod state;

// 重导出
pub use routes::{build_router, serve};
pub use state::AppState;
