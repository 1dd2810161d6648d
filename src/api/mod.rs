// ==========================================
// 工厂生产看板 - API 层
// ==========================================
// 职责: 只读查询接口（产品参考表 / 运行参数 / 日汇总），供 HTTP 路由调用
// ==========================================

pub mod dashboard_api;
pub mod error;

// 重导出核心类型
pub use dashboard_api::{DailySummary, DashboardApi, DowntimeSummary};
pub use error::{ApiError, ApiResult};
