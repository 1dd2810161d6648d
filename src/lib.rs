// ==========================================
// 工厂生产看板 - 核心库
// ==========================================
// 技术栈: Rust + axum(WebSocket) + SQLite
// 系统定位: 多终端实时录入，中心进程持久化并广播
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 分区/条目/快照/产品参考表
pub mod domain;

// 数据仓储层 - 快照持久化
pub mod repository;

// 引擎层 - 派生指标计算（纯函数）
pub mod engine;

// 配置层 - 启动参数/运行参数/产品参考表加载
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 同步层 - 共享状态容器 + 同步中枢 + 实时协议
pub mod sync;

// API 层 - 只读查询接口
pub mod api;

// 应用层 - HTTP/WebSocket 集成
pub mod app;

// 客户端层 - 本地镜像与视图模型
pub mod client;

// ==========================================
// 重导出核心类型
// ==========================================

pub use domain::{
    DowntimeEntry, GlobalState, Partition, PeriodKind, PlanRealEntry, ProductCatalog,
    ProductSpec, ProductionEntry, ReportEntry,
};

pub use repository::{SnapshotStore, StateRepository};

pub use sync::{ClientEvent, ServerEvent, SyncHub, UpdatePayload};

pub use client::{ConnectionStatus, LocalMirror, PartitionView, SyncClient};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "工厂生产看板";
