// ==========================================
// 工厂生产看板 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: 全局快照的加载/整体覆写，屏蔽数据库细节
// ==========================================

pub mod error;
pub mod state_repo;

pub use error::{RepositoryError, RepositoryResult};
pub use state_repo::{SnapshotStore, StateRepository, GLOBAL_STATE_KEY};
