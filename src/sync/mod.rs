// ==========================================
// 工厂生产看板 - 同步层
// ==========================================
// 职责: 共享状态容器 + 同步中枢 + 实时协议
// 红线: 每次更新在同一把锁内完成 应用 -> 持久化 -> 入队广播
// 红线: 广播排除发送方；新连接先收到且只收到一次 initial_state
// ==========================================

pub mod error;
pub mod hub;
pub mod protocol;
pub mod state;

pub use error::{SyncError, SyncResult};
pub use hub::{ConnectionId, Registration, SyncHub, UpdateOutcome};
pub use protocol::{ClientEvent, ServerEvent, UpdatePayload};
pub use state::SharedState;
