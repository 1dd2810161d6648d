// ==========================================
// 工厂生产看板 - 客户端层
// ==========================================
// 职责: 本地状态镜像、分区视图模型、同步连接（断线重连 + 全量重同步）
// ==========================================

pub mod connection;
pub mod error;
pub mod mirror;
pub mod view_model;

pub use connection::{ClientConfig, ConnectionStatus, SyncClient};
pub use error::{ClientError, ClientResult};
pub use mirror::{LocalMirror, MirrorChange};
pub use view_model::PartitionView;
