// ==========================================
// 工厂生产看板 - 同步层错误类型
// ==========================================

use crate::domain::Partition;
use crate::repository::error::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("快照持久化失败: {0}")]
    Persistence(#[from] RepositoryError),

    #[error("共享状态锁获取失败: {0}")]
    LockPoisoned(String),

    #[error("更新缺少周期键: partition={partition}")]
    MissingPeriodKey { partition: Partition },

    #[error("消息编解码失败: {0}")]
    Codec(#[from] serde_json::Error),
}

pub type SyncResult<T> = Result<T, SyncError>;
