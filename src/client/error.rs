// ==========================================
// 工厂生产看板 - 客户端错误类型
// ==========================================

use crate::domain::Partition;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("连接失败: {0}")]
    Connection(String),

    #[error("未连接到服务端，编辑未发送")]
    NotConnected,

    #[error("条目编解码失败: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("条目类型不属于分区: {partition}")]
    PartitionMismatch { partition: Partition },

    #[error("周期键格式错误: partition={partition}, key={key}")]
    InvalidPeriodKey { partition: Partition, key: String },

    #[error("条目不存在: id={0}")]
    EntryNotFound(String),

    #[error("本地镜像锁获取失败: {0}")]
    LockPoisoned(String),
}

pub type ClientResult<T> = Result<T, ClientError>;
