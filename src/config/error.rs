// ==========================================
// 工厂生产看板 - 配置层错误类型
// ==========================================

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置存储失败: {0}")]
    StorageError(String),

    #[error("配置锁获取失败: {0}")]
    LockError(String),

    #[error("未知配置项: {0}")]
    UnknownKey(String),

    #[error("配置值无效: key={key}, value={value}")]
    InvalidValue { key: String, value: String },

    #[error("监听地址无效: {0}")]
    InvalidAddress(String),

    #[error("产品参考表读取失败: {path}: {message}")]
    ProductCatalogError { path: String, message: String },
}

impl From<rusqlite::Error> for ConfigError {
    fn from(err: rusqlite::Error) -> Self {
        ConfigError::StorageError(err.to_string())
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;
