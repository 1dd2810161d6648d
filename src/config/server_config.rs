// ==========================================
// 工厂生产看板 - 启动参数
// ==========================================
// 命令行参数优先，其次环境变量，最后默认值
// ==========================================

use crate::config::error::{ConfigError, ConfigResult};
use clap::Parser;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

/// 数据库文件名
const DB_FILE_NAME: &str = "factory_board.db";

#[derive(Debug, Clone, Parser)]
#[command(name = "factory-board", version, about = "工厂生产看板 - 实时同步服务")]
pub struct ServerConfig {
    /// 监听地址
    #[arg(long, env = "FACTORY_BOARD_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// 监听端口
    #[arg(long, env = "FACTORY_BOARD_PORT", default_value_t = 3000)]
    pub port: u16,

    /// SQLite 数据库路径（默认位于用户数据目录）
    #[arg(long, env = "FACTORY_BOARD_DB_PATH")]
    pub db_path: Option<PathBuf>,

    /// 产品参考表 JSON 文件（默认使用内置表）
    #[arg(long, env = "FACTORY_BOARD_PRODUCTS")]
    pub products: Option<PathBuf>,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> ConfigResult<SocketAddr> {
        let ip: IpAddr = self
            .host
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidAddress(self.host.clone()))?;
        Ok(SocketAddr::new(ip, self.port))
    }

    /// 实际使用的数据库路径
    pub fn resolved_db_path(&self) -> String {
        match &self.db_path {
            Some(path) if !path.as_os_str().is_empty() => path.display().to_string(),
            _ => get_default_db_path(),
        }
    }
}

/// 默认数据库路径
///
/// 优先使用用户数据目录；拿不到数据目录时回退到当前目录
pub fn get_default_db_path() -> String {
    let mut path = PathBuf::from("./data.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("factory-board");
        match std::fs::create_dir_all(&dir) {
            Ok(()) => path = dir.join(DB_FILE_NAME),
            Err(e) => {
                tracing::warn!("无法创建数据目录 {}: {}，使用当前目录", dir.display(), e);
            }
        }
    }

    path.to_string_lossy().to_string()
}
