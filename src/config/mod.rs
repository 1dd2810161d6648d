// ==========================================
// 工厂生产看板 - 配置层
// ==========================================
// 职责: 启动参数（命令行/环境变量）、运行参数（config_kv 表）、产品参考表加载
// ==========================================

pub mod config_manager;
pub mod error;
pub mod product_catalog;
pub mod server_config;

// 重导出核心配置类型
pub use config_manager::{config_keys, ConfigManager, RuntimeConfig};
pub use error::{ConfigError, ConfigResult};
pub use product_catalog::load_product_catalog;
pub use server_config::{get_default_db_path, ServerConfig};
