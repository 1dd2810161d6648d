// ==========================================
// 工厂生产看板 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::DashboardApi;
use crate::config::ConfigManager;
use crate::db::open_sqlite_connection;
use crate::domain::ProductCatalog;
use crate::repository::{SnapshotStore, StateRepository};
use crate::sync::SyncHub;

/// 应用状态
///
/// 路由处理函数通过 axum State 共享（整体 Clone，内部均为 Arc）
#[derive(Clone)]
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 同步中枢
    pub hub: Arc<SyncHub>,

    /// 看板查询API
    pub dashboard_api: Arc<DashboardApi>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 说明
    /// 快照仓储与运行参数共用同一个 SQLite 连接
    pub fn new(db_path: String, catalog: ProductCatalog) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path).map_err(|e| format!("无法打开数据库: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        let repo = StateRepository::from_connection(conn.clone())
            .map_err(|e| format!("快照仓储初始化失败: {}", e))?;
        let config = ConfigManager::from_connection(conn)
            .map_err(|e| format!("运行参数初始化失败: {}", e))?;

        Ok(Self::from_parts(db_path, Arc::new(repo), Arc::new(config), catalog))
    }

    /// 由已构建的组件组装（测试中可注入内存存储）
    pub fn from_parts(
        db_path: String,
        store: Arc<dyn SnapshotStore>,
        config: Arc<ConfigManager>,
        catalog: ProductCatalog,
    ) -> Self {
        let hub = Arc::new(SyncHub::new(store));
        let dashboard_api = Arc::new(DashboardApi::new(hub.clone(), config, Arc::new(catalog)));

        tracing::info!("AppState初始化完成");
        Self {
            db_path,
            hub,
            dashboard_api,
        }
    }
}
