// ==========================================
// 工厂生产看板 - 全局快照仓储
// ==========================================
// 存储: app_state 表 (key-value)，单键 global_state 保存整个快照 JSON
// 并发: 连接互斥锁串行化所有 save，后写覆盖先写（整体替换，不做合并）
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::GlobalState;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

/// 全局快照在 app_state 表中的键
pub const GLOBAL_STATE_KEY: &str = "global_state";

// ==========================================
// 快照存储 Trait
// ==========================================

/// 快照存储
///
/// 同步中枢只依赖该 trait；测试中可替换为内存实现或故障注入实现
pub trait SnapshotStore: Send + Sync {
    /// 加载最近一次持久化的快照；不存在或读取失败时返回空结构
    fn load(&self) -> GlobalState;

    /// 整体覆写快照
    fn save(&self, state: &GlobalState) -> RepositoryResult<()>;
}

// ==========================================
// StateRepository - SQLite 快照仓储
// ==========================================
pub struct StateRepository {
    conn: Arc<Mutex<Connection>>,
}

impl StateRepository {
    /// 打开数据库并确保 app_state 表存在
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Self::from_connection(Arc::new(Mutex::new(conn)))
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        let repo = Self { conn };
        repo.ensure_table()?;
        Ok(repo)
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn ensure_table(&self) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS app_state (
              key TEXT PRIMARY KEY,
              value TEXT
            );
            "#,
        )?;
        Ok(())
    }

    /// 严格加载：读取或解析失败时返回错误
    ///
    /// # 返回
    /// - Ok(Some(state)): 已有快照
    /// - Ok(None): 尚未持久化过
    pub fn try_load(&self) -> RepositoryResult<Option<GlobalState>> {
        let raw: Option<Option<String>> = {
            let conn = self.get_conn()?;
            let value = conn
                .query_row(
                    "SELECT value FROM app_state WHERE key = ?1",
                    params![GLOBAL_STATE_KEY],
                    |row| row.get(0),
                )
                .optional()?;
            value
        };

        match raw.flatten() {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }
}

impl SnapshotStore for StateRepository {
    fn load(&self) -> GlobalState {
        match self.try_load() {
            Ok(Some(state)) => {
                tracing::info!("已加载全局快照: {} 个周期", state.period_count());
                state
            }
            Ok(None) => {
                tracing::info!("未找到全局快照，使用空结构");
                GlobalState::empty()
            }
            Err(e) => {
                tracing::warn!("全局快照加载失败，回退为空结构: {}", e);
                GlobalState::empty()
            }
        }
    }

    fn save(&self, state: &GlobalState) -> RepositoryResult<()> {
        // 序列化在锁外完成
        let json = serde_json::to_string(state)
            .map_err(|e| RepositoryError::SerializationError(e.to_string()))?;

        let conn = self.get_conn()?;
        conn.execute(
            "INSERT OR REPLACE INTO app_state (key, value) VALUES (?1, ?2)",
            params![GLOBAL_STATE_KEY, json],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Partition;
    use serde_json::json;
    use tempfile::NamedTempFile;

    fn temp_repo() -> (NamedTempFile, StateRepository) {
        let temp = NamedTempFile::new().unwrap();
        let repo = StateRepository::new(temp.path().to_str().unwrap()).unwrap();
        (temp, repo)
    }

    #[test]
    fn test_load_without_snapshot_returns_empty() {
        let (_temp, repo) = temp_repo();
        assert!(repo.try_load().unwrap().is_none());
        assert_eq!(repo.load(), GlobalState::empty());
    }

    #[test]
    fn test_save_overwrites_whole_snapshot() {
        let (_temp, repo) = temp_repo();

        let mut first = GlobalState::empty();
        first.replace(Partition::Production, "2024-01-01", vec![json!({"id": "a"})]);
        repo.save(&first).unwrap();

        let mut second = GlobalState::empty();
        second.replace(Partition::Report, "2024-01", vec![json!({"id": "b"})]);
        repo.save(&second).unwrap();

        let loaded = repo.load();
        assert_eq!(loaded, second);
        assert!(loaded.production.is_empty());
    }

    #[test]
    fn test_corrupt_snapshot_falls_back_to_empty() {
        let (_temp, repo) = temp_repo();
        {
            let conn = repo.get_conn().unwrap();
            conn.execute(
                "INSERT OR REPLACE INTO app_state (key, value) VALUES (?1, ?2)",
                params![GLOBAL_STATE_KEY, "{not json"],
            )
            .unwrap();
        }

        assert!(matches!(
            repo.try_load(),
            Err(RepositoryError::SnapshotParseError(_))
        ));
        assert_eq!(repo.load(), GlobalState::empty());
    }

    #[test]
    fn test_null_value_treated_as_missing() {
        let (_temp, repo) = temp_repo();
        {
            let conn = repo.get_conn().unwrap();
            conn.execute(
                "INSERT INTO app_state (key, value) VALUES (?1, NULL)",
                params![GLOBAL_STATE_KEY],
            )
            .unwrap();
        }
        assert!(repo.try_load().unwrap().is_none());
    }
}
