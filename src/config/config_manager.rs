// ==========================================
// 工厂生产看板 - 运行参数管理器
// ==========================================
// 职责: 运行参数的加载、查询、覆写
// 存储: config_kv 表 (key-value)，未设置的键使用默认值
// ==========================================

use crate::config::error::{ConfigError, ConfigResult};
use crate::db::open_sqlite_connection;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 班次可用时长（分钟）
    pub const SHIFT_AVAILABLE_MINUTES: &str = "shift.available_minutes";

    // 超重率告警阈值 (%)
    pub const OVERWEIGHT_ALERT_PCT: &str = "production.overweight_alert_pct";

    pub const ALL: [&str; 2] = [SHIFT_AVAILABLE_MINUTES, OVERWEIGHT_ALERT_PCT];
}

/// 班次可用时长默认值: 13 小时
pub const DEFAULT_SHIFT_AVAILABLE_MINUTES: u32 = 780;

/// 超重率告警阈值默认值
pub const DEFAULT_OVERWEIGHT_ALERT_PCT: f64 = 2.0;

/// 运行参数快照（已应用默认值）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub shift_available_minutes: u32,
    pub overweight_alert_pct: f64,
    /// config_kv 中显式设置过的原始值
    pub overrides: BTreeMap<String, String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            shift_available_minutes: DEFAULT_SHIFT_AVAILABLE_MINUTES,
            overweight_alert_pct: DEFAULT_OVERWEIGHT_ALERT_PCT,
            overrides: BTreeMap::new(),
        }
    }
}

// ==========================================
// ConfigManager - 运行参数管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> ConfigResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Self::from_connection(Arc::new(Mutex::new(conn)))
    }

    /// 从已有连接创建 ConfigManager（与快照仓储共用连接）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ConfigResult<Self> {
        let manager = Self { conn };
        manager.ensure_table()?;
        Ok(manager)
    }

    fn get_conn(&self) -> ConfigResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| ConfigError::LockError(e.to_string()))
    }

    fn ensure_table(&self) -> ConfigResult<()> {
        let conn = self.get_conn()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS config_kv (
              key TEXT PRIMARY KEY,
              value TEXT NOT NULL,
              updated_at TEXT NOT NULL
            );
            "#,
        )?;
        Ok(())
    }

    /// 从 config_kv 表读取配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self.get_conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 覆写配置值
    ///
    /// 只接受已知键，且值必须能解析为对应类型
    pub fn set_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        if !config_keys::ALL.contains(&key) {
            return Err(ConfigError::UnknownKey(key.to_string()));
        }
        let value = value.trim();
        let valid = match key {
            config_keys::SHIFT_AVAILABLE_MINUTES => parse_minutes(value).is_some(),
            _ => parse_percent(value).is_some(),
        };
        if !valid {
            return Err(ConfigError::InvalidValue {
                key: key.to_string(),
                value: value.to_string(),
            });
        }

        let now = chrono::Local::now().to_rfc3339();
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO config_kv (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = ?3",
            params![key, value, now],
        )?;
        tracing::info!(config_key = key, value, "运行参数已更新");
        Ok(())
    }

    // ===== 班次 =====

    /// 班次可用时长（分钟），默认 780
    pub fn get_shift_available_minutes(&self) -> ConfigResult<u32> {
        let raw = self.get_value(config_keys::SHIFT_AVAILABLE_MINUTES)?;
        Ok(match raw {
            Some(value) => parse_minutes(&value).unwrap_or_else(|| {
                tracing::warn!(
                    config_key = config_keys::SHIFT_AVAILABLE_MINUTES,
                    raw_value = %value,
                    "班次时长配置格式错误，使用默认值"
                );
                DEFAULT_SHIFT_AVAILABLE_MINUTES
            }),
            None => DEFAULT_SHIFT_AVAILABLE_MINUTES,
        })
    }

    // ===== 超重告警 =====

    /// 超重率告警阈值 (%)，默认 2.0
    pub fn get_overweight_alert_pct(&self) -> ConfigResult<f64> {
        let raw = self.get_value(config_keys::OVERWEIGHT_ALERT_PCT)?;
        Ok(match raw {
            Some(value) => parse_percent(&value).unwrap_or_else(|| {
                tracing::warn!(
                    config_key = config_keys::OVERWEIGHT_ALERT_PCT,
                    raw_value = %value,
                    "超重阈值配置格式错误，使用默认值"
                );
                DEFAULT_OVERWEIGHT_ALERT_PCT
            }),
            None => DEFAULT_OVERWEIGHT_ALERT_PCT,
        })
    }

    /// 获取全部运行参数的快照
    pub fn snapshot(&self) -> ConfigResult<RuntimeConfig> {
        let overrides = {
            let conn = self.get_conn()?;
            let mut stmt = conn.prepare("SELECT key, value FROM config_kv ORDER BY key")?;
            let rows = stmt.query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?;

            let mut map = BTreeMap::new();
            for row in rows {
                let (key, value) = row?;
                map.insert(key, value);
            }
            map
        };

        Ok(RuntimeConfig {
            shift_available_minutes: self.get_shift_available_minutes()?,
            overweight_alert_pct: self.get_overweight_alert_pct()?,
            overrides,
        })
    }
}

fn parse_minutes(value: &str) -> Option<u32> {
    value.trim().parse::<u32>().ok()
}

fn parse_percent(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
}
