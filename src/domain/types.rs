// ==========================================
// 工厂生产看板 - 领域类型定义
// ==========================================
// 分区 (Partition) 与周期键类型 (PeriodKind)
// 线上事件名/快照键均使用部署数据中的葡语标记
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 分区 (Partition)
// ==========================================
// 五个固定分区，每个分区: 周期键 -> 有序条目列表
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Partition {
    /// 日产量 / 超重
    #[serde(rename = "producao")]
    Production,
    /// 月度计划 vs 实际
    #[serde(rename = "mensal")]
    Monthly,
    /// 日计划 vs 实际（批次）
    #[serde(rename = "planReal")]
    PlanReal,
    /// 月度扩展报表（得率/超重）
    #[serde(rename = "relatorio")]
    Report,
    /// 停机记录
    #[serde(rename = "paradas")]
    Downtime,
}

impl Partition {
    /// 全部分区（快照键顺序）
    pub const ALL: [Partition; 5] = [
        Partition::Production,
        Partition::Monthly,
        Partition::PlanReal,
        Partition::Report,
        Partition::Downtime,
    ];

    /// 线上标记（快照键 / 事件名片段）
    pub fn as_str(&self) -> &'static str {
        match self {
            Partition::Production => "producao",
            Partition::Monthly => "mensal",
            Partition::PlanReal => "planReal",
            Partition::Report => "relatorio",
            Partition::Downtime => "paradas",
        }
    }

    /// 从线上标记解析
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == token)
    }

    /// 周期键类型：日分区用日期，月分区用月份
    pub fn period_kind(&self) -> PeriodKind {
        match self {
            Partition::Production | Partition::PlanReal | Partition::Downtime => PeriodKind::Date,
            Partition::Monthly | Partition::Report => PeriodKind::Month,
        }
    }

    /// 客户端 -> 服务端 事件名
    pub fn update_event(&self) -> &'static str {
        match self {
            Partition::Production => "update_producao",
            Partition::Monthly => "update_mensal",
            Partition::PlanReal => "update_planReal",
            Partition::Report => "update_relatorio",
            Partition::Downtime => "update_paradas",
        }
    }

    /// 服务端 -> 其他客户端 事件名
    pub fn updated_event(&self) -> &'static str {
        match self {
            Partition::Production => "producao_updated",
            Partition::Monthly => "mensal_updated",
            Partition::PlanReal => "planReal_updated",
            Partition::Report => "relatorio_updated",
            Partition::Downtime => "paradas_updated",
        }
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// 周期键类型 (PeriodKind)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodKind {
    /// YYYY-MM-DD
    Date,
    /// YYYY-MM
    Month,
}

impl PeriodKind {
    /// 由日期生成周期键
    pub fn key_for(&self, date: NaiveDate) -> String {
        match self {
            PeriodKind::Date => date.format("%Y-%m-%d").to_string(),
            PeriodKind::Month => date.format("%Y-%m").to_string(),
        }
    }

    /// 当天所在周期的键（本地时区）
    pub fn current_key(&self) -> String {
        self.key_for(chrono::Local::now().date_naive())
    }

    /// 校验周期键格式
    ///
    /// 中枢不做校验（只做转发与持久化），该方法供视图层切换周期时使用
    pub fn is_valid_key(&self, key: &str) -> bool {
        match self {
            PeriodKind::Date => {
                key.len() == 10 && NaiveDate::parse_from_str(key, "%Y-%m-%d").is_ok()
            }
            PeriodKind::Month => {
                key.len() == 7
                    && NaiveDate::parse_from_str(&format!("{}-01", key), "%Y-%m-%d").is_ok()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_tokens_round_trip() {
        for partition in Partition::ALL {
            assert_eq!(Partition::from_token(partition.as_str()), Some(partition));
            assert_eq!(
                partition.update_event(),
                format!("update_{}", partition.as_str())
            );
            assert_eq!(
                partition.updated_event(),
                format!("{}_updated", partition.as_str())
            );
        }
        assert_eq!(Partition::from_token("unknown"), None);
    }

    #[test]
    fn test_partition_serde_uses_wire_token() {
        let json = serde_json::to_string(&Partition::PlanReal).unwrap();
        assert_eq!(json, "\"planReal\"");
        let back: Partition = serde_json::from_str("\"paradas\"").unwrap();
        assert_eq!(back, Partition::Downtime);
    }

    #[test]
    fn test_period_kind_per_partition() {
        assert_eq!(Partition::Production.period_kind(), PeriodKind::Date);
        assert_eq!(Partition::PlanReal.period_kind(), PeriodKind::Date);
        assert_eq!(Partition::Downtime.period_kind(), PeriodKind::Date);
        assert_eq!(Partition::Monthly.period_kind(), PeriodKind::Month);
        assert_eq!(Partition::Report.period_kind(), PeriodKind::Month);
    }

    #[test]
    fn test_period_key_format_and_validation() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(PeriodKind::Date.key_for(date), "2024-01-05");
        assert_eq!(PeriodKind::Month.key_for(date), "2024-01");

        assert!(PeriodKind::Date.is_valid_key("2024-01-05"));
        assert!(!PeriodKind::Date.is_valid_key("2024-13-05"));
        assert!(!PeriodKind::Date.is_valid_key("2024-01"));
        assert!(PeriodKind::Month.is_valid_key("2024-12"));
        assert!(!PeriodKind::Month.is_valid_key("2024-00"));
        assert!(!PeriodKind::Month.is_valid_key("2024-01-05"));
    }
}
