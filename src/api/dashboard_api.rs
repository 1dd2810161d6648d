// ==========================================
// 工厂生产看板 - 看板查询 API
// ==========================================
// 职责: 从同步中枢的当前快照计算日汇总，提供产品参考表与运行参数查询
// 架构: API 层 -> SyncHub(快照) + ConfigManager(运行参数) -> engine(纯计算)
// ==========================================

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};
use crate::config::{ConfigManager, RuntimeConfig};
use crate::domain::{
    DowntimeEntry, Partition, PeriodKind, PlanRealEntry, ProductCatalog, ProductionEntry,
};
use crate::engine::{
    format_hms, minutes_by_reason, plan_real_totals, production_status, production_totals,
    shift_stats, total_downtime_minutes, PlanRealTotals, ProductionStatus, ProductionTotals,
    ReasonShare, ShiftInputs, ShiftStats,
};
use crate::sync::SyncHub;

// ==========================================
// 响应结构
// ==========================================

/// 停机汇总
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DowntimeSummary {
    pub stop_count: usize,
    pub total_minutes: u32,
    pub total_hms: String,
    pub by_reason: Vec<ReasonShare>,
    pub shift: ShiftStats,
}

/// 日汇总
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: String,
    pub production: ProductionTotals,
    pub status: ProductionStatus,
    pub overweight_alert_pct: f64,
    pub plan_real: PlanRealTotals,
    pub downtime: DowntimeSummary,
}

// ==========================================
// DashboardApi - 看板查询 API
// ==========================================
pub struct DashboardApi {
    hub: Arc<SyncHub>,
    config: Arc<ConfigManager>,
    catalog: Arc<ProductCatalog>,
}

impl DashboardApi {
    pub fn new(hub: Arc<SyncHub>, config: Arc<ConfigManager>, catalog: Arc<ProductCatalog>) -> Self {
        Self {
            hub,
            config,
            catalog,
        }
    }

    /// 当前使用的产品参考表
    pub fn products(&self) -> &ProductCatalog {
        &self.catalog
    }

    /// 运行参数快照（已应用默认值）
    pub fn runtime_config(&self) -> ApiResult<RuntimeConfig> {
        Ok(self.config.snapshot()?)
    }

    /// 覆写单个运行参数，返回更新后的快照
    ///
    /// 未知键返回 NotFound，值格式错误返回 InvalidInput
    pub fn update_config(&self, key: &str, value: &str) -> ApiResult<RuntimeConfig> {
        self.config.set_value(key, value)?;
        self.runtime_config()
    }

    /// 计算某日的看板汇总
    ///
    /// # 参数
    /// - date: YYYY-MM-DD
    ///
    /// # 说明
    /// 班次统计的可用时长来自运行参数，产量取当日日产量合计，批次取当日计划实际批次合计
    pub fn daily_summary(&self, date: &str) -> ApiResult<DailySummary> {
        let date = date.trim();
        if !PeriodKind::Date.is_valid_key(date) {
            return Err(ApiError::InvalidInput(format!(
                "日期格式错误: {}（应为 YYYY-MM-DD）",
                date
            )));
        }

        let snapshot = self.hub.snapshot()?;
        let production: Vec<ProductionEntry> = snapshot.decode(Partition::Production, date);
        let plans: Vec<PlanRealEntry> = snapshot.decode(Partition::PlanReal, date);
        let stops: Vec<DowntimeEntry> = snapshot.decode(Partition::Downtime, date);

        let alert_pct = self.config.get_overweight_alert_pct()?;
        let available_minutes = self.config.get_shift_available_minutes()?;

        let production_totals = production_totals(&production);
        let plan_real = plan_real_totals(&plans);
        let total_minutes = total_downtime_minutes(&stops);
        let shift = shift_stats(
            &stops,
            ShiftInputs {
                available_minutes,
                produced_kg: production_totals.produced_kg,
                batches: plan_real.real_batches,
            },
        );

        tracing::debug!(
            date,
            production_entries = production.len(),
            plan_entries = plans.len(),
            stops = stops.len(),
            "日汇总已计算"
        );

        Ok(DailySummary {
            date: date.to_string(),
            status: production_status(&production_totals, alert_pct),
            production: production_totals,
            overweight_alert_pct: alert_pct,
            plan_real,
            downtime: DowntimeSummary {
                stop_count: stops.len(),
                total_minutes,
                total_hms: format_hms(total_minutes),
                by_reason: minutes_by_reason(&stops),
                shift,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::StateRepository;
    use crate::sync::{ClientEvent, UpdatePayload};
    use rusqlite::Connection;
    use serde_json::json;
    use std::sync::Mutex;

    fn in_memory_api() -> (Arc<SyncHub>, DashboardApi) {
        let conn = Arc::new(Mutex::new(Connection::open_in_memory().unwrap()));
        let repo = Arc::new(StateRepository::from_connection(conn.clone()).unwrap());
        let config = Arc::new(ConfigManager::from_connection(conn).unwrap());
        let hub = Arc::new(SyncHub::new(repo));
        let api = DashboardApi::new(hub.clone(), config, Arc::new(ProductCatalog::builtin()));
        (hub, api)
    }

    #[test]
    fn test_daily_summary_from_hub_state() {
        let (hub, api) = in_memory_api();
        let date = "2024-03-05";
        hub.handle_event(
            1,
            ClientEvent::ProductionUpdate(UpdatePayload::for_period(
                Partition::Production,
                date,
                vec![
                    json!({"id": "a", "codigo": "204", "produzido": 3000, "sobrepeso": 30}),
                    json!({"id": "b", "codigo": "901", "produzido": "3000", "sobrepeso": 120}),
                ],
            )),
        )
        .unwrap();
        hub.handle_event(
            1,
            ClientEvent::DowntimeUpdate(UpdatePayload::for_period(
                Partition::Downtime,
                date,
                vec![json!({"id": "s", "inicio": "08:00", "termino": "09:00", "motivo": "Setup"})],
            )),
        )
        .unwrap();

        let summary = api.daily_summary(date).unwrap();
        assert_eq!(summary.production.produced_kg, 6000.0);
        assert!((summary.production.overweight_percent - 2.5).abs() < 1e-9);
        assert_eq!(summary.status, ProductionStatus::OverweightAlert);
        assert_eq!(summary.downtime.total_minutes, 60);
        assert_eq!(summary.downtime.total_hms, "01:00:00");
        assert_eq!(summary.downtime.shift.working_minutes, 720);
        assert_eq!(summary.downtime.shift.avg_kg_per_hour, 500.0);
    }

    #[test]
    fn test_daily_summary_empty_day_and_invalid_date() {
        let (_hub, api) = in_memory_api();
        let summary = api.daily_summary("2024-01-01").unwrap();
        assert_eq!(summary.status, ProductionStatus::AwaitingData);
        assert_eq!(summary.downtime.stop_count, 0);

        assert!(matches!(
            api.daily_summary("2024-13-01"),
            Err(ApiError::InvalidInput(_))
        ));
        assert!(matches!(api.daily_summary("ontem"), Err(ApiError::InvalidInput(_))));
    }

    #[test]
    fn test_runtime_config_defaults() {
        let (_hub, api) = in_memory_api();
        let config = api.runtime_config().unwrap();
        assert_eq!(config.shift_available_minutes, 780);
        assert_eq!(api.products().len(), 18);
    }

    #[test]
    fn test_update_config_feeds_daily_summary() {
        let (_hub, api) = in_memory_api();
        let config = api.update_config("shift.available_minutes", "600").unwrap();
        assert_eq!(config.shift_available_minutes, 600);
        assert_eq!(config.overrides.get("shift.available_minutes").map(String::as_str), Some("600"));

        let summary = api.daily_summary("2024-01-01").unwrap();
        assert_eq!(summary.downtime.shift.available_minutes, 600);

        assert!(matches!(api.update_config("nope", "1"), Err(ApiError::NotFound(_))));
        assert!(matches!(
            api.update_config("production.overweight_alert_pct", "abc"),
            Err(ApiError::InvalidInput(_))
        ));
    }
}
