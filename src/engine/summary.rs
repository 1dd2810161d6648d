// ==========================================
// 工厂生产看板 - 日汇总指标
// ==========================================
// 日产量合计 + 看板状态（超重率超过告警阈值即告警）
// 计划 vs 实际批次合计
// ==========================================

use crate::domain::{PlanRealEntry, ProductionEntry};
use crate::engine::metrics::{overweight_percent, percent_of, sanitize};
use serde::{Deserialize, Serialize};

// ==========================================
// 日产量合计
// ==========================================

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ProductionTotals {
    pub produced_kg: f64,
    pub overweight_kg: f64,
    pub overweight_percent: f64,
}

impl ProductionEntry {
    /// 该条目的超重率 (%)
    pub fn overweight_percent(&self) -> f64 {
        overweight_percent(self.produced_kg, self.overweight_kg)
    }
}

pub fn production_totals(entries: &[ProductionEntry]) -> ProductionTotals {
    let produced_kg: f64 = entries.iter().map(|e| sanitize(e.produced_kg)).sum();
    let overweight_kg: f64 = entries.iter().map(|e| sanitize(e.overweight_kg)).sum();
    ProductionTotals {
        produced_kg,
        overweight_kg,
        overweight_percent: overweight_percent(produced_kg, overweight_kg),
    }
}

// ==========================================
// 看板状态
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductionStatus {
    /// 当日尚无产量
    AwaitingData,
    /// 超重率在目标内
    Conforming,
    /// 超重率超过告警阈值
    OverweightAlert,
}

pub fn production_status(totals: &ProductionTotals, alert_threshold_pct: f64) -> ProductionStatus {
    if totals.produced_kg <= 0.0 {
        ProductionStatus::AwaitingData
    } else if totals.overweight_percent > alert_threshold_pct {
        ProductionStatus::OverweightAlert
    } else {
        ProductionStatus::Conforming
    }
}

// ==========================================
// 计划 vs 实际
// ==========================================

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlanRealTotals {
    pub planned_batches: f64,
    pub real_batches: f64,
    /// 达成率 = 实际 / 计划 * 100
    pub attainment_percent: f64,
}

pub fn plan_real_totals(entries: &[PlanRealEntry]) -> PlanRealTotals {
    let planned_batches: f64 = entries.iter().map(|e| sanitize(e.planned_batches)).sum();
    let real_batches: f64 = entries.iter().map(|e| sanitize(e.real_batches)).sum();
    PlanRealTotals {
        planned_batches,
        real_batches,
        attainment_percent: percent_of(real_batches, planned_batches),
    }
}

impl PlanRealEntry {
    /// 展示标签: 产品 > 订单 > "Sem Nome"
    pub fn display_label(&self) -> &str {
        if !self.product.trim().is_empty() {
            &self.product
        } else if !self.order.trim().is_empty() {
            &self.order
        } else {
            "Sem Nome"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_production_totals_and_status() {
        let entries = vec![
            ProductionEntry::new("204", 100.0, 1.0),
            ProductionEntry::new("901", 300.0, 3.0),
        ];
        let totals = production_totals(&entries);
        assert_eq!(totals.produced_kg, 400.0);
        assert_eq!(totals.overweight_kg, 4.0);
        assert!((totals.overweight_percent - 1.0).abs() < 1e-9);
        assert!((entries[0].overweight_percent() - 1.0).abs() < 1e-9);

        assert_eq!(production_status(&totals, 2.0), ProductionStatus::Conforming);
        assert_eq!(production_status(&totals, 0.5), ProductionStatus::OverweightAlert);
        assert_eq!(
            production_status(&production_totals(&[]), 2.0),
            ProductionStatus::AwaitingData
        );
    }

    #[test]
    fn test_status_around_default_threshold() {
        let above = production_totals(&[ProductionEntry::new("204", 100.0, 2.5)]);
        assert_eq!(production_status(&above, 2.0), ProductionStatus::OverweightAlert);

        let below = production_totals(&[ProductionEntry::new("204", 100.0, 1.5)]);
        assert_eq!(production_status(&below, 2.0), ProductionStatus::Conforming);
    }

    #[test]
    fn test_plan_real_totals() {
        let mut a = PlanRealEntry::blank("2024-01-01");
        a.planned_batches = 10.0;
        a.real_batches = 8.0;
        let mut b = PlanRealEntry::blank("2024-01-01");
        b.planned_batches = 10.0;
        b.real_batches = 10.0;

        let totals = plan_real_totals(&[a, b]);
        assert_eq!(totals.planned_batches, 20.0);
        assert_eq!(totals.real_batches, 18.0);
        assert!((totals.attainment_percent - 90.0).abs() < 1e-9);
        assert_eq!(plan_real_totals(&[]).attainment_percent, 0.0);
    }

    #[test]
    fn test_display_label_fallbacks() {
        let mut entry = PlanRealEntry::blank("2024-01-01");
        assert_eq!(entry.display_label(), "Sem Nome");
        entry.order = "OP-77".to_string();
        assert_eq!(entry.display_label(), "OP-77");
        entry.product = "204".to_string();
        assert_eq!(entry.display_label(), "204");
    }
}
