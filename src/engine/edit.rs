// ==========================================
// 工厂生产看板 - 单字段编辑
// ==========================================
// 视图层每次编辑只改一个字段，随后整行的派生字段立即重算
// 数值字段: 非有限值按 0 处理；产量/超重不允许为负
// ==========================================

use crate::domain::{
    DowntimeEntry, PartitionEntry, PeriodKind, PlanRealEntry, ProductCatalog, ProductionEntry,
    ReportEntry,
};
use crate::engine::metrics::sanitize;
use crate::engine::report::{apply_product_reference, recompute_report};
use serde::{Deserialize, Serialize};

/// 可编辑条目
pub trait EditableEntry: PartitionEntry {
    /// 单字段编辑
    type Edit;

    /// 新增行的默认值（周期键为视图当前周期）
    fn blank_row(period_key: &str) -> Self;

    /// 应用一次编辑，并重算全部派生字段
    fn apply_edit(&mut self, edit: Self::Edit, catalog: &ProductCatalog);
}

fn non_negative(value: f64) -> f64 {
    sanitize(value).max(0.0)
}

// ==========================================
// 日产量
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ProductionEdit {
    Code(String),
    ProducedKg(f64),
    OverweightKg(f64),
}

impl EditableEntry for ProductionEntry {
    type Edit = ProductionEdit;

    fn blank_row(_period_key: &str) -> Self {
        ProductionEntry::new("", 0.0, 0.0)
    }

    fn apply_edit(&mut self, edit: ProductionEdit, _catalog: &ProductCatalog) {
        match edit {
            ProductionEdit::Code(code) => self.code = code,
            ProductionEdit::ProducedKg(v) => self.produced_kg = non_negative(v),
            ProductionEdit::OverweightKg(v) => self.overweight_kg = non_negative(v),
        }
    }
}

// ==========================================
// 计划 vs 实际 / 月度
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlanRealEdit {
    Date(String),
    Product(String),
    Order(String),
    PlannedBatches(f64),
    RealBatches(f64),
}

impl EditableEntry for PlanRealEntry {
    type Edit = PlanRealEdit;

    fn blank_row(period_key: &str) -> Self {
        PlanRealEntry::blank(period_key)
    }

    fn apply_edit(&mut self, edit: PlanRealEdit, _catalog: &ProductCatalog) {
        match edit {
            PlanRealEdit::Date(date) => self.date = date,
            PlanRealEdit::Product(product) => self.product = product,
            PlanRealEdit::Order(order) => self.order = order,
            PlanRealEdit::PlannedBatches(v) => self.planned_batches = sanitize(v),
            PlanRealEdit::RealBatches(v) => self.real_batches = sanitize(v),
        }
    }
}

// ==========================================
// 停机
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DowntimeEdit {
    Start(String),
    End(String),
    Reason(String),
}

impl EditableEntry for DowntimeEntry {
    type Edit = DowntimeEdit;

    fn blank_row(_period_key: &str) -> Self {
        DowntimeEntry::blank()
    }

    fn apply_edit(&mut self, edit: DowntimeEdit, _catalog: &ProductCatalog) {
        match edit {
            DowntimeEdit::Start(t) => self.start_time = t,
            DowntimeEdit::End(t) => self.end_time = t,
            DowntimeEdit::Reason(r) => self.reason = r,
        }
    }
}

// ==========================================
// 月度扩展报表
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ReportEdit {
    Date(String),
    Product(String),
    Order(String),
    PlannedBatches(f64),
    RealBatches(f64),
    ReworkUsedKg(f64),
    BoxesPackaged(f64),
    DailyLossKg(f64),
    ReworkGeneratedKg(f64),
    MassWeightKg(f64),
    BoxWeightKg(f64),
    TargetPackageWeightG(f64),
    AvgPackageWeightG(f64),
}

impl EditableEntry for ReportEntry {
    type Edit = ReportEdit;

    /// 报表视图以月份为周期，新增行日期默认为当天
    fn blank_row(_period_key: &str) -> Self {
        let mut entry = ReportEntry::blank(PeriodKind::Date.current_key());
        recompute_report(&mut entry);
        entry
    }

    fn apply_edit(&mut self, edit: ReportEdit, catalog: &ProductCatalog) {
        match edit {
            ReportEdit::Date(date) => self.date = date,
            ReportEdit::Product(product) => {
                self.product = product;
                apply_product_reference(self, catalog);
            }
            ReportEdit::Order(order) => self.order = order,
            ReportEdit::PlannedBatches(v) => self.planned_batches = sanitize(v),
            ReportEdit::RealBatches(v) => self.real_batches = sanitize(v),
            ReportEdit::ReworkUsedKg(v) => self.rework_used_kg = sanitize(v),
            ReportEdit::BoxesPackaged(v) => self.boxes_packaged = sanitize(v),
            ReportEdit::DailyLossKg(v) => self.daily_loss_kg = sanitize(v),
            ReportEdit::ReworkGeneratedKg(v) => self.rework_generated_kg = sanitize(v),
            ReportEdit::MassWeightKg(v) => self.mass_weight_kg = sanitize(v),
            ReportEdit::BoxWeightKg(v) => self.box_weight_kg = sanitize(v),
            ReportEdit::TargetPackageWeightG(v) => self.target_package_weight_g = sanitize(v),
            ReportEdit::AvgPackageWeightG(v) => self.avg_package_weight_g = sanitize(v),
        }
        recompute_report(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_production_edit_clamps_negative() {
        let catalog = ProductCatalog::builtin();
        let mut entry = ProductionEntry::blank_row("2024-01-01");
        entry.apply_edit(ProductionEdit::ProducedKg(-5.0), &catalog);
        entry.apply_edit(ProductionEdit::OverweightKg(f64::NAN), &catalog);
        assert_eq!(entry.produced_kg, 0.0);
        assert_eq!(entry.overweight_kg, 0.0);

        entry.apply_edit(ProductionEdit::ProducedKg(100.0), &catalog);
        entry.apply_edit(ProductionEdit::OverweightKg(5.0), &catalog);
        assert_eq!(entry.produced_kg, 100.0);
        assert!((entry.overweight_percent() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_report_product_edit_pulls_reference_and_recomputes() {
        let catalog = ProductCatalog::builtin();
        let mut entry = ReportEntry::blank("2024-01-10");
        entry.apply_edit(ReportEdit::RealBatches(10.0), &catalog);
        entry.apply_edit(ReportEdit::BoxesPackaged(400.0), &catalog);
        entry.apply_edit(ReportEdit::Product("204".to_string()), &catalog);

        assert_eq!(entry.mass_weight_kg, 491.70);
        assert_eq!(entry.box_weight_kg, 12.0);
        assert_eq!(entry.total_produced_kg, 4800.0);
        assert!((entry.expected_yield_kg - 4917.0).abs() < 1e-9);

        entry.apply_edit(ReportEdit::AvgPackageWeightG(1010.0), &catalog);
        assert!((entry.total_overweight_kg - 48.0).abs() < 1e-9);
        assert!((entry.overweight_percent - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_report_unknown_product_keeps_weights() {
        let catalog = ProductCatalog::builtin();
        let mut entry = ReportEntry::blank("2024-01-10");
        entry.apply_edit(ReportEdit::BoxWeightKg(10.0), &catalog);
        entry.apply_edit(ReportEdit::BoxesPackaged(3.0), &catalog);
        entry.apply_edit(ReportEdit::Product("nao-existe".to_string()), &catalog);

        assert_eq!(entry.box_weight_kg, 10.0);
        assert_eq!(entry.total_produced_kg, 30.0);
    }

    #[test]
    fn test_downtime_and_plan_edits() {
        let catalog = ProductCatalog::builtin();
        let mut stop = DowntimeEntry::blank_row("2024-01-01");
        stop.apply_edit(DowntimeEdit::Start("23:30".to_string()), &catalog);
        stop.apply_edit(DowntimeEdit::End("00:15".to_string()), &catalog);
        stop.apply_edit(DowntimeEdit::Reason("Setup".to_string()), &catalog);
        assert_eq!(stop.duration_minutes(), 45);

        let mut plan = PlanRealEntry::blank_row("2024-01-01");
        assert_eq!(plan.date, "2024-01-01");
        plan.apply_edit(PlanRealEdit::PlannedBatches(12.0), &catalog);
        plan.apply_edit(PlanRealEdit::Order("OP-1".to_string()), &catalog);
        assert_eq!(plan.planned_batches, 12.0);
        assert_eq!(plan.display_label(), "OP-1");
    }
}
