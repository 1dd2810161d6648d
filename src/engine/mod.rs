// ==========================================
// 工厂生产看板 - 派生指标引擎层
// ==========================================
// 红线: 纯函数，无状态，无 I/O
// 红线: 任何除数为 0（或缺失）时结果为 0，不产生 NaN/错误
// 红线: 原始字段任一变更，全部派生字段在同一次操作内整体重算
// ==========================================

pub mod downtime;
pub mod edit;
pub mod metrics;
pub mod report;
pub mod summary;

pub use downtime::{
    duration_minutes, format_hms, minutes_by_reason, parse_clock, shift_stats,
    total_downtime_minutes, ReasonShare, ShiftInputs, ShiftStats, MINUTES_PER_DAY,
};
pub use edit::{DowntimeEdit, EditableEntry, PlanRealEdit, ProductionEdit, ReportEdit};
pub use metrics::{format_percent, overweight_percent, percent_of, sanitize};
pub use report::{apply_product_reference, compute_report_metrics, recompute_report, ReportMetrics};
pub use summary::{
    plan_real_totals, production_status, production_totals, PlanRealTotals, ProductionStatus,
    ProductionTotals,
};
