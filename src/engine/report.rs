// ==========================================
// 工厂生产看板 - 月度扩展报表派生计算
// ==========================================
// 计算链（每次编辑整体重算 1→6）:
//   1. 总产量(kg)     = 装箱数 * 单箱重量
//   2. 预期得率(kg)   = 实际批次 * 单批面团重量
//   3. 实际得率(%)    = 总产量 / 预期得率 * 100      (预期得率 > 0)
//   4. 单包损耗(g)    = 包装平均重量 - 包装目标重量
//   5. 超重总量(kg)   = 单包损耗/1000 * 总产量/(目标重量/1000)   (目标重量 > 0)
//   6. 超重率(%)      = 超重总量 / 总产量 * 100      (总产量 > 0)
// ==========================================

use crate::domain::{ProductCatalog, ReportEntry};
use crate::engine::metrics::{percent_of, sanitize};
use serde::{Deserialize, Serialize};

/// 报表派生指标
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ReportMetrics {
    pub total_produced_kg: f64,
    pub expected_yield_kg: f64,
    pub real_yield_percent: f64,
    pub loss_per_package_g: f64,
    pub total_overweight_kg: f64,
    pub overweight_percent: f64,
}

/// 由原始字段计算全部派生指标
pub fn compute_report_metrics(entry: &ReportEntry) -> ReportMetrics {
    let boxes = sanitize(entry.boxes_packaged);
    let box_weight = sanitize(entry.box_weight_kg);
    let real_batches = sanitize(entry.real_batches);
    let mass_weight = sanitize(entry.mass_weight_kg);
    let target_g = sanitize(entry.target_package_weight_g);
    let avg_g = sanitize(entry.avg_package_weight_g);

    let total_produced_kg = sanitize(boxes * box_weight);
    let expected_yield_kg = sanitize(real_batches * mass_weight);
    let real_yield_percent = percent_of(total_produced_kg, expected_yield_kg);
    let loss_per_package_g = sanitize(avg_g - target_g);

    let total_overweight_kg = if target_g > 0.0 {
        let packages = total_produced_kg / (target_g / 1000.0);
        sanitize((loss_per_package_g / 1000.0) * packages)
    } else {
        0.0
    };

    let overweight_percent = percent_of(total_overweight_kg, total_produced_kg);

    ReportMetrics {
        total_produced_kg,
        expected_yield_kg,
        real_yield_percent,
        loss_per_package_g,
        total_overweight_kg,
        overweight_percent,
    }
}

/// 重算并写回条目的派生字段
pub fn recompute_report(entry: &mut ReportEntry) -> ReportMetrics {
    let metrics = compute_report_metrics(entry);
    entry.total_produced_kg = metrics.total_produced_kg;
    entry.expected_yield_kg = metrics.expected_yield_kg;
    entry.real_yield_percent = metrics.real_yield_percent;
    entry.loss_per_package_g = metrics.loss_per_package_g;
    entry.total_overweight_kg = metrics.total_overweight_kg;
    entry.overweight_percent = metrics.overweight_percent;
    metrics
}

/// 按产品代码带出重量参数
///
/// 命中参考表时覆盖三个重量字段并返回 true；未命中时保持原值
pub fn apply_product_reference(entry: &mut ReportEntry, catalog: &ProductCatalog) -> bool {
    match catalog.get(&entry.product) {
        Some(spec) => {
            entry.mass_weight_kg = spec.mass_weight_kg;
            entry.box_weight_kg = spec.box_weight_kg;
            entry.target_package_weight_g = spec.target_package_weight_g;
            true
        }
        None => false,
    }
}
