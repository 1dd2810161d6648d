// ==========================================
// 工厂生产看板 - 基础指标
// ==========================================
// 超重率 = 超重 / 产量 * 100（产量 > 0），否则 0
// 内部保持全精度，仅在展示时保留两位小数
// ==========================================

/// 非有限值（NaN / ±inf）按 0 处理
pub fn sanitize(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// 百分比: numerator / denominator * 100，分母非正时为 0
pub fn percent_of(numerator: f64, denominator: f64) -> f64 {
    let numerator = sanitize(numerator);
    let denominator = sanitize(denominator);
    if denominator > 0.0 {
        sanitize(numerator / denominator * 100.0)
    } else {
        0.0
    }
}

/// 日产量条目超重率 (%)
pub fn overweight_percent(produced_kg: f64, overweight_kg: f64) -> f64 {
    percent_of(overweight_kg, produced_kg)
}

/// 展示格式: 两位小数
pub fn format_percent(value: f64) -> String {
    format!("{:.2}", sanitize(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overweight_percent() {
        assert!((overweight_percent(100.0, 5.0) - 5.0).abs() < 1e-9);
        assert_eq!(format_percent(overweight_percent(100.0, 5.0)), "5.00");
        assert_eq!(overweight_percent(0.0, 5.0), 0.0);
        assert_eq!(overweight_percent(-10.0, 5.0), 0.0);
    }

    #[test]
    fn test_overweight_percent_keeps_full_precision() {
        let pct = overweight_percent(300.0, 1.0);
        assert!((pct - 0.333_333_333).abs() < 1e-6);
        assert_eq!(format_percent(pct), "0.33");
    }

    #[test]
    fn test_non_finite_inputs_degrade_to_zero() {
        assert_eq!(overweight_percent(f64::NAN, 5.0), 0.0);
        assert_eq!(overweight_percent(100.0, f64::INFINITY), 0.0);
        assert_eq!(sanitize(f64::NEG_INFINITY), 0.0);
        assert_eq!(format_percent(f64::NAN), "0.00");
    }
}
