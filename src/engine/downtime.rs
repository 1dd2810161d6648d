// ==========================================
// 工厂生产看板 - 停机时长与班次统计
// ==========================================
// 时长 = 结束 - 开始（分钟）；结束早于开始视为跨零点，+1440
// 时间无法解析时时长为 0
// 班次可用时长来自配置（shift.available_minutes），产量/批次来自当日录入数据
// ==========================================

use crate::domain::DowntimeEntry;
use crate::engine::metrics::sanitize;
use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// 一天的分钟数
pub const MINUTES_PER_DAY: i64 = 1440;

/// 解析 HH:mm 为零点起的分钟数
pub fn parse_clock(value: &str) -> Option<u32> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .ok()
        .map(|t| t.hour() * 60 + t.minute())
}

/// 停机时长（分钟），永不为负
pub fn duration_minutes(start: &str, end: &str) -> u32 {
    match (parse_clock(start), parse_clock(end)) {
        (Some(s), Some(e)) => {
            let mut diff = e as i64 - s as i64;
            if diff < 0 {
                diff += MINUTES_PER_DAY;
            }
            diff as u32
        }
        _ => 0,
    }
}

impl DowntimeEntry {
    /// 该条停机记录的时长（分钟）
    pub fn duration_minutes(&self) -> u32 {
        duration_minutes(&self.start_time, &self.end_time)
    }
}

/// 当日停机总时长（分钟）
pub fn total_downtime_minutes(entries: &[DowntimeEntry]) -> u32 {
    entries.iter().map(DowntimeEntry::duration_minutes).sum()
}

/// 展示格式: HH:MM:00
pub fn format_hms(minutes: u32) -> String {
    format!("{:02}:{:02}:00", minutes / 60, minutes % 60)
}

/// 按原因汇总的停机时长
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReasonShare {
    pub reason: String,
    pub minutes: u32,
}

/// 按原因汇总（忽略空原因，按首次出现顺序）
pub fn minutes_by_reason(entries: &[DowntimeEntry]) -> Vec<ReasonShare> {
    let mut shares: Vec<ReasonShare> = Vec::new();
    for entry in entries {
        let reason = entry.reason.trim();
        if reason.is_empty() {
            continue;
        }
        let minutes = entry.duration_minutes();
        match shares.iter_mut().find(|s| s.reason == reason) {
            Some(share) => share.minutes += minutes,
            None => shares.push(ReasonShare {
                reason: reason.to_string(),
                minutes,
            }),
        }
    }
    shares
}

/// 班次统计输入
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShiftInputs {
    /// 班次可用时长（分钟）
    pub available_minutes: u32,
    /// 当日产量 (kg)
    pub produced_kg: f64,
    /// 当日批次数
    pub batches: f64,
}

/// 班次统计
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftStats {
    pub available_minutes: u32,
    pub stopped_minutes: u32,
    /// 实际运转时长 = 可用 - 停机（不低于 0）
    pub working_minutes: u32,
    pub produced_kg: f64,
    pub batches: f64,
    /// 实际运转时长内的平均 kg/h
    pub avg_kg_per_hour: f64,
    pub available_hms: String,
    pub stopped_hms: String,
    pub working_hms: String,
}

/// 计算班次统计
pub fn shift_stats(entries: &[DowntimeEntry], inputs: ShiftInputs) -> ShiftStats {
    let stopped_minutes = total_downtime_minutes(entries);
    let working_minutes = inputs.available_minutes.saturating_sub(stopped_minutes);
    let produced_kg = sanitize(inputs.produced_kg);

    let avg_kg_per_hour = if working_minutes > 0 {
        sanitize(produced_kg / (working_minutes as f64 / 60.0))
    } else {
        0.0
    };

    ShiftStats {
        available_minutes: inputs.available_minutes,
        stopped_minutes,
        working_minutes,
        produced_kg,
        batches: sanitize(inputs.batches),
        avg_kg_per_hour,
        available_hms: format_hms(inputs.available_minutes),
        stopped_hms: format_hms(stopped_minutes),
        working_hms: format_hms(working_minutes),
    }
}
