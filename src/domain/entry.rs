// ==========================================
// 工厂生产看板 - 条目实体
// ==========================================
// 线上字段名沿用已持久化数据（葡语），Rust 侧使用语义化字段名
// 解码宽松: 数字/数字字符串/null 均可，非法值退化为 0
// 未识别字段保存在 extra 中，转发时原样带回
// ==========================================

use crate::domain::types::Partition;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 生成新的条目 ID（创建时生成一次，之后不再变更）
pub fn new_entry_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

// ==========================================
// 条目公共接口
// ==========================================

/// 分区条目
pub trait PartitionEntry: Clone + Serialize + DeserializeOwned {
    /// 该条目类型可出现的分区
    const PARTITIONS: &'static [Partition];

    /// 条目唯一 ID
    fn id(&self) -> &str;
}

// ==========================================
// 宽松解码
// ==========================================
pub(crate) mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    /// 将任意 JSON 值转为有限数字，无法解析时为 0
    pub fn to_number(value: &Value) -> f64 {
        let n = match value {
            Value::Number(n) => n.as_f64().unwrap_or(0.0),
            Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
            Value::Bool(true) => 1.0,
            _ => 0.0,
        };
        if n.is_finite() {
            n
        } else {
            0.0
        }
    }

    pub fn number<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(to_number(&value))
    }

    pub fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::String(s) => s,
            Value::Null => String::new(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            other => other.to_string(),
        })
    }
}

// ==========================================
// 日产量条目 (producao)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionEntry {
    #[serde(default, deserialize_with = "lenient::text")]
    pub id: String,
    /// 产品代码
    #[serde(rename = "codigo", default, deserialize_with = "lenient::text")]
    pub code: String,
    /// 产量 (kg)
    #[serde(rename = "produzido", default, deserialize_with = "lenient::number")]
    pub produced_kg: f64,
    /// 超重 (kg)
    #[serde(rename = "sobrepeso", default, deserialize_with = "lenient::number")]
    pub overweight_kg: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProductionEntry {
    pub fn new(code: impl Into<String>, produced_kg: f64, overweight_kg: f64) -> Self {
        Self {
            id: new_entry_id(),
            code: code.into(),
            produced_kg,
            overweight_kg,
            extra: Map::new(),
        }
    }
}

impl PartitionEntry for ProductionEntry {
    const PARTITIONS: &'static [Partition] = &[Partition::Production];

    fn id(&self) -> &str {
        &self.id
    }
}

// ==========================================
// 计划 vs 实际条目 (planReal / mensal)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRealEntry {
    #[serde(default, deserialize_with = "lenient::text")]
    pub id: String,
    #[serde(rename = "data", default, deserialize_with = "lenient::text")]
    pub date: String,
    /// 产品
    #[serde(rename = "produto", default, deserialize_with = "lenient::text")]
    pub product: String,
    /// 生产订单 (OP)
    #[serde(rename = "op", default, deserialize_with = "lenient::text")]
    pub order: String,
    #[serde(rename = "planBat", default, deserialize_with = "lenient::number")]
    pub planned_batches: f64,
    #[serde(rename = "realBat", default, deserialize_with = "lenient::number")]
    pub real_batches: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// 月度分区与日计划分区使用同一条目结构
pub type MonthlyEntry = PlanRealEntry;

impl PlanRealEntry {
    /// 空白行（新增行的默认值）
    pub fn blank(date: impl Into<String>) -> Self {
        Self {
            id: new_entry_id(),
            date: date.into(),
            product: String::new(),
            order: String::new(),
            planned_batches: 0.0,
            real_batches: 0.0,
            extra: Map::new(),
        }
    }
}

impl PartitionEntry for PlanRealEntry {
    const PARTITIONS: &'static [Partition] = &[Partition::PlanReal, Partition::Monthly];

    fn id(&self) -> &str {
        &self.id
    }
}

// ==========================================
// 停机条目 (paradas)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DowntimeEntry {
    #[serde(default, deserialize_with = "lenient::text")]
    pub id: String,
    /// 开始时间 HH:mm
    #[serde(rename = "inicio", default, deserialize_with = "lenient::text")]
    pub start_time: String,
    /// 结束时间 HH:mm
    #[serde(rename = "termino", default, deserialize_with = "lenient::text")]
    pub end_time: String,
    /// 停机原因
    #[serde(rename = "motivo", default, deserialize_with = "lenient::text")]
    pub reason: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DowntimeEntry {
    pub fn blank() -> Self {
        Self {
            id: new_entry_id(),
            start_time: "00:00".to_string(),
            end_time: "00:00".to_string(),
            reason: String::new(),
            extra: Map::new(),
        }
    }
}

impl PartitionEntry for DowntimeEntry {
    const PARTITIONS: &'static [Partition] = &[Partition::Downtime];

    fn id(&self) -> &str {
        &self.id
    }
}

// ==========================================
// 月度扩展报表条目 (relatorio)
// ==========================================
// 派生字段由 engine::report 在每次编辑时整体重算
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEntry {
    #[serde(default, deserialize_with = "lenient::text")]
    pub id: String,
    #[serde(rename = "data", default, deserialize_with = "lenient::text")]
    pub date: String,
    /// 产品代码（命中产品参考表时自动带出重量参数）
    #[serde(rename = "produto", default, deserialize_with = "lenient::text")]
    pub product: String,
    #[serde(rename = "op", default, deserialize_with = "lenient::text")]
    pub order: String,
    #[serde(rename = "planBat", default, deserialize_with = "lenient::number")]
    pub planned_batches: f64,
    #[serde(rename = "realBat", default, deserialize_with = "lenient::number")]
    pub real_batches: f64,
    /// 回用料 (kg)
    #[serde(rename = "reformaUtilizada", default, deserialize_with = "lenient::number")]
    pub rework_used_kg: f64,
    /// 装箱数
    #[serde(rename = "caixasEmbaladas", default, deserialize_with = "lenient::number")]
    pub boxes_packaged: f64,
    /// 日损耗 (kg)
    #[serde(rename = "perdasKgDia", default, deserialize_with = "lenient::number")]
    pub daily_loss_kg: f64,
    /// 产生回用料 (kg)
    #[serde(rename = "reformasGeradas", default, deserialize_with = "lenient::number")]
    pub rework_generated_kg: f64,
    /// 单批面团重量 (kg)
    #[serde(rename = "pesoMassa", default, deserialize_with = "lenient::number")]
    pub mass_weight_kg: f64,
    /// 单箱重量 (kg)
    #[serde(rename = "pesoCaixa", default, deserialize_with = "lenient::number")]
    pub box_weight_kg: f64,
    /// 包装目标重量 (g)
    #[serde(rename = "pesoAlvoPacote", default, deserialize_with = "lenient::number")]
    pub target_package_weight_g: f64,
    /// 包装实测平均重量 (g)
    #[serde(rename = "pesoMedioPacotes", default, deserialize_with = "lenient::number")]
    pub avg_package_weight_g: f64,

    // ===== 派生字段 =====
    #[serde(rename = "totalProduzido", default, deserialize_with = "lenient::number")]
    pub total_produced_kg: f64,
    #[serde(rename = "rendimentoEsperado", default, deserialize_with = "lenient::number")]
    pub expected_yield_kg: f64,
    #[serde(rename = "rendimentoReal", default, deserialize_with = "lenient::number")]
    pub real_yield_percent: f64,
    #[serde(rename = "perdasGPacote", default, deserialize_with = "lenient::number")]
    pub loss_per_package_g: f64,
    #[serde(rename = "sobrepesoTotal", default, deserialize_with = "lenient::number")]
    pub total_overweight_kg: f64,
    #[serde(rename = "sobrepesoPercent", default, deserialize_with = "lenient::number")]
    pub overweight_percent: f64,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ReportEntry {
    /// 空白行：全部数值为 0，日期默认为给定日
    pub fn blank(date: impl Into<String>) -> Self {
        Self {
            id: new_entry_id(),
            date: date.into(),
            product: String::new(),
            order: String::new(),
            planned_batches: 0.0,
            real_batches: 0.0,
            rework_used_kg: 0.0,
            boxes_packaged: 0.0,
            daily_loss_kg: 0.0,
            rework_generated_kg: 0.0,
            mass_weight_kg: 0.0,
            box_weight_kg: 0.0,
            target_package_weight_g: 0.0,
            avg_package_weight_g: 0.0,
            total_produced_kg: 0.0,
            expected_yield_kg: 0.0,
            real_yield_percent: 0.0,
            loss_per_package_g: 0.0,
            total_overweight_kg: 0.0,
            overweight_percent: 0.0,
            extra: Map::new(),
        }
    }
}

impl PartitionEntry for ReportEntry {
    const PARTITIONS: &'static [Partition] = &[Partition::Report];

    fn id(&self) -> &str {
        &self.id
    }
}
