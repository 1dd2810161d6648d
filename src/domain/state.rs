// ==========================================
// 工厂生产看板 - 全局状态快照
// ==========================================
// 快照 = 五个分区的完整内容，是持久化与首次同步的最小单位
// 条目以原始 JSON 对象保存：中枢只做转发与持久化，不校验结构
// ==========================================

use crate::domain::types::Partition;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// 某一周期的条目列表（顺序即显示顺序）
pub type EntryList = Vec<Value>;

/// 分区内容: 周期键 -> 条目列表
pub type PartitionData = BTreeMap<String, EntryList>;

/// 单个条目的解码结果
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedEntry<E> {
    Typed(E),
    /// 无法按类型解码，保留原始 JSON
    Raw(Value),
}

/// 全局状态快照
///
/// 序列化格式固定为五个键；加载时缺失（或为 null）的分区视为空
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalState {
    #[serde(rename = "producao", default, deserialize_with = "null_as_empty")]
    pub production: PartitionData,
    #[serde(rename = "mensal", default, deserialize_with = "null_as_empty")]
    pub monthly: PartitionData,
    #[serde(rename = "planReal", default, deserialize_with = "null_as_empty")]
    pub plan_real: PartitionData,
    #[serde(rename = "relatorio", default, deserialize_with = "null_as_empty")]
    pub report: PartitionData,
    #[serde(rename = "paradas", default, deserialize_with = "null_as_empty")]
    pub downtime: PartitionData,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<PartitionData, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<PartitionData>::deserialize(deserializer)?.unwrap_or_default())
}

impl GlobalState {
    /// 空的五分区结构
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn partition(&self, partition: Partition) -> &PartitionData {
        match partition {
            Partition::Production => &self.production,
            Partition::Monthly => &self.monthly,
            Partition::PlanReal => &self.plan_real,
            Partition::Report => &self.report,
            Partition::Downtime => &self.downtime,
        }
    }

    pub fn partition_mut(&mut self, partition: Partition) -> &mut PartitionData {
        match partition {
            Partition::Production => &mut self.production,
            Partition::Monthly => &mut self.monthly,
            Partition::PlanReal => &mut self.plan_real,
            Partition::Report => &mut self.report,
            Partition::Downtime => &mut self.downtime,
        }
    }

    /// 读取某分区某周期的条目（不存在时为空）
    pub fn entries(&self, partition: Partition, period_key: &str) -> &[Value] {
        self.partition(partition)
            .get(period_key)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// 整体替换某分区某周期的条目列表
    pub fn replace(&mut self, partition: Partition, period_key: &str, entries: EntryList) {
        self.partition_mut(partition)
            .insert(period_key.to_string(), entries);
    }

    /// 按类型解码某周期的条目
    ///
    /// 无法解码的条目（例如非对象）会被跳过并记录告警，适用于只读汇总
    pub fn decode<E: DeserializeOwned>(&self, partition: Partition, period_key: &str) -> Vec<E> {
        self.decode_all(partition, period_key)
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| match entry {
                DecodedEntry::Typed(entry) => Some(entry),
                DecodedEntry::Raw(_) => {
                    tracing::warn!(partition = %partition, period_key, index, "跳过无法解码的条目");
                    None
                }
            })
            .collect()
    }

    /// 按类型解码某周期的全部条目，无法解码的条目按原位置保留原值
    ///
    /// 编辑后整列表回写时必须使用该方法，否则会删除其他终端写入的条目
    pub fn decode_all<E: DeserializeOwned>(
        &self,
        partition: Partition,
        period_key: &str,
    ) -> Vec<DecodedEntry<E>> {
        self.entries(partition, period_key)
            .iter()
            .map(|value| match E::deserialize(value) {
                Ok(entry) => DecodedEntry::Typed(entry),
                Err(_) => DecodedEntry::Raw(value.clone()),
            })
            .collect()
    }

    /// 周期总数（日志用）
    pub fn period_count(&self) -> usize {
        Partition::ALL
            .iter()
            .map(|p| self.partition(*p).len())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entry::ProductionEntry;
    use serde_json::json;

    #[test]
    fn test_empty_state_serializes_five_keys() {
        let value = serde_json::to_value(GlobalState::empty()).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 5);
        for partition in Partition::ALL {
            assert_eq!(obj.get(partition.as_str()), Some(&json!({})));
        }
    }

    #[test]
    fn test_missing_or_null_partitions_default_to_empty() {
        let state: GlobalState = serde_json::from_value(json!({
            "producao": { "2024-01-01": [{ "id": "a" }] },
            "paradas": null
        }))
        .unwrap();

        assert_eq!(state.entries(Partition::Production, "2024-01-01").len(), 1);
        assert!(state.monthly.is_empty());
        assert!(state.downtime.is_empty());
        assert!(state.entries(Partition::Report, "2024-01").is_empty());
    }

    #[test]
    fn test_replace_is_whole_list() {
        let mut state = GlobalState::empty();
        state.replace(
            Partition::Downtime,
            "2024-01-01",
            vec![json!({"id": "1"}), json!({"id": "2"})],
        );
        state.replace(Partition::Downtime, "2024-01-01", vec![json!({"id": "3"})]);

        let entries = state.entries(Partition::Downtime, "2024-01-01");
        assert_eq!(entries, &[json!({"id": "3"})]);
        assert_eq!(state.period_count(), 1);
    }

    #[test]
    fn test_decode_skips_non_objects() {
        let mut state = GlobalState::empty();
        state.replace(
            Partition::Production,
            "2024-01-01",
            vec![
                json!({"id": "a", "codigo": "204", "produzido": 10, "sobrepeso": 1}),
                json!("garbage"),
            ],
        );

        let entries: Vec<ProductionEntry> = state.decode(Partition::Production, "2024-01-01");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].code, "204");
    }

    #[test]
    fn test_decode_all_keeps_raw_rows_in_place() {
        let mut state = GlobalState::empty();
        state.replace(
            Partition::Production,
            "2024-01-01",
            vec![json!("legacy"), json!({"id": "a", "codigo": "204"}), json!(42)],
        );

        let entries: Vec<DecodedEntry<ProductionEntry>> =
            state.decode_all(Partition::Production, "2024-01-01");
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0], DecodedEntry::Raw(json!("legacy")));
        assert!(matches!(&entries[1], DecodedEntry::Typed(e) if e.id == "a"));
        assert_eq!(entries[2], DecodedEntry::Raw(json!(42)));
    }
}
