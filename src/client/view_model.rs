// ==========================================
// 工厂生产看板 - 分区视图模型
// ==========================================
// 一个视图 = 一个分区 × 一个周期键的条目列表
// - 切换周期时从镜像加载
// - 收到匹配的广播（或全量重同步）时重新加载
// - 本地编辑经指标引擎重算后，整列表作为一次更新事件发出
// - 无法解码的条目原样保留在原位置，回写时不丢失
// ==========================================

use std::sync::Arc;

use crate::client::error::{ClientError, ClientResult};
use crate::client::mirror::{LocalMirror, MirrorChange};
use crate::domain::{DecodedEntry, Partition, ProductCatalog};
use crate::engine::EditableEntry;
use crate::sync::{ClientEvent, UpdatePayload};

pub struct PartitionView<E: EditableEntry> {
    partition: Partition,
    period_key: String,
    rows: Vec<DecodedEntry<E>>,
    catalog: Arc<ProductCatalog>,
}

impl<E: EditableEntry> PartitionView<E> {
    /// 打开视图并从镜像加载
    pub fn open(
        partition: Partition,
        period_key: &str,
        mirror: &LocalMirror,
        catalog: Arc<ProductCatalog>,
    ) -> ClientResult<Self> {
        if !E::PARTITIONS.contains(&partition) {
            return Err(ClientError::PartitionMismatch { partition });
        }
        validate_key(partition, period_key)?;

        let mut view = Self {
            partition,
            period_key: period_key.to_string(),
            rows: Vec::new(),
            catalog,
        };
        view.reload(mirror);
        Ok(view)
    }

    pub fn partition(&self) -> Partition {
        self.partition
    }

    pub fn period_key(&self) -> &str {
        &self.period_key
    }

    /// 可编辑的条目（不含无法解码的原始条目）
    pub fn entries(&self) -> Vec<&E> {
        self.rows
            .iter()
            .filter_map(|row| match row {
                DecodedEntry::Typed(entry) => Some(entry),
                DecodedEntry::Raw(_) => None,
            })
            .collect()
    }

    /// 切换周期
    pub fn select_period(&mut self, period_key: &str, mirror: &LocalMirror) -> ClientResult<()> {
        validate_key(self.partition, period_key)?;
        self.period_key = period_key.to_string();
        self.reload(mirror);
        Ok(())
    }

    /// 从镜像重新加载当前周期
    pub fn reload(&mut self, mirror: &LocalMirror) {
        self.rows = mirror.state().decode_all(self.partition, &self.period_key);
        let raw = self
            .rows
            .iter()
            .filter(|row| matches!(row, DecodedEntry::Raw(_)))
            .count();
        if raw > 0 {
            tracing::warn!(
                partition = %self.partition,
                period_key = %self.period_key,
                raw,
                "存在无法解码的条目，将原样保留"
            );
        }
    }

    /// 处理镜像变更；影响当前视图时重新加载并返回 true
    pub fn on_change(&mut self, change: &MirrorChange, mirror: &LocalMirror) -> bool {
        if change.affects(self.partition, &self.period_key) {
            self.reload(mirror);
            true
        } else {
            false
        }
    }

    /// 新增一行（默认值 + 新 ID）
    pub fn add(&mut self) -> ClientResult<ClientEvent> {
        self.rows.push(DecodedEntry::Typed(E::blank_row(&self.period_key)));
        self.to_event()
    }

    /// 编辑某行的一个字段，派生字段随之重算
    pub fn edit(&mut self, id: &str, edit: E::Edit) -> ClientResult<ClientEvent> {
        let catalog = Arc::clone(&self.catalog);
        let entry = self
            .rows
            .iter_mut()
            .find_map(|row| match row {
                DecodedEntry::Typed(entry) if entry.id() == id => Some(entry),
                _ => None,
            })
            .ok_or_else(|| ClientError::EntryNotFound(id.to_string()))?;
        entry.apply_edit(edit, &catalog);
        self.to_event()
    }

    /// 删除某行
    pub fn remove(&mut self, id: &str) -> ClientResult<ClientEvent> {
        let before = self.rows.len();
        self.rows
            .retain(|row| !matches!(row, DecodedEntry::Typed(entry) if entry.id() == id));
        if self.rows.len() == before {
            return Err(ClientError::EntryNotFound(id.to_string()));
        }
        self.to_event()
    }

    /// 当前整列表的更新事件
    pub fn to_event(&self) -> ClientResult<ClientEvent> {
        let data = self
            .rows
            .iter()
            .map(|row| match row {
                DecodedEntry::Typed(entry) => serde_json::to_value(entry),
                DecodedEntry::Raw(value) => Ok(value.clone()),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ClientEvent::update(
            self.partition,
            UpdatePayload::for_period(self.partition, self.period_key.clone(), data),
        ))
    }
}

fn validate_key(partition: Partition, period_key: &str) -> ClientResult<()> {
    if partition.period_kind().is_valid_key(period_key) {
        Ok(())
    } else {
        Err(ClientError::InvalidPeriodKey {
            partition,
            key: period_key.to_string(),
        })
    }
}
