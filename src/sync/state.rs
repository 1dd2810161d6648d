// ==========================================
// 工厂生产看板 - 共享状态容器
// ==========================================
// 进程内唯一的全局状态，由同步中枢独占持有
// 只支持整列表替换，不做行级更新
// ==========================================

use crate::domain::{EntryList, GlobalState, Partition};
use serde_json::Value;

#[derive(Debug, Clone, Default)]
pub struct SharedState {
    state: GlobalState,
}

impl SharedState {
    pub fn new(state: GlobalState) -> Self {
        Self { state }
    }

    /// 读取某分区某周期的条目（不存在时为空）
    pub fn get(&self, partition: Partition, period_key: &str) -> &[Value] {
        self.state.entries(partition, period_key)
    }

    /// 整体替换某分区某周期的条目列表
    pub fn set(&mut self, partition: Partition, period_key: &str, entries: EntryList) {
        self.state.replace(partition, period_key, entries);
    }

    pub fn snapshot(&self) -> &GlobalState {
        &self.state
    }
}
