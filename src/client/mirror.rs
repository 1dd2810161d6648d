// ==========================================
// 工厂生产看板 - 本地状态镜像
// ==========================================
// 客户端持有的全局状态副本:
// - initial_state 整体替换（首次连接与每次重连）
// - <分区>_updated 整列表替换对应周期
// - 本地编辑先写入镜像再发送（服务端不会回送给发送方）
// ==========================================

use crate::domain::{EntryList, GlobalState, Partition};
use crate::sync::{ClientEvent, ServerEvent};
use serde_json::Value;

/// 镜像变更通知（视图据此决定是否重新加载）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MirrorChange {
    /// 全量重同步
    Resynced,
    /// 某分区某周期被整体替换
    Updated { partition: Partition, period_key: String },
}

impl MirrorChange {
    /// 该变更是否影响给定视图
    pub fn affects(&self, partition: Partition, period_key: &str) -> bool {
        match self {
            MirrorChange::Resynced => true,
            MirrorChange::Updated {
                partition: p,
                period_key: k,
            } => *p == partition && k == period_key,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LocalMirror {
    state: GlobalState,
    synced: bool,
}

impl LocalMirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// 是否已收到过 initial_state
    pub fn is_synced(&self) -> bool {
        self.synced
    }

    pub fn state(&self) -> &GlobalState {
        &self.state
    }

    pub fn entries(&self, partition: Partition, period_key: &str) -> &[Value] {
        self.state.entries(partition, period_key)
    }

    /// 应用服务端事件
    pub fn apply_server_event(&mut self, event: ServerEvent) -> Option<MirrorChange> {
        let (partition, payload) = match event {
            ServerEvent::InitialState(state) => {
                self.state = state;
                self.synced = true;
                return Some(MirrorChange::Resynced);
            }
            ServerEvent::ProductionUpdated(p) => (Partition::Production, p),
            ServerEvent::MonthlyUpdated(p) => (Partition::Monthly, p),
            ServerEvent::PlanRealUpdated(p) => (Partition::PlanReal, p),
            ServerEvent::ReportUpdated(p) => (Partition::Report, p),
            ServerEvent::DowntimeUpdated(p) => (Partition::Downtime, p),
        };

        let period_key = match payload.period_key() {
            Some(key) => key.to_string(),
            None => {
                tracing::warn!(partition = %partition, "忽略缺少周期键的广播");
                return None;
            }
        };
        self.set(partition, &period_key, payload.data);
        Some(MirrorChange::Updated {
            partition,
            period_key,
        })
    }

    /// 应用本地发出的更新
    pub fn apply_local(&mut self, event: &ClientEvent) -> Option<MirrorChange> {
        let partition = event.partition();
        let payload = event.payload();
        let period_key = payload.period_key()?.to_string();
        self.set(partition, &period_key, payload.data.clone());
        Some(MirrorChange::Updated {
            partition,
            period_key,
        })
    }

    fn set(&mut self, partition: Partition, period_key: &str, entries: EntryList) {
        self.state.replace(partition, period_key, entries);
    }
}
