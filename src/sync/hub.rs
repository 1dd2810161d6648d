// ==========================================
// 工厂生产看板 - 同步中枢
// ==========================================
// 连接注册、更新应用、快照持久化、向其他连接广播
// 并发: 单把互斥锁覆盖 应用 + 持久化 + 入队，更新之间完全串行
// 广播: 每个连接持有无界发送队列，由各自的写任务消费，慢连接不阻塞中枢
// ==========================================

use crate::domain::{GlobalState, Partition};
use crate::repository::SnapshotStore;
use crate::sync::error::{SyncError, SyncResult};
use crate::sync::protocol::{ClientEvent, ServerEvent};
use crate::sync::state::SharedState;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;

/// 连接 ID（进程内单调递增）
pub type ConnectionId = u64;

/// 新连接的注册结果
///
/// outbound 的第一条消息一定是 initial_state
#[derive(Debug)]
pub struct Registration {
    pub id: ConnectionId,
    pub outbound: mpsc::UnboundedReceiver<ServerEvent>,
}

/// 一次更新的处理结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateOutcome {
    pub partition: Partition,
    pub period_key: String,
    pub entry_count: usize,
    /// 成功入队的其他连接数
    pub peers_notified: usize,
    /// 快照是否已落盘
    pub persisted: bool,
}

struct HubInner {
    state: SharedState,
    peers: HashMap<ConnectionId, mpsc::UnboundedSender<ServerEvent>>,
    consecutive_persist_failures: u32,
}

// ==========================================
// SyncHub - 同步中枢
// ==========================================
pub struct SyncHub {
    inner: Mutex<HubInner>,
    store: Arc<dyn SnapshotStore>,
    next_id: AtomicU64,
}

impl SyncHub {
    /// 创建中枢并从存储加载初始状态
    pub fn new(store: Arc<dyn SnapshotStore>) -> Self {
        let state = store.load();
        tracing::info!("同步中枢初始化完成: {} 个周期", state.period_count());
        Self {
            inner: Mutex::new(HubInner {
                state: SharedState::new(state),
                peers: HashMap::new(),
                consecutive_persist_failures: 0,
            }),
            store,
            next_id: AtomicU64::new(1),
        }
    }

    fn lock(&self) -> SyncResult<MutexGuard<'_, HubInner>> {
        self.inner
            .lock()
            .map_err(|e| SyncError::LockPoisoned(e.to_string()))
    }

    /// 注册新连接
    ///
    /// 快照入队与注册在同一把锁内完成，之后的增量事件都排在 initial_state 之后
    pub fn connect(&self) -> SyncResult<Registration> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();

        let mut inner = self.lock()?;
        let snapshot = inner.state.snapshot().clone();
        // 接收端仍在本函数内，发送不会失败
        let _ = tx.send(ServerEvent::InitialState(snapshot));
        inner.peers.insert(id, tx);

        tracing::info!(connection_id = id, connections = inner.peers.len(), "客户端已连接");
        Ok(Registration { id, outbound: rx })
    }

    /// 注销连接（重复注销无副作用）
    pub fn disconnect(&self, id: ConnectionId) {
        match self.lock() {
            Ok(mut inner) => {
                if inner.peers.remove(&id).is_some() {
                    tracing::info!(
                        connection_id = id,
                        connections = inner.peers.len(),
                        "客户端已断开"
                    );
                }
            }
            Err(e) => tracing::error!(connection_id = id, "注销连接失败: {}", e),
        }
    }

    /// 处理客户端更新
    ///
    /// 1. 整体替换容器中该周期的条目列表
    /// 2. 同步持久化完整快照（失败只记录，不中断本次更新）
    /// 3. 将相同载荷广播给除发送方外的所有连接
    ///
    /// 阻塞调用（包含 SQLite 写入），异步上下文中应放入 spawn_blocking
    pub fn handle_event(&self, from: ConnectionId, event: ClientEvent) -> SyncResult<UpdateOutcome> {
        let (partition, payload) = event.into_parts();
        let period_key = payload
            .period_key()
            .map(str::to_string)
            .ok_or(SyncError::MissingPeriodKey { partition })?;
        let entry_count = payload.data.len();

        let mut inner = self.lock()?;
        inner.state.set(partition, &period_key, payload.data.clone());

        let persisted = match self.store.save(inner.state.snapshot()) {
            Ok(()) => {
                if inner.consecutive_persist_failures > 0 {
                    tracing::info!(
                        "快照持久化已恢复（此前连续失败 {} 次）",
                        inner.consecutive_persist_failures
                    );
                }
                inner.consecutive_persist_failures = 0;
                true
            }
            Err(e) => {
                inner.consecutive_persist_failures += 1;
                tracing::error!(
                    partition = %partition,
                    period_key = %period_key,
                    consecutive_failures = inner.consecutive_persist_failures,
                    "快照持久化失败: {}",
                    e
                );
                false
            }
        };

        let event = ServerEvent::updated(partition, payload);
        let mut peers_notified = 0;
        let mut dead = Vec::new();
        for (id, tx) in inner.peers.iter() {
            if *id == from {
                continue;
            }
            if tx.send(event.clone()).is_ok() {
                peers_notified += 1;
            } else {
                dead.push(*id);
            }
        }
        for id in dead {
            inner.peers.remove(&id);
            tracing::debug!(connection_id = id, "移除已关闭的连接");
        }

        tracing::info!(
            connection_id = from,
            partition = %partition,
            period_key = %period_key,
            entry_count,
            peers_notified,
            "更新已应用"
        );

        Ok(UpdateOutcome {
            partition,
            period_key,
            entry_count,
            peers_notified,
            persisted,
        })
    }

    /// 当前完整快照
    pub fn snapshot(&self) -> SyncResult<GlobalState> {
        Ok(self.lock()?.state.snapshot().clone())
    }

    pub fn connection_count(&self) -> usize {
        self.lock().map(|inner| inner.peers.len()).unwrap_or(0)
    }

    /// 连续持久化失败次数（成功一次即清零）
    pub fn persist_failures(&self) -> u32 {
        self.lock()
            .map(|inner| inner.consecutive_persist_failures)
            .unwrap_or(0)
    }
}
