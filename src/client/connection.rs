// ==========================================
// 工厂生产看板 - 客户端同步连接
// ==========================================
// - 连接 ws://<host>/ws，收到 initial_state 后才视为已连接
// - 断线后按固定间隔重连，每次重连都会收到新的 initial_state
// - 断线期间的本地编辑不排队，直接丢弃并告警
// ==========================================

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use crate::client::error::{ClientError, ClientResult};
use crate::client::mirror::{LocalMirror, MirrorChange};
use crate::client::view_model::PartitionView;
use crate::domain::{Partition, ProductCatalog};
use crate::engine::EditableEntry;
use crate::sync::{ClientEvent, ServerEvent};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// 变更通知通道容量
const CHANGE_CHANNEL_CAPACITY: usize = 256;

// ==========================================
// 连接配置
// ==========================================
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// 服务端地址（例如 "ws://127.0.0.1:3000"）
    pub server_url: String,
    /// 断线自动重连
    pub auto_reconnect: bool,
    /// 重连间隔
    pub reconnect_delay: Duration,
    /// 最大重连次数（0 = 不限）
    pub max_reconnect_attempts: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: "ws://127.0.0.1:3000".to_string(),
            auto_reconnect: true,
            reconnect_delay: Duration::from_secs(2),
            max_reconnect_attempts: 0,
        }
    }
}

impl ClientConfig {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            ..Default::default()
        }
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    pub fn with_auto_reconnect(mut self, enabled: bool) -> Self {
        self.auto_reconnect = enabled;
        self
    }

    /// WebSocket 端点
    fn ws_url(&self) -> String {
        let base = self.server_url.trim_end_matches('/');
        if base.ends_with("/ws") {
            base.to_string()
        } else {
            format!("{}/ws", base)
        }
    }
}

/// 连接状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// 正在连接（或已连上但尚未收到 initial_state）
    Connecting,
    /// 已连接且镜像已同步
    Connected,
    /// 已断开（等待重连或已停止）
    Disconnected,
}

// ==========================================
// SyncClient - 同步会话
// ==========================================
pub struct SyncClient {
    mirror: Arc<Mutex<LocalMirror>>,
    outgoing: mpsc::UnboundedSender<ClientEvent>,
    status: watch::Receiver<ConnectionStatus>,
    changes: broadcast::Sender<MirrorChange>,
    task: JoinHandle<()>,
}

impl SyncClient {
    /// 启动同步会话（后台任务负责连接与重连）
    pub fn start(config: ClientConfig) -> Self {
        let mirror = Arc::new(Mutex::new(LocalMirror::new()));
        let (outgoing, outgoing_rx) = mpsc::unbounded_channel();
        let (status_tx, status) = watch::channel(ConnectionStatus::Connecting);
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);

        let session = Session {
            config,
            mirror: mirror.clone(),
            outgoing: outgoing_rx,
            status: status_tx,
            changes: changes.clone(),
        };
        let task = tokio::spawn(session.run());

        Self {
            mirror,
            outgoing,
            status,
            changes,
            task,
        }
    }

    pub fn status(&self) -> ConnectionStatus {
        *self.status.borrow()
    }

    /// 连接状态变化监听
    pub fn watch_status(&self) -> watch::Receiver<ConnectionStatus> {
        self.status.clone()
    }

    /// 镜像变更订阅
    pub fn subscribe(&self) -> broadcast::Receiver<MirrorChange> {
        self.changes.subscribe()
    }

    /// 读取本地镜像
    pub fn mirror(&self) -> ClientResult<MutexGuard<'_, LocalMirror>> {
        lock_mirror(&self.mirror)
    }

    /// 打开分区视图
    pub fn open_view<E: EditableEntry>(
        &self,
        partition: Partition,
        period_key: &str,
        catalog: Arc<ProductCatalog>,
    ) -> ClientResult<PartitionView<E>> {
        let mirror = self.mirror()?;
        PartitionView::open(partition, period_key, &mirror, catalog)
    }

    /// 发布本地编辑
    ///
    /// 先写入本地镜像并通知本地视图，再发送给服务端；未连接时返回 NotConnected
    pub fn publish(&self, event: ClientEvent) -> ClientResult<()> {
        let change = self.mirror()?.apply_local(&event);
        if let Some(change) = change {
            let _ = self.changes.send(change);
        }

        if self.status() != ConnectionStatus::Connected {
            warn!(partition = %event.partition(), "未连接，本地编辑不会发送到服务端");
            return Err(ClientError::NotConnected);
        }
        self.outgoing
            .send(event)
            .map_err(|_| ClientError::Connection("同步任务已停止".to_string()))
    }

    /// 停止同步会话
    pub fn shutdown(self) {
        self.task.abort();
    }
}

impl Drop for SyncClient {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn lock_mirror(mirror: &Mutex<LocalMirror>) -> ClientResult<MutexGuard<'_, LocalMirror>> {
    mirror
        .lock()
        .map_err(|e| ClientError::LockPoisoned(e.to_string()))
}

// ==========================================
// 后台会话任务
// ==========================================
struct Session {
    config: ClientConfig,
    mirror: Arc<Mutex<LocalMirror>>,
    outgoing: mpsc::UnboundedReceiver<ClientEvent>,
    status: watch::Sender<ConnectionStatus>,
    changes: broadcast::Sender<MirrorChange>,
}

/// 一次连接的结束原因
enum SessionEnd {
    /// 连接断开，可重连
    Disconnected,
    /// SyncClient 已释放，停止任务
    ClientDropped,
}

impl Session {
    async fn run(mut self) {
        let mut reconnect_count = 0u32;

        loop {
            let url = self.config.ws_url();
            self.status.send_replace(ConnectionStatus::Connecting);
            info!(url = %url, "连接同步服务");

            match connect_async(url.as_str()).await {
                Ok((stream, _)) => {
                    reconnect_count = 0;
                    self.discard_stale_edits();
                    let end = self.pump(stream).await;
                    self.status.send_replace(ConnectionStatus::Disconnected);
                    if let SessionEnd::ClientDropped = end {
                        return;
                    }
                    info!("与同步服务的连接已断开");
                }
                Err(e) => {
                    self.status.send_replace(ConnectionStatus::Disconnected);
                    warn!(error = %e, "连接同步服务失败");
                }
            }

            if !self.config.auto_reconnect {
                break;
            }
            reconnect_count += 1;
            if self.config.max_reconnect_attempts > 0
                && reconnect_count >= self.config.max_reconnect_attempts
            {
                warn!(
                    "已达到最大重连次数 ({})，停止重连",
                    self.config.max_reconnect_attempts
                );
                break;
            }

            info!(
                attempt = reconnect_count,
                delay_ms = self.config.reconnect_delay.as_millis() as u64,
                "等待重连"
            );
            sleep(self.config.reconnect_delay).await;
        }
    }

    /// 断线期间残留在队列中的编辑不再发送（重连后以服务端快照为准）
    fn discard_stale_edits(&mut self) {
        let mut dropped = 0usize;
        while self.outgoing.try_recv().is_ok() {
            dropped += 1;
        }
        if dropped > 0 {
            warn!(dropped, "丢弃断线期间的本地编辑");
        }
    }

    async fn pump(&mut self, stream: WsStream) -> SessionEnd {
        let (mut write, mut read) = stream.split();

        loop {
            tokio::select! {
                incoming = read.next() => match incoming {
                    Some(Ok(Message::Text(text))) => self.handle_text(&text),
                    Some(Ok(Message::Close(_))) | None => return SessionEnd::Disconnected,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!(error = %e, "连接读取失败");
                        return SessionEnd::Disconnected;
                    }
                },
                outgoing = self.outgoing.recv() => match outgoing {
                    Some(event) => {
                        let text = match event.to_json() {
                            Ok(text) => text,
                            Err(e) => {
                                warn!(error = %e, "编辑序列化失败");
                                continue;
                            }
                        };
                        if let Err(e) = write.send(Message::Text(text)).await {
                            warn!(error = %e, "发送失败");
                            return SessionEnd::Disconnected;
                        }
                    }
                    None => {
                        let _ = write.close().await;
                        return SessionEnd::ClientDropped;
                    }
                },
            }
        }
    }

    fn handle_text(&self, text: &str) {
        let event = match ServerEvent::from_json(text) {
            Ok(event) => event,
            Err(e) => {
                warn!(error = %e, "忽略无法解析的服务端消息");
                return;
            }
        };
        let is_initial = matches!(event, ServerEvent::InitialState(_));

        let change = match lock_mirror(&self.mirror) {
            Ok(mut mirror) => mirror.apply_server_event(event),
            Err(e) => {
                warn!(error = %e, "本地镜像不可用");
                return;
            }
        };

        if is_initial {
            self.status.send_replace(ConnectionStatus::Connected);
            info!("已收到全量快照，同步就绪");
        }
        if let Some(change) = change {
            debug!(?change, "镜像已更新");
            let _ = self.changes.send(change);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ws_url() {
        assert_eq!(ClientConfig::new("ws://localhost:3000").ws_url(), "ws://localhost:3000/ws");
        assert_eq!(ClientConfig::new("ws://localhost:3000/").ws_url(), "ws://localhost:3000/ws");
        assert_eq!(ClientConfig::new("ws://localhost:3000/ws").ws_url(), "ws://localhost:3000/ws");
    }

    #[tokio::test]
    async fn test_publish_while_disconnected_is_rejected_but_mirrored() {
        let client = SyncClient::start(
            ClientConfig::new("ws://127.0.0.1:1").with_auto_reconnect(false),
        );
        let event = ClientEvent::update(
            Partition::Production,
            crate::sync::UpdatePayload::for_period(Partition::Production, "2024-01-01", vec![]),
        );

        assert!(matches!(client.publish(event), Err(ClientError::NotConnected)));
        assert!(client
            .mirror()
            .unwrap()
            .state()
            .production
            .contains_key("2024-01-01"));
    }
}
