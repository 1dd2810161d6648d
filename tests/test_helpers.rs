// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 临时数据库、测试服务启动、WebSocket 收发
// ==========================================

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use factory_board::app::{serve, AppState};
use factory_board::domain::ProductCatalog;
use factory_board::sync::{ClientEvent, ServerEvent};
use futures::{SinkExt, StreamExt};
use tempfile::NamedTempFile;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

pub type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// 单条消息等待上限
pub const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// 判定"没有消息"的等待时长
pub const QUIET_PERIOD: Duration = Duration::from_millis(300);

/// 创建临时测试数据库
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> (NamedTempFile, String) {
    let temp_file = NamedTempFile::new().expect("Failed to create temp file");
    let db_path = temp_file.path().to_str().unwrap().to_string();
    (temp_file, db_path)
}

/// 在随机端口上启动测试服务
///
/// # 返回
/// - SocketAddr: 实际监听地址
/// - AppState: 服务共享状态（可直接检查中枢）
pub async fn start_test_server(db_path: &str) -> (SocketAddr, AppState) {
    let state = AppState::new(db_path.to_string(), ProductCatalog::builtin())
        .expect("Failed to create AppState");
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().unwrap();

    let server_state = state.clone();
    tokio::spawn(async move {
        serve(listener, server_state, std::future::pending()).await.unwrap();
    });

    (addr, state)
}

/// 建立 WebSocket 连接
pub async fn connect_ws(addr: SocketAddr) -> WsClient {
    let (ws, _) = connect_async(format!("ws://{}/ws", addr))
        .await
        .expect("Failed to connect websocket");
    ws
}

/// 建立连接并消费 initial_state
pub async fn connect_and_sync(addr: SocketAddr) -> WsClient {
    let mut ws = connect_ws(addr).await;
    match recv_event(&mut ws).await {
        ServerEvent::InitialState(_) => ws,
        other => panic!("Expected initial_state, got {:?}", other),
    }
}

/// 发送客户端事件
pub async fn send_event(ws: &mut WsClient, event: &ClientEvent) {
    ws.send(Message::Text(event.to_json().unwrap()))
        .await
        .expect("Failed to send event");
}

/// 发送原始文本帧
pub async fn send_raw(ws: &mut WsClient, text: &str) {
    ws.send(Message::Text(text.to_string()))
        .await
        .expect("Failed to send raw frame");
}

/// 接收下一条服务端事件（超时则失败）
pub async fn recv_event(ws: &mut WsClient) -> ServerEvent {
    try_recv_event(ws, RECV_TIMEOUT)
        .await
        .expect("Timed out waiting for server event")
}

/// 在给定时长内接收服务端事件；超时返回 None
pub async fn try_recv_event(ws: &mut WsClient, wait: Duration) -> Option<ServerEvent> {
    let deadline = tokio::time::Instant::now() + wait;
    loop {
        let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
        let message = tokio::time::timeout(remaining, ws.next()).await.ok()??;
        match message.expect("websocket error") {
            Message::Text(text) => return Some(ServerEvent::from_json(&text).unwrap()),
            Message::Close(_) => return None,
            _ => continue,
        }
    }
}

/// 发送最简 HTTP GET，返回 (状态码, 响应体)
pub async fn http_get(addr: SocketAddr, path: &str) -> (u16, String) {
    http_request(addr, "GET", path, None).await
}

/// 发送最简 HTTP 请求（可带 JSON 请求体），返回 (状态码, 响应体)
pub async fn http_request(
    addr: SocketAddr,
    method: &str,
    path: &str,
    json_body: Option<&str>,
) -> (u16, String) {
    let mut stream = TcpStream::connect(addr).await.expect("Failed to connect");
    let body = json_body.unwrap_or("");
    let mut request = format!("{} {} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n", method, path, addr);
    if json_body.is_some() {
        request.push_str("Content-Type: application/json\r\n");
    }
    request.push_str(&format!("Content-Length: {}\r\n\r\n{}", body.len(), body));
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut raw = String::new();
    stream.read_to_string(&mut raw).await.unwrap();

    let status = raw
        .split_whitespace()
        .nth(1)
        .and_then(|s| s.parse::<u16>().ok())
        .expect("Malformed HTTP response");
    let body = raw
        .split_once("\r\n\r\n")
        .map(|(_, body)| body.to_string())
        .unwrap_or_default();
    (status, body)
}
