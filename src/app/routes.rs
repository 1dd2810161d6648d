// ==========================================
// 工厂生产看板 - HTTP / WebSocket 路由
// ==========================================
// GET /ws               实时同步通道
// GET /health           存活检查 + 当前连接数
// GET /api/products     产品参考表
// GET /api/config       运行参数
// PUT /api/config/:key  覆写单个运行参数 {"value": ...}
// GET /api/daily/:date  日汇总
// ==========================================
// 每个 WebSocket 连接: 一个写任务消费该连接的发送队列，读循环逐条处理入站消息
// ==========================================

use std::future::Future;
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, put};
use axum::{Json, Router};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

use crate::api::{ApiError, ApiResult, DailySummary};
use crate::app::state::AppState;
use crate::config::RuntimeConfig;
use crate::domain::ProductCatalog;
use crate::sync::{ClientEvent, ConnectionId, SyncHub};

/// 构建路由
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/ws", get(websocket_handler))
        .route("/health", get(health_handler))
        .route("/api/products", get(products_handler))
        .route("/api/config", get(config_handler))
        .route("/api/config/:key", put(update_config_handler))
        .route("/api/daily/:date", get(daily_summary_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// 在已绑定的监听器上提供服务，直到 shutdown 完成
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    tracing::info!("看板服务已启动: http://{} (WebSocket: ws://{}/ws)", addr, addr);
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await
}

// ==========================================
// HTTP 处理函数
// ==========================================

async fn health_handler(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let hub = state.hub.clone();
    let connections = run_blocking(move || Ok(hub.connection_count())).await?;
    Ok(Json(json!({
        "status": "ok",
        "connections": connections,
    })))
}

async fn products_handler(State(state): State<AppState>) -> Json<ProductCatalog> {
    Json(state.dashboard_api.products().clone())
}

async fn config_handler(State(state): State<AppState>) -> ApiResult<Json<RuntimeConfig>> {
    let api = state.dashboard_api.clone();
    run_blocking(move || api.runtime_config()).await.map(Json)
}

#[derive(Debug, Deserialize)]
struct ConfigUpdateRequest {
    value: Value,
}

async fn update_config_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(request): Json<ConfigUpdateRequest>,
) -> ApiResult<Json<RuntimeConfig>> {
    // 数字与字符串均可
    let value = match request.value {
        Value::String(text) => text,
        other => other.to_string(),
    };
    let api = state.dashboard_api.clone();
    run_blocking(move || api.update_config(&key, &value)).await.map(Json)
}

async fn daily_summary_handler(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> ApiResult<Json<DailySummary>> {
    let api = state.dashboard_api.clone();
    run_blocking(move || api.daily_summary(&date)).await.map(Json)
}

/// SQLite 读写与中枢锁都是阻塞操作，放到阻塞线程池执行
async fn run_blocking<T, F>(f: F) -> ApiResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> ApiResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::InternalError(format!("后台任务失败: {}", e)))?
}

// ==========================================
// WebSocket
// ==========================================

async fn websocket_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| websocket_connection(socket, state.hub))
}

async fn websocket_connection(socket: WebSocket, hub: Arc<SyncHub>) {
    let connect_hub = hub.clone();
    let registration = match tokio::task::spawn_blocking(move || connect_hub.connect()).await {
        Ok(Ok(registration)) => registration,
        Ok(Err(e)) => {
            tracing::error!("连接注册失败: {}", e);
            return;
        }
        Err(e) => {
            tracing::error!("连接注册任务失败: {}", e);
            return;
        }
    };
    let id = registration.id;
    let mut outbound = registration.outbound;
    let (mut sender, mut receiver) = socket.split();

    // 写任务: initial_state 一定是队列中的第一条
    let mut writer = tokio::spawn(async move {
        while let Some(event) = outbound.recv().await {
            let text = match event.to_json() {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!(connection_id = id, "事件序列化失败: {}", e);
                    continue;
                }
            };
            if sender.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    // 读循环: 逐条处理，保证同一连接的更新顺序
    let reader_hub = hub.clone();
    let mut reader = tokio::spawn(async move {
        while let Some(message) = receiver.next().await {
            match message {
                Ok(Message::Text(text)) => handle_client_message(&reader_hub, id, text).await,
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!(connection_id = id, "连接读取失败: {}", e);
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut writer => reader.abort(),
        _ = &mut reader => writer.abort(),
    }

    let _ = tokio::task::spawn_blocking(move || hub.disconnect(id)).await;
}

async fn handle_client_message(hub: &Arc<SyncHub>, id: ConnectionId, text: String) {
    let event = match ClientEvent::from_json(&text) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!(connection_id = id, "丢弃无法解析的消息: {}", e);
            return;
        }
    };

    let hub = hub.clone();
    match tokio::task::spawn_blocking(move || hub.handle_event(id, event)).await {
        Ok(Ok(outcome)) => {
            tracing::debug!(
                connection_id = id,
                partition = %outcome.partition,
                persisted = outcome.persisted,
                "更新处理完成"
            );
        }
        Ok(Err(e)) => tracing::warn!(connection_id = id, "更新被拒绝: {}", e),
        Err(e) => tracing::error!(connection_id = id, "更新任务失败: {}", e),
    }
}
