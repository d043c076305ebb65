#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Part captured from a multipart upload.
#[derive(Debug, Clone)]
pub struct UploadedPart {
    pub name: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Observable state of the fake backend.
#[derive(Default)]
pub struct Hub {
    opened: Mutex<Vec<String>>,
    active: AtomicUsize,
    drop_first: AtomicBool,
    announce_analysis: AtomicBool,
    analysis_fetches: Mutex<Vec<String>>,
    requests: AtomicUsize,
    alerts: Mutex<Vec<Value>>,
    uploads: Mutex<Vec<UploadedPart>>,
}

impl Hub {
    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }

    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn uploads(&self) -> Vec<UploadedPart> {
        self.uploads.lock().unwrap().clone()
    }

    /// The first stream connection sends one tick and then hangs up.
    pub fn drop_first_connection(&self) {
        self.drop_first.store(true, Ordering::SeqCst);
    }

    /// Every stream connection pushes an `ai_analysis` frame after its ack.
    pub fn announce_analysis(&self) {
        self.announce_analysis.store(true, Ordering::SeqCst);
    }

    /// Symbols requested from the analysis history endpoint, in order.
    pub fn analysis_fetches(&self) -> Vec<String> {
        self.analysis_fetches.lock().unwrap().clone()
    }

    fn hit(&self) {
        self.requests.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct MockBackend {
    pub addr: SocketAddr,
    pub hub: Arc<Hub>,
    task: JoinHandle<()>,
}

impl MockBackend {
    pub async fn start() -> Self {
        let hub = Arc::new(Hub::default());
        let app = Router::new()
            .route("/api/ws/market/:symbol", get(market_socket))
            .route("/api/symbols", get(symbols))
            .route("/api/alerts", get(list_alerts).post(create_alert))
            .route("/api/analysis/:symbol", get(analyses))
            .route("/api/indicators/:symbol", get(indicators))
            .route("/api/health", get(health))
            .route("/api/meetings", get(meetings))
            .route("/api/meetings/:id", get(meeting))
            .route("/api/summarize-text", post(summarize_text))
            .route("/api/summarize-file", post(summarize_file))
            .with_state(hub.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind mock");
        let addr = listener.local_addr().expect("mock addr");
        let task = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock backend");
        });

        Self { addr, hub, task }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.task.abort();
    }
}

pub fn tick(symbol: &str, price: f64) -> String {
    json!({
        "type": "market_data",
        "symbol": symbol,
        "price": price,
        "volume": 1000.0,
        "timestamp": "2024-01-15T14:30:00",
        "indicators": { "rsi": 55.0 }
    })
    .to_string()
}

pub fn analysis_frame(symbol: &str) -> String {
    json!({
        "type": "ai_analysis",
        "symbol": symbol,
        "analysis": {
            "symbol": symbol,
            "timestamp": "2024-01-15T14:31:00",
            "recommendation": "HOLD",
            "reasoning": "Volume drying up",
            "confidence": 0.6
        }
    })
    .to_string()
}

async fn market_socket(
    ws: WebSocketUpgrade,
    Path(symbol): Path<String>,
    State(hub): State<Arc<Hub>>,
) -> Response {
    ws.on_upgrade(move |socket| serve_socket(socket, symbol, hub))
}

enum Step {
    Tick,
    Inbound(Option<Result<Message, axum::Error>>),
}

async fn serve_socket(mut socket: WebSocket, symbol: String, hub: Arc<Hub>) {
    let index = {
        let mut opened = hub.opened.lock().unwrap();
        opened.push(symbol.clone());
        opened.len() - 1
    };
    hub.active.fetch_add(1, Ordering::SeqCst);

    let ack = json!({ "type": "connection", "message": format!("Connected to {symbol}") });
    let _ = socket.send(Message::Text(ack.to_string())).await;

    if hub.announce_analysis.load(Ordering::SeqCst) {
        let _ = socket.send(Message::Text(analysis_frame(&symbol))).await;
    }

    if index == 0 && hub.drop_first.load(Ordering::SeqCst) {
        let _ = socket.send(Message::Text(tick(&symbol, 100.0))).await;
        let _ = socket.close().await;
        hub.active.fetch_sub(1, Ordering::SeqCst);
        return;
    }

    let mut price = 100.0;
    loop {
        let step = tokio::select! {
            _ = tokio::time::sleep(Duration::from_millis(20)) => Step::Tick,
            inbound = socket.recv() => Step::Inbound(inbound),
        };
        match step {
            Step::Tick => {
                price += 0.5;
                if socket.send(Message::Text(tick(&symbol, price))).await.is_err() {
                    break;
                }
            }
            Step::Inbound(Some(Ok(Message::Close(_)))) | Step::Inbound(None) => break,
            Step::Inbound(Some(Err(_))) => break,
            Step::Inbound(Some(Ok(_))) => continue,
        }
    }
    hub.active.fetch_sub(1, Ordering::SeqCst);
}

async fn symbols(State(hub): State<Arc<Hub>>) -> Json<Value> {
    hub.hit();
    Json(json!({
        "symbols": [
            { "symbol": "AAPL", "name": "Apple Inc.", "price": 191.23 },
            { "symbol": "MSFT", "name": "Microsoft Corporation", "price": 402.5 }
        ]
    }))
}

async fn list_alerts(State(hub): State<Arc<Hub>>) -> Json<Value> {
    hub.hit();
    let alerts = hub.alerts.lock().unwrap().clone();
    Json(json!({ "alerts": alerts }))
}

async fn create_alert(State(hub): State<Arc<Hub>>, Json(alert): Json<Value>) -> Json<Value> {
    hub.hit();
    let id = alert["id"].as_str().unwrap_or("generated").to_string();
    hub.alerts.lock().unwrap().push(alert);
    Json(json!({ "message": "Alert created successfully", "alert_id": id }))
}

async fn analyses(State(hub): State<Arc<Hub>>, Path(symbol): Path<String>) -> Json<Value> {
    hub.hit();
    hub.analysis_fetches.lock().unwrap().push(symbol.clone());
    Json(json!({
        "symbol": symbol,
        "analyses": [{
            "symbol": symbol,
            "timestamp": "2024-01-15T14:30:00",
            "recommendation": "BUY",
            "reasoning": "RSI recovering from oversold",
            "confidence": 0.82,
            "pattern_detected": "double bottom"
        }]
    }))
}

async fn indicators(State(hub): State<Arc<Hub>>, Path(symbol): Path<String>) -> Response {
    hub.hit();
    if symbol != "AAPL" {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "detail": "No data available for symbol" })),
        )
            .into_response();
    }
    Json(json!({
        "symbol": "AAPL",
        "timestamp": "2024-01-15T14:30:00",
        "price": 191.23,
        "volume": 1500000.0,
        "indicators": { "sma_20": 189.4, "rsi": 61.2 }
    }))
    .into_response()
}

async fn health(State(hub): State<Arc<Hub>>) -> Json<Value> {
    hub.hit();
    Json(json!({
        "status": "healthy",
        "timestamp": "2024-01-15T14:30:00",
        "active_symbols": 2,
        "active_connections": hub.active()
    }))
}

fn meeting_json(id: &str, title: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "summary": "Agreed on the release plan.",
        "key_points": ["Ship on Friday"],
        "action_items": ["Alice drafts notes"],
        "created_at": "2024-01-15T09:00:00"
    })
}

async fn meetings(State(hub): State<Arc<Hub>>) -> Json<Value> {
    hub.hit();
    Json(json!([meeting_json("m-1", "Weekly sync")]))
}

async fn meeting(State(hub): State<Arc<Hub>>, Path(id): Path<String>) -> Response {
    hub.hit();
    if id == "m-1" {
        Json(meeting_json("m-1", "Weekly sync")).into_response()
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(json!({ "detail": "Meeting not found" })),
        )
            .into_response()
    }
}

async fn summarize_text(State(hub): State<Arc<Hub>>, Json(body): Json<Value>) -> Response {
    hub.hit();
    if body["content"] == "boom" {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "detail": "Summarization failed" })),
        )
            .into_response();
    }
    let title = body["title"].as_str().unwrap_or_default();
    Json(meeting_json("m-2", title)).into_response()
}

async fn summarize_file(State(hub): State<Arc<Hub>>, mut multipart: Multipart) -> Json<Value> {
    hub.hit();
    let mut title = String::new();
    while let Some(field) = multipart.next_field().await.expect("multipart field") {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.expect("field bytes").to_vec();
        if name == "title" {
            title = String::from_utf8_lossy(&bytes).into_owned();
        }
        hub.uploads.lock().unwrap().push(UploadedPart {
            name,
            file_name,
            content_type,
            bytes,
        });
    }
    Json(meeting_json("m-3", &title))
}
