//! Shared helpers: an in-process stand-in for the analysis service.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// Counters observed by the stub service.
#[derive(Debug, Default)]
pub struct StubStats {
    pub calls: AtomicUsize,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl StubStats {
    fn enter(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
    }

    fn exit(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

/// A running stub analysis service.
pub struct StubService {
    pub addr: SocketAddr,
    pub stats: Arc<StubStats>,
}

impl StubService {
    /// URL of one of the stub's endpoints, e.g. `url("echo")`.
    pub fn url(&self, path: &str) -> String {
        format!("http://{}/{path}", self.addr)
    }
}

/// Slow endpoint delay.
pub const SLOW_DELAY: Duration = Duration::from_secs(3);

/// Start the stub on an ephemeral port.
///
/// Endpoints:
/// - `/echo`: `{"risk_score": 42, "keywords": ["patent", "claim"]}`
/// - `/content`: score = content length, keywords = `[content]`
/// - `/malformed`: a non-JSON body
/// - `/slow`: answers after [`SLOW_DELAY`]
/// - `/busy`: echoes after 150ms (for concurrency accounting)
/// - `/reference`: the reference service's `{score, entities}` shape
/// - `/error-status`: HTTP 500 with a decodable body
pub async fn spawn_stub() -> StubService {
    let stats = Arc::new(StubStats::default());
    let app = Router::new()
        .route("/echo", post(echo))
        .route("/content", post(content))
        .route("/malformed", post(malformed))
        .route("/slow", post(slow))
        .route("/busy", post(busy))
        .route("/reference", post(reference))
        .route("/error-status", post(error_status))
        .with_state(Arc::clone(&stats));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    StubService { addr, stats }
}

async fn echo(State(stats): State<Arc<StubStats>>) -> Json<Value> {
    stats.enter();
    stats.exit();
    Json(json!({"risk_score": 42, "keywords": ["patent", "claim"]}))
}

async fn content(State(stats): State<Arc<StubStats>>, Json(body): Json<Value>) -> Json<Value> {
    stats.enter();
    let text = body["content"].as_str().unwrap_or_default().to_string();
    stats.exit();
    Json(json!({"risk_score": text.len(), "keywords": [text]}))
}

async fn malformed(State(stats): State<Arc<StubStats>>) -> &'static str {
    stats.enter();
    stats.exit();
    "<html>definitely not json</html>"
}

async fn slow(State(stats): State<Arc<StubStats>>) -> Json<Value> {
    stats.enter();
    tokio::time::sleep(SLOW_DELAY).await;
    stats.exit();
    Json(json!({"risk_score": 99, "keywords": ["late"]}))
}

async fn busy(State(stats): State<Arc<StubStats>>) -> Json<Value> {
    stats.enter();
    tokio::time::sleep(Duration::from_millis(150)).await;
    stats.exit();
    Json(json!({"risk_score": 42, "keywords": ["patent", "claim"]}))
}

async fn reference(State(stats): State<Arc<StubStats>>) -> Json<Value> {
    stats.enter();
    stats.exit();
    Json(json!({"score": 55, "entities": ["US Patent 998...", "Google"]}))
}

async fn error_status(State(stats): State<Arc<StubStats>>) -> impl IntoResponse {
    stats.enter();
    stats.exit();
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"risk_score": 7, "keywords": ["degraded"]})),
    )
}
