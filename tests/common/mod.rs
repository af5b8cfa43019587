//! Purpose: Loopback axum server shared by the integration tests.
//! Exports: `TestServer`, `TestResult`, `SLOW_DELAY`, `unused_port`.
//! Role: Serves canned JSON, non-JSON, and slow responses on 127.0.0.1.
//! Invariants: The server runs on its own multi-thread runtime thread, so
//! blocking fetches and current-thread test runtimes never starve it.
//! Invariants: The listener is bound before `start` returns; no readiness polling.
#![allow(dead_code)]

use axum::Json;
use axum::Router;
use axum::extract::Path;
use axum::http::StatusCode;
use axum::routing::get;
use serde_json::{Value, json};
use std::net::{SocketAddr, TcpListener};
use std::time::Duration;
use tokio::sync::oneshot;

pub type TestResult<T> = Result<T, Box<dyn std::error::Error>>;

pub const SLOW_DELAY: Duration = Duration::from_millis(400);

pub struct TestServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
}

impl TestServer {
    pub fn start() -> TestResult<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        listener.set_nonblocking(true)?;
        let addr = listener.local_addr()?;
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(4)
                .enable_all()
                .build()
                .expect("server runtime");
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::from_std(listener).expect("listener");
                let _ = axum::serve(listener, router())
                    .with_graceful_shutdown(async {
                        let _ = shutdown_rx.await;
                    })
                    .await;
            });
        });

        Ok(Self {
            addr,
            shutdown: Some(shutdown_tx),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

pub fn unused_port() -> TestResult<u16> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let port = listener.local_addr()?.port();
    drop(listener);
    Ok(port)
}

fn router() -> Router {
    Router::new()
        .route("/pokemon/ditto", get(ditto))
        .route("/missing", get(missing))
        .route("/text", get(text))
        .route("/array", get(array))
        .route("/bad-gateway", get(bad_gateway))
        .route("/slow/:id", get(slow))
}

async fn ditto() -> Json<Value> {
    Json(json!({
        "id": 132,
        "name": "ditto",
        "types": [{"slot": 1, "type": {"name": "normal"}}],
        "height": 3,
        "weight": 40.0,
        "is_default": true,
        "form": null
    }))
}

async fn missing() -> (StatusCode, Json<Value>) {
    (StatusCode::NOT_FOUND, Json(json!({"error": "not found"})))
}

async fn text() -> &'static str {
    "not json"
}

async fn array() -> Json<Value> {
    Json(json!([1, 2, 3]))
}

async fn bad_gateway() -> (StatusCode, &'static str) {
    (StatusCode::BAD_GATEWAY, "<html>bad gateway</html>")
}

async fn slow(Path(id): Path<u64>) -> Json<Value> {
    tokio::time::sleep(SLOW_DELAY).await;
    Json(json!({"id": id}))
}
