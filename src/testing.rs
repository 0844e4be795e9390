use std::convert::Infallible;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use bytes::Bytes;
use sha2::{Digest, Sha256};
use tokio::net::TcpListener;

pub const SMALL_JAR: &[u8] = b"PK\x03\x04 not really a jar";

/// Deterministic payload spanning several fetch chunks.
pub fn large_jar() -> Vec<u8> {
    (0..10_000u32).map(|i| (i % 253) as u8).collect()
}

pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Tracks how many requests a mock server is serving at the same time.
#[derive(Clone, Default)]
pub struct InFlight {
    current: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
    total: Arc<AtomicUsize>,
}

impl InFlight {
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn total(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    fn enter(&self) {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        self.total.fetch_add(1, Ordering::SeqCst);
    }

    fn leave(&self) {
        self.current.fetch_sub(1, Ordering::SeqCst);
    }
}

async fn small() -> &'static [u8] {
    SMALL_JAR
}

async fn large() -> Vec<u8> {
    large_jar()
}

async fn status(Path(code): Path<u16>) -> Response {
    let code = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (code, "error page body").into_response()
}

// Sends some bytes, then kills the connection mid-body. The pause lets the
// head and first chunk reach the client before the failure.
async fn truncated() -> Response {
    let head = futures::stream::once(async { Ok::<_, io::Error>(Bytes::from_static(b"partial")) });
    let fail = futures::stream::once(async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        Err::<Bytes, _>(io::Error::other("connection dropped"))
    });
    Body::from_stream(futures::StreamExt::chain(head, fail)).into_response()
}

async fn slow(State(in_flight): State<InFlight>, Path(millis): Path<u64>) -> Response {
    in_flight.enter();
    tokio::time::sleep(Duration::from_millis(millis)).await;
    in_flight.leave();
    format!("slept {millis}").into_response()
}

// Sends the first byte and then never finishes the body.
async fn stall() -> Response {
    let head = futures::stream::once(async { Ok::<_, Infallible>(Bytes::from_static(b"x")) });
    let never = futures::stream::pending::<Result<Bytes, Infallible>>();
    Body::from_stream(futures::StreamExt::chain(head, never)).into_response()
}

/// Routes:
/// - `/small.jar`, `/large.jar`: fixed payloads
/// - `/status/{code}`: responds with `code` and an error page
/// - `/truncated.jar`: body breaks off after a few bytes
/// - `/slow/{millis}`: answers after a delay, counted in [`InFlight`]
/// - `/stall.jar`: body never completes
pub fn artifact_router(in_flight: InFlight) -> Router {
    Router::new()
        .route("/small.jar", get(small))
        .route("/large.jar", get(large))
        .route("/status/{code}", get(status))
        .route("/truncated.jar", get(truncated))
        .route("/slow/{millis}", get(slow))
        .route("/stall.jar", get(stall))
        .with_state(in_flight)
}

/// Serves `app` on an ephemeral local port and returns its base url.
pub async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

pub async fn serve_artifacts() -> (String, InFlight) {
    let in_flight = InFlight::default();
    let base = serve(artifact_router(in_flight.clone())).await;
    (base, in_flight)
}
