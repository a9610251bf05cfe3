//! Stub CircleCI API served by an axum router on an ephemeral port.
//!
//! Requests are answered with canned responses in arrival order and recorded
//! before the response is produced. The server runs on its own runtime thread
//! so the blocking client under test never shares a tokio context with it.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Router;
use tokio::net::TcpListener;

use circleci_env::ClientOptions;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// Path plus query string, as received
    pub target: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn path(&self) -> &str {
        self.target.split('?').next().unwrap_or_default()
    }

    pub fn query(&self) -> Option<&str> {
        self.target.split_once('?').map(|(_, q)| q)
    }
}

#[derive(Debug, Clone)]
pub struct StubResponse {
    pub status: u16,
    pub body: String,
}

impl StubResponse {
    pub fn new(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
        }
    }
}

#[derive(Default)]
struct StubState {
    responses: Mutex<VecDeque<StubResponse>>,
    requests: Mutex<Vec<RecordedRequest>>,
    /// Record requests but never answer them
    hang: bool,
}

pub struct StubServer {
    addr: SocketAddr,
    state: Arc<StubState>,
}

impl StubServer {
    /// Serve `responses` in order, one per request.
    pub fn start(responses: Vec<StubResponse>) -> Self {
        Self::spawn(StubState {
            responses: Mutex::new(responses.into()),
            ..StubState::default()
        })
    }

    /// Accept requests, record them, never answer.
    pub fn unresponsive() -> Self {
        Self::spawn(StubState {
            hang: true,
            ..StubState::default()
        })
    }

    fn spawn(state: StubState) -> Self {
        let state = Arc::new(state);
        let router = Router::new()
            .fallback(handle)
            .with_state(Arc::clone(&state));
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("build stub runtime");
            runtime.block_on(async move {
                let listener = TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("bind stub server");
                tx.send(listener.local_addr().expect("local addr"))
                    .expect("report stub address");
                axum::serve(listener, router).await.expect("serve stub");
            });
        });

        let addr = rx.recv().expect("stub server started");
        Self { addr, state }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Client options pointing at this server, bypassing any system proxy.
    pub fn client_options(&self, timeout: Duration) -> ClientOptions {
        ClientOptions {
            base_url: self.base_url(),
            timeout,
            connect_timeout: timeout,
            use_system_proxy: false,
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }
}

async fn handle(State(state): State<Arc<StubState>>, request: Request) -> Response {
    let (parts, body) = request.into_parts();
    let body = to_bytes(body, usize::MAX).await.unwrap_or_default();
    let recorded = RecordedRequest {
        method: parts.method.to_string(),
        target: parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| parts.uri.path().to_string()),
        headers: parts
            .headers
            .iter()
            .map(|(k, v)| {
                (
                    k.as_str().to_string(),
                    String::from_utf8_lossy(v.as_bytes()).into_owned(),
                )
            })
            .collect(),
        body: String::from_utf8_lossy(&body).into_owned(),
    };
    state.requests.lock().unwrap().push(recorded);

    if state.hang {
        std::future::pending::<()>().await;
    }

    let Some(canned) = state.responses.lock().unwrap().pop_front() else {
        return (StatusCode::INTERNAL_SERVER_ERROR, "no stub response left").into_response();
    };
    let status = StatusCode::from_u16(canned.status).expect("valid stub status");
    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(canned.body))
        .expect("build stub response")
}
