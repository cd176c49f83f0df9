//! Shared fixtures for unit tests: an in-process stand-in for the Airstack
//! endpoint and ready-made configuration.

use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::response::Response;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::Value;
use tokio::net::TcpListener;

use crate::config::{FrameConfig, UpstreamConfig};
use crate::models::stats::StatsSelection;
use crate::state::AppState;
use crate::upstream::StatsClient;

pub const TEST_API_KEY: &str = "test-api-key";

#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub authorization: Option<String>,
    pub body: Value,
}

/// Serves one canned GraphQL answer on `127.0.0.1` and records every request.
pub struct FakeUpstream {
    pub url: String,
    captured: Arc<Mutex<Vec<CapturedRequest>>>,
}

#[derive(Clone)]
struct FakeState {
    status: StatusCode,
    body: Value,
    captured: Arc<Mutex<Vec<CapturedRequest>>>,
}

impl FakeUpstream {
    pub async fn spawn_json(body: Value) -> Self {
        Self::spawn(StatusCode::OK, body).await
    }

    pub async fn spawn(status: StatusCode, body: Value) -> Self {
        let captured = Arc::new(Mutex::new(Vec::new()));
        let state = FakeState {
            status,
            body,
            captured: Arc::clone(&captured),
        };
        let router = Router::new().route("/gql", post(answer)).with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake upstream");
        let addr = listener.local_addr().expect("fake upstream address");
        tokio::spawn(async move {
            axum::serve(listener, router).await.ok();
        });

        Self {
            url: format!("http://{addr}/gql"),
            captured,
        }
    }

    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.captured.lock().expect("capture lock").clone()
    }
}

async fn answer(
    State(state): State<FakeState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let authorization = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    state
        .captured
        .lock()
        .expect("capture lock")
        .push(CapturedRequest {
            authorization,
            body,
        });
    (state.status, Json(state.body.clone()))
}

pub fn upstream_config(url: &str) -> UpstreamConfig {
    UpstreamConfig {
        url: url.to_string(),
        api_key: TEST_API_KEY.to_string(),
        request_timeout_ms: Some(2_000),
    }
}

pub fn frame_config() -> FrameConfig {
    FrameConfig {
        public_url: "https://frames.example/api".to_string(),
        title: "$MOXIE Earnings Tracker".to_string(),
        image_aspect_ratio: "1:1".to_string(),
        home_image: "https://img.example/home.png".to_string(),
        stats_image: "https://img.example/stats.png".to_string(),
        share_compose_url: "https://warpcast.com/~/compose".to_string(),
        share_tagline: "Check your @moxie.eth stats.".to_string(),
        share_fallback_text: "Check your @moxie.eth stats on Farcaster!".to_string(),
    }
}

pub fn test_state(upstream_url: &str) -> AppState {
    let stats = StatsClient::new(&upstream_config(upstream_url), StatsSelection::default())
        .expect("client builds");
    AppState::new(stats, frame_config()).expect("state builds")
}

pub async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

/// Undoes the HTML escaping applied by the frame template.
pub fn decode_entities(html: &str) -> String {
    html.replace("&#x2f;", "/")
        .replace("&#x27;", "'")
        .replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
