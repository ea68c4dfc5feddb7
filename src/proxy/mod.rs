//! # Analyze proxy
//!
//! Relays a JSON document to the workflow-automation webhook and hands its
//! answer back.
//!
//! Both bodies are checked to be JSON and otherwise passed through byte for
//! byte, so key order and number formatting survive; the shape is never
//! checked. The destination is fixed at build time. No timeout, no retry:
//! any failure along the way (bad body, unreachable webhook, non-2xx status,
//! non-JSON reply) turns into the same opaque 500, see `ProxyError`.
//!
//! Nothing in the scan session calls this. It exists for front ends that
//! want a real analysis backend.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{header::CONTENT_TYPE, HeaderValue},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde::de::IgnoredAny;
use tracing::debug;

use crate::error::ProxyError;

pub const WEBHOOK_URL: &str =
    "https://rahulydv.app.n8n.cloud/webhook/93ed3f41-19d4-4ef2-b25a-4f2016a9aa5e";

pub const ANALYZE_ROUTE: &str = "/api/analyze";

pub struct ProxyState {
    client: reqwest::Client,
    webhook_url: String,
}

impl ProxyState {
    pub fn new() -> Arc<Self> {
        ProxyState::with_webhook_url(WEBHOOK_URL)
    }

    /// Points the proxy somewhere other than the production webhook.
    pub fn with_webhook_url(webhook_url: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            client: reqwest::Client::new(),
            webhook_url: webhook_url.into(),
        })
    }

    pub fn webhook_url(&self) -> &str {
        &self.webhook_url
    }
}

pub fn router(state: Arc<ProxyState>) -> Router {
    Router::new()
        .route(ANALYZE_ROUTE, post(analyze_handler))
        .with_state(state)
}

pub async fn analyze_handler(
    State(state): State<Arc<ProxyState>>,
    body: Bytes,
) -> Result<Response, ProxyError> {
    ensure_json(&body).map_err(ProxyError::Body)?;

    debug!(url = %state.webhook_url, bytes = body.len(), "Forwarding analyze request");

    let reply = state
        .client
        .post(&state.webhook_url)
        .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
        .body(body)
        .send()
        .await?
        .error_for_status()?
        .bytes()
        .await?;

    ensure_json(&reply).map_err(ProxyError::Reply)?;

    Ok(([(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE))], reply).into_response())
}

const JSON_CONTENT_TYPE: &str = "application/json";

// full syntax check without building a value
fn ensure_json(bytes: &[u8]) -> serde_json::Result<()> {
    serde_json::from_slice::<IgnoredAny>(bytes).map(|_| ())
}
