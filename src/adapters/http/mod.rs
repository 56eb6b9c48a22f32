//! HTTP adapter: the chat API server.
//!
//! Thin plumbing around the orchestrator: routing, CORS, request
//! validation, and the SSE response surface live here; everything with
//! algorithmic content lives in the service layer.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::domain::models::ServerConfig;
use crate::services::assistant::Assistant;

pub mod chat;

/// Service name reported by the health endpoint.
pub const SERVICE_NAME: &str = "ragline";

/// Request bodies above this are rejected outright.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Shared state for the chat API.
#[derive(Clone)]
pub struct AppState {
    pub assistant: Arc<Assistant>,
}

/// Build the router with all endpoints.
pub fn build_router(state: AppState, cors_origins: &[String]) -> Result<Router> {
    Ok(Router::new()
        .route("/health", get(health))
        .route("/api/chat", post(chat::chat))
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors_origins)?))
}

fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    if origins.is_empty() {
        return Ok(CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any));
    }

    let list = origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .with_context(|| format!("invalid CORS origin '{origin}'"))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(list))
        .allow_methods(Any)
        .allow_headers(Any))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "ok": true, "service": SERVICE_NAME }))
}

/// Chat HTTP server.
pub struct ChatHttpServer {
    config: ServerConfig,
    state: AppState,
}

impl ChatHttpServer {
    pub fn new(config: ServerConfig, assistant: Arc<Assistant>) -> Self {
        Self {
            config,
            state: AppState { assistant },
        }
    }

    /// Bind and serve until the process is stopped.
    pub async fn serve(self) -> Result<()> {
        let router = build_router(self.state, &self.config.cors_origins)?;

        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port)
            .parse()
            .context("invalid server address")?;

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind {addr}"))?;

        tracing::info!("chat server listening on http://{addr}");

        axum::serve(listener, router).await.context("server error")?;

        Ok(())
    }
}
