use axum::{
    extract::State,
    response::{IntoResponse, Json},
};
use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;

lazy_static::lazy_static! {
    static ref START_TIME: Instant = Instant::now();
}

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub instance_id: String,
    pub error_routes_enabled: bool,
}

impl AppStateInner {
    pub fn from_config(config: &Config) -> Self {
        Self {
            instance_id: config.server.instance_id.clone(),
            error_routes_enabled: config.webadmin.error_routes_enabled,
        }
    }
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = serde_json::Value)
    )
)]
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "webadmin",
        "version": env!("CARGO_PKG_VERSION"),
        "instance_id": state.instance_id,
        "build": {
            "profile": if cfg!(debug_assertions) { "debug" } else { "release" },
        },
        "uptime_seconds": START_TIME.elapsed().as_secs(),
    }))
}
