//! Health check handler.

use axum::{Json, extract::State};
use serde::Serialize;

use crate::server::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// Users in the loaded roster.
    pub known_users: usize,
    pub live_sync: bool,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        known_users: state.roster.len(),
        live_sync: state.live_sync_enabled(),
    })
}
