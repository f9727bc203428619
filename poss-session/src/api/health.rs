//! Health check endpoint

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::AppState;

/// Build identification captured by build.rs
#[derive(Debug, Serialize)]
pub struct BuildInfo {
    pub git_hash: &'static str,
    pub timestamp: &'static str,
    pub profile: &'static str,
}

impl BuildInfo {
    pub const fn current() -> Self {
        Self {
            git_hash: env!("GIT_HASH"),
            timestamp: env!("BUILD_TIMESTAMP"),
            profile: env!("BUILD_PROFILE"),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "ok", or "degraded" when no extraction strategy can run
    pub status: String,
    /// Module name ("poss-session")
    pub module: String,
    pub version: String,
    pub build: BuildInfo,
    /// Seconds since service started
    pub uptime_seconds: u64,
    /// Entities available for scoring
    pub catalog_entities: usize,
    pub live_sessions: usize,
    /// Sessions with a composition running
    pub composing_sessions: usize,
    /// True when a Remove.bg key is configured
    pub remote_extraction: bool,
    /// Extraction strategies that can run, in order
    pub extractors: Vec<&'static str>,
    /// Last error message if any (for diagnostics)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let uptime = Utc::now().signed_duration_since(state.startup_time);
    let uptime_seconds = uptime.num_seconds().max(0) as u64;

    let (live_sessions, composing_sessions) = {
        let sessions = state.sessions.read().await;
        (sessions.len(), sessions.values().filter(|s| s.processing).count())
    };
    let extractors = state.compositor.extractors().available_ids();
    let remote_extraction = extractors.contains(&"removebg");
    let last_error = state.last_error.read().await.clone();

    Json(HealthResponse {
        status: if extractors.is_empty() { "degraded" } else { "ok" }.to_string(),
        module: "poss-session".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        build: BuildInfo::current(),
        uptime_seconds,
        catalog_entities: state.catalog.len(),
        live_sessions,
        composing_sessions,
        remote_extraction,
        extractors,
        last_error,
    })
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
