//! poss-session library interface
//!
//! HTTP service driving assessment sessions: questions, declarations,
//! scoring, and background photo composition.

pub mod api;
pub mod error;
pub mod models;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use poss_common::EntityCatalog;
use poss_compositor::ImageCompositor;
use poss_engine::ScoringEngine;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::models::SessionState;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Entity catalog (always the shipped seed)
    pub catalog: EntityCatalog,
    pub engine: Arc<ScoringEngine>,
    pub compositor: Arc<ImageCompositor>,
    /// Live sessions by id
    pub sessions: Arc<RwLock<HashMap<Uuid, SessionState>>>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Last error for diagnostic purposes
    pub last_error: Arc<RwLock<Option<String>>>,
}

impl AppState {
    pub fn new(catalog: EntityCatalog, compositor: ImageCompositor) -> Self {
        Self {
            engine: Arc::new(ScoringEngine::new(catalog.clone())),
            catalog,
            compositor: Arc::new(compositor),
            sessions: Arc::new(RwLock::new(HashMap::new())),
            startup_time: Utc::now(),
            last_error: Arc::new(RwLock::new(None)),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::health_routes())
        .merge(api::entity_routes())
        .merge(api::session_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
