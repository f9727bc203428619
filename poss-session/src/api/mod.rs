//! HTTP API handlers for poss-session

pub mod entities;
pub mod health;
pub mod sessions;

pub use entities::entity_routes;
pub use health::health_routes;
pub use sessions::session_routes;
