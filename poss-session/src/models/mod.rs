//! Session data models

pub mod session;

pub use session::{CompositionRequest, SessionState};
