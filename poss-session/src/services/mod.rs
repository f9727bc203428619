//! Background services for poss-session

pub mod session_sweeper;

pub use session_sweeper::{discard_output, evict_idle_sessions, SessionSweeper, SweeperConfig};
