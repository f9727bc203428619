//! Idle session eviction
//!
//! Sessions live in memory until a client deletes them. Clients that walk
//! away never do, so a periodic sweep drops sessions untouched for longer
//! than the idle TTL, cancelling their compositions and deleting their
//! composed output.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::interval;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::AppState;

/// Sweeper configuration
#[derive(Debug, Clone)]
pub struct SweeperConfig {
    /// Seconds between sweeps (default: 60s)
    pub interval_secs: u64,
    /// Idle time after which a session is evicted (default: 1h)
    pub idle_ttl_secs: u64,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            interval_secs: 60,
            idle_ttl_secs: 3600,
        }
    }
}

/// Delete a composed output file; a missing file is not an error
pub async fn discard_output(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!(path = %path.display(), "Output removed"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove output"),
    }
}

/// Drop every session idle for longer than `ttl` as of `now`.
///
/// Returns the number of sessions evicted.
pub async fn evict_idle_sessions(state: &AppState, ttl: chrono::Duration, now: DateTime<Utc>) -> usize {
    let outputs: Vec<Option<PathBuf>> = {
        let mut sessions = state.sessions.write().await;
        let idle: Vec<_> = sessions
            .iter()
            .filter(|(_, s)| s.is_idle(ttl, now))
            .map(|(id, _)| *id)
            .collect();

        idle.iter()
            .filter_map(|id| sessions.remove(id))
            .map(|mut session| {
                let cancelled = session.cancel_composition();
                debug!(session_id = %session.id, cancelled, "Evicting idle session");
                session.take_output()
            })
            .collect()
    };

    let evicted = outputs.len();
    for path in outputs.into_iter().flatten() {
        discard_output(&path).await;
    }
    evicted
}

/// Periodic idle-session sweep
pub struct SessionSweeper {
    state: AppState,
    config: SweeperConfig,
}

impl SessionSweeper {
    pub fn new(state: AppState, config: SweeperConfig) -> Self {
        Self { state, config }
    }

    /// Spawn the sweep loop; it stops when `shutdown` is cancelled
    pub fn run(self, shutdown: CancellationToken) -> tokio::task::JoinHandle<()> {
        info!(
            "Starting SessionSweeper (interval: {}s, idle ttl: {}s)",
            self.config.interval_secs, self.config.idle_ttl_secs
        );
        let ttl = chrono::Duration::seconds(self.config.idle_ttl_secs as i64);

        tokio::spawn(async move {
            let mut timer = interval(Duration::from_secs(self.config.interval_secs.max(1)));
            timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = timer.tick() => {}
                }

                let evicted = evict_idle_sessions(&self.state, ttl, Utc::now()).await;
                if evicted > 0 {
                    info!(evicted, "Idle sessions evicted");
                }
            }
            debug!("SessionSweeper stopped");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SessionState;
    use poss_common::questions::Perspective;
    use poss_common::EntityCatalog;
    use poss_compositor::{CompositionOutcome, DirOverlayStore, ExtractionChain, ImageCompositor};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn state(dir: &TempDir) -> AppState {
        let compositor = ImageCompositor::new(
            Arc::new(DirOverlayStore::new(dir.path().join("overlays"))),
            ExtractionChain::default(),
            dir.path().join("output"),
        );
        AppState::new(EntityCatalog::from_seed(), compositor)
    }

    #[test]
    fn test_default_config() {
        let config = SweeperConfig::default();
        assert_eq!(config.interval_secs, 60);
        assert_eq!(config.idle_ttl_secs, 3600);
    }

    #[tokio::test]
    async fn test_evicts_only_idle_sessions_and_their_output() {
        let dir = TempDir::new().unwrap();
        let state = state(&dir);
        let ttl = chrono::Duration::minutes(10);
        let now = Utc::now();

        let output = dir.path().join("possessed_idle.jpg");
        std::fs::write(&output, b"jpeg").unwrap();
        let photo = dir.path().join("me.jpg");
        std::fs::write(&photo, b"photo").unwrap();

        let mut idle = SessionState::new(Perspective::First, Vec::new());
        idle.last_active = now - chrono::Duration::minutes(11);
        idle.result_image = Some(output.clone());
        idle.composition_outcome = Some(CompositionOutcome::Composited);

        let mut idle_passthrough = SessionState::new(Perspective::First, Vec::new());
        idle_passthrough.last_active = now - chrono::Duration::hours(2);
        idle_passthrough.result_image = Some(photo.clone());
        idle_passthrough.composition_outcome = Some(CompositionOutcome::Passthrough);

        let mut active = SessionState::new(Perspective::Third, Vec::new());
        active.last_active = now - chrono::Duration::minutes(9);
        let active_id = active.id;

        {
            let mut sessions = state.sessions.write().await;
            for session in [idle, idle_passthrough, active] {
                sessions.insert(session.id, session);
            }
        }

        assert_eq!(evict_idle_sessions(&state, ttl, now).await, 2);

        let sessions = state.sessions.read().await;
        assert_eq!(sessions.len(), 1);
        assert!(sessions.contains_key(&active_id));
        assert!(!output.exists());
        assert!(photo.exists());
    }

    #[tokio::test]
    async fn test_nothing_to_evict() {
        let dir = TempDir::new().unwrap();
        let state = state(&dir);
        let session = SessionState::new(Perspective::First, Vec::new());
        state.sessions.write().await.insert(session.id, session);

        assert_eq!(evict_idle_sessions(&state, chrono::Duration::minutes(1), Utc::now()).await, 0);
        assert_eq!(state.sessions.read().await.len(), 1);
    }

    #[tokio::test]
    async fn test_discarding_missing_output_is_quiet() {
        let dir = TempDir::new().unwrap();
        discard_output(&dir.path().join("gone.jpg")).await;
    }

    #[tokio::test]
    async fn test_sweeper_stops_on_shutdown() {
        let dir = TempDir::new().unwrap();
        let shutdown = CancellationToken::new();
        let handle = SessionSweeper::new(state(&dir), SweeperConfig::default()).run(shutdown.clone());

        shutdown.cancel();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
