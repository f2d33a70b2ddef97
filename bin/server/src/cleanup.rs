//! Periodic removal of idle sessions.

use crate::state::AppState;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Removes sessions idle longer than the configured timeout.
///
/// Returns the number removed.
pub async fn sweep_idle_sessions(state: &AppState) -> usize {
    let cutoff = Utc::now() - state.session_config.idle_timeout();
    state.store.evict_idle(cutoff).await
}

/// Spawns the background sweep. Runs until the runtime shuts down.
pub fn spawn_session_cleanup(state: Arc<AppState>) -> JoinHandle<()> {
    let period = Duration::from_secs(state.session_config.cleanup_interval_seconds);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        // The first tick completes immediately.
        interval.tick().await;
        loop {
            interval.tick().await;
            let removed = sweep_idle_sessions(&state).await;
            if removed > 0 {
                tracing::debug!(removed_sessions = removed, "Periodic session cleanup");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use reservation_relay_nlu::EchoClient;

    #[tokio::test]
    async fn fresh_sessions_survive_sweep() {
        let state = AppState::new(Arc::new(EchoClient::new()), SessionConfig::default());
        state
            .store
            .advance(&"alice".into(), "2 adults", "hi")
            .await
            .expect("advance");

        assert_eq!(sweep_idle_sessions(&state).await, 0);
        assert_eq!(state.store.len().await, 1);
    }

    #[tokio::test]
    async fn idle_sessions_are_swept() {
        let config = SessionConfig {
            idle_timeout_minutes: 0,
            ..SessionConfig::default()
        };
        let state = AppState::new(Arc::new(EchoClient::new()), config);
        state
            .store
            .advance(&"alice".into(), "2 adults", "hi")
            .await
            .expect("advance");
        tokio::time::sleep(Duration::from_millis(5)).await;

        assert_eq!(sweep_idle_sessions(&state).await, 1);
        assert!(state.store.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn background_task_sweeps_each_interval() {
        let config = SessionConfig {
            idle_timeout_minutes: 0,
            cleanup_interval_seconds: 60,
            ..SessionConfig::default()
        };
        let state = Arc::new(AppState::new(Arc::new(EchoClient::new()), config));
        state
            .store
            .advance(&"alice".into(), "2 adults", "hi")
            .await
            .expect("advance");
        // Session timestamps use the wall clock, which paused time doesn't move.
        std::thread::sleep(Duration::from_millis(5));

        let handle = spawn_session_cleanup(Arc::clone(&state));
        tokio::task::yield_now().await;
        assert_eq!(state.store.len().await, 1);

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert!(state.store.is_empty().await);
        assert!(!handle.is_finished());
        handle.abort();
    }
}
