//! Periodic registry refresh.
//!
//! [`PollingController`] owns one background task that refreshes the
//! [`ServerRegistry`] immediately and then on a fixed interval until stopped.

use crate::api::ServerSource;
use crate::registry::ServerRegistry;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Shortest accepted polling period.
pub const MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Handle on the running poll task.
struct PollTask {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl PollTask {
    fn shutdown(self) {
        self.cancel.cancel();
        self.handle.abort();
    }
}

/// Runs the refresh timer for a registry.
///
/// At most one timer exists per controller: `start` on a running controller
/// tears the old task down first, and `stop` is idempotent.
pub struct PollingController {
    registry: Arc<ServerRegistry>,
    source: Arc<dyn ServerSource>,
    interval: Duration,
    task: Mutex<Option<PollTask>>,
}

impl PollingController {
    pub fn new(
        registry: Arc<ServerRegistry>,
        source: Arc<dyn ServerSource>,
        interval: Duration,
    ) -> Self {
        Self {
            registry,
            source,
            interval: interval.max(MIN_INTERVAL),
            task: Mutex::new(None),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Start polling. Must be called from within a tokio runtime.
    pub fn start(&self) {
        let mut slot = self.task.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = slot.take() {
            tracing::debug!("Replacing running poll task");
            previous.shutdown();
        }

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(Self::run(
            Arc::clone(&self.registry),
            Arc::clone(&self.source),
            self.interval,
            cancel.clone(),
        ));
        *slot = Some(PollTask { cancel, handle });
    }

    /// Stop polling. Returns whether a task was running.
    pub fn stop(&self) -> bool {
        let task = self
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match task {
            Some(task) => {
                task.shutdown();
                tracing::info!("Registry polling stopped");
                true
            }
            None => false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|task| !task.handle.is_finished())
    }

    async fn run(
        registry: Arc<ServerRegistry>,
        source: Arc<dyn ServerSource>,
        period: Duration,
        cancel: CancellationToken,
    ) {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        tracing::info!(
            interval_seconds = period.as_secs(),
            "Registry polling started"
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = interval.tick() => {
                    // The fetch itself is raced against cancellation so a
                    // slow backend cannot write after teardown.
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        outcome = registry.refresh(source.as_ref()) => {
                            tracing::debug!(?outcome, "Poll cycle completed");
                        }
                    }
                }
            }
        }
    }
}

impl Drop for PollingController {
    fn drop(&mut self) {
        let task = self
            .task
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(task) = task {
            task.shutdown();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::{server, FakeSource};
    use crate::api::{ApiError, ServerStatus};

    const PERIOD: Duration = Duration::from_secs(30);

    /// Let spawned tasks run to their next await point.
    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    fn controller(source: &Arc<FakeSource>) -> (Arc<ServerRegistry>, PollingController) {
        let registry = Arc::new(ServerRegistry::new());
        let source: Arc<dyn ServerSource> = source.clone();
        let poller = PollingController::new(Arc::clone(&registry), source, PERIOD);
        (registry, poller)
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetches_immediately_then_every_period() {
        let source = Arc::new(FakeSource::with_servers(vec![server("a", ServerStatus::Online)]));
        let (registry, poller) = controller(&source);

        poller.start();
        settle().await;
        assert_eq!(source.list_calls(), 1);
        assert_eq!(registry.view().online_count(), 1);

        tokio::time::advance(Duration::from_secs(29)).await;
        settle().await;
        assert_eq!(source.list_calls(), 1);

        tokio::time::advance(Duration::from_secs(1)).await;
        settle().await;
        assert_eq!(source.list_calls(), 2);

        tokio::time::advance(PERIOD).await;
        settle().await;
        assert_eq!(source.list_calls(), 3);
        poller.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_fetch_after_stop() {
        let source = Arc::new(FakeSource::new());
        let (_registry, poller) = controller(&source);

        poller.start();
        settle().await;
        assert_eq!(source.list_calls(), 1);

        tokio::time::advance(Duration::from_secs(10)).await;
        assert!(poller.stop());

        tokio::time::advance(PERIOD * 4).await;
        settle().await;
        assert_eq!(source.list_calls(), 1);
        assert!(!poller.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_is_idempotent() {
        let source = Arc::new(FakeSource::new());
        let (_registry, poller) = controller(&source);

        assert!(!poller.stop());
        poller.start();
        assert!(poller.stop());
        assert!(!poller.stop());
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_does_not_duplicate_timers() {
        let source = Arc::new(FakeSource::new());
        let (_registry, poller) = controller(&source);

        poller.start();
        settle().await;
        poller.start();
        settle().await;
        poller.start();
        settle().await;
        // One immediate fetch per activation
        assert_eq!(source.list_calls(), 3);

        tokio::time::advance(PERIOD).await;
        settle().await;
        // Only the surviving timer fires
        assert_eq!(source.list_calls(), 4);
        poller.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_do_not_stop_polling() {
        let source = Arc::new(FakeSource::with_servers(vec![server("a", ServerStatus::Online)]));
        source.push_list(Err(ApiError::Network("connection refused".into())));
        source.push_list(Err(ApiError::Timeout(10_000)));
        let (registry, poller) = controller(&source);

        poller.start();
        settle().await;
        assert!(registry.view().has_error());
        assert!(registry.view().is_loading());

        tokio::time::advance(PERIOD).await;
        settle().await;
        assert!(registry.view().has_error());

        tokio::time::advance(PERIOD).await;
        settle().await;
        assert_eq!(source.list_calls(), 3);
        assert!(!registry.view().has_error());
        assert_eq!(registry.view().online_count(), 1);
        poller.stop();
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        let source: Arc<dyn ServerSource> = Arc::new(FakeSource::new());
        let poller =
            PollingController::new(Arc::new(ServerRegistry::new()), source, Duration::ZERO);
        assert_eq!(poller.interval(), MIN_INTERVAL);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_task() {
        let source = Arc::new(FakeSource::new());
        let (_registry, poller) = controller(&source);

        poller.start();
        settle().await;
        drop(poller);

        tokio::time::advance(PERIOD * 3).await;
        settle().await;
        assert_eq!(source.list_calls(), 1);
    }
}
