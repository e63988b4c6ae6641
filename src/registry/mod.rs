//! Server Registry module.
//!
//! Client-side cache of the fleet. The registry is written only by
//! [`ServerRegistry::refresh`] (or [`ServerRegistry::apply`]), and each
//! successful write swaps in a whole new snapshot.

mod view;
#[cfg(test)]
mod tests;

pub use view::*;

use crate::api::{ApiError, Server, ServerSource};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

/// What a refresh did to the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Snapshot replaced; carries the new entry count.
    Replaced(usize),
    /// Fetch failed; previous snapshot kept, error recorded.
    Failed(String),
    /// Registry is closed; result dropped without writing.
    Discarded,
}

/// The Server Registry holds the last known fleet snapshot.
///
/// Snapshots are published through a `tokio::sync::watch` channel, so readers
/// either see the previous list or the new one, never a half-applied update.
///
/// # Examples
///
/// ```
/// use fleet::registry::{RefreshOutcome, ServerRegistry};
///
/// let registry = ServerRegistry::new();
/// assert!(registry.view().is_loading());
///
/// assert_eq!(registry.apply(Ok(vec![])), RefreshOutcome::Replaced(0));
/// assert!(!registry.view().is_loading());
/// assert_eq!(registry.view().total_count(), 0);
/// ```
pub struct ServerRegistry {
    tx: watch::Sender<RegistryView>,
    open: AtomicBool,
}

impl ServerRegistry {
    /// Create a registry in the `Loading` phase.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(RegistryView::default());
        Self {
            tx,
            open: AtomicBool::new(true),
        }
    }

    /// Current snapshot. Cheap: the server list is behind an `Arc`.
    pub fn view(&self) -> RegistryView {
        self.tx.borrow().clone()
    }

    /// Receiver notified on every write (replacement or error change).
    pub fn subscribe(&self) -> watch::Receiver<RegistryView> {
        self.tx.subscribe()
    }

    /// Fetch the fleet from `source` and apply the result.
    pub async fn refresh(&self, source: &dyn ServerSource) -> RefreshOutcome {
        let result = source.list_servers().await;
        self.apply(result)
    }

    /// Reconcile one fetch result into the registry.
    ///
    /// Success replaces the list and clears the error flag. Failure keeps the
    /// list and records the error. A closed registry ignores both.
    pub fn apply(&self, result: Result<Vec<Server>, ApiError>) -> RefreshOutcome {
        if !self.is_open() {
            tracing::debug!("Registry closed, discarding late refresh result");
            return RefreshOutcome::Discarded;
        }

        match result {
            Ok(servers) => {
                let count = servers.len();
                let snapshot: Arc<[Server]> = servers.into();
                self.tx.send_modify(|view| {
                    view.phase = RegistryPhase::Ready(snapshot);
                    view.error = None;
                    view.generation += 1;
                });
                metrics::counter!(crate::metrics::REGISTRY_REFRESH_TOTAL, "outcome" => "ok").increment(1);
                tracing::debug!(servers = count, "Registry refreshed");
                RefreshOutcome::Replaced(count)
            }
            Err(e) => {
                let message = e.to_string();
                self.tx.send_modify(|view| view.error = Some(message.clone()));
                metrics::counter!(crate::metrics::REGISTRY_REFRESH_TOTAL, "outcome" => "error")
                    .increment(1);
                tracing::warn!(error = %e, "Registry refresh failed, keeping last snapshot");
                RefreshOutcome::Failed(message)
            }
        }
    }

    /// Stop accepting writes. Idempotent.
    pub fn close(&self) {
        self.open.store(false, Ordering::SeqCst);
    }

    /// Accept writes again (after a re-mount).
    pub fn reopen(&self) {
        self.open.store(true, Ordering::SeqCst);
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }
}

impl Default for ServerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
