//! Dashboard session: the pieces of the console wired together.
//!
//! `mount` opens the registry and starts polling; `unmount` stops the timer
//! and closes the registry so late results from in-flight actions are
//! discarded instead of written.

use crate::api::ServerSource;
use crate::cards::CardBoard;
use crate::config::PollingConfig;
use crate::dispatch::ActionDispatcher;
use crate::polling::PollingController;
use crate::registry::{RefreshOutcome, RegistryView, ServerRegistry};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

pub struct Dashboard {
    registry: Arc<ServerRegistry>,
    poller: PollingController,
    dispatcher: ActionDispatcher,
    cards: Arc<CardBoard>,
    mounted: AtomicBool,
}

impl Dashboard {
    pub fn new(source: Arc<dyn ServerSource>, polling: &PollingConfig) -> Self {
        let registry = Arc::new(ServerRegistry::new());
        let poller =
            PollingController::new(Arc::clone(&registry), Arc::clone(&source), polling.interval());
        let dispatcher = ActionDispatcher::new(source, Arc::clone(&registry));
        let cards = Arc::new(CardBoard::new(dispatcher.clone()));

        Self {
            registry,
            poller,
            dispatcher,
            cards,
            mounted: AtomicBool::new(false),
        }
    }

    /// Start the session. Idempotent; must run inside a tokio runtime.
    pub fn mount(&self) {
        if self.mounted.swap(true, Ordering::SeqCst) {
            return;
        }
        self.registry.reopen();
        self.poller.start();
        tracing::info!("Dashboard mounted");
    }

    /// Stop the session. Idempotent.
    pub fn unmount(&self) {
        if !self.mounted.swap(false, Ordering::SeqCst) {
            return;
        }
        self.poller.stop();
        self.registry.close();
        tracing::info!("Dashboard unmounted");
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }

    pub fn subscribe(&self) -> watch::Receiver<RegistryView> {
        self.registry.subscribe()
    }

    pub fn view(&self) -> RegistryView {
        self.registry.view()
    }

    /// Force a registry refresh outside the polling schedule.
    pub async fn reload(&self) -> RefreshOutcome {
        self.dispatcher.refresh().await
    }

    /// Drop card state for servers that left the fleet.
    pub fn sync_cards(&self) {
        self.cards.retain_known(self.registry.view().servers());
    }

    pub fn registry(&self) -> &Arc<ServerRegistry> {
        &self.registry
    }

    pub fn dispatcher(&self) -> &ActionDispatcher {
        &self.dispatcher
    }

    pub fn cards(&self) -> &Arc<CardBoard> {
        &self.cards
    }

    pub fn poller(&self) -> &PollingController {
        &self.poller
    }
}

impl Drop for Dashboard {
    fn drop(&mut self) {
        self.unmount();
    }
}
