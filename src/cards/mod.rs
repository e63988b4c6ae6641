//! Per-server card state.
//!
//! Each server card can be expanded, and has three busy sub-states
//! (`testing`, `pulling`, `deleting`) plus the pull-model input. State is keyed by server id so
//! cards are independent: a probe on one card never blocks another.

use crate::api::{ProbeOutcome, ProbeSummary, PullJob, Server, ServerId};
use crate::dispatch::{validate_model_name, ActionDispatcher, ActionError};
use dashmap::DashMap;

/// State of one server card.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardState {
    pub expanded: bool,
    pub testing: bool,
    pub pulling: bool,
    pub deleting: bool,
    /// Model name typed into the pull field
    pub pull_input: String,
    /// Job id of the last accepted pull
    pub last_job: Option<String>,
    /// Message of the last failed action on this card
    pub last_error: Option<String>,
}

#[derive(Debug, Clone, Copy)]
enum Busy {
    Testing,
    Pulling,
    Deleting,
}

impl Busy {
    fn flag(self, state: &mut CardState) -> &mut bool {
        match self {
            Busy::Testing => &mut state.testing,
            Busy::Pulling => &mut state.pulling,
            Busy::Deleting => &mut state.deleting,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Busy::Testing => "test",
            Busy::Pulling => "pull",
            Busy::Deleting => "delete",
        }
    }
}

/// Clears a busy flag when dropped, so the card recovers even if the
/// action future is cancelled mid-flight.
struct BusyGuard<'a> {
    cards: &'a DashMap<ServerId, CardState>,
    id: ServerId,
    busy: Busy,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        if let Some(mut card) = self.cards.get_mut(&self.id) {
            *self.busy.flag(&mut card) = false;
        }
    }
}

/// All server cards, backed by the dispatcher for their actions.
pub struct CardBoard {
    cards: DashMap<ServerId, CardState>,
    dispatcher: ActionDispatcher,
}

impl CardBoard {
    pub fn new(dispatcher: ActionDispatcher) -> Self {
        Self {
            cards: DashMap::new(),
            dispatcher,
        }
    }

    /// Copy of a card's state (default for cards never touched).
    pub fn state(&self, id: &ServerId) -> CardState {
        self.cards
            .get(id)
            .map(|card| card.value().clone())
            .unwrap_or_default()
    }

    /// Flip expansion. Returns the new value.
    pub fn toggle(&self, id: &ServerId) -> bool {
        let mut card = self.cards.entry(id.clone()).or_default();
        card.expanded = !card.expanded;
        card.expanded
    }

    pub fn is_expanded(&self, id: &ServerId) -> bool {
        self.cards.get(id).is_some_and(|card| card.expanded)
    }

    pub fn set_pull_input(&self, id: &ServerId, text: &str) {
        self.cards.entry(id.clone()).or_default().pull_input = text.to_string();
    }

    pub fn test_enabled(&self, id: &ServerId) -> bool {
        !self.state(id).testing
    }

    pub fn pull_enabled(&self, id: &ServerId) -> bool {
        let card = self.state(id);
        !card.pulling && !card.pull_input.trim().is_empty()
    }

    /// Delete is offered only for servers without workers, and not while a
    /// delete for the same card is outstanding.
    pub fn delete_enabled(&self, server: &Server) -> bool {
        server.can_delete() && !self.state(&server.id).deleting
    }

    /// Probe one server; the card shows `testing` until the probe and the
    /// follow-up refresh finish.
    pub async fn test(&self, id: &ServerId) -> Result<ProbeOutcome, ActionError> {
        let _guard = self.enter(id, Busy::Testing)?;
        let result = self.dispatcher.test_server(id).await;
        self.record(id, &result);
        result
    }

    /// Submit the card's pull input. The input is cleared only on success,
    /// and only if it was not edited while the pull was outstanding.
    pub async fn pull(&self, id: &ServerId) -> Result<PullJob, ActionError> {
        let model = self.state(id).pull_input;
        let model = validate_model_name(&model)?.to_string();

        let _guard = self.enter(id, Busy::Pulling)?;
        let result = self.dispatcher.pull_model(id, &model).await;
        self.record(id, &result);
        if let Ok(job) = &result {
            if let Some(mut card) = self.cards.get_mut(id) {
                if card.pull_input.trim() == model {
                    card.pull_input.clear();
                }
                card.last_job = Some(job.job_id.clone());
            }
        }
        result
    }

    /// Delete a server through the dispatcher (blocked while workers are attached).
    pub async fn delete(&self, id: &ServerId) -> Result<(), ActionError> {
        let _guard = self.enter(id, Busy::Deleting)?;
        let result = self.dispatcher.delete_server(id).await;
        self.record(id, &result);
        if result.is_ok() {
            self.cards.remove(id);
        }
        result
    }

    /// False while a fleet-wide probe is outstanding.
    pub fn test_all_enabled(&self) -> bool {
        self.dispatcher.test_all_enabled()
    }

    /// Probe every server. One run at a time across the whole board.
    pub async fn test_all(&self) -> Result<ProbeSummary, ActionError> {
        self.dispatcher.test_all().await
    }

    /// Forget cards for servers that left the fleet.
    pub fn retain_known(&self, servers: &[Server]) {
        self.cards
            .retain(|id, _| servers.iter().any(|server| &server.id == id));
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    fn enter(&self, id: &ServerId, busy: Busy) -> Result<BusyGuard<'_>, ActionError> {
        let mut card = self.cards.entry(id.clone()).or_default();
        let flag = busy.flag(&mut card);
        if *flag {
            return Err(ActionError::Busy(busy.label()));
        }
        *flag = true;
        drop(card);

        Ok(BusyGuard {
            cards: &self.cards,
            id: id.clone(),
            busy,
        })
    }

    fn record<T>(&self, id: &ServerId, result: &Result<T, ActionError>) {
        if let Some(mut card) = self.cards.get_mut(id) {
            card.last_error = result.as_ref().err().map(ActionError::user_message);
        }
    }
}
