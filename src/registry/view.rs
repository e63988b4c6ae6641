use crate::api::{Server, ServerId};
use std::sync::Arc;

/// Whether the registry has ever been filled.
#[derive(Debug, Clone, Default)]
pub enum RegistryPhase {
    /// No successful refresh yet. Distinct from an empty fleet.
    #[default]
    Loading,
    /// Last applied snapshot, in backend order.
    Ready(Arc<[Server]>),
}

/// Read-only snapshot of the registry.
///
/// Cloning shares the server list; nothing here can mutate the registry.
#[derive(Debug, Clone, Default)]
pub struct RegistryView {
    pub phase: RegistryPhase,
    /// Message of the last failed refresh, cleared by the next success
    pub error: Option<String>,
    /// Number of snapshots applied so far
    pub generation: u64,
}

impl RegistryView {
    pub fn is_loading(&self) -> bool {
        matches!(self.phase, RegistryPhase::Loading)
    }

    /// Servers of the current snapshot (empty while loading).
    pub fn servers(&self) -> &[Server] {
        match &self.phase {
            RegistryPhase::Loading => &[],
            RegistryPhase::Ready(servers) => servers,
        }
    }

    pub fn get(&self, id: &ServerId) -> Option<&Server> {
        self.servers().iter().find(|s| &s.id == id)
    }

    /// Entries whose status is `online`.
    pub fn online_count(&self) -> usize {
        self.servers().iter().filter(|s| s.is_online()).count()
    }

    pub fn total_count(&self) -> usize {
        self.servers().len()
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }
}
