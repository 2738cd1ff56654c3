//! The ingestion coordinator: the single public entry point for event
//! ingestion, enforcing the two-phase locking discipline (registry, then
//! rocket, never both at once) between the fleet registry and the channel
//! reconstructor.

use tracing::warn;

use crate::reconstructor::{self, Outcome};
use crate::registry::FleetRegistry;
use crate::types::{validate, RawEnvelope};

/// Owns the fleet registry and dispatches validated envelopes into the
/// per-rocket reconstructor.
pub struct IngestionCoordinator {
    registry: FleetRegistry,
}

impl IngestionCoordinator {
    pub fn new() -> Self {
        Self {
            registry: FleetRegistry::new(),
        }
    }

    pub fn registry(&self) -> &FleetRegistry {
        &self.registry
    }

    /// Ingest one raw envelope.
    ///
    /// 1. Validate — drop silently on any structural violation.
    /// 2. Acquire the registry lock via `get_or_create`, then release it.
    /// 3. Acquire the rocket's own lock and hand off to the reconstructor.
    ///
    /// The registry lock is never held while the reconstructor runs: its
    /// drain can be lengthy under bursty input, and the registry must stay
    /// hot for other channels' ingestion and for queries.
    pub fn ingest(&self, raw: RawEnvelope) -> Option<Outcome> {
        let envelope = match validate(&raw) {
            Some(envelope) => envelope,
            None => {
                warn!("dropping malformed envelope");
                return None;
            }
        };

        let rocket = self.registry.get_or_create(&envelope)?;
        Some(reconstructor::handle(&rocket, envelope))
    }
}

impl Default for IngestionCoordinator {
    fn default() -> Self {
        Self::new()
    }
}
