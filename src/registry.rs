//! The fleet registry: the channel-id → rocket-state map, guarded by a
//! single registry lock.
//!
//! Creation is gated on a specific event type (`RocketLaunched`) — there is
//! no anchor to order against for an unknown channel, so the source drops
//! anything else, and this registry preserves that behavior in
//! [`FleetRegistry::get_or_create`].

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::rocket::RocketState;
use crate::types::{MessageType, RocketSnapshot, ValidatedEnvelope};

/// Channel id → rocket state, for the process lifetime. Rockets are never
/// removed once created.
#[derive(Default)]
pub struct FleetRegistry {
    rockets: RwLock<HashMap<String, Arc<RocketState>>>,
}

impl FleetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the rocket for `envelope.channel`. If absent and the
    /// envelope is a `RocketLaunched`, construct and insert it. Otherwise
    /// return `None` — the caller drops the envelope.
    ///
    /// Takes the registry lock for the duration of the call only; the
    /// returned handle is cloned out so the lock is released before the
    /// caller enters the rocket's own critical section.
    pub fn get_or_create(&self, envelope: &ValidatedEnvelope) -> Option<Arc<RocketState>> {
        if let Some(existing) = self.rockets.read().unwrap_or_else(|p| p.into_inner()).get(&envelope.channel) {
            return Some(Arc::clone(existing));
        }

        if envelope.message_type != MessageType::RocketLaunched {
            return None;
        }

        let mut rockets = self.rockets.write().unwrap_or_else(|p| p.into_inner());
        // Re-check under the write lock: another thread may have raced us
        // here with the same launch (or a later event that lost the read
        // race above).
        if let Some(existing) = rockets.get(&envelope.channel) {
            return Some(Arc::clone(existing));
        }

        let rocket = Arc::new(RocketState::from_launch(envelope));
        rockets.insert(envelope.channel.clone(), Arc::clone(&rocket));
        Some(rocket)
    }

    /// All rocket snapshots, in arbitrary order. Callers sort as needed.
    pub fn snapshot_all(&self) -> Vec<RocketSnapshot> {
        let rockets = self.rockets.read().unwrap_or_else(|p| p.into_inner());
        rockets.values().map(|r| r.snapshot()).collect()
    }

    /// A single rocket's snapshot, or `None` if the channel is unknown.
    pub fn lookup(&self, id: &str) -> Option<RocketSnapshot> {
        let rockets = self.rockets.read().unwrap_or_else(|p| p.into_inner());
        rockets.get(id).map(|r| r.snapshot())
    }
}
