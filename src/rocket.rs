//! Per-rocket materialized state and its private reorder buffer.
//!
//! A [`RocketState`] is created once, by the fleet registry, when a
//! `RocketLaunched` event is applied, and lives for the process lifetime.
//! Everything past construction goes through [`RocketInner`], which is
//! guarded by a single [`Mutex`] — the "rocket lock" of the locking
//! discipline described in the coordinator.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::Mutex;

use chrono::NaiveDateTime;

use crate::types::{RocketSnapshot, RocketStatus, ValidatedEnvelope};

/// A buffered future envelope, ordered by `messageNumber` so the reorder
/// buffer can be kept as a min-heap (via `Reverse`, see [`RocketInner`]).
#[derive(Debug, Clone)]
pub struct BufferedMessage {
    pub number: i64,
    pub envelope: ValidatedEnvelope,
}

impl PartialEq for BufferedMessage {
    fn eq(&self, other: &Self) -> bool {
        self.number == other.number
    }
}
impl Eq for BufferedMessage {}

impl PartialOrd for BufferedMessage {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for BufferedMessage {
    fn cmp(&self, other: &Self) -> Ordering {
        self.number.cmp(&other.number)
    }
}

/// The mutable part of a rocket's state, held under the rocket's lock.
pub struct RocketInner {
    pub launch_time: NaiveDateTime,
    pub launch_time_raw: String,
    pub last_update_time_raw: String,
    pub last_message_number: i64,
    pub speed: i64,
    pub rocket_type: String,
    pub mission: String,
    pub status: RocketStatus,
    pub explosion_reason: Option<String>,
    /// Min-heap (by `Reverse`) of not-yet-applicable future messages.
    message_buffer: BinaryHeap<std::cmp::Reverse<BufferedMessage>>,
}

impl RocketInner {
    /// Advance `last_message_number`/`last_update_time` and apply the field
    /// update for `increaseSpeed`, as an atomic unit.
    pub fn increase_speed(&mut self, by: i64, time_raw: &str, number: i64) {
        self.speed += by;
        self.advance(time_raw, number);
    }

    /// `decreaseSpeed` — no clamping; speed may go negative.
    pub fn decrease_speed(&mut self, by: i64, time_raw: &str, number: i64) {
        self.speed -= by;
        self.advance(time_raw, number);
    }

    /// `explode` — one-way status transition to `Exploded`.
    pub fn explode(&mut self, reason: String, time_raw: &str, number: i64) {
        self.status = RocketStatus::Exploded;
        self.explosion_reason = Some(reason);
        self.advance(time_raw, number);
    }

    /// `changeMission`.
    pub fn change_mission(&mut self, new_mission: String, time_raw: &str, number: i64) {
        self.mission = new_mission;
        self.advance(time_raw, number);
    }

    fn advance(&mut self, time_raw: &str, number: i64) {
        self.last_update_time_raw = time_raw.to_string();
        self.last_message_number = number;
    }

    /// Insert preserving the min-heap property on `messageNumber`.
    pub fn buffer_push(&mut self, number: i64, envelope: ValidatedEnvelope) {
        self.message_buffer
            .push(std::cmp::Reverse(BufferedMessage { number, envelope }));
    }

    /// Return the `(number, envelope)` with the smallest number, if any,
    /// without removing it.
    pub fn buffer_peek(&self) -> Option<&BufferedMessage> {
        self.message_buffer.peek().map(|reversed| &reversed.0)
    }

    /// Remove and return the smallest-numbered buffered message.
    pub fn buffer_pop_min(&mut self) -> Option<BufferedMessage> {
        self.message_buffer.pop().map(|reversed| reversed.0)
    }

    /// Linear scan — buffers are small in steady-state operation (bounded
    /// by the width of the current gap), so this is cheap in practice.
    pub fn buffer_contains(&self, number: i64) -> bool {
        self.message_buffer.iter().any(|reversed| reversed.0.number == number)
    }

    #[cfg(test)]
    pub fn buffer_len(&self) -> usize {
        self.message_buffer.len()
    }
}

/// One rocket's state, owned for the process lifetime by the fleet
/// registry. All mutation happens through [`lock`](Self::lock), which
/// callers must hold for the duration of an apply-and-drain cycle.
pub struct RocketState {
    pub id: String,
    inner: Mutex<RocketInner>,
}

impl RocketState {
    /// Construct a rocket from its `RocketLaunched` envelope. The launch
    /// event's own effects are baked into the initial state here; it is
    /// never separately applied through the reconstructor.
    pub fn from_launch(envelope: &ValidatedEnvelope) -> Self {
        let payload = &envelope.payload;
        let rocket_type = payload
            .get("type")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        let launch_speed = payload.get("launchSpeed").and_then(|v| v.as_i64()).unwrap_or(0);
        let mission = payload
            .get("mission")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        Self {
            id: envelope.channel.clone(),
            inner: Mutex::new(RocketInner {
                launch_time: envelope.message_time,
                launch_time_raw: envelope.message_time_raw.clone(),
                last_update_time_raw: envelope.message_time_raw.clone(),
                last_message_number: envelope.message_number,
                speed: launch_speed,
                rocket_type,
                mission,
                status: RocketStatus::Launched,
                explosion_reason: None,
                message_buffer: BinaryHeap::new(),
            }),
        }
    }

    /// Acquire the rocket's lock. The returned guard is the rocket's
    /// critical section for the channel reconstructor.
    pub fn lock(&self) -> std::sync::MutexGuard<'_, RocketInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// An immutable copy of all fields except the buffer.
    pub fn snapshot(&self) -> RocketSnapshot {
        let inner = self.lock();
        RocketSnapshot {
            id: self.id.clone(),
            launch_time: inner.launch_time_raw.clone(),
            launch_time_at: inner.launch_time,
            last_update_time: inner.last_update_time_raw.clone(),
            last_message_number: inner.last_message_number,
            speed: inner.speed,
            rocket_type: inner.rocket_type.clone(),
            mission: inner.mission.clone(),
            status: inner.status,
            explosion_reason: inner.explosion_reason.clone(),
        }
    }
}
