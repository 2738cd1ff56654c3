//! Read-only fleet projections. Every function takes the registry lock only
//! long enough to build its snapshot list; none ever blocks ingestion for a
//! rocket it is not reading, and none ever hands back a live reference into
//! the registry.

use std::collections::BTreeSet;

use crate::registry::FleetRegistry;
use crate::types::RocketSnapshot;

/// All rockets, ascending by `launch_time`.
pub fn list_fleet(registry: &FleetRegistry) -> Vec<RocketSnapshot> {
    let mut rockets = registry.snapshot_all();
    rockets.sort_by(|a, b| a.launch_time_at.cmp(&b.launch_time_at));
    rockets
}

/// Sorted, unique mission strings across the fleet, in their original case.
/// Two missions differing only in case are kept as distinct entries here —
/// see [`rockets_by_mission`] for the case-insensitive filter, which
/// coalesces them.
pub fn list_missions(registry: &FleetRegistry) -> Vec<String> {
    let missions: BTreeSet<String> = registry
        .snapshot_all()
        .into_iter()
        .map(|r| r.mission)
        .collect();
    missions.into_iter().collect()
}

/// Rockets whose mission matches `name` case-insensitively, ascending by
/// `launch_time`.
pub fn rockets_by_mission(registry: &FleetRegistry, name: &str) -> Vec<RocketSnapshot> {
    let needle = name.to_lowercase();
    let mut rockets: Vec<RocketSnapshot> = registry
        .snapshot_all()
        .into_iter()
        .filter(|r| r.mission.to_lowercase() == needle)
        .collect();
    rockets.sort_by(|a, b| a.launch_time_at.cmp(&b.launch_time_at));
    rockets
}

/// A single rocket's snapshot, or `None` if the id is unknown.
pub fn rocket_by_id(registry: &FleetRegistry, id: &str) -> Option<RocketSnapshot> {
    registry.lookup(id)
}
