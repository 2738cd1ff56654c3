//! rocket-aggregator — fleet telemetry aggregator
//!
//! Reconstructs, per rocket, a deterministic state equivalent to applying a
//! stream of events strictly in sequence-number order exactly once, even
//! when the stream arrives out of order, duplicated, or interleaved across
//! rockets.
//!
//! ## Module map
//!
//! - [`types`] — wire envelope, payload, and snapshot types.
//! - [`rocket`] — the per-rocket materialized state and its reorder buffer.
//! - [`reconstructor`] — drop/buffer/apply+drain decision for one envelope.
//! - [`registry`] — the channel → rocket map and its creation gate.
//! - [`coordinator`] — the single ingestion entry point and locking discipline.
//! - [`query`] — read-only fleet projections.
//! - [`error`] — the HTTP-boundary error type.
//! - [`config`] — listen address configuration.
//! - [`api`] — the axum router and handlers.

pub mod api;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod query;
pub mod reconstructor;
pub mod registry;
pub mod rocket;
pub mod types;

pub use coordinator::IngestionCoordinator;
pub use registry::FleetRegistry;
