//! Command coordinator for Tabletracker.
//!
//! A [`Tracker`] owns a store and an immutable cached [`Snapshot`] of every
//! instance, character, and encounter. Commands validate and compute new
//! state in memory, commit it to the store in one batch, then publish a new
//! snapshot to subscribers. Read-only projections live on [`Snapshot`] and
//! [`InstanceQuery`].

/// Tracker configuration and cascade policy.
pub mod config;
/// Error types for tracker commands.
pub mod error;
/// Filtered instance queries.
pub mod query;
/// Immutable state snapshots and derived views.
pub mod snapshot;
/// The command coordinator.
pub mod tracker;

pub use config::{CascadePolicy, TrackerConfig};
pub use error::{EntityKind, TrackerError, TrackerResult};
pub use query::InstanceQuery;
pub use snapshot::Snapshot;
pub use tracker::{RemovalReport, Tracker};
