//! # Adapters
//!
//! In-memory snapshot source for tests and single-process embedders.

pub mod snapshot_source;

pub use snapshot_source::SharedSnapshotSource;
