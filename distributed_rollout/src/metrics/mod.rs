//! Collection metrics for the rollout coordinator.
//!
//! - [`CollectionMetrics`]: experience, step and per-peer reward totals

pub mod collection_metrics;

pub use collection_metrics::CollectionMetrics;
