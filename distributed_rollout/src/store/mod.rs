//! Bounded multi-column experience storage.
//!
//! - [`ExperienceStore`]: schema-fixed columns with unbounded growth or
//!   fixed capacity and rolling/random overwrite
//! - [`StoreConfig`]: keys, capacity and overwrite policy
//! - [`StoreError`]: schema, length and capacity violations

pub mod config;
pub mod error;
pub mod experience_store;

pub use config::{Capacity, OverwritePolicy, StoreConfig};
pub use error::StoreError;
pub use experience_store::{
    shared_store, validate, Batch, Column, Columns, ExperienceStore, Record,
    SharedExperienceStore,
};

#[cfg(test)]
mod tests;
