//! Construction parameters for the experience store.

use super::error::{Result, StoreError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Store capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Capacity {
    /// Grows without bound.
    Unbounded,
    /// Holds at most this many items; further writes overwrite.
    Bounded(usize),
}

impl Capacity {
    /// Interpret an integer capacity where any negative value means unbounded.
    ///
    /// Fails if the value does not fit in `usize` on this target.
    pub fn from_raw(raw: i64) -> Result<Self> {
        if raw < 0 {
            return Ok(Capacity::Unbounded);
        }
        usize::try_from(raw)
            .map(Capacity::Bounded)
            .map_err(|_| StoreError::InvalidConfig {
                param: "capacity",
                message: format!("{} does not fit in usize", raw),
            })
    }

    /// Integer form, `-1` for unbounded. Saturates at `i64::MAX`.
    pub fn as_raw(&self) -> i64 {
        match self {
            Capacity::Unbounded => -1,
            Capacity::Bounded(c) => i64::try_from(*c).unwrap_or(i64::MAX),
        }
    }

    /// Upper bound on the number of items, if any.
    pub fn limit(&self) -> Option<usize> {
        match self {
            Capacity::Unbounded => None,
            Capacity::Bounded(c) => Some(*c),
        }
    }

    /// Whether the store has a fixed capacity.
    pub fn is_bounded(&self) -> bool {
        matches!(self, Capacity::Bounded(_))
    }
}

/// Which existing entries a full store evicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverwritePolicy {
    /// Overwrite sequentially with wrap-around.
    Rolling,
    /// Overwrite uniformly random filled positions.
    Random,
}

impl fmt::Display for OverwritePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverwritePolicy::Rolling => f.write_str("rolling"),
            OverwritePolicy::Random => f.write_str("random"),
        }
    }
}

impl FromStr for OverwritePolicy {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "rolling" => Ok(OverwritePolicy::Rolling),
            "random" => Ok(OverwritePolicy::Random),
            other => Err(StoreError::InvalidConfig {
                param: "overwrite_policy",
                message: format!("must be 'rolling' or 'random', got '{}'", other),
            }),
        }
    }
}

/// Configuration for an [`ExperienceStore`](super::ExperienceStore).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Column names, in declaration order.
    pub keys: Vec<String>,
    /// Capacity of every column.
    pub capacity: Capacity,
    /// Overwrite behavior once a bounded store is full.
    pub overwrite_policy: Option<OverwritePolicy>,
}

impl StoreConfig {
    /// Unbounded store with the given columns.
    pub fn new<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
            capacity: Capacity::Unbounded,
            overwrite_policy: None,
        }
    }

    /// Set a fixed capacity.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = Capacity::Bounded(capacity);
        self
    }

    /// Set the capacity from its integer form (negative = unbounded).
    pub fn with_raw_capacity(mut self, capacity: i64) -> Result<Self> {
        self.capacity = Capacity::from_raw(capacity)?;
        Ok(self)
    }

    /// Set the overwrite policy.
    pub fn with_overwrite_policy(mut self, policy: OverwritePolicy) -> Self {
        self.overwrite_policy = Some(policy);
        self
    }

    /// Check that the configuration describes a usable store.
    pub fn validate(&self) -> Result<()> {
        if self.keys.is_empty() {
            return Err(StoreError::InvalidConfig {
                param: "keys",
                message: "at least one column is required".to_string(),
            });
        }

        let mut seen = HashSet::with_capacity(self.keys.len());
        for key in &self.keys {
            if !seen.insert(key.as_str()) {
                return Err(StoreError::InvalidConfig {
                    param: "keys",
                    message: format!("duplicate column '{}'", key),
                });
            }
        }

        if self.capacity.is_bounded() && self.overwrite_policy.is_none() {
            return Err(StoreError::InvalidConfig {
                param: "overwrite_policy",
                message: "required when capacity is bounded".to_string(),
            });
        }

        Ok(())
    }
}
