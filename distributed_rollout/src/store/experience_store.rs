//! Multi-column experience store with fixed schema.
//!
//! Columns are stored struct-of-arrays: one `Vec<Option<V>>` per key, all of
//! the same physical length. `None` marks a slot that has never been written.
//!
//! ```text
//! Unbounded:  len(column) == size
//! Bounded(C): len(column) == C, slots [0, size) are live
//!
//!           0     1     2     3     4
//!    "S"  [ s0  | s1  | s2  | ∅   | ∅   ]
//!    "A"  [ a0  | a1  | a2  | ∅   | ∅   ]     size = 3, C = 5
//! ```
//!
//! Once a bounded store overflows, the overwrite policy picks the victims:
//! - `Rolling`: `added` contiguous positions starting at `size - C`, negative
//!   positions wrapping to the tail. A full store therefore writes `[0, added)`
//!   on every call.
//! - `Random`: the free tail `[size, C)` followed by a uniform sample, without
//!   replacement, of `size + added - C` filled positions.

use super::config::{Capacity, OverwritePolicy, StoreConfig};
use super::error::{Result, StoreError};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Values to write, keyed by column name. Every column must have the same length.
pub type Batch<V> = BTreeMap<String, Vec<V>>;

/// One physical column; `None` marks an empty slot.
pub type Column<V> = Vec<Option<V>>;

/// All physical columns keyed by name.
pub type Columns<V> = BTreeMap<String, Column<V>>;

/// One cross-column record.
pub type Record<V> = BTreeMap<String, Option<V>>;

#[derive(Debug, Clone, Copy)]
enum Layout {
    Unbounded,
    Bounded {
        capacity: usize,
        policy: OverwritePolicy,
    },
}

/// Schema-fixed store of equal-length columns.
///
/// `R` is the random source used by the `Random` overwrite policy; inject a
/// seeded generator with [`ExperienceStore::with_rng`] for reproducible
/// eviction.
///
/// The store does no internal locking. Wrap it in a
/// [`SharedExperienceStore`] when a writer and a reader live on different
/// threads.
#[derive(Debug, Clone)]
pub struct ExperienceStore<V, R = StdRng> {
    keys: Vec<String>,
    capacity: Capacity,
    overwrite_policy: Option<OverwritePolicy>,
    layout: Layout,
    columns: Columns<V>,
    size: usize,
    rng: R,
}

impl<V> ExperienceStore<V, StdRng> {
    /// Create a store with an entropy-seeded random source.
    pub fn new(config: StoreConfig) -> Result<Self> {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Create an unbounded store with the given columns.
    pub fn unbounded<I, K>(keys: I) -> Result<Self>
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        Self::new(StoreConfig::new(keys))
    }

    /// Create a bounded store with the given columns, capacity and policy.
    pub fn bounded<I, K>(keys: I, capacity: usize, policy: OverwritePolicy) -> Result<Self>
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        Self::new(
            StoreConfig::new(keys)
                .with_capacity(capacity)
                .with_overwrite_policy(policy),
        )
    }
}

impl<V, R: Rng> ExperienceStore<V, R> {
    /// Create a store drawing random overwrite positions from `rng`.
    pub fn with_rng(config: StoreConfig, rng: R) -> Result<Self> {
        config.validate()?;

        let layout = match (config.capacity, config.overwrite_policy) {
            (Capacity::Unbounded, _) => Layout::Unbounded,
            (Capacity::Bounded(capacity), Some(policy)) => Layout::Bounded { capacity, policy },
            (Capacity::Bounded(_), None) => {
                return Err(StoreError::InvalidConfig {
                    param: "overwrite_policy",
                    message: "required when capacity is bounded".to_string(),
                })
            }
        };

        let columns = empty_columns(&config.keys, config.capacity);
        Ok(Self {
            keys: config.keys,
            capacity: config.capacity,
            overwrite_policy: config.overwrite_policy,
            layout,
            columns,
            size: 0,
            rng,
        })
    }

    /// Add `contents` to the store and return the positions written, in the
    /// order the values were supplied.
    ///
    /// `overwrite_indexes` picks the victims when a bounded store would
    /// overflow; it must hold exactly `size + added - capacity` positions. It
    /// is ignored while the batch fits in the free space.
    ///
    /// Nothing is written unless the whole batch is accepted.
    pub fn put(
        &mut self,
        contents: Batch<V>,
        overwrite_indexes: Option<&[usize]>,
    ) -> Result<Vec<usize>> {
        self.check_schema(&contents)?;
        let added = validate(&contents)?;

        match self.layout {
            Layout::Unbounded => {
                let start = self.size;
                for (key, values) in contents {
                    if let Some(column) = self.columns.get_mut(&key) {
                        column.extend(values.into_iter().map(Some));
                    }
                }
                self.size += added;
                Ok((start..self.size).collect())
            }
            Layout::Bounded { capacity, policy } => {
                let indexes = self.write_indexes(capacity, policy, added, overwrite_indexes)?;
                self.write(&indexes, contents);
                self.size = capacity.min(self.size + added);
                Ok(indexes)
            }
        }
    }

    /// Overwrite the values at `indexes`, column by column.
    ///
    /// Values are zipped positionally with `indexes`. `contents` may name a
    /// subset of the columns. Size is unchanged and positions are not checked
    /// against it: a bounded store accepts writes to empty slots past `size`.
    /// Positions past the physical column length are rejected before any
    /// write.
    pub fn update(&mut self, indexes: &[usize], contents: Batch<V>) -> Result<Vec<usize>> {
        let added = validate(&contents)?;
        if let Some(unknown) = contents.keys().find(|k| !self.columns.contains_key(*k)) {
            log::debug!("update() got column '{}' outside the schema", unknown);
            return Err(self.schema_mismatch(&contents));
        }

        let len = self.physical_len();
        if let Some(&index) = indexes.iter().take(added).find(|&&i| i >= len) {
            return Err(StoreError::IndexOutOfBounds { index, len });
        }

        self.write(indexes, contents);
        Ok(indexes.to_vec())
    }

    /// Drop every entry. Keys, capacity and policy are kept.
    pub fn clear(&mut self) {
        self.columns = empty_columns(&self.keys, self.capacity);
        self.size = 0;
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.size
    }

    /// Whether the store holds no live entries.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Store capacity.
    pub fn capacity(&self) -> Capacity {
        self.capacity
    }

    /// Configured overwrite policy.
    pub fn overwrite_policy(&self) -> Option<OverwritePolicy> {
        self.overwrite_policy
    }

    /// Column names in declaration order.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Borrow the physical columns, empty slots included.
    pub fn columns(&self) -> &Columns<V> {
        &self.columns
    }

    /// Physical column for `key`, empty slots included.
    pub fn get_by_key(&self, key: &str) -> Result<&[Option<V>]> {
        self.columns
            .get(key)
            .map(Vec::as_slice)
            .ok_or_else(|| StoreError::UnknownKey(key.to_string()))
    }

    fn physical_len(&self) -> usize {
        match self.layout {
            Layout::Unbounded => self.size,
            Layout::Bounded { capacity, .. } => capacity,
        }
    }

    fn check_schema(&self, contents: &Batch<V>) -> Result<()> {
        let matches = contents.len() == self.columns.len()
            && contents.keys().all(|k| self.columns.contains_key(k));
        if matches {
            Ok(())
        } else {
            Err(self.schema_mismatch(contents))
        }
    }

    fn schema_mismatch(&self, contents: &Batch<V>) -> StoreError {
        StoreError::SchemaMismatch {
            expected: self.columns.keys().cloned().collect(),
            actual: contents.keys().cloned().collect(),
        }
    }

    fn write_indexes(
        &mut self,
        capacity: usize,
        policy: OverwritePolicy,
        added: usize,
        overwrite_indexes: Option<&[usize]>,
    ) -> Result<Vec<usize>> {
        if added > capacity {
            return Err(StoreError::CapacityExceeded { added, capacity });
        }

        let size = self.size;
        if size + added <= capacity {
            return Ok((size..size + added).collect());
        }
        let num_overwrites = size + added - capacity;

        if let Some(victims) = overwrite_indexes {
            if victims.len() != num_overwrites {
                return Err(StoreError::OverwriteCountMismatch {
                    expected: num_overwrites,
                    actual: victims.len(),
                });
            }
            if let Some(&index) = victims.iter().find(|&&i| i >= capacity) {
                return Err(StoreError::IndexOutOfBounds {
                    index,
                    len: capacity,
                });
            }
            return Ok((size..capacity).chain(victims.iter().copied()).collect());
        }

        let indexes = match policy {
            OverwritePolicy::Rolling => {
                // Start is size - capacity (<= 0); negative positions wrap to the tail.
                let cap = capacity as isize;
                let start = size as isize - cap;
                (start..start + added as isize)
                    .map(|i| i.rem_euclid(cap) as usize)
                    .collect()
            }
            OverwritePolicy::Random => {
                let victims = rand::seq::index::sample(&mut self.rng, size, num_overwrites);
                (size..capacity).chain(victims.into_iter()).collect()
            }
        };
        Ok(indexes)
    }

    fn write(&mut self, indexes: &[usize], contents: Batch<V>) {
        for (key, values) in contents {
            if let Some(column) = self.columns.get_mut(&key) {
                for (&index, value) in indexes.iter().zip(values) {
                    column[index] = Some(value);
                }
            }
        }
    }
}

impl<V: Clone, R> ExperienceStore<V, R> {
    /// Copy of the columns, projected onto `indexes` when given.
    ///
    /// Without indexes the full physical columns are returned, so a bounded
    /// store includes its empty slots. Indexes may repeat and come in any
    /// order.
    pub fn get(&self, indexes: Option<&[usize]>) -> Result<Columns<V>> {
        let Some(indexes) = indexes else {
            return Ok(self.columns.clone());
        };

        let len = self.columns.values().next().map_or(0, Vec::len);
        if let Some(&index) = indexes.iter().find(|&&i| i >= len) {
            return Err(StoreError::IndexOutOfBounds { index, len });
        }

        Ok(self
            .columns
            .iter()
            .map(|(key, column)| {
                let projected = indexes.iter().map(|&i| column[i].clone()).collect();
                (key.clone(), projected)
            })
            .collect())
    }

    /// The record at `index` across all columns.
    pub fn record(&self, index: usize) -> Result<Record<V>> {
        let len = self.columns.values().next().map_or(0, Vec::len);
        if index >= len {
            return Err(StoreError::IndexOutOfBounds { index, len });
        }
        Ok(self
            .columns
            .iter()
            .map(|(key, column)| (key.clone(), column[index].clone()))
            .collect())
    }

    /// Independent deep copy of every column.
    pub fn dumps(&self) -> Columns<V> {
        self.columns.clone()
    }
}

/// Check that every column has the same length and return it.
pub fn validate<V>(contents: &Batch<V>) -> Result<usize> {
    let mut lengths = contents.iter().map(|(key, values)| (key, values.len()));
    let Some((reference, expected)) = lengths.next() else {
        return Ok(0);
    };

    for (key, actual) in lengths {
        if actual != expected {
            return Err(StoreError::ColumnLengthMismatch {
                reference: reference.clone(),
                expected,
                key: key.clone(),
                actual,
            });
        }
    }
    Ok(expected)
}

fn empty_columns<V>(keys: &[String], capacity: Capacity) -> Columns<V> {
    keys.iter()
        .map(|key| {
            let column = match capacity {
                Capacity::Unbounded => Vec::new(),
                Capacity::Bounded(c) => (0..c).map(|_| None).collect(),
            };
            (key.clone(), column)
        })
        .collect()
}

/// Store shared between a writer thread and its readers.
pub type SharedExperienceStore<V, R = StdRng> = Arc<Mutex<ExperienceStore<V, R>>>;

/// Wrap a store for cross-thread access.
pub fn shared_store<V, R>(store: ExperienceStore<V, R>) -> SharedExperienceStore<V, R> {
    Arc::new(Mutex::new(store))
}
