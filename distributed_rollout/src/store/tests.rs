//! Behavioral tests for the experience store.
//!
//! Test categories:
//! 1. Unbounded growth and index round-trips
//! 2. Schema and column-length validation
//! 3. Rolling overwrite arithmetic
//! 4. Random overwrite with an injected generator
//! 5. Caller-chosen overwrite positions
//! 6. update / get / record / dumps / clear

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::SeedableRng;

use super::*;

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

fn batch(pairs: &[(&str, Vec<i32>)]) -> Batch<i32> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

/// Batch for the two-column ("S", "A") schema used throughout.
fn sa(s: Vec<i32>, a: Vec<i32>) -> Batch<i32> {
    batch(&[("S", s), ("A", a)])
}

fn rolling(capacity: usize) -> ExperienceStore<i32> {
    ExperienceStore::bounded(["S", "A"], capacity, OverwritePolicy::Rolling).unwrap()
}

fn random_seeded(capacity: usize, seed: u64) -> ExperienceStore<i32> {
    let config = StoreConfig::new(["S", "A"])
        .with_capacity(capacity)
        .with_overwrite_policy(OverwritePolicy::Random);
    ExperienceStore::with_rng(config, StdRng::seed_from_u64(seed)).unwrap()
}

/// Live values of one column, panicking on an empty slot inside `[0, len)`.
fn live(store: &ExperienceStore<i32>, key: &str) -> Vec<i32> {
    store
        .get_by_key(key)
        .unwrap()
        .iter()
        .take(store.len())
        .map(|v| v.expect("live slot must be filled"))
        .collect()
}

// =============================================================================
// UNBOUNDED STORE TESTS
// =============================================================================

mod unbounded_tests {
    use super::*;

    #[test]
    fn test_len_is_sum_of_put_sizes() {
        let mut store = ExperienceStore::unbounded(["S", "A"]).unwrap();
        let sizes = [3usize, 1, 4, 0, 2];
        let mut expected_start = 0;

        for &n in &sizes {
            let values: Vec<i32> = (0..n as i32).collect();
            let indexes = store.put(sa(values.clone(), values), None).unwrap();
            assert_eq!(indexes, (expected_start..expected_start + n).collect::<Vec<_>>());
            expected_start += n;
        }

        assert_eq!(store.len(), sizes.iter().sum::<usize>());
        assert_eq!(store.get_by_key("S").unwrap().len(), store.len());
    }

    #[test]
    fn test_get_at_put_indexes_round_trips() {
        let mut store = ExperienceStore::unbounded(["S", "A"]).unwrap();
        store.put(sa(vec![1, 2], vec![10, 20]), None).unwrap();
        let indexes = store.put(sa(vec![3, 4, 5], vec![30, 40, 50]), None).unwrap();

        let got = store.get(Some(&indexes)).unwrap();
        assert_eq!(got["S"], vec![Some(3), Some(4), Some(5)]);
        assert_eq!(got["A"], vec![Some(30), Some(40), Some(50)]);
    }

    #[test]
    fn test_capacity_accessors() {
        let store: ExperienceStore<i32> = ExperienceStore::unbounded(["S"]).unwrap();
        assert_eq!(store.capacity(), Capacity::Unbounded);
        assert_eq!(store.keys(), &["S".to_string()]);
    }
}

// =============================================================================
// VALIDATION TESTS
// =============================================================================

mod validation_tests {
    use super::*;

    #[test]
    fn test_unequal_columns_rejected() {
        let mut store = ExperienceStore::unbounded(["a", "b"]).unwrap();
        let err = store
            .put(batch(&[("a", vec![1, 2]), ("b", vec![1])]), None)
            .unwrap_err();
        assert!(matches!(err, StoreError::ColumnLengthMismatch { .. }));
        assert!(store.is_empty());
    }

    #[test]
    fn test_missing_key_rejected_on_populated_store() {
        let mut store = ExperienceStore::unbounded(["S", "A"]).unwrap();
        store.put(sa(vec![1], vec![1]), None).unwrap();

        let err = store.put(batch(&[("S", vec![2])]), None).unwrap_err();
        assert_eq!(
            err,
            StoreError::SchemaMismatch {
                expected: vec!["A".to_string(), "S".to_string()],
                actual: vec!["S".to_string()],
            }
        );
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_extra_key_rejected() {
        let mut store = ExperienceStore::unbounded(["S", "A"]).unwrap();
        let err = store
            .put(batch(&[("S", vec![1]), ("A", vec![1]), ("R", vec![1])]), None)
            .unwrap_err();
        assert!(matches!(err, StoreError::SchemaMismatch { .. }));
    }

    #[test]
    fn test_schema_enforced_on_empty_store() {
        let mut store = rolling(3);
        let err = store.put(batch(&[("X", vec![1])]), None).unwrap_err();
        assert!(matches!(err, StoreError::SchemaMismatch { .. }));
    }

    #[test]
    fn test_bounded_store_requires_policy() {
        let config = StoreConfig::new(["S"]).with_capacity(4);
        assert!(matches!(
            ExperienceStore::<i32>::new(config),
            Err(StoreError::InvalidConfig { param: "overwrite_policy", .. })
        ));
    }

    #[test]
    fn test_error_messages() {
        let err = StoreError::CapacityExceeded { added: 6, capacity: 5 };
        assert_eq!(err.to_string(), "Batch of 6 items exceeds store capacity 5");
        let err = StoreError::UnknownKey("Q".to_string());
        assert_eq!(err.to_string(), "Unknown key 'Q'");
    }
}

// =============================================================================
// ROLLING OVERWRITE TESTS
// =============================================================================

mod rolling_tests {
    use super::*;

    #[test]
    fn test_worked_example_capacity_five() {
        let mut store = rolling(5);
        for i in 0..5 {
            let indexes = store.put(sa(vec![i], vec![-i]), None).unwrap();
            assert_eq!(indexes, vec![i as usize]);
        }
        assert_eq!(store.len(), 5);

        let indexes = store.put(sa(vec![50, 51], vec![-50, -51]), None).unwrap();
        assert_eq!(indexes, vec![0, 1]);
        assert_eq!(store.len(), 5);
        assert_eq!(live(&store, "S"), vec![50, 51, 2, 3, 4]);
        assert_eq!(live(&store, "A"), vec![-50, -51, -2, -3, -4]);
    }

    #[test]
    fn test_full_store_restarts_at_zero_each_call() {
        let mut store = rolling(5);
        store.put(sa((0..5).collect(), (0..5).collect()), None).unwrap();

        assert_eq!(store.put(sa(vec![10, 11], vec![0, 0]), None).unwrap(), vec![0, 1]);
        assert_eq!(store.put(sa(vec![20, 21], vec![0, 0]), None).unwrap(), vec![0, 1]);
        assert_eq!(live(&store, "S"), vec![20, 21, 2, 3, 4]);
    }

    #[test]
    fn test_earliest_entries_evicted_after_fill() {
        let mut store = rolling(5);
        store.put(sa((0..5).collect(), (0..5).collect()), None).unwrap();

        let indexes = store.put(sa(vec![10, 11, 12], vec![0, 0, 0]), None).unwrap();
        assert_eq!(indexes, vec![0, 1, 2]);
        assert_eq!(live(&store, "S"), vec![10, 11, 12, 3, 4]);
        assert_eq!(store.len(), 5);
    }

    #[test]
    fn test_overflowing_put_fills_tail_then_wraps() {
        let mut store = rolling(5);
        store.put(sa(vec![0, 1, 2], vec![0, 1, 2]), None).unwrap();

        let indexes = store
            .put(sa(vec![10, 11, 12, 13], vec![0, 0, 0, 0]), None)
            .unwrap();
        assert_eq!(indexes, vec![3, 4, 0, 1]);
        assert_eq!(live(&store, "S"), vec![12, 13, 2, 10, 11]);
        assert_eq!(store.len(), 5);
    }

    #[test]
    fn test_exact_fill_from_empty() {
        let mut store = rolling(4);
        let indexes = store.put(sa(vec![1, 2, 3, 4], vec![1, 2, 3, 4]), None).unwrap();
        assert_eq!(indexes, vec![0, 1, 2, 3]);
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn test_batch_larger_than_capacity_rejected() {
        let mut store = rolling(5);
        let err = store.put(sa(vec![0; 6], vec![0; 6]), None).unwrap_err();
        assert_eq!(err, StoreError::CapacityExceeded { added: 6, capacity: 5 });
        assert!(store.is_empty());
        assert!(store.get_by_key("S").unwrap().iter().all(Option::is_none));
    }

    #[test]
    fn test_free_space_uses_contiguous_range() {
        let mut store = rolling(10);
        assert_eq!(store.put(sa(vec![1, 2], vec![1, 2]), None).unwrap(), vec![0, 1]);
        assert_eq!(store.put(sa(vec![3, 4, 5], vec![3, 4, 5]), None).unwrap(), vec![2, 3, 4]);
        assert_eq!(store.len(), 5);
    }
}

// =============================================================================
// RANDOM OVERWRITE TESTS
// =============================================================================

mod random_tests {
    use super::*;

    #[test]
    fn test_full_store_overwrites_distinct_filled_positions() {
        let mut store = random_seeded(5, 7);
        store.put(sa((0..5).collect(), (0..5).collect()), None).unwrap();

        let indexes = store.put(sa(vec![10, 11, 12], vec![0, 0, 0]), None).unwrap();
        assert_eq!(indexes.len(), 3);
        let unique: HashSet<_> = indexes.iter().copied().collect();
        assert_eq!(unique.len(), 3);
        assert!(indexes.iter().all(|&i| i < 5));
        assert_eq!(store.len(), 5);

        let s = live(&store, "S");
        for (&i, v) in indexes.iter().zip([10, 11, 12]) {
            assert_eq!(s[i], v);
        }
    }

    #[test]
    fn test_partial_overflow_fills_tail_first() {
        let mut store = random_seeded(6, 11);
        store.put(sa(vec![0, 1, 2, 3], vec![0, 1, 2, 3]), None).unwrap();

        let indexes = store
            .put(sa(vec![10, 11, 12, 13], vec![0, 0, 0, 0]), None)
            .unwrap();
        assert_eq!(&indexes[..2], &[4, 5]);
        let victims: HashSet<_> = indexes[2..].iter().copied().collect();
        assert_eq!(victims.len(), 2);
        assert!(victims.iter().all(|&i| i < 4));
        assert_eq!(store.len(), 6);
    }

    #[test]
    fn test_overwrite_count_and_range_hold_across_seeds() {
        for seed in 0..50u64 {
            let capacity = 8;
            let mut store = random_seeded(capacity, seed);
            let first = (seed % 8) as usize + 1;
            store.put(sa(vec![0; first], vec![0; first]), None).unwrap();

            let size_before = store.len();
            let added = (seed % 5) as usize + 4;
            let indexes = store.put(sa(vec![1; added], vec![1; added]), None).unwrap();

            if size_before + added >= capacity {
                let num_overwrites = size_before + added - capacity;
                let tail: Vec<usize> = (size_before..capacity).collect();
                assert_eq!(&indexes[..tail.len()], tail.as_slice());

                let victims: HashSet<_> = indexes[tail.len()..].iter().copied().collect();
                assert_eq!(victims.len(), num_overwrites, "seed {}", seed);
                assert!(victims.iter().all(|&i| i < size_before), "seed {}", seed);
            } else {
                assert_eq!(indexes, (size_before..size_before + added).collect::<Vec<_>>());
            }
        }
    }

    #[test]
    fn test_same_seed_same_victims() {
        let run = || {
            let mut store = random_seeded(5, 42);
            store.put(sa((0..5).collect(), (0..5).collect()), None).unwrap();
            store.put(sa(vec![9, 9], vec![9, 9]), None).unwrap()
        };
        assert_eq!(run(), run());
    }
}

// =============================================================================
// EXPLICIT OVERWRITE TESTS
// =============================================================================

mod explicit_overwrite_tests {
    use super::*;

    #[test]
    fn test_tail_then_caller_victims() {
        let mut store = rolling(5);
        store.put(sa(vec![0, 1, 2, 3], vec![0, 1, 2, 3]), None).unwrap();

        let indexes = store
            .put(sa(vec![20, 21, 22], vec![0, 0, 0]), Some(&[1, 3]))
            .unwrap();
        assert_eq!(indexes, vec![4, 1, 3]);
        assert_eq!(live(&store, "S"), vec![0, 21, 2, 22, 20]);
        assert_eq!(store.len(), 5);
    }

    #[test]
    fn test_caller_victims_ignored_while_space_remains() {
        let mut store = rolling(5);
        let indexes = store.put(sa(vec![1, 2], vec![1, 2]), Some(&[4])).unwrap();
        assert_eq!(indexes, vec![0, 1]);
    }

    #[test]
    fn test_caller_victims_ignored_on_exact_fill() {
        let mut store = rolling(5);
        store.put(sa(vec![0, 1, 2], vec![0, 1, 2]), None).unwrap();

        let indexes = store.put(sa(vec![3, 4], vec![3, 4]), Some(&[4])).unwrap();
        assert_eq!(indexes, vec![3, 4]);
        assert_eq!(store.len(), 5);
        assert_eq!(live(&store, "S"), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_random_store_exact_fill_uses_free_tail() {
        let mut store = random_seeded(4, 3);
        store.put(sa(vec![0], vec![0]), None).unwrap();

        let indexes = store.put(sa(vec![1, 2, 3], vec![1, 2, 3]), None).unwrap();
        assert_eq!(indexes, vec![1, 2, 3]);
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn test_wrong_victim_count_rejected() {
        let mut store = rolling(3);
        store.put(sa(vec![0, 1, 2], vec![0, 1, 2]), None).unwrap();

        let err = store.put(sa(vec![7, 8], vec![7, 8]), Some(&[0])).unwrap_err();
        assert_eq!(err, StoreError::OverwriteCountMismatch { expected: 2, actual: 1 });
        assert_eq!(live(&store, "S"), vec![0, 1, 2]);
    }

    #[test]
    fn test_victim_out_of_range_rejected() {
        let mut store = rolling(3);
        store.put(sa(vec![0, 1, 2], vec![0, 1, 2]), None).unwrap();

        let err = store.put(sa(vec![7], vec![7]), Some(&[3])).unwrap_err();
        assert_eq!(err, StoreError::IndexOutOfBounds { index: 3, len: 3 });
    }
}

// =============================================================================
// UPDATE / READ / LIFECYCLE TESTS
// =============================================================================

mod access_tests {
    use super::*;

    #[test]
    fn test_update_overwrites_in_place() {
        let mut store = ExperienceStore::unbounded(["S", "A"]).unwrap();
        store.put(sa(vec![0, 1, 2, 3], vec![0, 1, 2, 3]), None).unwrap();

        let written = store.update(&[3, 0], sa(vec![30, 0], vec![-3, 0])).unwrap();
        assert_eq!(written, vec![3, 0]);
        assert_eq!(live(&store, "S"), vec![0, 1, 2, 30]);
        assert_eq!(live(&store, "A"), vec![0, 1, 2, -3]);
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn test_update_subset_of_columns() {
        let mut store = ExperienceStore::unbounded(["S", "A"]).unwrap();
        store.put(sa(vec![0, 1], vec![0, 1]), None).unwrap();

        store.update(&[1], batch(&[("A", vec![99])])).unwrap();
        assert_eq!(live(&store, "S"), vec![0, 1]);
        assert_eq!(live(&store, "A"), vec![0, 99]);
    }

    #[test]
    fn test_update_unknown_column_rejected() {
        let mut store = ExperienceStore::unbounded(["S", "A"]).unwrap();
        store.put(sa(vec![0], vec![0]), None).unwrap();
        let err = store.update(&[0], batch(&[("R", vec![1])])).unwrap_err();
        assert!(matches!(err, StoreError::SchemaMismatch { .. }));
    }

    #[test]
    fn test_update_unequal_columns_rejected() {
        let mut store = ExperienceStore::unbounded(["S", "A"]).unwrap();
        store.put(sa(vec![0, 1], vec![0, 1]), None).unwrap();
        let err = store.update(&[0, 1], sa(vec![5, 6], vec![5])).unwrap_err();
        assert!(matches!(err, StoreError::ColumnLengthMismatch { .. }));
        assert_eq!(live(&store, "S"), vec![0, 1]);
    }

    #[test]
    fn test_update_past_size_is_not_checked_in_bounded_store() {
        let mut store = rolling(5);
        store.put(sa(vec![0], vec![0]), None).unwrap();

        store.update(&[4], sa(vec![44], vec![44])).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get_by_key("S").unwrap()[4], Some(44));
    }

    #[test]
    fn test_update_past_physical_length_rejected() {
        let mut store = ExperienceStore::unbounded(["S", "A"]).unwrap();
        store.put(sa(vec![0, 1], vec![0, 1]), None).unwrap();

        let err = store.update(&[0, 2], sa(vec![7, 8], vec![7, 8])).unwrap_err();
        assert_eq!(err, StoreError::IndexOutOfBounds { index: 2, len: 2 });
        assert_eq!(live(&store, "S"), vec![0, 1]);
    }

    #[test]
    fn test_get_without_indexes_includes_empty_slots() {
        let mut store = rolling(4);
        store.put(sa(vec![1, 2], vec![3, 4]), None).unwrap();

        let all = store.get(None).unwrap();
        assert_eq!(all["S"], vec![Some(1), Some(2), None, None]);
        assert_eq!(all["A"], vec![Some(3), Some(4), None, None]);
    }

    #[test]
    fn test_get_with_repeated_and_unordered_indexes() {
        let mut store = ExperienceStore::unbounded(["S", "A"]).unwrap();
        store.put(sa(vec![10, 11, 12], vec![20, 21, 22]), None).unwrap();

        let got = store.get(Some(&[2, 0, 2])).unwrap();
        assert_eq!(got["S"], vec![Some(12), Some(10), Some(12)]);
        assert_eq!(got["A"], vec![Some(22), Some(20), Some(22)]);
    }

    #[test]
    fn test_get_out_of_range_rejected() {
        let store: ExperienceStore<i32> = rolling(3);
        assert_eq!(
            store.get(Some(&[3])).unwrap_err(),
            StoreError::IndexOutOfBounds { index: 3, len: 3 }
        );
    }

    #[test]
    fn test_get_by_unknown_key() {
        let store: ExperienceStore<i32> = rolling(3);
        assert_eq!(
            store.get_by_key("R").unwrap_err(),
            StoreError::UnknownKey("R".to_string())
        );
    }

    #[test]
    fn test_record_spans_columns() {
        let mut store = rolling(3);
        store.put(sa(vec![1, 2], vec![-1, -2]), None).unwrap();

        let record = store.record(1).unwrap();
        assert_eq!(record["S"], Some(2));
        assert_eq!(record["A"], Some(-2));

        let empty = store.record(2).unwrap();
        assert_eq!(empty["S"], None);
        assert!(store.record(3).is_err());
    }

    #[test]
    fn test_dumps_is_independent() {
        let mut store = ExperienceStore::unbounded(["S", "A"]).unwrap();
        store.put(sa(vec![1, 2], vec![3, 4]), None).unwrap();

        let mut copy = store.dumps();
        copy.get_mut("S").unwrap()[0] = Some(100);
        copy.get_mut("A").unwrap().push(Some(5));

        assert_eq!(live(&store, "S"), vec![1, 2]);
        assert_eq!(store.get_by_key("A").unwrap().len(), 2);

        store.put(sa(vec![9], vec![9]), None).unwrap();
        assert_eq!(copy["S"], vec![Some(100), Some(2)]);
    }

    #[test]
    fn test_clear_bounded_keeps_shape() {
        let mut store = rolling(3);
        store.put(sa(vec![1, 2, 3], vec![1, 2, 3]), None).unwrap();
        store.clear();

        assert!(store.is_empty());
        assert_eq!(store.capacity(), Capacity::Bounded(3));
        assert_eq!(store.overwrite_policy(), Some(OverwritePolicy::Rolling));
        let column = store.get_by_key("S").unwrap();
        assert_eq!(column.len(), 3);
        assert!(column.iter().all(Option::is_none));

        assert_eq!(store.put(sa(vec![7], vec![7]), None).unwrap(), vec![0]);
    }

    #[test]
    fn test_clear_unbounded_empties_columns() {
        let mut store = ExperienceStore::unbounded(["S", "A"]).unwrap();
        store.put(sa(vec![1, 2], vec![1, 2]), None).unwrap();
        store.clear();

        assert!(store.is_empty());
        assert!(store.get_by_key("A").unwrap().is_empty());
        assert_eq!(store.put(sa(vec![5], vec![5]), None).unwrap(), vec![0]);
    }
}
