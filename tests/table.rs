// Table integration tests.
//
// Core invariants exercised:
// - Round trip: set then get returns the last value; delete makes it absent.
// - Delete reports presence exactly once.
// - Growth keeps membership and the load factor bound.
// - Iteration visits each live entry once; stopping after k calls makes
//   iterate return false with exactly k handler calls.
use shard_map::{ConfigError, Storage, Table, TableConfig, MIN_MAX_LOAD_FACTOR};
use std::collections::BTreeMap;

#[test]
fn time_zone_offsets() {
    let mut zones: Table<String, i32> = Table::new();
    zones.set("EST".to_string(), -18000);
    zones.set("CST".to_string(), -21600);
    zones.set("MST".to_string(), -25200);
    assert_eq!(zones.get("EST"), Some(&-18000));
    assert_eq!(zones.get("CST"), Some(&-21600));
    assert_eq!(zones.get("MST"), Some(&-25200));
    assert_eq!(zones.get("PST"), None);
}

// Test: set, overwrite, delete sequence on a single key.
// Verifies: each step is observed by the next lookup.
#[test]
fn set_overwrite_delete_round_trip() {
    let mut m: Table<&str, &str> = Table::new();
    m.set("k", "v1");
    assert_eq!(m.get("k"), Some(&"v1"));
    m.set("k", "v2");
    assert_eq!(m.get("k"), Some(&"v2"));
    assert_eq!(m.len(), 1);
    assert!(m.delete("k"));
    assert_eq!(m.get("k"), None);
    assert!(!m.delete("k"));
    assert!(!m.delete("never-inserted"));
}

#[test]
fn constructor_rejects_invalid_configs() {
    let cases = [
        (TableConfig::new().with_initial_capacity(0), ConfigError::ZeroCapacity),
        (
            TableConfig::new().with_max_load_factor(1.0),
            ConfigError::InvalidLoadFactor(1.0),
        ),
        (
            TableConfig::new().with_max_load_factor(1e-12),
            ConfigError::InvalidLoadFactor(1e-12),
        ),
        (
            TableConfig::new().with_grow_factor(1),
            ConfigError::InvalidGrowFactor(1),
        ),
    ];
    for (config, want) in cases {
        match Table::<u32, u32>::with_config(config) {
            Err(e) => assert_eq!(e, want),
            Ok(_) => panic!("expected {:?} to be rejected", config),
        }
    }
}

// Test: the smallest accepted load factor with a one-slot start.
// Verifies: inserts grow to a bounded capacity rather than running away.
#[test]
fn smallest_load_factor_keeps_capacity_bounded() {
    let config = TableConfig::new()
        .with_initial_capacity(1)
        .with_max_load_factor(MIN_MAX_LOAD_FACTOR);
    let mut m: Table<u32, u32> = Table::with_config(config).unwrap();
    for i in 0..10 {
        m.set(i, i);
    }
    assert!(m.load_factor() <= MIN_MAX_LOAD_FACTOR);
    assert!(m.capacity() <= 2048, "capacity {}", m.capacity());
    assert_eq!(m.get(&9), Some(&9));
}

#[test]
fn error_messages_name_the_parameter() {
    assert_eq!(
        ConfigError::ZeroCapacity.to_string(),
        "initial capacity must be positive"
    );
    assert!(ConfigError::InvalidLoadFactor(1.5)
        .to_string()
        .contains("1.5"));
}

// Test: many inserts through several grow events with a tiny initial size.
// Verifies: every key keeps its last value; capacity only grows.
#[test]
fn growth_keeps_every_key() {
    let mut m: Table<String, usize> =
        Table::with_config(TableConfig::new().with_initial_capacity(1)).unwrap();
    let mut last_capacity = m.capacity();
    for i in 0..5_000 {
        m.set(format!("key-{i}"), i);
        assert!(m.capacity() >= last_capacity);
        assert!(m.load_factor() <= 0.75);
        last_capacity = m.capacity();
    }
    for i in 0..5_000 {
        assert_eq!(m.get(format!("key-{i}").as_str()), Some(&i));
    }
    assert_eq!(m.len(), 5_000);
}

#[test]
fn table_never_shrinks() {
    let mut m: Table<u32, u32> = Table::new();
    for i in 0..100 {
        m.set(i, i);
    }
    let grown = m.capacity();
    for i in 0..100 {
        assert!(m.delete(&i));
    }
    assert!(m.is_empty());
    assert_eq!(m.capacity(), grown);
}

// Test: deletes interleaved with inserts in a mostly full table.
// Verifies: nothing becomes unreachable after deletions inside clusters.
#[test]
fn interleaved_deletes_keep_lookups_exact() {
    let mut m: Table<u32, u32> = Table::with_config(
        TableConfig::new()
            .with_initial_capacity(64)
            .with_max_load_factor(0.9),
    )
    .unwrap();
    let mut model = BTreeMap::new();
    for round in 0..20u32 {
        for i in 0..50 {
            let k = (i * 7 + round * 13) % 97;
            m.set(k, round);
            model.insert(k, round);
        }
        for i in 0..25 {
            let k = (i * 11 + round) % 97;
            assert_eq!(m.delete(&k), model.remove(&k).is_some());
        }
        for k in 0..97 {
            assert_eq!(m.get(&k), model.get(&k));
        }
    }
}

#[test]
fn iterate_full_and_interrupted() {
    let mut m: Table<u32, String> = Table::new();
    for i in 0..30 {
        m.set(i, i.to_string());
    }
    let mut seen = BTreeMap::new();
    assert!(m.iterate(|k, v| {
        assert!(seen.insert(*k, v.clone()).is_none(), "visited twice: {k}");
        true
    }));
    assert_eq!(seen.len(), 30);

    for k in 1..=30 {
        let mut calls = 0;
        let completed = m.iterate(|_, _| {
            calls += 1;
            calls != k
        });
        assert!(!completed);
        assert_eq!(calls, k);
    }
}

// Test: the randomized order is not fixed.
// Verifies: over many runs the first visited key varies.
#[test]
fn iteration_order_varies() {
    let mut m: Table<u32, ()> = Table::new();
    for i in 0..10 {
        m.set(i, ());
    }
    let mut firsts = std::collections::BTreeSet::new();
    for _ in 0..200 {
        m.iterate(|k, _| {
            firsts.insert(*k);
            false
        });
    }
    assert!(firsts.len() > 1, "first key never changed: {firsts:?}");
}

#[test]
fn usable_through_storage_trait() {
    fn fill<S: Storage<u32, u32>>(s: &mut S) {
        for i in 0..20 {
            s.set(i, i * 3);
        }
    }
    let mut m: Table<u32, u32> = Table::new();
    fill(&mut m);
    assert_eq!(Storage::len(&m), 20);
    assert_eq!(Storage::get(&m, &7), Some(&21));
    let mut count = 0;
    for position in Storage::shuffled_positions(&m) {
        if Storage::entry_at(&m, position).is_some() {
            count += 1;
        }
    }
    assert_eq!(count, 20);
}
