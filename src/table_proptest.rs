#![cfg(test)]

// Property tests for Table kept inside the crate next to the unit tests so
// they can use test-only hashers.

use crate::config::TableConfig;
use crate::table::Table;
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::collections::{BTreeSet, HashMap};
use std::hash::{BuildHasher, BuildHasherDefault, Hasher};

#[derive(Clone, Debug)]
enum Op {
    Set(usize, i32),
    Delete(usize),
    Get(usize),
    GetStr(String),
    Iterate,
    IterateStopAfter(usize),
}

fn arb_config() -> impl Strategy<Value = TableConfig> {
    (1usize..=8, 0.1f64..0.95, 2usize..=4).prop_map(|(cap, lf, grow)| {
        TableConfig::new()
            .with_initial_capacity(cap)
            .with_max_load_factor(lf)
            .with_grow_factor(grow)
    })
}

// Pool-indexed operations so that shrinking moves toward earlier keys and
// shorter op lists.
fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<Op>)> {
    proptest::collection::vec("[a-z]{0,4}", 1..=12).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let op = prop_oneof![
            3 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::Set(i, v)),
            2 => idx.clone().prop_map(Op::Delete),
            1 => idx.clone().prop_map(Op::Get),
            1 => "[a-z]{0,4}".prop_map(Op::GetStr),
            1 => Just(Op::Iterate),
            1 => (0usize..6).prop_map(Op::IterateStopAfter),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Invariants checked after every op against std::collections::HashMap:
// - `set` returns the previous value, `delete` reports presence.
// - `get` (owned and borrowed) agrees with the model.
// - `iterate` visits exactly the model's entries, once each; stopping after
//   n calls makes it return false with exactly n calls when n < len.
// - `len` parity and `len / capacity <= max_load_factor`.
fn run_scenario<S: BuildHasher>(
    mut sut: Table<String, i32, S>,
    max_load_factor: f64,
    pool: &[String],
    ops: Vec<Op>,
) -> Result<(), TestCaseError> {
    let mut model: HashMap<String, i32> = HashMap::new();
    for op in ops {
        match op {
            Op::Set(i, v) => {
                let k = pool[i].clone();
                let prev = sut.set(k.clone(), v);
                prop_assert_eq!(prev, model.insert(k, v));
            }
            Op::Delete(i) => {
                let k = &pool[i];
                prop_assert_eq!(sut.delete(k), model.remove(k).is_some());
            }
            Op::Get(i) => {
                let k = &pool[i];
                prop_assert_eq!(sut.get(k), model.get(k));
            }
            Op::GetStr(s) => {
                prop_assert_eq!(sut.get(s.as_str()), model.get(s.as_str()));
            }
            Op::Iterate => {
                let mut seen = Vec::new();
                let completed = sut.iterate(|k, v| {
                    seen.push((k.clone(), *v));
                    true
                });
                prop_assert!(completed);
                prop_assert_eq!(seen.len(), model.len());
                let seen: BTreeSet<_> = seen.into_iter().collect();
                let expected: BTreeSet<_> = model.iter().map(|(k, v)| (k.clone(), *v)).collect();
                prop_assert_eq!(seen, expected);
            }
            Op::IterateStopAfter(n) => {
                let mut calls = 0;
                let completed = sut.iterate(|_, _| {
                    calls += 1;
                    calls < n
                });
                if n == 0 {
                    // The first call already stops.
                    prop_assert_eq!(completed, model.is_empty());
                    prop_assert_eq!(calls, usize::from(!model.is_empty()));
                } else if n <= model.len() {
                    prop_assert!(!completed);
                    prop_assert_eq!(calls, n);
                } else {
                    prop_assert!(completed);
                    prop_assert_eq!(calls, model.len());
                }
            }
        }
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        prop_assert!(sut.load_factor() <= max_load_factor);
        prop_assert_eq!(sut.iter().count(), model.len());
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine(config in arb_config(), (pool, ops) in arb_scenario()) {
        let sut: Table<String, i32> = Table::with_config(config).unwrap();
        run_scenario(sut, config.max_load_factor(), &pool, ops)?;
    }
}

// Collision variant: only three distinct hash values, so nearly every
// insert lands in a long cluster and deletes exercise backward shifting.
#[derive(Default)]
struct LowEntropyHasher(u64);

impl Hasher for LowEntropyHasher {
    fn write(&mut self, bytes: &[u8]) {
        for b in bytes {
            self.0 = self.0.wrapping_add(u64::from(*b));
        }
    }
    fn finish(&self) -> u64 {
        self.0 % 3
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions(config in arb_config(), (pool, ops) in arb_scenario()) {
        let sut: Table<String, i32, BuildHasherDefault<LowEntropyHasher>> =
            Table::with_config_and_hasher(config, BuildHasherDefault::default()).unwrap();
        run_scenario(sut, config.max_load_factor(), &pool, ops)?;
    }
}
