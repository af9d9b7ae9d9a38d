//! Property tests for snapshot invariants
//!
//! Random mutation sequences must keep `ids` and `entities` in bijection,
//! keep `active` inside the collection, and never touch old snapshots.

use herd_storage::{Active, EntityStore, StoreConfig, Target};
use proptest::prelude::*;

use crate::todo::Todo;

#[derive(Clone, Debug)]
enum Op {
    Set(Vec<i64>),
    Add(Vec<i64>),
    Complete(i64),
    CompleteAll,
    Rename(i64),
    Remove(Vec<i64>),
    RemoveCompleted,
    RemoveAll,
    SetActive(Vec<i64>),
    AddActive(Vec<i64>),
    RemoveActive(Vec<i64>),
}

fn ids() -> impl Strategy<Value = Vec<i64>> {
    prop::collection::vec(0_i64..12, 0..6)
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        ids().prop_map(Op::Set),
        ids().prop_map(Op::Add),
        (0_i64..12).prop_map(Op::Complete),
        Just(Op::CompleteAll),
        (0_i64..12).prop_map(Op::Rename),
        ids().prop_map(Op::Remove),
        Just(Op::RemoveCompleted),
        Just(Op::RemoveAll),
        ids().prop_map(Op::SetActive),
        ids().prop_map(Op::AddActive),
        ids().prop_map(Op::RemoveActive),
    ]
}

fn todos(ids: &[i64]) -> Vec<Todo> {
    ids.iter().map(|&id| Todo::new(id, "t")).collect()
}

fn apply(store: &EntityStore<Todo>, op: &Op) {
    match op {
        Op::Set(ids) => {
            store.set(todos(ids));
        }
        Op::Add(ids) => {
            store.add(todos(ids));
        }
        Op::Complete(id) => {
            store.update(*id, |t| t.completed = true);
        }
        Op::CompleteAll => {
            store.update(Target::All, |t| t.completed = true);
        }
        Op::Rename(id) => {
            store.update(*id, |t| t.title.push('!'));
        }
        Op::Remove(ids) => {
            store.remove(ids.clone());
        }
        Op::RemoveCompleted => {
            store.remove(Target::matching(|t: &Todo| t.completed));
        }
        Op::RemoveAll => {
            store.remove_all();
        }
        Op::SetActive(ids) => {
            store.set_active(Active::from(ids.clone()));
        }
        Op::AddActive(ids) => {
            store.add_active(ids.clone());
        }
        Op::RemoveActive(ids) => {
            store.remove_active(ids.clone());
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn mutations_preserve_bijection(ops in prop::collection::vec(op(), 0..40)) {
        let store = EntityStore::new(StoreConfig::default());
        for op in &ops {
            apply(&store, op);
            let state = store.value();
            prop_assert!(state.is_consistent(), "inconsistent after {:?}: {:?}", op, state);
        }
    }

    #[test]
    fn snapshots_are_immutable(ops in prop::collection::vec(op(), 1..20)) {
        let store = EntityStore::new(StoreConfig::default());
        let mut history = vec![(store.value(), format!("{:?}", store.value()))];
        for op in &ops {
            apply(&store, op);
            history.push((store.value(), format!("{:?}", store.value())));
        }
        for (snapshot, rendered) in &history {
            prop_assert_eq!(&format!("{snapshot:?}"), rendered);
        }
    }

    #[test]
    fn set_keeps_first_positions(ids in prop::collection::vec(0_i64..8, 0..16)) {
        let store = EntityStore::new(StoreConfig::default());
        store.set(todos(&ids));

        let mut expected: Vec<i64> = Vec::new();
        for id in &ids {
            if !expected.contains(id) {
                expected.push(*id);
            }
        }
        let actual: Vec<i64> = store.value().iter().map(|t| t.id).collect();
        prop_assert_eq!(actual, expected);
    }
}
