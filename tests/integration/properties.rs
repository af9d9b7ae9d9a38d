//! Cross-layer property tests
//!
//! Random mutation sequences checked against the query layer's guarantees.

use std::cell::RefCell;
use std::rc::Rc;

use herd::foundation::{Entity, EntityId};
use herd::query::{QueryEntity, SelectOptions};
use herd::storage::{EntityStore, StoreConfig, Target};
use proptest::prelude::*;

#[derive(Clone, Debug, PartialEq)]
struct Item {
    id: i64,
    weight: i64,
}

impl Entity for Item {
    fn id(&self) -> EntityId {
        EntityId::from(self.id)
    }
}

#[derive(Clone, Debug)]
enum Op {
    Set(Vec<(i64, i64)>),
    Add(i64, i64),
    Bump(i64),
    Touch(i64),
    Remove(i64),
    Reset,
    Flag(bool),
}

fn op() -> impl Strategy<Value = Op> {
    let pair = (0_i64..8, 0_i64..4);
    prop_oneof![
        prop::collection::vec(pair.clone(), 0..6).prop_map(Op::Set),
        pair.prop_map(|(id, weight)| Op::Add(id, weight)),
        (0_i64..8).prop_map(Op::Bump),
        (0_i64..8).prop_map(Op::Touch),
        (0_i64..8).prop_map(Op::Remove),
        Just(Op::Reset),
        any::<bool>().prop_map(Op::Flag),
    ]
}

fn apply(store: &EntityStore<Item>, op: &Op) {
    match op {
        Op::Set(pairs) => {
            store.set(pairs.iter().map(|&(id, weight)| Item { id, weight }));
        }
        Op::Add(id, weight) => {
            store.add(Item { id: *id, weight: *weight });
        }
        Op::Bump(id) => {
            store.update(*id, |item| item.weight += 1);
        }
        Op::Touch(id) => {
            // Rewrites a field with its own value.
            store.update(*id, |item| item.weight = item.weight.abs());
        }
        Op::Remove(id) => {
            store.remove(*id);
        }
        Op::Reset => {
            store.remove(Target::All);
        }
        Op::Flag(loading) => {
            store.set_loading(*loading);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn select_all_emits_once_per_value_change(ops in prop::collection::vec(op(), 0..30)) {
        let store = EntityStore::new(StoreConfig::default());
        let query = QueryEntity::new(&store);
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = log.clone();
        let _sub = query
            .select_all(&SelectOptions::new())
            .subscribe(move |items: &Vec<Item>| sink.borrow_mut().push(items.clone()));

        let mut expected = vec![query.get_all(&SelectOptions::new())];
        for op in &ops {
            apply(&store, op);
            let now = query.get_all(&SelectOptions::new());
            if expected.last() != Some(&now) {
                expected.push(now);
            }
        }

        prop_assert_eq!(&*log.borrow(), &expected);
    }

    #[test]
    fn as_object_reordered_by_ids_equals_get_all(ops in prop::collection::vec(op(), 0..30)) {
        let store = EntityStore::new(StoreConfig::default());
        for op in &ops {
            apply(&store, op);
        }
        let query = QueryEntity::new(&store);
        let options = SelectOptions::new();

        let keyed = query.get_all_as_object(&options);
        let snapshot = query.get_snapshot();
        let reordered: Vec<Item> = snapshot
            .ids()
            .iter()
            .filter_map(|id| keyed.get(id).cloned())
            .collect();

        prop_assert_eq!(keyed.len(), snapshot.len());
        prop_assert_eq!(reordered, query.get_all(&options));
        prop_assert!(snapshot.is_consistent());
    }

    #[test]
    fn count_where_matches_getter(ops in prop::collection::vec(op(), 0..30)) {
        let store = EntityStore::new(StoreConfig::default());
        let query = QueryEntity::new(&store);
        let last = Rc::new(RefCell::new(None));
        let sink = last.clone();
        let _sub = query
            .select_count_where(|item: &Item| item.weight > 1)
            .subscribe(move |n: &usize| *sink.borrow_mut() = Some(*n));

        for op in &ops {
            apply(&store, op);
            prop_assert_eq!(*last.borrow(), Some(query.get_count_where(|item| item.weight > 1)));
        }
    }
}
