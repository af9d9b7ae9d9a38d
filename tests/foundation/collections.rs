//! Integration tests for ids and persistent collections
//!
//! Tests EntityId conversions, structural sharing, and ordered maps.

use herd_foundation::equality::{collections_equal, slices_equal};
use herd_foundation::{Distinct, EntityId, EntityTable, IdList, OrderedMap};
use proptest::prelude::*;

// =============================================================================
// EntityId
// =============================================================================

#[test]
fn ids_from_integers_and_strings() {
    assert_eq!(EntityId::from(7_u8), EntityId::Int(7));
    assert_eq!(EntityId::try_from(7_usize).unwrap(), EntityId::from(7_i64));
    assert_eq!(EntityId::from("a"), EntityId::from(String::from("a")));
    assert_eq!(EntityId::from("a").as_str(), Some("a"));
    assert_eq!(EntityId::from(3).as_int(), Some(3));
}

#[test]
fn wide_unsigned_ids_are_checked() {
    assert!(EntityId::try_from(u64::MAX).is_err());
    assert_eq!(EntityId::try_from(42_u64).unwrap(), EntityId::Int(42));
}

#[test]
fn id_display_and_debug() {
    assert_eq!(EntityId::from(42).to_string(), "42");
    assert_eq!(EntityId::from("x").to_string(), "x");
    assert_eq!(format!("{:?}", EntityId::from(42)), "EntityId(42)");
}

#[test]
fn integer_ids_order_before_strings() {
    let mut ids = vec![EntityId::from("b"), EntityId::from(2), EntityId::from("a"), EntityId::from(1)];
    ids.sort();
    assert_eq!(
        ids,
        vec![EntityId::from(1), EntityId::from(2), EntityId::from("a"), EntityId::from("b")]
    );
}

// =============================================================================
// Structural Sharing
// =============================================================================

#[test]
fn clones_share_storage() {
    let ids: IdList = (0..100).map(EntityId::from).collect();
    let table: EntityTable<i32> = (0..100).map(|n| (EntityId::from(n), n)).collect();

    let (ids2, table2) = (ids.clone(), table.clone());
    assert!(ids.ptr_eq(&ids2));
    assert!(table.ptr_eq(&table2));
    assert!(collections_equal((&ids, &table), (&ids2, &table2)));
}

#[test]
fn equal_contents_without_sharing() {
    let a: EntityTable<&str> = vec![(EntityId::from(1), "x")].into_iter().collect();
    let b = EntityTable::new().insert(EntityId::from(1), "x");
    let ids: IdList = std::iter::once(EntityId::from(1)).collect();

    assert!(!a.ptr_eq(&b));
    assert!(collections_equal((&ids, &a), (&ids.clone(), &b)));
    assert!(!collections_equal((&ids, &a), (&IdList::new(), &b)));
}

#[test]
fn slices_compare_item_by_item() {
    assert!(slices_equal(&[1, 2], &[1, 2]));
    assert!(!slices_equal(&[1, 2], &[2, 1]));
    assert!(!slices_equal(&[1], &[1, 1]));
}

#[test]
fn distinct_marker_tracks_last_value() {
    let mut marker = Distinct::new();
    assert!(marker.changed(&1));
    assert!(!marker.changed(&1));
    assert!(marker.changed(&2));
    assert_eq!(marker.last(), Some(&2));

    marker.reset();
    assert!(marker.changed(&2));
}

#[test]
fn ordered_map_overwrite_keeps_position() {
    let mut map = OrderedMap::new();
    map.insert(EntityId::from(2), "b");
    map.insert(EntityId::from(1), "a");
    map.insert(EntityId::from(2), "B");

    assert_eq!(map.to_vec(), vec!["B", "a"]);
    assert_eq!(map.get(&EntityId::from(2)), Some(&"B"));
    assert!(map.contains_key(&EntityId::from(1)));
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn ordered_map_preserves_first_insertion_order(keys in prop::collection::vec(0_i64..20, 0..40)) {
        let map: OrderedMap<i64> = keys.iter().map(|&k| (EntityId::from(k), k)).collect();

        let mut expected: Vec<i64> = Vec::new();
        for k in &keys {
            if !expected.contains(k) {
                expected.push(*k);
            }
        }
        let actual: Vec<i64> = map.keys().filter_map(EntityId::as_int).collect();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn id_list_retain_is_a_subsequence(ns in prop::collection::vec(0_i64..100, 0..50)) {
        let list: IdList = ns.iter().copied().map(EntityId::from).collect();
        let kept = list.retain(|id| id.as_int().is_some_and(|n| n % 2 == 0));

        let expected: Vec<EntityId> = ns.iter().filter(|n| *n % 2 == 0).copied().map(EntityId::from).collect();
        prop_assert_eq!(kept.iter().cloned().collect::<Vec<_>>(), expected);
        prop_assert_eq!(list.len(), ns.len());
    }
}
