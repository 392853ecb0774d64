use std::collections::BTreeMap;

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rank_avl::{AvlForest, AvlTree, Error, Key};

/// The number of operations to perform in each proptest case.
const TEST_SIZE: usize = 2_000;

/// Keys from a narrow range so that inserts collide and deletes hit.
fn key_strategy() -> impl Strategy<Value = Key> {
    0i64..1_500i64
}

fn build(forest: &mut AvlForest<String>, keys: impl IntoIterator<Item = Key>) -> AvlTree {
    let mut tree = forest.new_tree();
    for key in keys {
        forest.insert(&mut tree, key, key.to_string()).unwrap();
    }
    tree
}

/// Checks what the public surface can see of a tree's shape: ascending keys,
/// a size matching them, and a rank no larger than an AVL tree of that size
/// allows (a tree of rank h holds at least F(h + 3) - 1 keys).
fn assert_well_formed<V>(forest: &AvlForest<V>, tree: &AvlTree) -> Vec<Key> {
    let keys = forest.keys_to_vec(tree);
    assert!(keys.windows(2).all(|pair| pair[0] < pair[1]), "keys out of order: {keys:?}");
    assert_eq!(forest.size(tree), keys.len());

    let rank = forest.rank(tree);
    let (mut a, mut b) = (0usize, 1usize);
    for _ in 0..rank + 3 {
        (a, b) = (b, a + b);
    }
    assert!(keys.len() + 1 >= a, "rank {rank} too large for {} keys", keys.len());
    keys
}

// ─── Operations enum for driving randomized tests ────────────────────────────

#[derive(Debug, Clone)]
enum TreeOp {
    Insert(Key),
    Delete(Key),
    Search(Key),
    Min,
    Max,
}

fn tree_op_strategy() -> impl Strategy<Value = TreeOp> {
    prop_oneof![
        5 => key_strategy().prop_map(TreeOp::Insert),
        3 => key_strategy().prop_map(TreeOp::Delete),
        2 => key_strategy().prop_map(TreeOp::Search),
        1 => Just(TreeOp::Min),
        1 => Just(TreeOp::Max),
    ]
}

// ─── Core operations against BTreeMap ────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    /// Replays a random sequence of operations on a tree and a `BTreeMap` and
    /// asserts identical results at every step.
    #[test]
    fn tree_ops_match_btreemap(ops in proptest::collection::vec(tree_op_strategy(), TEST_SIZE)) {
        let mut forest = AvlForest::new();
        let mut tree = forest.new_tree();
        let mut model: BTreeMap<Key, String> = BTreeMap::new();

        for op in ops {
            match op {
                TreeOp::Insert(key) => {
                    let result = forest.insert(&mut tree, key, key.to_string());
                    if model.contains_key(&key) {
                        prop_assert_eq!(result, Err(Error::KeyExists(key)));
                    } else {
                        prop_assert!(result.is_ok());
                        model.insert(key, key.to_string());
                    }
                }
                TreeOp::Delete(key) => {
                    let result = forest.delete(&mut tree, key);
                    match model.remove(&key) {
                        Some(_) => prop_assert!(result.is_ok()),
                        None => prop_assert_eq!(result, Err(Error::KeyNotFound(key))),
                    }
                }
                TreeOp::Search(key) => {
                    prop_assert_eq!(forest.search(&tree, key), model.get(&key));
                    prop_assert_eq!(forest.contains_key(&tree, key), model.contains_key(&key));
                }
                TreeOp::Min => prop_assert_eq!(forest.min(&tree), model.values().next()),
                TreeOp::Max => prop_assert_eq!(forest.max(&tree), model.values().next_back()),
            }
            prop_assert_eq!(forest.size(&tree), model.len());
        }

        let keys = assert_well_formed(&forest, &tree);
        prop_assert_eq!(keys, model.keys().copied().collect::<Vec<_>>());
        prop_assert_eq!(forest.values_to_vec(&tree), model.values().collect::<Vec<_>>());
        prop_assert_eq!(forest.len(), model.len());
    }

    /// Inserting a fresh key and deleting it again leaves the same content.
    #[test]
    fn insert_delete_round_trip(keys in proptest::collection::btree_set(key_strategy(), 0..300), extra in 1_500i64..2_000) {
        let mut forest = AvlForest::new();
        let mut tree = build(&mut forest, keys.iter().copied());
        let before = forest.keys_to_vec(&tree);
        let values_before: Vec<String> = forest.values_to_vec(&tree).into_iter().cloned().collect();

        forest.insert(&mut tree, extra, String::new()).unwrap();
        forest.delete(&mut tree, extra).unwrap();

        prop_assert_eq!(assert_well_formed(&forest, &tree), before);
        prop_assert_eq!(forest.values_to_vec(&tree).into_iter().cloned().collect::<Vec<_>>(), values_before);
    }

    /// Duplicate inserts report the key and leave the tree untouched.
    #[test]
    fn duplicate_insert_is_rejected(keys in proptest::collection::btree_set(key_strategy(), 1..300), which in any::<prop::sample::Index>()) {
        let keys: Vec<Key> = keys.into_iter().collect();
        let mut forest = AvlForest::new();
        let mut tree = build(&mut forest, keys.iter().copied());
        let duplicate = keys[which.index(keys.len())];
        let root = forest.root_key(&tree);

        prop_assert_eq!(forest.insert(&mut tree, duplicate, "other".to_string()), Err(Error::KeyExists(duplicate)));
        prop_assert_eq!(forest.size(&tree), keys.len());
        prop_assert_eq!(forest.root_key(&tree), root);
        prop_assert_eq!(forest.keys_to_vec(&tree), keys);
        prop_assert_eq!(forest.search(&tree, duplicate).cloned(), Some(duplicate.to_string()));
    }
}

// ─── Split and join against BTreeMap ─────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    #[test]
    fn split_matches_btreemap_split_off(keys in proptest::collection::btree_set(key_strategy(), 1..600), which in any::<prop::sample::Index>()) {
        let keys: Vec<Key> = keys.into_iter().collect();
        let pivot = keys[which.index(keys.len())];
        let mut forest = AvlForest::new();
        let tree = build(&mut forest, keys.iter().copied());

        let mut low_model: BTreeMap<Key, String> = keys.iter().map(|&k| (k, k.to_string())).collect();
        let mut high_model = low_model.split_off(&pivot);
        high_model.remove(&pivot);

        let (low, high) = forest.split(tree, pivot);
        prop_assert_eq!(assert_well_formed(&forest, &low), low_model.keys().copied().collect::<Vec<_>>());
        prop_assert_eq!(assert_well_formed(&forest, &high), high_model.keys().copied().collect::<Vec<_>>());
        prop_assert_eq!(forest.len(), keys.len() - 1);
    }

    #[test]
    fn join_then_split_restores_both_sides(
        low in proptest::collection::btree_set(0i64..700, 0..300),
        high in proptest::collection::btree_set(701i64..1_500, 0..300),
        low_is_this in any::<bool>(),
    ) {
        let mut forest = AvlForest::new();
        let low_tree = build(&mut forest, low.iter().copied());
        let high_tree = build(&mut forest, high.iter().copied());
        let (low_rank, high_rank) = (forest.rank(&low_tree), forest.rank(&high_tree));

        let (mut this, other) = if low_is_this { (low_tree, high_tree) } else { (high_tree, low_tree) };
        let cost = forest.join(&mut this, 700, "700".to_string(), other);
        prop_assert_eq!(cost, low_rank.abs_diff(high_rank) as usize + 1);

        let expected: Vec<Key> = low.iter().copied().chain([700]).chain(high.iter().copied()).collect();
        prop_assert_eq!(assert_well_formed(&forest, &this), expected);

        let (low_again, high_again) = forest.split(this, 700);
        prop_assert_eq!(forest.keys_to_vec(&low_again), low.into_iter().collect::<Vec<_>>());
        prop_assert_eq!(forest.keys_to_vec(&high_again), high.into_iter().collect::<Vec<_>>());
    }
}

// ─── Scenarios ───────────────────────────────────────────────────────────────

#[test]
fn small_tree_min_max_and_order() {
    let mut forest = AvlForest::new();
    let tree = build(&mut forest, [8, 4, 9, 3, 10, 11, 13]);

    assert_eq!(forest.min(&tree).map(String::as_str), Some("3"));
    assert_eq!(forest.max(&tree).map(String::as_str), Some("13"));
    assert_eq!(forest.size(&tree), 7);
    assert_eq!(assert_well_formed(&forest, &tree), [3, 4, 8, 9, 10, 11, 13]);
}

#[test]
fn round_trip_may_move_the_root() {
    let mut forest = AvlForest::new();
    let mut tree = build(&mut forest, [1, 2]);
    assert_eq!(forest.root_key(&tree), Some(1));

    // Inserting 3 rotates 2 to the root; deleting 3 leaves it there.
    forest.insert(&mut tree, 3, "3".to_string()).unwrap();
    forest.delete(&mut tree, 3).unwrap();
    assert_eq!(forest.root_key(&tree), Some(2));
    assert_eq!(assert_well_formed(&forest, &tree), [1, 2]);
}

#[test]
fn split_thousand_keys_at_786() {
    let mut forest = AvlForest::new();
    let tree = build(&mut forest, 0..1000);

    let (low, high) = forest.split(tree, 786);
    assert_eq!(forest.size(&low), 786);
    assert_eq!(forest.size(&high), 213);
    assert_eq!(assert_well_formed(&forest, &low), (0..786).collect::<Vec<_>>());
    assert_eq!(assert_well_formed(&forest, &high), (787..1000).collect::<Vec<_>>());
}

#[test]
fn empty_tree_reports_absence() {
    let mut forest: AvlForest<String> = AvlForest::new();
    let mut tree = forest.new_tree();

    assert_eq!(forest.delete(&mut tree, 1), Err(Error::KeyNotFound(1)));
    assert_eq!(forest.min(&tree), None);
    assert_eq!(forest.max(&tree), None);
    assert_eq!(forest.size(&tree), 0);
    assert_eq!(forest.rank(&tree), -1);
    assert_eq!(forest.root_key(&tree), None);
    assert!(forest.keys_to_vec(&tree).is_empty());
    assert!(forest.values_to_vec(&tree).is_empty());
}

#[test]
fn negative_key_is_rejected() {
    let mut forest = AvlForest::new();
    let mut tree = forest.new_tree();
    assert_eq!(forest.insert(&mut tree, -5, ()), Err(Error::NegativeKey(-5)));
    assert!(tree.is_empty());
    assert_eq!(Error::NegativeKey(-5).to_string(), "key -5 is negative");
}

#[test]
fn split_two_key_tree() {
    let mut forest = AvlForest::new();
    let tree = build(&mut forest, [1, 2]);

    let (low, high) = forest.split(tree, 2);
    assert_eq!(forest.keys_to_vec(&low), [1]);
    assert!(high.is_empty());

    let (low, high) = forest.split(low, 1);
    assert!(low.is_empty() && high.is_empty());
    assert!(forest.is_empty());
}

#[test]
fn join_ninety_and_hundred_keys_through_hundred() {
    let mut forest = AvlForest::new();
    let mut low = build(&mut forest, 0..90);
    let high = build(&mut forest, 101..201);
    let expected_cost = forest.rank(&low).abs_diff(forest.rank(&high)) as usize + 1;

    assert_eq!(forest.join(&mut low, 100, "100".to_string(), high), expected_cost);
    assert_eq!(forest.size(&low), 191);
    let expected: Vec<Key> = (0..90).chain([100]).chain(101..201).collect();
    assert_eq!(assert_well_formed(&forest, &low), expected);
    assert_eq!(forest.search(&low, 100).map(String::as_str), Some("100"));
}

#[test]
fn join_with_empty_sides() {
    let mut forest = AvlForest::new();

    let mut both_empty = forest.new_tree();
    let empty = forest.new_tree();
    assert_eq!(forest.join(&mut both_empty, 5, "5".to_string(), empty), 1);
    assert_eq!(forest.keys_to_vec(&both_empty), [5]);
    assert_eq!(forest.rank(&both_empty), 0);

    let mut this_empty = forest.new_tree();
    let other = build(&mut forest, [10, 20, 30]);
    // Rank -1 against rank 1.
    assert_eq!(forest.join(&mut this_empty, 40, "40".to_string(), other), 3);
    assert_eq!(assert_well_formed(&forest, &this_empty), [10, 20, 30, 40]);

    let empty = forest.new_tree();
    let expected_cost = forest.rank(&this_empty).abs_diff(-1) as usize + 1;
    assert_eq!(forest.join(&mut this_empty, 0, "0".to_string(), empty), expected_cost);
    assert_eq!(assert_well_formed(&forest, &this_empty), [0, 10, 20, 30, 40]);
}

#[test]
fn trees_share_one_forest() {
    let mut forest = AvlForest::with_capacity(64);
    let evens = build(&mut forest, (0..20).map(|k| k * 2));
    let odds = build(&mut forest, (0..20).map(|k| k * 2 + 1));
    assert_eq!(forest.len(), 40);

    assert_eq!(forest.get_by_index(&evens, 3).map(|(k, _)| k), Some(6));
    assert_eq!(forest.index_of(&odds, 7), Some(3));

    assert_eq!(forest.release(evens), 20);
    assert_eq!(forest.len(), 20);
    assert_eq!(assert_well_formed(&forest, &odds).len(), 20);
}

#[test]
fn iter_visits_entries_in_order() {
    let mut forest = AvlForest::new();
    let tree = build(&mut forest, [5, 2, 8, 1]);
    let entries: Vec<(Key, &str)> = forest.iter(&tree).map(|(k, v)| (k, v.as_str())).collect();
    assert_eq!(entries, [(1, "1"), (2, "2"), (5, "5"), (8, "8")]);
}

// ─── Precondition panics ─────────────────────────────────────────────────────

#[test]
#[should_panic(expected = "is not in the tree")]
fn split_on_absent_pivot_panics() {
    let mut forest = AvlForest::new();
    let tree = build(&mut forest, [1, 2, 3]);
    let _ = forest.split(tree, 7);
}

#[test]
#[should_panic(expected = "does not separate")]
fn join_with_interleaved_ranges_panics() {
    let mut forest = AvlForest::new();
    let mut this = build(&mut forest, [1, 5, 9]);
    let other = build(&mut forest, [3, 4]);
    forest.join(&mut this, 2, String::new(), other);
}

#[test]
#[should_panic(expected = "does not separate")]
fn join_with_connector_outside_gap_panics() {
    let mut forest = AvlForest::new();
    let mut this = build(&mut forest, [1, 2]);
    let other = build(&mut forest, [10, 11]);
    forest.join(&mut this, 20, String::new(), other);
}

#[test]
#[should_panic(expected = "different forest")]
fn tree_from_another_forest_panics() {
    let mut first = AvlForest::new();
    let second: AvlForest<String> = AvlForest::new();
    let mut foreign = second.new_tree();
    let _ = first.insert(&mut foreign, 1, String::new());
}
