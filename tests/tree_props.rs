use std::collections::BTreeMap;

use proptest::prelude::*;
use tsearch_stress::{Placement, SearchTree};

proptest! {
    #[test]
    fn tree_matches_ordered_map_model(
        keys in proptest::collection::vec(-64i32..64, 1..200),
        removals in proptest::collection::vec(0usize..200, 0..100),
    ) {
        let mut tree = SearchTree::new();
        let mut model: BTreeMap<i32, usize> = BTreeMap::new();

        for (element, &key) in keys.iter().enumerate() {
            let placement = tree.insert(&keys, element).expect("unbounded pool");
            match model.get(&key) {
                Some(&owner) => prop_assert_eq!(placement, Placement::Existing(owner)),
                None => {
                    prop_assert_eq!(placement, Placement::Inserted);
                    model.insert(key, element);
                }
            }
        }
        prop_assert_eq!(tree.len(), model.len());
        prop_assert!(tree.check_invariants(&keys).is_ok());

        let in_order: Vec<usize> = tree.iter().collect();
        let expected: Vec<usize> = model.values().copied().collect();
        prop_assert_eq!(in_order, expected);

        for pick in removals {
            let key = keys[pick % keys.len()];
            prop_assert_eq!(tree.remove(&keys, key), model.remove(&key));
            prop_assert_eq!(tree.find(&keys, key), None);
        }
        prop_assert_eq!(tree.len(), model.len());
        prop_assert!(tree.check_invariants(&keys).is_ok());
    }

    #[test]
    fn removing_every_key_empties_the_tree(
        keys in proptest::collection::vec(any::<i32>(), 1..300),
    ) {
        let mut tree = SearchTree::new();
        for element in 0..keys.len() {
            tree.insert(&keys, element).expect("unbounded pool");
        }
        for &key in &keys {
            tree.remove(&keys, key);
        }
        prop_assert!(tree.is_empty());
        prop_assert_eq!(tree.len(), 0);
    }
}
