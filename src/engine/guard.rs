//! Scoped unwind for a partially populated tree

use crate::tree::{Placement, SearchTree, TreeError};

/// Inserts elements in index order; if dropped before [`commit`], removes
/// every element inserted so far, in insertion order.
///
/// [`commit`]: PopulateGuard::commit
#[derive(Debug)]
pub struct PopulateGuard<'a> {
    tree: &'a mut SearchTree,
    keys: &'a [i32],
    inserted: usize,
    armed: bool,
}

impl<'a> PopulateGuard<'a> {
    /// Guard over an empty tree.
    pub fn new(tree: &'a mut SearchTree, keys: &'a [i32]) -> Self {
        debug_assert!(tree.is_empty(), "populate must start from an empty tree");
        Self {
            tree,
            keys,
            inserted: 0,
            armed: true,
        }
    }

    /// Insert the next element (index = number inserted so far).
    pub fn insert_next(&mut self) -> Result<Placement, TreeError> {
        let placement = self.tree.insert(self.keys, self.inserted)?;
        self.inserted += 1;
        Ok(placement)
    }

    /// Keep the tree as built.
    pub fn commit(mut self) {
        self.armed = false;
    }
}

impl Drop for PopulateGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        for element in 0..self.inserted {
            self.tree.remove(self.keys, self.keys[element]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drop_unwinds() {
        let keys = vec![9, 3, 7, 1];
        let mut tree = SearchTree::new();
        {
            let mut guard = PopulateGuard::new(&mut tree, &keys);
            guard.insert_next().unwrap();
            guard.insert_next().unwrap();
            guard.insert_next().unwrap();
        }
        assert!(tree.is_empty());
    }

    #[test]
    fn test_commit_keeps_tree() {
        let keys = vec![9, 3, 7, 1];
        let mut tree = SearchTree::new();
        let mut guard = PopulateGuard::new(&mut tree, &keys);
        for _ in 0..keys.len() {
            guard.insert_next().unwrap();
        }
        guard.commit();
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn test_unwind_with_collapsed_duplicate() {
        let keys = vec![5, 5, 6];
        let mut tree = SearchTree::new();
        {
            let mut guard = PopulateGuard::new(&mut tree, &keys);
            assert_eq!(guard.insert_next(), Ok(Placement::Inserted));
            assert_eq!(guard.insert_next(), Ok(Placement::Existing(0)));
            assert_eq!(guard.insert_next(), Ok(Placement::Inserted));
        }
        assert!(tree.is_empty());
    }
}
