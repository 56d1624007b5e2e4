//! Binary search tree over dataset indices
//!
//! Nodes store the index of a dataset element; ordering comes from the key
//! at that index, so every operation takes the key slice it searches over.
//! Balanced as an AVL tree: sibling subtree heights differ by at most one.
//!
//! Each node is boxed individually, so populating a tree of `n` elements
//! makes `n` allocations and emptying it makes `n` frees.
//!
//! Equal keys collapse: inserting a key that is already present resolves to
//! the existing node and leaves the tree unchanged.

mod node;
mod traversal;

pub use traversal::InOrder;

use std::cmp::Ordering;

use thiserror::Error;

use node::{height_of, Link, Node, NodeBudget};

/// Errors raised by tree operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// Configured node cap reached.
    #[error("cannot allocate new tree node (limit of {limit} nodes reached)")]
    NodeLimit {
        /// Maximum number of live nodes
        limit: usize,
    },

    /// Structural invariant violated.
    #[error("tree corrupted: {0}")]
    Corrupted(String),
}

impl TreeError {
    /// Whether the error is an allocation failure.
    pub fn is_exhaustion(&self) -> bool {
        matches!(self, TreeError::NodeLimit { .. })
    }
}

/// Result of inserting an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// A new node now stands for the element.
    Inserted,
    /// An equal key was already present; holds the index of the element
    /// owning that node.
    Existing(usize),
}

/// Comparison used for every key in the tree: numeric ascending.
#[inline]
pub fn compare_keys(a: i32, b: i32) -> Ordering {
    a.cmp(&b)
}

/// AVL tree whose nodes refer to dataset elements by index.
#[derive(Debug, Default)]
pub struct SearchTree {
    root: Link,
    budget: NodeBudget,
}

impl SearchTree {
    /// Empty tree with no cap on live nodes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty tree that fails insertion once `limit` nodes are live.
    pub fn with_node_limit(limit: usize) -> Self {
        Self {
            root: None,
            budget: NodeBudget::with_limit(limit),
        }
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.budget.live()
    }

    /// Whether the tree has no nodes.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Height of the tree (0 when empty).
    pub fn height(&self) -> usize {
        usize::from(height_of(&self.root))
    }

    /// Insert element `element`, keyed by `keys[element]`.
    ///
    /// On error the tree is unchanged.
    pub fn insert(&mut self, keys: &[i32], element: usize) -> Result<Placement, TreeError> {
        let key = keys[element];
        insert_at(&mut self.root, &mut self.budget, keys, element as u32, key)
    }

    /// Find the element whose key equals `key`.
    pub fn find(&self, keys: &[i32], key: i32) -> Option<usize> {
        let mut link = &self.root;
        while let Some(node) = link {
            link = match compare_keys(key, keys[node.element as usize]) {
                Ordering::Less => &node.left,
                Ordering::Greater => &node.right,
                Ordering::Equal => return Some(node.element as usize),
            };
        }
        None
    }

    /// Remove the node whose key equals `key`, freeing it; returns the
    /// element it stood for, or `None` when no such node exists.
    pub fn remove(&mut self, keys: &[i32], key: i32) -> Option<usize> {
        let element = remove_at(&mut self.root, keys, key)?;
        self.budget.release();
        Some(element as usize)
    }

    /// Element indices in ascending key order.
    pub fn iter(&self) -> InOrder<'_> {
        InOrder::new(&self.root)
    }

    /// Check ordering, balance, stored heights and node count.
    pub fn check_invariants(&self, keys: &[i32]) -> Result<(), TreeError> {
        let mut previous: Option<i32> = None;
        let mut count = 0usize;
        for element in self.iter() {
            let key = keys[element];
            if let Some(prev) = previous {
                if compare_keys(prev, key) != Ordering::Less {
                    return Err(TreeError::Corrupted(format!(
                        "keys out of order: {} before {} (element {})",
                        prev, key, element
                    )));
                }
            }
            previous = Some(key);
            count += 1;
        }
        if count != self.len() {
            return Err(TreeError::Corrupted(format!(
                "{} reachable nodes but {} live",
                count,
                self.len()
            )));
        }
        check_balance(&self.root)?;
        Ok(())
    }
}

fn insert_at(
    link: &mut Link,
    budget: &mut NodeBudget,
    keys: &[i32],
    element: u32,
    key: i32,
) -> Result<Placement, TreeError> {
    let node = match link {
        Some(node) => node,
        None => {
            budget.acquire()?;
            *link = Some(Node::boxed(element));
            return Ok(Placement::Inserted);
        }
    };

    let placement = match compare_keys(key, keys[node.element as usize]) {
        Ordering::Equal => return Ok(Placement::Existing(node.element as usize)),
        Ordering::Less => insert_at(&mut node.left, budget, keys, element, key)?,
        Ordering::Greater => insert_at(&mut node.right, budget, keys, element, key)?,
    };
    if placement == Placement::Inserted {
        rebalance(link);
    }
    Ok(placement)
}

/// Unlink the node matching `key`; returns its element once the box is freed.
fn remove_at(link: &mut Link, keys: &[i32], key: i32) -> Option<u32> {
    let node = link.as_mut()?;
    let ordering = compare_keys(key, keys[node.element as usize]);
    let removed = match ordering {
        Ordering::Less => remove_at(&mut node.left, keys, key)?,
        Ordering::Greater => remove_at(&mut node.right, keys, key)?,
        Ordering::Equal => {
            let mut target = link.take()?;
            *link = match (target.left.take(), target.right.take()) {
                (None, right) => right,
                (left, None) => left,
                (left, Some(right)) => {
                    let (rest, mut successor) = detach_min(right);
                    successor.left = left;
                    successor.right = rest;
                    let mut replacement = Some(successor);
                    rebalance(&mut replacement);
                    replacement
                }
            };
            return Some(target.element);
        }
    };
    rebalance(link);
    Some(removed)
}

/// Unlink the minimum of the subtree rooted at `node`.
/// Returns (remaining subtree, detached node).
fn detach_min(mut node: Box<Node>) -> (Link, Box<Node>) {
    match node.left.take() {
        None => {
            let rest = node.right.take();
            (rest, node)
        }
        Some(left) => {
            let (rest, min) = detach_min(left);
            node.left = rest;
            let mut link = Some(node);
            rebalance(&mut link);
            (link, min)
        }
    }
}

fn rotate_left(link: &mut Link) {
    let Some(mut node) = link.take() else { return };
    let Some(mut pivot) = node.right.take() else {
        *link = Some(node);
        return;
    };
    node.right = pivot.left.take();
    node.update_height();
    pivot.left = Some(node);
    pivot.update_height();
    *link = Some(pivot);
}

fn rotate_right(link: &mut Link) {
    let Some(mut node) = link.take() else { return };
    let Some(mut pivot) = node.left.take() else {
        *link = Some(node);
        return;
    };
    node.left = pivot.right.take();
    node.update_height();
    pivot.right = Some(node);
    pivot.update_height();
    *link = Some(pivot);
}

/// Restore the AVL rule at the root of `link`.
fn rebalance(link: &mut Link) {
    let Some(node) = link.as_mut() else { return };
    node.update_height();
    let balance = node.balance();

    if balance > 1 {
        if node.left.as_ref().map_or(0, |left| left.balance()) < 0 {
            rotate_left(&mut node.left);
        }
        rotate_right(link);
    } else if balance < -1 {
        if node.right.as_ref().map_or(0, |right| right.balance()) > 0 {
            rotate_right(&mut node.right);
        }
        rotate_left(link);
    }
}

fn check_balance(link: &Link) -> Result<i32, TreeError> {
    let Some(node) = link else { return Ok(0) };
    let left = check_balance(&node.left)?;
    let right = check_balance(&node.right)?;
    if (left - right).abs() > 1 {
        return Err(TreeError::Corrupted(format!(
            "node {} unbalanced: left height {}, right height {}",
            node, left, right
        )));
    }
    let height = 1 + left.max(right);
    if height != i32::from(node.height) {
        return Err(TreeError::Corrupted(format!(
            "node {} stores height {}, actual {}",
            node, node.height, height
        )));
    }
    Ok(height)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn populate(tree: &mut SearchTree, keys: &[i32]) {
        for element in 0..keys.len() {
            tree.insert(keys, element).unwrap();
        }
    }

    #[test]
    fn test_insert_find_remove() {
        let keys = vec![50, 20, 80, 10, 30, 70, 90];
        let mut tree = SearchTree::new();
        populate(&mut tree, &keys);

        assert_eq!(tree.len(), 7);
        tree.check_invariants(&keys).unwrap();
        for (element, &key) in keys.iter().enumerate() {
            assert_eq!(tree.find(&keys, key), Some(element));
        }
        assert_eq!(tree.find(&keys, 55), None);

        assert_eq!(tree.remove(&keys, 20), Some(1));
        assert_eq!(tree.find(&keys, 20), None);
        assert_eq!(tree.remove(&keys, 20), None);
        tree.check_invariants(&keys).unwrap();
        assert_eq!(tree.len(), 6);
    }

    #[test]
    fn test_in_order_is_sorted() {
        let keys = vec![5, -3, 9, 0, i32::MIN, i32::MAX, 7];
        let mut tree = SearchTree::new();
        populate(&mut tree, &keys);

        let ordered: Vec<i32> = tree.iter().map(|e| keys[e]).collect();
        assert_eq!(ordered, vec![i32::MIN, -3, 0, 5, 7, 9, i32::MAX]);
    }

    #[test]
    fn test_duplicate_collapses_to_first_element() {
        let keys = vec![4, 8, 4, 2];
        let mut tree = SearchTree::new();
        assert_eq!(tree.insert(&keys, 0), Ok(Placement::Inserted));
        assert_eq!(tree.insert(&keys, 1), Ok(Placement::Inserted));
        assert_eq!(tree.insert(&keys, 2), Ok(Placement::Existing(0)));
        assert_eq!(tree.insert(&keys, 3), Ok(Placement::Inserted));
        assert_eq!(tree.len(), 3);

        assert_eq!(tree.find(&keys, keys[2]), Some(0));
        assert_eq!(tree.remove(&keys, keys[0]), Some(0));
        assert_eq!(tree.remove(&keys, keys[2]), None);
    }

    #[test]
    fn test_ascending_inserts_stay_balanced() {
        let keys: Vec<i32> = (0..4096).collect();
        let mut tree = SearchTree::new();
        populate(&mut tree, &keys);

        tree.check_invariants(&keys).unwrap();
        // AVL height bound: < 1.45 log2(n + 2)
        assert!(tree.height() <= 17, "height {}", tree.height());
    }

    #[test]
    fn test_remove_everything_empties_tree() {
        let keys: Vec<i32> = (0..1000).map(|i| (i * 7919) % 1000 - 500).collect();
        let mut tree = SearchTree::new();
        populate(&mut tree, &keys);

        for (element, &key) in keys.iter().enumerate() {
            assert_eq!(tree.remove(&keys, key), Some(element));
            if element % 97 == 0 {
                tree.check_invariants(&keys).unwrap();
            }
        }
        assert!(tree.is_empty());
        assert_eq!(tree.len(), 0);
        assert_eq!(tree.height(), 0);
    }

    #[test]
    fn test_node_limit_leaves_tree_untouched() {
        let keys = vec![3, 1, 2];
        let mut tree = SearchTree::with_node_limit(2);
        tree.insert(&keys, 0).unwrap();
        tree.insert(&keys, 1).unwrap();

        let err = tree.insert(&keys, 2).unwrap_err();
        assert!(err.is_exhaustion());
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.find(&keys, 2), None);
        tree.check_invariants(&keys).unwrap();
    }
}
