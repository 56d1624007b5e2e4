//! Tree nodes and the live-node budget
//!
//! Node = (element index, left subtree, right subtree, height)
//! Every node is its own heap allocation: insert allocates, remove frees.

use std::fmt;

use super::TreeError;

/// Owned link to a subtree.
pub(super) type Link = Option<Box<Node>>;

/// Tree node: refers to a dataset element by index, never by value.
#[derive(Debug)]
pub struct Node {
    /// Index of the dataset element this node stands for
    pub element: u32,

    /// Subtree height, leaf = 1
    pub height: u8,

    pub(super) left: Link,
    pub(super) right: Link,
}

impl Node {
    pub(super) fn boxed(element: u32) -> Box<Self> {
        Box::new(Self {
            element,
            height: 1,
            left: None,
            right: None,
        })
    }

    pub(super) fn update_height(&mut self) {
        self.height = 1 + height_of(&self.left).max(height_of(&self.right));
    }

    pub(super) fn balance(&self) -> i32 {
        i32::from(height_of(&self.left)) - i32::from(height_of(&self.right))
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} (h={})", self.element, self.height)
    }
}

#[inline]
pub(super) fn height_of(link: &Link) -> u8 {
    link.as_ref().map_or(0, |node| node.height)
}

/// Live-node count with an optional cap.
///
/// The cap stands in for allocator exhaustion: once `limit` nodes are live,
/// further insertions fail the same way a refused allocation would.
#[derive(Debug, Default, Clone, Copy)]
pub(super) struct NodeBudget {
    live: usize,
    limit: Option<usize>,
}

impl NodeBudget {
    pub(super) fn with_limit(limit: usize) -> Self {
        Self {
            live: 0,
            limit: Some(limit),
        }
    }

    /// Account for one more node, or refuse if the cap is reached.
    pub(super) fn acquire(&mut self) -> Result<(), TreeError> {
        if let Some(limit) = self.limit {
            if self.live >= limit {
                return Err(TreeError::NodeLimit { limit });
            }
        }
        self.live += 1;
        Ok(())
    }

    pub(super) fn release(&mut self) {
        self.live -= 1;
    }

    pub(super) fn live(&self) -> usize {
        self.live
    }
}
