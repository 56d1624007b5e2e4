//! In-order traversal
//!
//! Explicit stack of pending ancestors; depth is bounded by the AVL height,
//! so the stack never exceeds ~1.44 log2(n) entries.

use super::node::{Link, Node};

/// Iterator yielding element indices in ascending key order.
#[derive(Debug)]
pub struct InOrder<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> InOrder<'a> {
    pub(super) fn new(root: &'a Link) -> Self {
        let mut iter = Self { stack: Vec::new() };
        iter.push_left_spine(root);
        iter
    }

    fn push_left_spine(&mut self, mut link: &'a Link) {
        while let Some(node) = link {
            self.stack.push(node);
            link = &node.left;
        }
    }
}

impl Iterator for InOrder<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let node = self.stack.pop()?;
        self.push_left_spine(&node.right);
        Some(node.element as usize)
    }
}
