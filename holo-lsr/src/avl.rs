//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//
// Sponsored by NLnet as part of the Next Generation Internet initiative.
// See: https://nlnet.nl/NGI0
//

//! Height-balanced (AVL) binary search tree keyed by a 64-bit integer.
//!
//! The tree backs both the link-state database and the per-run topology
//! store. All operations are O(log n) since the height of every subtree is
//! kept within one of its sibling.

use std::cmp::Ordering;

type Link<T> = Option<Box<AvlNode<T>>>;

/// An ordered map from `u64` keys to values of type `T`.
#[derive(Debug)]
pub struct AvlTree<T> {
    root: Link<T>,
    len: usize,
}

#[derive(Debug)]
struct AvlNode<T> {
    key: u64,
    value: T,
    left: Link<T>,
    right: Link<T>,
    height: i32,
}

/// Result of an [`AvlTree::insert`] operation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InsertOutcome {
    // The key was absent and a new node was created.
    Inserted,
    // The key was present and its value was replaced.
    Replaced,
    // The key was present and overwriting wasn't requested.
    Unchanged,
}

/// In-order iterator over the entries of an [`AvlTree`].
#[derive(Debug)]
pub struct Iter<'a, T> {
    stack: Vec<&'a AvlNode<T>>,
    current: Option<&'a AvlNode<T>>,
}

// ===== impl AvlTree =====

impl<T> AvlTree<T> {
    pub const fn new() -> Self {
        AvlTree { root: None, len: 0 }
    }

    /// Inserts `value` under `key`.
    ///
    /// When the key is already present, the stored value is replaced only
    /// if `overwrite` is true; otherwise the tree is left untouched and
    /// `value` is dropped.
    pub fn insert(
        &mut self,
        key: u64,
        value: T,
        overwrite: bool,
    ) -> InsertOutcome {
        let mut outcome = InsertOutcome::Unchanged;
        let root = self.root.take();
        self.root = Some(insert(root, key, value, overwrite, &mut outcome));
        if outcome == InsertOutcome::Inserted {
            self.len += 1;
        }
        outcome
    }

    /// Removes `key` from the tree, returning its value if it was present.
    pub fn delete(&mut self, key: u64) -> Option<T> {
        let mut removed = None;
        let root = self.root.take();
        self.root = delete(root, key, &mut removed);
        if removed.is_some() {
            self.len -= 1;
        }
        removed
    }

    pub fn get(&self, key: u64) -> Option<&T> {
        search(&self.root, key).map(|node| &node.value)
    }

    pub fn get_mut(&mut self, key: u64) -> Option<&mut T> {
        search_mut(&mut self.root, key).map(|node| &mut node.value)
    }

    pub fn contains_key(&self, key: u64) -> bool {
        self.get(key).is_some()
    }

    /// Returns an iterator over all entries in ascending key order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            stack: Vec::new(),
            current: self.root.as_deref(),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = u64> + '_ {
        self.iter().map(|(key, _)| key)
    }

    pub fn values(&self) -> impl Iterator<Item = &T> + '_ {
        self.iter().map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the height of the tree (zero when empty).
    pub fn height(&self) -> i32 {
        height(&self.root)
    }
}

impl<T> Default for AvlTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T> IntoIterator for &'a AvlTree<T> {
    type Item = (u64, &'a T);
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T> FromIterator<(u64, T)> for AvlTree<T> {
    fn from_iter<I: IntoIterator<Item = (u64, T)>>(iter: I) -> Self {
        let mut tree = AvlTree::new();
        for (key, value) in iter {
            tree.insert(key, value, true);
        }
        tree
    }
}

// ===== impl AvlNode =====

impl<T> AvlNode<T> {
    fn leaf(key: u64, value: T) -> Box<Self> {
        Box::new(AvlNode {
            key,
            value,
            left: None,
            right: None,
            height: 1,
        })
    }

    fn update_height(&mut self) {
        self.height =
            1 + std::cmp::max(height(&self.left), height(&self.right));
    }

    // Height of the left subtree minus height of the right subtree.
    fn balance_factor(&self) -> i32 {
        height(&self.left) - height(&self.right)
    }
}

// ===== impl Iter =====

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (u64, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.current {
            self.stack.push(node);
            self.current = node.left.as_deref();
        }

        let node = self.stack.pop()?;
        self.current = node.right.as_deref();
        Some((node.key, &node.value))
    }
}

// ===== helper functions =====

fn height<T>(link: &Link<T>) -> i32 {
    link.as_ref().map_or(0, |node| node.height)
}

fn link_balance_factor<T>(link: &Link<T>) -> i32 {
    link.as_ref().map_or(0, |node| node.balance_factor())
}

fn search<T>(link: &Link<T>, key: u64) -> Option<&AvlNode<T>> {
    let node = link.as_deref()?;
    match key.cmp(&node.key) {
        Ordering::Equal => Some(node),
        Ordering::Less => search(&node.left, key),
        Ordering::Greater => search(&node.right, key),
    }
}

fn search_mut<T>(link: &mut Link<T>, key: u64) -> Option<&mut AvlNode<T>> {
    let node = link.as_deref_mut()?;
    match key.cmp(&node.key) {
        Ordering::Equal => Some(node),
        Ordering::Less => search_mut(&mut node.left, key),
        Ordering::Greater => search_mut(&mut node.right, key),
    }
}

//     z            y
//    /           /   \
//   y     -->   x     z
//  / \               /
// x   T1           T1
fn rotate_right<T>(mut node: Box<AvlNode<T>>) -> Box<AvlNode<T>> {
    let Some(mut pivot) = node.left.take() else {
        return node;
    };
    node.left = pivot.right.take();
    node.update_height();
    pivot.right = Some(node);
    pivot.update_height();
    pivot
}

//  z                 y
//   \              /   \
//    y     -->    z     x
//   / \            \
// T1   x           T1
fn rotate_left<T>(mut node: Box<AvlNode<T>>) -> Box<AvlNode<T>> {
    let Some(mut pivot) = node.right.take() else {
        return node;
    };
    node.right = pivot.left.take();
    node.update_height();
    pivot.left = Some(node);
    pivot.update_height();
    pivot
}

fn insert<T>(
    link: Link<T>,
    key: u64,
    value: T,
    overwrite: bool,
    outcome: &mut InsertOutcome,
) -> Box<AvlNode<T>> {
    let Some(mut node) = link else {
        *outcome = InsertOutcome::Inserted;
        return AvlNode::leaf(key, value);
    };

    match key.cmp(&node.key) {
        Ordering::Equal => {
            if overwrite {
                node.value = value;
                *outcome = InsertOutcome::Replaced;
            }
            return node;
        }
        Ordering::Less => {
            node.left =
                Some(insert(node.left.take(), key, value, overwrite, outcome));
        }
        Ordering::Greater => {
            node.right =
                Some(insert(node.right.take(), key, value, overwrite, outcome));
        }
    }

    node.update_height();
    let bf = node.balance_factor();

    // The inserted key tells which grandchild subtree grew.
    if bf > 1
        && let Some(left_key) = node.left.as_ref().map(|left| left.key)
    {
        if key > left_key {
            // Left-right case.
            node.left = node.left.take().map(rotate_left);
        }
        // Left-left case.
        return rotate_right(node);
    }
    if bf < -1
        && let Some(right_key) = node.right.as_ref().map(|right| right.key)
    {
        if key < right_key {
            // Right-left case.
            node.right = node.right.take().map(rotate_right);
        }
        // Right-right case.
        return rotate_left(node);
    }

    node
}

fn delete<T>(link: Link<T>, key: u64, removed: &mut Option<T>) -> Link<T> {
    let mut node = link?;

    match key.cmp(&node.key) {
        Ordering::Less => {
            node.left = delete(node.left.take(), key, removed);
        }
        Ordering::Greater => {
            node.right = delete(node.right.take(), key, removed);
        }
        Ordering::Equal => {
            let left = node.left.take();
            let right = node.right.take();
            *removed = Some(node.value);
            match (left, right) {
                (None, None) => return None,
                (Some(child), None) | (None, Some(child)) => return Some(child),
                (Some(left), Some(right)) => {
                    // Replace with the in-order successor.
                    let (right, mut successor) = take_min(right);
                    successor.left = Some(left);
                    successor.right = right;
                    node = successor;
                }
            }
        }
    }

    Some(rebalance(node))
}

// Detaches the minimum node of the given subtree, returning the remaining
// (rebalanced) subtree and the detached node.
fn take_min<T>(mut node: Box<AvlNode<T>>) -> (Link<T>, Box<AvlNode<T>>) {
    match node.left.take() {
        None => {
            let right = node.right.take();
            (right, node)
        }
        Some(left) => {
            let (left, min) = take_min(left);
            node.left = left;
            (Some(rebalance(node)), min)
        }
    }
}

// Rebalancing after removal, where the child's own balance factor selects
// the rotation case.
fn rebalance<T>(mut node: Box<AvlNode<T>>) -> Box<AvlNode<T>> {
    node.update_height();
    let bf = node.balance_factor();

    if bf > 1 {
        if link_balance_factor(&node.left) < 0 {
            node.left = node.left.take().map(rotate_left);
        }
        return rotate_right(node);
    }
    if bf < -1 {
        if link_balance_factor(&node.right) > 0 {
            node.right = node.right.take().map(rotate_right);
        }
        return rotate_left(node);
    }

    node
}

// ===== unit tests =====
