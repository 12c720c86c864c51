//! Order-statistics red-black tree.
//!
//! Every node stores the size of its subtree, so positional lookup (`at`) and
//! rank queries (`index_of`) run in O(log n) next to the usual O(log n)
//! insert and remove. Nodes live in a generational arena owned by the
//! collection; node handles never leave this module.

use std::cmp::Ordering;
use std::fmt;

use generational_arena::{Arena, Index};
use tracing::{instrument, trace};

use crate::domain::error::{DomainError, DomainResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    Red,
    Black,
}

#[derive(Debug, Clone)]
struct Node<T> {
    value: T,
    color: Color,
    /// Number of nodes in the subtree rooted here, including this one
    size: usize,
    parent: Option<Index>,
    left: Option<Index>,
    right: Option<Index>,
}

/// Sorted, duplicate-free collection with O(log n) indexed access.
///
/// Equality for de-duplication is `Ord::cmp == Equal`: inserting a value that
/// compares equal to a stored one is a no-op.
#[derive(Clone)]
pub struct OrderedCollection<T> {
    arena: Arena<Node<T>>,
    root: Option<Index>,
}

impl<T> Default for OrderedCollection<T> {
    fn default() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for OrderedCollection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T> OrderedCollection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.size_of(self.root)
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Element at sorted position `index`.
    pub fn at(&self, index: usize) -> DomainResult<&T> {
        self.get(index).ok_or(DomainError::OutOfRange {
            index,
            len: self.len(),
        })
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.node_at(index).map(|idx| &self.arena[idx].value)
    }

    pub fn min(&self) -> Option<&T> {
        self.root
            .map(|root| &self.arena[self.leftmost(root)].value)
    }

    pub fn max(&self) -> Option<&T> {
        self.root
            .map(|root| &self.arena[self.rightmost(root)].value)
    }

    pub fn clear(&mut self) {
        self.arena.clear();
        self.root = None;
    }

    /// Ascending iterator; each call starts a fresh traversal.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self)
    }

    /// Removes the element at sorted position `index` and returns it.
    #[instrument(level = "trace", skip(self))]
    pub fn remove_at(&mut self, index: usize) -> DomainResult<T> {
        let len = self.len();
        let node = self
            .node_at(index)
            .ok_or(DomainError::OutOfRange { index, len })?;
        self.delete_node(node)
            .ok_or(DomainError::OutOfRange { index, len })
    }

    fn size_of(&self, node: Option<Index>) -> usize {
        node.map_or(0, |idx| self.arena[idx].size)
    }

    fn is_red(&self, node: Option<Index>) -> bool {
        node.is_some_and(|idx| self.arena[idx].color == Color::Red)
    }

    fn set_color(&mut self, node: Option<Index>, color: Color) {
        if let Some(idx) = node {
            self.arena[idx].color = color;
        }
    }

    fn update_size(&mut self, idx: Index) {
        let node = &self.arena[idx];
        let size = 1 + self.size_of(node.left) + self.size_of(node.right);
        self.arena[idx].size = size;
    }

    fn leftmost(&self, mut idx: Index) -> Index {
        while let Some(left) = self.arena[idx].left {
            idx = left;
        }
        idx
    }

    fn rightmost(&self, mut idx: Index) -> Index {
        while let Some(right) = self.arena[idx].right {
            idx = right;
        }
        idx
    }

    /// Walks down guided by left-subtree sizes.
    fn node_at(&self, index: usize) -> Option<Index> {
        let mut current = self.root;
        let mut remaining = index;
        while let Some(idx) = current {
            let node = &self.arena[idx];
            let left_size = self.size_of(node.left);
            match remaining.cmp(&left_size) {
                Ordering::Less => current = node.left,
                Ordering::Equal => return Some(idx),
                Ordering::Greater => {
                    remaining -= left_size + 1;
                    current = node.right;
                }
            }
        }
        None
    }

    /// Points `parent`'s link that referenced `old` at `new` instead.
    fn replace_child(&mut self, parent: Option<Index>, old: Index, new: Option<Index>) {
        match parent {
            None => self.root = new,
            Some(p) => {
                if self.arena[p].left == Some(old) {
                    self.arena[p].left = new;
                } else {
                    self.arena[p].right = new;
                }
            }
        }
    }

    fn rotate_left(&mut self, x: Index) {
        let Some(y) = self.arena[x].right else {
            return;
        };
        let inner = self.arena[y].left;
        self.arena[x].right = inner;
        if let Some(inner) = inner {
            self.arena[inner].parent = Some(x);
        }
        let parent = self.arena[x].parent;
        self.arena[y].parent = parent;
        self.replace_child(parent, x, Some(y));
        self.arena[y].left = Some(x);
        self.arena[x].parent = Some(y);

        let size = self.arena[x].size;
        self.arena[y].size = size;
        self.update_size(x);
    }

    fn rotate_right(&mut self, x: Index) {
        let Some(y) = self.arena[x].left else {
            return;
        };
        let inner = self.arena[y].right;
        self.arena[x].left = inner;
        if let Some(inner) = inner {
            self.arena[inner].parent = Some(x);
        }
        let parent = self.arena[x].parent;
        self.arena[y].parent = parent;
        self.replace_child(parent, x, Some(y));
        self.arena[y].right = Some(x);
        self.arena[x].parent = Some(y);

        let size = self.arena[x].size;
        self.arena[y].size = size;
        self.update_size(x);
    }

    fn insert_fixup(&mut self, mut z: Index) {
        loop {
            let Some(parent) = self.arena[z].parent else {
                break;
            };
            if !self.is_red(Some(parent)) {
                break;
            }
            // a red node is never the root, so the grandparent exists
            let Some(grand) = self.arena[parent].parent else {
                break;
            };

            if self.arena[grand].left == Some(parent) {
                let uncle = self.arena[grand].right;
                if self.is_red(uncle) {
                    self.set_color(Some(parent), Color::Black);
                    self.set_color(uncle, Color::Black);
                    self.set_color(Some(grand), Color::Red);
                    z = grand;
                    continue;
                }
                if self.arena[parent].right == Some(z) {
                    z = parent;
                    self.rotate_left(z);
                }
                let Some(parent) = self.arena[z].parent else {
                    break;
                };
                self.set_color(Some(parent), Color::Black);
                self.set_color(Some(grand), Color::Red);
                self.rotate_right(grand);
            } else {
                let uncle = self.arena[grand].left;
                if self.is_red(uncle) {
                    self.set_color(Some(parent), Color::Black);
                    self.set_color(uncle, Color::Black);
                    self.set_color(Some(grand), Color::Red);
                    z = grand;
                    continue;
                }
                if self.arena[parent].left == Some(z) {
                    z = parent;
                    self.rotate_right(z);
                }
                let Some(parent) = self.arena[z].parent else {
                    break;
                };
                self.set_color(Some(parent), Color::Black);
                self.set_color(Some(grand), Color::Red);
                self.rotate_left(grand);
            }
        }
        self.set_color(self.root, Color::Black);
    }

    /// Unlinks `node` from the tree and returns its value.
    ///
    /// A node with two children trades values with its in-order successor,
    /// which is then unlinked instead; the spliced node has at most one child.
    fn delete_node(&mut self, node: Index) -> Option<T> {
        let target = match (self.arena[node].left, self.arena[node].right) {
            (Some(_), Some(right)) => {
                let successor = self.leftmost(right);
                if let (Some(a), Some(b)) = self.arena.get2_mut(node, successor) {
                    std::mem::swap(&mut a.value, &mut b.value);
                }
                successor
            }
            _ => node,
        };

        let child = self.arena[target].left.or(self.arena[target].right);
        let parent = self.arena[target].parent;

        let mut ancestor = parent;
        while let Some(idx) = ancestor {
            self.arena[idx].size -= 1;
            ancestor = self.arena[idx].parent;
        }

        if let Some(child) = child {
            self.arena[child].parent = parent;
        }
        self.replace_child(parent, target, child);

        let removed = self.arena.remove(target)?;
        if removed.color == Color::Black {
            self.delete_fixup(child, parent);
        }
        Some(removed.value)
    }

    /// Restores the black-height after removing a black node.
    ///
    /// `x` took the removed node's place (possibly empty) under `parent`.
    fn delete_fixup(&mut self, mut x: Option<Index>, mut parent: Option<Index>) {
        while x != self.root && !self.is_red(x) {
            let Some(p) = parent else {
                break;
            };

            if self.arena[p].left == x {
                let Some(mut w) = self.arena[p].right else {
                    break;
                };
                if self.is_red(Some(w)) {
                    self.set_color(Some(w), Color::Black);
                    self.set_color(Some(p), Color::Red);
                    self.rotate_left(p);
                    match self.arena[p].right {
                        Some(next) => w = next,
                        None => break,
                    }
                }
                if !self.is_red(self.arena[w].left) && !self.is_red(self.arena[w].right) {
                    self.set_color(Some(w), Color::Red);
                    x = Some(p);
                    parent = self.arena[p].parent;
                } else {
                    if !self.is_red(self.arena[w].right) {
                        self.set_color(self.arena[w].left, Color::Black);
                        self.set_color(Some(w), Color::Red);
                        self.rotate_right(w);
                        match self.arena[p].right {
                            Some(next) => w = next,
                            None => break,
                        }
                    }
                    let parent_color = self.arena[p].color;
                    self.set_color(Some(w), parent_color);
                    self.set_color(Some(p), Color::Black);
                    self.set_color(self.arena[w].right, Color::Black);
                    self.rotate_left(p);
                    x = self.root;
                    parent = None;
                }
            } else {
                let Some(mut w) = self.arena[p].left else {
                    break;
                };
                if self.is_red(Some(w)) {
                    self.set_color(Some(w), Color::Black);
                    self.set_color(Some(p), Color::Red);
                    self.rotate_right(p);
                    match self.arena[p].left {
                        Some(next) => w = next,
                        None => break,
                    }
                }
                if !self.is_red(self.arena[w].left) && !self.is_red(self.arena[w].right) {
                    self.set_color(Some(w), Color::Red);
                    x = Some(p);
                    parent = self.arena[p].parent;
                } else {
                    if !self.is_red(self.arena[w].left) {
                        self.set_color(self.arena[w].right, Color::Black);
                        self.set_color(Some(w), Color::Red);
                        self.rotate_left(w);
                        match self.arena[p].left {
                            Some(next) => w = next,
                            None => break,
                        }
                    }
                    let parent_color = self.arena[p].color;
                    self.set_color(Some(w), parent_color);
                    self.set_color(Some(p), Color::Black);
                    self.set_color(self.arena[w].left, Color::Black);
                    self.rotate_right(p);
                    x = self.root;
                    parent = None;
                }
            }
        }
        self.set_color(x, Color::Black);
    }
}

impl<T: Ord> OrderedCollection<T> {
    /// Inserts `value` unless an equal one is already present.
    ///
    /// Returns whether the value was inserted.
    pub fn insert(&mut self, value: T) -> bool {
        let mut parent = None;
        let mut go_left = false;
        let mut current = self.root;
        while let Some(idx) = current {
            match value.cmp(&self.arena[idx].value) {
                Ordering::Equal => return false,
                Ordering::Less => {
                    parent = Some(idx);
                    go_left = true;
                    current = self.arena[idx].left;
                }
                Ordering::Greater => {
                    parent = Some(idx);
                    go_left = false;
                    current = self.arena[idx].right;
                }
            }
        }

        let node = self.arena.insert(Node {
            value,
            color: Color::Red,
            size: 1,
            parent,
            left: None,
            right: None,
        });
        match parent {
            None => self.root = Some(node),
            Some(p) if go_left => self.arena[p].left = Some(node),
            Some(p) => self.arena[p].right = Some(node),
        }

        let mut ancestor = parent;
        while let Some(idx) = ancestor {
            self.arena[idx].size += 1;
            ancestor = self.arena[idx].parent;
        }

        self.insert_fixup(node);
        true
    }

    /// Inserts every value, skipping duplicates; returns how many were new.
    pub fn extend_from<I: IntoIterator<Item = T>>(&mut self, values: I) -> usize {
        let inserted = values
            .into_iter()
            .map(|value| self.insert(value))
            .filter(|inserted| *inserted)
            .count();
        trace!(inserted, len = self.len(), "extended collection");
        inserted
    }

    pub fn remove(&mut self, value: &T) -> bool {
        self.find(value)
            .and_then(|node| self.delete_node(node))
            .is_some()
    }

    /// Sorted position of `value`, if present.
    pub fn index_of(&self, value: &T) -> Option<usize> {
        let mut rank = 0;
        let mut current = self.root;
        while let Some(idx) = current {
            let node = &self.arena[idx];
            match value.cmp(&node.value) {
                Ordering::Less => current = node.left,
                Ordering::Equal => return Some(rank + self.size_of(node.left)),
                Ordering::Greater => {
                    rank += self.size_of(node.left) + 1;
                    current = node.right;
                }
            }
        }
        None
    }

    pub fn contains(&self, value: &T) -> bool {
        self.find(value).is_some()
    }

    fn find(&self, value: &T) -> Option<Index> {
        let mut current = self.root;
        while let Some(idx) = current {
            let node = &self.arena[idx];
            match value.cmp(&node.value) {
                Ordering::Less => current = node.left,
                Ordering::Equal => return Some(idx),
                Ordering::Greater => current = node.right,
            }
        }
        None
    }
}

impl<T: Ord> Extend<T> for OrderedCollection<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.extend_from(iter);
    }
}

impl<T: Ord> FromIterator<T> for OrderedCollection<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut collection = Self::new();
        collection.extend_from(iter);
        collection
    }
}

impl<'a, T> IntoIterator for &'a OrderedCollection<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// In-order traversal over an [`OrderedCollection`].
pub struct Iter<'a, T> {
    collection: &'a OrderedCollection<T>,
    stack: Vec<Index>,
    remaining: usize,
}

impl<'a, T> Iter<'a, T> {
    fn new(collection: &'a OrderedCollection<T>) -> Self {
        let mut iter = Self {
            collection,
            stack: Vec::new(),
            remaining: collection.len(),
        };
        iter.push_left_spine(collection.root);
        iter
    }

    fn push_left_spine(&mut self, mut node: Option<Index>) {
        while let Some(idx) = node {
            self.stack.push(idx);
            node = self.collection.arena[idx].left;
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.stack.pop()?;
        let collection = self.collection;
        let node = &collection.arena[idx];
        self.push_left_spine(node.right);
        self.remaining -= 1;
        Some(&node.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
