use std::cmp::Ordering;
use std::fmt;

use itertools::Itertools;
use tracing::instrument;

use crate::domain::error::DomainResult;
use crate::domain::ordered::{Iter, OrderedCollection};

/// Delimiter used by `Display` when no configuration is at hand.
pub const DEFAULT_DELIMITER: &str = ",";

/// Null/empty diagnostics collected while building a tree.
///
/// Not part of equality or ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetInfo {
    /// Tree holds neither elements nor subsets
    pub is_empty: bool,
    /// At least one empty token was seen
    pub has_null_elements: bool,
    /// Number of empty tokens seen, nested groups included
    pub null_element_count: usize,
}

/// Canonical set: sorted unique elements plus sorted unique subsets.
#[derive(Clone)]
pub struct SetTree<T> {
    elements: OrderedCollection<T>,
    subsets: OrderedCollection<SetTree<T>>,
    null_element_count: usize,
}

impl<T> Default for SetTree<T> {
    fn default() -> Self {
        Self {
            elements: OrderedCollection::new(),
            subsets: OrderedCollection::new(),
            null_element_count: 0,
        }
    }
}

impl<T> SetTree<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Elements plus subsets.
    pub fn count(&self) -> usize {
        self.elements.len() + self.subsets.len()
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    pub fn subset_count(&self) -> usize {
        self.subsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty() && self.subsets.is_empty()
    }

    /// Root elements in ascending order.
    pub fn elements(&self) -> Iter<'_, T> {
        self.elements.iter()
    }

    /// Direct subsets in ascending tree order.
    pub fn subsets(&self) -> Iter<'_, SetTree<T>> {
        self.subsets.iter()
    }

    pub fn element_at(&self, index: usize) -> DomainResult<&T> {
        self.elements.at(index)
    }

    pub fn subset_at(&self, index: usize) -> DomainResult<&SetTree<T>> {
        self.subsets.at(index)
    }

    pub fn info(&self) -> SetInfo {
        SetInfo {
            is_empty: self.is_empty(),
            has_null_elements: self.null_element_count > 0,
            null_element_count: self.null_element_count,
        }
    }

    pub(crate) fn record_null_elements(&mut self, count: usize) {
        self.null_element_count += count;
    }

    /// Drops all elements and subsets; diagnostics are reset as well.
    pub fn clear(&mut self) {
        self.elements.clear();
        self.subsets.clear();
        self.null_element_count = 0;
    }
}

impl<T: Ord> SetTree<T> {
    /// Adds a root element; returns false if an equal one exists.
    pub fn add_element(&mut self, element: T) -> bool {
        self.elements.insert(element)
    }

    /// Adds a subset; returns false if an equal subtree exists.
    pub fn add_subtree(&mut self, subtree: SetTree<T>) -> bool {
        self.subsets.insert(subtree)
    }

    pub fn add_elements<I: IntoIterator<Item = T>>(&mut self, elements: I) -> usize {
        self.elements.extend_from(elements)
    }

    pub fn add_subtrees<I: IntoIterator<Item = SetTree<T>>>(&mut self, subtrees: I) -> usize {
        self.subsets.extend_from(subtrees)
    }

    pub fn remove_element(&mut self, element: &T) -> bool {
        self.elements.remove(element)
    }

    pub fn remove_subtree(&mut self, subtree: &SetTree<T>) -> bool {
        self.subsets.remove(subtree)
    }

    pub fn contains_element(&self, element: &T) -> bool {
        self.elements.contains(element)
    }

    pub fn contains_subtree(&self, subtree: &SetTree<T>) -> bool {
        self.subsets.contains(subtree)
    }

    /// Position of `element` in the unified index space.
    pub fn index_of_element(&self, element: &T) -> Option<usize> {
        self.elements.index_of(element)
    }

    /// Position of `subtree` in the unified index space (after all elements).
    pub fn index_of_subtree(&self, subtree: &SetTree<T>) -> Option<usize> {
        self.subsets
            .index_of(subtree)
            .map(|index| self.elements.len() + index)
    }

    pub fn compare(&self, other: &Self) -> Ordering {
        compare_trees(self, other)
    }
}

impl<T: fmt::Display> SetTree<T> {
    /// Canonical form: elements then subsets, joined by `delimiter`, in braces.
    #[instrument(level = "trace", skip(self))]
    pub fn render(&self, delimiter: &str) -> String {
        let body = self
            .elements
            .iter()
            .map(ToString::to_string)
            .chain(self.subsets.iter().map(|subset| subset.render(delimiter)))
            .join(delimiter);
        format!("{{{}}}", body)
    }
}

/// Total order over set trees.
///
/// Count first, then root element count, then elements pairwise, then
/// subsets pairwise (recursively). This is the order the subset collections
/// are sorted by, via `Ord for SetTree`.
pub fn compare_trees<T: Ord>(left: &SetTree<T>, right: &SetTree<T>) -> Ordering {
    left.count()
        .cmp(&right.count())
        .then_with(|| left.element_count().cmp(&right.element_count()))
        .then_with(|| left.elements().cmp(right.elements()))
        .then_with(|| left.subsets().cmp(right.subsets()))
}

impl<T: Ord> Ord for SetTree<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_trees(self, other)
    }
}

impl<T: Ord> PartialOrd for SetTree<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: Ord> PartialEq for SetTree<T> {
    fn eq(&self, other: &Self) -> bool {
        compare_trees(self, other) == Ordering::Equal
    }
}

impl<T: Ord> Eq for SetTree<T> {}

impl<T: fmt::Display> fmt::Display for SetTree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(DEFAULT_DELIMITER))
    }
}

impl<T: fmt::Debug> fmt::Debug for SetTree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetTree")
            .field("elements", &self.elements)
            .field("subsets", &self.subsets)
            .field("null_element_count", &self.null_element_count)
            .finish()
    }
}

impl<T: Ord> FromIterator<T> for SetTree<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.add_elements(iter);
        tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(elements: &[i32], subsets: Vec<SetTree<i32>>) -> SetTree<i32> {
        let mut tree: SetTree<i32> = elements.iter().copied().collect();
        tree.add_subtrees(subsets);
        tree
    }

    #[test]
    fn given_elements_and_subsets_when_rendering_then_elements_come_first() {
        let tree = set(&[3, 1], vec![set(&[4, 3], vec![]), set(&[], vec![])]);
        assert_eq!(tree.render(","), "{1,3,{},{3,4}}");
        assert_eq!(tree.render("; "), "{1; 3; {}; {3; 4}}");
        assert_eq!(tree.to_string(), "{1,3,{},{3,4}}");
    }

    #[test]
    fn given_empty_tree_when_rendering_then_returns_braces() {
        assert_eq!(SetTree::<i32>::new().to_string(), "{}");
        assert!(SetTree::<i32>::new().info().is_empty);
    }

    #[test]
    fn given_equal_subtree_when_adding_twice_then_count_unchanged() {
        let mut tree = set(&[1], vec![]);
        assert!(tree.add_subtree(set(&[2, 3], vec![])));
        assert!(!tree.add_subtree(set(&[3, 2], vec![])));
        assert!(!tree.add_element(1));
        assert_eq!(tree.count(), 2);
    }

    #[test]
    fn given_trees_when_comparing_then_follows_count_then_elements_then_subsets() {
        // fewer members first
        assert_eq!(set(&[9], vec![]).compare(&set(&[1, 2], vec![])), Ordering::Less);
        // same count, fewer root elements first
        assert_eq!(
            set(&[], vec![set(&[], vec![])]).compare(&set(&[5], vec![])),
            Ordering::Less
        );
        // same shape, first differing element decides
        assert_eq!(set(&[1, 3], vec![]).compare(&set(&[1, 2], vec![])), Ordering::Greater);
        // elements tie, subsets decide
        assert_eq!(
            set(&[1], vec![set(&[2], vec![])]).compare(&set(&[1], vec![set(&[3], vec![])])),
            Ordering::Less
        );
        assert_eq!(
            set(&[1], vec![set(&[2], vec![])]),
            set(&[1], vec![set(&[2], vec![])])
        );
    }

    #[test]
    fn given_elements_and_subsets_when_indexing_then_subsets_follow_elements() {
        let inner = set(&[7], vec![]);
        let tree = set(&[1, 2], vec![inner.clone()]);
        assert_eq!(tree.index_of_element(&2), Some(1));
        assert_eq!(tree.index_of_subtree(&inner), Some(2));
        assert_eq!(tree.index_of_subtree(&set(&[8], vec![])), None);
    }

    #[test]
    fn given_tree_when_removing_then_membership_updates() {
        let inner = set(&[7], vec![]);
        let mut tree = set(&[1, 2], vec![inner.clone()]);
        assert!(tree.remove_element(&1));
        assert!(!tree.remove_element(&1));
        assert!(tree.remove_subtree(&inner));
        assert!(!tree.contains_subtree(&inner));
        assert_eq!(tree.to_string(), "{2}");
    }

    #[test]
    fn given_null_diagnostics_when_comparing_then_ignored() {
        let mut left = set(&[1], vec![]);
        left.record_null_elements(2);
        let right = set(&[1], vec![]);
        assert_eq!(left, right);
        assert!(left.info().has_null_elements);
        assert_eq!(left.info().null_element_count, 2);
        assert!(!right.info().has_null_elements);
    }
}
