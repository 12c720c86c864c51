//! Positional access over a set in one unified index space.
//!
//! Elements occupy `0..element_count`, subsets follow. The view only uses the
//! [`IndexedSet`] capability, never the concrete tree type.

use std::fmt;

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::set_tree::SetTree;

/// Capability every set implementation provides for indexed access.
pub trait IndexedSet: Sized {
    type Element;

    fn element_count(&self) -> usize;
    fn subset_count(&self) -> usize;
    fn element_at(&self, index: usize) -> DomainResult<&Self::Element>;
    fn subset_at(&self, index: usize) -> DomainResult<&Self>;
    fn clear(&mut self);
}

impl<T> IndexedSet for SetTree<T> {
    type Element = T;

    fn element_count(&self) -> usize {
        SetTree::element_count(self)
    }

    fn subset_count(&self) -> usize {
        SetTree::subset_count(self)
    }

    fn element_at(&self, index: usize) -> DomainResult<&T> {
        SetTree::element_at(self, index)
    }

    fn subset_at(&self, index: usize) -> DomainResult<&Self> {
        SetTree::subset_at(self, index)
    }

    fn clear(&mut self) {
        SetTree::clear(self)
    }
}

/// Entry at a unified position.
pub enum Member<'a, S: IndexedSet> {
    Element(&'a S::Element),
    Subset(&'a S),
}

impl<S: IndexedSet> Clone for Member<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S: IndexedSet> Copy for Member<'_, S> {}

impl<S> fmt::Debug for Member<'_, S>
where
    S: IndexedSet + fmt::Debug,
    S::Element: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Member::Element(element) => f.debug_tuple("Element").field(element).finish(),
            Member::Subset(subset) => f.debug_tuple("Subset").field(subset).finish(),
        }
    }
}

pub struct IndexedView<'a, S> {
    set: &'a mut S,
}

impl<'a, S: IndexedSet> IndexedView<'a, S> {
    pub fn new(set: &'a mut S) -> Self {
        Self { set }
    }

    pub fn count(&self) -> usize {
        self.set.element_count() + self.set.subset_count()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    pub fn element_at(&self, index: usize) -> DomainResult<&S::Element> {
        self.set.element_at(index)
    }

    pub fn subtree_at(&self, index: usize) -> DomainResult<&S> {
        self.set.subset_at(index)
    }

    /// Member at unified position `index`.
    pub fn at(&self, index: usize) -> DomainResult<Member<'_, S>> {
        let elements = self.set.element_count();
        if index < elements {
            return self.set.element_at(index).map(Member::Element);
        }
        self.set
            .subset_at(index - elements)
            .map(Member::Subset)
            .map_err(|_| DomainError::OutOfRange {
                index,
                len: self.count(),
            })
    }

    /// Members in unified order.
    pub fn iter(&self) -> impl Iterator<Item = Member<'_, S>> + '_ {
        (0..self.count()).filter_map(move |index| self.at(index).ok())
    }

    pub fn clear(&mut self) {
        self.set.clear();
    }
}

impl<T> SetTree<T> {
    pub fn view(&mut self) -> IndexedView<'_, SetTree<T>> {
        IndexedView::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SetTree<i32> {
        let mut tree: SetTree<i32> = [3, 1, 2].into_iter().collect();
        tree.add_subtree([4, 5].into_iter().collect());
        tree.add_subtree(SetTree::new());
        tree
    }

    #[test]
    fn given_view_when_indexing_then_elements_precede_subsets() {
        let mut tree = sample();
        let view = tree.view();
        assert_eq!(view.count(), 5);
        assert!(matches!(view.at(0), Ok(Member::Element(&1))));
        assert!(matches!(view.at(2), Ok(Member::Element(&3))));
        match view.at(3) {
            Ok(Member::Subset(subset)) => assert_eq!(subset.to_string(), "{}"),
            other => panic!("expected empty subset, got {:?}", other),
        }
        match view.at(4) {
            Ok(Member::Subset(subset)) => assert_eq!(subset.to_string(), "{4,5}"),
            other => panic!("expected subset, got {:?}", other),
        }
        assert_eq!(
            view.at(5).err(),
            Some(DomainError::OutOfRange { index: 5, len: 5 })
        );
    }

    #[test]
    fn given_view_when_accessing_by_kind_then_checks_each_range() {
        let mut tree = sample();
        let view = IndexedView::new(&mut tree);
        assert_eq!(view.element_at(2), Ok(&3));
        assert!(view.element_at(3).is_err());
        assert_eq!(view.subtree_at(1).map(|s| s.to_string()), Ok("{4,5}".to_string()));
        assert!(view.subtree_at(2).is_err());
        assert_eq!(view.iter().count(), 5);
    }

    #[test]
    fn given_view_when_clearing_then_tree_is_empty() {
        let mut tree = sample();
        let mut view = tree.view();
        view.clear();
        assert!(view.is_empty());
        assert!(tree.is_empty());
    }
}
