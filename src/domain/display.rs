/*
Structural display of a set tree. Each node is labelled with its root
elements; subsets hang below as branches, in canonical order.
 */
use std::fmt;

use termtree::Tree;
use tracing::instrument;

use crate::domain::set_tree::SetTree;

pub trait ToTermTree {
    fn to_term_tree(&self, delimiter: &str) -> Tree<String>;
}

impl<T: fmt::Display> ToTermTree for SetTree<T> {
    #[instrument(level = "trace", skip(self))]
    fn to_term_tree(&self, delimiter: &str) -> Tree<String> {
        let label = if self.element_count() == 0 {
            "{}".to_string()
        } else {
            let elements: Vec<String> = self.elements().map(ToString::to_string).collect();
            format!("{{{}}}", elements.join(delimiter))
        };

        let leaves: Vec<_> = self
            .subsets()
            .map(|subset| subset.to_term_tree(delimiter))
            .collect();

        Tree::new(label).with_leaves(leaves)
    }
}
