//! Domain layer: set trees and the collections backing them
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod atom;
pub mod display;
pub mod error;
pub mod ordered;
pub mod set_tree;
pub mod view;

pub use atom::Atom;
pub use display::ToTermTree;
pub use error::{DomainError, DomainResult};
pub use ordered::OrderedCollection;
pub use set_tree::{compare_trees, SetInfo, SetTree, DEFAULT_DELIMITER};
pub use view::{IndexedSet, IndexedView, Member};
