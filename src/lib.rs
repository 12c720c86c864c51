//! Canonical set trees.
//!
//! Parses brace-nested set notation such as `{1,2,{3,4}}` into a [`SetTree`]:
//! root elements and subsets, each kept sorted and free of duplicates by an
//! order-statistics red-black tree.
//!
//! ```
//! use settree::{Configuration, SetParser};
//!
//! let config = Configuration::new(",", true, false).unwrap();
//! let parser: SetParser<i64> = SetParser::new(config);
//! let tree = parser.parse("2,2,1,{4,3},3").unwrap();
//! assert_eq!(parser.render(&tree), "{1,2,3,{3,4}}");
//! ```

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod util;

pub use application::{
    ApplicationError, ApplicationResult, Configuration, ElementConverter, FnConverter,
    FromStrConverter, SetParser,
};
pub use domain::{
    compare_trees, Atom, DomainError, IndexedSet, IndexedView, Member, OrderedCollection,
    SetInfo, SetTree, ToTermTree,
};
