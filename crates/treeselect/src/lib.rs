//! CSS-style selector queries over any read-only node tree.
//!
//! A query such as `div.note > p:nth-child(2n+1)` is compiled into an [`Evaluator`] tree and
//! matched against every element reachable from one or more scope roots. Results are
//! elements in document order without duplicates.
//!
//! The tree is supplied by the caller through the [`SelectNode`] trait; the crate ships a
//! small reference implementation in [`simple_node`].
//!
//! ```
//! use treeselect::simple_node::{doc, elem, text};
//! use treeselect::{SelectNode, Selector};
//!
//! let document = doc()
//!     .child(
//!         elem("ul")
//!             .child(elem("li").child(text("one")))
//!             .child(elem("li").class("done").child(text("two")))
//!             .child(elem("li").child(text("three"))),
//!     )
//!     .build();
//!
//! let open = Selector::compile("li:not(.done)").unwrap();
//! let texts: Vec<String> = open.select(&document).iter().map(SelectNode::text).collect();
//! assert_eq!(texts, ["one", "three"]);
//! ```
//!
//! Supported syntax: type (`tag`, `ns|tag`, `*|tag`, `ns|*`, `*`), `#id`, `.class`,
//! attributes (`[a]`, `[^prefix]`, `[a=v]`, `[a!=v]`, `[a^=v]`, `[a$=v]`, `[a*=v]`,
//! `[a~=regex]`), combinators (descendant, `>`, `+`, `~`), groups (`,`) and the
//! pseudo-classes `:lt :gt :eq :has :not :is :contains :containsOwn :containsWholeText
//! :containsWholeOwnText :matches :matchesOwn :matchesWholeText :matchesWholeOwnText
//! :root :scope :empty :first-child :last-child :first-of-type :last-of-type :only-child
//! :only-of-type :nth-child :nth-last-child :nth-of-type :nth-last-of-type`.
pub mod collector;
pub mod compiler;
pub mod error;
pub mod evaluator;
pub mod model;
pub mod options;
pub mod scanner;
pub mod select;
pub mod simple_node;

pub use collector::NodeSet;
pub use compiler::compile;
pub use error::{Error, ErrorKind, ParseError, ParseErrorCode, Result, ValidationError};
pub use evaluator::{Evaluator, MatchContext};
pub use model::{NodeKind, QName, SelectNode};
pub use options::{CaseSensitivity, SelectOptions};
pub use select::{Selector, select, select_all, select_all_with, select_first, select_with};
pub use simple_node::{SimpleNode, SimpleNodeBuilder};
