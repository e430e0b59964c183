//! Search query engine for hierarchical outlines.
//!
//! This crate provides the item graph of a personal outline ([`Outline`],
//! [`ItemRef`]) and a small query language that filters it by text, fuzzy
//! match, attributes, dates, depth and tree relationships. See the [`query`]
//! module for the syntax.
//!
//! ```
//! use outline_query_rs::{parse_query, Item, Outline};
//!
//! let mut outline = Outline::new();
//! let root = outline.push_root(Item::new("Inbox"));
//! let task = outline.push_child(root, Item::new("call the bank"));
//!
//! let expr = parse_query("bank d:>0").unwrap();
//! assert!(expr.matches(outline.get(task).unwrap()));
//! assert!(!expr.matches(outline.get(root).unwrap()));
//! ```

pub mod outline;
pub mod query;

pub use outline::{Item, ItemId, ItemRef, Metadata, NodeId, Outline};
pub use query::{
    debug_match, expression_string, format_debug_info, fuzzy_match_positions,
    get_first_matching_item, get_matching_items, parse_query, FilterExpr, MatchDebug,
    QueryError, QueryParser, QueryResult,
};
