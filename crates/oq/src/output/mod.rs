//! Output formatting utilities for the oq CLI.
//!
//! - [`items`] - Search results (indented list, single item, JSON)
//! - [`explain`] - Explain and parse command output
//! - [`helpers`] - Common formatting utilities (highlighting, truncation)

mod explain;
pub mod helpers;
mod items;

pub use explain::{format_explain_json, format_explain_text, format_parse_json};
pub use items::{format_item_details, format_items_json, format_items_table};
