//! Search result output formatting.

use std::collections::BTreeMap;

use outline_query_rs::{FilterExpr, ItemRef};
use owo_colors::OwoColorize;
use serde::Serialize;

use super::helpers::{format_datetime, format_metadata, highlight, indent, truncate_id};

/// JSON output structure for the search command.
#[derive(Serialize)]
pub struct SearchOutput<'a> {
    pub query: &'a str,
    pub items: Vec<ItemOutput<'a>>,
    /// Number of matches before the limit was applied.
    pub total: usize,
    pub has_more: bool,
}

/// JSON output structure for a single item.
#[derive(Serialize)]
pub struct ItemOutput<'a> {
    pub id: String,
    pub text: &'a str,
    pub depth: usize,
    /// Texts of the ancestors, root first.
    pub path: Vec<&'a str>,
    pub children: usize,
    #[serde(skip_serializing_if = "is_empty_map")]
    pub attributes: &'a BTreeMap<String, String>,
    #[serde(skip_serializing_if = "is_empty_slice")]
    pub tags: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,
    /// Characters matched by text and fuzzy terms.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub highlights: Vec<usize>,
}

fn is_empty_map(map: &&BTreeMap<String, String>) -> bool {
    map.is_empty()
}

fn is_empty_slice(tags: &&[String]) -> bool {
    tags.is_empty()
}

impl<'a> ItemOutput<'a> {
    pub fn new(item: ItemRef<'a>, expr: &FilterExpr) -> Self {
        let metadata = item.metadata();
        let mut path: Vec<&str> = item.ancestors().map(|a| a.text()).collect();
        path.reverse();

        Self {
            id: item.item().id.to_string(),
            text: item.text(),
            depth: item.depth(),
            path,
            children: item.child_count(),
            attributes: &metadata.attributes,
            tags: &metadata.tags,
            created: metadata.created.map(|dt| dt.to_rfc3339()),
            modified: metadata.modified.map(|dt| dt.to_rfc3339()),
            highlights: expr.highlight_positions(item.text()),
        }
    }
}

/// Formats search results as JSON.
pub fn format_items_json(
    query: &str,
    items: &[ItemRef<'_>],
    expr: &FilterExpr,
    total: usize,
) -> Result<String, serde_json::Error> {
    let output = SearchOutput {
        query,
        items: items.iter().map(|item| ItemOutput::new(*item, expr)).collect(),
        total,
        has_more: total > items.len(),
    };
    serde_json::to_string_pretty(&output)
}

/// Formats search results as an indented list.
///
/// Each line is indented by the item's depth and shows the item text with
/// matched characters highlighted, followed by its attributes and tags.
pub fn format_items_table(
    items: &[ItemRef<'_>],
    expr: &FilterExpr,
    total: usize,
    use_colors: bool,
) -> String {
    if items.is_empty() {
        return "No matching items.\n".to_string();
    }

    let mut output = String::new();
    for item in items {
        let positions = expr.highlight_positions(item.text());
        let text = highlight(item.text(), &positions, use_colors);
        let metadata = item.metadata();
        let meta = format_metadata(&metadata.attributes, &metadata.tags);

        output.push_str(&indent(item.depth()));
        output.push_str(&text);
        if !meta.is_empty() {
            output.push_str("  ");
            if use_colors {
                output.push_str(&meta.dimmed().to_string());
            } else {
                output.push_str(&meta);
            }
        }
        output.push('\n');
    }

    if total > items.len() {
        let more = format!("... {} more (use --all to show everything)", total - items.len());
        if use_colors {
            output.push_str(&more.dimmed().to_string());
        } else {
            output.push_str(&more);
        }
        output.push('\n');
    }

    output
}

/// Formats a single item with all of its fields (used by `search --first`).
pub fn format_item_details(item: ItemRef<'_>, expr: &FilterExpr, use_colors: bool) -> String {
    let metadata = item.metadata();
    let positions = expr.highlight_positions(item.text());
    let mut lines = vec![highlight(item.text(), &positions, use_colors)];

    let mut field = |name: &str, value: String| {
        let label = format!("{name}:");
        if use_colors {
            lines.push(format!("  {:<10} {value}", label.dimmed()));
        } else {
            lines.push(format!("  {label:<10} {value}"));
        }
    };

    field("id", truncate_id(&item.item().id.to_string()));
    field("depth", item.depth().to_string());
    if let Some(parent) = item.parent() {
        field("parent", parent.text().to_string());
    }
    field("children", item.child_count().to_string());
    let meta = format_metadata(&metadata.attributes, &metadata.tags);
    if !meta.is_empty() {
        field("metadata", meta);
    }
    if let Some(created) = &metadata.created {
        field("created", format_datetime(created));
    }
    if let Some(modified) = &metadata.modified {
        field("modified", format_datetime(modified));
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}
