//! Outline documents on disk.
//!
//! A document is a JSON array of nested nodes:
//!
//! ```json
//! [
//!   {
//!     "text": "Project",
//!     "attributes": { "status": "active" },
//!     "created": "2025-10-01T09:00:00Z",
//!     "children": [{ "text": "task", "tags": ["errand"] }]
//!   }
//! ]
//! ```
//!
//! Only `text` is required. Nodes without an `id` get a fresh one.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use outline_query_rs::{Item, ItemId, Metadata, NodeId, Outline};
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur while loading an outline document.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// I/O error during file read.
    #[error("failed to read outline file '{path}': {source}")]
    ReadError {
        /// The path that failed to read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The file is not a valid outline document.
    #[error("failed to parse outline file '{path}': {source}")]
    ParseError {
        /// The path that failed to parse.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Two nodes share an id.
    #[error("duplicate item id {id} in outline file '{path}'")]
    DuplicateId { path: PathBuf, id: ItemId },
}

/// One node of an outline document.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DocumentNode {
    #[serde(default)]
    id: Option<Uuid>,
    text: String,
    #[serde(default)]
    attributes: BTreeMap<String, String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    created: Option<DateTime<Utc>>,
    #[serde(default)]
    modified: Option<DateTime<Utc>>,
    #[serde(default)]
    children: Vec<DocumentNode>,
}

impl DocumentNode {
    fn into_parts(self) -> (Item, Vec<DocumentNode>) {
        let item = Item {
            id: self.id.map(ItemId).unwrap_or_default(),
            text: self.text,
            metadata: Metadata {
                attributes: self.attributes,
                tags: self.tags,
                created: self.created,
                modified: self.modified,
            },
        };
        (item, self.children)
    }
}

/// Reads and parses the outline document at `path`.
pub fn load_outline(path: &Path) -> Result<Outline, DocumentError> {
    let content = fs::read_to_string(path).map_err(|source| DocumentError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;
    let outline = parse_outline(&content, path)?;
    tracing::debug!(path = %path.display(), items = outline.len(), "loaded outline");
    Ok(outline)
}

/// Parses outline JSON. `path` is only used in error messages.
pub fn parse_outline(content: &str, path: &Path) -> Result<Outline, DocumentError> {
    let roots: Vec<DocumentNode> =
        serde_json::from_str(content).map_err(|source| DocumentError::ParseError {
            path: path.to_path_buf(),
            source,
        })?;

    let mut outline = Outline::new();
    let mut seen = HashSet::new();
    // (parent, node) pairs in document order; reversed so pop() yields the next one.
    let mut pending: Vec<(Option<NodeId>, DocumentNode)> =
        roots.into_iter().rev().map(|node| (None, node)).collect();

    while let Some((parent, node)) = pending.pop() {
        let (item, children) = node.into_parts();
        if !seen.insert(item.id) {
            return Err(DocumentError::DuplicateId {
                path: path.to_path_buf(),
                id: item.id,
            });
        }
        let id = match parent {
            Some(parent) => outline.push_child(parent, item),
            None => outline.push_root(item),
        };
        pending.extend(children.into_iter().rev().map(|child| (Some(id), child)));
    }

    Ok(outline)
}
