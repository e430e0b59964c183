//! Read-only item graph that queries are evaluated against.
//!
//! An [`Outline`] is an arena of nodes. Each node owns an [`Item`] and knows
//! its parent and its ordered children. Queries never hold `&Item` directly;
//! they walk the graph through [`ItemRef`], a cheap `Copy` handle borrowing
//! the outline.
//!
//! # Example
//!
//! ```
//! use outline_query_rs::{Item, Outline};
//!
//! let mut outline = Outline::new();
//! let project = outline.push_root(Item::new("Project"));
//! let task = outline.push_child(project, Item::new("Write report"));
//!
//! let task = outline.get(task).unwrap();
//! assert_eq!(task.depth(), 1);
//! assert_eq!(task.parent().map(|p| p.text()), Some("Project"));
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub Uuid);

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl ItemId {
    /// Generates a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ItemId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Metadata attached to an item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Free-form `key -> value` attributes (`@status=done`).
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,

    /// Tags attached to the item.
    #[serde(default)]
    pub tags: Vec<String>,

    /// Creation time. `None` means the timestamp was never recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,

    /// Last modification time. `None` means the timestamp was never recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
}

/// A single outline entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub text: String,
    #[serde(default)]
    pub metadata: Metadata,
}

impl Item {
    /// Creates an item with a fresh id and empty metadata.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: ItemId::new(),
            text: text.into(),
            metadata: Metadata::default(),
        }
    }

    /// Sets an attribute, returning the item for chaining.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.attributes.insert(key.into(), value.into());
        self
    }

    /// Adds a tag, returning the item for chaining.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.metadata.tags.push(tag.into());
        self
    }

    pub fn with_created(mut self, created: DateTime<Utc>) -> Self {
        self.metadata.created = Some(created);
        self
    }

    pub fn with_modified(mut self, modified: DateTime<Utc>) -> Self {
        self.metadata.modified = Some(modified);
        self
    }
}

/// Position of a node inside an [`Outline`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
struct Node {
    item: Item,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// A forest of items.
#[derive(Debug, Clone, Default)]
pub struct Outline {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
}

impl Outline {
    /// Creates an empty outline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a top-level item.
    pub fn push_root(&mut self, item: Item) -> NodeId {
        let id = self.insert(item, None);
        self.roots.push(id);
        id
    }

    /// Appends `item` as the last child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics if `parent` does not belong to this outline.
    pub fn push_child(&mut self, parent: NodeId, item: Item) -> NodeId {
        let id = self.insert(item, Some(parent));
        self.nodes[parent.0].children.push(id);
        id
    }

    fn insert(&mut self, item: Item, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            item,
            parent,
            children: Vec::new(),
        });
        id
    }

    /// Returns a handle to the node, or `None` if the id is out of range.
    pub fn get(&self, id: NodeId) -> Option<ItemRef<'_>> {
        (id.0 < self.nodes.len()).then_some(ItemRef { outline: self, id })
    }

    /// Finds the first item (in traversal order) with the given id.
    pub fn find(&self, item_id: ItemId) -> Option<ItemRef<'_>> {
        self.all_items().into_iter().find(|i| i.item().id == item_id)
    }

    /// Top-level items, in order.
    pub fn roots(&self) -> impl Iterator<Item = ItemRef<'_>> + '_ {
        self.roots.iter().map(move |&id| ItemRef { outline: self, id })
    }

    /// Every item, depth-first with parents before their children.
    pub fn all_items(&self) -> Vec<ItemRef<'_>> {
        let mut out = Vec::with_capacity(self.nodes.len());
        for root in self.roots() {
            out.push(root);
            root.collect_descendants(&mut out);
        }
        out
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }
}

/// Borrowed handle to an item and its position in the outline.
#[derive(Clone, Copy)]
pub struct ItemRef<'a> {
    outline: &'a Outline,
    id: NodeId,
}

impl<'a> ItemRef<'a> {
    pub fn node_id(&self) -> NodeId {
        self.id
    }

    pub fn item(&self) -> &'a Item {
        &self.outline.node(self.id).item
    }

    pub fn text(&self) -> &'a str {
        &self.item().text
    }

    pub fn metadata(&self) -> &'a Metadata {
        &self.item().metadata
    }

    /// The immediate parent, or `None` for a root.
    pub fn parent(&self) -> Option<ItemRef<'a>> {
        self.outline.node(self.id).parent.map(|id| ItemRef {
            outline: self.outline,
            id,
        })
    }

    /// Immediate children, in order.
    pub fn children(&self) -> impl Iterator<Item = ItemRef<'a>> + 'a {
        let outline = self.outline;
        outline
            .node(self.id)
            .children
            .iter()
            .map(move |&id| ItemRef { outline, id })
    }

    pub fn child_count(&self) -> usize {
        self.outline.node(self.id).children.len()
    }

    /// Parent, grandparent, ... up to the root.
    pub fn ancestors(&self) -> Ancestors<'a> {
        Ancestors {
            next: self.parent(),
        }
    }

    /// Whole subtree below this item in pre-order, excluding the item itself.
    pub fn descendants(&self) -> Vec<ItemRef<'a>> {
        let mut out = Vec::new();
        self.collect_descendants(&mut out);
        out
    }

    fn collect_descendants(&self, out: &mut Vec<ItemRef<'a>>) {
        for child in self.children() {
            out.push(child);
            child.collect_descendants(out);
        }
    }

    /// Other children of the same parent. Roots have no siblings.
    pub fn siblings(&self) -> impl Iterator<Item = ItemRef<'a>> + 'a {
        let me = self.id;
        self.parent()
            .into_iter()
            .flat_map(|parent| parent.children())
            .filter(move |sibling| sibling.id != me)
    }

    /// Number of parent hops to the root; roots have depth 0.
    pub fn depth(&self) -> usize {
        self.ancestors().count()
    }
}

impl fmt::Debug for ItemRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemRef")
            .field("node", &self.id)
            .field("text", &self.text())
            .finish()
    }
}

impl PartialEq for ItemRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.outline, other.outline) && self.id == other.id
    }
}

impl Eq for ItemRef<'_> {}

/// Iterator over an item's ancestors, nearest first.
#[derive(Debug, Clone)]
pub struct Ancestors<'a> {
    next: Option<ItemRef<'a>>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = ItemRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.parent();
        Some(current)
    }
}
