//! Human-readable diagnostics for queries.
//!
//! Nothing here affects matching: [`debug_match`] reports the same verdict as
//! [`FilterExpr::matches`] and narrates how it was reached.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use chrono::{DateTime, Local};
use serde::Serialize;

use super::ast::{DateField, FilterExpr, Quantifier};
use super::dates::parse_stored_date;
use super::evaluator::fuzzy_match_positions;
use crate::outline::ItemRef;

/// Outcome of [`debug_match`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchDebug {
    /// Same verdict as [`FilterExpr::matches`].
    pub matched: bool,
    /// Narration of the evaluation.
    pub reason: String,
    /// Snapshot of the item fields the query language can see.
    pub details: BTreeMap<String, String>,
}

/// Pretty-prints a filter as an indented s-expression.
///
/// ```
/// use outline_query_rs::{expression_string, parse_query};
///
/// let expr = parse_query("task d:>0").unwrap();
/// assert_eq!(expression_string(&expr), "(and\n  (text \"task\")\n  (depth > 0))");
/// ```
pub fn expression_string(expr: &FilterExpr) -> String {
    let mut out = String::new();
    write_sexpr(expr, 0, &mut out);
    out
}

fn write_sexpr(expr: &FilterExpr, indent: usize, out: &mut String) {
    let (head, children) = sexpr_parts(expr);
    out.push_str(&"  ".repeat(indent));
    out.push('(');
    out.push_str(&head);
    for child in children {
        out.push('\n');
        write_sexpr(child, indent + 1, out);
    }
    out.push(')');
}

/// Head of a node's s-expression and its sub-expressions.
fn sexpr_parts(expr: &FilterExpr) -> (String, Vec<&FilterExpr>) {
    match expr {
        FilterExpr::AlwaysMatch => ("always".to_string(), vec![]),
        FilterExpr::Text(term) => (format!("text {term:?}"), vec![]),
        FilterExpr::Fuzzy(term) => (format!("fuzzy {term:?}"), vec![]),
        FilterExpr::Regex(pattern) => (format!("regex {:?}", pattern.as_str()), vec![]),
        FilterExpr::Attribute { key, op: None, .. } => (format!("attr {key} exists"), vec![]),
        FilterExpr::Attribute {
            key,
            op: Some(op),
            value,
        } => (format!("attr {key} {op} {value:?}"), vec![]),
        FilterExpr::AttributeDate { key, op, value } => {
            (format!("attr-date {key} {op} {value}"), vec![])
        }
        FilterExpr::Depth { op, value } => (format!("depth {op} {value}"), vec![]),
        FilterExpr::Children { op, count } => (format!("children {op} {count}"), vec![]),
        FilterExpr::Date { field, op, value } => {
            (format!("date {} {op} {value}", field.name()), vec![])
        }
        FilterExpr::Parent(inner) => ("parent".to_string(), vec![inner.as_ref()]),
        FilterExpr::Ancestor(inner, q) => (format!("ancestor {}", q.name()), vec![inner.as_ref()]),
        FilterExpr::Child(inner, q) => (format!("child {}", q.name()), vec![inner.as_ref()]),
        FilterExpr::Descendant(inner, q) => {
            (format!("descendant {}", q.name()), vec![inner.as_ref()])
        }
        FilterExpr::Sibling(inner, q) => (format!("sibling {}", q.name()), vec![inner.as_ref()]),
        FilterExpr::And(left, right) => ("and".to_string(), vec![left.as_ref(), right.as_ref()]),
        FilterExpr::Or(left, right) => ("or".to_string(), vec![left.as_ref(), right.as_ref()]),
        FilterExpr::Not(inner) => ("not".to_string(), vec![inner.as_ref()]),
    }
}

/// Evaluates `expr` against `item` and explains the verdict.
pub fn debug_match(item: ItemRef<'_>, expr: &FilterExpr) -> MatchDebug {
    let now = Local::now();
    MatchDebug {
        matched: expr.matches_at(item, now),
        reason: describe(expr, item, now),
        details: item_details(item),
    }
}

/// Renders a [`MatchDebug`] as multi-line text.
pub fn format_debug_info(debug: &MatchDebug) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "matched: {}", yes_no(debug.matched));
    let _ = writeln!(out, "reason: {}", debug.reason);
    out.push_str("details:\n");
    for (key, value) in &debug.details {
        let _ = writeln!(out, "  {key}: {value}");
    }
    out
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

fn describe(expr: &FilterExpr, item: ItemRef<'_>, now: DateTime<Local>) -> String {
    match expr {
        FilterExpr::AlwaysMatch => "empty query matches everything".to_string(),
        FilterExpr::Text(term) => {
            let verb = if expr.matches_at(item, now) {
                "contains"
            } else {
                "does not contain"
            };
            format!("text {verb} {term:?}")
        }
        FilterExpr::Fuzzy(term) => match fuzzy_match_positions(term, item.text()) {
            Some(positions) => format!("fuzzy {term:?} matched at {positions:?}"),
            None => format!("fuzzy {term:?} not found in order"),
        },
        FilterExpr::Regex(pattern) => format!(
            "regex /{}/ matched: {}",
            pattern.as_str(),
            yes_no(pattern.is_match(item.text()))
        ),
        FilterExpr::Attribute { key, op, value } => {
            let stored = item.metadata().attributes.get(key);
            let verdict = yes_no(expr.matches_at(item, now));
            match (op, stored) {
                (None, Some(_)) => format!("attribute @{key} present"),
                (None, None) => format!("attribute @{key} absent"),
                (Some(op), None) => {
                    format!("@{key} {op} {value:?}: attribute missing -> {verdict}")
                }
                (Some(op), Some(stored)) => {
                    format!("@{key} {op} {value:?}: stored {stored:?} -> {verdict}")
                }
            }
        }
        FilterExpr::AttributeDate { key, op, value } => {
            let verdict = yes_no(expr.matches_at(item, now));
            match item.metadata().attributes.get(key) {
                None => format!("@{key} {op} {value}: attribute missing -> no"),
                Some(stored) if parse_stored_date(stored, now).is_none() => {
                    format!("@{key} {op} {value}: stored {stored:?} is not a date -> no")
                }
                Some(stored) => format!("@{key} {op} {value}: stored {stored:?} -> {verdict}"),
            }
        }
        FilterExpr::Depth { op, value } => format!(
            "depth {} {op} {value} -> {}",
            item.depth(),
            yes_no(expr.matches_at(item, now))
        ),
        FilterExpr::Children { op, count } => format!(
            "children {} {op} {count} -> {}",
            item.child_count(),
            yes_no(expr.matches_at(item, now))
        ),
        FilterExpr::Date { field, op, value } => {
            let stamp = match field {
                DateField::Created => item.metadata().created,
                DateField::Modified => item.metadata().modified,
            };
            match stamp {
                None => format!("{} {op} {value}: timestamp unset -> no", field.name()),
                Some(stamp) => format!(
                    "{} {} {op} {value} -> {}",
                    field.name(),
                    stamp.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
                    yes_no(expr.matches_at(item, now))
                ),
            }
        }
        FilterExpr::Parent(inner) => match item.parent() {
            None => "no parent -> no".to_string(),
            Some(parent) => format!(
                "parent {:?}: {}",
                parent.text(),
                describe(inner, parent, now)
            ),
        },
        FilterExpr::Ancestor(inner, q) => {
            describe_quantified("ancestors", *q, item.ancestors(), inner, expr, item, now)
        }
        FilterExpr::Child(inner, q) => {
            describe_quantified("children", *q, item.children(), inner, expr, item, now)
        }
        FilterExpr::Descendant(inner, q) => {
            describe_quantified("descendants", *q, item.descendants(), inner, expr, item, now)
        }
        FilterExpr::Sibling(inner, q) => {
            describe_quantified("siblings", *q, item.siblings(), inner, expr, item, now)
        }
        FilterExpr::And(left, right) => format!(
            "({}) AND ({})",
            describe(left, item, now),
            describe(right, item, now)
        ),
        FilterExpr::Or(left, right) => format!(
            "({}) OR ({})",
            describe(left, item, now),
            describe(right, item, now)
        ),
        FilterExpr::Not(inner) => format!(
            "NOT ({}) -> {}",
            describe(inner, item, now),
            yes_no(expr.matches_at(item, now))
        ),
    }
}

fn describe_quantified<'a>(
    set: &str,
    quantifier: Quantifier,
    candidates: impl IntoIterator<Item = ItemRef<'a>>,
    inner: &FilterExpr,
    expr: &FilterExpr,
    item: ItemRef<'_>,
    now: DateTime<Local>,
) -> String {
    let (total, matched) = candidates
        .into_iter()
        .fold((0usize, 0usize), |(total, matched), c| {
            (total + 1, matched + usize::from(inner.matches_at(c, now)))
        });
    let matches = expr.matches_at(item, now);
    let verdict = yes_no(matches);
    let note = if total == 0 && quantifier == Quantifier::All {
        if matches {
            " (vacuously true)"
        } else {
            " (empty set)"
        }
    } else {
        ""
    };
    format!(
        "{} {set}: {matched}/{total} match {inner} -> {verdict}{note}",
        quantifier.name()
    )
}

fn item_details(item: ItemRef<'_>) -> BTreeMap<String, String> {
    let metadata = item.metadata();
    let format_stamp = |stamp: Option<DateTime<chrono::Utc>>| {
        stamp
            .map(|s| s.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "(unset)".to_string())
    };

    let mut details = BTreeMap::new();
    details.insert("text".to_string(), item.text().to_string());
    details.insert("depth".to_string(), item.depth().to_string());
    details.insert("children".to_string(), item.child_count().to_string());
    details.insert(
        "parent".to_string(),
        item.parent()
            .map(|p| p.text().to_string())
            .unwrap_or_else(|| "(none)".to_string()),
    );
    details.insert("created".to_string(), format_stamp(metadata.created));
    details.insert("modified".to_string(), format_stamp(metadata.modified));
    details.insert("tags".to_string(), metadata.tags.join(", "));
    for (key, value) in &metadata.attributes {
        details.insert(format!("attr.{key}"), value.clone());
    }
    details
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outline::{Item, Outline};
    use crate::query::parse_query;

    #[test]
    fn test_expression_string_nested() {
        let expr = parse_query("(task | project) -+child:@status=done").unwrap();
        let expected = "\
(and
  (or
    (text \"task\")
    (text \"project\"))
  (not
    (child all
      (attr status = \"done\"))))";
        assert_eq!(expression_string(&expr), expected);
    }

    #[test]
    fn test_expression_string_is_stable() {
        let expr = parse_query("~rpt d:>=1 @due<2025-01-01").unwrap();
        assert_eq!(expression_string(&expr), expression_string(&expr));
        assert_eq!(
            expression_string(&parse_query("~rpt d:>=1 @due<2025-01-01").unwrap()),
            expression_string(&expr)
        );
    }

    #[test]
    fn test_debug_match_reports_same_verdict() {
        let mut outline = Outline::new();
        let root = outline.push_root(Item::new("Project").with_attribute("status", "open"));
        let child = outline.push_child(root, Item::new("task one"));
        let child = outline.get(child).unwrap();

        let expr = parse_query("task parent:@status=open").unwrap();
        let debug = debug_match(child, &expr);

        assert!(debug.matched);
        assert!(debug.reason.contains("text contains \"task\""));
        assert!(debug.reason.contains("parent \"Project\""));
        assert_eq!(debug.details["depth"], "1");
        assert_eq!(debug.details["parent"], "Project");
        assert_eq!(debug.details["created"], "(unset)");
    }

    #[test]
    fn test_debug_match_vacuous_note() {
        let mut outline = Outline::new();
        let root = outline.push_root(Item::new("root"));
        let root = outline.get(root).unwrap();

        let ancestors = debug_match(root, &parse_query("+parent*:x").unwrap());
        assert!(ancestors.matched);
        assert!(ancestors.reason.contains("vacuously true"));

        let children = debug_match(root, &parse_query("+child:x").unwrap());
        assert!(!children.matched);
        assert!(children.reason.contains("empty set"));
    }

    #[test]
    fn test_format_debug_info_lists_details() {
        let mut outline = Outline::new();
        let id = outline.push_root(Item::new("note").with_attribute("status", "done"));
        let item = outline.get(id).unwrap();

        let text = format_debug_info(&debug_match(item, &FilterExpr::AlwaysMatch));
        assert!(text.starts_with("matched: yes\n"));
        assert!(text.contains("  attr.status: done\n"));
        assert!(text.contains("  parent: (none)\n"));
    }

    #[test]
    fn test_match_debug_serializes_flat_fields() {
        let mut outline = Outline::new();
        let id = outline.push_root(Item::new("note"));
        let debug = debug_match(outline.get(id).unwrap(), &parse_query("note").unwrap());

        let value = serde_json::to_value(&debug).unwrap();
        assert_eq!(value["matched"], true);
        assert_eq!(value["reason"], debug.reason.as_str());
        assert_eq!(value["details"]["depth"], "0");
    }
}
