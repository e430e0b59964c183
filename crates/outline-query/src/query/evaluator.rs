//! Filter evaluation against outline items.
//!
//! Evaluation is a pure read of the outline. "Now" is sampled once per
//! [`FilterExpr::matches`] call so relative dates track the wall clock.

use chrono::{DateTime, Local};

use super::ast::{ComparisonOp, DateField, FilterExpr, Quantifier};
use super::dates::{compare_dates, parse_stored_date, DateValue};
use crate::outline::ItemRef;

impl FilterExpr {
    /// Returns true if the item matches the filter.
    pub fn matches(&self, item: ItemRef<'_>) -> bool {
        self.matches_at(item, Local::now())
    }

    /// Like [`matches`](Self::matches), with relative dates resolved against
    /// `now`.
    pub fn matches_at(&self, item: ItemRef<'_>, now: DateTime<Local>) -> bool {
        match self {
            FilterExpr::AlwaysMatch => true,
            FilterExpr::Text(term) => contains_ignore_case(item.text(), term),
            FilterExpr::Fuzzy(term) => fuzzy_match_positions(term, item.text()).is_some(),
            FilterExpr::Regex(pattern) => pattern.is_match(item.text()),
            FilterExpr::Attribute { key, op, value } => {
                let stored = item.metadata().attributes.get(key);
                match (op, stored) {
                    (None, stored) => stored.is_some(),
                    (Some(ComparisonOp::Neq), None) => true,
                    (Some(_), None) => false,
                    (Some(op), Some(stored)) => op.compare(stored.as_str(), value.as_str()),
                }
            }
            FilterExpr::AttributeDate { key, op, value } => item
                .metadata()
                .attributes
                .get(key)
                .and_then(|stored| parse_stored_date(stored, now))
                .is_some_and(|stored| date_matches(*op, stored, value, now)),
            FilterExpr::Depth { op, value } => op.compare(&item.depth(), value),
            FilterExpr::Children { op, count } => op.compare(&item.child_count(), count),
            FilterExpr::Date { field, op, value } => {
                let metadata = item.metadata();
                let stamp = match field {
                    DateField::Created => metadata.created,
                    DateField::Modified => metadata.modified,
                };
                stamp.is_some_and(|stamp| {
                    date_matches(*op, stamp.with_timezone(&Local), value, now)
                })
            }
            FilterExpr::Parent(inner) => item
                .parent()
                .is_some_and(|parent| inner.matches_at(parent, now)),
            FilterExpr::Ancestor(inner, q) => quantify(*q, true, item.ancestors(), inner, now),
            FilterExpr::Child(inner, q) => quantify(*q, false, item.children(), inner, now),
            FilterExpr::Descendant(inner, q) => {
                quantify(*q, false, item.descendants(), inner, now)
            }
            FilterExpr::Sibling(inner, q) => quantify(*q, false, item.siblings(), inner, now),
            FilterExpr::And(left, right) => {
                left.matches_at(item, now) && right.matches_at(item, now)
            }
            FilterExpr::Or(left, right) => {
                left.matches_at(item, now) || right.matches_at(item, now)
            }
            FilterExpr::Not(inner) => !inner.matches_at(item, now),
        }
    }

    /// Character positions in `text` consumed by a fuzzy filter, for
    /// highlighting. Empty for every other variant or when `text` does not
    /// match.
    pub fn match_positions(&self, text: &str) -> Vec<usize> {
        match self {
            FilterExpr::Fuzzy(term) => fuzzy_match_positions(term, text).unwrap_or_default(),
            _ => Vec::new(),
        }
    }

    /// Character positions in `text` to highlight for the item-text terms of
    /// this query, merging every `Text` and `Fuzzy` leaf reachable through
    /// `And`/`Or`. Negated and relationship subtrees never contribute.
    pub fn highlight_positions(&self, text: &str) -> Vec<usize> {
        let mut positions = Vec::new();
        self.collect_highlights(text, &mut positions);
        positions.sort_unstable();
        positions.dedup();
        positions
    }

    fn collect_highlights(&self, text: &str, out: &mut Vec<usize>) {
        match self {
            FilterExpr::Text(term) => out.extend(substring_positions(text, term)),
            FilterExpr::Fuzzy(_) => out.extend(self.match_positions(text)),
            FilterExpr::And(left, right) | FilterExpr::Or(left, right) => {
                left.collect_highlights(text, out);
                right.collect_highlights(text, out);
            }
            _ => {}
        }
    }
}

fn date_matches(
    op: ComparisonOp,
    stored: DateTime<Local>,
    value: &DateValue,
    now: DateTime<Local>,
) -> bool {
    value
        .resolve(now)
        .is_some_and(|target| compare_dates(op, stored, target))
}

/// Applies a quantifier to the candidates' verdicts on `inner`.
///
/// `All` over an empty set yields `vacuous_all`: true for ancestors, false
/// for children, descendants and siblings.
fn quantify<'a>(
    quantifier: Quantifier,
    vacuous_all: bool,
    candidates: impl IntoIterator<Item = ItemRef<'a>>,
    inner: &FilterExpr,
    now: DateTime<Local>,
) -> bool {
    let mut candidates = candidates.into_iter();
    match quantifier {
        Quantifier::Some => candidates.any(|c| inner.matches_at(c, now)),
        Quantifier::None => !candidates.any(|c| inner.matches_at(c, now)),
        Quantifier::All => {
            let mut seen = false;
            for candidate in candidates {
                seen = true;
                if !inner.matches_at(candidate, now) {
                    return false;
                }
            }
            seen || vacuous_all
        }
    }
}

fn chars_eq_ignore_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

/// Start indices (in characters) of every occurrence of `term` in `text`,
/// comparing one character at a time with [`chars_eq_ignore_case`].
fn occurrences<'a>(text: &'a [char], term: &'a [char]) -> impl Iterator<Item = usize> + 'a {
    let last_start = (text.len() + 1).saturating_sub(term.len());
    (0..last_start).filter(move |&start| {
        term.iter()
            .zip(&text[start..])
            .all(|(&a, &b)| chars_eq_ignore_case(a, b))
    })
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    let text: Vec<char> = haystack.chars().collect();
    let term: Vec<char> = needle.chars().collect();
    let found = occurrences(&text, &term).next().is_some();
    found
}

/// Greedy case-insensitive subsequence scan.
///
/// Each character of `term` is matched against the earliest remaining
/// character of `text`, without backtracking. Returns the consumed character
/// positions, or `None` if `term` is not a subsequence of `text`.
///
/// ```
/// use outline_query_rs::fuzzy_match_positions;
///
/// assert_eq!(fuzzy_match_positions("tsk", "task"), Some(vec![0, 2, 3]));
/// assert_eq!(fuzzy_match_positions("kt", "task"), None);
/// ```
pub fn fuzzy_match_positions(term: &str, text: &str) -> Option<Vec<usize>> {
    let mut pending = term.chars().peekable();
    let mut positions = Vec::new();

    for (index, c) in text.chars().enumerate() {
        let Some(&wanted) = pending.peek() else {
            break;
        };
        if chars_eq_ignore_case(wanted, c) {
            positions.push(index);
            pending.next();
        }
    }

    pending.peek().is_none().then_some(positions)
}

/// Character positions of every case-insensitive occurrence of `term`.
///
/// Uses the same comparison as text matching, so a matching item always
/// has something to highlight.
fn substring_positions(text: &str, term: &str) -> Vec<usize> {
    let text: Vec<char> = text.chars().collect();
    let term: Vec<char> = term.chars().collect();
    if term.is_empty() {
        return Vec::new();
    }
    let mut positions: Vec<usize> = occurrences(&text, &term)
        .flat_map(|start| start..start + term.len())
        .collect();
    positions.sort_unstable();
    positions.dedup();
    positions
}
