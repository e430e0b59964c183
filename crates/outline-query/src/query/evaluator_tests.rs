//! Tests for filter evaluation.

use chrono::{DateTime, Duration, Local, TimeZone, Utc};

use super::*;
use crate::outline::{Item, NodeId, Outline};

fn fixed_now() -> DateTime<Local> {
    Local.with_ymd_and_hms(2025, 10, 15, 12, 0, 0).unwrap()
}

fn days_ago(days: i64) -> DateTime<Utc> {
    (fixed_now() - Duration::days(days)).with_timezone(&Utc)
}

/// ```text
/// Project
///   task one          @status=done  created 1 day ago
///   task two          @status=open  created 30 days ago
///     subtask         @status=done
///   Notes
/// Inbox
/// ```
struct Fixture {
    outline: Outline,
    project: NodeId,
    task_one: NodeId,
    task_two: NodeId,
    subtask: NodeId,
    notes: NodeId,
    inbox: NodeId,
}

fn fixture() -> Fixture {
    let mut outline = Outline::new();
    let project = outline.push_root(Item::new("Project"));
    let task_one = outline.push_child(
        project,
        Item::new("task one")
            .with_attribute("status", "done")
            .with_attribute("date", "2025-10-14")
            .with_created(days_ago(1)),
    );
    let task_two = outline.push_child(
        project,
        Item::new("task two")
            .with_attribute("status", "open")
            .with_attribute("date", "2025-09-15")
            .with_created(days_ago(30))
            .with_modified(days_ago(2)),
    );
    let subtask = outline.push_child(
        task_two,
        Item::new("subtask").with_attribute("status", "done"),
    );
    let notes = outline.push_child(project, Item::new("Notes"));
    let inbox = outline.push_root(Item::new("Inbox"));

    Fixture {
        outline,
        project,
        task_one,
        task_two,
        subtask,
        notes,
        inbox,
    }
}

impl Fixture {
    fn matches(&self, query: &str, node: NodeId) -> bool {
        let expr = parse_query(query).unwrap();
        expr.matches_at(self.outline.get(node).unwrap(), fixed_now())
    }

    fn matching(&self, query: &str) -> Vec<&str> {
        let expr = parse_query(query).unwrap();
        self.outline
            .all_items()
            .into_iter()
            .filter(|item| expr.matches_at(*item, fixed_now()))
            .map(|item| item.text())
            .collect()
    }
}

// ==================== Text Tests ====================

#[test]
fn test_always_match() {
    let f = fixture();
    assert_eq!(f.matching("").len(), f.outline.len());
}

#[test]
fn test_text_is_case_insensitive_substring() {
    let f = fixture();
    assert_eq!(f.matching("TASK"), vec!["task one", "task two", "subtask"]);
    assert_eq!(f.matching("proj"), vec!["Project"]);
    assert!(f.matching("missing").is_empty());
}

#[test]
fn test_quoted_phrase() {
    let f = fixture();
    assert_eq!(f.matching(r#""task two""#), vec!["task two"]);
}

#[test]
fn test_fuzzy() {
    let f = fixture();
    assert_eq!(f.matching("~tsk"), vec!["task one", "task two", "subtask"]);
    assert_eq!(f.matching("~ntes"), vec!["Notes"]);
    assert!(f.matching("~ksat").is_empty());
}

#[test]
fn test_fuzzy_positions() {
    assert_eq!(fuzzy_match_positions("tsk", "task"), Some(vec![0, 2, 3]));
    assert_eq!(fuzzy_match_positions("TSK", "task"), Some(vec![0, 2, 3]));
    assert_eq!(fuzzy_match_positions("", "task"), Some(vec![]));
    assert_eq!(fuzzy_match_positions("tt", "task"), None);
    assert_eq!(FilterExpr::fuzzy("tsk").match_positions("task"), vec![0, 2, 3]);
    assert!(FilterExpr::text("task").match_positions("task").is_empty());
}

#[test]
fn test_fuzzy_positions_are_char_indices() {
    assert_eq!(fuzzy_match_positions("cf", "café frappé"), Some(vec![0, 2]));
    assert_eq!(fuzzy_match_positions("éf", "café frappé"), Some(vec![3, 5]));
}

#[test]
fn test_regex() {
    let f = fixture();
    let expr = FilterExpr::regex(r"^task \w+$").unwrap();
    let texts: Vec<_> = f
        .outline
        .all_items()
        .into_iter()
        .filter(|item| expr.matches(*item))
        .map(|item| item.text())
        .collect();
    assert_eq!(texts, vec!["task one", "task two"]);
}

// ==================== Attribute Tests ====================

#[test]
fn test_attribute_exists() {
    let f = fixture();
    assert_eq!(f.matching("@status"), vec!["task one", "task two", "subtask"]);
    assert!(f.matching("@priority").is_empty());
}

#[test]
fn test_attribute_equality() {
    let f = fixture();
    assert_eq!(f.matching("@status=done"), vec!["task one", "subtask"]);
    assert!(f.matching("@status=DONE").is_empty());
}

#[test]
fn test_attribute_inequality_includes_missing_key() {
    let f = fixture();
    assert_eq!(
        f.matching("@status!=done"),
        vec!["Project", "task two", "Notes", "Inbox"]
    );
}

#[test]
fn test_attribute_date_relative() {
    let f = fixture();
    // 2025-10-14 is within the past week; 2025-09-15 is a month ago.
    assert!(f.matches("@date>-7d", f.task_one));
    assert!(!f.matches("@date>-7d", f.task_two));
    assert!(f.matches("@date<7d", f.task_two));
    // No attribute, no date match.
    assert!(!f.matches("@date>-7d", f.project));
    assert!(!f.matches("@date<7d", f.project));
}

#[test]
fn test_attribute_date_equality_is_day_granular() {
    let f = fixture();
    assert!(f.matches("@date=2025-10-14", f.task_one));
    assert!(!f.matches("@date=2025-10-14", f.task_two));
    assert!(f.matches("@date!=2025-10-14", f.task_two));
    assert!(f.matches("@date=-1d", f.task_one));
}

#[test]
fn test_attribute_date_unparseable_value() {
    let mut outline = Outline::new();
    let node = outline.push_root(Item::new("x").with_attribute("due", "someday"));
    let item = outline.get(node).unwrap();
    for query in ["@due>-7d", "@due=2025-10-10", "@due!=2025-10-10"] {
        assert!(
            !parse_query(query).unwrap().matches_at(item, fixed_now()),
            "{query}"
        );
    }
}

#[test]
fn test_attribute_date_rfc3339_value() {
    let mut outline = Outline::new();
    let node = outline.push_root(Item::new("x").with_attribute("due", "2025-10-12T09:00:00Z"));
    let item = outline.get(node).unwrap();
    assert!(parse_query("@due>-7d").unwrap().matches_at(item, fixed_now()));
    assert!(parse_query("@due<+1d").unwrap().matches_at(item, fixed_now()));
}

// ==================== Structure Tests ====================

#[test]
fn test_depth() {
    let f = fixture();
    assert_eq!(f.matching("d:0"), vec!["Project", "Inbox"]);
    assert_eq!(f.matching("d:>1"), vec!["subtask"]);
    assert_eq!(f.matching("d:<=1").len(), 5);
    assert_eq!(f.matching("d:!=1"), vec!["Project", "subtask", "Inbox"]);
}

#[test]
fn test_children_count() {
    let f = fixture();
    assert_eq!(f.matching("children:3"), vec!["Project"]);
    assert_eq!(f.matching("children:>0"), vec!["Project", "task two"]);
    assert_eq!(
        f.matching("children:0"),
        vec!["task one", "subtask", "Notes", "Inbox"]
    );
}

// ==================== Date Tests ====================

#[test]
fn test_created() {
    let f = fixture();
    assert!(f.matches("@created>-7d", f.task_one));
    assert!(!f.matches("@created>-7d", f.task_two));
    assert!(f.matches("@created<=-4w", f.task_two));
    assert!(f.matches("@created=-1d", f.task_one));
}

#[test]
fn test_unset_timestamp_never_matches() {
    let f = fixture();
    for query in ["@created>-7d", "@created<+1d", "@created!=2025-10-10"] {
        assert!(!f.matches(query, f.project), "{query}");
    }
    assert!(!f.matches("@modified>-7d", f.task_one));
}

#[test]
fn test_modified() {
    let f = fixture();
    assert!(f.matches("@modified>-7d", f.task_two));
    assert!(f.matches("@modified=2025-10-13", f.task_two));
}

// ==================== Relationship Tests ====================

#[test]
fn test_parent() {
    let f = fixture();
    assert_eq!(f.matching("parent:project"), vec!["task one", "task two", "Notes"]);
    assert_eq!(f.matching("parent:@status=open"), vec!["subtask"]);
    // Roots have no parent.
    assert!(!f.matches("parent:x", f.inbox));
    assert!(f.matches("-parent:x", f.inbox));
}

#[test]
fn test_ancestor_quantifiers() {
    let f = fixture();
    assert_eq!(
        f.matching("parent*:project"),
        vec!["task one", "task two", "subtask", "Notes"]
    );
    assert!(f.matches("+parent*:~pr", f.task_one));
    assert!(!f.matches("+parent*:project", f.subtask));
    assert!(f.matches("-parent*:inbox", f.subtask));
    assert!(!f.matches("-parent*:task", f.subtask));
}

#[test]
fn test_all_ancestors_is_vacuously_true_for_roots() {
    let f = fixture();
    assert!(f.matches("+parent*:anything", f.project));
    assert!(f.matches("+parent*:anything", f.inbox));
    assert!(!f.matches("parent*:anything", f.inbox));
}

#[test]
fn test_all_over_empty_children_is_false() {
    let f = fixture();
    assert!(!f.matches("+child:anything", f.inbox));
    assert!(!f.matches("+child*:anything", f.inbox));
}

#[test]
fn test_all_over_empty_siblings_is_false() {
    let mut outline = Outline::new();
    let root = outline.push_root(Item::new("only root"));
    let child = outline.push_child(root, Item::new("only child"));
    let expr = parse_query("+sibling:anything").unwrap();
    assert!(!expr.matches_at(outline.get(root).unwrap(), fixed_now()));
    assert!(!expr.matches_at(outline.get(child).unwrap(), fixed_now()));
}

#[test]
fn test_none_over_empty_set_is_true() {
    let f = fixture();
    assert!(f.matches("-child:anything", f.inbox));
    assert!(f.matches("-child*:anything", f.inbox));
    assert!(f.matches("-parent*:anything", f.inbox));
}

#[test]
fn test_child_quantifiers() {
    let f = fixture();
    assert_eq!(f.matching("child:@status=done"), vec!["Project", "task two"]);
    assert_eq!(f.matching("+child:@status=done"), vec!["task two"]);
    assert_eq!(f.matching("children:>0 -child:@status=open"), vec!["task two"]);
}

#[test]
fn test_descendant_quantifiers() {
    let f = fixture();
    assert_eq!(f.matching("child*:subtask"), vec!["Project", "task two"]);
    assert!(!f.matches("+child*:task", f.project));
    assert!(f.matches("+child*:task", f.task_two));
    assert!(f.matches("-child*:notes", f.task_two));
}

#[test]
fn test_sibling_quantifiers() {
    let f = fixture();
    assert_eq!(f.matching("sibling:notes"), vec!["task one", "task two"]);
    assert!(f.matches("+sibling:task", f.notes));
    assert!(!f.matches("+sibling:task", f.task_one));
    // A root has no parent, so it has no siblings.
    assert!(!f.matches("sibling:inbox", f.project));
    assert!(!f.matches("sibling:project", f.inbox));
    assert!(f.matches("-sibling:@status", f.inbox));
}

#[test]
fn test_nested_relationships() {
    let f = fixture();
    assert_eq!(f.matching("child:child:subtask"), vec!["Project"]);
    assert_eq!(f.matching("parent:parent:project"), vec!["subtask"]);
}

// ==================== Boolean Algebra Tests ====================

#[test]
fn test_and_or_not() {
    let f = fixture();
    assert_eq!(f.matching("task @status=done"), vec!["task one", "subtask"]);
    assert_eq!(f.matching("task + d:1"), vec!["task one", "task two"]);
    assert_eq!(f.matching("notes | inbox"), vec!["Notes", "Inbox"]);
    assert_eq!(f.matching("d:0 -inbox"), vec!["Project"]);
}

#[test]
fn test_grouping() {
    let f = fixture();
    assert_eq!(
        f.matching("(task | project) d:>0"),
        vec!["task one", "task two", "subtask"]
    );
    assert_eq!(f.matching("-(task | notes) d:0"), vec!["Project", "Inbox"]);
}

#[test]
fn test_double_negation() {
    let f = fixture();
    assert_eq!(f.matching("--task"), f.matching("task"));
}

#[test]
fn test_not_is_complement() {
    let f = fixture();
    let positive = f.matching("child*:done");
    let negative = f.matching("-child*:done");
    assert_eq!(positive.len() + negative.len(), f.outline.len());
    assert!(positive.iter().all(|text| !negative.contains(text)));
}

#[test]
fn test_or_and_agree_with_set_operations() {
    let f = fixture();
    for (a, b) in [("task", "@status=done"), ("d:0", "~ns"), ("child:x", "project")] {
        let left = f.matching(a);
        let right = f.matching(b);
        let or = f.matching(&format!("({a}) | ({b})"));
        let and = f.matching(&format!("({a}) ({b})"));
        for item in f.outline.all_items() {
            let text = item.text();
            assert_eq!(
                or.contains(&text),
                left.contains(&text) || right.contains(&text)
            );
            assert_eq!(
                and.contains(&text),
                left.contains(&text) && right.contains(&text)
            );
        }
    }
}

// ==================== Highlight Tests ====================

#[test]
fn test_highlight_positions() {
    let expr = parse_query("task | ~on").unwrap();
    assert_eq!(
        expr.highlight_positions("task one"),
        vec![0, 1, 2, 3, 5, 6]
    );
}

#[test]
fn test_highlight_positions_skip_negated_and_relationships() {
    let expr = parse_query("one -task child:one").unwrap();
    assert_eq!(expr.highlight_positions("task one"), vec![5, 6, 7]);
}

#[test]
fn test_highlight_positions_repeated_term() {
    let expr = parse_query("ab").unwrap();
    assert_eq!(expr.highlight_positions("abxAB"), vec![0, 1, 3, 4]);
}

#[test]
fn test_highlight_positions_overlapping_occurrences() {
    let expr = parse_query("aba").unwrap();
    assert_eq!(expr.highlight_positions("ababa"), vec![0, 1, 2, 3, 4]);
}

#[test]
fn test_text_match_agrees_with_highlights() {
    // 'İ' lowercases to two characters; matching and highlighting must still
    // agree on every term.
    let mut outline = Outline::new();
    let node = outline.push_root(Item::new("İzmir STRASSE"));
    let item = outline.get(node).unwrap();

    for term in ["zmir", "İZMİR", "i\u{307}zmir", "izmir", "strasse", "ß"] {
        let expr = FilterExpr::text(term);
        assert_eq!(
            expr.matches_at(item, fixed_now()),
            !expr.highlight_positions(item.text()).is_empty(),
            "{term:?}"
        );
    }
    let expr = FilterExpr::text("zmir");
    assert!(expr.matches_at(item, fixed_now()));
    assert_eq!(expr.highlight_positions(item.text()), vec![1, 2, 3, 4]);
}

// ==================== Misc Tests ====================

#[test]
fn test_matches_uses_wall_clock() {
    let mut outline = Outline::new();
    let node = outline.push_root(Item::new("fresh").with_created(Utc::now()));
    let item = outline.get(node).unwrap();
    assert!(parse_query("@created>-1h").unwrap().matches(item));
    assert!(parse_query("@created=-0d").unwrap().matches(item));
}

#[test]
fn test_evaluation_does_not_touch_the_outline() {
    let f = fixture();
    let before = f.outline.len();
    let _ = f.matching("child*:x | +sibling:y | -parent*:z");
    assert_eq!(f.outline.len(), before);
    assert_eq!(f.outline.get(f.subtask).unwrap().depth(), 2);
}

#[test]
fn test_filter_expr_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<FilterExpr>();
}
