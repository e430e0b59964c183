//! Output formatting for the explain and parse commands.

use outline_query_rs::{format_debug_info, ItemRef, MatchDebug};
use owo_colors::OwoColorize;
use serde::Serialize;

use super::helpers::{indent, truncate_id, truncate_str};

/// JSON output structure for the explain command.
#[derive(Serialize)]
pub struct ExplainOutput<'a> {
    pub query: &'a str,
    pub expression: String,
    pub items: Vec<ExplainedItem<'a>>,
}

/// JSON output structure for one explained item.
#[derive(Serialize)]
pub struct ExplainedItem<'a> {
    pub id: String,
    pub text: &'a str,
    #[serde(flatten)]
    pub debug: MatchDebug,
}

/// JSON output structure for the parse command.
#[derive(Serialize)]
pub struct ParseOutput<'a> {
    pub query: &'a str,
    pub expression: String,
    pub compact: String,
}

/// Formats explained items as JSON.
pub fn format_explain_json(
    query: &str,
    expression: String,
    explained: Vec<(ItemRef<'_>, MatchDebug)>,
) -> Result<String, serde_json::Error> {
    let output = ExplainOutput {
        query,
        expression,
        items: explained
            .into_iter()
            .map(|(item, debug)| ExplainedItem {
                id: item.item().id.to_string(),
                text: item.text(),
                debug,
            })
            .collect(),
    };
    serde_json::to_string_pretty(&output)
}

/// Formats explained items as text: the expression tree, then one block per
/// item.
pub fn format_explain_text(
    expression: &str,
    explained: &[(ItemRef<'_>, MatchDebug)],
    use_colors: bool,
) -> String {
    let mut out = String::new();
    out.push_str(expression);
    out.push('\n');

    for (item, debug) in explained {
        out.push('\n');
        let title = format!(
            "{}{} [{}]",
            indent(item.depth()),
            truncate_str(item.text(), 60),
            truncate_id(&item.item().id.to_string())
        );
        if !use_colors {
            out.push_str(&title);
        } else if debug.matched {
            out.push_str(&title.green().bold().to_string());
        } else {
            out.push_str(&title.red().to_string());
        }
        out.push('\n');
        out.push_str(&format_debug_info(debug));
    }

    out
}

/// Formats a parsed expression as JSON.
pub fn format_parse_json(
    query: &str,
    expression: String,
    compact: String,
) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&ParseOutput {
        query,
        expression,
        compact,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use outline_query_rs::{debug_match, expression_string, parse_query, Item, Outline};

    #[test]
    fn test_format_explain_text() {
        let mut outline = Outline::new();
        let root = outline.push_root(Item::new("Project"));
        outline.push_child(root, Item::new("task"));
        let expr = parse_query("task").unwrap();

        let explained: Vec<_> = outline
            .all_items()
            .into_iter()
            .map(|item| (item, debug_match(item, &expr)))
            .collect();
        let text = format_explain_text(&expression_string(&expr), &explained, false);

        assert!(text.starts_with("(text \"task\")\n\nProject ["));
        assert!(text.contains("\n  task ["));
        assert_eq!(text.matches("matched: yes").count(), 1);
        assert_eq!(text.matches("matched: no").count(), 1);
    }

    #[test]
    fn test_format_explain_json_flattens_debug() {
        let mut outline = Outline::new();
        outline.push_root(Item::new("task"));
        let expr = parse_query("task").unwrap();
        let explained: Vec<_> = outline
            .all_items()
            .into_iter()
            .map(|item| (item, debug_match(item, &expr)))
            .collect();

        let json = format_explain_json("task", expression_string(&expr), explained).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["query"], "task");
        assert_eq!(value["items"][0]["text"], "task");
        assert_eq!(value["items"][0]["matched"], true);
        assert!(value["items"][0]["reason"].is_string());
        assert_eq!(value["items"][0]["details"]["depth"], "0");
    }

    #[test]
    fn test_format_parse_json() {
        let expr = parse_query("a | b").unwrap();
        let json =
            format_parse_json("a | b", expression_string(&expr), expr.to_string()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["compact"], r#"Or(Text("a"), Text("b"))"#);
        assert_eq!(value["expression"], "(or\n  (text \"a\")\n  (text \"b\"))");
    }
}
