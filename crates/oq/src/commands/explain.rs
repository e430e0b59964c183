//! Explain command implementation.
//!
//! Prints the parsed expression tree and, for each item, whether it matched
//! and why.

use outline_query_rs::{debug_match, expression_string, parse_query};

use super::{CommandContext, Result};
use crate::output::{format_explain_json, format_explain_text};

/// Options for the explain command.
#[derive(Debug)]
pub struct ExplainOptions {
    /// Query string.
    pub query: String,
    /// Only explain matching items.
    pub matching: bool,
}

/// Executes the explain command.
///
/// # Errors
///
/// Returns an error if the query does not parse or the outline cannot be
/// loaded.
pub fn execute(ctx: &CommandContext, opts: &ExplainOptions) -> Result<()> {
    let expr = parse_query(&opts.query)?;
    let outline = ctx.load_outline()?;

    let explained: Vec<_> = outline
        .all_items()
        .into_iter()
        .map(|item| (item, debug_match(item, &expr)))
        .filter(|(_, debug)| debug.matched || !opts.matching)
        .collect();
    tracing::debug!(explained = explained.len(), "explained items");

    let expression = expression_string(&expr);
    if ctx.json_output {
        println!("{}", format_explain_json(&opts.query, expression, explained)?);
    } else if !ctx.quiet {
        print!("{}", format_explain_text(&expression, &explained, ctx.use_colors));
    }

    Ok(())
}
