//! Search command implementation.
//!
//! Evaluates a query against every item of the outline document.

use outline_query_rs::{get_first_matching_item, get_matching_items, parse_query, ItemRef};

use super::{CommandContext, Result, DEFAULT_LIMIT};
use crate::output::{format_item_details, format_items_json, format_items_table};

/// Options for the search command.
#[derive(Debug)]
pub struct SearchOptions {
    /// Query string.
    pub query: String,
    /// Print only the first match.
    pub first: bool,
    /// Limit results.
    pub limit: Option<u32>,
    /// Show all matches (no limit).
    pub all: bool,
}

impl SearchOptions {
    /// Effective result limit: `--all` disables it, `--limit` wins over the
    /// configured default.
    fn effective_limit(&self, default_limit: Option<u32>) -> Option<usize> {
        if self.all {
            return None;
        }
        let limit = self.limit.or(default_limit).unwrap_or(DEFAULT_LIMIT);
        Some(limit as usize)
    }
}

/// Executes the search command.
///
/// # Errors
///
/// Returns an error if the query does not parse or the outline cannot be
/// loaded.
pub fn execute(ctx: &CommandContext, opts: &SearchOptions) -> Result<()> {
    // Parse before touching the outline so a bad query fails fast.
    let expr = parse_query(&opts.query)?;
    let outline = ctx.load_outline()?;

    if opts.first {
        let item = get_first_matching_item(&outline, &expr);
        let items: Vec<ItemRef<'_>> = item.into_iter().collect();
        if ctx.json_output {
            println!("{}", format_items_json(&opts.query, &items, &expr, items.len())?);
        } else if !ctx.quiet {
            match item {
                Some(item) => print!("{}", format_item_details(item, &expr, ctx.use_colors)),
                None => print!("{}", format_items_table(&[], &expr, 0, ctx.use_colors)),
            }
        }
        return Ok(());
    }

    let mut items = get_matching_items(&outline, &expr);
    let total = items.len();
    if let Some(limit) = opts.effective_limit(ctx.default_limit) {
        items.truncate(limit);
    }

    if ctx.verbose {
        eprintln!("{total} of {} items matched", outline.len());
    }

    if ctx.json_output {
        println!("{}", format_items_json(&opts.query, &items, &expr, total)?);
    } else if !ctx.quiet {
        print!("{}", format_items_table(&items, &expr, total, ctx.use_colors));
    }

    Ok(())
}
