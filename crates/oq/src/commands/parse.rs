//! Parse command implementation.
//!
//! Parses a query without evaluating it, for checking syntax.

use outline_query_rs::{expression_string, parse_query};

use super::{CommandContext, Result};
use crate::output::format_parse_json;

/// Executes the parse command.
///
/// # Errors
///
/// Returns the parse error if the query is invalid.
pub fn execute(ctx: &CommandContext, query: &str, compact: bool) -> Result<()> {
    let expr = parse_query(query)?;

    if ctx.json_output {
        let json = format_parse_json(query, expression_string(&expr), expr.to_string())?;
        println!("{json}");
    } else if !ctx.quiet {
        if compact {
            println!("{expr}");
        } else {
            println!("{}", expression_string(&expr));
        }
    }

    Ok(())
}
