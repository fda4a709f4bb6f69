//! Edit passes over the token stream.
//!
//! Each pass is an independent transformation with the same shape: it
//! receives the current token stream by value, may mark tokens edited or
//! for garbage collection, may append new tokens, and hands back the
//! replacement stream. Passes compose in a configured sequence; each sees
//! the full output of the previous one.

pub mod bump;
pub mod collapse;
pub mod eol_comments;
pub mod get;
pub mod lint_order;
pub mod merge;
pub mod reorder;
pub mod sanitize_append;
pub mod sanitize_cmake;
pub mod set_version;
pub mod skip;
pub mod sort_values;
pub mod unknowns;

use once_cell::sync::Lazy;
use tracing::debug;

use crate::models::{Behavior, Result};
use crate::parser::token::Token;
use crate::parser::{self, Parser, VarRange};

/// One composable transformation over the token stream. Parameterized
/// passes may hold token payloads (`Rc` shared), so the trait itself puts
/// no thread bounds on implementors; the static registry does.
pub trait EditPass {
    fn name(&self) -> &'static str;
    fn run(&self, parser: &mut Parser, tokens: Vec<Token>) -> Result<Vec<Token>>;
}

/// Statically linked pass registry, keyed by name. Parameterized passes
/// (`set-version`, `merge`, ...) are constructed by their callers; the
/// registry carries the passes the format pipeline toggles by name.
static REGISTRY: Lazy<Vec<Box<dyn EditPass + Send + Sync>>> = Lazy::new(|| {
    vec![
        Box::new(eol_comments::SanitizeEolComments),
        Box::new(sanitize_cmake::SanitizeCmakeArgs),
        Box::new(sanitize_append::SanitizeAppendModifier),
        Box::new(sort_values::SortVariableValues),
        Box::new(collapse::CollapseAdjacentVariables),
        Box::new(reorder::CanonicalReorder),
    ]
});

/// Look up a registered pass by name.
pub fn lookup(name: &str) -> Option<&'static dyn EditPass> {
    REGISTRY
        .iter()
        .find(|p| p.name() == name)
        .map(|p| p.as_ref() as &dyn EditPass)
}

/// Names of every registered pass, in default pipeline order.
pub fn registered_names() -> Vec<&'static str> {
    REGISTRY.iter().map(|p| p.name()).collect()
}

/// The format pipeline for the given behavior flags, honoring per-pass
/// disables by name.
pub fn format_pipeline(
    behavior: Behavior,
    disabled: &[String],
) -> Vec<&'static dyn EditPass> {
    REGISTRY
        .iter()
        .filter(|pass| {
            let name = pass.name();
            if disabled.iter().any(|d| d == name) {
                return false;
            }
            match name {
                "sanitize-append-modifier" => behavior.contains(Behavior::SANITIZE_APPEND),
                "sanitize-eol-comments" => !behavior.contains(Behavior::KEEP_EOL_COMMENTS),
                "sort-variable-values" => !behavior.contains(Behavior::UNSORTED_VARIABLES),
                "collapse-adjacent-variables" => {
                    behavior.contains(Behavior::COLLAPSE_ADJACENT_VARIABLES)
                }
                _ => true,
            }
        })
        .map(|p| p.as_ref() as &dyn EditPass)
        .collect()
}

/// Run one pass over a parser's stream.
pub fn apply(parser: &mut Parser, pass: &dyn EditPass) -> Result<()> {
    debug!(pass = pass.name(), "running edit pass");
    let tokens = parser.take_tokens();
    match pass.run(parser, tokens) {
        Ok(tokens) => {
            parser.set_tokens(tokens);
            Ok(())
        }
        Err(err) => Err(err),
    }
}

/// Run a pass sequence, stopping at the first failure.
pub fn apply_all(parser: &mut Parser, passes: &[&dyn EditPass]) -> Result<()> {
    for pass in passes {
        apply(parser, *pass)?;
    }
    Ok(())
}

/// Variable ranges at conditional depth 0 that precede the framework
/// epilogue include; the region every rewriting pass is restricted to.
pub(crate) fn editable_ranges(tokens: &[Token]) -> Vec<VarRange> {
    let cutoff = parser::port_mk_cutoff(tokens);
    parser::variable_ranges(tokens)
        .into_iter()
        .filter(|r| r.end < cutoff && tokens[r.start].depth == 0)
        .collect()
}
