//! Report the diff between observed and canonical variable order.
//!
//! Builds two line sequences — the document's variables annotated with
//! block headers, and the same names in canonical order — and diffs them.
//! The caller renders the result (and colorizes it); a non-empty diff sets
//! the parser's edited flag, which drives the lint exit status.

use crate::diff::{self, DiffType};
use crate::edit::{skip, EditPass};
use crate::models::Result;
use crate::parser::token::Token;
use crate::parser::{self, Parser};
use crate::rules::{self, Block};

pub struct LintOrder;

/// Render names as a header-annotated sequence: a `# <block>` line starts
/// every run of consecutive same-block variables.
fn annotate(names: &[String]) -> Vec<String> {
    let mut out = Vec::with_capacity(names.len() * 2);
    let mut prev: Option<Block> = None;
    for name in names {
        let block = rules::variable_order_block(name);
        if prev != Some(block) {
            out.push(format!("# {}", block.name()));
            prev = Some(block);
        }
        out.push(name.clone());
    }
    out
}

impl EditPass for LintOrder {
    fn name(&self) -> &'static str {
        "lint-order"
    }

    fn run(&self, parser: &mut Parser, tokens: Vec<Token>) -> Result<Vec<Token>> {
        let cutoff = parser::port_mk_cutoff(&tokens);
        let mask = skip::developer_arm_mask(&tokens);

        let names: Vec<String> = parser::variable_ranges(&tokens[..cutoff])
            .into_iter()
            .filter(|r| !mask[r.start])
            .map(|r| {
                tokens[r.start]
                    .variable()
                    .expect("variable range")
                    .name
                    .clone()
            })
            .collect();

        let observed = annotate(&names);
        let mut canonical_names = names.clone();
        canonical_names.sort_by(|a, b| rules::compare_order(a, b));
        let canonical = annotate(&canonical_names);

        let edits = diff::diff_lines(&observed, &canonical);
        let variables_moved = edits.iter().any(|e| e.kind != DiffType::Common);

        if variables_moved {
            if canonical_names
                .iter()
                .any(|n| rules::variable_order_block(n) == Block::Unknown)
            {
                parser.enqueue_output("# WARNING:");
                parser.enqueue_output("# Found variables not in the canonical order.");
                parser.enqueue_output("# They are listed in the UNKNOWN block; leave them");
                parser.enqueue_output("# below everything the framework knows about.");
            }
            for edit in edits {
                let line = match edit.kind {
                    DiffType::Common => format!(" {}", edit.element),
                    DiffType::Add => format!("+{}", edit.element),
                    DiffType::Delete => format!("-{}", edit.element),
                };
                parser.enqueue_output(line);
            }
        }

        let targets_moved = self.lint_targets(parser, &tokens);
        if variables_moved || targets_moved {
            parser.mark_edited();
        }
        Ok(tokens)
    }
}

impl LintOrder {
    /// Framework targets have a fixed phase order; report deviations the
    /// same way variable moves are reported. Special targets and targets
    /// spelled with a variable reference are left out.
    fn lint_targets(&self, parser: &mut Parser, tokens: &[Token]) -> bool {
        let observed: Vec<String> = parser::target_names(tokens)
            .into_iter()
            .filter(|n| !rules::is_special_target(n) && !n.contains('$'))
            .collect();
        let mut canonical = observed.clone();
        canonical.sort_by(|a, b| rules::compare_target_order(a, b));

        let edits = diff::diff_lines(&observed, &canonical);
        if edits.iter().all(|e| e.kind == DiffType::Common) {
            return false;
        }

        parser.enqueue_output("# targets");
        for edit in edits {
            let line = match edit.kind {
                DiffType::Common => format!(" {}", edit.element),
                DiffType::Add => format!("+{}", edit.element),
                DiffType::Delete => format!("-{}", edit.element),
            };
            parser.enqueue_output(line);
        }
        true
    }
}
