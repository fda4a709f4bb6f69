//! Sort and deduplicate variable right-hand sides.
//!
//! Applies the domain-aware comparator to every sortable variable: leading
//! group quotes are ignored, option names compare case-insensitively, and
//! the sort is stable. Comment tokens always stay at the end of the list
//! where the tokenizer found them.

use std::cmp::Ordering;

use crate::edit::{skip, EditPass};
use crate::models::{Behavior, Result};
use crate::parser::token::{Modifier, Token};
use crate::parser::{self, Parser};
use crate::rules;

pub struct SortVariableValues;

fn sort_key(word: &str, case_insensitive: bool) -> String {
    let stripped = word.strip_prefix('"').unwrap_or(word);
    if case_insensitive {
        stripped.to_lowercase()
    } else {
        stripped.to_string()
    }
}

fn is_comment(token: &Token) -> bool {
    token.word().is_some_and(|w| w.starts_with('#'))
}

impl EditPass for SortVariableValues {
    fn name(&self) -> &'static str {
        "sort-variable-values"
    }

    fn run(&self, parser: &mut Parser, mut tokens: Vec<Token>) -> Result<Vec<Token>> {
        let mask = skip::developer_arm_mask(&tokens);
        let behavior = parser.settings().behavior;
        let always = behavior.contains(Behavior::ALWAYS_SORT_VARIABLES);
        let mut changed_any = false;

        // Back to front so a dedup that shrinks one range cannot shift the
        // ranges still to be processed.
        for range in parser::variable_ranges(&tokens).into_iter().rev() {
            if mask[range.start] {
                continue;
            }
            let Some(var) = tokens[range.start].variable().cloned() else {
                continue;
            };
            if var.modifier == Modifier::Shell {
                continue;
            }
            if !always && !rules::should_sort(&var.name) {
                continue;
            }

            let case_insensitive = rules::sort_case_insensitive(&var.name);
            // Tokens already marked for collection are logically absent;
            // rebuilding the range completes their removal.
            let mut items: Vec<Token> = range
                .values()
                .filter(|&i| !tokens[i].gc)
                .map(|i| tokens[i].clone())
                .collect();
            let before: Vec<String> = items
                .iter()
                .map(|t| t.word().unwrap_or_default().to_string())
                .collect();

            items.sort_by(|a, b| match (is_comment(a), is_comment(b)) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => sort_key(a.word().unwrap_or_default(), case_insensitive)
                    .cmp(&sort_key(b.word().unwrap_or_default(), case_insensitive)),
            });
            items.dedup_by(|next, prev| {
                !is_comment(next) && !is_comment(prev) && next.word() == prev.word()
            });

            let after: Vec<String> = items
                .iter()
                .map(|t| t.word().unwrap_or_default().to_string())
                .collect();
            if before == after {
                continue;
            }

            for item in &mut items {
                item.edited = true;
            }
            tokens[range.start].edited = true;
            tokens[range.end].edited = true;
            tokens.splice(range.values(), items);
            changed_any = true;
        }

        if changed_any {
            parser.mark_edited();
        }
        Ok(tokens)
    }
}
