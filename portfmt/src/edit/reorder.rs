//! Canonical variable reordering.
//!
//! Collects every assignment at conditional depth zero ahead of the
//! framework epilogue include, regroups them into canonical blocks, orders
//! each block internally, and separates blocks with one blank line. Ranges
//! inside conditionals and target blocks stay where they are.

use crate::edit::EditPass;
use crate::models::Result;
use crate::parser::token::{Token, TokenData};
use crate::parser::{self, Parser, VarRange};
use crate::rules;

pub struct CanonicalReorder;

/// Identity of a token for change detection: variety plus the payload that
/// matters for ordering.
fn signature(tokens: &[Token]) -> Vec<String> {
    tokens
        .iter()
        .map(|t| match &t.data {
            TokenData::Comment(text) => format!("#{text}"),
            TokenData::VariableStart(v) => format!("<{v}"),
            TokenData::VariableToken(_, w) => format!("w{w}"),
            TokenData::VariableEnd(v) => format!(">{v}"),
            other => other.variety().to_string(),
        })
        .collect()
}

impl EditPass for CanonicalReorder {
    fn name(&self) -> &'static str {
        "canonical-reorder"
    }

    fn run(&self, parser: &mut Parser, tokens: Vec<Token>) -> Result<Vec<Token>> {
        let cutoff = parser::port_mk_cutoff(&tokens);
        let ranges: Vec<VarRange> = parser::variable_ranges(&tokens[..cutoff])
            .into_iter()
            .filter(|r| tokens[r.start].depth == 0)
            .collect();
        if ranges.is_empty() {
            return Ok(tokens);
        }

        // Partition the region: reorderable ranges out, everything else
        // stays in relative order. Depth-zero blank lines between the
        // collected ranges are dropped; the group separators below replace
        // them. Blanks ahead of the first variable and behind the last one
        // (around leading comments, targets, the trailing include) stay.
        let mut rest: Vec<Token> = Vec::new();
        let mut rest_before_first = 0usize;
        let first_range_start = ranges[0].start;
        let last_range_end = ranges.last().expect("non-empty").end;
        let mut in_target = false;
        let mut i = 0;
        while i < cutoff {
            if let Some(range) = ranges.iter().find(|r| r.start == i) {
                i = range.end + 1;
                continue;
            }
            let token = &tokens[i];
            match &token.data {
                TokenData::TargetStart(_) => in_target = true,
                TokenData::TargetEnd(_) => in_target = false,
                TokenData::Comment(text)
                    if text.is_empty()
                        && token.depth == 0
                        && !in_target
                        && i > first_range_start
                        && i < last_range_end =>
                {
                    i += 1;
                    continue;
                }
                _ => {}
            }
            if i < first_range_start {
                rest_before_first += 1;
            }
            rest.push(token.clone());
            i += 1;
        }

        // Canonical order is total; a stable sort groups blocks and orders
        // within them in one go.
        let mut sorted = ranges.clone();
        sorted.sort_by(|a, b| {
            let na = &tokens[a.start].variable().expect("variable range").name;
            let nb = &tokens[b.start].variable().expect("variable range").name;
            rules::compare_order(na, nb)
        });

        let mut region: Vec<Token> = Vec::new();
        region.extend(rest[..rest_before_first].iter().cloned());
        let mut prev_block = None;
        for range in &sorted {
            let name = &tokens[range.start].variable().expect("variable range").name;
            let block = rules::variable_order_block(name);
            if let Some(prev) = prev_block {
                if prev != block {
                    region.push(Token::synthetic(TokenData::Comment(String::new()), 0));
                }
            }
            prev_block = Some(block);
            region.extend(tokens[range.start..=range.end].iter().cloned());
        }
        region.extend(rest[rest_before_first..].iter().cloned());

        if signature(&region) == signature(&tokens[..cutoff]) {
            return Ok(tokens);
        }

        for token in &mut region {
            if !token.gc {
                token.edited = true;
            }
        }
        region.extend(tokens[cutoff..].iter().cloned());
        parser.mark_edited();
        Ok(region)
    }
}
