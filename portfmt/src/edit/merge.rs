//! Merge an overlay Makefile into the current document.
//!
//! For each assignment in the overlay: an existing assignment with the same
//! name is replaced in place, anything else is inserted at its canonical
//! position. A `!=` overlay assignment with an empty right-hand side is a
//! delete request when `shell_is_delete` is set.

use std::rc::Rc;

use tracing::debug;

use crate::edit::{self, EditPass};
use crate::models::{Result, Settings};
use crate::parser::token::{Modifier, Token, TokenData, Variable};
use crate::parser::{self, Parser, VarRange};
use crate::rules;

/// Merge behavior toggles.
#[derive(Debug, Clone, Copy)]
pub struct MergeFlags {
    /// Treat an empty `!=` overlay assignment as "delete this variable".
    pub shell_is_delete: bool,
    /// Carry overlay comments that precede an inserted assignment.
    pub merge_comments: bool,
}

impl Default for MergeFlags {
    fn default() -> Self {
        Self {
            shell_is_delete: true,
            merge_comments: false,
        }
    }
}

pub struct Merge {
    overlay: Vec<Token>,
    flags: MergeFlags,
}

impl Merge {
    pub fn new(overlay: Vec<Token>, flags: MergeFlags) -> Self {
        Self { overlay, flags }
    }

    /// Parse a Makefile snippet into an overlay.
    pub fn from_snippet(snippet: &str, flags: MergeFlags) -> Result<Self> {
        let mut overlay = Parser::new(Settings::default());
        overlay.read("overlay", snippet)?;
        Ok(Self::new(overlay.take_tokens(), flags))
    }
}

/// One overlay assignment plus the comment lines directly above it.
struct OverlayItem {
    comments: Vec<String>,
    name: String,
    modifier: Modifier,
    words: Vec<String>,
}

fn overlay_items(overlay: &[Token]) -> Vec<OverlayItem> {
    let mut items = Vec::new();
    let mut pending: Vec<String> = Vec::new();

    for range in parser::variable_ranges(overlay) {
        // Comment lines directly above this assignment.
        pending.clear();
        let mut i = range.start;
        while i > 0 {
            match &overlay[i - 1].data {
                TokenData::Comment(text) if !text.is_empty() => {
                    pending.insert(0, text.clone());
                    i -= 1;
                }
                _ => break,
            }
        }

        let Some(var) = overlay[range.start].variable() else {
            continue;
        };
        items.push(OverlayItem {
            comments: pending.clone(),
            name: var.name.clone(),
            modifier: var.modifier,
            words: range
                .values()
                .filter_map(|j| overlay[j].word())
                .map(String::from)
                .collect(),
        });
    }
    items
}

fn build_range(var: &Rc<Variable>, words: &[String], depth: usize) -> Vec<Token> {
    let mut out = Vec::with_capacity(words.len() + 2);
    out.push(Token::synthetic(
        TokenData::VariableStart(Rc::clone(var)),
        depth,
    ));
    for word in words {
        out.push(Token::synthetic(
            TokenData::VariableToken(Rc::clone(var), word.clone()),
            depth,
        ));
    }
    out.push(Token::synthetic(TokenData::VariableEnd(Rc::clone(var)), depth));
    out
}

/// Locate the range to replace: exact name+modifier match first, then any
/// modifier bucket.
fn find_match(tokens: &[Token], ranges: &[VarRange], name: &str, modifier: Modifier) -> Option<VarRange> {
    let exact = ranges.iter().find(|r| {
        tokens[r.start]
            .variable()
            .is_some_and(|v| v.name == name && v.modifier == modifier)
    });
    exact
        .or_else(|| {
            ranges.iter().find(|r| {
                tokens[r.start].variable().is_some_and(|v| v.name == name)
            })
        })
        .copied()
}

impl EditPass for Merge {
    fn name(&self) -> &'static str {
        "merge"
    }

    fn run(&self, parser: &mut Parser, mut tokens: Vec<Token>) -> Result<Vec<Token>> {
        let mut changed_any = false;

        for item in overlay_items(&self.overlay) {
            let ranges = edit::editable_ranges(&tokens);
            let delete = self.flags.shell_is_delete
                && item.modifier == Modifier::Shell
                && item.words.iter().all(|w| w.is_empty() || w.starts_with('#'));

            if delete {
                if let Some(range) = find_match(&tokens, &ranges, &item.name, item.modifier) {
                    debug!(variable = %item.name, "merge: delete");
                    for token in &mut tokens[range.start..=range.end] {
                        token.gc = true;
                        token.edited = false;
                    }
                    changed_any = true;
                }
                continue;
            }

            let var = Rc::new(Variable::new(item.name.clone(), item.modifier));
            let mut replacement = Vec::new();
            if self.flags.merge_comments {
                for comment in &item.comments {
                    replacement.push(Token::synthetic(TokenData::Comment(comment.clone()), 0));
                }
            }
            replacement.extend(build_range(&var, &item.words, 0));

            if let Some(range) = find_match(&tokens, &ranges, &item.name, item.modifier) {
                debug!(variable = %item.name, "merge: replace");
                tokens.splice(range.start..=range.end, replacement);
            } else {
                let at = ranges
                    .iter()
                    .find(|r| {
                        let existing = &tokens[r.start].variable().expect("variable range").name;
                        rules::compare_order(&item.name, existing).is_lt()
                    })
                    .map(|r| r.start)
                    .unwrap_or_else(|| {
                        ranges
                            .last()
                            .map(|r| r.end + 1)
                            .unwrap_or_else(|| parser::port_mk_cutoff(&tokens))
                    });
                debug!(variable = %item.name, at, "merge: insert");
                tokens.splice(at..at, replacement);
            }
            changed_any = true;
        }

        if changed_any {
            parser.mark_edited();
        }
        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::apply;

    fn run_merge(input: &str, snippet: &str, flags: MergeFlags) -> Parser {
        let mut p = Parser::new(Settings::default());
        p.read("test", input).unwrap();
        let merge = Merge::from_snippet(snippet, flags).unwrap();
        apply(&mut p, &merge).unwrap();
        p
    }

    fn live_names(parser: &Parser) -> Vec<String> {
        parser::variable_ranges(parser.tokens())
            .iter()
            .filter(|r| !parser.tokens()[r.start].gc)
            .map(|r| parser.tokens()[r.start].variable().unwrap().name.clone())
            .collect()
    }

    fn words_of(parser: &Parser, name: &str) -> Vec<String> {
        let range = parser::find_variable(parser.tokens(), name).unwrap();
        range
            .values()
            .filter_map(|i| parser.tokens()[i].word())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_replace_existing() {
        let p = run_merge(
            "PORTNAME=\tfoo\nDISTVERSION=\t1.0\n",
            "DISTVERSION=2.0\n",
            MergeFlags::default(),
        );
        assert_eq!(words_of(&p, "DISTVERSION"), vec!["2.0"]);
        assert!(p.is_edited());
    }

    #[test]
    fn test_insert_in_canonical_position() {
        let p = run_merge(
            "PORTNAME=\tfoo\nCATEGORIES=\tdevel\n",
            "PORTREVISION=1\n",
            MergeFlags::default(),
        );
        assert_eq!(
            live_names(&p),
            vec!["PORTNAME", "PORTREVISION", "CATEGORIES"]
        );
    }

    #[test]
    fn test_insert_at_end_when_greatest() {
        let p = run_merge(
            "PORTNAME=\tfoo\n",
            "MY_UNKNOWN_VAR=1\n",
            MergeFlags::default(),
        );
        assert_eq!(live_names(&p), vec!["PORTNAME", "MY_UNKNOWN_VAR"]);
    }

    #[test]
    fn test_shell_empty_deletes() {
        let p = run_merge(
            "PORTNAME=\tfoo\nPORTREVISION=\t1\n",
            "PORTREVISION!=\n",
            MergeFlags::default(),
        );
        assert_eq!(live_names(&p), vec!["PORTNAME"]);
    }

    #[test]
    fn test_shell_delete_disabled() {
        let flags = MergeFlags {
            shell_is_delete: false,
            merge_comments: false,
        };
        let p = run_merge("PORTREVISION=\t1\n", "PORTREVISION!=\n", flags);
        // Without the delete semantics the overlay replaces the assignment.
        assert_eq!(live_names(&p), vec!["PORTREVISION"]);
        let range = parser::find_variable(p.tokens(), "PORTREVISION").unwrap();
        assert_eq!(
            p.tokens()[range.start].variable().unwrap().modifier,
            Modifier::Shell
        );
    }

    #[test]
    fn test_delete_absent_is_noop() {
        let p = run_merge("PORTNAME=\tfoo\n", "PORTREVISION!=\n", MergeFlags::default());
        assert_eq!(live_names(&p), vec!["PORTNAME"]);
        assert!(!p.is_edited());
    }

    #[test]
    fn test_merge_comments_carried_on_insert() {
        let flags = MergeFlags {
            shell_is_delete: true,
            merge_comments: true,
        };
        let p = run_merge(
            "PORTNAME=\tfoo\n",
            "# bumped for openssl\nPORTREVISION=1\n",
            flags,
        );
        let has_comment = p.tokens().iter().any(
            |t| matches!(&t.data, TokenData::Comment(c) if c == "# bumped for openssl"),
        );
        assert!(has_comment);
    }
}
