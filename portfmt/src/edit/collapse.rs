//! Collapse adjacent assignments to the same variable.
//!
//! `FOO= a` directly followed by `FOO+= b` carries no conditional logic; the
//! pair collapses into a single assignment holding both values. Only
//! enabled via the `COLLAPSE_ADJACENT_VARIABLES` behavior flag.

use std::rc::Rc;

use crate::edit::{self, EditPass};
use crate::models::Result;
use crate::parser::token::{Modifier, Token, TokenData};
use crate::parser::Parser;

pub struct CollapseAdjacentVariables;

impl EditPass for CollapseAdjacentVariables {
    fn name(&self) -> &'static str {
        "collapse-adjacent-variables"
    }

    fn run(&self, parser: &mut Parser, mut tokens: Vec<Token>) -> Result<Vec<Token>> {
        let mut changed_any = false;

        loop {
            let ranges = edit::editable_ranges(&tokens);
            let Some((first, second)) = ranges.windows(2).find_map(|w| {
                let (a, b) = (w[0], w[1]);
                if b.start != a.end + 1 {
                    return None;
                }
                let va = tokens[a.start].variable()?;
                let vb = tokens[b.start].variable()?;
                (va.name == vb.name && vb.modifier == Modifier::Append).then_some((a, b))
            }) else {
                break;
            };

            let var = Rc::clone(tokens[first.start].variable().expect("checked above"));
            let moved: Vec<Token> = second
                .values()
                .map(|i| {
                    let mut t = tokens[i].clone();
                    if let TokenData::VariableToken(_, w) = &t.data {
                        t.data = TokenData::VariableToken(Rc::clone(&var), w.clone());
                    }
                    t.edited = true;
                    t
                })
                .collect();

            // Drop the second range entirely, then graft its values onto the
            // first, just before the VariableEnd.
            tokens.drain(second.start..=second.end);
            tokens.splice(first.end..first.end, moved);
            tokens[first.start].edited = true;
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
    use crate::models::Settings;
    use crate::parser;

    fn run(input: &str) -> Parser {
        let mut p = Parser::new(Settings::default());
        p.read("test", input).unwrap();
        apply(&mut p, &CollapseAdjacentVariables).unwrap();
        p
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
    fn test_collapses_adjacent_append() {
        let p = run("PLIST_FILES=\tbin/a\nPLIST_FILES+=\tbin/b\n");
        assert_eq!(words_of(&p, "PLIST_FILES"), vec!["bin/a", "bin/b"]);
        assert_eq!(parser::variable_ranges(p.tokens()).len(), 1);
        assert!(p.is_edited());
    }

    #[test]
    fn test_collapses_a_chain() {
        let p = run("A=\t1\nA+=\t2\nA+=\t3\n");
        assert_eq!(words_of(&p, "A"), vec!["1", "2", "3"]);
        assert_eq!(parser::variable_ranges(p.tokens()).len(), 1);
    }

    #[test]
    fn test_separated_ranges_not_collapsed() {
        let p = run("A=\t1\n\nA+=\t2\n");
        assert_eq!(parser::variable_ranges(p.tokens()).len(), 2);
        assert!(!p.is_edited());
    }

    #[test]
    fn test_different_names_not_collapsed() {
        let p = run("A=\t1\nB+=\t2\n");
        assert_eq!(parser::variable_ranges(p.tokens()).len(), 2);
        assert!(!p.is_edited());
    }

    #[test]
    fn test_reassignment_not_collapsed() {
        let p = run("A=\t1\nA=\t2\n");
        assert_eq!(parser::variable_ranges(p.tokens()).len(), 2);
        assert!(!p.is_edited());
    }
}
