//! Rewrite a first-occurrence `+=` to `=`.
//!
//! Appending to a variable nothing has assigned yet relies on the framework
//! not having seeded it, which is wrong for everything except the compiler
//! flag family. Second and later appearances keep their modifier.

use std::collections::HashSet;
use std::rc::Rc;

use crate::edit::{self, EditPass};
use crate::models::Result;
use crate::parser::token::{Modifier, Token, TokenData, Variable};
use crate::parser::Parser;
use crate::rules;

pub struct SanitizeAppendModifier;

impl EditPass for SanitizeAppendModifier {
    fn name(&self) -> &'static str {
        "sanitize-append-modifier"
    }

    fn run(&self, parser: &mut Parser, mut tokens: Vec<Token>) -> Result<Vec<Token>> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut changed_any = false;

        for range in edit::editable_ranges(&tokens) {
            let Some(var) = tokens[range.start].variable().cloned() else {
                continue;
            };
            let first = seen.insert(var.name.clone());
            if !first {
                continue;
            }
            if var.modifier != Modifier::Append || rules::is_append_only_variable(&var.name) {
                continue;
            }

            let fixed = Rc::new(Variable::new(var.name.clone(), Modifier::Assign));
            for i in range.start..=range.end {
                let token = &mut tokens[i];
                token.data = match &token.data {
                    TokenData::VariableStart(_) => TokenData::VariableStart(Rc::clone(&fixed)),
                    TokenData::VariableToken(_, w) => {
                        TokenData::VariableToken(Rc::clone(&fixed), w.clone())
                    }
                    TokenData::VariableEnd(_) => TokenData::VariableEnd(Rc::clone(&fixed)),
                    other => other.clone(),
                };
                token.edited = true;
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
    use crate::models::Settings;
    use crate::parser;

    fn run(input: &str) -> Parser {
        let mut p = Parser::new(Settings::default());
        p.read("test", input).unwrap();
        apply(&mut p, &SanitizeAppendModifier).unwrap();
        p
    }

    fn modifier_of(parser: &Parser, nth: usize) -> Modifier {
        let ranges = parser::variable_ranges(parser.tokens());
        parser.tokens()[ranges[nth].start]
            .variable()
            .unwrap()
            .modifier
    }

    #[test]
    fn test_first_append_becomes_assign() {
        let p = run("PLIST_FILES+=\tbin/foo\n");
        assert_eq!(modifier_of(&p, 0), Modifier::Assign);
        assert!(p.is_edited());
    }

    #[test]
    fn test_second_append_is_left_alone() {
        let p = run("PLIST_FILES=\tbin/foo\nPLIST_FILES+=\tbin/bar\n");
        assert_eq!(modifier_of(&p, 0), Modifier::Assign);
        assert_eq!(modifier_of(&p, 1), Modifier::Append);
    }

    #[test]
    fn test_append_only_variable_keeps_append() {
        let p = run("CXXFLAGS+=\t-fno-strict-aliasing\n");
        assert_eq!(modifier_of(&p, 0), Modifier::Append);
        assert!(!p.is_edited());
    }

    #[test]
    fn test_stops_at_port_mk_include() {
        let input = ".include <bsd.port.pre.mk>\nFOO+=\tbar\n.include <bsd.port.post.mk>\n";
        let p = run(input);
        assert_eq!(modifier_of(&p, 0), Modifier::Append);
        assert!(!p.is_edited());
    }
}
