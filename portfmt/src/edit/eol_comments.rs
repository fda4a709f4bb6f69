//! Hoist trailing comments off assignment lines.
//!
//! A comment at the end of a value list is fragile under wrapping: once the
//! value gains a continuation, the comment swallows everything after it.
//! The pass moves it to a standalone comment line directly above the
//! assignment. Variables on the preserve list keep theirs.

use crate::edit::{self, EditPass};
use crate::models::Result;
use crate::parser::token::{Token, TokenData};
use crate::parser::Parser;
use crate::rules;

pub struct SanitizeEolComments;

impl EditPass for SanitizeEolComments {
    fn name(&self) -> &'static str {
        "sanitize-eol-comments"
    }

    fn run(&self, parser: &mut Parser, mut tokens: Vec<Token>) -> Result<Vec<Token>> {
        let mut changed_any = false;

        for range in edit::editable_ranges(&tokens).into_iter().rev() {
            let Some(var) = tokens[range.start].variable().cloned() else {
                continue;
            };
            if rules::preserve_eol_comment(&var.name) {
                continue;
            }
            // Only a comment that concludes a non-empty value list moves; a
            // value-less assignment holding just a comment stays readable
            // as-is.
            if range.values().len() < 2 {
                continue;
            }
            let last = range.end - 1;
            let Some(comment) = tokens[last]
                .word()
                .filter(|w| w.starts_with('#'))
                .map(String::from)
            else {
                continue;
            };

            let hoisted = Token::synthetic(
                TokenData::Comment(comment),
                tokens[range.start].depth,
            );
            tokens[last].gc = true;
            tokens[range.start].edited = true;
            tokens.insert(range.start, hoisted);
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
        apply(&mut p, &SanitizeEolComments).unwrap();
        p
    }

    #[test]
    fn test_hoists_trailing_comment() {
        let p = run("USES=\tcmake # wants 3.20\n");
        let tokens = p.tokens();
        match &tokens[0].data {
            TokenData::Comment(text) => assert_eq!(text, "# wants 3.20"),
            other => panic!("expected hoisted comment first, got {}", other.variety()),
        }
        let range = parser::find_variable(tokens, "USES").unwrap();
        let live: Vec<&str> = range
            .values()
            .filter(|&i| !tokens[i].gc)
            .filter_map(|i| tokens[i].word())
            .collect();
        assert_eq!(live, vec!["cmake"]);
        assert!(p.is_edited());
    }

    #[test]
    fn test_preserved_variable_keeps_comment() {
        let p = run("BROKEN=\tfails to link # see bug 1234\n");
        assert!(!p.is_edited());
        assert!(matches!(
            p.tokens()[0].data,
            TokenData::VariableStart(_)
        ));
    }

    #[test]
    fn test_comment_only_value_not_hoisted() {
        let p = run("USES=\t# placeholder\n");
        assert!(!p.is_edited());
    }

    #[test]
    fn test_no_comment_no_change() {
        let p = run("USES=\tcmake gmake\n");
        assert!(!p.is_edited());
    }
}
