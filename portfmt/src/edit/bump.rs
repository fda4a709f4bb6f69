//! Bump `PORTREVISION` / `PORTEPOCH`.
//!
//! An existing numeric value is incremented in place; a missing variable is
//! synthesized at its canonical position via merge.

use std::rc::Rc;

use crate::edit::merge::{Merge, MergeFlags};
use crate::edit::{self, EditPass};
use crate::models::{Error, Result};
use crate::parser::token::{Token, TokenData, Variable};
use crate::parser::{self, Parser};

pub struct BumpVariable {
    name: &'static str,
}

/// `portedit bump-revision`.
pub fn bump_revision() -> BumpVariable {
    BumpVariable {
        name: "PORTREVISION",
    }
}

/// `portedit bump-epoch`.
pub fn bump_epoch() -> BumpVariable {
    BumpVariable { name: "PORTEPOCH" }
}

impl EditPass for BumpVariable {
    fn name(&self) -> &'static str {
        match self.name {
            "PORTEPOCH" => "bump-epoch",
            _ => "bump-revision",
        }
    }

    fn run(&self, parser: &mut Parser, mut tokens: Vec<Token>) -> Result<Vec<Token>> {
        let range = edit::editable_ranges(&tokens).into_iter().find(|r| {
            tokens[r.start]
                .variable()
                .is_some_and(|v| v.name == self.name)
        });

        let Some(range) = range else {
            let merge = Merge::from_snippet(&format!("{}=1\n", self.name), MergeFlags::default())?;
            return merge.run(parser, tokens);
        };

        let words: Vec<&str> = parser::range_words(&tokens, &range);
        let current: u64 = match words.as_slice() {
            [single] => single
                .parse()
                .map_err(|_| Error::ExpectedInt(format!("{}: {}", self.name, single)))?,
            _ => return Err(Error::ExpectedInt(self.name.to_string())),
        };

        let var = tokens[range.start].variable().cloned().unwrap_or_else(|| {
            Rc::new(Variable::new(
                self.name,
                crate::parser::token::Modifier::Assign,
            ))
        });
        let bumped = Token::synthetic(
            TokenData::VariableToken(var, (current + 1).to_string()),
            tokens[range.start].depth,
        );
        tokens.splice(range.values(), std::iter::once(bumped));
        tokens[range.start].edited = true;
        parser.mark_edited();
        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::apply;
    use crate::models::Settings;

    fn run_bump(input: &str, pass: BumpVariable) -> Result<Parser> {
        let mut p = Parser::new(Settings::default());
        p.read("test", input).unwrap();
        apply(&mut p, &pass)?;
        Ok(p)
    }

    fn value_of(parser: &Parser, name: &str) -> String {
        let range = parser::find_variable(parser.tokens(), name).unwrap();
        range
            .values()
            .filter_map(|i| parser.tokens()[i].word())
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn test_bump_present_revision() {
        let p = run_bump("PORTNAME=\tfoo\nPORTREVISION=\t3\n", bump_revision()).unwrap();
        assert_eq!(value_of(&p, "PORTREVISION"), "4");
        assert!(p.is_edited());
    }

    #[test]
    fn test_bump_absent_revision_synthesizes_one() {
        let p = run_bump("PORTNAME=\tfoo\n", bump_revision()).unwrap();
        assert_eq!(value_of(&p, "PORTREVISION"), "1");
    }

    #[test]
    fn test_bump_epoch() {
        let p = run_bump("PORTNAME=\tfoo\nPORTEPOCH=\t1\n", bump_epoch()).unwrap();
        assert_eq!(value_of(&p, "PORTEPOCH"), "2");
    }

    #[test]
    fn test_non_numeric_revision_fails() {
        let err = run_bump("PORTREVISION=\t${REV}\n", bump_revision()).unwrap_err();
        assert!(matches!(err, Error::ExpectedInt(_)));
    }

    #[test]
    fn test_empty_revision_fails() {
        let err = run_bump("PORTREVISION=\n", bump_revision()).unwrap_err();
        assert!(matches!(err, Error::ExpectedInt(_)));
    }
}
