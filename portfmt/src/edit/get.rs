//! Print the values of variables matching a name pattern.

use regex::Regex;

use crate::edit::EditPass;
use crate::models::{Error, Result};
use crate::parser::token::Token;
use crate::parser::{self, Parser};

pub struct GetVariables {
    pattern: Regex,
}

impl GetVariables {
    /// The pattern is anchored: `get PORTNAME` matches only `PORTNAME`,
    /// `get '.*_DEPENDS'` matches every dependency list.
    pub fn new(pattern: &str) -> Result<Self> {
        let anchored = format!("^(?:{pattern})$");
        let pattern = Regex::new(&anchored)
            .map_err(|e| Error::InvalidArgument(format!("bad regex: {e}")))?;
        Ok(Self { pattern })
    }
}

impl EditPass for GetVariables {
    fn name(&self) -> &'static str {
        "get"
    }

    fn run(&self, parser: &mut Parser, tokens: Vec<Token>) -> Result<Vec<Token>> {
        let mut matched = false;
        for range in parser::variable_ranges(&tokens) {
            let Some(var) = tokens[range.start].variable().cloned() else {
                continue;
            };
            if !self.pattern.is_match(&var.name) {
                continue;
            }
            matched = true;
            for i in range.values() {
                if let Some(word) = tokens[i].word() {
                    if !word.starts_with('#') {
                        parser.enqueue_output(word.to_string());
                    }
                }
            }
        }
        if !matched {
            return Err(Error::NotFound(self.pattern.to_string()));
        }
        Ok(tokens)
    }
}
