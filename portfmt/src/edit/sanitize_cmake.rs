//! Join split `-D` arguments in CMake and Meson variables.
//!
//! `CMAKE_ARGS= -D FOO=1` and `CMAKE_ARGS= -DFOO=1` are equivalent to the
//! build system, but the split spelling defeats per-token sorting and
//! wrapping. The pass joins the pair into one token; the originals stay in
//! the stream marked for garbage collection.

use crate::edit::{self, EditPass};
use crate::models::Result;
use crate::parser::token::{Token, TokenData};
use crate::parser::Parser;
use crate::rules;

pub struct SanitizeCmakeArgs;

impl EditPass for SanitizeCmakeArgs {
    fn name(&self) -> &'static str {
        "sanitize-cmake-args"
    }

    fn run(&self, parser: &mut Parser, mut tokens: Vec<Token>) -> Result<Vec<Token>> {
        let mut changed_any = false;

        for range in edit::editable_ranges(&tokens).into_iter().rev() {
            let Some(var) = tokens[range.start].variable().cloned() else {
                continue;
            };
            if !rules::is_cmake_args_like(&var.name) {
                continue;
            }

            let mut i = range.start + 1;
            while i + 1 < range_end(&tokens, range.start) {
                let joins = tokens[i].word() == Some("-D")
                    && !tokens[i].gc
                    && tokens[i + 1]
                        .word()
                        .is_some_and(|w| !w.starts_with('#') && !w.starts_with('-'));
                if joins {
                    let joined = format!("-D{}", tokens[i + 1].word().unwrap_or_default());
                    tokens[i].gc = true;
                    tokens[i + 1].gc = true;
                    let token = Token::synthetic(
                        TokenData::VariableToken(var.clone(), joined),
                        tokens[i].depth,
                    );
                    tokens.insert(i + 2, token);
                    tokens[range.start].edited = true;
                    changed_any = true;
                    i += 3;
                } else {
                    i += 1;
                }
            }
        }

        if changed_any {
            parser.mark_edited();
        }
        Ok(tokens)
    }
}

/// Index of the `VariableEnd` of the range starting at `start`, after any
/// insertions moved it.
fn range_end(tokens: &[Token], start: usize) -> usize {
    tokens[start..]
        .iter()
        .position(|t| t.is_variable_end())
        .map(|off| start + off)
        .unwrap_or(tokens.len())
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
        apply(&mut p, &SanitizeCmakeArgs).unwrap();
        p
    }

    fn live_words(parser: &Parser, name: &str) -> Vec<String> {
        let range = parser::find_variable(parser.tokens(), name).unwrap();
        range
            .values()
            .filter(|&i| !parser.tokens()[i].gc)
            .filter_map(|i| parser.tokens()[i].word())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_joins_split_define() {
        let p = run("CMAKE_ARGS=\t-D FOO=1 -DBAR=2\n");
        assert_eq!(live_words(&p, "CMAKE_ARGS"), vec!["-DFOO=1", "-DBAR=2"]);
        assert!(p.is_edited());
    }

    #[test]
    fn test_meson_args_too() {
        let p = run("MESON_ARGS=\t-D b_lto=true\n");
        assert_eq!(live_words(&p, "MESON_ARGS"), vec!["-Db_lto=true"]);
    }

    #[test]
    fn test_option_helper_on_off() {
        let p = run("X11_CMAKE_ON=\t-D WITH_X11=1\n");
        assert_eq!(live_words(&p, "X11_CMAKE_ON"), vec!["-DWITH_X11=1"]);
    }

    #[test]
    fn test_other_variables_untouched() {
        let p = run("CONFIGURE_ARGS=\t-D FOO=1\n");
        assert_eq!(live_words(&p, "CONFIGURE_ARGS"), vec!["-D", "FOO=1"]);
        assert!(!p.is_edited());
    }

    #[test]
    fn test_lone_trailing_dash_d_is_kept() {
        let p = run("CMAKE_ARGS=\t-DFOO=1 -D\n");
        assert_eq!(live_words(&p, "CMAKE_ARGS"), vec!["-DFOO=1", "-D"]);
        assert!(!p.is_edited());
    }

    #[test]
    fn test_gc_tokens_remain_reachable() {
        let p = run("CMAKE_ARGS=\t-D FOO=1\n");
        let gc_count = p.tokens().iter().filter(|t| t.gc).count();
        assert_eq!(gc_count, 2);
        // No token is both edited and garbage.
        assert!(p.tokens().iter().all(|t| !(t.edited && t.gc)));
    }
}
