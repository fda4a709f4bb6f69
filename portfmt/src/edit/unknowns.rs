//! Enumerate variables and targets the framework does not know about.
//!
//! Used by `portedit unknown-vars` / `unknown-targets` and by the batch
//! scanner. Names are reported deduplicated, in order of first appearance.

use std::collections::HashSet;

use crate::edit::EditPass;
use crate::models::Result;
use crate::parser::token::Token;
use crate::parser::{self, Parser};
use crate::rules::{self, Block};

/// Is this name outside the canonical schema? Options helpers count as
/// known only when their option is actually declared.
fn is_unknown_variable(parser: &Parser, name: &str) -> bool {
    match rules::variable_order_block(name) {
        Block::Unknown => true,
        Block::OptionsHelpers => match rules::split_helper(name) {
            Some((opt, _)) => !parser.options().contains(opt),
            None => true,
        },
        Block::OptionsDefinitions => {
            // `<OPT>_DESC` for an undeclared option is as suspicious as an
            // unknown variable.
            match name.strip_suffix("_DESC") {
                Some(opt) if rules::blocks::member_index(name).is_none() => {
                    !parser.options().contains(opt) && !parser.option_groups().contains(opt)
                }
                _ => false,
            }
        }
        _ => false,
    }
}

/// Derived names contributed by an option's `_USE` / `_VARS` helpers.
fn derived_names(parser: &Parser, tokens: &[Token]) -> Vec<String> {
    let index = parser::variable_index(tokens);
    let mut derived = Vec::new();
    // HashSet iteration order must not leak into the report.
    let mut options: Vec<&String> = parser.options().iter().collect();
    options.sort();
    for option in options {
        for suffix in ["_USE", "_VARS", "_USE_OFF", "_VARS_OFF"] {
            let helper = format!("{option}{suffix}");
            let Some(ranges) = index.get(&helper) else {
                continue;
            };
            for range in ranges {
                for i in range.values() {
                    let Some(word) = tokens[i].word() else {
                        continue;
                    };
                    if word.starts_with('#') {
                        continue;
                    }
                    let Some(eq) = word.find('=') else {
                        continue;
                    };
                    let lhs = word[..eq].trim_end_matches('+');
                    if suffix.starts_with("_USE") {
                        derived.push(format!("USE_{}", lhs.to_uppercase()));
                    } else {
                        derived.push(lhs.to_string());
                    }
                }
            }
        }
    }
    derived
}

/// All unknown variable names in the document, first-appearance order.
pub fn unknown_variables(parser: &Parser, tokens: &[Token]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    let direct = parser::variable_ranges(tokens)
        .into_iter()
        .map(|r| {
            tokens[r.start]
                .variable()
                .expect("variable range")
                .name
                .clone()
        })
        .collect::<Vec<_>>();

    for name in direct.into_iter().chain(derived_names(parser, tokens)) {
        if is_unknown_variable(parser, &name) && seen.insert(name.clone()) {
            out.push(name);
        }
    }
    out
}

/// All unknown target names, first-appearance order. Targets spelled with
/// a variable reference cannot be judged and are skipped.
pub fn unknown_targets(parser: &Parser, tokens: &[Token]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for name in parser::target_names(tokens) {
        if name.contains('$') {
            continue;
        }
        if !rules::is_known_target(&name, parser.options()) && seen.insert(name.clone()) {
            out.push(name);
        }
    }
    out
}

/// Variables assigned more than once at depth zero with a clobbering
/// modifier.
pub fn duplicate_variables(tokens: &[Token]) -> Vec<String> {
    use crate::parser::token::Modifier;
    let mut counts: Vec<(String, usize)> = Vec::new();
    for range in parser::variable_ranges(tokens) {
        if tokens[range.start].depth != 0 {
            continue;
        }
        let Some(var) = tokens[range.start].variable() else {
            continue;
        };
        if !matches!(var.modifier, Modifier::Assign | Modifier::Expand) {
            continue;
        }
        match counts.iter_mut().find(|(n, _)| *n == var.name) {
            Some((_, c)) => *c += 1,
            None => counts.push((var.name.clone(), 1)),
        }
    }
    counts
        .into_iter()
        .filter(|(_, c)| *c > 1)
        .map(|(n, _)| n)
        .collect()
}

pub struct OutputUnknownVariables;

impl EditPass for OutputUnknownVariables {
    fn name(&self) -> &'static str {
        "output-unknown-variables"
    }

    fn run(&self, parser: &mut Parser, tokens: Vec<Token>) -> Result<Vec<Token>> {
        for name in unknown_variables(parser, &tokens) {
            parser.enqueue_output(name);
        }
        Ok(tokens)
    }
}

pub struct OutputUnknownTargets;

impl EditPass for OutputUnknownTargets {
    fn name(&self) -> &'static str {
        "output-unknown-targets"
    }

    fn run(&self, parser: &mut Parser, tokens: Vec<Token>) -> Result<Vec<Token>> {
        for name in unknown_targets(parser, &tokens) {
            parser.enqueue_output(name);
        }
        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Settings;

    fn parse(input: &str) -> Parser {
        let mut p = Parser::new(Settings::default());
        p.read("test", input).unwrap();
        p
    }

    #[test]
    fn test_unknown_variable_detected() {
        let p = parse("PORTNAME=\tfoo\nMY_KNOB=\t1\n");
        let unknown = unknown_variables(&p, p.tokens());
        assert_eq!(unknown, vec!["MY_KNOB"]);
    }

    #[test]
    fn test_declared_option_helper_is_known() {
        let p = parse("OPTIONS_DEFINE=\tX11\nX11_CMAKE_ON=\t-DX11=1\n");
        assert!(unknown_variables(&p, p.tokens()).is_empty());
    }

    #[test]
    fn test_undeclared_option_helper_is_unknown() {
        let p = parse("X11_CMAKE_ON=\t-DX11=1\n");
        assert_eq!(unknown_variables(&p, p.tokens()), vec!["X11_CMAKE_ON"]);
    }

    #[test]
    fn test_vars_helper_contributes_derived_names() {
        let p = parse("OPTIONS_DEFINE=\tX11\nX11_VARS=\tMY_SWITCH=on USES+=xorg\n");
        let unknown = unknown_variables(&p, p.tokens());
        assert!(unknown.contains(&"MY_SWITCH".to_string()));
        assert!(!unknown.contains(&"USES".to_string()));
    }

    #[test]
    fn test_use_helper_contributes_use_names() {
        let p = parse("OPTIONS_DEFINE=\tGNOME\nGNOME_USE=\tweird=glib20\n");
        let unknown = unknown_variables(&p, p.tokens());
        // USE_WEIRD matches the generic USE_ pattern, so it stays known;
        // nothing else should be flagged.
        assert!(unknown.is_empty());
    }

    #[test]
    fn test_unknown_targets() {
        let p = parse("do-install:\n\t@true\nmy-helper:\n\t@true\n");
        assert_eq!(unknown_targets(&p, p.tokens()), vec!["my-helper"]);
    }

    #[test]
    fn test_option_hook_target_is_known() {
        let p = parse("OPTIONS_DEFINE=\tX11\npost-patch-X11-on:\n\t@true\n");
        assert!(unknown_targets(&p, p.tokens()).is_empty());
    }

    #[test]
    fn test_variable_ref_target_skipped() {
        let p = parse("${CUSTOM}:\n\t@true\n");
        assert!(unknown_targets(&p, p.tokens()).is_empty());
    }

    #[test]
    fn test_duplicate_variables() {
        let p = parse("FOO=\t1\nBAR=\t2\nFOO=\t3\nBAZ+=\t4\nBAZ+=\t5\n");
        assert_eq!(duplicate_variables(p.tokens()), vec!["FOO"]);
    }

    #[test]
    fn test_duplicates_in_conditional_arms_not_counted() {
        let input = ".if ${ARCH} == amd64\nFOO=\t1\n.else\nFOO=\t2\n.endif\n";
        let p = parse(input);
        assert!(duplicate_variables(p.tokens()).is_empty());
    }
}
