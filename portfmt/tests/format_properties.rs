//! End-to-end properties of the format pipeline, exercised through the
//! library API over literal inputs and the fixtures corpus.

use portfmt::edit::bump::bump_revision;
use portfmt::edit::set_version::SetVersion;
use portfmt::parser::token::TokenData;
use portfmt::{edit, emitter, Behavior, Parser, Settings};

fn format(input: &str) -> String {
    portfmt::format_document("test", input, Settings::default(), &[])
        .unwrap()
        .0
}

fn fixture(name: &str) -> String {
    let path = format!("{}/tests/fixtures/{name}", env!("CARGO_MANIFEST_DIR"));
    std::fs::read_to_string(path).unwrap()
}

#[test]
fn scenario_reorder_across_blocks() {
    assert_eq!(format("COMMENT= c\nPORTNAME=foo\n"), "PORTNAME=\tfoo\n\nCOMMENT=\tc\n");
}

#[test]
fn scenario_sort_uses() {
    assert_eq!(format("USES= python gmake cmake\n"), "USES=\tcmake gmake python\n");
}

#[test]
fn scenario_sanitize_cmake_args() {
    assert_eq!(
        format("CMAKE_ARGS= -D FOO=1 -DBAR=2\n"),
        "CMAKE_ARGS=\t-DFOO=1 \\\n\t\t-DBAR=2\n"
    );
}

#[test]
fn scenario_bump_revision_absent() {
    let (output, _) = portfmt::edit_document(
        "test",
        "PORTNAME=foo\n",
        Settings::with_behavior(Behavior::OUTPUT_EDITED),
        &bump_revision(),
    )
    .unwrap();
    assert!(output.contains("PORTREVISION=\t1"), "got: {output}");
}

#[test]
fn scenario_bump_revision_present() {
    let (output, _) = portfmt::edit_document(
        "test",
        "PORTNAME=\tfoo\nPORTREVISION=\t3\n",
        Settings::with_behavior(Behavior::OUTPUT_EDITED),
        &bump_revision(),
    )
    .unwrap();
    assert!(output.contains("PORTREVISION=\t4"), "got: {output}");
}

#[test]
fn scenario_set_version_replaces_and_resets() {
    let (output, _) = portfmt::edit_document(
        "test",
        "DISTVERSION=\t1.0\nPORTREVISION=\t1\n",
        Settings::with_behavior(Behavior::OUTPUT_EDITED),
        &SetVersion::new("2.0"),
    )
    .unwrap();
    assert!(output.contains("DISTVERSION=\t2.0"), "got: {output}");
    assert!(!output.contains("PORTREVISION"), "got: {output}");
}

#[test]
fn scenario_lint_reports_move() {
    let lines =
        portfmt::lint_document("test", "MAINTAINER=x\nPORTNAME=y\n", Settings::default()).unwrap();
    let joined = lines.join("\n");
    assert!(joined.contains("-MAINTAINER"), "got:\n{joined}");
    assert!(joined.contains("+MAINTAINER"), "got:\n{joined}");
    assert!(joined.contains("PORTNAME"), "got:\n{joined}");
}

#[test]
fn property_roundtrip_idempotence() {
    for input in [
        "COMMENT= c\nPORTNAME=foo\n",
        "USES= python gmake cmake\n",
        "CMAKE_ARGS= -D FOO=1 -DBAR=2\n",
        "USES=cmake # note\nPORTNAME=foo\n",
        "PLIST_FILES+=\tbin/foo\nPLIST_FILES+=\tbin/bar\n",
        &fixture("example.in"),
        &fixture("reorder.in"),
    ] {
        let once = format(input);
        let twice = format(&once);
        assert_eq!(once, twice, "not idempotent for:\n{input}");
    }
}

#[test]
fn property_curated_expected_output() {
    assert_eq!(format(&fixture("reorder.in")), fixture("reorder.expected"));
}

#[test]
fn property_parse_unparse_fidelity() {
    // With no passes applied and edited-only output, the emitter must
    // reproduce the input byte for byte (modulo a normalized trailing
    // newline).
    for input in [
        "PORTNAME=  foo\n",
        "# comment   with   spaces\n\n\nUSES= b a\n",
        ".if defined(DEVELOPER)\nDEV=\t1\n.else\nDEV=\t2\n.endif\n",
        "do-build:\n\t@echo    spaced   out\n\npost-install:\n\t@true\n",
        &fixture("example.in"),
    ] {
        let mut parser = Parser::new(Settings::with_behavior(Behavior::OUTPUT_EDITED));
        parser.read("test", input).unwrap();
        let output = emitter::emit(&parser).unwrap();
        assert_eq!(output, input);
    }
}

#[test]
fn property_rejection_corpus() {
    let dir = format!("{}/tests/fixtures/reject", env!("CARGO_MANIFEST_DIR"));
    let mut checked = 0;
    for entry in std::fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        let input = std::fs::read_to_string(&path).unwrap();
        let mut parser = Parser::new(Settings::default());
        assert!(
            parser.read(&path.display().to_string(), &input).is_err(),
            "expected rejection for {}",
            path.display()
        );
        checked += 1;
    }
    assert!(checked >= 6);
}

#[test]
fn property_lint_agrees_with_format() {
    // A file format leaves alone lints clean; a reordered file lints dirty.
    let canonical = format(&fixture("example.in"));
    let lines = portfmt::lint_document("test", &canonical, Settings::default()).unwrap();
    assert!(lines.is_empty(), "lint on formatted output:\n{}", lines.join("\n"));

    let lines =
        portfmt::lint_document("test", &fixture("reorder.in"), Settings::default()).unwrap();
    assert!(!lines.is_empty());
}

#[test]
fn property_token_stream_invariants_after_pipeline() {
    for input in [
        &fixture("example.in")[..],
        "CMAKE_ARGS= -D A=1 -D B=2\nUSES= b a b\nFOO+=x\nFOO+=y\n",
        "X=1\n.if defined(Y)\nY=2\n.endif\nZ=3\n",
    ] {
        let settings = Settings::default();
        let behavior = settings.behavior;
        let mut parser = Parser::new(settings);
        parser.read("test", input).unwrap();
        let passes = edit::format_pipeline(behavior, &[]);
        edit::apply_all(&mut parser, &passes).unwrap();
        assert_invariants(&parser);
    }
}

fn assert_invariants(parser: &Parser) {
    let tokens = parser.tokens();
    let mut starts = 0usize;
    let mut ends = 0usize;
    let mut open: Option<usize> = None;

    for (i, token) in tokens.iter().enumerate() {
        assert!(
            !(token.edited && token.gc),
            "token {i} is both edited and gc"
        );
        match &token.data {
            TokenData::VariableStart(_) => {
                assert!(open.is_none(), "nested variable start at {i}");
                open = Some(token.depth);
                starts += 1;
            }
            TokenData::VariableEnd(_) => {
                let depth = open.take().expect("end without start");
                assert_eq!(depth, token.depth, "bracket depth mismatch at {i}");
                ends += 1;
            }
            TokenData::VariableToken(..) => {
                assert!(open.is_some(), "value token outside brackets at {i}");
            }
            _ => assert!(open.is_none(), "foreign token inside brackets at {i}"),
        }
    }
    assert!(open.is_none(), "unclosed variable range");
    assert_eq!(starts, ends, "start/end count mismatch");
}

mod random_inputs {
    use super::*;
    use proptest::prelude::*;

    fn variable_name() -> impl Strategy<Value = String> {
        prop::sample::select(vec![
            "PORTNAME",
            "DISTVERSION",
            "CATEGORIES",
            "MAINTAINER",
            "COMMENT",
            "USES",
            "CMAKE_ARGS",
            "PLIST_FILES",
            "MY_CUSTOM",
            "X11_CMAKE_ON",
        ])
        .prop_map(String::from)
    }

    fn word() -> impl Strategy<Value = String> {
        "[a-z0-9${}/.:-]{1,12}".prop_filter("no bare comment", |w| !w.starts_with('#'))
    }

    fn line() -> impl Strategy<Value = String> {
        prop_oneof![
            (variable_name(), prop::collection::vec(word(), 0..4), "[=+?:]?")
                .prop_map(|(name, words, m)| {
                    let modifier = match m.as_str() {
                        "+" => "+=",
                        "?" => "?=",
                        ":" => ":=",
                        _ => "=",
                    };
                    format!("{name}{modifier}\t{}", words.join(" "))
                }),
            Just(String::new()),
            word().prop_map(|w| format!("# {w}")),
        ]
    }

    fn document() -> impl Strategy<Value = String> {
        prop::collection::vec(line(), 0..12).prop_map(|lines| {
            let mut doc = lines.join("\n");
            doc.push('\n');
            doc
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn invariants_hold_for_random_documents(input in document()) {
            let settings = Settings::default();
            let behavior = settings.behavior;
            let mut parser = Parser::new(settings);
            prop_assume!(parser.read("test", &input).is_ok());
            let passes = edit::format_pipeline(behavior, &[]);
            edit::apply_all(&mut parser, &passes).unwrap();
            assert_invariants(&parser);
        }

        #[test]
        fn format_is_idempotent_for_random_documents(input in document()) {
            let once = match portfmt::format_document("test", &input, Settings::default(), &[]) {
                Ok((out, _)) => out,
                Err(_) => return Ok(()),
            };
            let (twice, _) =
                portfmt::format_document("test", &once, Settings::default(), &[]).unwrap();
            prop_assert_eq!(once, twice);
        }
    }
}
