//! # portfmt - format and lint ports collection Makefiles
//!
//! A parse-classify-transform-emit pipeline for the Makefile dialect used
//! by ports trees:
//!
//! - **Parser**: folds continuations, classifies lines, produces a
//!   bracketed token stream ([`parser`]).
//! - **Rules catalogue**: the canonical variable-order schema and every
//!   micro-query about it ([`rules`]).
//! - **Edit passes**: composable stream transformations - canonical
//!   reorder, value sorting, targeted refactorings ([`edit`]).
//! - **Emitter**: renders the stream back to aligned, wrapped text
//!   ([`emitter`]).
//! - **Scanner**: parallel batch analysis over a whole tree ([`scan`]).
//!
//! ## Quick start
//!
//! ```rust
//! use portfmt::{format_document, Settings};
//!
//! let (output, _edited) =
//!     format_document("Makefile", "USES= python cmake\n", Settings::default(), &[]).unwrap();
//! assert_eq!(output, "USES=\tcmake python\n");
//! ```

pub mod cli;
pub mod diff;
pub mod edit;
pub mod emitter;
pub mod models;
pub mod parser;
pub mod rules;
pub mod scan;

pub use models::{Behavior, Error, Result, Settings};
pub use parser::Parser;

/// Parse, run the configured format pipeline, emit. Returns the formatted
/// text and whether anything changed.
pub fn format_document(
    name: &str,
    input: &str,
    settings: Settings,
    disabled_passes: &[String],
) -> Result<(String, bool)> {
    let behavior = settings.behavior;
    let mut parser = Parser::new(settings);
    parser.read(name, input)?;
    let passes = edit::format_pipeline(behavior, disabled_passes);
    edit::apply_all(&mut parser, &passes)?;
    let output = emitter::emit(&parser)?;
    let edited = parser.is_edited();
    parser.finish();
    Ok((output, edited))
}

/// Run one edit pass over a document and emit with the given settings.
pub fn edit_document(
    name: &str,
    input: &str,
    settings: Settings,
    pass: &dyn edit::EditPass,
) -> Result<(String, bool)> {
    let mut parser = Parser::new(settings);
    parser.read(name, input)?;
    edit::apply(&mut parser, pass)?;
    let output = emitter::emit(&parser)?;
    let edited = parser.is_edited();
    parser.finish();
    Ok((output, edited))
}

/// Lint the canonical variable order. Returns the report lines (empty when
/// the document is already canonical).
pub fn lint_document(name: &str, input: &str, settings: Settings) -> Result<Vec<String>> {
    let mut parser = Parser::new(settings);
    parser.read(name, input)?;
    edit::apply(&mut parser, &edit::lint_order::LintOrder)?;
    let lines = parser.output_queue().to_vec();
    parser.finish();
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_document_reorders_and_aligns() {
        let (output, edited) =
            format_document("Makefile", "COMMENT= c\nPORTNAME=foo\n", Settings::default(), &[])
                .unwrap();
        assert_eq!(output, "PORTNAME=\tfoo\n\nCOMMENT=\tc\n");
        assert!(edited);
    }

    #[test]
    fn test_lint_document_clean() {
        let lines =
            lint_document("Makefile", "PORTNAME=\tfoo\n", Settings::default()).unwrap();
        assert!(lines.is_empty());
    }

    #[test]
    fn test_format_document_parse_error() {
        let err = format_document("Makefile", "???\n", Settings::default(), &[]).unwrap_err();
        assert!(matches!(err, Error::UnparseableLine { line: 1, .. }));
    }
}
