//! Error types shared by the parser, the edit passes and the binaries.
//!
//! Errors abort the current document only: a batch driver drops the failed
//! document's token stream and moves on to the next path.

use std::fmt;
use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything the parser and the edit passes can report.
#[derive(Error, Debug)]
pub enum Error {
    /// A physical line the grammar cannot classify. Carries the 1-indexed
    /// line number of the offending logical line.
    #[error("parse error on line {line}: {message}")]
    UnparseableLine { line: usize, message: String },

    #[error("unspecified error")]
    UnspecifiedError,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("buffer too small")]
    BufferTooSmall,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("edit failed: {0}")]
    EditFailed(String),

    #[error("expected integer value: {0}")]
    ExpectedInt(String),

    #[error("not found: {0}")]
    NotFound(String),
}

impl Error {
    /// Short kind tag used in CLI error reporting
    /// (`<binary>: <file>: <kind>: <message>`).
    pub fn kind(&self) -> &'static str {
        match self {
            Error::UnparseableLine { .. } => "parse",
            Error::UnspecifiedError => "error",
            Error::Io(_) => "io",
            Error::BufferTooSmall => "buffer",
            Error::InvalidArgument(_) => "usage",
            Error::EditFailed(_) => "edit",
            Error::ExpectedInt(_) => "expected-int",
            Error::NotFound(_) => "not-found",
        }
    }

    /// Exit status a binary should terminate with for this error.
    /// Bad arguments map to `EX_USAGE` (64), everything else to 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidArgument(_) => 64,
            _ => 1,
        }
    }
}

/// Renders as `<binary>: <file>: <kind>: <message>`, the shape every
/// binary reports on stderr.
pub struct ErrorReport<'a> {
    pub binary: &'a str,
    pub file: &'a str,
    pub error: &'a Error,
}

impl fmt::Display for ErrorReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}: {}: {}",
            self.binary,
            self.file,
            self.error.kind(),
            self.error
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unparseable_line_display() {
        let err = Error::UnparseableLine {
            line: 7,
            message: "missing ':' in target".into(),
        };
        assert_eq!(format!("{err}"), "parse error on line 7: missing ':' in target");
        assert_eq!(err.kind(), "parse");
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_invalid_argument_is_usage() {
        let err = Error::InvalidArgument("no such pass: frobnicate".into());
        assert_eq!(err.exit_code(), 64);
    }

    #[test]
    fn test_report_format() {
        let err = Error::ExpectedInt("PORTREVISION".into());
        let line = ErrorReport {
            binary: "portedit",
            file: "Makefile",
            error: &err,
        }
        .to_string();
        assert_eq!(
            line,
            "portedit: Makefile: expected-int: expected integer value: PORTREVISION"
        );
    }
}
