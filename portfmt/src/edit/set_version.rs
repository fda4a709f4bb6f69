//! Set the port version and reset the revision.
//!
//! Chooses whichever of `DISTVERSION` / `PORTVERSION` the port already
//! uses (`DISTVERSION` for a port using neither), builds an overlay
//! snippet, and merges it. A non-zero `PORTREVISION` is reset by a `!=`
//! delete sentinel in the overlay.

use crate::edit::merge::{Merge, MergeFlags};
use crate::edit::{self, EditPass};
use crate::models::Result;
use crate::parser::token::Token;
use crate::parser::{self, Parser};

pub struct SetVersion {
    version: String,
}

impl SetVersion {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
        }
    }
}

impl EditPass for SetVersion {
    fn name(&self) -> &'static str {
        "set-version"
    }

    fn run(&self, parser: &mut Parser, tokens: Vec<Token>) -> Result<Vec<Token>> {
        let ranges = edit::editable_ranges(&tokens);
        let has = |name: &str| {
            ranges.iter().any(|r| {
                tokens[r.start]
                    .variable()
                    .is_some_and(|v| v.name == name)
            })
        };

        let version_var = if has("DISTVERSION") {
            "DISTVERSION"
        } else if has("PORTVERSION") {
            "PORTVERSION"
        } else {
            "DISTVERSION"
        };

        let mut snippet = format!("{}={}\n", version_var, self.version);

        // A new upstream version starts over at revision zero; the delete
        // sentinel removes a stale non-zero PORTREVISION.
        let stale_revision = ranges.iter().any(|r| {
            tokens[r.start]
                .variable()
                .is_some_and(|v| v.name == "PORTREVISION")
                && parser::range_words(&tokens, r)
                    .first()
                    .is_some_and(|w| *w != "0")
        });
        if stale_revision {
            snippet.push_str("PORTREVISION!=\n");
        }

        let merge = Merge::from_snippet(
            &snippet,
            MergeFlags {
                shell_is_delete: true,
                merge_comments: false,
            },
        )?;
        merge.run(parser, tokens)
    }
}
