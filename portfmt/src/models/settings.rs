//! Parser behavior flags and tunables.

use bitflags::bitflags;

bitflags! {
    /// Output and edit behavior toggles, combined freely by the front-ends.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Behavior: u32 {
        /// Suppress reformatting; callers consume the token stream or the
        /// output queue directly.
        const OUTPUT_RAWLINES            = 1 << 0;
        /// Reformat every construct.
        const OUTPUT_REFORMAT            = 1 << 1;
        /// Reformat only ranges an edit pass marked edited; emit raw source
        /// lines for everything else.
        const OUTPUT_EDITED              = 1 << 2;
        /// Never emit ANSI color sequences.
        const OUTPUT_NO_COLOR            = 1 << 3;
        /// Write the result back to the input file.
        const OUTPUT_INPLACE             = 1 << 4;
        /// Collapse adjacent assignments to the same variable.
        const COLLAPSE_ADJACENT_VARIABLES = 1 << 5;
        /// Leave trailing comments on assignment lines alone.
        const KEEP_EOL_COMMENTS          = 1 << 6;
        /// Rewrite a first-occurrence `+=` to `=`.
        const SANITIZE_APPEND            = 1 << 7;
        /// Never sort right-hand sides.
        const UNSORTED_VARIABLES         = 1 << 8;
        /// Sort right-hand sides even for leave-alone variables.
        const ALWAYS_SORT_VARIABLES      = 1 << 9;
    }
}

impl Default for Behavior {
    fn default() -> Self {
        Behavior::OUTPUT_REFORMAT | Behavior::SANITIZE_APPEND
    }
}

/// Settings shared by the parser, the edit passes and the emitter.
#[derive(Debug, Clone)]
pub struct Settings {
    pub behavior: Behavior,
    /// Column long values wrap at.
    pub wrapcol: usize,
    /// Tab width used for alignment columns.
    pub tabwidth: usize,
    /// Context lines in unified diff output.
    pub diff_context: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            behavior: Behavior::default(),
            wrapcol: 80,
            tabwidth: 8,
            diff_context: 3,
        }
    }
}

impl Settings {
    pub fn with_behavior(behavior: Behavior) -> Self {
        Self {
            behavior,
            ..Self::default()
        }
    }
}
