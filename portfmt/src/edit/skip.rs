//! Developer-only-arm scanner.
//!
//! Several passes must leave variables alone when they live inside a
//! conditional arm that only developers ever evaluate. The scanner is a
//! four-state machine fed one token at a time.

use crate::parser::token::{ConditionalKind, Token, TokenData};

/// Conditions that mark an arm as developer-only.
const SENTINELS: &[&str] = &[
    "defined(DEVELOPER)",
    "defined(MAINTAINER_MODE)",
    "make(makesum)",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Init,
    If,
    Skip,
    End,
}

/// Feed tokens in stream order; `feed` reports whether the token is inside
/// a developer-only arm.
#[derive(Debug)]
pub struct DeveloperArmScanner {
    state: State,
    /// Depth of the `.if` that opened the arm being skipped.
    arm_depth: usize,
}

impl Default for DeveloperArmScanner {
    fn default() -> Self {
        Self {
            state: State::Init,
            arm_depth: 0,
        }
    }
}

impl DeveloperArmScanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&mut self, token: &Token) -> bool {
        match self.state {
            State::End => {
                // Skip until the matching `.endif` closes the arm.
                if let TokenData::ConditionalEnd(cond) = &token.data {
                    if cond.kind == ConditionalKind::Endif && token.depth == self.arm_depth {
                        self.state = State::Init;
                        return false;
                    }
                }
                true
            }
            State::Init => {
                if let TokenData::ConditionalStart(cond) = &token.data {
                    if cond.kind == ConditionalKind::If {
                        self.state = State::If;
                        self.arm_depth = token.depth;
                    }
                }
                false
            }
            State::If => {
                self.state = match token.data {
                    TokenData::ConditionalToken(..) => State::Skip,
                    _ => State::Init,
                };
                false
            }
            State::Skip => {
                match &token.data {
                    TokenData::ConditionalToken(_, text) if SENTINELS.contains(&text.as_str()) => {
                        self.state = State::End;
                    }
                    _ => self.state = State::Init,
                }
                false
            }
        }
    }
}

/// Per-token mask: `true` for tokens inside a developer-only arm.
pub fn developer_arm_mask(tokens: &[Token]) -> Vec<bool> {
    let mut scanner = DeveloperArmScanner::new();
    tokens.iter().map(|t| scanner.feed(t)).collect()
}
