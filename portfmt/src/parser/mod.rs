//! Parser state: the token stream, derived indices and edit bookkeeping.
//!
//! One `Parser` per document. Edit passes receive the token stream by value
//! and hand back a replacement; the parser keeps the raw source lines around
//! so unedited ranges can be emitted verbatim.

pub mod lexer;
pub mod token;

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::models::{Result, Settings};
use crate::rules;
use token::{Token, TokenData};

/// Token-index range of one variable assignment:
/// `start` is the `VariableStart`, `end` the matching `VariableEnd`
/// (inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VarRange {
    pub start: usize,
    pub end: usize,
}

impl VarRange {
    /// Indices of the value tokens between the brackets.
    pub fn values(&self) -> std::ops::Range<usize> {
        self.start + 1..self.end
    }
}

/// Parser state for one document.
#[derive(Debug)]
pub struct Parser {
    settings: Settings,
    fname: String,
    rawlines: Vec<String>,
    tokens: Vec<Token>,
    /// Options declared via `OPTIONS_DEFINE` and group lists.
    options: HashSet<String>,
    /// Group names declared via `OPTIONS_{GROUP,SINGLE,RADIO,MULTI}`.
    option_groups: HashSet<String>,
    /// Ad-hoc output lines queued by passes that report rather than rewrite.
    output_queue: Vec<String>,
    /// Set when a pass changed anything; drives lint/format exit status.
    edited: bool,
}

impl Parser {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            fname: "-".into(),
            rawlines: Vec::new(),
            tokens: Vec::new(),
            options: HashSet::new(),
            option_groups: HashSet::new(),
            output_queue: Vec::new(),
            edited: false,
        }
    }

    /// Parse a document from a string. The name is used in error reports.
    pub fn read(&mut self, name: &str, input: &str) -> Result<()> {
        self.fname = name.to_string();
        self.rawlines = input.lines().map(String::from).collect();
        self.tokens = lexer::tokenize(&self.rawlines)?;
        self.index_options();
        debug!(file = %self.fname, tokens = self.tokens.len(), "parsed");
        Ok(())
    }

    pub fn read_file(&mut self, path: &Path) -> Result<()> {
        let input = fs::read_to_string(path)?;
        self.read(&path.display().to_string(), &input)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn fname(&self) -> &str {
        &self.fname
    }

    pub fn rawlines(&self) -> &[String] {
        &self.rawlines
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub(crate) fn take_tokens(&mut self) -> Vec<Token> {
        std::mem::take(&mut self.tokens)
    }

    pub(crate) fn set_tokens(&mut self, tokens: Vec<Token>) {
        self.tokens = tokens;
    }

    /// Declared option names (union of `OPTIONS_DEFINE`, per-arch defines
    /// and all group member lists).
    pub fn options(&self) -> &HashSet<String> {
        &self.options
    }

    pub fn option_groups(&self) -> &HashSet<String> {
        &self.option_groups
    }

    pub fn mark_edited(&mut self) {
        self.edited = true;
    }

    pub fn is_edited(&self) -> bool {
        self.edited
    }

    /// Queue a line for rawlines output.
    pub fn enqueue_output(&mut self, line: impl Into<String>) {
        self.output_queue.push(line.into());
    }

    pub fn output_queue(&self) -> &[String] {
        &self.output_queue
    }

    /// Tear down the document, releasing every token including ranges that
    /// were marked for garbage collection.
    pub fn finish(&mut self) {
        self.tokens.clear();
        self.rawlines.clear();
        self.output_queue.clear();
    }

    fn index_options(&mut self) {
        self.options.clear();
        self.option_groups.clear();

        for range in variable_ranges(&self.tokens) {
            let Some(var) = self.tokens[range.start].variable().cloned() else {
                continue;
            };
            let words: Vec<&str> = range
                .values()
                .filter_map(|i| self.tokens[i].word())
                .filter(|w| !w.starts_with('#'))
                .collect();

            if rules::is_options_define(&var.name) {
                self.options.extend(words.iter().map(|w| w.to_string()));
            } else if let Some(group) = rules::options_group_name(&var.name) {
                self.option_groups.insert(group.to_string());
                self.options.extend(words.iter().map(|w| w.to_string()));
            } else if rules::is_options_group_list(&var.name) {
                self.option_groups.extend(words.iter().map(|w| w.to_string()));
            }
        }
    }
}

/// All well-bracketed variable ranges in stream order.
pub fn variable_ranges(tokens: &[Token]) -> Vec<VarRange> {
    let mut ranges = Vec::new();
    let mut start = None;

    for (i, token) in tokens.iter().enumerate() {
        match token.data {
            TokenData::VariableStart(_) => start = Some(i),
            TokenData::VariableEnd(_) => {
                if let Some(s) = start.take() {
                    ranges.push(VarRange { start: s, end: i });
                }
            }
            _ => {}
        }
    }
    ranges
}

/// First range assigning `name`, at any depth.
pub fn find_variable(tokens: &[Token], name: &str) -> Option<VarRange> {
    variable_ranges(tokens).into_iter().find(|r| {
        tokens[r.start]
            .variable()
            .is_some_and(|v| v.name == name)
    })
}

/// Mapping from variable name to every range assigning it, in stream order.
pub fn variable_index(tokens: &[Token]) -> HashMap<String, Vec<VarRange>> {
    let mut index: HashMap<String, Vec<VarRange>> = HashMap::new();
    for range in variable_ranges(tokens) {
        if let Some(var) = tokens[range.start].variable() {
            index.entry(var.name.clone()).or_default().push(range);
        }
    }
    index
}

/// Token index of the first `.include` of the ports framework epilogue
/// (`bsd.port.mk` and siblings), or `tokens.len()` when absent. Variables
/// past this point are not user-editable and are left alone by every pass.
pub fn port_mk_cutoff(tokens: &[Token]) -> usize {
    for (i, token) in tokens.iter().enumerate() {
        if let TokenData::ConditionalStart(_) = token.data {
            if rules::is_include_bsd_port_mk(tokens, i) {
                return i;
            }
        }
    }
    tokens.len()
}

/// Target names in order of first declaration, deduplicated.
pub fn target_names(tokens: &[Token]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut names = Vec::new();
    for token in tokens {
        if let TokenData::TargetStart(target) = &token.data {
            for name in &target.names {
                if seen.insert(name.clone()) {
                    names.push(name.clone());
                }
            }
        }
    }
    names
}

/// The words of a variable range, excluding any trailing comment token.
pub fn range_words<'a>(tokens: &'a [Token], range: &VarRange) -> Vec<&'a str> {
    range
        .values()
        .filter_map(|i| tokens[i].word())
        .filter(|w| !w.starts_with('#'))
        .collect()
}
