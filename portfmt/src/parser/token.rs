//! Token stream data model.
//!
//! A parsed Makefile is an ordered sequence of [`Token`]s. Assignments,
//! targets and dot-directives are bracketed by START/END tokens; everything
//! between a START and its END shares the same payload object via `Rc`, so
//! the thousands of micro-queries the edit passes run never re-parse names.

use std::fmt;
use std::rc::Rc;

/// 1-indexed, end-exclusive range of physical source lines.
///
/// The zero range marks a synthetic token created by an edit pass; it has no
/// raw source backing and is always reformatted on output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LineRange {
    pub start: usize,
    pub end: usize,
}

impl LineRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Range for a synthetic token with no source backing.
    pub fn synthetic() -> Self {
        Self { start: 0, end: 0 }
    }

    pub fn is_synthetic(&self) -> bool {
        self.start == 0
    }
}

impl fmt::Display for LineRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.end > self.start + 1 {
            write!(f, "{}-{}", self.start, self.end - 1)
        } else {
            write!(f, "{}", self.start)
        }
    }
}

/// Assignment modifier of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    /// `=`
    Assign,
    /// `+=`
    Append,
    /// `:=`
    Expand,
    /// `?=`
    Default,
    /// `!=`
    Shell,
    /// `?=` spelled via make's `.if !defined` idiom; compares equal to
    /// `Default` for ordering purposes but is kept distinct for display.
    Optional,
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Modifier::Assign => "=",
            Modifier::Append => "+=",
            Modifier::Expand => ":=",
            Modifier::Default | Modifier::Optional => "?=",
            Modifier::Shell => "!=",
        };
        write!(f, "{s}")
    }
}

/// A variable assignment's name and modifier. All tokens of one assignment
/// range point at the same `Variable`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    pub modifier: Modifier,
}

impl Variable {
    pub fn new(name: impl Into<String>, modifier: Modifier) -> Self {
        Self {
            name: name.into(),
            modifier,
        }
    }

    /// Equality used by passes that treat all modifiers as one bucket.
    pub fn same_name(&self, other: &Variable) -> bool {
        self.name == other.name
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, self.modifier)
    }
}

/// A target block header: one or more names, dependencies, and an optional
/// trailing comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub names: Vec<String>,
    pub deps: Vec<String>,
    pub comment: Option<String>,
    /// `:` or `::` (or `!`), as written.
    pub separator: String,
}

/// Directive kind of a dot-line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionalKind {
    If,
    Ifdef,
    Ifndef,
    Ifmake,
    Ifnmake,
    Elif,
    Elifdef,
    Elifndef,
    Elifmake,
    Else,
    Endif,
    For,
    Endfor,
    Include,
    Sinclude,
    Error,
    Warning,
    Info,
    Export,
    ExportEnv,
    Unexport,
    UnexportEnv,
    Undef,
}

impl ConditionalKind {
    /// Directive name as written after the dot.
    pub fn keyword(&self) -> &'static str {
        match self {
            ConditionalKind::If => "if",
            ConditionalKind::Ifdef => "ifdef",
            ConditionalKind::Ifndef => "ifndef",
            ConditionalKind::Ifmake => "ifmake",
            ConditionalKind::Ifnmake => "ifnmake",
            ConditionalKind::Elif => "elif",
            ConditionalKind::Elifdef => "elifdef",
            ConditionalKind::Elifndef => "elifndef",
            ConditionalKind::Elifmake => "elifmake",
            ConditionalKind::Else => "else",
            ConditionalKind::Endif => "endif",
            ConditionalKind::For => "for",
            ConditionalKind::Endfor => "endfor",
            ConditionalKind::Include => "include",
            ConditionalKind::Sinclude => "sinclude",
            ConditionalKind::Error => "error",
            ConditionalKind::Warning => "warning",
            ConditionalKind::Info => "info",
            ConditionalKind::Export => "export",
            ConditionalKind::ExportEnv => "export-env",
            ConditionalKind::Unexport => "unexport",
            ConditionalKind::UnexportEnv => "unexport-env",
            ConditionalKind::Undef => "undef",
        }
    }

    pub fn from_keyword(word: &str) -> Option<Self> {
        Some(match word {
            "if" => ConditionalKind::If,
            "ifdef" => ConditionalKind::Ifdef,
            "ifndef" => ConditionalKind::Ifndef,
            "ifmake" => ConditionalKind::Ifmake,
            "ifnmake" => ConditionalKind::Ifnmake,
            "elif" => ConditionalKind::Elif,
            "elifdef" => ConditionalKind::Elifdef,
            "elifndef" => ConditionalKind::Elifndef,
            "elifmake" => ConditionalKind::Elifmake,
            "else" => ConditionalKind::Else,
            "endif" => ConditionalKind::Endif,
            "for" => ConditionalKind::For,
            "endfor" => ConditionalKind::Endfor,
            "include" => ConditionalKind::Include,
            "sinclude" | "-include" | "dinclude" => ConditionalKind::Sinclude,
            "error" => ConditionalKind::Error,
            "warning" => ConditionalKind::Warning,
            "info" => ConditionalKind::Info,
            "export" => ConditionalKind::Export,
            "export-env" => ConditionalKind::ExportEnv,
            "unexport" => ConditionalKind::Unexport,
            "unexport-env" => ConditionalKind::UnexportEnv,
            "undef" => ConditionalKind::Undef,
            _ => return None,
        })
    }

    /// Does this directive open a nesting level?
    pub fn opens(&self) -> bool {
        matches!(
            self,
            ConditionalKind::If
                | ConditionalKind::Ifdef
                | ConditionalKind::Ifndef
                | ConditionalKind::Ifmake
                | ConditionalKind::Ifnmake
                | ConditionalKind::For
        )
    }

    /// Does this directive replace the top of the nesting stack?
    pub fn replaces(&self) -> bool {
        matches!(
            self,
            ConditionalKind::Elif
                | ConditionalKind::Elifdef
                | ConditionalKind::Elifndef
                | ConditionalKind::Elifmake
                | ConditionalKind::Else
        )
    }

    /// Does this directive close a nesting level?
    pub fn closes(&self) -> bool {
        matches!(self, ConditionalKind::Endif | ConditionalKind::Endfor)
    }
}

/// One dot-directive. All tokens of one directive share this payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conditional {
    pub kind: ConditionalKind,
}

/// Token variety plus per-variety payload.
#[derive(Debug, Clone)]
pub enum TokenData {
    /// Standalone comment line; empty data preserves a blank line.
    Comment(String),
    VariableStart(Rc<Variable>),
    /// One whitespace-separated right-hand-side word.
    VariableToken(Rc<Variable>, String),
    VariableEnd(Rc<Variable>),
    TargetStart(Rc<Target>),
    TargetCommandStart(Rc<Target>),
    /// One word of a recipe line.
    TargetCommandToken(Rc<Target>, String),
    TargetCommandEnd(Rc<Target>),
    TargetEnd(Rc<Target>),
    ConditionalStart(Rc<Conditional>),
    /// One word of the directive argument.
    ConditionalToken(Rc<Conditional>, String),
    ConditionalEnd(Rc<Conditional>),
}

impl TokenData {
    pub fn variety(&self) -> &'static str {
        match self {
            TokenData::Comment(_) => "comment",
            TokenData::VariableStart(_) => "variable-start",
            TokenData::VariableToken(..) => "variable-token",
            TokenData::VariableEnd(_) => "variable-end",
            TokenData::TargetStart(_) => "target-start",
            TokenData::TargetCommandStart(_) => "target-command-start",
            TokenData::TargetCommandToken(..) => "target-command-token",
            TokenData::TargetCommandEnd(_) => "target-command-end",
            TokenData::TargetEnd(_) => "target-end",
            TokenData::ConditionalStart(_) => "conditional-start",
            TokenData::ConditionalToken(..) => "conditional-token",
            TokenData::ConditionalEnd(_) => "conditional-end",
        }
    }
}

/// The atomic unit of the parsed stream.
#[derive(Debug, Clone)]
pub struct Token {
    pub data: TokenData,
    pub lines: LineRange,
    /// Conditional nesting depth this token lives at.
    pub depth: usize,
    /// Set by edit passes on tokens they created or rewrote.
    pub edited: bool,
    /// Logically absent from the stream; skipped by the emitter.
    pub gc: bool,
}

impl Token {
    pub fn new(data: TokenData, lines: LineRange, depth: usize) -> Self {
        Self {
            data,
            lines,
            depth,
            edited: false,
            gc: false,
        }
    }

    /// Synthetic token produced by an edit pass; counts as edited.
    pub fn synthetic(data: TokenData, depth: usize) -> Self {
        Self {
            data,
            lines: LineRange::synthetic(),
            depth,
            edited: true,
            gc: false,
        }
    }

    pub fn variable(&self) -> Option<&Rc<Variable>> {
        match &self.data {
            TokenData::VariableStart(v)
            | TokenData::VariableToken(v, _)
            | TokenData::VariableEnd(v) => Some(v),
            _ => None,
        }
    }

    pub fn target(&self) -> Option<&Rc<Target>> {
        match &self.data {
            TokenData::TargetStart(t)
            | TokenData::TargetCommandStart(t)
            | TokenData::TargetCommandToken(t, _)
            | TokenData::TargetCommandEnd(t)
            | TokenData::TargetEnd(t) => Some(t),
            _ => None,
        }
    }

    pub fn conditional(&self) -> Option<&Rc<Conditional>> {
        match &self.data {
            TokenData::ConditionalStart(c)
            | TokenData::ConditionalToken(c, _)
            | TokenData::ConditionalEnd(c) => Some(c),
            _ => None,
        }
    }

    pub fn is_variable_start(&self) -> bool {
        matches!(self.data, TokenData::VariableStart(_))
    }

    pub fn is_variable_end(&self) -> bool {
        matches!(self.data, TokenData::VariableEnd(_))
    }

    /// Word payload of a `VariableToken`, if any.
    pub fn word(&self) -> Option<&str> {
        match &self.data {
            TokenData::VariableToken(_, w) => Some(w),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifier_display() {
        assert_eq!(format!("{}", Modifier::Assign), "=");
        assert_eq!(format!("{}", Modifier::Append), "+=");
        assert_eq!(format!("{}", Modifier::Expand), ":=");
        assert_eq!(format!("{}", Modifier::Default), "?=");
        assert_eq!(format!("{}", Modifier::Shell), "!=");
    }

    #[test]
    fn test_conditional_keyword_roundtrip() {
        for kw in ["if", "ifdef", "ifndef", "elif", "else", "endif", "include", "for"] {
            let kind = ConditionalKind::from_keyword(kw).unwrap();
            assert_eq!(kind.keyword(), kw);
        }
        assert!(ConditionalKind::from_keyword("frobnicate").is_none());
    }

    #[test]
    fn test_nesting_classification() {
        assert!(ConditionalKind::If.opens());
        assert!(ConditionalKind::For.opens());
        assert!(ConditionalKind::Else.replaces());
        assert!(ConditionalKind::Endif.closes());
        assert!(!ConditionalKind::Include.opens());
    }

    #[test]
    fn test_synthetic_token_is_edited() {
        let var = Rc::new(Variable::new("PORTNAME", Modifier::Assign));
        let tok = Token::synthetic(TokenData::VariableStart(var), 0);
        assert!(tok.edited);
        assert!(tok.lines.is_synthetic());
    }

    #[test]
    fn test_line_range_display() {
        assert_eq!(format!("{}", LineRange::new(3, 4)), "3");
        assert_eq!(format!("{}", LineRange::new(3, 6)), "3-5");
    }
}
