//! Line-level tokenizer for the port-Makefile dialect.
//!
//! Folds physical lines into logical lines (backslash continuations), then
//! classifies each logical line and emits the bracketed token stream. The
//! classification precedence is: blank, comment, dot-directive, variable
//! assignment, target header, recipe line; anything else is a parse error.

use std::rc::Rc;

use tracing::debug;

use crate::models::{Error, Result};
use crate::parser::token::{
    Conditional, ConditionalKind, LineRange, Modifier, Target, Token, TokenData, Variable,
};

/// One folded logical line plus the physical range it came from.
#[derive(Debug, Clone)]
pub(crate) struct LogicalLine {
    pub text: String,
    pub lines: LineRange,
}

/// Fold backslash continuations. A trailing unescaped backslash joins the
/// next physical line; trailing whitespace before the backslash and leading
/// whitespace on the continuation collapse to a single space.
pub(crate) fn fold_lines(raw: &[String]) -> Result<Vec<LogicalLine>> {
    let mut folded = Vec::with_capacity(raw.len());
    let mut i = 0;

    while i < raw.len() {
        let start = i;
        let mut text = raw[i].clone();

        while ends_with_continuation(&text) {
            text = text.trim_end().to_string();
            text.pop();
            text = text.trim_end().to_string();
            i += 1;
            if i >= raw.len() {
                return Err(Error::UnparseableLine {
                    line: start + 1,
                    message: "line continuation at end of file".into(),
                });
            }
            let next = raw[i].trim_start();
            if !text.is_empty() && !next.is_empty() {
                text.push(' ');
            }
            text.push_str(next);
        }

        folded.push(LogicalLine {
            text,
            lines: LineRange::new(start + 1, i + 2),
        });
        i += 1;
    }

    Ok(folded)
}

/// A line continues iff it ends in an odd number of backslashes.
fn ends_with_continuation(line: &str) -> bool {
    let trimmed = line.trim_end();
    let trailing = trimmed.chars().rev().take_while(|&c| c == '\\').count();
    trailing % 2 == 1
}

/// Split a right-hand side into whitespace-separated words, respecting
/// `${...}`/`$(...)` bracket nesting and backslash escapes. An unescaped `#`
/// at bracket depth zero starts a trailing comment that becomes one final
/// word (including the `#`).
pub(crate) fn split_words(s: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut word = String::new();
    let mut brackets: Vec<char> = Vec::new();
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                word.push(c);
                if let Some(&next) = chars.peek() {
                    word.push(next);
                    chars.next();
                }
            }
            '$' => {
                word.push(c);
                match chars.peek() {
                    Some('{') => {
                        brackets.push('}');
                        word.push('{');
                        chars.next();
                    }
                    Some('(') => {
                        brackets.push(')');
                        word.push('(');
                        chars.next();
                    }
                    _ => {}
                }
            }
            '{' | '(' if !brackets.is_empty() => {
                // Nested braces inside an open reference keep the depth honest.
                brackets.push(if c == '{' { '}' } else { ')' });
                word.push(c);
            }
            '}' | ')' if brackets.last() == Some(&c) => {
                brackets.pop();
                word.push(c);
            }
            '#' if brackets.is_empty() => {
                if !word.is_empty() {
                    words.push(std::mem::take(&mut word));
                }
                let mut comment = String::from("#");
                comment.extend(chars.by_ref());
                words.push(comment.trim_end().to_string());
                return words;
            }
            c if c.is_whitespace() && brackets.is_empty() => {
                if !word.is_empty() {
                    words.push(std::mem::take(&mut word));
                }
            }
            c => word.push(c),
        }
    }

    if !word.is_empty() {
        words.push(word);
    }
    words
}

/// Result of probing a logical line for an assignment or a target separator.
enum LineShape {
    /// `name`, `modifier`, byte offset of the value text.
    Assignment(String, Modifier, usize),
    /// Byte offset of the separator, separator text (`:`, `::` or `!`).
    TargetHeader(usize, usize),
    Neither,
}

/// Scan for the first unbracketed `=`, `:` or `!` and decide what the line
/// is. `${...}` groups are skipped atomically; `:=` binds to the assignment,
/// a lone `:` or `!` to a target separator.
fn probe_line(text: &str) -> LineShape {
    let bytes = text.as_bytes();
    let mut brackets: Vec<u8> = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        match c {
            b'\\' => {
                i += 2;
                continue;
            }
            b'$' if i + 1 < bytes.len() && (bytes[i + 1] == b'{' || bytes[i + 1] == b'(') => {
                brackets.push(if bytes[i + 1] == b'{' { b'}' } else { b')' });
                i += 2;
                continue;
            }
            b'{' | b'(' if !brackets.is_empty() => {
                brackets.push(if c == b'{' { b'}' } else { b')' });
            }
            b'}' | b')' if brackets.last() == Some(&c) => {
                brackets.pop();
            }
            _ if !brackets.is_empty() => {}
            b'=' => {
                // Look back one byte for a modifier character.
                let (modifier, name_end) = match i.checked_sub(1).map(|p| bytes[p]) {
                    Some(b'+') => (Modifier::Append, i - 1),
                    Some(b':') => (Modifier::Expand, i - 1),
                    Some(b'?') => (Modifier::Default, i - 1),
                    Some(b'!') => (Modifier::Shell, i - 1),
                    _ => (Modifier::Assign, i),
                };
                let name = text[..name_end].trim().to_string();
                return LineShape::Assignment(name, modifier, i + 1);
            }
            b':' | b'!' => {
                // ':=' was handled above via the '=' branch looking back; a
                // ':' or '!' followed by '=' is an assignment, not a target.
                if i + 1 < bytes.len() && bytes[i + 1] == b'=' {
                    i += 1;
                    continue;
                }
                let sep_len = if c == b':' && i + 1 < bytes.len() && bytes[i + 1] == b':' {
                    2
                } else {
                    1
                };
                return LineShape::TargetHeader(i, sep_len);
            }
            _ => {}
        }
        i += 1;
    }

    LineShape::Neither
}

/// Tokenize a full document. Returns the token stream; the caller retains
/// the raw physical lines for verbatim emission.
pub(crate) fn tokenize(raw: &[String]) -> Result<Vec<Token>> {
    let logical = fold_lines(raw)?;
    let mut lexer = Lexer::default();

    for line in &logical {
        lexer.feed(line)?;
    }
    lexer.finish(raw.len())
}

#[derive(Default)]
struct Lexer {
    tokens: Vec<Token>,
    /// Stack of open `.if`/`.for` directives.
    nesting: Vec<ConditionalKind>,
    /// Open target block, if any: payload plus the depth it started at.
    target: Option<(Rc<Target>, usize)>,
}

impl Lexer {
    fn depth(&self) -> usize {
        self.nesting.len()
    }

    fn feed(&mut self, line: &LogicalLine) -> Result<()> {
        let text = &line.text;

        // Blank line: preserved as an empty comment token.
        if text.trim().is_empty() {
            let depth = self.depth();
            self.tokens
                .push(Token::new(TokenData::Comment(String::new()), line.lines, depth));
            return Ok(());
        }

        // Standalone comment.
        if text.trim_start().starts_with('#') {
            let depth = self.depth();
            self.tokens.push(Token::new(
                TokenData::Comment(text.trim_end().to_string()),
                line.lines,
                depth,
            ));
            return Ok(());
        }

        // Dot-directive. Special targets (`.PHONY:` etc.) also start with a
        // dot but their word is not a directive keyword; they fall through.
        if let Some(rest) = text.trim_start().strip_prefix('.') {
            let rest = rest.trim_start();
            let word_end = rest
                .find(|c: char| c.is_whitespace())
                .unwrap_or(rest.len());
            let keyword = &rest[..word_end];
            if let Some(kind) = ConditionalKind::from_keyword(keyword) {
                return self.feed_directive(kind, &rest[word_end..], line);
            }
        }

        // A tab-indented line inside an open target block is always a recipe
        // line, even when it happens to contain '=' or ':'.
        if text.starts_with('\t') && self.target.is_some() {
            return self.feed_recipe(text, line);
        }

        match probe_line(text) {
            LineShape::Assignment(name, modifier, value_at) => {
                if name.is_empty() || name.contains(char::is_whitespace) {
                    return Err(Error::UnparseableLine {
                        line: line.lines.start,
                        message: format!("malformed variable assignment: {}", text.trim()),
                    });
                }
                self.close_target();
                self.feed_assignment(name, modifier, &text[value_at..], line);
                Ok(())
            }
            LineShape::TargetHeader(sep_at, sep_len) => {
                self.close_target();
                self.feed_target_header(text, sep_at, sep_len, line)
            }
            LineShape::Neither => Err(Error::UnparseableLine {
                line: line.lines.start,
                message: format!("unparseable line: {}", text.trim()),
            }),
        }
    }

    fn feed_directive(
        &mut self,
        kind: ConditionalKind,
        args: &str,
        line: &LogicalLine,
    ) -> Result<()> {
        // Non-nesting directives close an open target block; `.if` inside a
        // recipe is legal and leaves the target open.
        if !kind.opens() && !kind.replaces() && !kind.closes() {
            self.close_target();
        }

        let depth = if kind.replaces() || kind.closes() {
            if self.nesting.is_empty() {
                return Err(Error::UnparseableLine {
                    line: line.lines.start,
                    message: format!("'.{}' without matching '.if'", kind.keyword()),
                });
            }
            self.depth() - 1
        } else {
            self.depth()
        };

        if kind.closes() {
            self.nesting.pop();
        }

        let cond = Rc::new(Conditional { kind });
        self.tokens.push(Token::new(
            TokenData::ConditionalStart(Rc::clone(&cond)),
            line.lines,
            depth,
        ));
        // The directive word itself is the first argument token; the
        // developer-arm scanner keys off this layout.
        self.tokens.push(Token::new(
            TokenData::ConditionalToken(Rc::clone(&cond), format!(".{}", kind.keyword())),
            line.lines,
            depth,
        ));
        for word in split_words(args) {
            self.tokens.push(Token::new(
                TokenData::ConditionalToken(Rc::clone(&cond), word),
                line.lines,
                depth,
            ));
        }
        self.tokens.push(Token::new(
            TokenData::ConditionalEnd(cond),
            line.lines,
            depth,
        ));

        if kind.opens() {
            self.nesting.push(kind);
        } else if kind.replaces() {
            let top = self.nesting.len() - 1;
            self.nesting[top] = kind;
        }
        Ok(())
    }

    fn feed_assignment(
        &mut self,
        name: String,
        modifier: Modifier,
        value: &str,
        line: &LogicalLine,
    ) {
        let depth = self.depth();
        let var = Rc::new(Variable::new(name, modifier));
        debug!(variable = %var, "assignment");

        self.tokens.push(Token::new(
            TokenData::VariableStart(Rc::clone(&var)),
            line.lines,
            depth,
        ));
        for word in split_words(value) {
            self.tokens.push(Token::new(
                TokenData::VariableToken(Rc::clone(&var), word),
                line.lines,
                depth,
            ));
        }
        self.tokens.push(Token::new(
            TokenData::VariableEnd(var),
            line.lines,
            depth,
        ));
    }

    fn feed_target_header(
        &mut self,
        text: &str,
        sep_at: usize,
        sep_len: usize,
        line: &LogicalLine,
    ) -> Result<()> {
        let names: Vec<String> = split_words(&text[..sep_at]);
        if names.is_empty() {
            return Err(Error::UnparseableLine {
                line: line.lines.start,
                message: "target header without a name".into(),
            });
        }

        let after = &text[sep_at + sep_len..];
        let mut deps = split_words(after);
        let comment = match deps.last() {
            Some(last) if last.starts_with('#') => deps.pop(),
            _ => None,
        };

        let depth = self.depth();
        let target = Rc::new(Target {
            names,
            deps,
            comment,
            separator: text[sep_at..sep_at + sep_len].to_string(),
        });
        debug!(target = ?target.names, "target header");

        self.tokens.push(Token::new(
            TokenData::TargetStart(Rc::clone(&target)),
            line.lines,
            depth,
        ));
        self.target = Some((target, depth));
        Ok(())
    }

    fn feed_recipe(&mut self, text: &str, line: &LogicalLine) -> Result<()> {
        let Some((target, _)) = self.target.clone() else {
            return Err(Error::UnparseableLine {
                line: line.lines.start,
                message: "recipe line outside a target block".into(),
            });
        };

        let depth = self.depth();
        self.tokens.push(Token::new(
            TokenData::TargetCommandStart(Rc::clone(&target)),
            line.lines,
            depth,
        ));
        for word in split_words(text.trim_start()) {
            self.tokens.push(Token::new(
                TokenData::TargetCommandToken(Rc::clone(&target), word),
                line.lines,
                depth,
            ));
        }
        self.tokens.push(Token::new(
            TokenData::TargetCommandEnd(target),
            line.lines,
            depth,
        ));
        Ok(())
    }

    fn close_target(&mut self) {
        if let Some((target, depth)) = self.target.take() {
            self.tokens.push(Token::new(
                TokenData::TargetEnd(target),
                LineRange::synthetic(),
                depth,
            ));
        }
    }

    fn finish(mut self, line_count: usize) -> Result<Vec<Token>> {
        self.close_target();
        if !self.nesting.is_empty() {
            return Err(Error::UnparseableLine {
                line: line_count,
                message: "unclosed conditional at end of file".into(),
            });
        }
        Ok(self.tokens)
    }
}
