//! Token stream to text.
//!
//! Three modes, selected by behavior flags: `OUTPUT_RAWLINES` yields only
//! the ad-hoc output queue, `OUTPUT_REFORMAT` re-renders every construct,
//! `OUTPUT_EDITED` re-renders only ranges an edit pass touched and copies
//! raw source lines for the rest. Comments and conditionals always emit
//! verbatim; variable assignments are aligned to a tab column shared with
//! their neighbors and wrapped at the configured column.

use crate::models::{Behavior, Result, Settings};
use crate::parser::token::{LineRange, Token, TokenData};
use crate::parser::{self, Parser, VarRange};
use crate::rules;

/// Render a parser's stream according to its settings.
pub fn emit(parser: &Parser) -> Result<String> {
    let behavior = parser.settings().behavior;

    if behavior.contains(Behavior::OUTPUT_RAWLINES) {
        let queue = parser.output_queue();
        if queue.is_empty() {
            return Ok(String::new());
        }
        let mut out = queue.join("\n");
        out.push('\n');
        return Ok(out);
    }

    let reformat_all = behavior.contains(Behavior::OUTPUT_REFORMAT);
    Emitter {
        tokens: parser.tokens(),
        rawlines: parser.rawlines(),
        settings: parser.settings(),
        reformat_all,
        goals: goal_columns(parser.tokens(), parser.settings().tabwidth),
    }
    .render()
}

/// Next tab stop strictly after `col`.
fn next_tab(col: usize, tabwidth: usize) -> usize {
    (col / tabwidth + 1) * tabwidth
}

/// Alignment column for every variable range: the longest label in a run of
/// consecutive assignments decides for the whole run. Ranges marked for
/// garbage collection produce no output and must not feed the run's goal;
/// a run continues across them since the survivors end up adjacent.
fn goal_columns(tokens: &[Token], tabwidth: usize) -> Vec<(VarRange, usize)> {
    let ranges: Vec<VarRange> = parser::variable_ranges(tokens)
        .into_iter()
        .filter(|r| !tokens[r.start].gc)
        .collect();
    let mut goals: Vec<(VarRange, usize)> = Vec::with_capacity(ranges.len());

    let label_goal = |range: &VarRange| -> usize {
        let label = tokens[range.start]
            .variable()
            .map(|v| v.to_string())
            .unwrap_or_default();
        next_tab(label.len(), tabwidth)
    };
    let only_gc_between = |end: usize, start: usize| -> bool {
        tokens[end + 1..start].iter().all(|t| t.gc)
    };

    let mut i = 0;
    while i < ranges.len() {
        let mut j = i;
        while j + 1 < ranges.len() && only_gc_between(ranges[j].end, ranges[j + 1].start) {
            j += 1;
        }
        let goal = ranges[i..=j].iter().map(label_goal).max().unwrap_or(tabwidth);
        for range in &ranges[i..=j] {
            goals.push((*range, goal));
        }
        i = j + 1;
    }
    goals
}

struct Emitter<'a> {
    tokens: &'a [Token],
    rawlines: &'a [String],
    settings: &'a Settings,
    reformat_all: bool,
    goals: Vec<(VarRange, usize)>,
}

impl Emitter<'_> {
    fn render(&self) -> Result<String> {
        let mut out = String::new();
        let mut i = 0;

        while i < self.tokens.len() {
            let token = &self.tokens[i];
            if token.gc {
                i += 1;
                continue;
            }
            match &token.data {
                TokenData::Comment(text) => {
                    if token.lines.is_synthetic() {
                        out.push_str(text);
                        out.push('\n');
                    } else {
                        self.emit_raw(&mut out, token.lines);
                    }
                    i += 1;
                }
                TokenData::VariableStart(_) => {
                    let end = self.matching_end(i, |t| t.is_variable_end());
                    self.emit_variable(&mut out, i, end);
                    i = end + 1;
                }
                TokenData::ConditionalStart(_) => {
                    let end = self.matching_end(i, |t| {
                        matches!(t.data, TokenData::ConditionalEnd(_))
                    });
                    self.emit_conditional(&mut out, i, end);
                    i = end + 1;
                }
                TokenData::TargetStart(target) => {
                    if !self.reformat_all && !self.span_edited(i) {
                        let end = self.matching_end(i, |t| {
                            matches!(t.data, TokenData::TargetEnd(_))
                        });
                        self.emit_raw(&mut out, self.span_lines(i, end));
                        i = end + 1;
                    } else {
                        let mut header = target.names.join(" ");
                        header.push_str(&target.separator);
                        if !target.deps.is_empty() {
                            header.push(' ');
                            header.push_str(&target.deps.join(" "));
                        }
                        if let Some(comment) = &target.comment {
                            header.push(' ');
                            header.push_str(comment);
                        }
                        out.push_str(&header);
                        out.push('\n');
                        i += 1;
                    }
                }
                TokenData::TargetCommandStart(_) => {
                    let end = self.matching_end(i, |t| {
                        matches!(t.data, TokenData::TargetCommandEnd(_))
                    });
                    let words: Vec<&str> = self.tokens[i + 1..end]
                        .iter()
                        .filter(|t| !t.gc)
                        .filter_map(|t| match &t.data {
                            TokenData::TargetCommandToken(_, w) => Some(w.as_str()),
                            _ => None,
                        })
                        .collect();
                    out.push('\t');
                    out.push_str(&words.join(" "));
                    out.push('\n');
                    i = end + 1;
                }
                // End markers and stray payload tokens carry no output of
                // their own.
                _ => i += 1,
            }
        }

        Ok(out)
    }

    fn matching_end<F: Fn(&Token) -> bool>(&self, start: usize, is_end: F) -> usize {
        self.tokens[start..]
            .iter()
            .position(|t| is_end(t))
            .map(|off| start + off)
            .unwrap_or(self.tokens.len() - 1)
    }

    /// Smallest raw-line span covering tokens `start..=end`.
    fn span_lines(&self, start: usize, end: usize) -> LineRange {
        let mut lo = usize::MAX;
        let mut hi = 0;
        for token in &self.tokens[start..=end] {
            if token.lines.is_synthetic() {
                continue;
            }
            lo = lo.min(token.lines.start);
            hi = hi.max(token.lines.end);
        }
        if lo == usize::MAX {
            LineRange::synthetic()
        } else {
            LineRange::new(lo, hi)
        }
    }

    fn span_edited(&self, start: usize) -> bool {
        // A span counts as edited when any of its tokens does; synthetic
        // tokens are always edited by construction.
        let mut edited = false;
        for token in &self.tokens[start..] {
            if token.edited {
                edited = true;
            }
            match &token.data {
                TokenData::VariableEnd(_)
                | TokenData::TargetEnd(_)
                | TokenData::ConditionalEnd(_) => break,
                _ => {}
            }
        }
        edited
    }

    fn emit_raw(&self, out: &mut String, lines: LineRange) {
        if lines.is_synthetic() {
            return;
        }
        for l in lines.start..lines.end {
            if let Some(line) = self.rawlines.get(l - 1) {
                out.push_str(line);
                out.push('\n');
            }
        }
    }

    fn emit_conditional(&self, out: &mut String, start: usize, end: usize) {
        let lines = self.span_lines(start, end);
        if !lines.is_synthetic() {
            self.emit_raw(out, lines);
            return;
        }
        // Synthetic directive: reconstruct from tokens.
        let words: Vec<&str> = self.tokens[start + 1..end]
            .iter()
            .filter_map(|t| match &t.data {
                TokenData::ConditionalToken(_, w) => Some(w.as_str()),
                _ => None,
            })
            .collect();
        out.push_str(&words.join(" "));
        out.push('\n');
    }

    fn emit_variable(&self, out: &mut String, start: usize, end: usize) {
        let range = VarRange { start, end };
        if !self.reformat_all && !self.span_edited(start) {
            self.emit_raw(out, self.span_lines(start, end));
            return;
        }

        let Some(var) = self.tokens[start].variable() else {
            return;
        };
        let tabwidth = self.settings.tabwidth;
        let goal = self
            .goals
            .iter()
            .find(|(r, _)| r.start == start)
            .map(|(_, g)| *g)
            .unwrap_or_else(|| next_tab(var.to_string().len(), tabwidth));

        let label = var.to_string();
        out.push_str(&label);

        let words: Vec<&str> = self.tokens[start + 1..end]
            .iter()
            .filter(|t| !t.gc)
            .filter_map(Token::word)
            .collect();
        if words.is_empty() {
            out.push('\n');
            return;
        }

        let one_per_line = rules::is_wrap_one_per_line(&var.name);
        let mut col = label.len();
        while col < goal {
            out.push('\t');
            col = next_tab(col, tabwidth);
        }

        for (n, word) in words.iter().enumerate() {
            if n == 0 {
                out.push_str(word);
                col += word.len();
                continue;
            }
            let fits = col + 1 + word.len() <= self.settings.wrapcol;
            let comment = word.starts_with('#');
            if (one_per_line || !fits) && !comment {
                out.push_str(" \\\n");
                col = 0;
                while col < goal {
                    out.push('\t');
                    col = next_tab(col, tabwidth);
                }
                out.push_str(word);
                col += word.len();
            } else {
                out.push(' ');
                out.push_str(word);
                col += 1 + word.len();
            }
        }
        out.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit;
    use crate::models::{Behavior, Settings};

    fn reformat(input: &str) -> String {
        let mut parser = Parser::new(Settings::default());
        parser.read("test", input).unwrap();
        emit(&parser).unwrap()
    }

    #[test]
    fn test_simple_variable_alignment() {
        assert_eq!(reformat("PORTNAME=foo\n"), "PORTNAME=\tfoo\n");
        assert_eq!(reformat("USES= cmake gmake\n"), "USES=\tcmake gmake\n");
    }

    #[test]
    fn test_args_wrap_one_per_line() {
        assert_eq!(
            reformat("CMAKE_ARGS= -DFOO=1 -DBAR=2\n"),
            "CMAKE_ARGS=\t-DFOO=1 \\\n\t\t-DBAR=2\n"
        );
    }

    #[test]
    fn test_long_value_wraps_at_column() {
        let input = format!("USES= {} {}\n", "a".repeat(60), "b".repeat(30));
        let output = reformat(&input);
        assert!(output.contains(" \\\n"), "got: {output}");
        for line in output.lines() {
            assert!(line.len() <= 81);
        }
    }

    #[test]
    fn test_adjacent_variables_share_goal_column() {
        let output = reformat("USES=cmake\nPYDISTUTILS_PKGNAME=foo\n");
        // The longest label (20 chars) pushes both to column 24.
        assert_eq!(output, "USES=\t\t\tcmake\nPYDISTUTILS_PKGNAME=\tfoo\n");
    }

    #[test]
    fn test_separated_variables_align_independently() {
        let output = reformat("USES=cmake\n\nPYDISTUTILS_PKGNAME=foo\n");
        assert_eq!(output, "USES=\tcmake\n\nPYDISTUTILS_PKGNAME=\tfoo\n");
    }

    #[test]
    fn test_empty_variable() {
        assert_eq!(reformat("NO_ARCH=\n"), "NO_ARCH=\n");
    }

    #[test]
    fn test_comment_and_conditional_verbatim() {
        let input = "# a   comment\n.if defined(X)\nFOO=bar\n.endif\n";
        let output = reformat(input);
        assert!(output.starts_with("# a   comment\n.if defined(X)\n"));
        assert!(output.ends_with(".endif\n"));
    }

    #[test]
    fn test_target_reformat() {
        let input = "do-install:\n\t${INSTALL_PROGRAM}   ${WRKSRC}/foo   ${STAGEDIR}${PREFIX}/bin\n";
        let output = reformat(input);
        assert_eq!(
            output,
            "do-install:\n\t${INSTALL_PROGRAM} ${WRKSRC}/foo ${STAGEDIR}${PREFIX}/bin\n"
        );
    }

    #[test]
    fn test_rawlines_mode_emits_queue_only() {
        let mut parser = Parser::new(Settings::with_behavior(Behavior::OUTPUT_RAWLINES));
        parser.read("test", "PORTNAME=foo\n").unwrap();
        parser.enqueue_output("hello");
        parser.enqueue_output("world");
        assert_eq!(emit(&parser).unwrap(), "hello\nworld\n");
    }

    #[test]
    fn test_edited_mode_copies_unedited_ranges_verbatim() {
        let input = "PORTNAME=  foo\nUSES= python gmake cmake\n";
        let mut parser = Parser::new(Settings::with_behavior(Behavior::OUTPUT_EDITED));
        parser.read("test", input).unwrap();
        edit::apply(&mut parser, &edit::sort_values::SortVariableValues).unwrap();
        let output = emit(&parser).unwrap();
        // PORTNAME was untouched and keeps its odd spacing; USES was sorted
        // and is reformatted, aligned to the run's goal column (PORTNAME=
        // pushes it to 16).
        assert!(output.contains("PORTNAME=  foo\n"), "got: {output}");
        assert!(output.contains("USES=\t\tcmake gmake python\n"), "got: {output}");
    }

    #[test]
    fn test_edited_mode_roundtrips_untouched_input() {
        let input = "# header\nPORTNAME=  foo\n\n.if defined(X)\nBAR=1\n.endif\ndo-build:\n\t@true   extra\n";
        let mut parser = Parser::new(Settings::with_behavior(Behavior::OUTPUT_EDITED));
        parser.read("test", input).unwrap();
        assert_eq!(emit(&parser).unwrap(), input);
    }

    #[test]
    fn test_deleted_range_does_not_inflate_alignment() {
        use crate::edit::merge::{Merge, MergeFlags};
        let mut parser = Parser::new(Settings::with_behavior(Behavior::OUTPUT_EDITED));
        parser
            .read("test", "A=\t1\nSOME_LONG_UNUSED_NAME=\t2\n")
            .unwrap();
        let merge = Merge::from_snippet(
            "A=99\nSOME_LONG_UNUSED_NAME!=\n",
            MergeFlags::default(),
        )
        .unwrap();
        edit::apply(&mut parser, &merge).unwrap();
        // The deleted sibling's long label must not widen A's run; one tab
        // reaches column 8.
        assert_eq!(emit(&parser).unwrap(), "A=\t99\n");
    }

    #[test]
    fn test_run_continues_across_deleted_range() {
        use crate::edit::merge::{Merge, MergeFlags};
        let input = "PORTNAME=\tfoo\nZZZ_GONE=\tx\nDISTVERSION=\t1.0\n";
        let mut parser = Parser::new(Settings::with_behavior(Behavior::OUTPUT_EDITED));
        parser.read("test", input).unwrap();
        let merge = Merge::from_snippet(
            "ZZZ_GONE!=\nDISTVERSION=2.0\n",
            MergeFlags::default(),
        )
        .unwrap();
        edit::apply(&mut parser, &merge).unwrap();
        // The survivors sit next to each other in the output and share one
        // run: PORTNAME= pushes DISTVERSION to column 16.
        let output = emit(&parser).unwrap();
        assert_eq!(output, "PORTNAME=\tfoo\nDISTVERSION=\t2.0\n");
    }

    #[test]
    fn test_gc_tokens_are_skipped() {
        let mut parser = Parser::new(Settings::default());
        parser.read("test", "CMAKE_ARGS= -D FOO=1\n").unwrap();
        edit::apply(&mut parser, &edit::sanitize_cmake::SanitizeCmakeArgs).unwrap();
        assert_eq!(emit(&parser).unwrap(), "CMAKE_ARGS=\t-DFOO=1\n");
    }
}
