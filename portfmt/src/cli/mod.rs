//! Shared plumbing for the four binaries: input/output handling, unified
//! diff rendering, tracing setup.

pub mod color;

use std::fs;
use std::io::{self, IsTerminal, Read, Write};
use std::path::Path;

use crate::diff::{self, DiffType};
use crate::models::{Error, Result};

/// Install the tracing subscriber. Filtering comes from `PORTFMT_LOG`
/// (e.g. `PORTFMT_LOG=portfmt=debug`); silent by default.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_env("PORTFMT_LOG").unwrap_or_else(|_| EnvFilter::new("off"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Read the document: a file path, or stdin when absent.
pub fn read_input(file: Option<&Path>) -> Result<(String, String)> {
    match file {
        Some(path) => {
            let contents = fs::read_to_string(path)?;
            Ok((path.display().to_string(), contents))
        }
        None => {
            let mut contents = String::new();
            io::stdin().read_to_string(&mut contents)?;
            Ok(("-".to_string(), contents))
        }
    }
}

/// Write the transformed document: in place, or to stdout.
pub fn write_output(inplace: bool, file: Option<&Path>, output: &str) -> Result<()> {
    if inplace {
        let Some(path) = file else {
            return Err(Error::InvalidArgument(
                "-i requires a file argument".into(),
            ));
        };
        fs::write(path, output)?;
    } else {
        io::stdout().write_all(output.as_bytes())?;
    }
    Ok(())
}

/// Is colored output appropriate for stdout?
pub fn color_enabled(no_color: bool) -> bool {
    !no_color && io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none()
}

/// Unified diff between the original and transformed document, or `None`
/// when they are equal. `context` common lines surround each hunk.
pub fn unified_diff(
    old: &str,
    new: &str,
    name: &str,
    context: usize,
    colored: bool,
) -> Option<String> {
    let old_lines: Vec<String> = old.lines().map(String::from).collect();
    let new_lines: Vec<String> = new.lines().map(String::from).collect();
    let edits = diff::diff_lines(&old_lines, &new_lines);
    if edits.iter().all(|e| e.kind == DiffType::Common) {
        return None;
    }

    struct Annotated<'a> {
        kind: DiffType,
        text: &'a str,
        old_no: usize,
        new_no: usize,
    }

    let mut annotated: Vec<Annotated<'_>> = Vec::with_capacity(edits.len());
    let mut old_no = 1;
    let mut new_no = 1;
    for edit in &edits {
        annotated.push(Annotated {
            kind: edit.kind,
            text: edit.element,
            old_no,
            new_no,
        });
        match edit.kind {
            DiffType::Common => {
                old_no += 1;
                new_no += 1;
            }
            DiffType::Delete => old_no += 1,
            DiffType::Add => new_no += 1,
        }
    }

    let changes: Vec<usize> = annotated
        .iter()
        .enumerate()
        .filter(|(_, a)| a.kind != DiffType::Common)
        .map(|(i, _)| i)
        .collect();

    let mut out = String::new();
    out.push_str(&color::paint(color::RED, &format!("--- {name}"), colored));
    out.push('\n');
    out.push_str(&color::paint(color::GREEN, &format!("+++ {name}"), colored));
    out.push('\n');

    // Group changed lines into hunks joined when their context overlaps.
    let mut i = 0;
    while i < changes.len() {
        let mut j = i;
        while j + 1 < changes.len() && changes[j + 1] - changes[j] <= 2 * context + 1 {
            j += 1;
        }
        let start = changes[i].saturating_sub(context);
        let end = (changes[j] + context).min(annotated.len() - 1);

        let old_count = annotated[start..=end]
            .iter()
            .filter(|a| a.kind != DiffType::Add)
            .count();
        let new_count = annotated[start..=end]
            .iter()
            .filter(|a| a.kind != DiffType::Delete)
            .count();
        let mut old_start = annotated[start].old_no;
        let mut new_start = annotated[start].new_no;
        if old_count == 0 {
            old_start = old_start.saturating_sub(1);
        }
        if new_count == 0 {
            new_start = new_start.saturating_sub(1);
        }

        let header = format!("@@ -{old_start},{old_count} +{new_start},{new_count} @@");
        out.push_str(&color::paint(color::CYAN, &header, colored));
        out.push('\n');

        for a in &annotated[start..=end] {
            let line = match a.kind {
                DiffType::Common => format!(" {}", a.text),
                DiffType::Delete => format!("-{}", a.text),
                DiffType::Add => format!("+{}", a.text),
            };
            out.push_str(&color::paint_diff_line(&line, colored));
            out.push('\n');
        }
        i = j + 1;
    }

    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unified_diff_equal_is_none() {
        assert!(unified_diff("a\nb\n", "a\nb\n", "Makefile", 3, false).is_none());
    }

    #[test]
    fn test_unified_diff_basic() {
        let old = "one\ntwo\nthree\n";
        let new = "one\n2\nthree\n";
        let diff = unified_diff(old, new, "Makefile", 3, false).unwrap();
        assert!(diff.starts_with("--- Makefile\n+++ Makefile\n"));
        assert!(diff.contains("@@ -1,3 +1,3 @@"));
        assert!(diff.contains("-two\n+2\n"));
    }

    #[test]
    fn test_unified_diff_context_limits_hunk() {
        let old: Vec<String> = (1..=20).map(|n| n.to_string()).collect();
        let mut new = old.clone();
        new[9] = "X".to_string();
        let diff = unified_diff(
            &(old.join("\n") + "\n"),
            &(new.join("\n") + "\n"),
            "f",
            2,
            false,
        )
        .unwrap();
        assert!(diff.contains("@@ -8,5 +8,5 @@"), "got:\n{diff}");
        assert!(!diff.contains(" 1\n"), "got:\n{diff}");
        assert!(!diff.contains(" 20\n"), "got:\n{diff}");
    }

    #[test]
    fn test_unified_diff_pure_addition() {
        let diff = unified_diff("a\n", "a\nb\n", "f", 3, false).unwrap();
        assert!(diff.contains("+b"));
        assert!(diff.contains("@@ -1,1 +1,2 @@"), "got:\n{diff}");
    }
}
