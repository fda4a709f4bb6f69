//! ANSI color constants for diff and lint output.

pub const RESET: &str = "\x1b[0m";
pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const CYAN: &str = "\x1b[36m";

/// Wrap a line in a color when enabled.
pub fn paint(color: &str, line: &str, enabled: bool) -> String {
    if enabled {
        format!("{color}{line}{RESET}")
    } else {
        line.to_string()
    }
}

/// Color for one diff/lint line by its leading character.
pub fn diff_line_color(line: &str) -> &'static str {
    match line.as_bytes().first() {
        Some(b'+') => GREEN,
        Some(b'-') => RED,
        Some(b'@') => CYAN,
        _ => "",
    }
}

/// Paint a diff/lint line according to its kind.
pub fn paint_diff_line(line: &str, enabled: bool) -> String {
    let color = diff_line_color(line);
    if color.is_empty() {
        line.to_string()
    } else {
        paint(color, line, enabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paint_disabled_is_identity() {
        assert_eq!(paint(RED, "x", false), "x");
    }

    #[test]
    fn test_diff_line_colors() {
        assert_eq!(paint_diff_line("+USES", true), "\x1b[32m+USES\x1b[0m");
        assert_eq!(paint_diff_line("-USES", true), "\x1b[31m-USES\x1b[0m");
        assert_eq!(paint_diff_line("@@ -1 +1 @@", true), "\x1b[36m@@ -1 +1 @@\x1b[0m");
        assert_eq!(paint_diff_line(" USES", true), " USES");
    }
}
