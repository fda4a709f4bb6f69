//! Persisted scan logs.
//!
//! A log directory holds one newline-delimited report per run, named by
//! timestamp, with a `latest` symlink pointing at the newest. A run whose
//! report equals the previous one writes nothing.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::debug;

use crate::models::Result;

/// What `commit` did with the fresh report.
#[derive(Debug, PartialEq, Eq)]
pub enum LogOutcome {
    /// Identical to the previous run; nothing written.
    Unchanged,
    /// New log written at this path.
    Written(PathBuf),
}

/// Compare against the run `latest` points at and persist when changed.
pub fn commit(logdir: &Path, lines: &[String]) -> Result<LogOutcome> {
    fs::create_dir_all(logdir)?;
    let latest = logdir.join("latest");

    if let Ok(previous) = fs::read_to_string(&latest) {
        let prev_lines: Vec<&str> = previous.lines().collect();
        if prev_lines == lines.iter().map(String::as_str).collect::<Vec<_>>() {
            debug!(logdir = %logdir.display(), "scan log unchanged");
            return Ok(LogOutcome::Unchanged);
        }
    }

    let name = format!("{}.log", Local::now().format("%Y-%m-%dT%H%M%S"));
    let path = logdir.join(&name);
    let mut contents = lines.join("\n");
    if !contents.is_empty() {
        contents.push('\n');
    }
    fs::write(&path, contents)?;
    point_latest(&latest, &name)?;
    debug!(log = %path.display(), "scan log written");
    Ok(LogOutcome::Written(path))
}

#[cfg(unix)]
fn point_latest(latest: &Path, name: &str) -> Result<()> {
    if latest.symlink_metadata().is_ok() {
        fs::remove_file(latest)?;
    }
    std::os::unix::fs::symlink(name, latest)?;
    Ok(())
}

#[cfg(not(unix))]
fn point_latest(latest: &Path, name: &str) -> Result<()> {
    let target = latest.parent().unwrap_or_else(|| Path::new(".")).join(name);
    fs::copy(target, latest)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_first_commit_writes() {
        let tmp = tempfile::tempdir().unwrap();
        let outcome = commit(tmp.path(), &lines(&["V devel/foo X"])).unwrap();
        let LogOutcome::Written(path) = outcome else {
            panic!("expected a written log");
        };
        assert_eq!(fs::read_to_string(path).unwrap(), "V devel/foo X\n");
        assert!(tmp.path().join("latest").exists());
    }

    #[test]
    fn test_unchanged_run_writes_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let report = lines(&["V devel/foo X", "T devel/foo t"]);
        commit(tmp.path(), &report).unwrap();
        let entries_before = fs::read_dir(tmp.path()).unwrap().count();
        let outcome = commit(tmp.path(), &report).unwrap();
        assert_eq!(outcome, LogOutcome::Unchanged);
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), entries_before);
    }

    #[test]
    fn test_changed_run_updates_latest() {
        let tmp = tempfile::tempdir().unwrap();
        commit(tmp.path(), &lines(&["V a/b X"])).unwrap();
        let outcome = commit(tmp.path(), &lines(&["V a/b Y"])).unwrap();
        assert!(matches!(outcome, LogOutcome::Written(_)));
        let latest = fs::read_to_string(tmp.path().join("latest")).unwrap();
        assert_eq!(latest, "V a/b Y\n");
    }
}
