//! Batch scanner: walk a ports tree, parse every port Makefile, aggregate
//! structural findings.
//!
//! One parser instance per worker on a disjoint slice of origins; results
//! are joined in the calling thread and sorted by origin so two runs over
//! the same tree are byte-identical regardless of worker count.

pub mod log;

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::edit::unknowns;
use crate::models::{Behavior, Result, Settings};
use crate::parser::Parser;

/// Findings for one origin.
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    pub origin: String,
    pub unknown_variables: Vec<String>,
    pub unknown_targets: Vec<String>,
    pub duplicate_variables: Vec<String>,
    pub option_groups: Vec<String>,
    pub options: Vec<String>,
}

/// Scanner configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanFlags {
    /// Also report declared option groups (`Og`) and options (`O`).
    pub include_options: bool,
}

/// Directories under a ports tree that are not categories.
const NON_CATEGORIES: &[&str] = &[
    "Mk",
    "Templates",
    "Tools",
    "Keywords",
    "distfiles",
    "packages",
];

/// Resolve the list of (origin, Makefile path) pairs to scan. Explicit
/// origins win; otherwise the whole tree is walked. The result is sorted
/// by origin for reproducibility.
pub fn collect_origins(portsdir: &Path, origins: &[String]) -> Result<Vec<(String, PathBuf)>> {
    let mut found = Vec::new();

    if !origins.is_empty() {
        for origin in origins {
            found.push((origin.clone(), portsdir.join(origin).join("Makefile")));
        }
    } else {
        for category in read_subdirs(portsdir)? {
            let name = category
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default()
                .to_string();
            if name.starts_with('.') || NON_CATEGORIES.contains(&name.as_str()) {
                continue;
            }
            for port in read_subdirs(&category)? {
                let makefile = port.join("Makefile");
                if !makefile.is_file() {
                    continue;
                }
                let port_name = port
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or_default();
                found.push((format!("{name}/{port_name}"), makefile));
            }
        }
    }

    found.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(found)
}

fn read_subdirs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut subdirs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            subdirs.push(path);
        }
    }
    Ok(subdirs)
}

/// Parse one port and collect its findings.
pub fn scan_port(origin: &str, makefile: &Path) -> Result<ScanResult> {
    let mut parser = Parser::new(Settings::with_behavior(Behavior::OUTPUT_RAWLINES));
    parser.read_file(makefile)?;
    debug!(origin, "scanned");

    let mut options: Vec<String> = parser.options().iter().cloned().collect();
    options.sort();
    let mut option_groups: Vec<String> = parser.option_groups().iter().cloned().collect();
    option_groups.sort();

    Ok(ScanResult {
        origin: origin.to_string(),
        unknown_variables: unknowns::unknown_variables(&parser, parser.tokens()),
        unknown_targets: unknowns::unknown_targets(&parser, parser.tokens()),
        duplicate_variables: unknowns::duplicate_variables(parser.tokens()),
        option_groups,
        options,
    })
}

/// Scan every origin in parallel and render the aggregated report lines,
/// sorted by origin. Ports that fail to parse are reported on the log and
/// skipped; the batch proceeds.
pub fn scan(portsdir: &Path, origins: &[String], flags: ScanFlags) -> Result<Vec<String>> {
    let targets = collect_origins(portsdir, origins)?;

    let mut results: Vec<ScanResult> = targets
        .par_iter()
        .filter_map(|(origin, makefile)| match scan_port(origin, makefile) {
            Ok(result) => Some(result),
            Err(err) => {
                warn!(origin = %origin, error = %err, "skipping port");
                None
            }
        })
        .collect();
    results.sort_by(|a, b| a.origin.cmp(&b.origin));

    let mut lines = Vec::new();
    for result in &results {
        for name in &result.unknown_variables {
            lines.push(format!("V {} {}", result.origin, name));
        }
        for name in &result.unknown_targets {
            lines.push(format!("T {} {}", result.origin, name));
        }
        for name in &result.duplicate_variables {
            lines.push(format!("Vc {} {}", result.origin, name));
        }
        if flags.include_options {
            for name in &result.option_groups {
                lines.push(format!("Og {} {}", result.origin, name));
            }
            for name in &result.options {
                lines.push(format!("O {} {}", result.origin, name));
            }
        }
    }
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_port(root: &Path, origin: &str, contents: &str) {
        let dir = root.join(origin);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("Makefile"), contents).unwrap();
    }

    #[test]
    fn test_scan_reports_findings() {
        let tmp = tempfile::tempdir().unwrap();
        write_port(
            tmp.path(),
            "devel/foo",
            "PORTNAME=\tfoo\nMY_KNOB=\t1\nmy-target:\n\t@true\n",
        );
        let lines = scan(tmp.path(), &[], ScanFlags::default()).unwrap();
        assert!(lines.contains(&"V devel/foo MY_KNOB".to_string()));
        assert!(lines.contains(&"T devel/foo my-target".to_string()));
    }

    #[test]
    fn test_scan_is_deterministic() {
        let tmp = tempfile::tempdir().unwrap();
        write_port(tmp.path(), "devel/zz", "PORTNAME=\tzz\nAAA_X=\t1\n");
        write_port(tmp.path(), "devel/aa", "PORTNAME=\taa\nBBB_X=\t1\n");
        write_port(tmp.path(), "www/mm", "PORTNAME=\tmm\nCCC_X=\t1\n");
        let first = scan(tmp.path(), &[], ScanFlags::default()).unwrap();
        let second = scan(tmp.path(), &[], ScanFlags::default()).unwrap();
        assert_eq!(first, second);
        // Sorted by origin.
        let origins: Vec<&str> = first
            .iter()
            .map(|l| l.split_whitespace().nth(1).unwrap())
            .collect();
        let mut sorted = origins.clone();
        sorted.sort();
        assert_eq!(origins, sorted);
    }

    #[test]
    fn test_scan_options_flag() {
        let tmp = tempfile::tempdir().unwrap();
        write_port(
            tmp.path(),
            "devel/opt",
            "PORTNAME=\topt\nOPTIONS_DEFINE=\tDOCS\nOPTIONS_GROUP=\tGFX\nOPTIONS_GROUP_GFX=\tOPENGL\n",
        );
        let without = scan(tmp.path(), &[], ScanFlags::default()).unwrap();
        assert!(without.iter().all(|l| !l.starts_with("O ")));

        let with = scan(
            tmp.path(),
            &[],
            ScanFlags {
                include_options: true,
            },
        )
        .unwrap();
        assert!(with.contains(&"O devel/opt DOCS".to_string()));
        assert!(with.contains(&"Og devel/opt GFX".to_string()));
    }

    #[test]
    fn test_broken_port_is_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        write_port(tmp.path(), "devel/good", "PORTNAME=\tgood\nGOOD_X=\t1\n");
        write_port(tmp.path(), "devel/bad", ".endif\n");
        let lines = scan(tmp.path(), &[], ScanFlags::default()).unwrap();
        assert!(lines.contains(&"V devel/good GOOD_X".to_string()));
        assert!(lines.iter().all(|l| !l.contains("devel/bad")));
    }

    #[test]
    fn test_explicit_origins() {
        let tmp = tempfile::tempdir().unwrap();
        write_port(tmp.path(), "devel/one", "ONE_X=\t1\n");
        write_port(tmp.path(), "devel/two", "TWO_X=\t1\n");
        let lines = scan(
            tmp.path(),
            &["devel/two".to_string()],
            ScanFlags::default(),
        )
        .unwrap();
        assert_eq!(lines, vec!["V devel/two TWO_X"]);
    }

    #[test]
    fn test_non_categories_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        write_port(tmp.path(), "Mk/Uses", "UNPARSEABLE_X=\t1\n");
        write_port(tmp.path(), "devel/foo", "FOO_X=\t1\n");
        let lines = scan(tmp.path(), &[], ScanFlags::default()).unwrap();
        assert_eq!(lines, vec!["V devel/foo FOO_X"]);
    }
}
