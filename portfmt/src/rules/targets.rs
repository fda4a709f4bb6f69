//! Known and special target names.

use std::collections::HashMap;

use lazy_static::lazy_static;

/// Framework targets in canonical order. `compare_target_order` ranks
/// unknown targets after every known one, lexicographically among
/// themselves.
pub(crate) static TARGET_ORDER: &[&str] = &[
    "all",
    "post-chroot",
    "pre-everything",
    "fetch",
    "fetch-list",
    "fetch-recursive",
    "fetch-recursive-list",
    "pre-fetch",
    "do-fetch",
    "post-fetch",
    "checksum",
    "checksum-recursive",
    "makesum",
    "extract",
    "pre-extract",
    "do-extract",
    "post-extract",
    "patch",
    "pre-patch",
    "do-patch",
    "post-patch",
    "configure",
    "pre-configure",
    "do-configure",
    "post-configure",
    "build",
    "pre-build",
    "do-build",
    "post-build",
    "stage",
    "pre-stage",
    "do-stage",
    "post-stage",
    "install",
    "pre-install",
    "do-install",
    "post-install",
    "test",
    "pre-test",
    "do-test",
    "post-test",
    "package",
    "pre-package",
    "do-package",
    "post-package",
    "install-mtree",
    "reinstall",
    "deinstall",
    "deinstall-all",
    "check-sanity",
    "check-build-conflicts",
    "check-conflicts",
    "check-install-conflicts",
    "check-orphans",
    "check-plist",
    "checkpatch",
    "clean",
    "pre-clean",
    "post-clean",
    "distclean",
    "delete-distfiles",
    "makepatch",
    "maintainer",
    "describe",
];

/// Make's own dot-targets; these never count as unknown and are never
/// reordered.
pub(crate) static SPECIAL_TARGETS: &[&str] = &[
    ".BEGIN",
    ".DEFAULT",
    ".DELETE_ON_ERROR",
    ".END",
    ".ERROR",
    ".EXEC",
    ".IGNORE",
    ".INTERRUPT",
    ".MAIN",
    ".MAKEFLAGS",
    ".NOPATH",
    ".NOTPARALLEL",
    ".OBJDIR",
    ".ORDER",
    ".PATH",
    ".PHONY",
    ".POSIX",
    ".PRECIOUS",
    ".RECURSIVE",
    ".SHELL",
    ".SILENT",
    ".STALE",
    ".SUFFIXES",
    ".WAIT",
];

lazy_static! {
    pub(crate) static ref TARGET_INDEX: HashMap<&'static str, usize> = TARGET_ORDER
        .iter()
        .enumerate()
        .map(|(i, name)| (*name, i))
        .collect();
}
