//! Options-helper recognition.
//!
//! An options helper is a variable `<OPT>_<SUFFIX>` where `<SUFFIX>` is one
//! of the registered helper names (`X11_CMAKE_ON`, `DOCS_BUILD_DEPENDS`,
//! ...). The suffix list order is the canonical order of helpers within one
//! option's group of the `OPTIONS_HELPERS` block.

use std::collections::HashMap;

use lazy_static::lazy_static;

/// Helper suffixes in canonical order. `_OFF` twins follow their `_ON`
/// sibling so that toggling reads naturally in a formatted file.
pub(crate) static HELPER_ORDER: &[&str] = &[
    "IMPLIES",
    "PREVENTS",
    "PREVENTS_MSG",
    "CATEGORIES",
    "DESCRIPTION",
    "ALL_TARGET",
    "ALL_TARGET_OFF",
    "BINARY_ALIAS",
    "BINARY_ALIAS_OFF",
    "BROKEN",
    "BROKEN_OFF",
    "IGNORE",
    "IGNORE_OFF",
    "PATCH_SITES",
    "PATCH_SITES_OFF",
    "PATCHFILES",
    "PATCHFILES_OFF",
    "EXTRA_PATCHES",
    "EXTRA_PATCHES_OFF",
    "DISTFILES",
    "DISTFILES_OFF",
    "EXTRACT_ONLY",
    "EXTRACT_ONLY_OFF",
    "FETCH_DEPENDS",
    "FETCH_DEPENDS_OFF",
    "EXTRACT_DEPENDS",
    "EXTRACT_DEPENDS_OFF",
    "PATCH_DEPENDS",
    "PATCH_DEPENDS_OFF",
    "BUILD_DEPENDS",
    "BUILD_DEPENDS_OFF",
    "LIB_DEPENDS",
    "LIB_DEPENDS_OFF",
    "RUN_DEPENDS",
    "RUN_DEPENDS_OFF",
    "TEST_DEPENDS",
    "TEST_DEPENDS_OFF",
    "PKG_DEPENDS",
    "PKG_DEPENDS_OFF",
    "USES",
    "USES_OFF",
    "USE",
    "USE_OFF",
    "GH_ACCOUNT",
    "GH_PROJECT",
    "GH_SUBDIR",
    "GH_TAGNAME",
    "GH_TUPLE",
    "GL_ACCOUNT",
    "GL_COMMIT",
    "GL_PROJECT",
    "GL_SITE",
    "GL_SUBDIR",
    "GL_TUPLE",
    "CFLAGS",
    "CFLAGS_OFF",
    "CPPFLAGS",
    "CPPFLAGS_OFF",
    "CXXFLAGS",
    "CXXFLAGS_OFF",
    "LDFLAGS",
    "LDFLAGS_OFF",
    "CMAKE_BOOL",
    "CMAKE_BOOL_OFF",
    "CMAKE_ON",
    "CMAKE_OFF",
    "CONFIGURE_ENABLE",
    "CONFIGURE_WITH",
    "CONFIGURE_ON",
    "CONFIGURE_OFF",
    "CONFIGURE_ENV",
    "CONFIGURE_ENV_OFF",
    "MESON_ENABLED",
    "MESON_DISABLED",
    "MESON_TRUE",
    "MESON_FALSE",
    "MESON_YES",
    "MESON_NO",
    "MESON_ON",
    "MESON_OFF",
    "QMAKE_ON",
    "QMAKE_OFF",
    "MAKE_ARGS",
    "MAKE_ARGS_OFF",
    "MAKE_ENV",
    "MAKE_ENV_OFF",
    "TEST_TARGET",
    "TEST_TARGET_OFF",
    "INSTALL_TARGET",
    "INSTALL_TARGET_OFF",
    "DESKTOP_ENTRIES",
    "DESKTOP_ENTRIES_OFF",
    "INFO",
    "INFO_OFF",
    "PLIST_DIRS",
    "PLIST_DIRS_OFF",
    "PLIST_FILES",
    "PLIST_FILES_OFF",
    "PLIST_SUB",
    "PLIST_SUB_OFF",
    "PORTDOCS",
    "PORTDOCS_OFF",
    "PORTEXAMPLES",
    "PORTEXAMPLES_OFF",
    "SUB_FILES",
    "SUB_FILES_OFF",
    "SUB_LIST",
    "SUB_LIST_OFF",
    "VARS",
    "VARS_OFF",
];

lazy_static! {
    static ref HELPER_INDEX: HashMap<&'static str, usize> = HELPER_ORDER
        .iter()
        .enumerate()
        .map(|(i, name)| (*name, i))
        .collect();
}

/// Split `FOO_CMAKE_ON` into (`FOO`, `CMAKE_ON`) if the suffix names a known
/// helper. The longest matching suffix wins so `X11_PLIST_SUB_OFF` resolves
/// to helper `PLIST_SUB_OFF`, not `SUB_LIST`-style partial matches.
pub fn split_helper(name: &str) -> Option<(&str, &str)> {
    let mut best: Option<(&str, &str)> = None;
    for suffix in HELPER_ORDER {
        if let Some(prefix) = name.strip_suffix(suffix) {
            let Some(prefix) = prefix.strip_suffix('_') else {
                continue;
            };
            if prefix.is_empty() {
                continue;
            }
            match best {
                Some((_, s)) if s.len() >= suffix.len() => {}
                _ => best = Some((prefix, suffix)),
            }
        }
    }
    best
}

/// Canonical index of a helper suffix.
pub(crate) fn helper_index(suffix: &str) -> Option<usize> {
    HELPER_INDEX.get(suffix).copied()
}
