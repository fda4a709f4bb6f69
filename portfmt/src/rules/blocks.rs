//! The canonical variable-order schema.
//!
//! Every variable name maps to exactly one [`Block`]. Blocks appear in the
//! enum in canonical order; within a block, variables follow the order of
//! the table below, names not listed sort lexicographically after the listed
//! ones. Templated entries (`BROKEN_<ARCH>`, `<OPT>_DESC`, ...) are matched
//! by the pattern list checked after the literal table misses.

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;

/// Canonical grouping of port variables. Variant order is canonical block
/// order; `Unknown` sorts last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Block {
    PortName,
    Patchfiles,
    Maintainer,
    License,
    Broken,
    Depends,
    Flavors,
    Uses,
    Github,
    Gitlab,
    ShebangFix,
    UniqueFiles,
    Apache,
    Cabal,
    Cargo,
    Elixir,
    Emacs,
    Erlang,
    Gnome,
    Go,
    Gstreamer,
    Horde,
    Java,
    Kde,
    Lazarus,
    Linux,
    Lua,
    Mate,
    Mozilla,
    Nodejs,
    Ocaml,
    Perl5,
    Php,
    Python,
    Qmail,
    Qt,
    Ruby,
    Rubygems,
    Sbcl,
    Scons,
    Tcl,
    Tex,
    Wx,
    Xfce,
    Xorg,
    Cmake,
    Configure,
    Qmake,
    Meson,
    Make,
    Cflags,
    Conflicts,
    Standard,
    Wrksrc,
    Users,
    Plist,
    SubFiles,
    OptionsDefinitions,
    OptionsHelpers,
    Unknown,
}

impl Block {
    /// Human-readable name used in lint output headers.
    pub fn name(&self) -> &'static str {
        match self {
            Block::PortName => "PORTNAME",
            Block::Patchfiles => "PATCHFILES",
            Block::Maintainer => "MAINTAINER",
            Block::License => "LICENSE",
            Block::Broken => "BROKEN",
            Block::Depends => "DEPENDS",
            Block::Flavors => "FLAVORS",
            Block::Uses => "USES",
            Block::Github => "USE_GITHUB",
            Block::Gitlab => "USE_GITLAB",
            Block::ShebangFix => "SHEBANG_FIX",
            Block::UniqueFiles => "UNIQUEFILES",
            Block::Apache => "APACHE",
            Block::Cabal => "CABAL",
            Block::Cargo => "CARGO",
            Block::Elixir => "ELIXIR",
            Block::Emacs => "EMACS",
            Block::Erlang => "ERLANG",
            Block::Gnome => "GNOME",
            Block::Go => "GO",
            Block::Gstreamer => "GSTREAMER",
            Block::Horde => "HORDE",
            Block::Java => "JAVA",
            Block::Kde => "KDE",
            Block::Lazarus => "LAZARUS",
            Block::Linux => "LINUX",
            Block::Lua => "LUA",
            Block::Mate => "MATE",
            Block::Mozilla => "MOZILLA",
            Block::Nodejs => "NODEJS",
            Block::Ocaml => "OCAML",
            Block::Perl5 => "PERL5",
            Block::Php => "PHP",
            Block::Python => "PYTHON",
            Block::Qmail => "QMAIL",
            Block::Qt => "QT",
            Block::Ruby => "RUBY",
            Block::Rubygems => "RUBYGEMS",
            Block::Sbcl => "SBCL",
            Block::Scons => "SCONS",
            Block::Tcl => "TCL",
            Block::Tex => "TEX",
            Block::Wx => "WX",
            Block::Xfce => "XFCE",
            Block::Xorg => "XORG",
            Block::Cmake => "CMAKE",
            Block::Configure => "CONFIGURE",
            Block::Qmake => "QMAKE",
            Block::Meson => "MESON",
            Block::Make => "MAKE",
            Block::Cflags => "CFLAGS",
            Block::Conflicts => "CONFLICTS",
            Block::Standard => "STANDARD",
            Block::Wrksrc => "WRKSRC",
            Block::Users => "USERS",
            Block::Plist => "PLIST",
            Block::SubFiles => "SUB_FILES",
            Block::OptionsDefinitions => "OPTIONS_DEFINITIONS",
            Block::OptionsHelpers => "OPTIONS_HELPERS",
            Block::Unknown => "UNKNOWN",
        }
    }
}

/// Per-block variable order. The table drives both the canonical reorder
/// pass and `compare_order`.
pub(crate) static BLOCK_VARIABLES: &[(Block, &[&str])] = &[
    (
        Block::PortName,
        &[
            "PORTNAME",
            "PORTVERSION",
            "DISTVERSIONPREFIX",
            "DISTVERSION",
            "DISTVERSIONSUFFIX",
            "PORTREVISION",
            "PORTEPOCH",
            "CATEGORIES",
            "MASTER_SITES",
            "MASTER_SITE_SUBDIR",
            "PKGNAMEPREFIX",
            "PKGNAMESUFFIX",
            "DISTNAME",
            "EXTRACT_SUFX",
            "DISTFILES",
            "DIST_SUBDIR",
            "EXTRACT_ONLY",
        ],
    ),
    (
        Block::Patchfiles,
        &["PATCH_SITES", "PATCHFILES", "PATCH_DIST_STRIP"],
    ),
    (Block::Maintainer, &["MAINTAINER", "COMMENT", "WWW"]),
    (
        Block::License,
        &[
            "LICENSE",
            "LICENSE_COMB",
            "LICENSE_GROUPS",
            "LICENSE_NAME",
            "LICENSE_TEXT",
            "LICENSE_FILE",
            "LICENSE_PERMS",
            "LICENSE_DISTFILES",
            "RESTRICTED",
            "RESTRICTED_FILES",
            "NO_CDROM",
            "NO_PACKAGE",
        ],
    ),
    (
        Block::Broken,
        &[
            "DEPRECATED",
            "EXPIRATION_DATE",
            "FORBIDDEN",
            "BROKEN",
            "IGNORE",
            "ONLY_FOR_ARCHS",
            "ONLY_FOR_ARCHS_REASON",
            "NOT_FOR_ARCHS",
            "NOT_FOR_ARCHS_REASON",
        ],
    ),
    (
        Block::Depends,
        &[
            "FETCH_DEPENDS",
            "EXTRACT_DEPENDS",
            "PATCH_DEPENDS",
            "BUILD_DEPENDS",
            "LIB_DEPENDS",
            "RUN_DEPENDS",
            "TEST_DEPENDS",
        ],
    ),
    (Block::Flavors, &["FLAVORS", "FLAVOR"]),
    (Block::Uses, &["USES", "CPE_VENDOR", "CPE_PRODUCT", "CPE_VERSION"]),
    (
        Block::Github,
        &[
            "USE_GITHUB",
            "GH_ACCOUNT",
            "GH_PROJECT",
            "GH_SUBDIR",
            "GH_TAGNAME",
            "GH_TUPLE",
        ],
    ),
    (
        Block::Gitlab,
        &[
            "USE_GITLAB",
            "GL_SITE",
            "GL_ACCOUNT",
            "GL_PROJECT",
            "GL_COMMIT",
            "GL_SUBDIR",
            "GL_TUPLE",
        ],
    ),
    (
        Block::ShebangFix,
        &[
            "SHEBANG_FILES",
            "SHEBANG_GLOB",
            "SHEBANG_REGEX",
            "SHEBANG_LANG",
        ],
    ),
    (
        Block::UniqueFiles,
        &["UNIQUE_PREFIX_FILES", "UNIQUE_SUFFIX_FILES"],
    ),
    (
        Block::Apache,
        &["USE_APACHE", "AP_EXTRAS", "AP_INC", "AP_LIB", "MODULENAME", "SHORTMODNAME"],
    ),
    (Block::Cabal, &["USE_CABAL", "CABAL_FLAGS", "EXECUTABLES"]),
    (
        Block::Cargo,
        &[
            "CARGO_CRATES",
            "CARGO_USE_GITHUB",
            "CARGO_USE_GITLAB",
            "CARGO_GH_CARGOTOML",
            "CARGO_FEATURES",
            "CARGO_BUILDDEP",
            "CARGO_BUILD",
            "CARGO_BUILD_ARGS",
            "CARGO_INSTALL",
            "CARGO_INSTALL_ARGS",
            "CARGO_INSTALL_PATH",
            "CARGO_TEST",
            "CARGO_TEST_ARGS",
            "CARGO_TARGET_DIR",
            "CARGO_ENV",
        ],
    ),
    (Block::Elixir, &["MIX_BUILD_DEPS", "MIX_RUN_DEPS", "MIX_ENV", "MIX_TARGET"]),
    (Block::Emacs, &["EMACS_FLAVORS_EXCLUDE", "EMACS_NO_DEPENDS"]),
    (Block::Erlang, &["ERL_APP_NAME", "ERL_APP_ROOT", "REBAR_CMD", "REBAR_TARGETS"]),
    (
        Block::Gnome,
        &["USE_GNOME", "GCONF_SCHEMAS", "GLIB_SCHEMAS", "INSTALLS_ICONS"],
    ),
    (
        Block::Go,
        &[
            "GO_MODULE",
            "GO_PKGNAME",
            "GO_TARGET",
            "GO_BUILDFLAGS",
            "GO_TESTFLAGS",
            "CGO_ENABLED",
            "CGO_CFLAGS",
            "CGO_LDFLAGS",
        ],
    ),
    (Block::Gstreamer, &["USE_GSTREAMER"]),
    (Block::Horde, &["USE_HORDE_BUILD", "USE_HORDE_RUN"]),
    (Block::Java, &["USE_JAVA", "JAVA_VERSION", "JAVA_BUILD", "JAVA_RUN"]),
    (
        Block::Kde,
        &["USE_KDE", "KDE_INVENT", "KDE_PLASMA_VERSION", "KDE_FRAMEWORKS_VERSION"],
    ),
    (Block::Lazarus, &["USE_FPC", "USE_LAZARUS", "LAZARUS_PROJECT_FILES", "LAZBUILD_ARGS"]),
    (
        Block::Linux,
        &["USE_LINUX", "USE_LINUX_RPM", "BIN_DISTNAMES", "LIB_DISTNAMES", "SHARE_DISTNAMES"],
    ),
    (Block::Lua, &["LUA_FLAVOR", "LUA_PREMODULES", "LUA_PKGNAMEPREFIX"]),
    (Block::Mate, &["USE_MATE"]),
    (Block::Mozilla, &["USE_MOZILLA"]),
    (Block::Nodejs, &["NODEJS_VERSION", "NPM_PKG_NAME"]),
    (Block::Ocaml, &["USE_OCAML", "USE_OCAML_FINDLIB", "USE_OCAMLFIND_PLIST"]),
    (Block::Perl5, &["USE_PERL5", "PERL_CONFIGURE_ARGS"]),
    (
        Block::Php,
        &["USE_PHP", "PHP_MODNAME", "PHP_VER", "IGNORE_WITH_PHP"],
    ),
    (
        Block::Python,
        &[
            "USE_PYTHON",
            "PYTHON_CMD",
            "PYTHON_VERSION",
            "PYDISTUTILS_PKGNAME",
            "PYDISTUTILS_PKGVERSION",
            "PYDISTUTILS_BUILDARGS",
            "PYDISTUTILS_INSTALLARGS",
        ],
    ),
    (Block::Qmail, &["QMAIL_PREFIX", "QMAIL_SLASHPACKAGE"]),
    (Block::Qt, &["USE_QT", "QT_CONFIG", "QT_DEFINES", "QT_BINARIES"]),
    (
        Block::Ruby,
        &[
            "USE_RUBY",
            "RUBY_NO_BUILD",
            "RUBY_NO_RUN_DEPENDS",
            "RUBY_EXTCONF",
            "RUBY_SETUP",
        ],
    ),
    (Block::Rubygems, &["GEM_NAME", "GEM_ENV"]),
    (Block::Sbcl, &["USE_ASDF", "USE_ASDF_FASL", "FASL_TARGET"]),
    (Block::Scons, &["SCONS_ARGS", "SCONS_BUILDENV", "SCONS_ENV", "SCONS_TARGET"]),
    (Block::Tcl, &["USE_TCL", "USE_TK"]),
    (Block::Tex, &["USE_TEX"]),
    (Block::Wx, &["USE_WX", "USE_WX_NOT", "WX_COMPS", "WX_CONF_ARGS", "WX_PREMK"]),
    (Block::Xfce, &["USE_XFCE"]),
    (Block::Xorg, &["USE_XORG"]),
    (
        Block::Cmake,
        &[
            "CMAKE_ON",
            "CMAKE_OFF",
            "CMAKE_ARGS",
            "CMAKE_BUILD_TYPE",
            "CMAKE_INSTALL_PREFIX",
            "CMAKE_SOURCE_PATH",
            "CMAKE_TESTING_ON",
            "CMAKE_TESTING_OFF",
        ],
    ),
    (
        Block::Configure,
        &[
            "HAS_CONFIGURE",
            "GNU_CONFIGURE",
            "GNU_CONFIGURE_PREFIX",
            "CONFIGURE_CMD",
            "CONFIGURE_SCRIPT",
            "CONFIGURE_TARGET",
            "CONFIGURE_OUTSOURCE",
            "CONFIGURE_ARGS",
            "CONFIGURE_ENV",
            "CONFIGURE_SHELL",
        ],
    ),
    (
        Block::Qmake,
        &["QMAKE_ARGS", "QMAKE_ENV", "QMAKE_CONFIGURE_ARGS", "QMAKE_SOURCE_PATH"],
    ),
    (Block::Meson, &["MESON_ARGS", "MESON_BUILD_DIR"]),
    (
        Block::Make,
        &[
            "MAKEFILE",
            "MAKE_CMD",
            "MAKE_ARGS",
            "MAKE_ENV",
            "MAKE_FLAGS",
            "MAKE_JOBS_UNSAFE",
            "ALL_TARGET",
            "INSTALL_TARGET",
            "TEST_TARGET",
            "TEST_ARGS",
            "TEST_ENV",
        ],
    ),
    (
        Block::Cflags,
        &[
            "CFLAGS",
            "CPPFLAGS",
            "CXXFLAGS",
            "FFLAGS",
            "FCFLAGS",
            "RUSTFLAGS",
            "LDFLAGS",
            "LIBS",
            "LLD_UNSAFE",
            "SSP_UNSAFE",
            "SSP_CFLAGS",
            "WITHOUT_CPU_CFLAGS",
        ],
    ),
    (
        Block::Conflicts,
        &["CONFLICTS", "CONFLICTS_BUILD", "CONFLICTS_INSTALL"],
    ),
    (
        Block::Standard,
        &[
            "ARCH",
            "AR",
            "BINARY_ALIAS",
            "BINARY_WRAPPERS",
            "BUNDLE_LIBS",
            "DESKTOP_ENTRIES",
            "DAEMONARGS",
            "ETCDIR",
            "EXTRA_PATCHES",
            "IS_INTERACTIVE",
            "NO_ARCH",
            "NO_ARCH_IGNORE",
            "NO_BUILD",
            "NO_INSTALL",
            "NO_MTREE",
            "NO_TEST",
            "NOPRECIOUSMAKEVARS",
            "PORTSCOUT",
            "SCRIPTDIR",
            "STRIP",
            "STRIP_CMD",
            "USE_LDCONFIG",
            "USE_LOCALE",
            "USE_RC_SUBR",
            "WARNING",
        ],
    ),
    (
        Block::Wrksrc,
        &[
            "WRKSRC",
            "WRKSRC_SUBDIR",
            "NO_WRKSUBDIR",
            "BUILD_WRKSRC",
            "CONFIGURE_WRKSRC",
            "INSTALL_WRKSRC",
            "PATCH_WRKSRC",
            "TEST_WRKSRC",
        ],
    ),
    (Block::Users, &["USERS", "GROUPS"]),
    (
        Block::Plist,
        &[
            "INFO",
            "INFO_PATH",
            "PLIST",
            "PLIST_DIRS",
            "PLIST_FILES",
            "PLIST_SUB",
            "PORTDATA",
            "PORTDOCS",
            "PORTEXAMPLES",
        ],
    ),
    (Block::SubFiles, &["SUB_FILES", "SUB_LIST"]),
    (
        Block::OptionsDefinitions,
        &[
            "OPTIONS_DEFINE",
            "OPTIONS_DEFAULT",
            "OPTIONS_GROUP",
            "OPTIONS_SINGLE",
            "OPTIONS_RADIO",
            "OPTIONS_MULTI",
            "OPTIONS_EXCLUDE",
            "OPTIONS_SLAVE",
            "OPTIONS_OVERRIDE",
            "NO_OPTIONS_SORT",
            "OPTIONS_SUB",
        ],
    ),
    // OptionsHelpers and Unknown have no literal members; helpers are
    // matched by suffix, everything else lands in Unknown.
    (Block::OptionsHelpers, &[]),
    (Block::Unknown, &[]),
];

lazy_static! {
    /// Literal name -> (block, order index within block).
    pub(crate) static ref VARIABLE_ORDER: HashMap<&'static str, (Block, usize)> = {
        let mut map = HashMap::new();
        for (block, names) in BLOCK_VARIABLES {
            for (idx, name) in names.iter().enumerate() {
                map.insert(*name, (*block, idx));
            }
        }
        map
    };

    /// Templated entries, checked in order after a literal miss. Literal
    /// table wins ties by construction; within this list, more specific
    /// patterns come first.
    pub(crate) static ref VARIABLE_PATTERNS: Vec<(Regex, Block)> = vec![
        (Regex::new(r"^LICENSE_(NAME|TEXT|FILE|PERMS|DISTFILES)_[A-Za-z0-9._+ ]+$").unwrap(), Block::License),
        (Regex::new(r"^(BROKEN|IGNORE)_[a-z0-9_]+$").unwrap(), Block::Broken),
        (Regex::new(r"^(ONLY|NOT)_FOR_ARCHS_REASON_[a-z0-9_]+$").unwrap(), Block::Broken),
        (Regex::new(r"^OPTIONS_DEFINE_[a-z0-9_]+$").unwrap(), Block::OptionsDefinitions),
        (Regex::new(r"^OPTIONS_DEFAULT_[a-z0-9_]+$").unwrap(), Block::OptionsDefinitions),
        (Regex::new(r"^OPTIONS_EXCLUDE_[a-z0-9_]+$").unwrap(), Block::OptionsDefinitions),
        (Regex::new(r"^OPTIONS_(GROUP|SINGLE|RADIO|MULTI)_[A-Z0-9_]+$").unwrap(), Block::OptionsDefinitions),
        (Regex::new(r"^[A-Z0-9_]+_DESC$").unwrap(), Block::OptionsDefinitions),
        (Regex::new(r"^(CFLAGS|CPPFLAGS|CXXFLAGS|FFLAGS|LDFLAGS)_[A-Za-z0-9_]+$").unwrap(), Block::Cflags),
        (Regex::new(r"^[a-z0-9]+_CMD$").unwrap(), Block::ShebangFix),
        (Regex::new(r"^(SHEBANG_FILES|SHEBANG_GLOB|SHEBANG_REGEX)_[A-Za-z0-9_]+$").unwrap(), Block::ShebangFix),
        (Regex::new(r"^GH_(ACCOUNT|PROJECT|SUBDIR|TAGNAME|TUPLE)_[A-Za-z0-9_]+$").unwrap(), Block::Github),
        (Regex::new(r"^GL_(SITE|ACCOUNT|PROJECT|COMMIT|SUBDIR|TUPLE)_[A-Za-z0-9_]+$").unwrap(), Block::Gitlab),
        (Regex::new(r"^[A-Z0-9_]+_DEPENDS$").unwrap(), Block::Depends),
        (Regex::new(r"^PLIST_SUB_[A-Za-z0-9_]+$").unwrap(), Block::Plist),
        // Generic USE_<TOOL> falls into the USES block when no dedicated
        // block claimed it above or in the literal table.
        (Regex::new(r"^USE_[A-Z0-9_]+$").unwrap(), Block::Uses),
    ];
}

/// Order index of a literal member of its block, if listed.
pub(crate) fn member_index(name: &str) -> Option<(Block, usize)> {
    VARIABLE_ORDER.get(name).copied()
}

/// Block lookup for names absent from the literal table.
pub(crate) fn pattern_block(name: &str) -> Option<Block> {
    VARIABLE_PATTERNS
        .iter()
        .find(|(re, _)| re.is_match(name))
        .map(|(_, block)| *block)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_lookup() {
        assert_eq!(member_index("PORTNAME"), Some((Block::PortName, 0)));
        assert_eq!(member_index("PORTVERSION"), Some((Block::PortName, 1)));
        assert_eq!(member_index("COMMENT"), Some((Block::Maintainer, 1)));
        assert_eq!(member_index("NO_SUCH_VARIABLE"), None);
    }

    #[test]
    fn test_block_enum_order_is_canonical() {
        assert!(Block::PortName < Block::Maintainer);
        assert!(Block::Maintainer < Block::Uses);
        assert!(Block::OptionsHelpers < Block::Unknown);
    }

    #[test]
    fn test_pattern_lookup() {
        assert_eq!(pattern_block("BROKEN_aarch64"), Some(Block::Broken));
        assert_eq!(pattern_block("X11_DESC"), Some(Block::OptionsDefinitions));
        assert_eq!(pattern_block("OPTIONS_GROUP_GFX"), Some(Block::OptionsDefinitions));
        assert_eq!(pattern_block("USE_GCC"), Some(Block::Uses));
        assert_eq!(pattern_block("python_CMD"), Some(Block::ShebangFix));
        assert_eq!(pattern_block("TOTALLY_MADE_UP"), None);
    }

    #[test]
    fn test_every_block_listed_at_most_once() {
        let mut seen = std::collections::HashSet::new();
        for (block, _) in BLOCK_VARIABLES {
            assert!(seen.insert(*block), "block listed twice: {:?}", block);
        }
    }

    #[test]
    fn test_no_variable_listed_in_two_blocks() {
        let mut seen = std::collections::HashSet::new();
        for (_, names) in BLOCK_VARIABLES {
            for name in *names {
                assert!(seen.insert(*name), "variable listed twice: {name}");
            }
        }
    }
}
