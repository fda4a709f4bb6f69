//! The rules catalogue: immutable, process-wide domain knowledge.
//!
//! Answers the micro-queries the parser, the edit passes and the emitter
//! run constantly: which block does a variable belong to, how do two names
//! compare canonically, is a right-hand side sortable, is a target known.
//! All tables are initialized once at startup and safe for concurrent read.

pub mod blocks;
pub mod helpers;
pub mod targets;

use std::cmp::Ordering;
use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;

pub use blocks::Block;
pub use helpers::split_helper;

use crate::parser::token::{Token, TokenData};

/// Canonical block of a variable name. Total: unmatched names land in
/// [`Block::Unknown`].
pub fn variable_order_block(name: &str) -> Block {
    if let Some((block, _)) = blocks::member_index(name) {
        return block;
    }
    // Helper check runs before the generic patterns so that
    // `X11_BUILD_DEPENDS` is an options helper, not a dependency variable.
    if split_helper(name).is_some() {
        return Block::OptionsHelpers;
    }
    blocks::pattern_block(name).unwrap_or(Block::Unknown)
}

/// Sortable key inducing the canonical total order over variable names:
/// block order first, then the per-block listed order, templated entries
/// after their base entry, unlisted names lexicographically last.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct OrderKey {
    block: Block,
    tier: u8,
    index: usize,
    group: String,
    sub: usize,
    name: String,
}

fn order_key(name: &str) -> OrderKey {
    if let Some((block, index)) = blocks::member_index(name) {
        return OrderKey {
            block,
            tier: 0,
            index,
            group: String::new(),
            sub: 0,
            name: name.to_string(),
        };
    }

    // Templated options definitions order after their base entry:
    // OPTIONS_GROUP_GFX directly after OPTIONS_GROUP, <OPT>_DESC last.
    for base in [
        "OPTIONS_DEFINE",
        "OPTIONS_DEFAULT",
        "OPTIONS_GROUP",
        "OPTIONS_SINGLE",
        "OPTIONS_RADIO",
        "OPTIONS_MULTI",
        "OPTIONS_EXCLUDE",
    ] {
        if let Some(rest) = name.strip_prefix(base) {
            if let Some(rest) = rest.strip_prefix('_') {
                let (_, index) = blocks::member_index(base).unwrap_or((Block::OptionsDefinitions, 0));
                return OrderKey {
                    block: Block::OptionsDefinitions,
                    tier: 0,
                    index,
                    group: rest.to_string(),
                    sub: 0,
                    name: name.to_string(),
                };
            }
        }
    }

    if let Some(opt) = name.strip_suffix("_DESC") {
        if variable_order_block(name) == Block::OptionsDefinitions {
            return OrderKey {
                block: Block::OptionsDefinitions,
                tier: 1,
                index: 0,
                group: opt.to_string(),
                sub: 0,
                name: name.to_string(),
            };
        }
    }

    if let Some((opt, helper)) = split_helper(name) {
        return OrderKey {
            block: Block::OptionsHelpers,
            tier: 0,
            index: 0,
            group: opt.to_uppercase(),
            sub: helpers::helper_index(helper).unwrap_or(usize::MAX),
            name: name.to_string(),
        };
    }

    OrderKey {
        block: blocks::pattern_block(name).unwrap_or(Block::Unknown),
        tier: 1,
        index: 0,
        group: String::new(),
        sub: 0,
        name: name.to_string(),
    }
}

/// Total order on variable names: block order, then per-block order.
pub fn compare_order(a: &str, b: &str) -> Ordering {
    order_key(a).cmp(&order_key(b))
}

lazy_static! {
    static ref LEAVE_ALONE: HashSet<&'static str> = [
        "CATEGORIES",
        "COMMENT",
        "MAINTAINER",
        "WWW",
        "DISTNAME",
        "DISTFILES",
        "MASTER_SITES",
        "MASTER_SITE_SUBDIR",
        "PATCH_SITES",
        "PATCHFILES",
        "EXTRACT_ONLY",
        "FLAVORS",
        "DEPRECATED",
        "EXPIRATION_DATE",
        "BROKEN",
        "FORBIDDEN",
        "IGNORE",
        "RESTRICTED",
        "NO_CDROM",
        "NO_PACKAGE",
        "DAEMONARGS",
        "WARNING",
        "MAKEFILE",
        "LIBS",
        "USERS",
        "GROUPS",
    ]
    .into_iter()
    .collect();

    static ref APPEND_ONLY: HashSet<&'static str> = [
        "CFLAGS",
        "CPPFLAGS",
        "CXXFLAGS",
        "FFLAGS",
        "FCFLAGS",
        "LDFLAGS",
        "LIBS",
        "RUSTFLAGS",
        "CGO_CFLAGS",
        "CGO_LDFLAGS",
    ]
    .into_iter()
    .collect();

    static ref APPEND_ONLY_PATTERN: Regex =
        Regex::new(r"^(C|CPP|CXX|F|FC|LD|RUST)FLAGS_[A-Za-z0-9_]+$").unwrap();

    static ref PORT_MK_PATTERN: Regex =
        Regex::new(r"^bsd\.port(\.(pre|post|options))?\.mk$").unwrap();

    static ref PRESERVE_EOL_COMMENT: HashSet<&'static str> = [
        "BROKEN",
        "DEPRECATED",
        "EXPIRATION_DATE",
        "FORBIDDEN",
        "IGNORE",
        "RESTRICTED",
        "NO_CDROM",
        "NO_PACKAGE",
    ]
    .into_iter()
    .collect();
}

/// Free-text and order-sensitive suffixes whose values must never be
/// sorted.
fn has_unsortable_suffix(name: &str) -> bool {
    const SUFFIXES: &[&str] = &[
        "_ARGS", "_ENV", "_CMD", "_FLAGS", "_REASON", "_MSG", "_DESC", "_TARGET",
    ];
    SUFFIXES.iter().any(|s| name.ends_with(s))
}

/// Is the right-hand side of this variable canonically sorted?
pub fn should_sort(name: &str) -> bool {
    if LEAVE_ALONE.contains(name) {
        return false;
    }
    if name.starts_with("BROKEN_") || name.starts_with("IGNORE_") {
        return false;
    }
    if has_unsortable_suffix(name) {
        return false;
    }
    if let Some((_, helper)) = split_helper(name) {
        // Helper twins of free-text variables inherit their behavior.
        let base = helper.strip_suffix("_OFF").unwrap_or(helper);
        if matches!(base, "BROKEN" | "IGNORE" | "PREVENTS_MSG" | "DESCRIPTION") {
            return false;
        }
        if has_unsortable_suffix(base) {
            return false;
        }
    }
    true
}

/// Option names sort case-insensitively; everything else is byte order.
pub fn sort_case_insensitive(name: &str) -> bool {
    variable_order_block(name) == Block::OptionsDefinitions
}

/// Variables that must keep `+=` because the framework seeds them.
pub fn is_append_only_variable(name: &str) -> bool {
    APPEND_ONLY.contains(name) || APPEND_ONLY_PATTERN.is_match(name)
}

/// Trailing comments on these variables carry required information (ports
/// bug references and the like) and are never hoisted.
pub fn preserve_eol_comment(name: &str) -> bool {
    PRESERVE_EOL_COMMENT.contains(name)
        || split_helper(name).is_some_and(|(_, helper)| {
            PRESERVE_EOL_COMMENT.contains(helper.strip_suffix("_OFF").unwrap_or(helper))
        })
}

/// `-D`-joining applies inside these variables.
pub fn is_cmake_args_like(name: &str) -> bool {
    if matches!(name, "CMAKE_ARGS" | "MESON_ARGS") {
        return true;
    }
    split_helper(name).is_some_and(|(_, helper)| {
        matches!(helper, "CMAKE_ON" | "CMAKE_OFF" | "MESON_ON" | "MESON_OFF")
    })
}

/// Variables whose values are printed one per continuation line.
pub fn is_wrap_one_per_line(name: &str) -> bool {
    const NAMES: &[&str] = &[
        "PLIST_FILES",
        "PLIST_DIRS",
        "MASTER_SITES",
        "DISTFILES",
        "CARGO_CRATES",
        "GH_TUPLE",
        "GL_TUPLE",
        "PATCHFILES",
    ];
    if NAMES.contains(&name) {
        return true;
    }
    let base = name.strip_suffix("_OFF").unwrap_or(name);
    const SUFFIXES: &[&str] = &["_DEPENDS", "_ARGS", "_ENV", "_VARS"];
    SUFFIXES.iter().any(|s| base.ends_with(s))
}

/// `OPTIONS_DEFINE` and its per-arch variants.
pub fn is_options_define(name: &str) -> bool {
    name == "OPTIONS_DEFINE" || name.starts_with("OPTIONS_DEFINE_")
}

/// Group name of `OPTIONS_{GROUP,SINGLE,RADIO,MULTI}_<G>`.
pub fn options_group_name(name: &str) -> Option<&str> {
    for base in ["OPTIONS_GROUP_", "OPTIONS_SINGLE_", "OPTIONS_RADIO_", "OPTIONS_MULTI_"] {
        if let Some(group) = name.strip_prefix(base) {
            return Some(group);
        }
    }
    None
}

/// The group-list variables themselves.
pub fn is_options_group_list(name: &str) -> bool {
    matches!(
        name,
        "OPTIONS_GROUP" | "OPTIONS_SINGLE" | "OPTIONS_RADIO" | "OPTIONS_MULTI"
    )
}

/// Framework target, special target, or per-option hook of a framework
/// target (`post-patch-X11-on`).
pub fn is_known_target(name: &str, options: &HashSet<String>) -> bool {
    if targets::TARGET_INDEX.contains_key(name) || is_special_target(name) {
        return true;
    }
    option_hook_base(name, options).is_some()
}

/// Strip `-<OPT>-on`/`-<OPT>-off` from an option hook and return the base
/// target, when the base is known and the option is declared.
fn option_hook_base<'a>(name: &'a str, options: &HashSet<String>) -> Option<&'a str> {
    for state in ["-on", "-off"] {
        if let Some(rest) = name.strip_suffix(state) {
            if let Some(dash) = rest.rfind('-') {
                let (base, opt) = (&rest[..dash], &rest[dash + 1..]);
                if targets::TARGET_INDEX.contains_key(base) && options.contains(opt) {
                    return Some(base);
                }
            }
        }
    }
    None
}

pub fn is_special_target(name: &str) -> bool {
    targets::SPECIAL_TARGETS.contains(&name)
}

/// Total order on target names: known targets in framework order, unknown
/// targets after them in lexicographic order.
pub fn compare_target_order(a: &str, b: &str) -> Ordering {
    match (targets::TARGET_INDEX.get(a), targets::TARGET_INDEX.get(b)) {
        (Some(x), Some(y)) => x.cmp(y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// Does the conditional starting at `idx` include the ports framework
/// epilogue (`bsd.port.mk` and siblings)?
pub fn is_include_bsd_port_mk(tokens: &[Token], idx: usize) -> bool {
    let Some(TokenData::ConditionalStart(cond)) = tokens.get(idx).map(|t| &t.data) else {
        return false;
    };
    if !matches!(
        cond.kind,
        crate::parser::token::ConditionalKind::Include
            | crate::parser::token::ConditionalKind::Sinclude
    ) {
        return false;
    }
    // Skip the directive word, inspect the first real argument.
    let mut args = tokens[idx + 1..].iter().take_while(|t| {
        matches!(t.data, TokenData::ConditionalToken(..))
    });
    args.next();
    if let Some(token) = args.next() {
        if let TokenData::ConditionalToken(_, word) = &token.data {
            let path = word.trim_matches(|c| c == '<' || c == '>' || c == '"');
            let file = path.rsplit('/').next().unwrap_or(path);
            return PORT_MK_PATTERN.is_match(file);
        }
    }
    false
}
