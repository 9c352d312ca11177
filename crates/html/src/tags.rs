//! Static tag tables: singular tags, nesting rules, raw-text containers.
//!
//! All names are canonical (upper-case). Lookups take canonical names; use
//! [`canonical_tag`] on anything that came from input.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

/// Tag used for comments in the singular set.
pub const COMMENT_TAG: &str = "!--";
pub const DOCTYPE_TAG: &str = "!DOCTYPE";
pub const INCLUDE_TAG: &str = "INCLUDE";

const SINGULAR_TAGS: &[&str] = &[
    "AREA", "BASE", "BASEFONT", "BR", "COL", "EMBED", "FRAME", "HR", "IMG", "INPUT", "ISINDEX",
    "KEYGEN", "LINK", "META", "NEXTID", "PARAM", "SOURCE", "TRACK", "WBR", COMMENT_TAG,
    DOCTYPE_TAG,
];

/// Container tag and the tags expected to nest directly inside it.
const NESTING_RULES: &[(&str, &[&str])] = &[
    ("HTML", &["HEAD", "BODY", "FRAMESET"]),
    ("TABLE", &["CAPTION", "COLGROUP", "THEAD", "TBODY", "TFOOT", "TR"]),
    ("THEAD", &["TR"]),
    ("TBODY", &["TR"]),
    ("TFOOT", &["TR"]),
    ("TR", &["TD", "TH"]),
    ("COLGROUP", &["COL"]),
    ("UL", &["LI"]),
    ("OL", &["LI"]),
    ("DIR", &["LI"]),
    ("MENU", &["LI"]),
    ("DL", &["DT", "DD"]),
    ("SELECT", &["OPTION"]),
];

const RAW_TEXT_TAGS: &[&str] = &["SCRIPT", "STYLE"];

/// Tags whose content must not gain layout whitespace when rendering.
const NO_INDENT_TAGS: &[&str] = &["PRE", "TEXTAREA", "A"];

/// Child tag -> legal container tags, inverted from [`NESTING_RULES`].
static PARENT_TAGS: LazyLock<HashMap<&'static str, HashSet<&'static str>>> =
    LazyLock::new(|| {
        let mut parents: HashMap<&'static str, HashSet<&'static str>> = HashMap::new();
        for (container, children) in NESTING_RULES {
            for child in *children {
                let _ = parents.entry(*child).or_default().insert(*container);
            }
        }
        parents
    });

pub fn is_singular(tag: &str) -> bool {
    SINGULAR_TAGS.iter().any(|t| t.eq_ignore_ascii_case(tag))
}

pub fn is_raw_text(tag: &str) -> bool {
    RAW_TEXT_TAGS.iter().any(|t| t.eq_ignore_ascii_case(tag))
}

pub fn suppresses_indent(tag: &str) -> bool {
    NO_INDENT_TAGS.iter().any(|t| t.eq_ignore_ascii_case(tag))
}

/// Legal containers of `tag`, or `None` when no nesting rule mentions it.
pub fn parent_tags(tag: &str) -> Option<&'static HashSet<&'static str>> {
    PARENT_TAGS.get(tag)
}

/// Canonical spelling of a tag name.
///
/// Names starting with an ASCII letter are upper-cased, as is the `!DOCTYPE`
/// declaration name. Pseudo-tags (`&entity`, literals, the empty group tag,
/// `!--`) are returned unchanged: entity names are case-sensitive.
pub fn canonical_tag(tag: &str) -> String {
    match tag.as_bytes().first() {
        Some(b) if b.is_ascii_alphabetic() => tag.to_ascii_uppercase(),
        Some(b'!') if tag.len() > 2 && !tag.starts_with(COMMENT_TAG) => {
            tag.to_ascii_uppercase()
        }
        _ => tag.to_string(),
    }
}

/// Heading level of `H<n>` tags, e.g. `Some(7)` for `H7`.
pub fn heading_level(tag: &str) -> Option<u32> {
    let rest = tag.strip_prefix('H').or_else(|| tag.strip_prefix('h'))?;
    if rest.is_empty() || !rest.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    // digit runs too long for u32 are still headings, just very deep ones
    Some(rest.parse().unwrap_or(u32::MAX))
}
