//! Shorthand token trees and their normalization into canonical [`Node`]s.
//!
//! Shorthand exists for callers building markup by hand:
//!
//! ```
//! use html::tok::{short, short_with};
//! use html::{normalize, render_to_string, RenderConfig};
//!
//! let list = short("UL", vec![short("LI", vec!["one".into()]), short("LI", vec!["two".into()])]);
//! let link = short_with("a", &[("href", "/x")], vec!["x".into()]);
//! let nodes = normalize(&[list, link]);
//! assert_eq!(
//!     render_to_string(&RenderConfig::default(), &nodes),
//!     r#"<UL><LI>one</LI><LI>two</LI></UL><A HREF="/x">x</A>"#
//! );
//! ```
use crate::collect::flatten_text;
use crate::tags::{COMMENT_TAG, canonical_tag};
use crate::types::{Attributes, Element, Node};

/// A token in shorthand or canonical form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Tok {
    Text(String),
    /// `[tag, attrs?, children...]`.
    Short {
        tag: String,
        attrs: Option<Attributes>,
        children: Vec<Tok>,
    },
    Node(Node),
}

impl From<&str> for Tok {
    fn from(text: &str) -> Self {
        Tok::Text(text.to_string())
    }
}

impl From<String> for Tok {
    fn from(text: String) -> Self {
        Tok::Text(text)
    }
}

impl From<Node> for Tok {
    fn from(node: Node) -> Self {
        Tok::Node(node)
    }
}

impl From<Element> for Tok {
    fn from(el: Element) -> Self {
        Tok::Node(Node::Element(el))
    }
}

/// Build an attribute map with canonical names.
pub fn attrs<'a, I>(pairs: I) -> Attributes
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_ascii_uppercase(), Some(v.to_string())))
        .collect()
}

pub fn short(tag: &str, children: Vec<Tok>) -> Tok {
    Tok::Short {
        tag: tag.to_string(),
        attrs: None,
        children,
    }
}

pub fn short_with(tag: &str, pairs: &[(&str, &str)], children: Vec<Tok>) -> Tok {
    Tok::Short {
        tag: tag.to_string(),
        attrs: Some(attrs(pairs.iter().copied())),
        children,
    }
}

/// Canonical element from a tag, optional attributes and children.
pub fn make_token(tag: &str, attrs: Option<Attributes>, children: &[Tok]) -> Element {
    let mut el = Element::new(tag);
    if let Some(attrs) = attrs {
        el.attrs = canonical_attrs(&attrs);
    }
    el.children = normalize(children);
    el
}

/// Character entity pseudo-token, e.g. `entity("nbsp")`.
pub fn entity(name: &str) -> Tok {
    Tok::Node(Node::Element(Element::new(&format!("&{name}"))))
}

pub fn comment(text: &str) -> Tok {
    Tok::Node(Node::Comment(text.to_string()))
}

/// `text` with every whitespace run replaced by one `&nbsp;` entity.
pub fn nbsp(text: &str) -> Tok {
    let mut children = Vec::new();
    for (i, word) in text.split_whitespace().enumerate() {
        if i > 0 {
            children.push(entity("nbsp"));
        }
        children.push(Tok::from(word));
    }
    short("", children)
}

/// A complete page: `HTML`, `HEAD` with content type and `TITLE`, then `BODY`.
pub fn page(title: &str, head: Vec<Tok>, body: Vec<Tok>) -> Tok {
    let mut head_children = vec![
        short_with(
            "META",
            &[
                ("http-equiv", "Content-Type"),
                ("content", "text/html; charset=utf-8"),
            ],
            Vec::new(),
        ),
        short("TITLE", vec![Tok::from(title)]),
    ];
    head_children.extend(head);
    short(
        "HTML",
        vec![short("HEAD", head_children), short("BODY", body)],
    )
}

fn canonical_attrs(attrs: &Attributes) -> Attributes {
    attrs
        .iter()
        .map(|(k, v)| (k.to_ascii_uppercase(), v.clone()))
        .collect()
}

/// Convert shorthand tokens into canonical nodes, recursively.
///
/// Canonical input is copied with tag and attribute names canonicalized, so
/// `normalize` is idempotent.
pub fn normalize(toks: &[Tok]) -> Vec<Node> {
    toks.iter().map(normalize_one).collect()
}

fn normalize_one(tok: &Tok) -> Node {
    match tok {
        Tok::Text(text) => Node::Text(text.clone()),
        Tok::Node(node) => canonicalize(node),
        Tok::Short {
            tag,
            attrs,
            children,
        } => {
            if tag == "<!--" || tag == COMMENT_TAG {
                return Node::Comment(flatten_text(&normalize(children)));
            }
            Node::Element(Element {
                tag: canonical_tag(tag),
                attrs: attrs.as_ref().map(canonical_attrs).unwrap_or_default(),
                children: normalize(children),
            })
        }
    }
}

fn canonicalize(node: &Node) -> Node {
    match node {
        Node::Element(el) => Node::Element(Element {
            tag: canonical_tag(&el.tag),
            attrs: canonical_attrs(&el.attrs),
            children: el.children.iter().map(canonicalize).collect(),
        }),
        Node::EndTag(tag) => Node::EndTag(canonical_tag(tag)),
        other => other.clone(),
    }
}
