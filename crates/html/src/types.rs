use std::collections::BTreeMap;

/// Attribute map of a canonical element.
///
/// Keys are canonical (upper-case) attribute names. A `BTreeMap` keeps output
/// order alphabetical, so rendering the same element twice is byte-identical.
pub type Attributes = BTreeMap<String, Option<String>>;

/// Primitive markup token, as produced by a [`TokenSource`](crate::TokenSource).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    Doctype(String),
    StartTag {
        name: String,
        attributes: Vec<(String, Option<String>)>,
        self_closing: bool,
    },
    EndTag(String),
    Comment(String),
    Text(String),
}

impl Token {
    pub fn start(name: &str) -> Self {
        Token::StartTag {
            name: name.to_string(),
            attributes: Vec::new(),
            self_closing: false,
        }
    }

    pub fn end(name: &str) -> Self {
        Token::EndTag(name.to_string())
    }

    pub fn text(text: &str) -> Self {
        Token::Text(text.to_string())
    }
}

/// Canonical element token.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Element {
    pub tag: String,
    pub attrs: Attributes,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: crate::tags::canonical_tag(tag),
            attrs: Attributes::new(),
            children: Vec::new(),
        }
    }

    /// Case-insensitive attribute lookup.
    pub fn attr(&self, name: &str) -> Option<&str> {
        if let Some(v) = self.attrs.get(name) {
            return v.as_deref();
        }
        self.attrs
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .and_then(|(_, v)| v.as_deref())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.keys().any(|k| k.eq_ignore_ascii_case(name))
    }

    pub fn set_attr(&mut self, name: &str, value: Option<&str>) {
        let _ = self
            .attrs
            .insert(name.to_ascii_uppercase(), value.map(str::to_string));
    }

    pub fn is_named(&self, name: &str) -> bool {
        self.tag.eq_ignore_ascii_case(name)
    }
}

/// A node of a parsed (or hand-built) token tree.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Node {
    Text(String),
    Element(Element),
    Comment(String),
    Doctype(String),
    /// Closing tag that matched nothing open; kept so the output reproduces it.
    EndTag(String),
}

impl Node {
    pub fn text(text: &str) -> Self {
        Node::Text(text.to_string())
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn tag(&self) -> Option<&str> {
        self.as_element().map(|el| el.tag.as_str())
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Node::Element(el) => &el.children,
            _ => &[],
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Element(el) => Some(&mut el.children),
            _ => None,
        }
    }
}

impl From<Element> for Node {
    fn from(el: Element) -> Self {
        Node::Element(el)
    }
}
