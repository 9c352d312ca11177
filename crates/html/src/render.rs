//! Markup serializer for canonical token trees.
//!
//! Besides ordinary elements the serializer understands a few pseudo-tags:
//!
//! - `""` groups children without markup of its own;
//! - `&name` emits a character entity reference;
//! - a tag starting with any other non-word character (other than `!`) is
//!   emitted verbatim, as a pre-escaped fragment;
//! - `INCLUDE` splices in the resource named by its `SRC` attribute, or links
//!   to it when it cannot be opened;
//! - `H7` and deeper become a bold paragraph.
use crate::collect::{Emphasis, escape_text, flatten_text, overstrike};
use crate::entities::is_entity_ref;
use crate::tags::{self, COMMENT_TAG, INCLUDE_TAG, canonical_tag};
use crate::tok::{Tok, normalize};
use crate::types::{Attributes, Element, Node};
use std::borrow::Cow;
use std::fmt::Write as _;
use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::{Component, Path, PathBuf};

/// Link text used when a failed `INCLUDE` has no children of its own.
pub const INCLUDE_FALLBACK_TEXT: &str = "[included document unavailable]";

const INDENT_STEP: &str = "  ";
const MAX_HEADING_LEVEL: u32 = 6;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderConfig {
    /// Put nested elements on their own lines, two columns per level.
    pub indent: bool,
    /// Turn typewriter overstrikes in text into `B`/`I` markup.
    pub overstrike: bool,
    /// Lower-case names, `name="name"` for valueless attributes, `<br />`.
    pub xhtml: bool,
}

#[derive(Debug)]
pub enum IncludeError {
    NotFound(String),
    OutsideRoot(String),
    Io { name: String, source: io::Error },
}

impl std::fmt::Display for IncludeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IncludeError::NotFound(name) => write!(f, "include resource not found: {name}"),
            IncludeError::OutsideRoot(name) => {
                write!(f, "include resource outside the include root: {name}")
            }
            IncludeError::Io { name, source } => {
                write!(f, "include resource {name} could not be read: {source}")
            }
        }
    }
}

impl std::error::Error for IncludeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IncludeError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Opens the resources named by `INCLUDE` tokens.
pub trait ResourceOpener {
    fn open(&self, name: &str) -> Result<Box<dyn Read>, IncludeError>;
}

/// Refuses every include, so `INCLUDE` always renders as a link.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoIncludes;

impl ResourceOpener for NoIncludes {
    fn open(&self, name: &str) -> Result<Box<dyn Read>, IncludeError> {
        Err(IncludeError::NotFound(name.to_string()))
    }
}

/// Opens include resources from the filesystem.
///
/// With a root, names resolve relative to it and may not be absolute or
/// contain `..`.
#[derive(Clone, Debug, Default)]
pub struct FsOpener {
    root: Option<PathBuf>,
}

impl FsOpener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    fn resolve(&self, name: &str) -> Result<PathBuf, IncludeError> {
        let path = Path::new(name);
        let Some(root) = &self.root else {
            return Ok(path.to_path_buf());
        };
        let escapes = path
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(IncludeError::OutsideRoot(name.to_string()));
        }
        Ok(root.join(path))
    }
}

impl ResourceOpener for FsOpener {
    fn open(&self, name: &str) -> Result<Box<dyn Read>, IncludeError> {
        let path = self.resolve(name)?;
        match File::open(&path) {
            Ok(file) => Ok(Box::new(BufReader::new(file))),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Err(IncludeError::NotFound(name.to_string()))
            }
            Err(source) => Err(IncludeError::Io {
                name: name.to_string(),
                source,
            }),
        }
    }
}

/// Percent-escape an attribute value: bytes outside printable ASCII, and `"`.
fn push_attr_value(out: &mut String, value: &str) {
    for &b in value.as_bytes() {
        if (0x20..=0x7e).contains(&b) && b != b'"' {
            out.push(b as char);
        } else {
            let _ = write!(out, "%{b:02x}");
        }
    }
}

fn starts_like_word(tag: &str) -> bool {
    tag.chars()
        .next()
        .is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '!')
}

struct Renderer<'a, W: Write + ?Sized> {
    config: &'a RenderConfig,
    opener: &'a dyn ResourceOpener,
    out: &'a mut W,
    started: bool,
    /// Last output was a complete element rather than text or an open tag.
    after_element: bool,
}

impl<W: Write + ?Sized> Renderer<'_, W> {
    fn put(&mut self, s: &str) -> io::Result<()> {
        if !s.is_empty() {
            self.started = true;
        }
        self.out.write_all(s.as_bytes())
    }

    fn line_break(&mut self, indent: Option<usize>) -> io::Result<()> {
        match indent {
            Some(level) if self.started => {
                let mut s = String::with_capacity(1 + level * INDENT_STEP.len());
                s.push('\n');
                for _ in 0..level {
                    s.push_str(INDENT_STEP);
                }
                self.put(&s)
            }
            _ => Ok(()),
        }
    }

    fn name<'n>(&self, name: &'n str) -> Cow<'n, str> {
        if self.config.xhtml {
            Cow::Owned(name.to_ascii_lowercase())
        } else if name.bytes().any(|b| b.is_ascii_lowercase()) {
            Cow::Owned(canonical_tag(name))
        } else {
            Cow::Borrowed(name)
        }
    }

    fn open_tag(&mut self, tag: &str, attrs: &Attributes, singular: bool) -> io::Result<()> {
        let mut s = String::with_capacity(tag.len() + 2);
        s.push('<');
        s.push_str(&self.name(tag));
        for (key, value) in attrs {
            let key = if self.config.xhtml {
                key.to_ascii_lowercase()
            } else {
                key.to_ascii_uppercase()
            };
            s.push(' ');
            s.push_str(&key);
            match value {
                Some(value) => {
                    s.push_str("=\"");
                    push_attr_value(&mut s, value);
                    s.push('"');
                }
                None if self.config.xhtml => {
                    s.push_str("=\"");
                    s.push_str(&key);
                    s.push('"');
                }
                None => {}
            }
        }
        s.push_str(if singular && self.config.xhtml {
            " />"
        } else {
            ">"
        });
        self.put(&s)
    }

    fn close_tag(&mut self, tag: &str) -> io::Result<()> {
        let s = format!("</{}>", self.name(tag));
        self.put(&s)
    }

    fn node(&mut self, node: &Node, indent: Option<usize>, raw: bool) -> io::Result<()> {
        match node {
            Node::Text(text) => self.text(text, raw),
            Node::Element(el) => self.element(el, indent),
            Node::Comment(text) => self.comment(text, indent),
            Node::Doctype(text) => {
                self.line_break(indent)?;
                if text.is_empty() {
                    self.put("<!DOCTYPE>")?;
                } else {
                    self.put(&format!("<!DOCTYPE {text}>"))?;
                }
                self.after_element = true;
                Ok(())
            }
            Node::EndTag(tag) => {
                self.close_tag(tag)?;
                self.after_element = true;
                Ok(())
            }
        }
    }

    fn text(&mut self, text: &str, raw: bool) -> io::Result<()> {
        self.after_element = false;
        if raw || is_entity_ref(text) {
            return self.put(text);
        }
        if !self.config.overstrike || !text.contains('\u{8}') {
            return self.put(&escape_text(text));
        }
        for (emphasis, run) in overstrike(text) {
            let tag = match emphasis {
                Emphasis::Plain => {
                    self.put(&escape_text(&run))?;
                    continue;
                }
                Emphasis::Bold => "B",
                Emphasis::Italic => "I",
            };
            self.open_tag(tag, &Attributes::new(), false)?;
            self.put(&escape_text(&run))?;
            self.close_tag(tag)?;
        }
        Ok(())
    }

    fn comment(&mut self, text: &str, indent: Option<usize>) -> io::Result<()> {
        let text = if text.contains("-->") {
            log::warn!(target: "html.render", "'-->' inside a comment, breaking it up");
            Cow::Owned(text.replace("-->", "- ->"))
        } else {
            Cow::Borrowed(text)
        };
        self.line_break(indent)?;
        self.put("<!--")?;
        self.put(&text)?;
        self.put("-->")?;
        self.after_element = true;
        Ok(())
    }

    fn element(&mut self, el: &Element, indent: Option<usize>) -> io::Result<()> {
        let tag = el.tag.as_str();
        if tag.is_empty() {
            for child in &el.children {
                self.node(child, indent, false)?;
            }
            return Ok(());
        }
        if let Some(name) = tag.strip_prefix('&') {
            self.after_element = false;
            self.put(tag)?;
            if !name.ends_with(';') {
                log::warn!(target: "html.render", "entity {tag} is missing its ';'");
                self.put(";")?;
            }
            return Ok(());
        }
        if tag == COMMENT_TAG {
            return self.comment(&flatten_text(&el.children), indent);
        }
        if !starts_like_word(tag) {
            self.after_element = false;
            return self.put(tag);
        }
        if tag.eq_ignore_ascii_case(INCLUDE_TAG) {
            return self.include(el, indent);
        }
        if let Some(level) = tags::heading_level(tag)
            && level > MAX_HEADING_LEVEL
        {
            return self.oversized_heading(el, indent);
        }

        self.line_break(indent)?;
        let singular = tags::is_singular(tag);
        self.open_tag(tag, &el.attrs, singular)?;
        self.after_element = false;

        let child_indent = if tags::suppresses_indent(tag) {
            None
        } else {
            indent.map(|level| level + 1)
        };
        if singular {
            if !el.children.is_empty() {
                log::warn!(
                    target: "html.render",
                    "content inside singular <{tag}> dropped"
                );
            }
            self.after_element = true;
            return Ok(());
        }
        let raw = tags::is_raw_text(tag);
        for child in &el.children {
            self.node(child, child_indent, raw)?;
        }
        if child_indent.is_some() && self.after_element {
            self.line_break(indent)?;
        }
        self.close_tag(tag)?;
        self.after_element = true;
        Ok(())
    }

    fn include(&mut self, el: &Element, indent: Option<usize>) -> io::Result<()> {
        let Some(src) = el.attr("SRC") else {
            log::warn!(target: "html.render", "INCLUDE without SRC, rendering its children");
            for child in &el.children {
                self.node(child, indent, false)?;
            }
            return Ok(());
        };
        // Buffered: a read failure still falls back to a link.
        let body = self.opener.open(src).and_then(|mut reader| {
            let mut body = Vec::new();
            reader
                .read_to_end(&mut body)
                .map(|_| body)
                .map_err(|source| IncludeError::Io {
                    name: src.to_string(),
                    source,
                })
        });
        match body {
            Ok(body) => {
                self.out.write_all(&body)?;
                self.started |= !body.is_empty();
                self.after_element = true;
                Ok(())
            }
            Err(err) => {
                log::warn!(target: "html.render", "{err}; linking to it instead");
                let mut anchor = Element::new("A");
                anchor.set_attr("HREF", Some(src));
                anchor.children = if el.children.is_empty() {
                    vec![Node::text(INCLUDE_FALLBACK_TEXT)]
                } else {
                    el.children.clone()
                };
                self.element(&anchor, indent)
            }
        }
    }

    fn oversized_heading(&mut self, el: &Element, indent: Option<usize>) -> io::Result<()> {
        log::warn!(
            target: "html.render",
            "no heading level {}, rendering as a bold paragraph",
            el.tag
        );
        let none = Attributes::new();
        self.line_break(indent)?;
        self.open_tag("P", &none, false)?;
        self.open_tag("B", &none, false)?;
        for child in &el.children {
            self.node(child, None, false)?;
        }
        self.close_tag("B")?;
        self.open_tag("BR", &none, true)?;
        self.after_element = true;
        Ok(())
    }
}

/// Render canonical nodes; `INCLUDE` tokens render as links.
pub fn render<W: Write + ?Sized>(
    config: &RenderConfig,
    out: &mut W,
    nodes: &[Node],
) -> io::Result<()> {
    render_with(config, &NoIncludes, out, nodes)
}

/// Render canonical nodes, opening `INCLUDE` resources through `opener`.
///
/// Included bytes are copied verbatim and never re-parsed.
pub fn render_with<W: Write + ?Sized>(
    config: &RenderConfig,
    opener: &dyn ResourceOpener,
    out: &mut W,
    nodes: &[Node],
) -> io::Result<()> {
    let mut renderer = Renderer {
        config,
        opener,
        out,
        started: false,
        after_element: false,
    };
    let indent = config.indent.then_some(0);
    for node in nodes {
        renderer.node(node, indent, false)?;
    }
    Ok(())
}

/// Normalize shorthand tokens, then render them.
pub fn render_toks<W: Write + ?Sized>(
    config: &RenderConfig,
    opener: &dyn ResourceOpener,
    out: &mut W,
    toks: &[Tok],
) -> io::Result<()> {
    render_with(config, opener, out, &normalize(toks))
}

pub fn render_to_string(config: &RenderConfig, nodes: &[Node]) -> String {
    let mut buf = Vec::new();
    // Writes into a Vec cannot fail and NoIncludes never reads anything.
    let _ = render(config, &mut buf, nodes);
    String::from_utf8_lossy(&buf).into_owned()
}
