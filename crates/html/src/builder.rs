//! Tolerant tree builder: primitive tokens in, one complete top-level node out
//! per call.
//!
//! Nesting is tracked with an explicit frame stack rather than recursion, so
//! pathological nesting depth cannot overflow the call stack. Each frame
//! remembers whether its tag was already active when it was opened; the
//! active set is restored from that when the frame closes.
use crate::tags::{self, canonical_tag};
use crate::tokenizer::{TokenSource, Tokenizer};
use crate::types::{Attributes, Element, Node, Token};
use std::collections::HashSet;

#[derive(Clone, Debug, Default)]
pub struct TreeBuilderConfig {
    /// Close tags that terminate whichever element is being built; used by
    /// [`TreeBuilder::build_all`].
    pub close_set: Vec<String>,
}

#[derive(Debug)]
struct Frame {
    element: Element,
    was_active: bool,
}

impl Frame {
    fn close(self, active: &mut HashSet<String>) -> Node {
        if !self.was_active {
            let _ = active.remove(&self.element.tag);
        }
        Node::Element(self.element)
    }
}

/// Whether an incoming `next` start tag forces the element `top` to close.
///
/// Only tags with known containers can force a close, and only while one of
/// those containers is open somewhere below `top`.
fn must_close(top: &str, next: &str, active: &HashSet<String>) -> bool {
    let Some(parents) = tags::parent_tags(next) else {
        return false;
    };
    if parents.contains(top) {
        return false;
    }
    parents.iter().any(|parent| active.contains(*parent))
}

fn element_from(tag: String, attributes: Vec<(String, Option<String>)>) -> Element {
    let mut attrs = Attributes::new();
    for (name, value) in attributes {
        // first occurrence wins
        let _ = attrs.entry(name.to_ascii_uppercase()).or_insert(value);
    }
    Element {
        tag,
        attrs,
        children: Vec::new(),
    }
}

pub struct TreeBuilder<S> {
    source: S,
    config: TreeBuilderConfig,
}

impl<S: TokenSource> TreeBuilder<S> {
    pub fn new(source: S) -> Self {
        Self::with_config(source, TreeBuilderConfig::default())
    }

    pub fn with_config(source: S, config: TreeBuilderConfig) -> Self {
        Self { source, config }
    }

    pub fn into_source(self) -> S {
        self.source
    }

    /// Build the next complete top-level node, or `None` at end of input.
    ///
    /// `close_set` names close tags that terminate the element being built
    /// (at any depth) without being consumed; the close tag is then returned
    /// by a later call as a stray [`Node::EndTag`]. `hook` sees every
    /// completed node, leaf or element, before it is attached to its parent
    /// or returned, and its result replaces the node.
    pub fn next_token<H>(&mut self, close_set: &[&str], mut hook: H) -> Option<Node>
    where
        H: FnMut(Node) -> Node,
    {
        let mut active: HashSet<String> = HashSet::new();
        let mut frames: Vec<Frame> = Vec::new();

        loop {
            let token = match self.source.next_token() {
                Some(token) => token,
                None => {
                    let top = frames.last()?;
                    log::debug!(
                        target: "html.builder",
                        "end of input inside <{}>, closing implicitly",
                        top.element.tag
                    );
                    Token::EndTag(top.element.tag.clone())
                }
            };

            let completed = match token {
                Token::Text(text) => Node::Text(text),
                Token::Comment(text) => Node::Comment(text),
                Token::Doctype(text) => Node::Doctype(text),
                Token::EndTag(name) => {
                    let tag = canonical_tag(&name);
                    match frames.pop() {
                        Some(frame) if frame.element.tag == tag => frame.close(&mut active),
                        Some(frame)
                            if active.contains(&tag)
                                || close_set.iter().any(|c| c.eq_ignore_ascii_case(&tag)) =>
                        {
                            log::debug!(
                                target: "html.builder",
                                "</{tag}> closes <{}> implicitly",
                                frame.element.tag
                            );
                            self.source.push_back(Token::EndTag(name));
                            frame.close(&mut active)
                        }
                        Some(frame) => {
                            frames.push(frame);
                            Node::EndTag(tag)
                        }
                        None => Node::EndTag(tag),
                    }
                }
                Token::StartTag {
                    name,
                    attributes,
                    self_closing,
                } => {
                    let tag = canonical_tag(&name);
                    let leaf = self_closing || tags::is_singular(&tag);
                    let raw = !leaf && tags::is_raw_text(&tag);

                    if !leaf
                        && !raw
                        && let Some(top) = frames.last()
                        && must_close(&top.element.tag, &tag, &active)
                    {
                        log::debug!(
                            target: "html.builder",
                            "<{tag}> closes <{}> implicitly",
                            top.element.tag
                        );
                        self.source.push_back(Token::StartTag {
                            name,
                            attributes,
                            self_closing,
                        });
                        match frames.pop() {
                            Some(frame) => frame.close(&mut active),
                            None => continue,
                        }
                    } else {
                        let mut element = element_from(tag, attributes);
                        if raw {
                            let body = self.source.scan_raw_text(&name);
                            if !body.terminated {
                                log::debug!(
                                    target: "html.builder",
                                    "unterminated <{}> runs to end of input",
                                    element.tag
                                );
                            }
                            if !body.body.is_empty() {
                                element.children.push(Node::Text(body.body));
                            }
                        } else if !leaf {
                            let was_active = !active.insert(element.tag.clone());
                            frames.push(Frame {
                                element,
                                was_active,
                            });
                            continue;
                        }
                        Node::Element(element)
                    }
                }
            };

            let node = hook(completed);
            match frames.last_mut() {
                Some(parent) => parent.element.children.push(node),
                None => return Some(node),
            }
        }
    }

    /// Drain the source, using the configured close set and `hook`.
    pub fn build_all<H>(&mut self, mut hook: H) -> Vec<Node>
    where
        H: FnMut(Node) -> Node,
    {
        let close_set = self.config.close_set.clone();
        let close_set: Vec<&str> = close_set.iter().map(String::as_str).collect();
        let mut out = Vec::new();
        while let Some(node) = self.next_token(&close_set, &mut hook) {
            out.push(node);
        }
        out
    }
}

/// Tokenize and build a whole document.
pub fn parse(input: &str) -> Vec<Node> {
    TreeBuilder::new(Tokenizer::new(input)).build_all(std::convert::identity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::TokenStream;
    use std::convert::identity;

    fn el(tag: &str, children: Vec<Node>) -> Node {
        let mut element = Element::new(tag);
        element.children = children;
        Node::Element(element)
    }

    fn txt(s: &str) -> Node {
        Node::text(s)
    }

    #[test]
    fn must_close_consults_parent_lookup() {
        let mut active = HashSet::new();
        let _ = active.insert("TABLE".to_string());
        let _ = active.insert("TR".to_string());
        let _ = active.insert("TD".to_string());
        assert!(must_close("TD", "TR", &active));
        assert!(!must_close("TABLE", "TR", &active));
        assert!(!must_close("TD", "DIV", &active));
        // LI has containers, but none is open
        assert!(!must_close("TD", "LI", &active));
    }

    #[test]
    fn implicit_row_close_makes_sibling_rows() {
        let out = parse("<table><tr><td>A<tr><td>B</tr></table>");
        assert_eq!(
            out,
            vec![el(
                "TABLE",
                vec![
                    el("TR", vec![el("TD", vec![txt("A")])]),
                    el("TR", vec![el("TD", vec![txt("B")])]),
                ]
            )]
        );
    }

    #[test]
    fn eof_closes_everything_open() {
        let mut builder = TreeBuilder::new(Tokenizer::new("<table><tr><td>cell"));
        let first = builder.next_token(&[], identity);
        assert_eq!(
            first,
            Some(el(
                "TABLE",
                vec![el("TR", vec![el("TD", vec![txt("cell")])])]
            ))
        );
        assert_eq!(builder.next_token(&[], identity), None);
    }

    #[test]
    fn overlapping_tags_close_inner_then_leave_stray() {
        let out = parse("<b><i>text</b></i>");
        assert_eq!(
            out,
            vec![
                el("B", vec![el("I", vec![txt("text")])]),
                Node::EndTag("I".to_string()),
            ]
        );
    }

    #[test]
    fn stray_close_tag_becomes_child() {
        let out = parse("<div>a</span>b</div>");
        assert_eq!(
            out,
            vec![el(
                "DIV",
                vec![txt("a"), Node::EndTag("SPAN".to_string()), txt("b")]
            )]
        );
    }

    #[test]
    fn singular_and_self_closing_tags_are_leaves() {
        let out = parse("<p>a<br>b<img src=x.png>c<foo/>d</p>");
        let p = out[0].as_element().expect("P element");
        assert_eq!(p.children.len(), 7);
        assert!(p.children.iter().all(|c| c.children().is_empty()));
        assert_eq!(p.children[3].as_element().and_then(|e| e.attr("src")), Some("x.png"));
    }

    #[test]
    fn script_body_is_single_raw_child() {
        let out = parse("<script>if (a < b && c) { x('</p>'); }</script><p>after</p>");
        assert_eq!(
            out[0],
            el("SCRIPT", vec![txt("if (a < b && c) { x('</p>'); }")])
        );
        assert_eq!(out[1], el("P", vec![txt("after")]));
    }

    #[test]
    fn empty_script_has_no_children() {
        let out = parse("<script></script>");
        assert_eq!(out, vec![el("SCRIPT", vec![])]);
    }

    #[test]
    fn nested_same_tag_restores_active_state() {
        let out = parse("<ul><li>a<ul><li>b</ul><li>c</ul>");
        assert_eq!(
            out,
            vec![el(
                "UL",
                vec![
                    el(
                        "LI",
                        vec![txt("a"), el("UL", vec![el("LI", vec![txt("b")])])]
                    ),
                    el("LI", vec![txt("c")]),
                ]
            )]
        );
    }

    #[test]
    fn list_items_close_each_other() {
        let out = parse("<UL><LI>one<LI>two");
        assert_eq!(
            out,
            vec![el(
                "UL",
                vec![el("LI", vec![txt("one")]), el("LI", vec![txt("two")])]
            )]
        );
    }

    #[test]
    fn close_set_terminates_without_consuming() {
        let mut builder = TreeBuilder::new(Tokenizer::new("<div><p>x</form>y"));
        let first = builder.next_token(&["form"], identity);
        assert_eq!(first, Some(el("DIV", vec![el("P", vec![txt("x")])])));
        assert_eq!(
            builder.next_token(&["form"], identity),
            Some(Node::EndTag("FORM".to_string()))
        );
        assert_eq!(builder.next_token(&["form"], identity), Some(txt("y")));
    }

    #[test]
    fn build_all_uses_configured_close_set() {
        let config = TreeBuilderConfig {
            close_set: vec!["FORM".to_string()],
        };
        let mut builder = TreeBuilder::with_config(Tokenizer::new("<div>x</form>"), config);
        let out = builder.build_all(identity);
        assert_eq!(
            out,
            vec![el("DIV", vec![txt("x")]), Node::EndTag("FORM".to_string())]
        );
    }

    #[test]
    fn hook_sees_every_completed_node() {
        let mut seen = Vec::new();
        let mut builder = TreeBuilder::new(Tokenizer::new("<p>a<b>c</b></p>"));
        let out = builder.next_token(&[], |node| {
            seen.push(match &node {
                Node::Text(t) => t.clone(),
                other => other.tag().unwrap_or("?").to_string(),
            });
            node
        });
        assert!(out.is_some());
        assert_eq!(seen, vec!["a", "c", "B", "P"]);
    }

    #[test]
    fn hook_result_replaces_node() {
        let mut builder = TreeBuilder::new(Tokenizer::new("<a href=x>link</a>"));
        let out = builder.next_token(&[], |mut node| {
            if let Some(el) = node.as_element_mut()
                && el.is_named("a")
            {
                el.set_attr("href", Some("http://example.org/x"));
            }
            node
        });
        let a = out.as_ref().and_then(Node::as_element).expect("anchor");
        assert_eq!(a.attr("HREF"), Some("http://example.org/x"));
    }

    #[test]
    fn works_over_pre_tokenized_stream() {
        let stream = TokenStream::new(vec![
            Token::start("table"),
            Token::start("tr"),
            Token::start("td"),
            Token::text("A"),
            Token::start("tr"),
            Token::start("td"),
            Token::text("B"),
            Token::end("tr"),
            Token::end("table"),
        ]);
        let out = TreeBuilder::new(stream).build_all(identity);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].children().len(), 2);
        assert!(out[0].children().iter().all(|c| c.tag() == Some("TR")));
    }

    #[test]
    fn attribute_names_are_canonical_and_first_wins() {
        let out = parse("<a href=one HREF=two name>x</a>");
        let a = out[0].as_element().expect("anchor");
        assert_eq!(a.attrs.get("HREF"), Some(&Some("one".to_string())));
        assert_eq!(a.attrs.get("NAME"), Some(&None));
    }

    #[test]
    fn deep_nesting_does_not_overflow() {
        let depth = 2_000;
        let input = "<div>".repeat(depth);
        let out = parse(&input);
        assert_eq!(out.len(), 1);
        let mut node = &out[0];
        let mut seen = 1;
        while let Some(child) = node.children().first() {
            node = child;
            seen += 1;
        }
        assert_eq!(seen, depth);
    }
}
