use crate::entities::decode_entities;
use crate::tags;
use crate::types::Node;
use std::borrow::Cow;

/// Escape the three markup metacharacters in text content.
pub fn escape_text(s: &str) -> Cow<'_, str> {
    if !s.bytes().any(|b| matches!(b, b'&' | b'<' | b'>')) {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len() + 8);
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    Cow::Owned(out)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Emphasis {
    Plain,
    Bold,
    Italic,
}

const BACKSPACE: char = '\u{8}';

/// Resolve typewriter overstrikes into emphasis runs.
///
/// `c\bc` is bold `c`; `_\bc` and `c\b_` are italic `c`. Repeated strikes
/// (`c\bc\bc`) collapse into one, any other overstrike keeps the last
/// character, and a stray backspace is dropped. Adjacent characters with the
/// same emphasis are merged into one run.
pub fn overstrike(s: &str) -> Vec<(Emphasis, String)> {
    let chars: Vec<char> = s.chars().collect();
    let mut runs: Vec<(Emphasis, String)> = Vec::new();
    let mut push = |emphasis: Emphasis, ch: char| match runs.last_mut() {
        Some((last, text)) if *last == emphasis => text.push(ch),
        _ => runs.push((emphasis, ch.to_string())),
    };

    let mut i = 0;
    while i < chars.len() {
        let ch = chars[i];
        if ch == BACKSPACE {
            i += 1;
            continue;
        }
        if chars.get(i + 1) != Some(&BACKSPACE) || i + 2 >= chars.len() {
            push(Emphasis::Plain, ch);
            i += 1;
            continue;
        }
        let over = chars[i + 2];
        let (emphasis, shown) = if ch == over {
            (Emphasis::Bold, ch)
        } else if ch == '_' {
            (Emphasis::Italic, over)
        } else if over == '_' {
            (Emphasis::Italic, ch)
        } else {
            (Emphasis::Plain, over)
        };
        i += 3;
        while i + 1 < chars.len() && chars[i] == BACKSPACE && chars[i + 1] == over {
            i += 2;
        }
        push(emphasis, shown);
    }
    runs
}

/// Plain text of a token tree.
///
/// Entity references in text and entity pseudo-tags are decoded; raw-text
/// element bodies are kept verbatim. `BR` and `LI` start a new line, `P` a
/// blank line. Comments, declarations and stray close tags contribute
/// nothing.
pub fn flatten_text(nodes: &[Node]) -> String {
    fn walk(node: &Node, raw: bool, out: &mut String) {
        match node {
            Node::Text(text) if raw => out.push_str(text),
            Node::Text(text) => out.push_str(&decode_entities(text)),
            Node::Element(el) => {
                if let Some(name) = el.tag.strip_prefix('&') {
                    let name = name.strip_suffix(';').unwrap_or(name);
                    out.push_str(&decode_entities(&format!("&{name};")));
                    return;
                }
                match el.tag.as_str() {
                    "BR" | "LI" => out.push('\n'),
                    "P" => out.push_str("\n\n"),
                    _ => {}
                }
                let raw = raw || tags::is_raw_text(&el.tag);
                for child in &el.children {
                    walk(child, raw, out);
                }
            }
            Node::Comment(_) | Node::Doctype(_) | Node::EndTag(_) => {}
        }
    }

    let mut out = String::new();
    for node in nodes {
        walk(node, false, &mut out);
    }
    out
}
