use crate::types::Node;

/// One line per node, indented two columns per level, at most `cap` lines.
///
/// Text is previewed (trimmed, newlines flattened, truncated); whitespace-only
/// text is skipped.
pub fn outline(nodes: &[Node], cap: usize) -> Vec<String> {
    struct IndentGuard<'a> {
        indent: &'a mut String,
        step: usize,
    }

    impl Drop for IndentGuard<'_> {
        fn drop(&mut self) {
            let new_len = self.indent.len() - self.step;
            self.indent.truncate(new_len);
        }
    }

    fn push_preview(out: &mut String, s: &str, max_chars: usize) {
        for (i, ch) in s.chars().enumerate() {
            if i == max_chars {
                out.push('…');
                break;
            }
            out.push(if ch == '\n' { ' ' } else { ch });
        }
    }

    const INDENT_STEP: &str = "  ";
    const PREVIEW_CHARS: usize = 40;

    fn walk(node: &Node, indent: &mut String, out: &mut Vec<String>, left: &mut usize) {
        if *left == 0 {
            return;
        }
        let mut line = String::with_capacity(indent.len() + 64);
        line.push_str(indent);
        match node {
            Node::Text(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    return;
                }
                line.push('"');
                push_preview(&mut line, trimmed, PREVIEW_CHARS);
                line.push('"');
            }
            Node::Comment(text) => {
                line.push_str("<!-- ");
                push_preview(&mut line, text.trim(), PREVIEW_CHARS);
                line.push_str(" -->");
            }
            Node::Doctype(text) => {
                line.push_str("<!DOCTYPE ");
                line.push_str(text);
                line.push('>');
            }
            Node::EndTag(tag) => {
                line.push_str("</");
                line.push_str(tag);
                line.push_str(">  /* stray */");
            }
            Node::Element(el) => {
                line.push('<');
                if el.tag.is_empty() {
                    line.push_str("#group");
                } else {
                    line.push_str(&el.tag);
                }
                for (key, value) in &el.attrs {
                    line.push(' ');
                    line.push_str(key);
                    if let Some(value) = value {
                        line.push_str("=\"");
                        push_preview(&mut line, value, PREVIEW_CHARS);
                        line.push('"');
                    }
                }
                line.push('>');
                *left -= 1;
                out.push(line);
                indent.push_str(INDENT_STEP);
                let guard = IndentGuard {
                    indent,
                    step: INDENT_STEP.len(),
                };
                for child in &el.children {
                    walk(child, guard.indent, out, left);
                }
                return;
            }
        }
        *left -= 1;
        out.push(line);
    }

    let mut out = Vec::new();
    let mut left = cap;
    let mut indent = String::new();
    for node in nodes {
        walk(node, &mut indent, &mut out, &mut left);
    }
    out
}
