//! Primitive markup tokenizer with a constrained, practical tag-name character set.
//!
//! Supported tag-name characters (ASCII only): `[A-Za-z0-9:_-]`.
//! Attribute names use the same ASCII character class.
//!
//! The tokenizer is lazy: the tree builder pulls one token at a time and may
//! push tokens back or switch into raw-text scanning after a `<script>` start
//! tag, so raw bodies are never split on markup characters.
//!
//! Known limitations (intentional):
//! - Not an HTML5 tokenizer state machine; there is no parse-error reporting.
//! - Raw-text close-tag scanning accepts only ASCII whitespace before `>`.
//! - Entity references are split out as their own text tokens (verbatim) unless
//!   [`TokenizerConfig::decode_entities`] is set.
use crate::entities::{decode_entities, entity_ref_len};
use crate::tags;
use crate::types::Token;
use memchr::{memchr, memchr2};

const HTML_COMMENT_START: &str = "<!--";
const HTML_COMMENT_END: &str = "-->";

/// Result of a raw-text scan.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawText {
    pub body: String,
    /// False when input ended before the close tag.
    pub terminated: bool,
}

/// A pull source of primitive tokens, consumed by [`TreeBuilder`](crate::TreeBuilder).
pub trait TokenSource {
    /// Next primitive token; pushed-back tokens come first (LIFO).
    fn next_token(&mut self) -> Option<Token>;

    /// Return `token` so the next [`next_token`](Self::next_token) yields it again.
    fn push_back(&mut self, token: Token);

    /// Consume uninterpreted text up to and including the close tag for `tag`.
    fn scan_raw_text(&mut self, tag: &str) -> RawText;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct TokenizerConfig {
    /// Decode entity references in text and attribute values instead of
    /// emitting them as separate verbatim text tokens.
    pub decode_entities: bool,
}

fn starts_with_ignore_ascii_case_at(haystack: &[u8], start: usize, needle: &[u8]) -> bool {
    haystack.len() >= start + needle.len()
        && haystack[start..start + needle.len()].eq_ignore_ascii_case(needle)
}

fn is_name_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'-' || c == b'_' || c == b':'
}

/// Find `</tag` followed by optional ASCII whitespace and `>`.
///
/// Returns the byte range of the close tag within `haystack`.
fn find_raw_text_close_tag(haystack: &str, tag: &str) -> Option<(usize, usize)> {
    let hay = haystack.as_bytes();
    let len = hay.len();
    let name = tag.as_bytes();
    let n = name.len() + 2;
    let mut i = 0;
    while i + n <= len {
        // `<` cannot appear in UTF-8 continuation bytes
        let rel = memchr(b'<', &hay[i..])?;
        i += rel;
        if i + n > len {
            return None;
        }
        if hay[i + 1] == b'/' && starts_with_ignore_ascii_case_at(hay, i + 2, name) {
            let mut k = i + n;
            while k < len && hay[k].is_ascii_whitespace() {
                k += 1;
            }
            if k < len && hay[k] == b'>' {
                return Some((i, k + 1));
            }
        }
        i += 1;
    }
    None
}

/// Lazy tokenizer over a borrowed input string.
pub struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
    pending: Vec<Token>,
    config: TokenizerConfig,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self::with_config(input, TokenizerConfig::default())
    }

    pub fn with_config(input: &'a str, config: TokenizerConfig) -> Self {
        Self {
            input,
            pos: 0,
            pending: Vec::new(),
            config,
        }
    }

    pub fn is_at_end(&self) -> bool {
        self.pending.is_empty() && self.pos >= self.input.len()
    }

    fn lex(&mut self) -> Option<Token> {
        let input = self.input;
        let bytes = input.as_bytes();
        let i = self.pos;
        if i >= bytes.len() {
            return None;
        }
        // Invariant: slice endpoints are cut only at ASCII structural bytes, so
        // they remain UTF-8 boundaries.
        if bytes[i] != b'<' || !self.starts_markup(i) {
            return Some(self.lex_text(i));
        }
        if input[i..].starts_with(HTML_COMMENT_START) {
            let body_start = i + HTML_COMMENT_START.len();
            return Some(match input[body_start..].find(HTML_COMMENT_END) {
                Some(end) => {
                    self.pos = body_start + end + HTML_COMMENT_END.len();
                    Token::Comment(input[body_start..body_start + end].to_string())
                }
                None => {
                    self.pos = bytes.len();
                    Token::Comment(input[body_start..].to_string())
                }
            });
        }
        if bytes[i + 1] == b'!' {
            // <!DOCTYPE ...> and other declarations
            let rest = &input[i + 2..];
            let end = rest.find('>').unwrap_or(rest.len());
            self.pos = (i + 2 + end + 1).min(bytes.len());
            let decl = rest[..end].trim();
            if starts_with_ignore_ascii_case_at(decl.as_bytes(), 0, b"doctype") {
                return Some(Token::Doctype(decl["doctype".len()..].trim().to_string()));
            }
            return Some(Token::Comment(decl.to_string()));
        }
        if bytes[i + 1] == b'/' {
            let start = i + 2;
            let mut j = start;
            while j < bytes.len() && is_name_char(bytes[j]) {
                j += 1;
            }
            let name = input[start..j].to_string();
            j = memchr(b'>', &bytes[j..]).map_or(bytes.len(), |rel| j + rel + 1);
            self.pos = j;
            return Some(Token::EndTag(name));
        }
        Some(self.lex_start_tag(i))
    }

    /// `<` starts markup only when followed by a letter, `/letter` or `!`.
    fn starts_markup(&self, i: usize) -> bool {
        let bytes = self.input.as_bytes();
        match bytes.get(i + 1) {
            Some(b'/') => bytes.get(i + 2).is_some_and(u8::is_ascii_alphabetic),
            Some(b'!') => true,
            Some(&b) => b.is_ascii_alphabetic(),
            None => false,
        }
    }

    fn lex_text(&mut self, start: usize) -> Token {
        let input = self.input;
        let bytes = input.as_bytes();
        if !self.config.decode_entities {
            if let Some(len) = entity_ref_len(bytes, start) {
                self.pos = start + len;
                return Token::Text(input[start..start + len].to_string());
            }
        }
        // The first byte is always text (either not `<`, or a `<` that does not
        // start markup), so scanning resumes after it.
        let mut j = start + 1;
        loop {
            let next = if self.config.decode_entities {
                memchr(b'<', &bytes[j..])
            } else {
                memchr2(b'<', b'&', &bytes[j..])
            };
            let Some(rel) = next else {
                j = bytes.len();
                break;
            };
            j += rel;
            let boundary = match bytes[j] {
                b'<' => self.starts_markup(j),
                _ => entity_ref_len(bytes, j).is_some(),
            };
            if boundary {
                break;
            }
            j += 1;
        }
        self.pos = j;
        let text = &input[start..j];
        if self.config.decode_entities {
            Token::Text(decode_entities(text))
        } else {
            Token::Text(text.to_string())
        }
    }

    fn lex_start_tag(&mut self, i: usize) -> Token {
        let input = self.input;
        let bytes = input.as_bytes();
        let len = bytes.len();
        let start = i + 1;
        let mut k = start;
        while k < len && is_name_char(bytes[k]) {
            k += 1;
        }
        let name = input[start..k].to_string();
        let mut attributes: Vec<(String, Option<String>)> = Vec::new();
        let mut self_closing = false;

        let skip_whitespace = |k: &mut usize| {
            while *k < len && bytes[*k].is_ascii_whitespace() {
                *k += 1;
            }
        };

        loop {
            skip_whitespace(&mut k);
            if k >= len {
                break;
            }
            if bytes[k] == b'>' {
                k += 1;
                break;
            }
            if bytes[k] == b'/' {
                if k + 1 < len && bytes[k + 1] == b'>' {
                    self_closing = true;
                    k += 2;
                    break;
                }
                k += 1;
                continue;
            }
            let name_start = k;
            while k < len && is_name_char(bytes[k]) {
                k += 1;
            }
            if name_start == k {
                // Skip one whole char so the cursor stays on a UTF-8 boundary.
                k += input[k..].chars().next().map_or(1, char::len_utf8);
                continue;
            }
            let attribute_name = input[name_start..k].to_string();

            skip_whitespace(&mut k);
            let value = if k < len && bytes[k] == b'=' {
                k += 1;
                skip_whitespace(&mut k);
                let raw = if k < len && (bytes[k] == b'"' || bytes[k] == b'\'') {
                    let quote = bytes[k];
                    k += 1;
                    let vstart = k;
                    k = memchr(quote, &bytes[k..]).map_or(len, |rel| k + rel);
                    let raw = &input[vstart..k];
                    if k < len {
                        k += 1;
                    }
                    raw
                } else {
                    let vstart = k;
                    while k < len && !bytes[k].is_ascii_whitespace() && bytes[k] != b'>' {
                        if bytes[k] == b'/' && k + 1 < len && bytes[k + 1] == b'>' {
                            break;
                        }
                        k += 1;
                    }
                    &input[vstart..k]
                };
                Some(if self.config.decode_entities {
                    decode_entities(raw)
                } else {
                    raw.to_string()
                })
            } else {
                None
            };
            attributes.push((attribute_name, value));
        }

        if tags::is_singular(&name) {
            self_closing = true;
        }
        self.pos = k;
        Token::StartTag {
            name,
            attributes,
            self_closing,
        }
    }
}

impl TokenSource for Tokenizer<'_> {
    fn next_token(&mut self) -> Option<Token> {
        if let Some(token) = self.pending.pop() {
            return Some(token);
        }
        let token = self.lex();
        if let Some(token) = &token {
            log::trace!(target: "html.tokenizer", "emit token: {token:?}");
        }
        token
    }

    fn push_back(&mut self, token: Token) {
        self.pending.push(token);
    }

    fn scan_raw_text(&mut self, tag: &str) -> RawText {
        // Anything pushed back sits logically before the cursor.
        let mut body = String::new();
        while let Some(token) = self.pending.pop() {
            match token {
                Token::EndTag(name) if name.eq_ignore_ascii_case(tag) => {
                    return RawText {
                        body,
                        terminated: true,
                    };
                }
                Token::Text(text) => body.push_str(&text),
                other => {
                    self.pending.push(other);
                    break;
                }
            }
        }
        let rest = &self.input[self.pos..];
        match find_raw_text_close_tag(rest, tag) {
            Some((start, end)) => {
                body.push_str(&rest[..start]);
                self.pos += end;
                RawText {
                    body,
                    terminated: true,
                }
            }
            None => {
                body.push_str(rest);
                self.pos = self.input.len();
                RawText {
                    body,
                    terminated: false,
                }
            }
        }
    }
}

/// Pre-tokenized token sequence usable as a [`TokenSource`].
#[derive(Clone, Debug, Default)]
pub struct TokenStream {
    tokens: Vec<Token>,
    pos: usize,
    pending: Vec<Token>,
}

impl TokenStream {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            pending: Vec::new(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.pending.len() + self.tokens.len() - self.pos
    }
}

impl TokenSource for TokenStream {
    fn next_token(&mut self) -> Option<Token> {
        if let Some(token) = self.pending.pop() {
            return Some(token);
        }
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn push_back(&mut self, token: Token) {
        self.pending.push(token);
    }

    fn scan_raw_text(&mut self, tag: &str) -> RawText {
        let mut body = String::new();
        while let Some(token) = self.next_token() {
            match token {
                Token::EndTag(name) if name.eq_ignore_ascii_case(tag) => {
                    return RawText {
                        body,
                        terminated: true,
                    };
                }
                Token::Text(text) | Token::Comment(text) => body.push_str(&text),
                Token::Doctype(_) | Token::StartTag { .. } | Token::EndTag(_) => {}
            }
        }
        RawText {
            body,
            terminated: false,
        }
    }
}

/// Tokenize the whole input, scanning raw text after `<script>`/`<style>`.
pub fn tokenize(input: &str) -> Vec<Token> {
    tokenize_with(input, TokenizerConfig::default())
}

pub fn tokenize_with(input: &str, config: TokenizerConfig) -> Vec<Token> {
    let mut tokenizer = Tokenizer::with_config(input, config);
    let mut out = Vec::new();
    while let Some(token) = tokenizer.next_token() {
        let raw_tag = match &token {
            Token::StartTag {
                name, self_closing, ..
            } if !*self_closing && tags::is_raw_text(name) => Some(name.clone()),
            _ => None,
        };
        out.push(token);
        if let Some(tag) = raw_tag {
            let raw = tokenizer.scan_raw_text(&tag);
            if !raw.body.is_empty() {
                out.push(Token::Text(raw.body));
            }
            out.push(Token::EndTag(tag));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start_names(tokens: &[Token]) -> Vec<&str> {
        tokens
            .iter()
            .filter_map(|t| match t {
                Token::StartTag { name, .. } => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn tokenize_preserves_utf8_text_nodes() {
        let tokens = tokenize("<p>120×32</p>");
        assert!(
            tokens.iter().any(|t| matches!(t, Token::Text(s) if s == "120×32")),
            "expected UTF-8 text token, got: {tokens:?}"
        );
    }

    #[test]
    fn tokenize_handles_mixed_case_doctype() {
        let tokens = tokenize("<!DoCtYpE html>");
        assert_eq!(tokens, vec![Token::Doctype("html".to_string())]);
    }

    #[test]
    fn tokenize_splits_entity_references() {
        let tokens = tokenize("a &amp; b &c");
        assert_eq!(
            tokens,
            vec![Token::text("a "), Token::text("&amp;"), Token::text(" b &c")]
        );
    }

    #[test]
    fn tokenize_decodes_entities_when_configured() {
        let config = TokenizerConfig {
            decode_entities: true,
        };
        let tokens = tokenize_with("a &amp; b <a title=\"&lt;x&gt;\">", config);
        assert_eq!(tokens[0], Token::text("a & b "));
        assert!(matches!(
            &tokens[1],
            Token::StartTag { attributes, .. }
                if attributes == &vec![("title".to_string(), Some("<x>".to_string()))]
        ));
    }

    #[test]
    fn lone_angle_bracket_is_text() {
        let tokens = tokenize("a < b <3 <");
        assert_eq!(tokens, vec![Token::text("a < b <3 <")]);
    }

    #[test]
    fn tokenize_finds_script_end_tag_case_insensitive() {
        let tokens = tokenize("<script>if (a<b) x();</ScRiPt >after");
        assert!(
            matches!(
                tokens.as_slice(),
                [
                    Token::StartTag { name, .. },
                    Token::Text(body),
                    Token::EndTag(end),
                    Token::Text(after),
                ] if name == "script" && body == "if (a<b) x();" && end == "script" && after == "after"
            ),
            "expected raw script text and matching end tag, got: {tokens:?}"
        );
    }

    #[test]
    fn raw_text_close_tag_does_not_accept_near_matches() {
        let tokens = tokenize("<script>ok</scriptx >no</script >");
        assert!(
            matches!(
                tokens.as_slice(),
                [Token::StartTag { .. }, Token::Text(body), Token::EndTag(_)]
                    if body == "ok</scriptx >no"
            ),
            "expected near-match not to close raw text, got: {tokens:?}"
        );
    }

    #[test]
    fn tokenize_handles_raw_text_without_close_tag() {
        let mut body = String::new();
        for _ in 0..10_000 {
            body.push_str("x<y>\n");
        }
        let input = format!("<script>{body}");
        let tokens = tokenize(&input);
        assert!(matches!(
            tokens.as_slice(),
            [Token::StartTag { .. }, Token::Text(text), Token::EndTag(_)] if *text == body
        ));
    }

    #[test]
    fn attributes_quoted_unquoted_and_bare() {
        let tokens = tokenize("<input type=checkbox checked value='a b' name=\"n\">");
        assert_eq!(
            tokens,
            vec![Token::StartTag {
                name: "input".to_string(),
                attributes: vec![
                    ("type".to_string(), Some("checkbox".to_string())),
                    ("checked".to_string(), None),
                    ("value".to_string(), Some("a b".to_string())),
                    ("name".to_string(), Some("n".to_string())),
                ],
                self_closing: true,
            }]
        );
    }

    #[test]
    fn tokenize_handles_non_ascii_attribute_values() {
        let tokens = tokenize("<p data=naïve é=1>ok</p>");
        assert!(matches!(
            &tokens[0],
            Token::StartTag { attributes, .. }
                if attributes.iter().any(|(k, v)| k == "data" && v.as_deref() == Some("naïve"))
        ));
    }

    #[test]
    fn comments_terminated_and_unterminated() {
        let tokens = tokenize("<!-- one --><b>x</b><!-- two");
        assert_eq!(tokens[0], Token::Comment(" one ".to_string()));
        assert_eq!(tokens.last(), Some(&Token::Comment(" two".to_string())));
    }

    #[test]
    fn end_tag_skips_to_gt() {
        let tokens = tokenize("</b junk>x");
        assert_eq!(tokens, vec![Token::end("b"), Token::text("x")]);
    }

    #[test]
    fn push_back_is_lifo_before_input() {
        let mut tokenizer = Tokenizer::new("<i>x");
        let first = tokenizer.next_token().expect("start tag");
        tokenizer.push_back(first.clone());
        assert_eq!(tokenizer.next_token(), Some(first));
        assert_eq!(tokenizer.next_token(), Some(Token::text("x")));
        assert_eq!(tokenizer.next_token(), None);
        assert!(tokenizer.is_at_end());
    }

    #[test]
    fn token_stream_raw_scan_collects_text_until_end_tag() {
        let mut stream = TokenStream::new(vec![
            Token::text("a<"),
            Token::text("b"),
            Token::end("SCRIPT"),
            Token::text("after"),
        ]);
        let raw = stream.scan_raw_text("script");
        assert_eq!(raw.body, "a<b");
        assert!(raw.terminated);
        assert_eq!(stream.remaining(), 1);
    }

    #[test]
    fn tokenize_allows_custom_element_and_namespaced_tags() {
        let tokens = tokenize("<my-component></my-component><svg:rect></svg:rect>");
        assert_eq!(start_names(&tokens), vec!["my-component", "svg:rect"]);
    }

    #[test]
    fn tokenize_handles_tons_of_angle_brackets() {
        let input = "<".repeat(200_000);
        let tokens = tokenize(&input);
        assert!(tokens.len() <= input.len());
    }

    #[test]
    fn tokenize_handles_many_simple_tags_linearly() {
        let input = "<a></a>".repeat(20_000);
        assert_eq!(tokenize(&input).len(), 40_000);
    }
}
