/// Fixed character entity table: the HTML 2/3.2 Latin-1 set plus `apos`.
///
/// Sorted by name for binary search.
const ENTITIES: &[(&str, char)] = &[
    ("AElig", '\u{00C6}'),
    ("Aacute", '\u{00C1}'),
    ("Acirc", '\u{00C2}'),
    ("Agrave", '\u{00C0}'),
    ("Aring", '\u{00C5}'),
    ("Atilde", '\u{00C3}'),
    ("Auml", '\u{00C4}'),
    ("Ccedil", '\u{00C7}'),
    ("ETH", '\u{00D0}'),
    ("Eacute", '\u{00C9}'),
    ("Ecirc", '\u{00CA}'),
    ("Egrave", '\u{00C8}'),
    ("Euml", '\u{00CB}'),
    ("Iacute", '\u{00CD}'),
    ("Icirc", '\u{00CE}'),
    ("Igrave", '\u{00CC}'),
    ("Iuml", '\u{00CF}'),
    ("Ntilde", '\u{00D1}'),
    ("Oacute", '\u{00D3}'),
    ("Ocirc", '\u{00D4}'),
    ("Ograve", '\u{00D2}'),
    ("Oslash", '\u{00D8}'),
    ("Otilde", '\u{00D5}'),
    ("Ouml", '\u{00D6}'),
    ("THORN", '\u{00DE}'),
    ("Uacute", '\u{00DA}'),
    ("Ucirc", '\u{00DB}'),
    ("Ugrave", '\u{00D9}'),
    ("Uuml", '\u{00DC}'),
    ("Yacute", '\u{00DD}'),
    ("aacute", '\u{00E1}'),
    ("acirc", '\u{00E2}'),
    ("acute", '\u{00B4}'),
    ("aelig", '\u{00E6}'),
    ("agrave", '\u{00E0}'),
    ("amp", '&'),
    ("apos", '\''),
    ("aring", '\u{00E5}'),
    ("atilde", '\u{00E3}'),
    ("auml", '\u{00E4}'),
    ("brvbar", '\u{00A6}'),
    ("ccedil", '\u{00E7}'),
    ("cedil", '\u{00B8}'),
    ("cent", '\u{00A2}'),
    ("copy", '\u{00A9}'),
    ("curren", '\u{00A4}'),
    ("deg", '\u{00B0}'),
    ("divide", '\u{00F7}'),
    ("eacute", '\u{00E9}'),
    ("ecirc", '\u{00EA}'),
    ("egrave", '\u{00E8}'),
    ("eth", '\u{00F0}'),
    ("euml", '\u{00EB}'),
    ("frac12", '\u{00BD}'),
    ("frac14", '\u{00BC}'),
    ("frac34", '\u{00BE}'),
    ("gt", '>'),
    ("iacute", '\u{00ED}'),
    ("icirc", '\u{00EE}'),
    ("iexcl", '\u{00A1}'),
    ("igrave", '\u{00EC}'),
    ("iquest", '\u{00BF}'),
    ("iuml", '\u{00EF}'),
    ("laquo", '\u{00AB}'),
    ("lt", '<'),
    ("macr", '\u{00AF}'),
    ("micro", '\u{00B5}'),
    ("middot", '\u{00B7}'),
    ("nbsp", '\u{00A0}'),
    ("not", '\u{00AC}'),
    ("ntilde", '\u{00F1}'),
    ("oacute", '\u{00F3}'),
    ("ocirc", '\u{00F4}'),
    ("ograve", '\u{00F2}'),
    ("ordf", '\u{00AA}'),
    ("ordm", '\u{00BA}'),
    ("oslash", '\u{00F8}'),
    ("otilde", '\u{00F5}'),
    ("ouml", '\u{00F6}'),
    ("para", '\u{00B6}'),
    ("plusmn", '\u{00B1}'),
    ("pound", '\u{00A3}'),
    ("quot", '"'),
    ("raquo", '\u{00BB}'),
    ("reg", '\u{00AE}'),
    ("sect", '\u{00A7}'),
    ("shy", '\u{00AD}'),
    ("sup1", '\u{00B9}'),
    ("sup2", '\u{00B2}'),
    ("sup3", '\u{00B3}'),
    ("szlig", '\u{00DF}'),
    ("thorn", '\u{00FE}'),
    ("times", '\u{00D7}'),
    ("uacute", '\u{00FA}'),
    ("ucirc", '\u{00FB}'),
    ("ugrave", '\u{00F9}'),
    ("uml", '\u{00A8}'),
    ("uuml", '\u{00FC}'),
    ("yacute", '\u{00FD}'),
    ("yen", '\u{00A5}'),
    ("yuml", '\u{00FF}'),
];

const MAX_HEX_DIGITS: usize = 6; // 0x10FFFF
const MAX_DEC_DIGITS: usize = 7; // 1114111
const MAX_NAME_LEN: usize = 32;

/// Character for a named entity (case-sensitive), if it is in the table.
pub fn lookup_entity(name: &str) -> Option<char> {
    ENTITIES
        .binary_search_by(|(n, _)| (*n).cmp(name))
        .ok()
        .map(|i| ENTITIES[i].1)
}

/// Length in bytes of the well-formed entity reference starting at `start`.
///
/// Accepted shapes are `&name;`, `&#123;` and `&#x7B;`, always terminated by
/// `;`. Digit runs and names are bounded so adversarial input stays linear.
pub fn entity_ref_len(bytes: &[u8], start: usize) -> Option<usize> {
    if bytes.get(start) != Some(&b'&') {
        return None;
    }
    let mut j = start + 1;
    fn is_hex(b: u8) -> bool {
        b.is_ascii_hexdigit()
    }
    fn is_dec(b: u8) -> bool {
        b.is_ascii_digit()
    }
    fn is_name(b: u8) -> bool {
        b.is_ascii_alphanumeric() || b == b'_'
    }

    let (max, accept): (usize, fn(u8) -> bool) = match bytes.get(j) {
        Some(b'#') => {
            j += 1;
            if matches!(bytes.get(j), Some(b'x' | b'X')) {
                j += 1;
                (MAX_HEX_DIGITS, is_hex)
            } else {
                (MAX_DEC_DIGITS, is_dec)
            }
        }
        Some(b) if b.is_ascii_alphanumeric() => (MAX_NAME_LEN, is_name),
        _ => return None,
    };
    let body_start = j;
    while j < bytes.len() && j - body_start < max && accept(bytes[j]) {
        j += 1;
    }
    if j == body_start || bytes.get(j) != Some(&b';') {
        return None;
    }
    Some(j + 1 - start)
}

/// True when the whole of `s` is a single entity reference.
pub fn is_entity_ref(s: &str) -> bool {
    entity_ref_len(s.as_bytes(), 0) == Some(s.len())
}

/// Decode one complete reference such as `&amp;` or `&#215;`.
fn decode_ref(reference: &str) -> Option<char> {
    let body = reference.strip_prefix('&')?.strip_suffix(';')?;
    if let Some(num) = body.strip_prefix('#') {
        let value = match num.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse::<u32>().ok()?,
        };
        return char::from_u32(value);
    }
    lookup_entity(body)
}

/// Decode named and numeric entity references.
///
/// - Named references decode through the fixed table; unknown names are left
///   unchanged.
/// - Numeric references decode only when semicolon-terminated and a valid
///   Unicode scalar value.
/// - Missing semicolons and malformed references pass through unchanged.
pub fn decode_entities(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = String::with_capacity(s.len());
    let mut copy_start = 0;
    let mut i = 0;

    while let Some(rel) = memchr::memchr(b'&', &bytes[i..]) {
        let amp = i + rel;
        let Some(len) = entity_ref_len(bytes, amp) else {
            i = amp + 1;
            continue;
        };
        let reference = &s[amp..amp + len];
        if let Some(ch) = decode_ref(reference) {
            out.push_str(&s[copy_start..amp]);
            out.push(ch);
            copy_start = amp + len;
        }
        i = amp + len;
    }
    out.push_str(&s[copy_start..]);
    out
}
