/// One table whose second row relies on implicit closes.
pub const BLOCK_TEMPLATE: &str =
    "<table><tr><td class=box><span>hello</span><img src=x>&amp; more<tr><td>cell</table>";

pub fn make_blocks(blocks: usize) -> String {
    let mut html = String::with_capacity(BLOCK_TEMPLATE.len() * blocks);
    for _ in 0..blocks {
        html.push_str(BLOCK_TEMPLATE);
    }
    html
}

/// `depth` unclosed `<div>`s around a word, closed only by end of input.
pub fn make_nested(depth: usize) -> String {
    let mut html = String::with_capacity(depth * 5 + 4);
    for _ in 0..depth {
        html.push_str("<div>");
    }
    html.push_str("deep");
    html
}
