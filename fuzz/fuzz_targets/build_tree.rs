#![no_main]

use html::{Node, Token, TokenStream, TreeBuilder, parse, tokenize};
use libfuzzer_sys::fuzz_target;
use std::convert::identity;

fn count_elements(nodes: &[Node]) -> usize {
    let mut count = 0;
    html::visit_all(nodes, &mut |node| {
        if node.as_element().is_some() {
            count += 1;
        }
    });
    count
}

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    let tokens = tokenize(input);
    let lazy = parse(input);
    let eager = TreeBuilder::new(TokenStream::new(tokens.clone())).build_all(identity);
    assert_eq!(lazy, eager, "lazy and pre-tokenized sources disagree");

    let starts = tokens
        .iter()
        .filter(|t| matches!(t, Token::StartTag { .. }))
        .count();
    assert_eq!(starts, count_elements(&lazy), "start tags lost");
});
