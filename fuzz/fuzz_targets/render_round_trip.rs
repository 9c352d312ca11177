#![no_main]

use html::{RenderConfig, find_all, parse, render_to_string};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let input = String::from_utf8_lossy(data);
    let nodes = parse(&input);
    let indent = data.first().is_some_and(|b| b & 1 == 1);
    let config = RenderConfig {
        indent,
        ..RenderConfig::default()
    };
    let once = render_to_string(&config, &nodes);
    let again = parse(&once);
    let before = find_all(&nodes, |n| n.as_element().is_some_and(|e| !e.tag.is_empty())).len();
    let after = find_all(&again, |n| n.as_element().is_some()).len();
    assert!(after >= before, "elements vanished: {once:?}");
});
