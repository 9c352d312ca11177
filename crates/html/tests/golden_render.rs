use html::{RenderConfig, flatten_text, outline, parse, render_to_string};
use html_test_support::fixtures::load_render_cases;
use html_test_support::{diff_lines, escape_text, lines_of};
use std::path::PathBuf;

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/render.toml")
}

#[test]
fn golden_render_cases() {
    let path = fixture_path();
    let cases = load_render_cases(&path);
    let mut failures = Vec::new();

    for case in &cases {
        let nodes = parse(&case.input);
        let config = RenderConfig {
            indent: case.indent,
            xhtml: case.xhtml,
            ..RenderConfig::default()
        };

        if let Some(expected) = &case.render {
            let actual = render_to_string(&config, &nodes);
            if &actual != expected {
                failures.push(format!(
                    "[{}] render\n{}",
                    case.id,
                    diff_lines(&lines_of(expected), &lines_of(&actual))
                ));
            }
        }
        if let Some(expected) = &case.text {
            let actual = flatten_text(&nodes);
            if &actual != expected {
                failures.push(format!(
                    "[{}] text\n  expected: \"{}\"\n    actual: \"{}\"",
                    case.id,
                    escape_text(expected),
                    escape_text(&actual)
                ));
            }
        }
        if let Some(expected) = &case.outline {
            let actual = outline(&nodes, usize::MAX);
            if &actual != expected {
                failures.push(format!(
                    "[{}] outline\n{}",
                    case.id,
                    diff_lines(expected, &actual)
                ));
            }
        }
    }

    assert!(
        failures.is_empty(),
        "{} of {} golden cases in {path:?} failed:\n{}",
        failures.len(),
        cases.len(),
        failures.join("\n")
    );
}
