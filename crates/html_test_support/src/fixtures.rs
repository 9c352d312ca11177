use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

pub const RENDER_FIXTURE_FORMAT_V1: &str = "html-render-v1";

/// One golden case: parse `input`, then check the configured outputs.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RenderCase {
    pub id: String,
    pub input: String,
    #[serde(default)]
    pub indent: bool,
    #[serde(default)]
    pub xhtml: bool,
    /// Expected rendering, when the case checks rendering.
    pub render: Option<String>,
    /// Expected flattened text.
    pub text: Option<String>,
    /// Expected debug outline, one entry per line.
    pub outline: Option<Vec<String>>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RenderFixtureFile {
    format: String,
    cases: Vec<RenderCase>,
}

/// Load and validate a render fixture file. Panics with the file path on any
/// problem, since fixtures are test inputs.
pub fn load_render_cases(path: &Path) -> Vec<RenderCase> {
    let content = fs::read_to_string(path)
        .unwrap_or_else(|err| panic!("failed to read render fixtures {path:?}: {err}"));
    let file: RenderFixtureFile = toml::from_str(&content)
        .unwrap_or_else(|err| panic!("failed to parse render fixtures {path:?}: {err}"));
    assert_eq!(
        file.format, RENDER_FIXTURE_FORMAT_V1,
        "unsupported format in {path:?}"
    );
    assert!(!file.cases.is_empty(), "no cases in {path:?}");

    let mut ids = BTreeSet::new();
    for case in &file.cases {
        assert!(
            ids.insert(case.id.as_str()),
            "duplicate case id '{}' in {path:?}",
            case.id
        );
        assert!(
            case.render.is_some() || case.text.is_some() || case.outline.is_some(),
            "case '{}' in {path:?} checks nothing",
            case.id
        );
    }
    file.cases
}
