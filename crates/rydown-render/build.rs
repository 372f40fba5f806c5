//! Writes one test per fixture and output format.
//!
//! `tests/fixtures/NAME.md` paired with `NAME.html` becomes the test
//! `NAME_html`, and with `NAME.wiki` the test `NAME_wiki`. An input with
//! neither fails the build.

use std::env;
use std::fs;
use std::path::Path;

/// Expected-output extension and the `Format` variant that produces it.
const FORMATS: [(&str, &str); 2] = [("html", "Html"), ("wiki", "Wiki")];

fn main() {
    let fixtures = Path::new("tests/fixtures");
    let mut names: Vec<String> = fs::read_dir(fixtures)
        .expect("tests/fixtures is readable")
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "md"))
        .filter_map(|path| path.file_stem()?.to_str().map(str::to_owned))
        .collect();
    names.sort();

    let mut code = String::from("mod fixtures {\n    use super::{fixture_test, Format};\n");
    for name in &names {
        let expected: Vec<_> = FORMATS
            .iter()
            .filter(|(ext, _)| fixtures.join(format!("{name}.{ext}")).exists())
            .collect();
        assert!(!expected.is_empty(), "fixture {name}.md has no .html or .wiki output");
        for (ext, variant) in expected {
            code.push_str(&format!(
                r#"
    #[test]
    fn {name}_{ext}() {{
        fixture_test("{name}", Format::{variant});
    }}
"#
            ));
        }
    }
    code.push_str("}\n");

    let out_dir = env::var("OUT_DIR").expect("cargo sets OUT_DIR");
    fs::write(Path::new(&out_dir).join("fixture_tests.rs"), code)
        .expect("generated tests are writable");

    println!("cargo::rerun-if-changed=build.rs");
    println!("cargo::rerun-if-changed=tests/fixtures");
}
