//! Fixture runner: every `tests/fixtures/*.tpl` template is tokenized and
//! compared, as parsed JSON, against its `.tokens.json` sibling.

use libtest_mimic::{Arguments, Failed, Trial};
use std::fs;
use std::path::Path;

fn main() {
    let args = Arguments::from_args();
    let pattern = format!("{}/tests/fixtures/*.tpl", env!("CARGO_MANIFEST_DIR"));

    let mut trials = Vec::new();
    for entry in glob::glob(&pattern).expect("valid glob pattern") {
        let path = entry.expect("readable fixture path");
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("fixture")
            .to_string();
        trials.push(Trial::test(name, move || run_fixture(&path)));
    }

    libtest_mimic::run(&args, trials).exit();
}

fn run_fixture(path: &Path) -> Result<(), Failed> {
    let source =
        fs::read_to_string(path).map_err(|e| format!("read {}: {}", path.display(), e))?;
    let expected_path = path.with_extension("tokens.json");
    let expected_str = fs::read_to_string(&expected_path)
        .map_err(|e| format!("read {}: {}", expected_path.display(), e))?;
    let expected: serde_json::Value = serde_json::from_str(&expected_str)
        .map_err(|e| format!("parse {}: {}", expected_path.display(), e))?;

    let result = brace_compiler::tokenize(&source);
    if let Some(error) = &result.error {
        return Err(format!("unexpected tokenize error: {}", error).into());
    }

    let actual = serde_json::to_value(&result.tokens).map_err(|e| e.to_string())?;
    if actual != expected {
        return Err(format!(
            "token mismatch for {}\n--- expected ---\n{}\n--- actual ---\n{}",
            path.display(),
            serde_json::to_string_pretty(&expected).unwrap_or_default(),
            serde_json::to_string_pretty(&actual).unwrap_or_default()
        )
        .into());
    }
    Ok(())
}
