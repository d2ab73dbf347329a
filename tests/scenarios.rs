//! Runs every TOML scenario under tests/scenarios

use std::fs;
use std::path::{Path, PathBuf};

use ballsync::testing::{SCENARIOS_DIR, TestResult, parser::parse_test_file, run_test};

fn collect(dir: &Path, out: &mut Vec<PathBuf>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect(&path, out);
        } else if path.extension().is_some_and(|e| e == "toml") {
            out.push(path);
        }
    }
}

#[test]
fn all_scenarios_pass() {
    let base = Path::new(env!("CARGO_MANIFEST_DIR")).join(SCENARIOS_DIR);
    let mut paths = Vec::new();
    collect(&base, &mut paths);
    paths.sort();
    assert!(!paths.is_empty(), "no scenarios found in {}", base.display());

    let mut failures = Vec::new();
    for path in &paths {
        let name = path.strip_prefix(&base).unwrap_or(path).display().to_string();
        let test = match parse_test_file(path) {
            Ok(test) => test,
            Err(e) => {
                failures.push(format!("{}: {}", name, e));
                continue;
            }
        };
        match run_test(&test) {
            TestResult::Pass { .. } => {}
            TestResult::Fail { error } => failures.push(format!("{}: {}", name, error)),
            TestResult::Error { message } => failures.push(format!("{}: {}", name, message)),
        }
    }

    assert!(failures.is_empty(), "{}", failures.join("\n"));
}
