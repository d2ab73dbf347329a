//! Scenario runner CLI
//!
//! Usage:
//!   cargo run --bin test-scenarios                    # Run all scenarios
//!   cargo run --bin test-scenarios -- transport/      # Run one group
//!   cargo run --bin test-scenarios -- shot/made_shot  # Run one scenario
//!   cargo run --bin test-scenarios -- --list          # List scenarios without running
//!   cargo run --bin test-scenarios -- --verbose       # Expected/actual on failure

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use ballsync::testing::{SCENARIOS_DIR, TestResult, parser::parse_test_file, run_test};

#[derive(Default)]
struct Tally {
    passed: u32,
    failed: u32,
    errors: u32,
}

fn main() -> ExitCode {
    let mut verbose = false;
    let mut list_only = false;
    let mut filter: Option<String> = None;

    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--verbose" | "-v" => verbose = true,
            "--list" => list_only = true,
            other if !other.starts_with('-') => filter = Some(other.to_string()),
            other => eprintln!("Ignoring unknown flag {}", other),
        }
    }

    let base = Path::new(SCENARIOS_DIR);
    if !base.exists() {
        println!("No scenarios directory found at {}", SCENARIOS_DIR);
        return ExitCode::FAILURE;
    }

    let scenarios = discover_scenarios(base, filter.as_deref());
    if scenarios.is_empty() {
        println!("No scenario files found{}", filter.map(|f| format!(" matching '{}'", f)).unwrap_or_default());
        return ExitCode::FAILURE;
    }

    if list_only {
        for path in &scenarios {
            println!("{}", path.strip_prefix(base).unwrap_or(path).display());
        }
        return ExitCode::SUCCESS;
    }

    println!("Receiver Scenarios");
    println!("==================\n");

    let mut tally = Tally::default();
    let mut current_group = String::new();

    for path in &scenarios {
        let rel = path.strip_prefix(base).unwrap_or(path);

        let group = rel
            .parent()
            .map(|p| p.to_string_lossy().to_string())
            .unwrap_or_default();
        if group != current_group && !group.is_empty() {
            if !current_group.is_empty() {
                println!();
            }
            println!("{}/", group);
            current_group = group;
        }

        let name = rel
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let (result, description) = match parse_test_file(path) {
            Ok(def) => (run_test(&def), def.description),
            Err(message) => (TestResult::Error { message }, None),
        };

        match &result {
            TestResult::Pass { .. } => tally.passed += 1,
            TestResult::Fail { .. } => tally.failed += 1,
            TestResult::Error { .. } => tally.errors += 1,
        }
        print_result(&name, &result, verbose);
        if verbose
            && !matches!(result, TestResult::Pass { .. })
            && let Some(description) = description
        {
            println!("    ({})", description);
        }
    }

    println!("\n==================");
    println!(
        "Results: {} passed, {} failed, {} errors",
        tally.passed, tally.failed, tally.errors
    );

    if tally.failed > 0 || tally.errors > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn discover_scenarios(base: &Path, filter: Option<&str>) -> Vec<PathBuf> {
    let mut found = Vec::new();
    let mut dirs = vec![base.to_path_buf()];

    while let Some(dir) = dirs.pop() {
        let Ok(entries) = fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                dirs.push(path);
            } else if path.extension().is_some_and(|e| e == "toml") {
                let rel = path.strip_prefix(base).unwrap_or(&path).to_string_lossy().to_string();
                if filter.is_none_or(|f| rel.contains(f)) {
                    found.push(path);
                }
            }
        }
    }

    found.sort();
    found
}

fn print_result(name: &str, result: &TestResult, verbose: bool) {
    let dots = ".".repeat(44 - name.len().min(43));

    match result {
        TestResult::Pass { frames } => {
            println!("  {} {} PASS ({} frames)", name, dots, frames);
        }
        TestResult::Fail { error } => {
            println!("  {} {} FAIL", name, dots);
            if verbose {
                println!("    {}", error);
            } else {
                println!("    {}", error.message);
            }
        }
        TestResult::Error { message } => {
            println!("  {} {} ERROR", name, dots);
            println!("    {}", message);
        }
    }
}
