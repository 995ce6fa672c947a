//! End-to-end dry runs of the bundled scenarios.
//!
//! Every scenario shipped in the repository must parse and pass against the
//! in-memory page model; these are the same files a live run executes.

use std::path::PathBuf;

use pesar::{DryRunExecutor, ScenarioDoc, SuiteConfig};

fn scenarios_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../scenarios")
        .canonicalize()
        .expect("bundled scenarios directory")
}

fn run_scenario(file: &str) {
    let doc = ScenarioDoc::load(&scenarios_dir().join(file)).expect("scenario parses");
    assert!(!doc.cases.is_empty(), "{file} has no cases");
    for case in &doc.cases {
        let mut executor = DryRunExecutor::new(SuiteConfig::default());
        executor
            .run_case(case)
            .unwrap_or_else(|e| panic!("{file} / {}: {e}", case.name));
    }
}

#[test]
fn bmi_scenarios_pass() {
    run_scenario("bmi.yaml");
}

#[test]
fn validation_scenarios_pass() {
    run_scenario("validation.yaml");
}

#[test]
fn bodyfat_scenarios_pass() {
    run_scenario("bodyfat.yaml");
}

#[test]
fn every_bundled_scenario_parses() {
    let mut seen = 0;
    for entry in std::fs::read_dir(scenarios_dir()).expect("scenarios dir") {
        let path = entry.expect("dir entry").path();
        if path.extension().is_some_and(|e| e == "yaml") {
            ScenarioDoc::load(&path)
                .unwrap_or_else(|e| panic!("{} does not parse: {e}", path.display()));
            seen += 1;
        }
    }
    assert!(seen >= 3);
}
