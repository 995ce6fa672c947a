//! The list command: show discovered scenarios.

use std::path::Path;

use pesar::{ScenarioDoc, SuiteConfig};

use crate::commands::ListArgs;
use crate::config::CliConfig;
use crate::discovery::discover_scenarios;
use crate::error::CliResult;

/// Print discovered scenarios, optionally with their cases
pub fn run(cli: &CliConfig, suite: &SuiteConfig, root: &Path, args: &ListArgs) -> CliResult<()> {
    let paths = discover_scenarios(root, suite)?;
    if paths.is_empty() {
        println!("No scenarios match {}", suite.scenario_pattern);
        return Ok(());
    }

    for path in paths {
        let doc = ScenarioDoc::load(&path)?;
        let rel = path.strip_prefix(root).unwrap_or(&path);
        println!(
            "{} ({}, {} cases)",
            doc.name,
            rel.display(),
            doc.cases.len()
        );
        if args.cases {
            for case in &doc.cases {
                println!("  - {}", case.name);
            }
        }
        if cli.verbosity.is_verbose() {
            if let Some(description) = &doc.description {
                println!("  {description}");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_empty_directory_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let result = run(
            &CliConfig::new(),
            &SuiteConfig::default(),
            dir.path(),
            &ListArgs { cases: true },
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_list_reads_scenarios() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("scenarios")).unwrap();
        std::fs::write(
            dir.path().join("scenarios/bmi.yaml"),
            "name: bmi\ncases:\n  - name: one\n    steps: []\n",
        )
        .unwrap();
        let result = run(
            &CliConfig::new(),
            &SuiteConfig::default(),
            dir.path(),
            &ListArgs { cases: false },
        );
        assert!(result.is_ok());
    }
}
