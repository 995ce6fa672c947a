//! The init command: scaffold a suite.

use std::path::Path;

use crate::commands::InitArgs;
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};

const CONFIG_TEMPLATE: &str = r#"# Pesar suite configuration
base_url: "https://practice.expandtesting.com"
scenario_pattern: "scenarios/**/*.yaml"

timeouts:
  command_ms: 10000
  request_ms: 10000
  response_ms: 10000
  page_load_ms: 30000

viewport:
  width: 1280
  height: 720

retries:
  run_mode: 2
  open_mode: 0

screenshots_folder: "artifacts/screenshots"
videos_folder: "artifacts/videos"
video: true
screenshot_on_run_failure: true
test_isolation: true

browser_args:
  - "--disable-popup-blocking"
  - "--block-new-web-contents"
"#;

const SCENARIO_TEMPLATE: &str = r#"name: "bmi"
description: "BMI calculation on the hosted calculator"
cases:
  - name: "calculates BMI from the pre-filled form"
    steps:
      - type: visit
        url: "/bmi-calculator"
      - type: click_calculate
      - type: expect_contains
        text: "kg/m2"
      - type: screenshot
        name: "bmi-result"
"#;

/// Scaffold `pesar.yaml` and an example scenario
pub fn run(cli: &CliConfig, args: &InitArgs) -> CliResult<()> {
    write_file(&args.dir.join("pesar.yaml"), CONFIG_TEMPLATE, args.force)?;
    std::fs::create_dir_all(args.dir.join("scenarios"))?;
    write_file(
        &args.dir.join("scenarios/bmi.yaml"),
        SCENARIO_TEMPLATE,
        args.force,
    )?;
    if !cli.verbosity.is_quiet() {
        println!("Scaffolded suite in {}", args.dir.display());
    }
    Ok(())
}

fn write_file(path: &Path, content: &str, force: bool) -> CliResult<()> {
    if path.exists() && !force {
        return Err(CliError::invalid_argument(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pesar::{ScenarioDoc, SuiteConfig};

    fn args(dir: &Path, force: bool) -> InitArgs {
        InitArgs {
            dir: dir.to_path_buf(),
            force,
        }
    }

    #[test]
    fn test_scaffolded_files_parse() {
        let dir = tempfile::tempdir().unwrap();
        run(&CliConfig::new(), &args(dir.path(), false)).unwrap();

        let config = SuiteConfig::load(dir.path().join("pesar.yaml")).unwrap();
        assert_eq!(config.viewport.width, 1280);
        assert_eq!(config.retries.run_mode, 2);

        let doc = ScenarioDoc::load(&dir.path().join("scenarios/bmi.yaml")).unwrap();
        assert_eq!(doc.name, "bmi");
        assert!(!doc.cases.is_empty());
    }

    #[test]
    fn test_existing_files_need_force() {
        let dir = tempfile::tempdir().unwrap();
        run(&CliConfig::new(), &args(dir.path(), false)).unwrap();

        let err = run(&CliConfig::new(), &args(dir.path(), false)).unwrap_err();
        assert!(err.to_string().contains("--force"));

        run(&CliConfig::new(), &args(dir.path(), true)).unwrap();
    }
}
