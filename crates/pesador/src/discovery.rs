//! Scenario discovery via glob patterns.

use std::path::{Path, PathBuf};

use pesar::SuiteConfig;

use crate::error::{CliError, CliResult};

/// Discover scenario files under a root directory.
///
/// The suite's `scenario_pattern` is resolved relative to `root`; paths
/// matching any exclude pattern are dropped. Results are sorted so run
/// order is stable across filesystems.
pub fn discover_scenarios(root: &Path, config: &SuiteConfig) -> CliResult<Vec<PathBuf>> {
    let pattern = root.join(&config.scenario_pattern);
    let pattern = pattern
        .to_str()
        .ok_or_else(|| CliError::discovery("scenario pattern is not valid UTF-8"))?;

    let excludes: Vec<glob::Pattern> = config
        .exclude_patterns
        .iter()
        .map(|p| glob::Pattern::new(p).map_err(|e| CliError::discovery(format!("{p}: {e}"))))
        .collect::<CliResult<_>>()?;

    let mut paths = Vec::new();
    let entries = glob::glob(pattern).map_err(|e| CliError::discovery(e.to_string()))?;
    for entry in entries {
        let path = entry.map_err(|e| CliError::discovery(e.to_string()))?;
        let excluded = excludes.iter().any(|ex| {
            ex.matches_path(&path)
                || path
                    .strip_prefix(root)
                    .is_ok_and(|rel| ex.matches_path(rel))
        });
        if !excluded {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}
