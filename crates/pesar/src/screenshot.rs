//! Screenshot artifacts.
//!
//! Artifact names carry an ISO-8601 timestamp with `:` and `.` replaced by
//! `-` so they are safe on every filesystem; consumers are humans and CI log
//! collectors, never the command layer itself.

use chrono::{DateTime, SecondsFormat, Utc};
use std::path::{Path, PathBuf};

use crate::result::PesarResult;

/// Capture options for a screenshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenshotOptions {
    /// Capture the full page rather than the viewport
    pub full_page: bool,
    /// Overwrite an existing artifact with the same name
    pub overwrite: bool,
}

impl Default for ScreenshotOptions {
    fn default() -> Self {
        Self {
            full_page: true,
            overwrite: true,
        }
    }
}

/// Build a timestamped artifact name: `<name>-<sanitized ISO-8601>`
#[must_use]
pub fn timestamped_name(name: &str, at: DateTime<Utc>) -> String {
    let iso = at.to_rfc3339_opts(SecondsFormat::Millis, true);
    let sanitized: String = iso
        .chars()
        .map(|c| if c == ':' || c == '.' { '-' } else { c })
        .collect();
    format!("{name}-{sanitized}")
}

/// Resolve the on-disk path for a named screenshot
#[must_use]
pub fn artifact_path(folder: &Path, name: &str) -> PathBuf {
    folder.join(format!("{name}.png"))
}

/// Write screenshot bytes to the artifact folder, creating it if needed
pub fn write_artifact(folder: &Path, name: &str, data: &[u8]) -> PesarResult<PathBuf> {
    std::fs::create_dir_all(folder)?;
    let path = artifact_path(folder, name);
    std::fs::write(&path, data)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 5, 14, 30, 15).unwrap()
    }

    #[test]
    fn test_timestamped_name_sanitizes_colons_and_dots() {
        let name = timestamped_name("bmi-calculation-result", fixed_time());
        assert!(name.starts_with("bmi-calculation-result-2024-03-05T14-30-15"));
        assert!(!name.contains(':'));
        assert!(!name.contains('.'));
    }

    #[test]
    fn test_timestamped_names_sort_chronologically() {
        let earlier = timestamped_name("shot", fixed_time());
        let later = timestamped_name(
            "shot",
            fixed_time() + chrono::Duration::seconds(1),
        );
        assert!(earlier < later);
    }

    #[test]
    fn test_artifact_path_extension() {
        let path = artifact_path(Path::new("artifacts/screenshots"), "case-1");
        assert_eq!(
            path,
            PathBuf::from("artifacts/screenshots/case-1.png")
        );
    }

    #[test]
    fn test_write_artifact_creates_folder() {
        let dir = tempfile::tempdir().unwrap();
        let folder = dir.path().join("nested/screenshots");
        let path = write_artifact(&folder, "failure", b"\x89PNG").unwrap();
        assert!(path.exists());
        assert_eq!(std::fs::read(path).unwrap(), b"\x89PNG");
    }

    #[test]
    fn test_default_options_capture_full_page() {
        let options = ScreenshotOptions::default();
        assert!(options.full_page);
        assert!(options.overwrite);
    }
}
