//! Console reporting for scenario runs.

use std::time::Duration;

use crate::harness::{SuiteResults, TestResult};

/// Console reporter with optional color
#[derive(Debug, Clone, Copy)]
pub struct ConsoleReporter {
    color: bool,
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self { color: true }
    }
}

impl ConsoleReporter {
    /// Reporter with color enabled
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle color output
    #[must_use]
    pub const fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// One line for a finished case
    #[must_use]
    pub fn case_line(&self, result: &TestResult) -> String {
        let mark = if result.passed { "✓" } else { "✗" };
        let mark = if self.color {
            if result.passed {
                console::style(mark).green().to_string()
            } else {
                console::style(mark).red().to_string()
            }
        } else {
            mark.to_string()
        };

        let mut line = format!(
            "  {mark} {} ({})",
            result.name,
            format_duration(result.duration)
        );
        if result.attempts > 1 {
            line.push_str(&format!(" [attempt {}]", result.attempts));
        }
        if let Some(error) = &result.error {
            line.push_str(&format!("\n      {error}"));
        }
        line
    }

    /// Summary block for a suite
    #[must_use]
    pub fn summary(&self, suite: &SuiteResults) -> String {
        let status = if suite.all_passed() {
            "passed"
        } else {
            "failed"
        };
        format!(
            "{}: {} passed, {} failed, {} total ({}) — {status}",
            suite.suite_name,
            suite.passed_count(),
            suite.failed_count(),
            suite.results.len(),
            format_duration(suite.duration),
        )
    }

    /// Print a case line to stdout
    pub fn report_case(&self, result: &TestResult) {
        println!("{}", self.case_line(result));
    }

    /// Print the suite summary to stdout
    pub fn report_summary(&self, suite: &SuiteResults) {
        println!("{}", self.summary(suite));
    }
}

fn format_duration(d: Duration) -> String {
    if d.as_secs() >= 1 {
        format!("{:.1}s", d.as_secs_f64())
    } else {
        format!("{}ms", d.as_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::TestResult;

    fn plain() -> ConsoleReporter {
        ConsoleReporter::new().with_color(false)
    }

    #[test]
    fn test_passing_case_line() {
        let line = plain().case_line(&TestResult::pass("TC-01"));
        assert!(line.contains('✓'));
        assert!(line.contains("TC-01"));
    }

    #[test]
    fn test_failing_case_line_includes_error() {
        let line = plain().case_line(&TestResult::fail("TC-06", "Element not found: #BMI"));
        assert!(line.contains('✗'));
        assert!(line.contains("Element not found: #BMI"));
    }

    #[test]
    fn test_retried_case_shows_attempts() {
        let line = plain().case_line(&TestResult::pass("TC-02").with_attempts(3));
        assert!(line.contains("[attempt 3]"));
    }

    #[test]
    fn test_summary_counts() {
        let mut suite = SuiteResults::new("bmi");
        suite.push(TestResult::pass("a"));
        suite.push(TestResult::pass("b"));
        suite.push(TestResult::fail("c", "boom"));

        let summary = plain().summary(&suite);
        assert!(summary.contains("2 passed"));
        assert!(summary.contains("1 failed"));
        assert!(summary.contains("3 total"));
        assert!(summary.ends_with("failed"));
    }

    #[test]
    fn test_duration_formatting() {
        assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.5s");
    }
}
