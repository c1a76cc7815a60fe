//! Plain-text report generation

use deploylint_core::{CheckResult, Severity};
use std::fmt::Write;

/// Renders a result set into a single severity-ranked text report
///
/// Results below `min_severity` are counted in the summary but not
/// itemized. A stable total order (severity descending, then check id, then
/// message) makes the output byte-identical for a fixed result set, however
/// the executor happened to interleave it.
pub struct PlainReporter {
    min_severity: Severity,
}

impl PlainReporter {
    /// Create a reporter with the given itemization threshold
    pub fn new(min_severity: Severity) -> Self {
        Self { min_severity }
    }

    /// Generate the report
    pub fn generate(&self, results: &[CheckResult]) -> String {
        let mut ordered: Vec<&CheckResult> = results.iter().collect();
        ordered.sort_by(|a, b| {
            b.severity
                .cmp(&a.severity)
                .then_with(|| a.check_id.cmp(&b.check_id))
                .then_with(|| a.message.cmp(&b.message))
        });

        let (itemized, quiet): (Vec<_>, Vec<_>) = ordered
            .into_iter()
            .partition(|r| r.severity >= self.min_severity);

        let mut report = String::new();
        let mut current: Option<Severity> = None;

        for result in &itemized {
            if current != Some(result.severity) {
                if current.is_some() {
                    report.push('\n');
                }
                let _ = writeln!(report, "=== {} ===", result.severity);
                current = Some(result.severity);
            }

            let _ = writeln!(report, "[{}] {}", result.check_id, result.message);
            if let Some(link) = &result.how_to_link {
                let _ = writeln!(report, "How to fix: {link}");
            }
        }

        if itemized.is_empty() {
            let _ = writeln!(
                report,
                "No results at or above the {} threshold.",
                self.min_severity
            );
        }

        if !quiet.is_empty() {
            let _ = writeln!(
                report,
                "\n{} check(s) reported below the {} threshold.",
                quiet.len(),
                self.min_severity
            );
        }

        report
    }
}

impl Default for PlainReporter {
    fn default() -> Self {
        Self::new(Severity::Warning)
    }
}
