//! Check result - the verdict a check produces

use crate::error::Error;
use crate::severity::{Category, Severity};
use serde::{Deserialize, Serialize};

/// Immutable verdict produced by one check execution
///
/// Created either by a check's own `execute` on success, or synthesized by the
/// executor when an attempt errors. Never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    /// Id of the check that produced this result
    pub check_id: String,

    /// Human-readable explanation
    pub message: String,

    /// Ranked outcome classification
    pub severity: Severity,

    /// Grouping tag
    pub category: Category,

    /// Optional remediation URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub how_to_link: Option<String>,
}

impl CheckResult {
    /// Create a new result
    pub fn new(
        check_id: impl Into<String>,
        message: impl Into<String>,
        severity: Severity,
        category: Category,
    ) -> Self {
        Self {
            check_id: check_id.into(),
            message: message.into(),
            severity,
            category,
            how_to_link: None,
        }
    }

    /// Attach a remediation URL
    pub fn with_link(mut self, url: impl Into<String>) -> Self {
        self.how_to_link = Some(url.into());
        self
    }

    /// Synthesize the result recorded for a failed check attempt
    pub fn general_error(check_id: impl Into<String>, err: &Error) -> Self {
        Self {
            check_id: check_id.into(),
            message: format!("The check failed to run: {err}"),
            severity: Severity::GeneralError,
            category: Category::GeneralError,
            how_to_link: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_construction() {
        let result = CheckResult::new(
            "DL-ORG-003",
            "2 targets have been unhealthy for 30 days",
            Severity::Warning,
            Category::Organization,
        )
        .with_link("https://deploylint.dev/howto/unhealthy-targets");

        assert_eq!(result.check_id, "DL-ORG-003");
        assert_eq!(result.severity, Severity::Warning);
        assert_eq!(
            result.how_to_link.as_deref(),
            Some("https://deploylint.dev/howto/unhealthy-targets")
        );
    }

    #[test]
    fn test_general_error_result() {
        let err = Error::ApiRequest(String::from("connection refused"));
        let result = CheckResult::general_error("DL-SEC-001", &err);

        assert_eq!(result.severity, Severity::GeneralError);
        assert_eq!(result.category, Category::GeneralError);
        assert!(result.message.contains("connection refused"));
    }
}
