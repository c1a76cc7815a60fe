//! Check trait - the interface all audit checks implement

use crate::error::Result;
use crate::result::CheckResult;
use crate::severity::Category;

/// The trait that all audit checks must implement
///
/// Checks are independent, read-only queries against the deployment platform.
/// They never depend on one another and may run in any order.
#[async_trait::async_trait]
pub trait Check: Send + Sync {
    /// Stable, globally-unique identifier (e.g., "DL-SEC-001"), used for
    /// skip/only filtering and error attribution
    fn id(&self) -> &str;

    /// Human-readable name
    fn name(&self) -> &str;

    /// Category this check's results belong to
    fn category(&self) -> Category;

    /// Run the audit
    ///
    /// `Ok(None)` means the check is not applicable (for example, a naming
    /// check whose pattern is unset) and contributes nothing to the result
    /// set. Errors are retried by the executor.
    async fn execute(&self) -> Result<Option<CheckResult>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::severity::Severity;

    struct AlwaysWarn;

    #[async_trait::async_trait]
    impl Check for AlwaysWarn {
        fn id(&self) -> &str {
            "TEST-001"
        }

        fn name(&self) -> &str {
            "Always warn"
        }

        fn category(&self) -> Category {
            Category::Organization
        }

        async fn execute(&self) -> Result<Option<CheckResult>> {
            Ok(Some(CheckResult::new(
                self.id(),
                "something to look at",
                Severity::Warning,
                self.category(),
            )))
        }
    }

    #[tokio::test]
    async fn test_check_execution() {
        let check = AlwaysWarn;
        let result = check.execute().await.unwrap().unwrap();
        assert_eq!(result.check_id, "TEST-001");
        assert_eq!(result.severity, Severity::Warning);
    }
}
