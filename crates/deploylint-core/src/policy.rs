//! Injected error-handling policy for API failures inside checks
//!
//! Checks do not decide on their own whether a failed platform call should
//! sink the check or degrade it to a visible result; the factory injects one
//! of these strategies instead.

use crate::error::{Error, Result};
use crate::result::CheckResult;
use crate::severity::{Category, Severity};
use tracing::warn;

/// Strategy for handling platform API errors encountered by a check
pub trait ErrorPolicy: Send + Sync {
    /// Whether a check iterating over many resources should keep going after
    /// this error
    fn should_continue(&self, err: &Error) -> bool;

    /// Convert a failed platform call into an outcome for the whole check:
    /// either a (typically `GeneralError`) result, or a propagated error
    fn handle_error(
        &self,
        check_id: &str,
        category: Category,
        err: Error,
    ) -> Result<Option<CheckResult>>;
}

/// Permissive default: surface API failures as results and keep the run going
///
/// Mirrors the behavior expected of a read-only audit - a missing permission
/// on one endpoint should degrade that check, not kill the report.
#[derive(Debug, Clone, Copy, Default)]
pub struct PermissiveErrorPolicy;

impl ErrorPolicy for PermissiveErrorPolicy {
    fn should_continue(&self, _err: &Error) -> bool {
        true
    }

    fn handle_error(
        &self,
        check_id: &str,
        category: Category,
        err: Error,
    ) -> Result<Option<CheckResult>> {
        warn!(check_id, code = err.code(), "check degraded by API error");
        Ok(Some(CheckResult::new(
            check_id,
            format!("The check could not query the platform: {err}"),
            Severity::GeneralError,
            category,
        )))
    }
}

/// Strict policy: propagate every API failure to the executor's retry loop
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictErrorPolicy;

impl ErrorPolicy for StrictErrorPolicy {
    fn should_continue(&self, err: &Error) -> bool {
        !err.is_fatal()
    }

    fn handle_error(
        &self,
        _check_id: &str,
        _category: Category,
        err: Error,
    ) -> Result<Option<CheckResult>> {
        Err(err)
    }
}
