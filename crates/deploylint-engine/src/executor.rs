//! Bounded concurrent check executor with retry and failure isolation
//!
//! Checks are independent, read-only audits; the executor's job is to keep
//! one check's slowness or failure from affecting any other. Results from
//! all tasks flow through a single mpsc channel into one collector task, so
//! no collection is ever appended to concurrently.

use deploylint_core::{Check, CheckResult, Error, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// Executor tunables
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Maximum checks executing at any instant
    pub max_concurrency: usize,

    /// Attempts per check before it is reported unrecoverable
    pub attempts: u32,

    /// Record a synthesized `GeneralError` result for every failed attempt.
    /// When false, only the final failed attempt is recorded, so a check
    /// that eventually succeeds leaves no error trail.
    pub record_failed_attempts: bool,

    /// Deadline for the whole run (None = unbounded)
    pub deadline: Option<Duration>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 15,
            attempts: 3,
            record_failed_attempts: true,
            deadline: None,
        }
    }
}

/// Runs a collection of checks and gathers their results
///
/// Failure semantics: a check that errors is retried up to
/// `attempts` times; each failed attempt is surfaced as a synthesized
/// `GeneralError` result. A check whose attempts are all exhausted is
/// reported through the `on_unrecoverable` callback, which decides whether
/// the run continues (return `Ok`) or is aborted (return `Err`). An abort
/// stops nothing that is already in flight - remaining checks drain - but
/// the call then returns the callback's error and the gathered results are
/// discarded.
pub struct CheckExecutor {
    config: ExecutorConfig,
}

impl CheckExecutor {
    /// Create an executor with default tunables
    pub fn new() -> Self {
        Self {
            config: ExecutorConfig::default(),
        }
    }

    /// Create an executor with custom tunables
    pub fn with_config(config: ExecutorConfig) -> Self {
        Self { config }
    }

    /// Execute every check and collect the results
    ///
    /// Result order is not guaranteed across checks; the reporter imposes a
    /// stable order of its own.
    pub async fn execute_checks<F>(
        &self,
        checks: Vec<Arc<dyn Check>>,
        on_unrecoverable: F,
    ) -> Result<Vec<CheckResult>>
    where
        F: Fn(&dyn Check, &Error) -> Result<()> + Send + Sync + 'static,
    {
        if checks.is_empty() {
            return Ok(Vec::new());
        }

        match self.config.deadline {
            Some(deadline) => tokio::time::timeout(deadline, self.run(checks, on_unrecoverable))
                .await
                .map_err(|_| Error::DeadlineExceeded {
                    seconds: deadline.as_secs(),
                })?,
            None => self.run(checks, on_unrecoverable).await,
        }
    }

    async fn run<F>(&self, checks: Vec<Arc<dyn Check>>, on_unrecoverable: F) -> Result<Vec<CheckResult>>
    where
        F: Fn(&dyn Check, &Error) -> Result<()> + Send + Sync + 'static,
    {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrency.max(1)));
        let attempts = self.config.attempts.max(1);
        let record_all = self.config.record_failed_attempts;
        let on_unrecoverable = Arc::new(on_unrecoverable);

        let (tx, mut rx) = mpsc::unbounded_channel::<CheckResult>();

        // Single consumer; the only place results are accumulated
        let collector = tokio::spawn(async move {
            let mut results = Vec::new();
            while let Some(result) = rx.recv().await {
                results.push(result);
            }
            results
        });

        let mut tasks: JoinSet<Result<()>> = JoinSet::new();

        for check in checks {
            let semaphore = Arc::clone(&semaphore);
            let tx = tx.clone();
            let on_unrecoverable = Arc::clone(&on_unrecoverable);

            tasks.spawn(async move {
                // The permit covers the whole retry loop: retries never
                // consume a second slot
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .expect("concurrency limiter closed");

                let mut last_err = None;

                for attempt in 1..=attempts {
                    debug!(check_id = check.id(), attempt, "executing check");

                    match check.execute().await {
                        Ok(Some(result)) => {
                            let _ = tx.send(result);
                            return Ok(());
                        }
                        Ok(None) => {
                            debug!(check_id = check.id(), "check not applicable");
                            return Ok(());
                        }
                        Err(err) => {
                            warn!(
                                check_id = check.id(),
                                attempt,
                                code = err.code(),
                                "check attempt failed: {err}"
                            );
                            if record_all || attempt == attempts {
                                let _ = tx.send(CheckResult::general_error(check.id(), &err));
                            }
                            last_err = Some(err);
                        }
                    }
                }

                let Some(err) = last_err else {
                    return Ok(());
                };
                on_unrecoverable(check.as_ref(), &err)
            });
        }
        drop(tx);

        // Drain every task even after an abort; started checks run to
        // completion. The first abort error wins.
        let mut abort_err = None;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    if abort_err.is_none() {
                        abort_err = Some(err);
                    }
                }
                Err(join_err) => {
                    if abort_err.is_none() {
                        abort_err = Some(Error::ExecutionAborted {
                            reason: format!("check task panicked: {join_err}"),
                        });
                    }
                }
            }
        }

        let results = collector.await.map_err(|e| Error::Internal(format!(
            "result collector failed: {e}"
        )))?;

        match abort_err {
            Some(err) => Err(err),
            None => Ok(results),
        }
    }
}

impl Default for CheckExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deploylint_core::{Category, Severity};
    use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
    use tokio::sync::Notify;

    /// Test double whose behavior is scripted per attempt
    struct ScriptedCheck {
        id: String,
        // Err for the first `fail_attempts` attempts, then a result
        fail_attempts: u32,
        not_applicable: bool,
        attempts_seen: AtomicU32,
    }

    impl ScriptedCheck {
        fn succeeding(id: &str) -> Arc<Self> {
            Arc::new(Self {
                id: id.to_string(),
                fail_attempts: 0,
                not_applicable: false,
                attempts_seen: AtomicU32::new(0),
            })
        }

        fn failing(id: &str) -> Arc<Self> {
            Arc::new(Self {
                id: id.to_string(),
                fail_attempts: u32::MAX,
                not_applicable: false,
                attempts_seen: AtomicU32::new(0),
            })
        }

        fn flaky(id: &str, fail_attempts: u32) -> Arc<Self> {
            Arc::new(Self {
                id: id.to_string(),
                fail_attempts,
                not_applicable: false,
                attempts_seen: AtomicU32::new(0),
            })
        }

        fn not_applicable(id: &str) -> Arc<Self> {
            Arc::new(Self {
                id: id.to_string(),
                fail_attempts: 0,
                not_applicable: true,
                attempts_seen: AtomicU32::new(0),
            })
        }
    }

    #[async_trait::async_trait]
    impl Check for ScriptedCheck {
        fn id(&self) -> &str {
            &self.id
        }

        fn name(&self) -> &str {
            "scripted"
        }

        fn category(&self) -> Category {
            Category::Organization
        }

        async fn execute(&self) -> Result<Option<CheckResult>> {
            let attempt = self.attempts_seen.fetch_add(1, Ordering::SeqCst) + 1;
            if attempt <= self.fail_attempts {
                return Err(Error::ApiRequest(format!("{} attempt {attempt}", self.id)));
            }
            if self.not_applicable {
                return Ok(None);
            }
            Ok(Some(CheckResult::new(
                &self.id,
                "all good",
                Severity::Ok,
                Category::Organization,
            )))
        }
    }

    fn continue_on_failure() -> impl Fn(&dyn Check, &Error) -> Result<()> + Send + Sync + 'static {
        |_check, _err| Ok(())
    }

    #[tokio::test]
    async fn test_empty_collection() {
        let executor = CheckExecutor::new();
        let results = executor
            .execute_checks(Vec::new(), continue_on_failure())
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_one_result_per_clean_check() {
        let checks: Vec<Arc<dyn Check>> = (0..10)
            .map(|i| ScriptedCheck::succeeding(&format!("DL-TEST-{i:03}")) as Arc<dyn Check>)
            .collect();

        let executor = CheckExecutor::new();
        let results = executor
            .execute_checks(checks, continue_on_failure())
            .await
            .unwrap();

        assert_eq!(results.len(), 10);
        let mut ids: Vec<_> = results.iter().map(|r| r.check_id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 10, "no duplicate results for clean checks");
    }

    #[tokio::test]
    async fn test_exhausted_check_records_every_attempt_and_notifies_once() {
        let check = ScriptedCheck::failing("DL-TEST-001");
        let notifications = Arc::new(AtomicU32::new(0));
        let notifications_in_cb = Arc::clone(&notifications);

        let executor = CheckExecutor::with_config(ExecutorConfig {
            attempts: 3,
            ..ExecutorConfig::default()
        });
        let results = executor
            .execute_checks(vec![check as Arc<dyn Check>], move |check, _err| {
                assert_eq!(check.id(), "DL-TEST-001");
                notifications_in_cb.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .await
            .unwrap();

        assert_eq!(results.len(), 3, "one synthesized result per attempt");
        assert!(results
            .iter()
            .all(|r| r.severity == Severity::GeneralError && r.check_id == "DL-TEST-001"));
        assert_eq!(notifications.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_mixed_run_matches_expected_totals() {
        // 20 checks, 2 always fail, 18 succeed first try:
        // 18 + 2 * 3 = 24 results, callback fires twice
        let mut checks: Vec<Arc<dyn Check>> = (0..18)
            .map(|i| ScriptedCheck::succeeding(&format!("DL-OK-{i:03}")) as Arc<dyn Check>)
            .collect();
        checks.push(ScriptedCheck::failing("DL-BAD-001"));
        checks.push(ScriptedCheck::failing("DL-BAD-002"));

        let failures = Arc::new(AtomicU32::new(0));
        let failures_in_cb = Arc::clone(&failures);

        let executor = CheckExecutor::with_config(ExecutorConfig {
            max_concurrency: 15,
            attempts: 3,
            ..ExecutorConfig::default()
        });
        let results = executor
            .execute_checks(checks, move |_check, _err| {
                failures_in_cb.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .await
            .unwrap();

        assert_eq!(results.len(), 24);
        assert_eq!(failures.load(Ordering::SeqCst), 2);
        assert_eq!(
            results
                .iter()
                .filter(|r| r.severity == Severity::GeneralError)
                .count(),
            6
        );
    }

    #[tokio::test]
    async fn test_flaky_check_leaves_error_trail_by_default() {
        // Fails twice, succeeds on the third attempt: the audit trail keeps
        // the two synthesized errors alongside the real result
        let check = ScriptedCheck::flaky("DL-TEST-001", 2);

        let executor = CheckExecutor::new();
        let results = executor
            .execute_checks(vec![check as Arc<dyn Check>], |_c, _e| {
                panic!("check eventually succeeded; callback must not fire")
            })
            .await
            .unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(
            results
                .iter()
                .filter(|r| r.severity == Severity::GeneralError)
                .count(),
            2
        );
        assert_eq!(
            results.iter().filter(|r| r.severity == Severity::Ok).count(),
            1
        );
    }

    #[tokio::test]
    async fn test_final_outcome_only_mode() {
        let flaky = ScriptedCheck::flaky("DL-TEST-001", 2);
        let broken = ScriptedCheck::failing("DL-TEST-002");

        let executor = CheckExecutor::with_config(ExecutorConfig {
            record_failed_attempts: false,
            attempts: 3,
            ..ExecutorConfig::default()
        });
        let results = executor
            .execute_checks(
                vec![flaky as Arc<dyn Check>, broken as Arc<dyn Check>],
                continue_on_failure(),
            )
            .await
            .unwrap();

        // flaky: clean result only; broken: single final-attempt record
        assert_eq!(results.len(), 2);
        let flaky_results: Vec<_> = results
            .iter()
            .filter(|r| r.check_id == "DL-TEST-001")
            .collect();
        assert_eq!(flaky_results.len(), 1);
        assert_eq!(flaky_results[0].severity, Severity::Ok);
        let broken_results: Vec<_> = results
            .iter()
            .filter(|r| r.check_id == "DL-TEST-002")
            .collect();
        assert_eq!(broken_results.len(), 1);
        assert_eq!(broken_results[0].severity, Severity::GeneralError);
    }

    #[tokio::test]
    async fn test_not_applicable_contributes_nothing() {
        let checks: Vec<Arc<dyn Check>> = vec![
            ScriptedCheck::not_applicable("DL-TEST-001"),
            ScriptedCheck::succeeding("DL-TEST-002"),
        ];

        let executor = CheckExecutor::new();
        let results = executor
            .execute_checks(checks, continue_on_failure())
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].check_id, "DL-TEST-002");
    }

    #[tokio::test]
    async fn test_callback_error_aborts_run_and_discards_results() {
        let mut checks: Vec<Arc<dyn Check>> = (0..5)
            .map(|i| ScriptedCheck::succeeding(&format!("DL-OK-{i:03}")) as Arc<dyn Check>)
            .collect();
        checks.push(ScriptedCheck::failing("DL-BAD-001"));

        let executor = CheckExecutor::new();
        let outcome = executor
            .execute_checks(checks, |check, _err| {
                Err(Error::CheckFailed {
                    check_id: check.id().to_string(),
                    message: String::from("treated as fatal by the caller"),
                })
            })
            .await;

        // Abort discards accumulated results; the caller gets the error
        match outcome {
            Err(Error::CheckFailed { check_id, .. }) => assert_eq!(check_id, "DL-BAD-001"),
            other => panic!("expected CheckFailed abort, got {other:?}"),
        }
    }

    /// Check that tracks how many instances execute at once
    struct GaugedCheck {
        id: String,
        active: Arc<AtomicUsize>,
        peak: Arc<AtomicUsize>,
    }

    #[async_trait::async_trait]
    impl Check for GaugedCheck {
        fn id(&self) -> &str {
            &self.id
        }

        fn name(&self) -> &str {
            "gauged"
        }

        fn category(&self) -> Category {
            Category::Performance
        }

        async fn execute(&self) -> Result<Option<CheckResult>> {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.active.fetch_sub(1, Ordering::SeqCst);
            Ok(Some(CheckResult::new(
                &self.id,
                "done",
                Severity::Ok,
                Category::Performance,
            )))
        }
    }

    #[tokio::test]
    async fn test_concurrency_never_exceeds_bound() {
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let checks: Vec<Arc<dyn Check>> = (0..30)
            .map(|i| {
                Arc::new(GaugedCheck {
                    id: format!("DL-GAUGE-{i:03}"),
                    active: Arc::clone(&active),
                    peak: Arc::clone(&peak),
                }) as Arc<dyn Check>
            })
            .collect();

        let executor = CheckExecutor::with_config(ExecutorConfig {
            max_concurrency: 4,
            ..ExecutorConfig::default()
        });
        let results = executor
            .execute_checks(checks, continue_on_failure())
            .await
            .unwrap();

        assert_eq!(results.len(), 30);
        assert!(
            peak.load(Ordering::SeqCst) <= 4,
            "peak concurrency {} exceeded bound 4",
            peak.load(Ordering::SeqCst)
        );
    }

    /// Check that completes only once it is released
    struct LaggardCheck {
        id: String,
        release: Arc<Notify>,
    }

    #[async_trait::async_trait]
    impl Check for LaggardCheck {
        fn id(&self) -> &str {
            &self.id
        }

        fn name(&self) -> &str {
            "laggard"
        }

        fn category(&self) -> Category {
            Category::Organization
        }

        async fn execute(&self) -> Result<Option<CheckResult>> {
            self.release.notified().await;
            Ok(Some(CheckResult::new(
                &self.id,
                "finally",
                Severity::Ok,
                Category::Organization,
            )))
        }
    }

    struct ReleasingCheck {
        id: String,
        remaining: Arc<AtomicUsize>,
        release: Arc<Notify>,
    }

    #[async_trait::async_trait]
    impl Check for ReleasingCheck {
        fn id(&self) -> &str {
            &self.id
        }

        fn name(&self) -> &str {
            "releasing"
        }

        fn category(&self) -> Category {
            Category::Organization
        }

        async fn execute(&self) -> Result<Option<CheckResult>> {
            if self.remaining.fetch_sub(1, Ordering::SeqCst) == 1 {
                self.release.notify_one();
            }
            Ok(Some(CheckResult::new(
                &self.id,
                "quick",
                Severity::Ok,
                Category::Organization,
            )))
        }
    }

    #[tokio::test]
    async fn test_blocked_check_does_not_starve_others() {
        // The laggard only completes after all three quick checks have run;
        // if it held up the others the run would deadlock and time out
        let release = Arc::new(Notify::new());
        let remaining = Arc::new(AtomicUsize::new(3));

        let mut checks: Vec<Arc<dyn Check>> = vec![Arc::new(LaggardCheck {
            id: String::from("DL-SLOW-001"),
            release: Arc::clone(&release),
        })];
        for i in 0..3 {
            checks.push(Arc::new(ReleasingCheck {
                id: format!("DL-FAST-{i:03}"),
                remaining: Arc::clone(&remaining),
                release: Arc::clone(&release),
            }));
        }

        let executor = CheckExecutor::with_config(ExecutorConfig {
            max_concurrency: 4,
            ..ExecutorConfig::default()
        });
        let results = tokio::time::timeout(
            Duration::from_secs(5),
            executor.execute_checks(checks, continue_on_failure()),
        )
        .await
        .expect("run deadlocked behind a blocked check")
        .unwrap();

        assert_eq!(results.len(), 4);
    }

    #[tokio::test]
    async fn test_deadline_cuts_off_run() {
        let release = Arc::new(Notify::new());
        let checks: Vec<Arc<dyn Check>> = vec![Arc::new(LaggardCheck {
            id: String::from("DL-SLOW-001"),
            release,
        })];

        let executor = CheckExecutor::with_config(ExecutorConfig {
            deadline: Some(Duration::from_millis(50)),
            ..ExecutorConfig::default()
        });
        let outcome = executor.execute_checks(checks, continue_on_failure()).await;

        assert!(matches!(outcome, Err(Error::DeadlineExceeded { .. })));
    }
}
