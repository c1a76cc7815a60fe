//! Performance checks - deployment throughput and queue pressure

use deploylint_client::{PlatformClient, ServerTask};
use deploylint_common::ChecksConfig;
use deploylint_core::{Category, Check, CheckResult, ErrorPolicy, Result, Severity};
use std::sync::Arc;
use tracing::debug;

/// Flags tasks that waited in the queue longer than the configured limit
pub struct DeploymentQueuedTimeCheck {
    client: Arc<PlatformClient>,
    config: Arc<ChecksConfig>,
    policy: Arc<dyn ErrorPolicy>,
}

impl DeploymentQueuedTimeCheck {
    pub const ID: &'static str = "DL-PERF-001";

    pub fn new(
        client: Arc<PlatformClient>,
        config: Arc<ChecksConfig>,
        policy: Arc<dyn ErrorPolicy>,
    ) -> Self {
        Self {
            client,
            config,
            policy,
        }
    }
}

#[async_trait::async_trait]
impl Check for DeploymentQueuedTimeCheck {
    fn id(&self) -> &str {
        Self::ID
    }

    fn name(&self) -> &str {
        "Deployment queued time"
    }

    fn category(&self) -> Category {
        Category::Performance
    }

    async fn execute(&self) -> Result<Option<CheckResult>> {
        debug!(check_id = Self::ID, "starting check");

        let tasks = match self.client.get_tasks(self.config.max_tasks).await {
            Ok(tasks) => tasks,
            Err(err) => return self.policy.handle_error(Self::ID, self.category(), err),
        };

        let slow = slow_task_lines(&tasks, self.config.max_queued_minutes);
        debug!(check_id = Self::ID, findings = slow.len(), "check complete");

        if slow.is_empty() {
            return Ok(Some(CheckResult::new(
                Self::ID,
                format!(
                    "No recent task queued for more than {} minutes",
                    self.config.max_queued_minutes
                ),
                Severity::Ok,
                self.category(),
            )));
        }

        Ok(Some(
            CheckResult::new(
                Self::ID,
                format!(
                    "The following tasks waited more than {} minutes in the queue; the task cap may be too low:\n{}",
                    self.config.max_queued_minutes,
                    slow.join("\n")
                ),
                Severity::Warning,
                self.category(),
            )
            .with_link("https://deploylint.dev/howto/deployment-queue-times"),
        ))
    }
}

fn slow_task_lines(tasks: &[ServerTask], max_queued_minutes: i64) -> Vec<String> {
    tasks
        .iter()
        .filter_map(|task| {
            let minutes = task.queued_minutes()?;
            (minutes > max_queued_minutes)
                .then(|| format!("{} ({}) queued for {minutes} minutes", task.name, task.id))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn task(id: &str, queued_for: Option<Duration>) -> ServerTask {
        let now = Utc::now();
        ServerTask {
            id: id.to_string(),
            name: String::from("Deploy"),
            state: String::from("Success"),
            project_id: None,
            queue_time: queued_for.map(|d| now - d - Duration::minutes(1)),
            start_time: queued_for.map(|_| now - Duration::minutes(1)),
        }
    }

    #[test]
    fn test_slow_tasks_are_reported() {
        let tasks = vec![
            task("ServerTasks-1", Some(Duration::minutes(25))),
            task("ServerTasks-2", Some(Duration::minutes(2))),
        ];
        let slow = slow_task_lines(&tasks, 10);
        assert_eq!(slow.len(), 1);
        assert!(slow[0].contains("ServerTasks-1"));
    }

    #[test]
    fn test_unstarted_tasks_are_skipped() {
        let tasks = vec![task("ServerTasks-3", None)];
        assert!(slow_task_lines(&tasks, 10).is_empty());
    }
}
