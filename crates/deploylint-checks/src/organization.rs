//! Organization checks - space layout, unused and oversized resources

use crate::special_variables::ignore_variable;
use chrono::{DateTime, Duration, Utc};
use deploylint_client::{
    Environment, PlatformClient, Project, ProjectGroup, ServerTask, Variable,
};
use deploylint_common::ChecksConfig;
use deploylint_core::{Category, Check, CheckResult, ErrorPolicy, Result, Severity};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Name the platform gives the project group it creates on install
const DEFAULT_PROJECT_GROUP: &str = "Default Project Group";

/// Projects tolerated in the default group before it counts as a dumping ground
const DEFAULT_GROUP_LIMIT: usize = 10;

/// Flags spaces with more environments than the configured ceiling
pub struct EnvironmentCountCheck {
    client: Arc<PlatformClient>,
    config: Arc<ChecksConfig>,
    policy: Arc<dyn ErrorPolicy>,
}

impl EnvironmentCountCheck {
    pub const ID: &'static str = "DL-ORG-001";

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
impl Check for EnvironmentCountCheck {
    fn id(&self) -> &str {
        Self::ID
    }

    fn name(&self) -> &str {
        "Environment count"
    }

    fn category(&self) -> Category {
        Category::Organization
    }

    async fn execute(&self) -> Result<Option<CheckResult>> {
        debug!(check_id = Self::ID, "starting check");

        let environments = match self.client.get_environments(0).await {
            Ok(environments) => environments,
            Err(err) => return self.policy.handle_error(Self::ID, self.category(), err),
        };

        let limit = self.config.max_environments;
        debug!(check_id = Self::ID, count = environments.len(), "check complete");

        if environments.len() <= limit {
            return Ok(Some(CheckResult::new(
                Self::ID,
                format!(
                    "The space has {} environments, within the limit of {limit}",
                    environments.len()
                ),
                Severity::Ok,
                self.category(),
            )));
        }

        Ok(Some(
            CheckResult::new(
                Self::ID,
                format!(
                    "The space has {} environments, more than the recommended limit of {limit}:\n{}",
                    environments.len(),
                    environment_names(&environments).join("\n")
                ),
                Severity::Warning,
                self.category(),
            )
            .with_link("https://deploylint.dev/howto/environment-count"),
        ))
    }
}

fn environment_names(environments: &[Environment]) -> Vec<String> {
    environments.iter().map(|e| e.name.clone()).collect()
}

/// Finds projects whose deployment process has no steps
pub struct EmptyProjectCheck {
    client: Arc<PlatformClient>,
    config: Arc<ChecksConfig>,
    policy: Arc<dyn ErrorPolicy>,
}

impl EmptyProjectCheck {
    pub const ID: &'static str = "DL-ORG-002";

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
impl Check for EmptyProjectCheck {
    fn id(&self) -> &str {
        Self::ID
    }

    fn name(&self) -> &str {
        "Empty projects"
    }

    fn category(&self) -> Category {
        Category::Organization
    }

    async fn execute(&self) -> Result<Option<CheckResult>> {
        debug!(check_id = Self::ID, "starting check");

        let projects = match self.client.get_projects(self.config.max_projects).await {
            Ok(projects) => projects,
            Err(err) => return self.policy.handle_error(Self::ID, self.category(), err),
        };

        let mut empty = Vec::new();
        for project in &projects {
            let Some(process_id) = &project.deployment_process_id else {
                empty.push(project.name.clone());
                continue;
            };

            match self.client.get_deployment_process(process_id).await {
                Ok(process) => {
                    if process.steps.is_empty() {
                        empty.push(project.name.clone());
                    }
                }
                Err(err) => {
                    if self.policy.should_continue(&err) {
                        continue;
                    }
                    return Err(err);
                }
            }
        }

        debug!(check_id = Self::ID, findings = empty.len(), "check complete");

        if empty.is_empty() {
            return Ok(Some(CheckResult::new(
                Self::ID,
                "Every project has at least one deployment step",
                Severity::Ok,
                self.category(),
            )));
        }

        Ok(Some(
            CheckResult::new(
                Self::ID,
                format!(
                    "The following projects have no deployment steps:\n{}",
                    empty.join("\n")
                ),
                Severity::Warning,
                self.category(),
            )
            .with_link("https://deploylint.dev/howto/empty-projects"),
        ))
    }
}

/// Finds targets that have not been healthy for the configured window
pub struct UnhealthyTargetCheck {
    client: Arc<PlatformClient>,
    config: Arc<ChecksConfig>,
    policy: Arc<dyn ErrorPolicy>,
}

impl UnhealthyTargetCheck {
    pub const ID: &'static str = "DL-ORG-003";

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
impl Check for UnhealthyTargetCheck {
    fn id(&self) -> &str {
        Self::ID
    }

    fn name(&self) -> &str {
        "Unhealthy targets"
    }

    fn category(&self) -> Category {
        Category::Organization
    }

    async fn execute(&self) -> Result<Option<CheckResult>> {
        debug!(check_id = Self::ID, "starting check");

        let targets = match self.client.get_targets(self.config.max_targets).await {
            Ok(targets) => targets,
            Err(err) => return self.policy.handle_error(Self::ID, self.category(), err),
        };

        let window = Duration::days(self.config.max_days_since_last_task);
        let mut unhealthy = Vec::new();

        for target in targets.iter().filter(|t| !t.is_disabled && t.is_unhealthy()) {
            // An unhealthy target is only reported when it was not seen
            // healthy at any point inside the window
            let events = match self.client.get_events_regarding(&target.id, 0).await {
                Ok(events) => events,
                Err(err) => {
                    if self.policy.should_continue(&err) {
                        continue;
                    }
                    return Err(err);
                }
            };

            let healthy_recently = events
                .iter()
                .any(|e| e.category == "MachineHealthy" && Utc::now() - e.occurred < window);

            if !healthy_recently {
                unhealthy.push(target.name.clone());
            }
        }

        debug!(check_id = Self::ID, findings = unhealthy.len(), "check complete");

        if unhealthy.is_empty() {
            return Ok(Some(CheckResult::new(
                Self::ID,
                format!(
                    "No targets were unhealthy for all of the last {} days",
                    self.config.max_days_since_last_task
                ),
                Severity::Ok,
                self.category(),
            )));
        }

        Ok(Some(
            CheckResult::new(
                Self::ID,
                format!(
                    "The following targets have not been healthy in the last {} days:\n{}",
                    self.config.max_days_since_last_task,
                    unhealthy.join("\n")
                ),
                Severity::Warning,
                self.category(),
            )
            .with_link("https://deploylint.dev/howto/unhealthy-targets"),
        ))
    }
}

/// Finds projects with no deployment task inside the configured window
pub struct UnusedProjectsCheck {
    client: Arc<PlatformClient>,
    config: Arc<ChecksConfig>,
    policy: Arc<dyn ErrorPolicy>,
}

impl UnusedProjectsCheck {
    pub const ID: &'static str = "DL-ORG-004";

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
impl Check for UnusedProjectsCheck {
    fn id(&self) -> &str {
        Self::ID
    }

    fn name(&self) -> &str {
        "Unused projects"
    }

    fn category(&self) -> Category {
        Category::Organization
    }

    async fn execute(&self) -> Result<Option<CheckResult>> {
        debug!(check_id = Self::ID, "starting check");

        let projects = match self.client.get_projects(self.config.max_projects).await {
            Ok(projects) => projects,
            Err(err) => return self.policy.handle_error(Self::ID, self.category(), err),
        };
        let tasks = match self.client.get_tasks(self.config.max_tasks).await {
            Ok(tasks) => tasks,
            Err(err) => return self.policy.handle_error(Self::ID, self.category(), err),
        };

        let unused = unused_project_names(
            &projects,
            &tasks,
            Utc::now(),
            self.config.max_days_since_last_task,
        );
        debug!(check_id = Self::ID, findings = unused.len(), "check complete");

        if unused.is_empty() {
            return Ok(Some(CheckResult::new(
                Self::ID,
                format!(
                    "Every project was deployed within the last {} days",
                    self.config.max_days_since_last_task
                ),
                Severity::Ok,
                self.category(),
            )));
        }

        Ok(Some(
            CheckResult::new(
                Self::ID,
                format!(
                    "The following projects have had no deployment task in {} days:\n{}",
                    self.config.max_days_since_last_task,
                    unused.join("\n")
                ),
                Severity::Warning,
                self.category(),
            )
            .with_link("https://deploylint.dev/howto/unused-projects"),
        ))
    }
}

fn unused_project_names(
    projects: &[Project],
    tasks: &[ServerTask],
    now: DateTime<Utc>,
    max_days: i64,
) -> Vec<String> {
    let cutoff = now - Duration::days(max_days);

    let mut latest: HashMap<&str, DateTime<Utc>> = HashMap::new();
    for task in tasks {
        let (Some(project_id), Some(queued)) = (task.project_id.as_deref(), task.queue_time) else {
            continue;
        };
        latest
            .entry(project_id)
            .and_modify(|t| {
                if queued > *t {
                    *t = queued;
                }
            })
            .or_insert(queued);
    }

    projects
        .iter()
        .filter(|p| !p.is_disabled)
        .filter(|p| {
            latest
                .get(p.id.as_str())
                .map(|t| *t < cutoff)
                .unwrap_or(true)
        })
        .map(|p| p.name.clone())
        .collect()
}

/// Finds variable values duplicated across projects
pub struct DuplicatedVariablesCheck {
    client: Arc<PlatformClient>,
    config: Arc<ChecksConfig>,
    policy: Arc<dyn ErrorPolicy>,
}

impl DuplicatedVariablesCheck {
    pub const ID: &'static str = "DL-ORG-005";

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
impl Check for DuplicatedVariablesCheck {
    fn id(&self) -> &str {
        Self::ID
    }

    fn name(&self) -> &str {
        "Duplicated variables"
    }

    fn category(&self) -> Category {
        Category::Organization
    }

    async fn execute(&self) -> Result<Option<CheckResult>> {
        debug!(check_id = Self::ID, "starting check");

        let projects = match self.client.get_projects(self.config.max_projects).await {
            Ok(projects) => projects,
            Err(err) => return self.policy.handle_error(Self::ID, self.category(), err),
        };

        let mut variables: Vec<(String, Variable)> = Vec::new();
        for project in &projects {
            match self.client.get_project_variables(&project.id).await {
                Ok(set) => {
                    variables.extend(set.variables.into_iter().map(|v| (project.name.clone(), v)));
                }
                Err(err) => {
                    if self.policy.should_continue(&err) {
                        continue;
                    }
                    return Err(err);
                }
            }
        }

        let duplicated = duplicated_variable_groups(&variables);
        debug!(check_id = Self::ID, findings = duplicated.len(), "check complete");

        if duplicated.is_empty() {
            return Ok(Some(CheckResult::new(
                Self::ID,
                "No variable values are duplicated across projects",
                Severity::Ok,
                self.category(),
            )));
        }

        Ok(Some(
            CheckResult::new(
                Self::ID,
                format!(
                    "The following variables share the same value and could move to a shared set:\n{}",
                    duplicated.join("\n")
                ),
                Severity::Warning,
                self.category(),
            )
            .with_link("https://deploylint.dev/howto/duplicated-variables"),
        ))
    }
}

/// Groups non-sensitive, non-special variables by value; returns one line
/// per value shared across at least two distinct project/variable pairs
fn duplicated_variable_groups(variables: &[(String, Variable)]) -> Vec<String> {
    let mut by_value: HashMap<&str, Vec<String>> = HashMap::new();

    for (project, variable) in variables {
        if variable.is_sensitive || ignore_variable(&variable.name) {
            continue;
        }
        let Some(value) = variable.value.as_deref() else {
            continue;
        };
        if value.is_empty() {
            continue;
        }
        by_value
            .entry(value)
            .or_default()
            .push(format!("{project}/{}", variable.name));
    }

    let mut groups: Vec<String> = by_value
        .into_values()
        .filter(|holders| holders.len() > 1)
        .map(|mut holders| {
            holders.sort();
            holders.dedup();
            holders.join(" == ")
        })
        .filter(|line| line.contains(" == "))
        .collect();
    groups.sort();
    groups
}

/// Flags a default project group used as a dumping ground
pub struct DefaultProjectGroupCheck {
    client: Arc<PlatformClient>,
    policy: Arc<dyn ErrorPolicy>,
}

impl DefaultProjectGroupCheck {
    pub const ID: &'static str = "DL-ORG-006";

    pub fn new(client: Arc<PlatformClient>, policy: Arc<dyn ErrorPolicy>) -> Self {
        Self { client, policy }
    }
}

#[async_trait::async_trait]
impl Check for DefaultProjectGroupCheck {
    fn id(&self) -> &str {
        Self::ID
    }

    fn name(&self) -> &str {
        "Default project group"
    }

    fn category(&self) -> Category {
        Category::Organization
    }

    async fn execute(&self) -> Result<Option<CheckResult>> {
        debug!(check_id = Self::ID, "starting check");

        let groups = match self.client.get_project_groups(0).await {
            Ok(groups) => groups,
            Err(err) => return self.policy.handle_error(Self::ID, self.category(), err),
        };
        let projects = match self.client.get_projects(0).await {
            Ok(projects) => projects,
            Err(err) => return self.policy.handle_error(Self::ID, self.category(), err),
        };

        let count = default_group_project_count(&groups, &projects);
        debug!(check_id = Self::ID, count, "check complete");

        if count <= DEFAULT_GROUP_LIMIT {
            return Ok(Some(CheckResult::new(
                Self::ID,
                format!("The default project group holds {count} projects"),
                Severity::Ok,
                self.category(),
            )));
        }

        Ok(Some(
            CheckResult::new(
                Self::ID,
                format!(
                    "The default project group holds {count} projects; consider grouping them by team or application"
                ),
                Severity::Warning,
                self.category(),
            )
            .with_link("https://deploylint.dev/howto/default-project-group"),
        ))
    }
}

fn default_group_project_count(groups: &[ProjectGroup], projects: &[Project]) -> usize {
    let Some(default_group) = groups.iter().find(|g| g.name == DEFAULT_PROJECT_GROUP) else {
        return 0;
    };
    projects
        .iter()
        .filter(|p| p.project_group_id == default_group.id)
        .count()
}
