//! Naming checks - configurable regex conventions for space resources
//!
//! Each check is driven by an optional pattern in the configuration.
//! With no pattern configured the check reports nothing at all, so
//! naming conventions are strictly opt-in.

use crate::special_variables::ignore_variable;
use deploylint_client::PlatformClient;
use deploylint_common::ChecksConfig;
use deploylint_core::{Category, Check, CheckResult, Error, ErrorPolicy, Result, Severity};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

/// Compiles a configured pattern, attributing failures to the config key
fn compile_pattern(key: &str, pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|err| Error::InvalidRegex {
        key: key.to_string(),
        message: err.to_string(),
    })
}

/// Names that do not match the convention, in input order
fn invalid_names<'a, I>(names: I, pattern: &Regex) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    names
        .into_iter()
        .filter(|name| !pattern.is_match(name))
        .map(String::from)
        .collect()
}

/// Checks deployment target names against a configured convention
pub struct TargetNamingCheck {
    client: Arc<PlatformClient>,
    config: Arc<ChecksConfig>,
    policy: Arc<dyn ErrorPolicy>,
}

impl TargetNamingCheck {
    pub const ID: &'static str = "DL-NAME-001";

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
impl Check for TargetNamingCheck {
    fn id(&self) -> &str {
        Self::ID
    }

    fn name(&self) -> &str {
        "Target naming convention"
    }

    fn category(&self) -> Category {
        Category::Naming
    }

    async fn execute(&self) -> Result<Option<CheckResult>> {
        let Some(pattern) = self.config.target_name_pattern.as_deref() else {
            return Ok(None);
        };
        debug!(check_id = Self::ID, pattern, "starting check");
        let pattern = compile_pattern("target_name_pattern", pattern)?;

        let targets = match self.client.get_targets(self.config.max_targets).await {
            Ok(targets) => targets,
            Err(err) => return self.policy.handle_error(Self::ID, self.category(), err),
        };

        let invalid = invalid_names(targets.iter().map(|t| t.name.as_str()), &pattern);
        debug!(check_id = Self::ID, findings = invalid.len(), "check complete");

        if invalid.is_empty() {
            return Ok(Some(CheckResult::new(
                Self::ID,
                "All target names match the naming convention",
                Severity::Ok,
                self.category(),
            )));
        }

        Ok(Some(
            CheckResult::new(
                Self::ID,
                format!(
                    "The following target names do not match the pattern \"{}\":\n{}",
                    pattern.as_str(),
                    invalid.join("\n")
                ),
                Severity::Warning,
                self.category(),
            )
            .with_link("https://deploylint.dev/howto/naming-conventions"),
        ))
    }
}

/// Checks project variable names against a configured convention
pub struct VariableNamingCheck {
    client: Arc<PlatformClient>,
    config: Arc<ChecksConfig>,
    policy: Arc<dyn ErrorPolicy>,
}

impl VariableNamingCheck {
    pub const ID: &'static str = "DL-NAME-002";

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
impl Check for VariableNamingCheck {
    fn id(&self) -> &str {
        Self::ID
    }

    fn name(&self) -> &str {
        "Variable naming convention"
    }

    fn category(&self) -> Category {
        Category::Naming
    }

    async fn execute(&self) -> Result<Option<CheckResult>> {
        let Some(pattern) = self.config.variable_name_pattern.as_deref() else {
            return Ok(None);
        };
        debug!(check_id = Self::ID, pattern, "starting check");
        let pattern = compile_pattern("variable_name_pattern", pattern)?;

        let projects = match self.client.get_projects(self.config.max_projects).await {
            Ok(projects) => projects,
            Err(err) => return self.policy.handle_error(Self::ID, self.category(), err),
        };

        let mut invalid = Vec::new();
        for project in &projects {
            let set = match self.client.get_project_variables(&project.id).await {
                Ok(set) => set,
                Err(err) => {
                    if self.policy.should_continue(&err) {
                        continue;
                    }
                    return Err(err);
                }
            };

            for variable in set.variables.iter().filter(|v| !ignore_variable(&v.name)) {
                if !pattern.is_match(&variable.name) {
                    invalid.push(format!("{}/{}", project.name, variable.name));
                }
            }
        }

        debug!(check_id = Self::ID, findings = invalid.len(), "check complete");

        if invalid.is_empty() {
            return Ok(Some(CheckResult::new(
                Self::ID,
                "All variable names match the naming convention",
                Severity::Ok,
                self.category(),
            )));
        }

        Ok(Some(
            CheckResult::new(
                Self::ID,
                format!(
                    "The following variable names do not match the pattern \"{}\":\n{}",
                    pattern.as_str(),
                    invalid.join("\n")
                ),
                Severity::Warning,
                self.category(),
            )
            .with_link("https://deploylint.dev/howto/naming-conventions"),
        ))
    }
}

/// Checks lifecycle names against a configured convention
pub struct LifecycleNamingCheck {
    client: Arc<PlatformClient>,
    config: Arc<ChecksConfig>,
    policy: Arc<dyn ErrorPolicy>,
}

impl LifecycleNamingCheck {
    pub const ID: &'static str = "DL-NAME-003";

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
impl Check for LifecycleNamingCheck {
    fn id(&self) -> &str {
        Self::ID
    }

    fn name(&self) -> &str {
        "Lifecycle naming convention"
    }

    fn category(&self) -> Category {
        Category::Naming
    }

    async fn execute(&self) -> Result<Option<CheckResult>> {
        let Some(pattern) = self.config.lifecycle_name_pattern.as_deref() else {
            return Ok(None);
        };
        debug!(check_id = Self::ID, pattern, "starting check");
        let pattern = compile_pattern("lifecycle_name_pattern", pattern)?;

        let lifecycles = match self.client.get_lifecycles(0).await {
            Ok(lifecycles) => lifecycles,
            Err(err) => return self.policy.handle_error(Self::ID, self.category(), err),
        };

        let invalid = invalid_names(lifecycles.iter().map(|l| l.name.as_str()), &pattern);
        debug!(check_id = Self::ID, findings = invalid.len(), "check complete");

        if invalid.is_empty() {
            return Ok(Some(CheckResult::new(
                Self::ID,
                "All lifecycle names match the naming convention",
                Severity::Ok,
                self.category(),
            )));
        }

        Ok(Some(
            CheckResult::new(
                Self::ID,
                format!(
                    "The following lifecycle names do not match the pattern \"{}\":\n{}",
                    pattern.as_str(),
                    invalid.join("\n")
                ),
                Severity::Warning,
                self.category(),
            )
            .with_link("https://deploylint.dev/howto/naming-conventions"),
        ))
    }
}

/// Checks target roles against a configured convention
pub struct TargetRoleNamingCheck {
    client: Arc<PlatformClient>,
    config: Arc<ChecksConfig>,
    policy: Arc<dyn ErrorPolicy>,
}

impl TargetRoleNamingCheck {
    pub const ID: &'static str = "DL-NAME-004";

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
impl Check for TargetRoleNamingCheck {
    fn id(&self) -> &str {
        Self::ID
    }

    fn name(&self) -> &str {
        "Target role naming convention"
    }

    fn category(&self) -> Category {
        Category::Naming
    }

    async fn execute(&self) -> Result<Option<CheckResult>> {
        let Some(pattern) = self.config.target_role_pattern.as_deref() else {
            return Ok(None);
        };
        debug!(check_id = Self::ID, pattern, "starting check");
        let pattern = compile_pattern("target_role_pattern", pattern)?;

        let targets = match self.client.get_targets(self.config.max_targets).await {
            Ok(targets) => targets,
            Err(err) => return self.policy.handle_error(Self::ID, self.category(), err),
        };

        // Roles are shared across targets, report each role once
        let roles: BTreeSet<&str> = targets
            .iter()
            .flat_map(|t| t.roles.iter().map(String::as_str))
            .collect();
        let invalid = invalid_names(roles, &pattern);
        debug!(check_id = Self::ID, findings = invalid.len(), "check complete");

        if invalid.is_empty() {
            return Ok(Some(CheckResult::new(
                Self::ID,
                "All target roles match the naming convention",
                Severity::Ok,
                self.category(),
            )));
        }

        Ok(Some(
            CheckResult::new(
                Self::ID,
                format!(
                    "The following target roles do not match the pattern \"{}\":\n{}",
                    pattern.as_str(),
                    invalid.join("\n")
                ),
                Severity::Warning,
                self.category(),
            )
            .with_link("https://deploylint.dev/howto/naming-conventions"),
        ))
    }
}
