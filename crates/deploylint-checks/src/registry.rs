//! Check registry - builds the full suite and applies skip/only filters

use crate::naming::{
    LifecycleNamingCheck, TargetNamingCheck, TargetRoleNamingCheck, VariableNamingCheck,
};
use crate::organization::{
    DefaultProjectGroupCheck, DuplicatedVariablesCheck, EmptyProjectCheck, EnvironmentCountCheck,
    UnhealthyTargetCheck, UnusedProjectsCheck,
};
use crate::performance::DeploymentQueuedTimeCheck;
use crate::security::{InsecureFeedsCheck, PerpetualApiKeysCheck, UnrotatedAccountsCheck};
use deploylint_client::PlatformClient;
use deploylint_common::ChecksConfig;
use deploylint_core::{Check, ErrorPolicy, PermissiveErrorPolicy};
use std::sync::Arc;
use tracing::debug;

/// Builds the check suite for a space.
///
/// The registry owns the shared client, configuration and error policy,
/// and hands out `Arc<dyn Check>` instances ready for the executor.
/// `skip` removes checks by id; a non-empty `only` switches to an
/// inclusion list and wins over `skip`.
pub struct CheckRegistry {
    client: Arc<PlatformClient>,
    config: Arc<ChecksConfig>,
    policy: Arc<dyn ErrorPolicy>,
}

impl CheckRegistry {
    pub fn new(client: Arc<PlatformClient>, config: Arc<ChecksConfig>) -> Self {
        Self {
            client,
            config,
            policy: Arc::new(PermissiveErrorPolicy),
        }
    }

    /// Replaces the default permissive error policy
    pub fn with_policy(mut self, policy: Arc<dyn ErrorPolicy>) -> Self {
        self.policy = policy;
        self
    }

    /// Every check the suite knows, in stable registration order
    fn build_all(&self) -> Vec<Arc<dyn Check>> {
        let client = &self.client;
        let config = &self.config;
        let policy = &self.policy;

        vec![
            Arc::new(PerpetualApiKeysCheck::new(client.clone(), policy.clone())),
            Arc::new(InsecureFeedsCheck::new(client.clone(), policy.clone())),
            Arc::new(UnrotatedAccountsCheck::new(
                client.clone(),
                config.clone(),
                policy.clone(),
            )),
            Arc::new(EnvironmentCountCheck::new(
                client.clone(),
                config.clone(),
                policy.clone(),
            )),
            Arc::new(EmptyProjectCheck::new(
                client.clone(),
                config.clone(),
                policy.clone(),
            )),
            Arc::new(UnhealthyTargetCheck::new(
                client.clone(),
                config.clone(),
                policy.clone(),
            )),
            Arc::new(UnusedProjectsCheck::new(
                client.clone(),
                config.clone(),
                policy.clone(),
            )),
            Arc::new(DuplicatedVariablesCheck::new(
                client.clone(),
                config.clone(),
                policy.clone(),
            )),
            Arc::new(DefaultProjectGroupCheck::new(client.clone(), policy.clone())),
            Arc::new(TargetNamingCheck::new(
                client.clone(),
                config.clone(),
                policy.clone(),
            )),
            Arc::new(VariableNamingCheck::new(
                client.clone(),
                config.clone(),
                policy.clone(),
            )),
            Arc::new(LifecycleNamingCheck::new(
                client.clone(),
                config.clone(),
                policy.clone(),
            )),
            Arc::new(TargetRoleNamingCheck::new(
                client.clone(),
                config.clone(),
                policy.clone(),
            )),
            Arc::new(DeploymentQueuedTimeCheck::new(
                client.clone(),
                config.clone(),
                policy.clone(),
            )),
        ]
    }

    /// The suite after the configured skip/only filters
    pub fn checks(&self) -> Vec<Arc<dyn Check>> {
        let skip = parse_id_list(&self.config.skip);
        let only = parse_id_list(&self.config.only);

        let checks: Vec<Arc<dyn Check>> = self
            .build_all()
            .into_iter()
            .filter(|check| {
                if !only.is_empty() {
                    return only.iter().any(|id| id == check.id());
                }
                !skip.iter().any(|id| id == check.id())
            })
            .collect();

        debug!(selected = checks.len(), "built check suite");
        checks
    }
}

/// Splits a comma-separated id list, trimming whitespace and dropping
/// empty entries
fn parse_id_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use deploylint_client::ClientConfig;
    use std::collections::HashSet;

    fn registry(skip: &str, only: &str) -> CheckRegistry {
        let client = PlatformClient::new(ClientConfig::new(
            "http://localhost:8080",
            "API-TEST",
            "Spaces-1",
        ))
        .unwrap();
        let config = ChecksConfig {
            skip: skip.to_string(),
            only: only.to_string(),
            ..ChecksConfig::default()
        };
        CheckRegistry::new(Arc::new(client), Arc::new(config))
    }

    #[test]
    fn test_all_check_ids_are_unique() {
        let checks = registry("", "").checks();
        let ids: HashSet<&str> = checks.iter().map(|c| c.id()).collect();
        assert_eq!(ids.len(), checks.len());
        assert_eq!(checks.len(), 14);
    }

    #[test]
    fn test_registration_order_is_stable() {
        let checks = registry("", "").checks();
        assert_eq!(checks[0].id(), "DL-SEC-001");
        assert_eq!(checks.last().unwrap().id(), "DL-PERF-001");
    }

    #[test]
    fn test_skip_removes_named_checks() {
        let checks = registry("DL-SEC-001, DL-PERF-001", "").checks();
        assert_eq!(checks.len(), 12);
        assert!(checks.iter().all(|c| c.id() != "DL-SEC-001"));
        assert!(checks.iter().all(|c| c.id() != "DL-PERF-001"));
    }

    #[test]
    fn test_only_switches_to_inclusion() {
        let checks = registry("DL-SEC-002", "DL-SEC-002,DL-ORG-001").checks();
        assert_eq!(checks.len(), 2);
        assert_eq!(checks[0].id(), "DL-SEC-002");
        assert_eq!(checks[1].id(), "DL-ORG-001");
    }

    #[test]
    fn test_custom_policy_is_accepted() {
        use deploylint_core::StrictErrorPolicy;

        let checks = registry("", "")
            .with_policy(Arc::new(StrictErrorPolicy))
            .checks();
        assert_eq!(checks.len(), 14);
    }

    #[test]
    fn test_parse_id_list_trims_and_drops_empty() {
        assert_eq!(
            parse_id_list(" DL-SEC-001 ,, DL-ORG-002"),
            vec!["DL-SEC-001", "DL-ORG-002"]
        );
        assert!(parse_id_list("").is_empty());
        assert!(parse_id_list(" , ").is_empty());
    }
}
