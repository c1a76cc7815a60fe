//! Typed resource models for the deployment platform API
//!
//! Field names follow the platform's PascalCase wire format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One page of a collection endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PagedResult<T> {
    pub items: Vec<T>,
    #[serde(default)]
    pub total_results: usize,
    #[serde(default)]
    pub items_per_page: usize,
}

/// A deployment project
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub project_group_id: String,
    #[serde(default)]
    pub lifecycle_id: String,
    #[serde(default)]
    pub deployment_process_id: Option<String>,
    #[serde(default)]
    pub is_disabled: bool,
}

/// A project group
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProjectGroup {
    pub id: String,
    pub name: String,
}

/// A deployment environment
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Environment {
    pub id: String,
    pub name: String,
}

/// A deployment target (machine)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeploymentTarget {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub health_status: String,
    #[serde(default)]
    pub is_disabled: bool,
}

impl DeploymentTarget {
    /// Whether the platform currently reports this target unhealthy
    pub fn is_unhealthy(&self) -> bool {
        self.health_status == "Unhealthy"
    }
}

/// The variable set attached to a project
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VariableSet {
    pub id: String,
    #[serde(default)]
    pub variables: Vec<Variable>,
}

/// A single project variable
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Variable {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub is_sensitive: bool,
}

/// A release lifecycle
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Lifecycle {
    pub id: String,
    pub name: String,
}

/// A package feed
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Feed {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub feed_type: String,
    #[serde(default)]
    pub feed_uri: Option<String>,
}

/// An infrastructure account (cloud credential, token, ...)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Account {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub account_type: String,
    #[serde(default)]
    pub modified_on: Option<DateTime<Utc>>,
}

/// A platform user
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub is_service: bool,
}

/// An API key issued to a user
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ApiKey {
    pub id: String,
    #[serde(default)]
    pub purpose: String,
    #[serde(default)]
    pub expires: Option<DateTime<Utc>>,
}

/// The step list of a project's deployment process
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeploymentProcess {
    pub id: String,
    #[serde(default)]
    pub steps: Vec<DeploymentStep>,
}

/// One step of a deployment process
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeploymentStep {
    #[serde(default)]
    pub id: String,
    pub name: String,
}

/// A server task (deployment, health check, ...)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServerTask {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub queue_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
}

impl ServerTask {
    /// Minutes the task spent queued before starting, when both stamps exist
    pub fn queued_minutes(&self) -> Option<i64> {
        match (self.queue_time, self.start_time) {
            (Some(queued), Some(started)) => Some((started - queued).num_minutes()),
            _ => None,
        }
    }
}

/// An audit event
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Event {
    pub id: String,
    #[serde(default)]
    pub category: String,
    pub occurred: DateTime<Utc>,
}
