//! Authenticated, space-scoped HTTP client for the deployment platform
//!
//! Collection endpoints page with `take`/`skip`; every list method accepts a
//! `limit` where 0 means "fetch all pages".

use crate::resources::*;
use deploylint_core::{Error, Result};
use reqwest::{header, Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, trace};

/// Page size used when walking a full collection
const PAGE_SIZE: usize = 100;

/// Configuration for the platform client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Platform base URL (e.g., "https://deploy.example.com")
    pub base_url: String,
    /// API key sent in the X-API-Key header
    pub api_key: String,
    /// Space id all requests are scoped to (e.g., "Spaces-1")
    pub space_id: String,
    /// Per-request timeout
    pub request_timeout: Duration,
}

impl ClientConfig {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        space_id: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            space_id: space_id.into(),
            request_timeout: Duration::from_secs(30),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Read-only REST client for the deployment platform
pub struct PlatformClient {
    client: Client,
    config: ClientConfig,
}

impl PlatformClient {
    /// Create a new client
    pub fn new(config: ClientConfig) -> Result<Self> {
        url::Url::parse(&config.base_url)
            .map_err(|e| Error::Configuration(format!("Invalid base URL: {e}")))?;

        let mut headers = header::HeaderMap::new();
        let mut api_key = header::HeaderValue::from_str(&config.api_key)
            .map_err(|_| Error::Configuration(String::from("API key is not a valid header value")))?;
        api_key.set_sensitive(true);
        headers.insert("X-API-Key", api_key);

        let client = Client::builder()
            .user_agent(concat!("deploylint/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .timeout(config.request_timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| Error::Configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// The space id this client is scoped to
    pub fn space_id(&self) -> &str {
        &self.config.space_id
    }

    // ── Collection endpoints ─────────────────────────────────────────────

    /// List projects (limit 0 = all)
    pub async fn get_projects(&self, limit: usize) -> Result<Vec<Project>> {
        self.get_collection("projects", limit).await
    }

    /// List project groups (limit 0 = all)
    pub async fn get_project_groups(&self, limit: usize) -> Result<Vec<ProjectGroup>> {
        self.get_collection("projectgroups", limit).await
    }

    /// List environments (limit 0 = all)
    pub async fn get_environments(&self, limit: usize) -> Result<Vec<Environment>> {
        self.get_collection("environments", limit).await
    }

    /// List deployment targets (limit 0 = all)
    pub async fn get_targets(&self, limit: usize) -> Result<Vec<DeploymentTarget>> {
        self.get_collection("machines", limit).await
    }

    /// List lifecycles (limit 0 = all)
    pub async fn get_lifecycles(&self, limit: usize) -> Result<Vec<Lifecycle>> {
        self.get_collection("lifecycles", limit).await
    }

    /// List package feeds (limit 0 = all)
    pub async fn get_feeds(&self, limit: usize) -> Result<Vec<Feed>> {
        self.get_collection("feeds", limit).await
    }

    /// List infrastructure accounts (limit 0 = all)
    pub async fn get_accounts(&self, limit: usize) -> Result<Vec<Account>> {
        self.get_collection("accounts", limit).await
    }

    /// List server tasks, most recent first (limit 0 = all)
    pub async fn get_tasks(&self, limit: usize) -> Result<Vec<ServerTask>> {
        self.get_collection("tasks", limit).await
    }

    // ── Item endpoints ──────────────────────────────────────────────────

    /// Fetch the variable set of a project
    pub async fn get_project_variables(&self, project_id: &str) -> Result<VariableSet> {
        let path = format!("variables/variableset-{project_id}");
        self.get_json(&self.space_url(&path), &[]).await
    }

    /// Fetch a project's deployment process
    pub async fn get_deployment_process(&self, process_id: &str) -> Result<DeploymentProcess> {
        let path = format!("deploymentprocesses/{process_id}");
        self.get_json(&self.space_url(&path), &[]).await
    }

    /// Fetch audit events regarding a resource, most recent first
    pub async fn get_events_regarding(&self, resource_id: &str, limit: usize) -> Result<Vec<Event>> {
        let take = if limit == 0 { PAGE_SIZE } else { limit };
        let page: PagedResult<Event> = self
            .get_json(
                &self.space_url("events"),
                &[
                    ("regarding", resource_id.to_string()),
                    ("take", take.to_string()),
                ],
            )
            .await?;
        Ok(page.items)
    }

    // ── Users are server-scoped, not space-scoped ───────────────────────

    /// List platform users (limit 0 = all)
    pub async fn get_users(&self, limit: usize) -> Result<Vec<User>> {
        let url = format!("{}/api/users", self.config.base_url.trim_end_matches('/'));
        self.get_paged(&url, limit).await
    }

    /// List the API keys issued to a user
    pub async fn get_user_api_keys(&self, user_id: &str) -> Result<Vec<ApiKey>> {
        let url = format!(
            "{}/api/users/{user_id}/apikeys",
            self.config.base_url.trim_end_matches('/')
        );
        self.get_paged(&url, 0).await
    }

    // ── Internals ───────────────────────────────────────────────────────

    fn space_url(&self, path: &str) -> String {
        format!(
            "{}/api/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.space_id,
            path
        )
    }

    async fn get_collection<T: DeserializeOwned>(
        &self,
        path: &str,
        limit: usize,
    ) -> Result<Vec<T>> {
        let url = self.space_url(path);
        self.get_paged(&url, limit).await
    }

    /// Walk a paged endpoint until `limit` items (or all of them) are fetched
    async fn get_paged<T: DeserializeOwned>(&self, url: &str, limit: usize) -> Result<Vec<T>> {
        // A positive limit is a single capped request, matching the
        // platform's `take` semantics
        if limit > 0 {
            let page: PagedResult<T> = self
                .get_json(url, &[("take", limit.to_string())])
                .await?;
            return Ok(page.items);
        }

        let mut items = Vec::new();
        let mut skip = 0usize;

        loop {
            let page: PagedResult<T> = self
                .get_json(
                    url,
                    &[("take", PAGE_SIZE.to_string()), ("skip", skip.to_string())],
                )
                .await?;

            let fetched = page.items.len();
            items.extend(page.items);

            if fetched == 0 || items.len() >= page.total_results {
                break;
            }
            skip += fetched;
        }

        Ok(items)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        trace!(url, "GET");

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            debug!(url, status = status.as_u16(), "request failed");

            if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                return Err(Error::AuthenticationFailed(format!(
                    "{} rejected the API key ({})",
                    url,
                    status.as_u16()
                )));
            }
            return Err(Error::ApiStatus {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| Error::Parse(format!("Invalid response from {url}: {e}")))
    }

    fn map_request_error(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::RequestTimeout {
                seconds: self.config.request_timeout.as_secs(),
            }
        } else {
            Error::ApiRequest(err.to_string())
        }
    }
}
