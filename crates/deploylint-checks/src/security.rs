//! Security checks - credential hygiene and insecure endpoints

use chrono::{Duration, Utc};
use deploylint_client::{Account, ApiKey, Feed, PlatformClient};
use deploylint_common::ChecksConfig;
use deploylint_core::{Category, Check, CheckResult, ErrorPolicy, Result, Severity};
use std::sync::Arc;
use tracing::debug;

/// Finds user API keys without an expiry date
pub struct PerpetualApiKeysCheck {
    client: Arc<PlatformClient>,
    policy: Arc<dyn ErrorPolicy>,
}

impl PerpetualApiKeysCheck {
    pub const ID: &'static str = "DL-SEC-001";

    pub fn new(client: Arc<PlatformClient>, policy: Arc<dyn ErrorPolicy>) -> Self {
        Self { client, policy }
    }
}

#[async_trait::async_trait]
impl Check for PerpetualApiKeysCheck {
    fn id(&self) -> &str {
        Self::ID
    }

    fn name(&self) -> &str {
        "Perpetual API keys"
    }

    fn category(&self) -> Category {
        Category::Security
    }

    async fn execute(&self) -> Result<Option<CheckResult>> {
        debug!(check_id = Self::ID, "starting check");

        let users = match self.client.get_users(0).await {
            Ok(users) => users,
            Err(err) => return self.policy.handle_error(Self::ID, self.category(), err),
        };

        let mut perpetual = Vec::new();
        for user in users.iter().filter(|u| !u.is_service) {
            let keys = match self.client.get_user_api_keys(&user.id).await {
                Ok(keys) => keys,
                Err(err) => {
                    if self.policy.should_continue(&err) {
                        continue;
                    }
                    return Err(err);
                }
            };

            for key in keys.iter().filter(|k| never_expires(k)) {
                perpetual.push(format!("{} ({})", user.username, key.purpose));
            }
        }

        debug!(check_id = Self::ID, findings = perpetual.len(), "check complete");

        if perpetual.is_empty() {
            return Ok(Some(CheckResult::new(
                Self::ID,
                "All user API keys have an expiry date",
                Severity::Ok,
                self.category(),
            )));
        }

        Ok(Some(
            CheckResult::new(
                Self::ID,
                format!(
                    "The following API keys never expire:\n{}",
                    perpetual.join("\n")
                ),
                Severity::Warning,
                self.category(),
            )
            .with_link("https://deploylint.dev/howto/perpetual-api-keys"),
        ))
    }
}

fn never_expires(key: &ApiKey) -> bool {
    key.expires.is_none()
}

/// Finds package feeds reached over plain http
pub struct InsecureFeedsCheck {
    client: Arc<PlatformClient>,
    policy: Arc<dyn ErrorPolicy>,
}

impl InsecureFeedsCheck {
    pub const ID: &'static str = "DL-SEC-002";

    pub fn new(client: Arc<PlatformClient>, policy: Arc<dyn ErrorPolicy>) -> Self {
        Self { client, policy }
    }
}

#[async_trait::async_trait]
impl Check for InsecureFeedsCheck {
    fn id(&self) -> &str {
        Self::ID
    }

    fn name(&self) -> &str {
        "Insecure package feeds"
    }

    fn category(&self) -> Category {
        Category::Security
    }

    async fn execute(&self) -> Result<Option<CheckResult>> {
        debug!(check_id = Self::ID, "starting check");

        let feeds = match self.client.get_feeds(0).await {
            Ok(feeds) => feeds,
            Err(err) => return self.policy.handle_error(Self::ID, self.category(), err),
        };

        let insecure = insecure_feed_names(&feeds);
        debug!(check_id = Self::ID, findings = insecure.len(), "check complete");

        if insecure.is_empty() {
            return Ok(Some(CheckResult::new(
                Self::ID,
                "No feeds use unencrypted transport",
                Severity::Ok,
                self.category(),
            )));
        }

        Ok(Some(
            CheckResult::new(
                Self::ID,
                format!(
                    "The following feeds are accessed over plain http:\n{}",
                    insecure.join("\n")
                ),
                Severity::Error,
                self.category(),
            )
            .with_link("https://deploylint.dev/howto/insecure-feeds"),
        ))
    }
}

fn insecure_feed_names(feeds: &[Feed]) -> Vec<String> {
    feeds
        .iter()
        .filter(|f| {
            f.feed_uri
                .as_deref()
                .map(|uri| uri.starts_with("http://"))
                .unwrap_or(false)
        })
        .map(|f| f.name.clone())
        .collect()
}

/// Finds infrastructure accounts that have not been touched in a long time
pub struct UnrotatedAccountsCheck {
    client: Arc<PlatformClient>,
    config: Arc<ChecksConfig>,
    policy: Arc<dyn ErrorPolicy>,
}

impl UnrotatedAccountsCheck {
    pub const ID: &'static str = "DL-SEC-003";

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
impl Check for UnrotatedAccountsCheck {
    fn id(&self) -> &str {
        Self::ID
    }

    fn name(&self) -> &str {
        "Unrotated accounts"
    }

    fn category(&self) -> Category {
        Category::Security
    }

    async fn execute(&self) -> Result<Option<CheckResult>> {
        debug!(check_id = Self::ID, "starting check");

        let accounts = match self.client.get_accounts(0).await {
            Ok(accounts) => accounts,
            Err(err) => return self.policy.handle_error(Self::ID, self.category(), err),
        };

        let stale = stale_account_names(&accounts, self.config.max_account_age_days);
        debug!(check_id = Self::ID, findings = stale.len(), "check complete");

        if stale.is_empty() {
            return Ok(Some(CheckResult::new(
                Self::ID,
                format!(
                    "All accounts were rotated within the last {} days",
                    self.config.max_account_age_days
                ),
                Severity::Ok,
                self.category(),
            )));
        }

        Ok(Some(
            CheckResult::new(
                Self::ID,
                format!(
                    "The following accounts have not been rotated in {} days:\n{}",
                    self.config.max_account_age_days,
                    stale.join("\n")
                ),
                Severity::Warning,
                self.category(),
            )
            .with_link("https://deploylint.dev/howto/unrotated-accounts"),
        ))
    }
}

fn stale_account_names(accounts: &[Account], max_age_days: i64) -> Vec<String> {
    let cutoff = Utc::now() - Duration::days(max_age_days);
    accounts
        .iter()
        .filter(|a| a.modified_on.map(|m| m < cutoff).unwrap_or(false))
        .map(|a| a.name.clone())
        .collect()
}
