use serde::{Deserialize, Serialize};

use crate::error::AwsProviderError;

/// Default STS session name used when assuming a role.
pub const DEFAULT_SESSION_NAME: &str = "dxlookup";

/// Shared base configuration for AWS data sources.
///
/// Holds the region the lookups run in, an optional STS assume-role ARN for
/// cross-account access, an endpoint override for local development, and
/// optional overrides for the account and partition that go into synthesized
/// ARNs. When the overrides are absent they are resolved from the caller
/// identity (see [`DeploymentContext`](crate::context::DeploymentContext)).
///
/// # Example
///
/// ```toml
/// region = "eu-west-1"
/// role_arn = "arn:aws:iam::123456789012:role/network-readonly"
/// account_id = "123456789012"
/// ```
#[derive(Clone, Serialize, Deserialize)]
pub struct AwsBaseConfig {
    /// AWS region (e.g. `"us-east-1"`).
    pub region: String,

    /// Optional IAM role ARN to assume via STS.
    #[serde(default)]
    pub role_arn: Option<String>,

    /// Optional endpoint URL override (e.g. `LocalStack`).
    #[serde(default)]
    pub endpoint_url: Option<String>,

    /// Optional STS session name (defaults to [`DEFAULT_SESSION_NAME`]).
    #[serde(default)]
    pub session_name: Option<String>,

    /// Optional external ID for cross-account trust policies.
    #[serde(default)]
    pub external_id: Option<String>,

    /// Account ID to use in ARNs instead of asking STS.
    #[serde(default)]
    pub account_id: Option<String>,

    /// Partition to use in ARNs instead of deriving it.
    #[serde(default)]
    pub partition: Option<String>,
}

impl std::fmt::Debug for AwsBaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsBaseConfig")
            .field("region", &self.region)
            .field("role_arn", &self.role_arn.as_ref().map(|_| "[REDACTED]"))
            .field("endpoint_url", &self.endpoint_url)
            .field("session_name", &self.session_name)
            .field("external_id", &self.external_id)
            .field("account_id", &self.account_id)
            .field("partition", &self.partition)
            .finish()
    }
}

impl AwsBaseConfig {
    /// Create a new `AwsBaseConfig` for the given region.
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            role_arn: None,
            endpoint_url: None,
            session_name: None,
            external_id: None,
            account_id: None,
            partition: None,
        }
    }

    /// Set an IAM role ARN to assume via STS.
    #[must_use]
    pub fn with_role_arn(mut self, role_arn: impl Into<String>) -> Self {
        self.role_arn = Some(role_arn.into());
        self
    }

    /// Set an endpoint URL override.
    #[must_use]
    pub fn with_endpoint_url(mut self, endpoint_url: impl Into<String>) -> Self {
        self.endpoint_url = Some(endpoint_url.into());
        self
    }

    /// Set the STS session name for assume-role.
    #[must_use]
    pub fn with_session_name(mut self, session_name: impl Into<String>) -> Self {
        self.session_name = Some(session_name.into());
        self
    }

    /// Set the external ID for cross-account trust policies.
    #[must_use]
    pub fn with_external_id(mut self, external_id: impl Into<String>) -> Self {
        self.external_id = Some(external_id.into());
        self
    }

    /// Pin the account ID used in synthesized ARNs.
    #[must_use]
    pub fn with_account_id(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = Some(account_id.into());
        self
    }

    /// Pin the partition used in synthesized ARNs.
    #[must_use]
    pub fn with_partition(mut self, partition: impl Into<String>) -> Self {
        self.partition = Some(partition.into());
        self
    }

    /// The STS session name, falling back to [`DEFAULT_SESSION_NAME`].
    pub fn session_name_or_default(&self) -> &str {
        self.session_name.as_deref().unwrap_or(DEFAULT_SESSION_NAME)
    }

    /// Reject configurations that cannot produce a usable client or ARN.
    pub fn validate(&self) -> Result<(), AwsProviderError> {
        if self.region.trim().is_empty() {
            return Err(AwsProviderError::Configuration(
                "region must not be empty".to_owned(),
            ));
        }
        if let Some(account_id) = &self.account_id
            && (account_id.len() != 12 || !account_id.chars().all(|c| c.is_ascii_digit()))
        {
            return Err(AwsProviderError::Configuration(format!(
                "account_id '{account_id}' must be 12 digits"
            )));
        }
        if let Some(partition) = &self.partition
            && partition.trim().is_empty()
        {
            return Err(AwsProviderError::Configuration(
                "partition must not be empty when set".to_owned(),
            ));
        }
        Ok(())
    }
}

impl Default for AwsBaseConfig {
    fn default() -> Self {
        Self::new("us-east-1")
    }
}
