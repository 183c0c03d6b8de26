use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::arn::Arn;
use crate::config::AwsBaseConfig;
use crate::error::{AwsProviderError, classify_service_error};

/// The caller's AWS identity as reported by STS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    pub account_id: String,
    pub arn: String,
}

/// Anything that can report who the configured credentials belong to.
#[async_trait]
pub trait IdentitySource: Send + Sync {
    async fn caller_identity(&self) -> Result<CallerIdentity, AwsProviderError>;
}

#[async_trait]
impl IdentitySource for aws_sdk_sts::Client {
    async fn caller_identity(&self) -> Result<CallerIdentity, AwsProviderError> {
        let output = self.get_caller_identity().send().await.map_err(|e| {
            error!(error = %e, "STS get_caller_identity failed");
            match classify_service_error(&e) {
                AwsProviderError::ServiceError(msg) => AwsProviderError::CredentialError(msg),
                other => other,
            }
        })?;

        let (Some(account_id), Some(arn)) = (output.account(), output.arn()) else {
            return Err(AwsProviderError::CredentialError(
                "STS caller identity is missing the account or ARN".to_owned(),
            ));
        };
        Ok(CallerIdentity {
            account_id: account_id.to_owned(),
            arn: arn.to_owned(),
        })
    }
}

/// Partition implied by a region name.
///
/// Unknown prefixes belong to the commercial `aws` partition.
pub fn partition_for_region(region: &str) -> &'static str {
    if region.starts_with("cn-") {
        "aws-cn"
    } else if region.starts_with("us-gov-") {
        "aws-us-gov"
    } else if region.starts_with("us-isob-") {
        "aws-iso-b"
    } else if region.starts_with("us-iso-") {
        "aws-iso"
    } else {
        "aws"
    }
}

/// Where lookups run: partition, region and account.
///
/// Everything a lookup needs to synthesize ARNs. It is passed explicitly to
/// each lookup rather than read from process-wide state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentContext {
    pub partition: String,
    pub region: String,
    pub account_id: String,
}

impl DeploymentContext {
    pub fn new(
        partition: impl Into<String>,
        region: impl Into<String>,
        account_id: impl Into<String>,
    ) -> Self {
        Self {
            partition: partition.into(),
            region: region.into(),
            account_id: account_id.into(),
        }
    }

    /// Build the ARN of a resource owned by this deployment.
    pub fn arn(&self, service: &str, resource: impl Into<String>) -> Arn {
        Arn::new(
            self.partition.clone(),
            service,
            self.region.clone(),
            self.account_id.clone(),
            resource,
        )
    }

    /// Resolve the context for `config`.
    ///
    /// The region always comes from the config. Explicit `account_id` and
    /// `partition` overrides win; otherwise STS is asked once for the caller
    /// identity, whose ARN carries the partition. If the caller ARN cannot be
    /// parsed the partition falls back to the one implied by the region.
    pub async fn resolve(
        config: &AwsBaseConfig,
        identity: &dyn IdentitySource,
    ) -> Result<Self, AwsProviderError> {
        config.validate()?;

        if let (Some(account_id), Some(partition)) = (&config.account_id, &config.partition) {
            debug!(
                account_id = %account_id,
                partition = %partition,
                "using configured deployment context"
            );
            return Ok(Self::new(partition, &config.region, account_id));
        }

        let caller = identity.caller_identity().await?;
        let account_id = config.account_id.clone().unwrap_or(caller.account_id);
        let partition = match (&config.partition, caller.arn.parse::<Arn>()) {
            (Some(partition), _) => partition.clone(),
            (None, Ok(arn)) => arn.partition,
            (None, Err(e)) => {
                debug!(error = %e, "caller ARN unparseable, deriving partition from region");
                partition_for_region(&config.region).to_owned()
            }
        };

        info!(
            partition = %partition,
            region = %config.region,
            account_id = %account_id,
            "resolved deployment context"
        );
        Ok(Self::new(partition, &config.region, account_id))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    struct FakeIdentity {
        result: Result<CallerIdentity, String>,
        calls: AtomicUsize,
    }

    impl FakeIdentity {
        fn ok(account_id: &str, arn: &str) -> Self {
            Self {
                result: Ok(CallerIdentity {
                    account_id: account_id.to_owned(),
                    arn: arn.to_owned(),
                }),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing(msg: &str) -> Self {
            Self {
                result: Err(msg.to_owned()),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl IdentitySource for FakeIdentity {
        async fn caller_identity(&self) -> Result<CallerIdentity, AwsProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result
                .clone()
                .map_err(AwsProviderError::CredentialError)
        }
    }

    #[test]
    fn partition_for_region_prefixes() {
        assert_eq!(partition_for_region("us-east-1"), "aws");
        assert_eq!(partition_for_region("eu-central-1"), "aws");
        assert_eq!(partition_for_region("cn-northwest-1"), "aws-cn");
        assert_eq!(partition_for_region("us-gov-west-1"), "aws-us-gov");
        assert_eq!(partition_for_region("us-iso-east-1"), "aws-iso");
        assert_eq!(partition_for_region("us-isob-east-1"), "aws-iso-b");
    }

    #[test]
    fn arn_uses_context_fields() {
        let ctx = DeploymentContext::new("aws", "us-west-2", "123456789012");
        assert_eq!(
            ctx.arn("directconnect", "dxcon/dxcon-abc").to_string(),
            "arn:aws:directconnect:us-west-2:123456789012:dxcon/dxcon-abc"
        );
    }

    #[tokio::test]
    async fn overrides_skip_sts() {
        let config = AwsBaseConfig::new("us-west-2")
            .with_account_id("123456789012")
            .with_partition("aws");
        let identity = FakeIdentity::failing("should not be called");

        let ctx = DeploymentContext::resolve(&config, &identity).await.unwrap();
        assert_eq!(ctx, DeploymentContext::new("aws", "us-west-2", "123456789012"));
        assert_eq!(identity.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn partition_comes_from_caller_arn() {
        let config = AwsBaseConfig::new("cn-north-1");
        let identity = FakeIdentity::ok(
            "210987654321",
            "arn:aws-cn:sts::210987654321:assumed-role/network/dxlookup",
        );

        let ctx = DeploymentContext::resolve(&config, &identity).await.unwrap();
        assert_eq!(ctx.partition, "aws-cn");
        assert_eq!(ctx.region, "cn-north-1");
        assert_eq!(ctx.account_id, "210987654321");
        assert_eq!(identity.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn configured_account_wins_over_caller() {
        let config = AwsBaseConfig::new("us-east-1").with_account_id("111111111111");
        let identity = FakeIdentity::ok("222222222222", "arn:aws:iam::222222222222:user/ops");

        let ctx = DeploymentContext::resolve(&config, &identity).await.unwrap();
        assert_eq!(ctx.account_id, "111111111111");
        assert_eq!(ctx.partition, "aws");
    }

    #[tokio::test]
    async fn unparseable_caller_arn_falls_back_to_region() {
        let config = AwsBaseConfig::new("us-gov-east-1");
        let identity = FakeIdentity::ok("333333333333", "not-an-arn");

        let ctx = DeploymentContext::resolve(&config, &identity).await.unwrap();
        assert_eq!(ctx.partition, "aws-us-gov");
    }

    #[tokio::test]
    async fn sts_failure_propagates() {
        let config = AwsBaseConfig::new("us-east-1");
        let identity = FakeIdentity::failing("no credentials in chain");

        let err = DeploymentContext::resolve(&config, &identity)
            .await
            .unwrap_err();
        assert!(
            matches!(err, AwsProviderError::CredentialError(ref m) if m.contains("no credentials"))
        );
    }

    #[tokio::test]
    async fn invalid_config_is_rejected_before_sts() {
        let config = AwsBaseConfig::new("");
        let identity = FakeIdentity::ok("123456789012", "arn:aws:iam::123456789012:root");

        let err = DeploymentContext::resolve(&config, &identity)
            .await
            .unwrap_err();
        assert!(matches!(err, AwsProviderError::Configuration(_)));
        assert_eq!(identity.calls.load(Ordering::SeqCst), 0);
    }
}
