use aws_config::ConfigLoader;
use tracing::{debug, info};

use crate::config::AwsBaseConfig;

/// Environment-chain loader pinned to the configured region and endpoint.
fn base_loader(config: &AwsBaseConfig) -> ConfigLoader {
    let mut loader = aws_config::from_env().region(aws_config::Region::new(config.region.clone()));
    if let Some(endpoint) = &config.endpoint_url {
        debug!(endpoint = %endpoint, "using custom AWS endpoint");
        loader = loader.endpoint_url(endpoint);
    }
    loader
}

/// Build an AWS SDK configuration from the given [`AwsBaseConfig`].
///
/// Credentials come from the standard SDK environment chain. When `role_arn`
/// is set, the chain's credentials are used to assume that role through STS;
/// the SDK's `AssumeRoleProvider` refreshes the session before it expires.
///
/// # Examples
///
/// ```no_run
/// use dxlookup_aws::config::AwsBaseConfig;
/// use dxlookup_aws::auth::build_sdk_config;
///
/// # async fn example() {
/// let config = AwsBaseConfig::new("us-east-1")
///     .with_endpoint_url("http://localhost:4566");
/// let sdk_config = build_sdk_config(&config).await;
/// # }
/// ```
pub async fn build_sdk_config(config: &AwsBaseConfig) -> aws_config::SdkConfig {
    let Some(role_arn) = &config.role_arn else {
        return base_loader(config).load().await;
    };

    let session_name = config.session_name_or_default();
    info!(role_arn = %role_arn, session_name = %session_name, "assuming IAM role via STS");

    // STS itself is called with the base chain credentials.
    let base_config = base_loader(config).load().await;

    let mut provider_builder = aws_config::sts::AssumeRoleProvider::builder(role_arn)
        .session_name(session_name)
        .region(aws_config::Region::new(config.region.clone()));
    if let Some(external_id) = &config.external_id {
        provider_builder = provider_builder.external_id(external_id);
    }
    let assume_role_provider = provider_builder.configure(&base_config).build().await;

    base_loader(config)
        .credentials_provider(assume_role_provider)
        .load()
        .await
}
