use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use dxlookup_provider::schema::validate_params;
use dxlookup_provider::{AttributeSchema, AttributeType, ProviderError, ResourceLookup};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

use crate::arn::Arn;
use crate::auth::build_sdk_config;
use crate::config::AwsBaseConfig;
use crate::context::DeploymentContext;
use crate::error::{AwsProviderError, LookupError, classify_service_error};

/// ARN service namespace for Direct Connect.
pub const SERVICE: &str = "directconnect";

/// ARN resource prefix for dedicated connections.
pub const CONNECTION_RESOURCE_PREFIX: &str = "dxcon";

/// Resource type served through [`ResourceLookup`].
pub const CONNECTION_RESOURCE_TYPE: &str = "connection";

/// Configuration for the Direct Connect data source.
#[derive(Clone, Serialize, Deserialize)]
pub struct DirectConnectConfig {
    /// Shared AWS configuration (region, role ARN, endpoint URL, overrides).
    #[serde(flatten)]
    pub aws: AwsBaseConfig,
}

impl std::fmt::Debug for DirectConnectConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectConnectConfig")
            .field("aws", &self.aws)
            .finish()
    }
}

impl DirectConnectConfig {
    /// Create a new `DirectConnectConfig` for the given AWS region.
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            aws: AwsBaseConfig::new(region),
        }
    }

    /// Set the endpoint URL override (for `LocalStack`).
    #[must_use]
    pub fn with_endpoint_url(mut self, endpoint_url: impl Into<String>) -> Self {
        self.aws.endpoint_url = Some(endpoint_url.into());
        self
    }

    /// Set the IAM role ARN to assume.
    #[must_use]
    pub fn with_role_arn(mut self, role_arn: impl Into<String>) -> Self {
        self.aws.role_arn = Some(role_arn.into());
        self
    }

    /// Set the STS session name for assume-role.
    #[must_use]
    pub fn with_session_name(mut self, session_name: impl Into<String>) -> Self {
        self.aws.session_name = Some(session_name.into());
        self
    }

    /// Set the external ID for cross-account trust policies.
    #[must_use]
    pub fn with_external_id(mut self, external_id: impl Into<String>) -> Self {
        self.aws.external_id = Some(external_id.into());
        self
    }

    /// Pin the account ID used in connection ARNs.
    #[must_use]
    pub fn with_account_id(mut self, account_id: impl Into<String>) -> Self {
        self.aws.account_id = Some(account_id.into());
        self
    }

    /// Pin the partition used in connection ARNs.
    #[must_use]
    pub fn with_partition(mut self, partition: impl Into<String>) -> Self {
        self.aws.partition = Some(partition.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Data model
// ---------------------------------------------------------------------------

/// Filter criteria for a connection lookup.
///
/// Both fields are optional; with neither set the lookup lists every
/// connection in the region and only succeeds if there is exactly one.
/// Empty strings count as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionQuery {
    /// Connection ID (e.g. `"dxcon-fg5678gh"`). Scopes the API request.
    #[serde(default)]
    pub id: Option<String>,

    /// Exact, case-sensitive connection name. Filters the response.
    #[serde(default)]
    pub name: Option<String>,
}

impl ConnectionQuery {
    pub fn by_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            name: None,
        }
    }

    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: Some(name.into()),
        }
    }

    fn id_filter(&self) -> Option<&str> {
        self.id.as_deref().filter(|s| !s.is_empty())
    }

    fn name_filter(&self) -> Option<&str> {
        self.name.as_deref().filter(|s| !s.is_empty())
    }
}

/// A Direct Connect connection as returned by `DescribeConnections`.
///
/// Values absent on the wire are empty strings, `false` or `0`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionRecord {
    pub id: String,
    pub name: String,
    pub state: String,
    pub location: String,
    pub bandwidth: String,
    pub jumbo_frame_capable: bool,
    /// `"unknown"`, `"yes"` or `"no"`.
    pub has_logical_redundancy: String,
    pub aws_device: String,
    pub vlan: i32,
    pub tags: BTreeMap<String, String>,
}

impl From<&aws_sdk_directconnect::types::Connection> for ConnectionRecord {
    fn from(c: &aws_sdk_directconnect::types::Connection) -> Self {
        Self {
            id: c.connection_id().unwrap_or_default().to_owned(),
            name: c.connection_name().unwrap_or_default().to_owned(),
            state: c
                .connection_state()
                .map(|s| s.as_str().to_owned())
                .unwrap_or_default(),
            location: c.location().unwrap_or_default().to_owned(),
            bandwidth: c.bandwidth().unwrap_or_default().to_owned(),
            jumbo_frame_capable: c.jumbo_frame_capable().unwrap_or(false),
            has_logical_redundancy: c
                .has_logical_redundancy()
                .map(|r| r.as_str().to_owned())
                .unwrap_or_default(),
            aws_device: c.aws_device_v2().unwrap_or_default().to_owned(),
            vlan: c.vlan(),
            tags: c
                .tags()
                .iter()
                .map(|t| (t.key().to_owned(), t.value().unwrap_or_default().to_owned()))
                .collect(),
        }
    }
}

/// The attributes a connection lookup exposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionOutput {
    pub id: String,
    pub arn: String,
    pub state: String,
    pub location: String,
    pub bandwidth: String,
    pub jumbo_frame_capable: bool,
    pub has_logical_redundancy: String,
    pub name: String,
    pub aws_device: String,
    pub vlan: i32,
    pub tags: BTreeMap<String, String>,
}

impl ConnectionOutput {
    fn project(record: ConnectionRecord, context: &DeploymentContext) -> Self {
        let arn = connection_arn(context, &record.id).to_string();
        Self {
            id: record.id,
            arn,
            state: record.state,
            location: record.location,
            bandwidth: record.bandwidth,
            jumbo_frame_capable: record.jumbo_frame_capable,
            has_logical_redundancy: record.has_logical_redundancy,
            name: record.name,
            aws_device: record.aws_device,
            vlan: record.vlan,
            tags: record.tags,
        }
    }
}

/// Attribute schema of the `connection` data source.
pub const CONNECTION_SCHEMA: &[AttributeSchema] = &[
    AttributeSchema::optional_computed("id", AttributeType::String, "Connection ID."),
    AttributeSchema::computed("arn", AttributeType::String, "ARN of the connection."),
    AttributeSchema::computed("state", AttributeType::String, "Lifecycle state."),
    AttributeSchema::computed("location", AttributeType::String, "Location code."),
    AttributeSchema::computed("bandwidth", AttributeType::String, "Port bandwidth."),
    AttributeSchema::computed(
        "jumbo_frame_capable",
        AttributeType::Bool,
        "Whether jumbo frames (9001 MTU) are supported.",
    ),
    AttributeSchema::computed(
        "has_logical_redundancy",
        AttributeType::String,
        "Whether the connection supports a secondary BGP peer: unknown, yes or no.",
    ),
    AttributeSchema::optional("name", AttributeType::String, "Connection name."),
    AttributeSchema::computed(
        "aws_device",
        AttributeType::String,
        "Direct Connect endpoint terminating the connection.",
    ),
    AttributeSchema::computed("vlan", AttributeType::Int, "VLAN ID."),
    AttributeSchema::computed("tags", AttributeType::Map, "Resource tags."),
];

// ---------------------------------------------------------------------------
// Remote API
// ---------------------------------------------------------------------------

/// The slice of the Direct Connect API the lookups need.
///
/// Implemented for the SDK client; tests substitute fakes.
#[async_trait]
pub trait DirectConnectApi: Send + Sync {
    /// `DescribeConnections`, scoped to one connection ID when given.
    async fn describe_connections(
        &self,
        connection_id: Option<&str>,
    ) -> Result<Vec<ConnectionRecord>, AwsProviderError>;

    /// `DescribeLocations`, returning location codes.
    async fn describe_locations(&self) -> Result<Vec<String>, AwsProviderError>;
}

#[async_trait]
impl DirectConnectApi for aws_sdk_directconnect::Client {
    async fn describe_connections(
        &self,
        connection_id: Option<&str>,
    ) -> Result<Vec<ConnectionRecord>, AwsProviderError> {
        let output = self
            .describe_connections()
            .set_connection_id(connection_id.map(str::to_owned))
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Direct Connect describe_connections failed");
                classify_service_error(&e)
            })?;

        Ok(output
            .connections()
            .iter()
            .map(ConnectionRecord::from)
            .collect())
    }

    async fn describe_locations(&self) -> Result<Vec<String>, AwsProviderError> {
        let output = self.describe_locations().send().await.map_err(|e| {
            error!(error = %e, "Direct Connect describe_locations failed");
            classify_service_error(&e)
        })?;

        Ok(output
            .locations()
            .iter()
            .filter_map(|l| l.location_code().map(str::to_owned))
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

/// ARN of the connection `connection_id` in `context`.
pub fn connection_arn(context: &DeploymentContext, connection_id: &str) -> Arn {
    context.arn(SERVICE, format!("{CONNECTION_RESOURCE_PREFIX}/{connection_id}"))
}

/// Resolve `query` to exactly one connection.
///
/// Issues a single `DescribeConnections` call (scoped by ID when the query has
/// one), filters by exact name, and projects the sole survivor. API failures
/// are returned unchanged as [`LookupError::Remote`].
#[instrument(skip(api, context), fields(region = %context.region))]
pub async fn lookup_connection<A>(
    api: &A,
    query: &ConnectionQuery,
    context: &DeploymentContext,
) -> Result<ConnectionOutput, LookupError>
where
    A: DirectConnectApi + ?Sized,
{
    let id = query.id_filter();
    debug!(connection_id = ?id, "describing Direct Connect connections");
    let mut connections = api.describe_connections(id).await?;

    if let Some(name) = query.name_filter() {
        debug!(connection_name = name, "filtering Direct Connect connections by name");
        connections.retain(|c| c.name == name);
    }

    if connections.len() > 1 {
        debug!(count = connections.len(), "lookup matched more than one connection");
        return Err(LookupError::AmbiguousMatch);
    }
    let Some(connection) = connections.pop() else {
        debug!("lookup matched no connections");
        return Err(LookupError::NoMatch);
    };

    info!(connection_id = %connection.id, "resolved Direct Connect connection");
    Ok(ConnectionOutput::project(connection, context))
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

/// AWS Direct Connect data source.
pub struct DirectConnectProvider {
    config: DirectConnectConfig,
    api: Arc<dyn DirectConnectApi>,
    context: DeploymentContext,
}

impl std::fmt::Debug for DirectConnectProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectConnectProvider")
            .field("config", &self.config)
            .field("api", &"<DirectConnectApi>")
            .field("context", &self.context)
            .finish()
    }
}

impl DirectConnectProvider {
    /// Create a provider backed by the AWS SDK.
    ///
    /// Builds the SDK configuration and resolves the deployment context,
    /// calling STS unless both account and partition are configured.
    pub async fn new(config: DirectConnectConfig) -> Result<Self, AwsProviderError> {
        config.aws.validate()?;
        let sdk_config = build_sdk_config(&config.aws).await;
        let sts = aws_sdk_sts::Client::new(&sdk_config);
        let context = DeploymentContext::resolve(&config.aws, &sts).await?;
        let client = aws_sdk_directconnect::Client::new(&sdk_config);
        Ok(Self::with_client(config, Arc::new(client), context))
    }

    /// Create a provider with a pre-built API client and context.
    pub fn with_client(
        config: DirectConnectConfig,
        api: Arc<dyn DirectConnectApi>,
        context: DeploymentContext,
    ) -> Self {
        Self {
            config,
            api,
            context,
        }
    }

    #[allow(clippy::unused_self, clippy::unnecessary_literal_bound)]
    pub fn name(&self) -> &str {
        "aws-directconnect"
    }

    pub fn context(&self) -> &DeploymentContext {
        &self.context
    }

    /// Typed connection lookup in this provider's deployment context.
    pub async fn lookup_connection(
        &self,
        query: &ConnectionQuery,
    ) -> Result<ConnectionOutput, LookupError> {
        lookup_connection(self.api.as_ref(), query, &self.context).await
    }

    /// Verify the Direct Connect API is reachable.
    #[instrument(skip(self), fields(provider = "aws-directconnect"))]
    pub async fn health_check(&self) -> Result<(), ProviderError> {
        debug!("performing Direct Connect health check via describe_locations");
        let locations = self.api.describe_locations().await.map_err(|e| {
            error!(error = %e, "Direct Connect health check failed");
            ProviderError::Connection(format!("Direct Connect health check failed: {e}"))
        })?;
        info!(locations = locations.len(), "Direct Connect health check passed");
        Ok(())
    }
}

#[async_trait]
impl ResourceLookup for DirectConnectProvider {
    async fn lookup(
        &self,
        resource_type: &str,
        params: &serde_json::Value,
    ) -> Result<serde_json::Value, ProviderError> {
        match resource_type {
            CONNECTION_RESOURCE_TYPE => {
                validate_params(CONNECTION_SCHEMA, params)?;
                let query: ConnectionQuery = if params.is_null() {
                    ConnectionQuery::default()
                } else {
                    serde_json::from_value(params.clone())
                        .map_err(|e| ProviderError::Serialization(e.to_string()))?
                };

                let output = self.lookup_connection(&query).await?;
                serde_json::to_value(output)
                    .map_err(|e| ProviderError::Serialization(e.to_string()))
            }
            other => Err(ProviderError::Configuration(format!(
                "unsupported resource type '{other}' for Direct Connect provider \
                 (supported: '{CONNECTION_RESOURCE_TYPE}')"
            ))),
        }
    }

    fn supported_resource_types(&self) -> Vec<String> {
        vec![CONNECTION_RESOURCE_TYPE.to_owned()]
    }

    fn schema(&self, resource_type: &str) -> Option<&'static [AttributeSchema]> {
        (resource_type == CONNECTION_RESOURCE_TYPE).then_some(CONNECTION_SCHEMA)
    }
}
