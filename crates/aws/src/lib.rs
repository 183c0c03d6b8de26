//! AWS data sources for dxlookup.
//!
//! - **Direct Connect** — look up a single dedicated connection by ID and/or
//!   name and expose its attributes, including a synthesized ARN.
//!
//! Lookups share a common [`AwsBaseConfig`](config::AwsBaseConfig) for
//! region, endpoint override, optional STS assume-role credentials, and
//! account/partition overrides. ARNs are built from an explicit
//! [`DeploymentContext`](context::DeploymentContext).

pub mod arn;
pub mod auth;
pub mod config;
pub mod context;
pub mod directconnect;
pub mod error;

// Re-exports for convenience.
pub use arn::Arn;
pub use config::AwsBaseConfig;
pub use context::{CallerIdentity, DeploymentContext, IdentitySource};
pub use directconnect::{
    ConnectionOutput, ConnectionQuery, ConnectionRecord, DirectConnectApi, DirectConnectConfig,
    DirectConnectProvider, lookup_connection,
};
pub use error::{AwsProviderError, LookupError};
