//! Drives the Direct Connect data source through the lookup registry, the
//! way a configuration engine would.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dxlookup_aws::{
    AwsProviderError, ConnectionRecord, DeploymentContext, DirectConnectApi, DirectConnectConfig,
    DirectConnectProvider,
};
use dxlookup_provider::{LookupRegistry, ProviderError};

struct StaticApi(Vec<ConnectionRecord>);

#[async_trait]
impl DirectConnectApi for StaticApi {
    async fn describe_connections(
        &self,
        connection_id: Option<&str>,
    ) -> Result<Vec<ConnectionRecord>, AwsProviderError> {
        Ok(self
            .0
            .iter()
            .filter(|c| connection_id.is_none_or(|id| c.id == id))
            .cloned()
            .collect())
    }

    async fn describe_locations(&self) -> Result<Vec<String>, AwsProviderError> {
        Ok(Vec::new())
    }
}

fn record(id: &str, name: &str, state: &str) -> ConnectionRecord {
    ConnectionRecord {
        id: id.to_owned(),
        name: name.to_owned(),
        state: state.to_owned(),
        location: "EqDC2".to_owned(),
        bandwidth: "1Gbps".to_owned(),
        has_logical_redundancy: "unknown".to_owned(),
        ..ConnectionRecord::default()
    }
}

fn registry(connections: Vec<ConnectionRecord>) -> LookupRegistry {
    let provider = DirectConnectProvider::with_client(
        DirectConnectConfig::new("us-west-2"),
        Arc::new(StaticApi(connections)),
        DeploymentContext::new("aws", "us-west-2", "123456789012"),
    );
    let mut registry = LookupRegistry::new().with_timeout(Duration::from_secs(5));
    registry.register("aws-directconnect", Arc::new(provider));
    registry
}

#[tokio::test]
async fn nonexistent_connection_reports_no_results() {
    let registry = registry(Vec::new());
    let err = registry
        .lookup(
            "aws-directconnect",
            "connection",
            &serde_json::json!({"id": "dxcon-00000000"}),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::NotFound(_)));
    assert_eq!(
        err.to_string(),
        "Your query returned no results. Please change your search criteria and try again."
    );
}

#[tokio::test]
async fn lookup_by_id_matches_created_connection() {
    let registry = registry(vec![
        record("dxcon-wrong001", "tf-dx-abcde-wrong", "requested"),
        record("dxcon-test0001", "tf-dx-abcde", "requested"),
    ]);
    let value = registry
        .lookup(
            "aws-directconnect",
            "connection",
            &serde_json::json!({"id": "dxcon-test0001"}),
        )
        .await
        .unwrap();

    assert_eq!(value["id"], "dxcon-test0001");
    assert_eq!(value["name"], "tf-dx-abcde");
    assert_eq!(value["state"], "requested");
    assert_eq!(value["location"], "EqDC2");
    assert_eq!(value["bandwidth"], "1Gbps");
    assert_eq!(value["jumbo_frame_capable"], false);
    assert_eq!(
        value["arn"],
        "arn:aws:directconnect:us-west-2:123456789012:dxcon/dxcon-test0001"
    );
}

#[tokio::test]
async fn unfiltered_lookup_over_several_is_ambiguous() {
    let registry = registry(vec![
        record("dxcon-a", "a", "available"),
        record("dxcon-b", "b", "available"),
        record("dxcon-c", "c", "down"),
    ]);
    let err = registry
        .lookup("aws-directconnect", "connection", &serde_json::json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::Ambiguous(_)));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn unregistered_provider_is_reported() {
    let registry = registry(Vec::new());
    let err = registry
        .lookup("aws-ec2", "connection", &serde_json::json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::UnknownProvider(_)));
}
