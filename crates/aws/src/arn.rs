//! Amazon Resource Names.
//!
//! An ARN has six colon-separated sections:
//! `arn:partition:service:region:account-id:resource`. The resource section
//! may itself contain colons.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AwsProviderError;

const PREFIX: &str = "arn";

/// A parsed or synthesized Amazon Resource Name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Arn {
    pub partition: String,
    pub service: String,
    pub region: String,
    pub account_id: String,
    pub resource: String,
}

impl Arn {
    pub fn new(
        partition: impl Into<String>,
        service: impl Into<String>,
        region: impl Into<String>,
        account_id: impl Into<String>,
        resource: impl Into<String>,
    ) -> Self {
        Self {
            partition: partition.into(),
            service: service.into(),
            region: region.into(),
            account_id: account_id.into(),
            resource: resource.into(),
        }
    }
}

impl fmt::Display for Arn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{PREFIX}:{}:{}:{}:{}:{}",
            self.partition, self.service, self.region, self.account_id, self.resource
        )
    }
}

impl FromStr for Arn {
    type Err = AwsProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid =
            |reason: &str| AwsProviderError::Configuration(format!("invalid ARN '{s}': {reason}"));

        let mut sections = s.splitn(6, ':');
        if sections.next() != Some(PREFIX) {
            return Err(invalid("must start with 'arn:'"));
        }
        let (Some(partition), Some(service), Some(region), Some(account_id), Some(resource)) = (
            sections.next(),
            sections.next(),
            sections.next(),
            sections.next(),
            sections.next(),
        ) else {
            return Err(invalid("expected 6 colon-separated sections"));
        };
        if partition.is_empty() {
            return Err(invalid("partition is empty"));
        }
        if service.is_empty() {
            return Err(invalid("service is empty"));
        }
        if resource.is_empty() {
            return Err(invalid("resource is empty"));
        }
        Ok(Self::new(partition, service, region, account_id, resource))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_joins_sections() {
        let arn = Arn::new(
            "aws",
            "directconnect",
            "us-west-2",
            "123456789012",
            "dxcon/dxcon-fg5678gh",
        );
        assert_eq!(
            arn.to_string(),
            "arn:aws:directconnect:us-west-2:123456789012:dxcon/dxcon-fg5678gh"
        );
    }

    #[test]
    fn parses_role_arn_with_empty_region() {
        let arn: Arn = "arn:aws-us-gov:iam::123456789012:role/network-readonly"
            .parse()
            .unwrap();
        assert_eq!(arn.partition, "aws-us-gov");
        assert_eq!(arn.service, "iam");
        assert_eq!(arn.region, "");
        assert_eq!(arn.account_id, "123456789012");
        assert_eq!(arn.resource, "role/network-readonly");
    }

    #[test]
    fn resource_may_contain_colons() {
        let arn: Arn = "arn:aws:logs:us-east-1:123456789012:log-group:/dx/flow:*"
            .parse()
            .unwrap();
        assert_eq!(arn.resource, "log-group:/dx/flow:*");
        assert_eq!(
            arn.to_string(),
            "arn:aws:logs:us-east-1:123456789012:log-group:/dx/flow:*"
        );
    }

    #[test]
    fn rejects_missing_prefix() {
        let err = "aws:iam::123456789012:root".parse::<Arn>().unwrap_err();
        assert!(err.to_string().contains("must start with 'arn:'"));
    }

    #[test]
    fn rejects_too_few_sections() {
        let err = "arn:aws:iam::123456789012".parse::<Arn>().unwrap_err();
        assert!(err.to_string().contains("6 colon-separated sections"));
    }

    #[test]
    fn rejects_empty_partition() {
        assert!("arn::iam::123456789012:root".parse::<Arn>().is_err());
    }
}
