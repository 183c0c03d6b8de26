use async_trait::async_trait;

use crate::ProviderError;
use crate::schema::AttributeSchema;

/// Trait for providers that can look up external resource state.
///
/// This is the surface a declarative configuration engine talks to: it passes
/// the user's filter arguments as a JSON object and receives the resolved
/// resource as a flat JSON object of attributes.
#[async_trait]
pub trait ResourceLookup: Send + Sync {
    /// Look up a resource by type and parameters.
    ///
    /// Returns a JSON object containing the resource's attributes.
    async fn lookup(
        &self,
        resource_type: &str,
        params: &serde_json::Value,
    ) -> Result<serde_json::Value, ProviderError>;

    /// Returns the list of resource types this provider supports.
    fn supported_resource_types(&self) -> Vec<String>;

    /// Attribute schema for the given resource type, if the provider
    /// publishes one.
    fn schema(&self, _resource_type: &str) -> Option<&'static [AttributeSchema]> {
        None
    }
}
