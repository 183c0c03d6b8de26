use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::error::ProviderError;
use crate::resource_lookup::ResourceLookup;

/// Default time allowed for a single lookup.
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(30);

/// A named collection of lookup providers.
///
/// The registry is what a configuration engine holds: it routes
/// `(provider, resource_type, params)` triples to the registered
/// [`ResourceLookup`] and bounds each call with a timeout.
pub struct LookupRegistry {
    lookups: HashMap<String, Arc<dyn ResourceLookup>>,
    timeout: Duration,
}

impl std::fmt::Debug for LookupRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.lookups.keys().collect();
        names.sort();
        f.debug_struct("LookupRegistry")
            .field("lookups", &names)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Default for LookupRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl LookupRegistry {
    /// Create an empty registry with the default timeout.
    pub fn new() -> Self {
        Self {
            lookups: HashMap::new(),
            timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }

    /// Set the per-lookup timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Register a lookup provider under `name`, replacing any previous entry.
    pub fn register(&mut self, name: impl Into<String>, lookup: Arc<dyn ResourceLookup>) {
        let name = name.into();
        if self.lookups.insert(name.clone(), lookup).is_some() {
            warn!(provider = %name, "replaced existing lookup provider");
        }
    }

    /// Fetch a registered provider by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn ResourceLookup>> {
        self.lookups.get(name).map(Arc::clone)
    }

    /// Sorted names of all registered providers.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.lookups.keys().cloned().collect();
        names.sort();
        names
    }

    /// Run a lookup against the named provider.
    ///
    /// Fails with [`ProviderError::UnknownProvider`] if no provider is
    /// registered under `provider`, with [`ProviderError::Configuration`] if
    /// the provider does not serve `resource_type`, and with
    /// [`ProviderError::Timeout`] if the call exceeds the registry timeout.
    pub async fn lookup(
        &self,
        provider: &str,
        resource_type: &str,
        params: &serde_json::Value,
    ) -> Result<serde_json::Value, ProviderError> {
        let Some(lookup) = self.get(provider) else {
            return Err(ProviderError::UnknownProvider(provider.to_owned()));
        };

        let supported = lookup.supported_resource_types();
        if !supported.iter().any(|t| t == resource_type) {
            return Err(ProviderError::Configuration(format!(
                "provider '{provider}' does not support resource type '{resource_type}' \
                 (supported: {})",
                supported.join(", ")
            )));
        }

        let start = Instant::now();
        let result = tokio::time::timeout(self.timeout, lookup.lookup(resource_type, params)).await;
        let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        match result {
            Ok(Ok(data)) => {
                debug!(provider, resource_type, elapsed_ms, "lookup succeeded");
                Ok(data)
            }
            Ok(Err(e)) => {
                warn!(provider, resource_type, elapsed_ms, error = %e, "lookup failed");
                Err(e)
            }
            Err(_) => {
                warn!(provider, resource_type, elapsed_ms, "lookup timed out");
                Err(ProviderError::Timeout(self.timeout))
            }
        }
    }
}
