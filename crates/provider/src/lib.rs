pub mod error;
pub mod registry;
pub mod resource_lookup;
pub mod schema;

pub use error::ProviderError;
pub use registry::LookupRegistry;
pub use resource_lookup::ResourceLookup;
pub use schema::{AttributeSchema, AttributeType};
