//! Attribute schemas for data sources.
//!
//! A data source declares which attributes a caller may set (`optional`) and
//! which ones are filled in by the lookup (`computed`). An attribute can be
//! both, in which case the caller's value acts as a filter and the lookup
//! result overwrites it.

use serde::Serialize;

use crate::ProviderError;

/// The value type of a data source attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    String,
    Int,
    Bool,
    /// A string-to-string map.
    Map,
}

impl AttributeType {
    fn accepts(self, value: &serde_json::Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Int => value.is_i64() || value.is_u64(),
            Self::Bool => value.is_boolean(),
            Self::Map => value
                .as_object()
                .is_some_and(|m| m.values().all(serde_json::Value::is_string)),
        }
    }
}

/// Description of a single data source attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AttributeSchema {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub attr_type: AttributeType,
    /// The caller may supply this attribute as a lookup argument.
    pub optional: bool,
    /// The lookup fills this attribute in.
    pub computed: bool,
    pub description: &'static str,
}

impl AttributeSchema {
    /// An attribute the caller may set but the lookup never writes.
    pub const fn optional(
        name: &'static str,
        attr_type: AttributeType,
        description: &'static str,
    ) -> Self {
        Self {
            name,
            attr_type,
            optional: true,
            computed: false,
            description,
        }
    }

    /// An attribute written only by the lookup.
    pub const fn computed(
        name: &'static str,
        attr_type: AttributeType,
        description: &'static str,
    ) -> Self {
        Self {
            name,
            attr_type,
            optional: false,
            computed: true,
            description,
        }
    }

    /// An attribute the caller may set as a filter and the lookup overwrites.
    pub const fn optional_computed(
        name: &'static str,
        attr_type: AttributeType,
        description: &'static str,
    ) -> Self {
        Self {
            name,
            attr_type,
            optional: true,
            computed: true,
            description,
        }
    }
}

/// Check lookup parameters against a data source schema.
///
/// `params` must be a JSON object (or `null`, meaning no arguments). Every key
/// must name an attribute the caller is allowed to set, and its value must
/// match the attribute type. `null` values are treated as absent.
pub fn validate_params(
    schema: &[AttributeSchema],
    params: &serde_json::Value,
) -> Result<(), ProviderError> {
    let map = match params {
        serde_json::Value::Null => return Ok(()),
        serde_json::Value::Object(map) => map,
        other => {
            return Err(ProviderError::Configuration(format!(
                "lookup parameters must be an object, got {other}"
            )));
        }
    };

    for (key, value) in map {
        let Some(attr) = schema.iter().find(|a| a.name == key) else {
            return Err(ProviderError::Configuration(format!(
                "unknown attribute '{key}'"
            )));
        };
        if !attr.optional {
            return Err(ProviderError::Configuration(format!(
                "attribute '{key}' is computed and cannot be set"
            )));
        }
        if !value.is_null() && !attr.attr_type.accepts(value) {
            return Err(ProviderError::Configuration(format!(
                "attribute '{key}' expects a value of type {:?}",
                attr.attr_type
            )));
        }
    }
    Ok(())
}
