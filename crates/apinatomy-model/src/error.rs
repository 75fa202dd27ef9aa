//! Hard failures of a model build.
//!
//! Everything that still leaves a usable model is logged through
//! [`crate::diagnostics::Logger`] instead. A [`ModelError`] means the input
//! could not be turned into typed resources without corrupting invariants
//! that later steps rely on.

use thiserror::Error;

use apinatomy_core::schema::ResourceClass;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("input is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("model must be a JSON object, found {found}")]
    NotAnObject { found: &'static str },

    #[error("invalid field `{field}` of {class} `{id}`: {reason}")]
    InvalidField {
        class: ResourceClass,
        id: String,
        field: String,
        reason: String,
    },

    #[error("references kept requiring new resources after {passes} passes")]
    Cyclic { passes: usize },
}

impl ModelError {
    pub(crate) fn invalid_field(
        class: ResourceClass,
        id: impl ToString,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidField {
            class,
            id: id.to_string(),
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Name of the JSON type of `value`, for error messages.
pub(crate) fn json_type(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_field_display() {
        let err = ModelError::invalid_field(ResourceClass::Lyph, "L1", "layers", "expected an array");
        assert_eq!(
            err.to_string(),
            "invalid field `layers` of Lyph `L1`: expected an array"
        );
    }
}
