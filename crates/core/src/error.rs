use crate::types::EntityId;

/// Domain-level error type.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: EntityId },

    #[error("Validation failed: {0}")]
    Validation(String),
}

impl CoreError {
    /// Flatten a `validator` report into a single `Validation` message.
    pub fn from_validation(errors: validator::ValidationErrors) -> Self {
        let mut parts: Vec<String> = Vec::new();
        for (field, errs) in errors.field_errors() {
            for err in errs {
                let msg = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| err.code.to_string());
                parts.push(format!("{field}: {msg}"));
            }
        }
        parts.sort();
        CoreError::Validation(parts.join("; "))
    }
}
