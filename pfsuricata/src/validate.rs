use crate::error::ReconcileError;

/// Check that a key field value only uses `[A-Za-z0-9_]` and is not empty.
pub fn validate_key(field: &'static str, value: &str) -> Result<(), ReconcileError> {
    let valid = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(ReconcileError::Validation { field })
    }
}
