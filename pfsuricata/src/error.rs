use thiserror::Error;

/// Errors that abort a reconciliation run. None of them are retried.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReconcileError {
    /// A key field carries characters outside `[A-Za-z0-9_]`.
    #[error("The field '{field}' contains invalid characters.")]
    Validation { field: &'static str },
    /// More than one record matches a key that must be unique.
    #[error("Found multiple {what} for {field} {value}.")]
    AmbiguousRecord {
        what: &'static str,
        field: &'static str,
        value: String,
    },
    /// The parent configuration section is missing from the document.
    #[error("{message}")]
    MissingCollection { message: &'static str },
    /// A stored field could not be decoded for reporting.
    #[error("stored field '{field}' is not valid base64-encoded UTF-8 text")]
    Decode { field: &'static str },
}
