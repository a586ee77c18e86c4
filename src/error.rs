use thiserror::Error;

/// Main error type of the binding engine.
/// Aggregates errors from the backend and the internal modules.
#[derive(Error, Debug)]
pub enum BindError {
    #[error("{0}")]
    WithContextError(String),

    /// Failure reported by a format backend
    #[error("{0}")]
    BackendError(#[from] anyhow::Error),

    // Configuration errors, raised before streaming begins
    #[error("{0}")]
    AddressError(#[from] crate::spreadsheet::reference::AddressError),

    #[error("{0}")]
    ConfigurationError(#[from] crate::database::table::ConfigurationError),

    // Session errors
    #[error("{0}")]
    MappingError(#[from] crate::database::resolver::MappingError),

    #[error("{0}")]
    DataShapeError(#[from] crate::spreadsheet::DataShapeError),

    /// The caller cancelled the session; not a failure
    #[error("Operation cancelled")]
    Cancelled,
}

impl BindError {
    /// Returns true for invalid configuration, detected before any row is read.
    pub fn is_configuration(&self) -> bool {
        matches!(self, BindError::AddressError(_) | BindError::ConfigurationError(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, BindError::Cancelled)
    }
}

pub(crate) trait ResultMessage {
    fn with_prefix(self, message: &str) -> Self;
}

impl<T> ResultMessage for Result<T, BindError> {
    /// Prefixes the error message with context; cancellation is left intact.
    fn with_prefix(self, message: &str) -> Self {
        self.map_err(|e| match e {
            BindError::Cancelled => e,
            e => BindError::WithContextError(format!("{}: {}", message, e)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::resolver::MappingError;

    #[test]
    fn test_with_prefix() {
        let result: Result<(), BindError> = Err(MappingError::NoColumns.into());
        let error = result.with_prefix("Sheet 'Staff'").unwrap_err();
        assert_eq!(error.to_string(), "Sheet 'Staff': None of the declared columns matches the header");

        let result: Result<(), BindError> = Err(BindError::Cancelled);
        assert!(result.with_prefix("Sheet 'Staff'").unwrap_err().is_cancelled());
    }

    #[test]
    fn test_taxonomy() {
        let error: BindError = crate::spreadsheet::reference::AddressError::ArgumentError.into();
        assert!(error.is_configuration());
        assert!(!error.is_cancelled());
        let error: BindError = anyhow::anyhow!("disk on fire").into();
        assert_eq!(error.to_string(), "disk on fire");
        assert!(!error.is_configuration());
    }
}
