//! Error types for marlin.

use thiserror::Error;

/// The main error type for report operations.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Dataset name does not match any of the fixed base queries.
    #[error("Unknown dataset: '{0}'")]
    UnknownDataset(String),

    /// Column is not part of the dataset's select list.
    #[error("Unknown column '{column}' for dataset '{dataset}'")]
    InvalidColumn { dataset: String, column: String },

    /// Aggregation alias is not a plain identifier.
    #[error("Invalid aggregation alias: '{0}'")]
    InvalidAlias(String),

    /// Filter value has the wrong shape for its operator.
    #[error("Invalid value for '{operator}' filter: {message}")]
    InvalidValue {
        operator: &'static str,
        message: String,
    },

    /// Request is structurally invalid (pagination, group-by misuse).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Connection error.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query execution error.
    #[error("Execution error: {0}")]
    Execution(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReportError {
    /// Create an invalid-column error.
    pub fn invalid_column(dataset: impl Into<String>, column: impl Into<String>) -> Self {
        Self::InvalidColumn {
            dataset: dataset.into(),
            column: column.into(),
        }
    }

    /// Create an invalid-value error for the given operator.
    pub fn invalid_value(operator: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            operator,
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::UnknownDataset(_)
            | Self::InvalidColumn { .. }
            | Self::InvalidAlias(_)
            | Self::InvalidValue { .. }
            | Self::InvalidRequest(_) => 400,
            Self::Config(_) => 500,
            Self::Connection(_) => 503,
            Self::Execution(_) => 500,
            Self::Io(_) => 500,
        }
    }

    /// Stable machine-readable code for error envelopes.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownDataset(_) => "UNKNOWN_DATASET",
            Self::InvalidColumn { .. } => "INVALID_COLUMN",
            Self::InvalidAlias(_) => "INVALID_ALIAS",
            Self::InvalidValue { .. } => "INVALID_VALUE",
            Self::InvalidRequest(_) => "INVALID_REQUEST",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Connection(_) => "CONNECTION_ERROR",
            Self::Execution(_) => "QUERY_ERROR",
            Self::Io(_) => "IO_ERROR",
        }
    }
}

/// Result type alias for report operations.
pub type ReportResult<T> = Result<T, ReportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ReportError::invalid_column("fleet_performance", "cargo_hold_9");
        assert_eq!(
            err.to_string(),
            "Unknown column 'cargo_hold_9' for dataset 'fleet_performance'"
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(ReportError::UnknownDataset("x".into()).status_code(), 400);
        assert_eq!(ReportError::Connection("refused".into()).status_code(), 503);
        assert_eq!(ReportError::Execution("boom".into()).status_code(), 500);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(ReportError::InvalidAlias("1st".into()).code(), "INVALID_ALIAS");
        assert_eq!(ReportError::Execution("boom".into()).code(), "QUERY_ERROR");
    }
}
