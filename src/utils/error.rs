use thiserror::Error;

#[derive(Error, Debug)]
pub enum NamesError {
    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Malformed source table '{table}': {reason}")]
    SourceStructureError { table: String, reason: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Target gender score must be between -1.0 and 1.0, got {value}")]
    InvalidTargetScore { value: f64 },

    #[error("Catalog is {state}; {operation} requires loaded totals")]
    CatalogStateError {
        state: &'static str,
        operation: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Configuration,
    Data,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl NamesError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            NamesError::InvalidTargetScore { .. } => ErrorCategory::Input,
            NamesError::ConfigValidationError { .. }
            | NamesError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            NamesError::CsvError(_)
            | NamesError::IoError(_)
            | NamesError::SourceStructureError { .. } => ErrorCategory::Data,
            NamesError::SerializationError(_) | NamesError::CatalogStateError { .. } => {
                ErrorCategory::Internal
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::Internal => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            NamesError::InvalidTargetScore { .. } => {
                "Pass a target between -1.0 (masculine) and 1.0 (feminine)"
            }
            NamesError::IoError(_) => "Check that both source files exist and are readable",
            NamesError::CsvError(_) | NamesError::SourceStructureError { .. } => {
                "Check that the source files are the ONS baby-name CSV exports (4 metadata rows, then a header with '<year> Count' columns)"
            }
            NamesError::ConfigValidationError { .. } | NamesError::InvalidConfigValueError { .. } => {
                "Review the configuration file and command-line flags"
            }
            NamesError::SerializationError(_) | NamesError::CatalogStateError { .. } => {
                "This is a bug; re-run with --verbose and report the log"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            NamesError::IoError(e) => format!("Could not read source data: {}", e),
            NamesError::SourceStructureError { table, reason } => {
                format!("The data file '{}' is not in the expected format: {}", table, reason)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, NamesError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_error_message_is_specific() {
        let err = NamesError::InvalidTargetScore { value: 1.5 };
        assert_eq!(
            err.to_string(),
            "Target gender score must be between -1.0 and 1.0, got 1.5"
        );
        assert_eq!(err.category(), ErrorCategory::Input);
        assert_eq!(err.severity(), ErrorSeverity::Medium);
    }

    #[test]
    fn test_structure_error_is_data_category() {
        let err = NamesError::SourceStructureError {
            table: "boys.csv".to_string(),
            reason: "no Count columns".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Data);
        assert!(err.user_friendly_message().contains("boys.csv"));
    }

    #[test]
    fn test_every_failure_is_at_least_medium() {
        let errors = [
            NamesError::InvalidTargetScore { value: -2.0 },
            NamesError::ConfigValidationError {
                field: "display".to_string(),
                message: "bad".to_string(),
            },
            NamesError::CatalogStateError {
                state: "uninitialized",
                operation: "loading yearly data",
            },
        ];
        let severities: Vec<ErrorSeverity> = errors.iter().map(|e| e.severity()).collect();
        assert_eq!(
            severities,
            vec![
                ErrorSeverity::Medium,
                ErrorSeverity::High,
                ErrorSeverity::Critical
            ]
        );
    }
}
