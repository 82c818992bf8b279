use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TimefillError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("API returned {status}: {body}")]
    ApiStatusError { status: u16, body: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Session could not be established: {message}")]
    SessionError { message: String },

    #[error("Failed to fetch {stage}: {message}")]
    UpstreamFetchError { stage: String, message: String },

    #[error("Historical window returned no entries")]
    EmptyHistoryError,

    #[error("No eligible projects to sample from ({excluded} excluded)")]
    EmptyPoolError { excluded: usize },

    #[error(
        "Could not fill {date} into [{min_hours}, {max_hours}) hours after {attempts} attempts"
    )]
    UnsatisfiableConstraintError {
        date: NaiveDate,
        attempts: usize,
        min_hours: f64,
        max_hours: f64,
    },

    #[error(
        "Submission of entry #{} failed after {} successful submissions: {}",
        .index + 1,
        .submitted,
        .message
    )]
    SubmissionError {
        /// Zero-based position in the submission order.
        index: usize,
        submitted: usize,
        message: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Configuration,
    Data,
    Storage,
    Submission,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl TimefillError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            TimefillError::ApiError(_)
            | TimefillError::ApiStatusError { .. }
            | TimefillError::SessionError { .. }
            | TimefillError::UpstreamFetchError { .. } => ErrorCategory::Network,
            TimefillError::ConfigError { .. }
            | TimefillError::MissingConfigError { .. }
            | TimefillError::InvalidConfigValueError { .. }
            | TimefillError::ConfigValidationError { .. }
            | TimefillError::UnsatisfiableConstraintError { .. } => ErrorCategory::Configuration,
            TimefillError::EmptyHistoryError
            | TimefillError::EmptyPoolError { .. }
            | TimefillError::CsvError(_)
            | TimefillError::SerializationError(_) => ErrorCategory::Data,
            TimefillError::IoError(_) => ErrorCategory::Storage,
            TimefillError::SubmissionError { .. } => ErrorCategory::Submission,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::Storage | ErrorCategory::Submission => ErrorSeverity::Critical,
        }
    }

    pub fn is_configuration_error(&self) -> bool {
        self.category() == ErrorCategory::Configuration
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            TimefillError::SessionError { .. } => {
                "Check BIGTIME_USERNAME / BIGTIME_PASSWORD and that the account can sign in"
            }
            TimefillError::ApiError(_)
            | TimefillError::ApiStatusError { .. }
            | TimefillError::UpstreamFetchError { .. } => {
                "Check network connectivity and the service base_url, then rerun"
            }
            TimefillError::EmptyHistoryError => {
                "Increase the history lookback so at least one logged entry is included"
            }
            TimefillError::EmptyPoolError { .. } => {
                "Remove projects from the exclusion list or extend the history lookback"
            }
            TimefillError::UnsatisfiableConstraintError { .. } => {
                "Widen the gap between min_daily_hours and max_daily_hours or use a finer time increment"
            }
            TimefillError::SubmissionError { .. } => {
                "Entries before the failure were submitted; remove them from the service or rerun after reviewing the results file"
            }
            TimefillError::IoError(_) => "Check that the output path exists and is writable",
            TimefillError::CsvError(_) | TimefillError::SerializationError(_) => {
                "Inspect the service response; the payload shape may have changed"
            }
            TimefillError::ConfigError { .. }
            | TimefillError::MissingConfigError { .. }
            | TimefillError::InvalidConfigValueError { .. }
            | TimefillError::ConfigValidationError { .. } => {
                "Fix the configuration file or environment variables and try again"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Could not talk to the time-tracking service: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Data => format!("Unusable timesheet data: {}", self),
            ErrorCategory::Storage => format!("Could not save results: {}", self),
            ErrorCategory::Submission => format!("Submission aborted: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, TimefillError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsatisfiable_constraint_is_configuration_error() {
        let err = TimefillError::UnsatisfiableConstraintError {
            date: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
            attempts: 10,
            min_hours: 8.0,
            max_hours: 8.0,
        };

        assert!(err.is_configuration_error());
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert!(err.to_string().contains("2024-03-04"));
    }

    #[test]
    fn test_submission_error_is_critical() {
        let err = TimefillError::SubmissionError {
            index: 1,
            submitted: 1,
            message: "500".to_string(),
        };

        assert_eq!(err.category(), ErrorCategory::Submission);
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert!(err.user_friendly_message().starts_with("Submission aborted"));
    }

    #[test]
    fn test_submission_error_numbers_entries_from_one() {
        let err = TimefillError::SubmissionError {
            index: 1,
            submitted: 1,
            message: "500".to_string(),
        };

        assert!(err
            .to_string()
            .starts_with("Submission of entry #2 failed after 1 successful submissions"));
    }
}
