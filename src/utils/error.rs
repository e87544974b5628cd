use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Scrape error: {message}")]
    ScrapeError { message: String },

    #[error("Parse error in {field} (value '{value}'): {reason}")]
    ParseError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid configuration value for {field} ('{value}'): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl TrackerError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            TrackerError::HttpError(_) => ErrorCategory::Network,
            TrackerError::CsvError(_)
            | TrackerError::SerializationError(_)
            | TrackerError::ScrapeError { .. }
            | TrackerError::ParseError { .. }
            | TrackerError::ProcessingError { .. } => ErrorCategory::Data,
            TrackerError::ConfigError { .. }
            | TrackerError::MissingConfigError { .. }
            | TrackerError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            TrackerError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            TrackerError::HttpError(_) => ErrorSeverity::Medium,
            TrackerError::CsvError(_)
            | TrackerError::SerializationError(_)
            | TrackerError::ScrapeError { .. }
            | TrackerError::ParseError { .. }
            | TrackerError::ProcessingError { .. } => ErrorSeverity::High,
            TrackerError::ConfigError { .. }
            | TrackerError::MissingConfigError { .. }
            | TrackerError::InvalidConfigValueError { .. } => ErrorSeverity::High,
            TrackerError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            TrackerError::HttpError(_) => {
                "Check your network connection and whether dps.psx.com.pk is reachable, then retry"
                    .to_string()
            }
            TrackerError::ScrapeError { .. } => {
                "The portal markup may have changed; verify the index page renders the constituents table"
                    .to_string()
            }
            TrackerError::ParseError { field, .. } => {
                format!("Inspect the '{}' value in the source data and fix or remove it", field)
            }
            TrackerError::CsvError(_) => {
                "Check the CSV file headers and row format".to_string()
            }
            TrackerError::ConfigError { .. }
            | TrackerError::MissingConfigError { .. }
            | TrackerError::InvalidConfigValueError { .. } => {
                "Review the command line arguments and configuration file".to_string()
            }
            TrackerError::IoError(_) => {
                "Check file permissions and that the output directory is writable".to_string()
            }
            TrackerError::SerializationError(_) => {
                "Check the request payload format".to_string()
            }
            TrackerError::ProcessingError { .. } => {
                "Inspect the scraped data for the symbol mentioned above".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            TrackerError::HttpError(_) => {
                "Could not reach the PSX data portal".to_string()
            }
            TrackerError::ScrapeError { message } => {
                format!("The index page did not look as expected: {}", message)
            }
            TrackerError::ParseError { field, value, .. } => {
                format!("Could not understand the value '{}' in {}", value, field)
            }
            TrackerError::CsvError(_) => "The CSV file could not be read".to_string(),
            TrackerError::MissingConfigError { field } => {
                format!("Required setting '{}' was not provided", field)
            }
            TrackerError::InvalidConfigValueError { field, value, .. } => {
                format!("Setting '{}' has an invalid value: '{}'", field, value)
            }
            TrackerError::ConfigError { message } => {
                format!("Configuration problem: {}", message)
            }
            TrackerError::IoError(_) => "A file could not be read or written".to_string(),
            TrackerError::SerializationError(_) => {
                "Internal data could not be encoded".to_string()
            }
            TrackerError::ProcessingError { message } => {
                format!("The plan could not be computed: {}", message)
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, TrackerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scrape_errors_are_data_errors() {
        let err = TrackerError::ScrapeError {
            message: "no table".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Data);
        assert_eq!(err.severity(), ErrorSeverity::High);
    }

    #[test]
    fn config_errors_point_at_the_field() {
        let err = TrackerError::MissingConfigError {
            field: "money_to_invest".to_string(),
        };
        assert!(err.user_friendly_message().contains("money_to_invest"));
        assert_eq!(err.category(), ErrorCategory::Configuration);
    }

    #[test]
    fn io_errors_are_critical() {
        let err = TrackerError::IoError(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert!(!err.recovery_suggestion().is_empty());
    }
}
