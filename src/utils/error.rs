use crate::domain::model::DeliveryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScoutError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field} ('{value}'): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Delivery failed: {0}")]
    DeliveryError(#[from] DeliveryError),

    #[error("Processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Data,
    Delivery,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ScoutError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ScoutError::ConfigError { .. }
            | ScoutError::MissingConfigError { .. }
            | ScoutError::InvalidConfigValueError { .. }
            | ScoutError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            ScoutError::HttpError(_) => ErrorCategory::Network,
            ScoutError::SerializationError(_) | ScoutError::ProcessingError { .. } => {
                ErrorCategory::Data
            }
            ScoutError::DeliveryError(_) => ErrorCategory::Delivery,
            ScoutError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network | ErrorCategory::Delivery => ErrorSeverity::Medium,
            ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::Configuration | ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            ScoutError::MissingConfigError { field } => {
                format!("Set {} in the environment or in the .env file", field)
            }
            ScoutError::InvalidConfigValueError { field, .. }
            | ScoutError::ConfigValidationError { field, .. } => {
                format!("Check the value of {} in the settings file", field)
            }
            ScoutError::ConfigError { .. } => {
                "Check that the settings file exists and is valid TOML".to_string()
            }
            ScoutError::HttpError(_) => {
                "Check network connectivity and try again later".to_string()
            }
            ScoutError::DeliveryError(_) => {
                "Check the Telegram bot token and that the chat is still reachable".to_string()
            }
            ScoutError::IoError(_) => "Check file permissions and paths".to_string(),
            ScoutError::SerializationError(_) | ScoutError::ProcessingError { .. } => {
                "The site layout or API may have changed; run with --verbose for details"
                    .to_string()
            }
        }
    }

    /// Process exit code for the binaries, by severity.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Network => "Could not reach a remote service".to_string(),
            ErrorCategory::Data => "Received data in an unexpected format".to_string(),
            ErrorCategory::Delivery => "Could not deliver the results".to_string(),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScoutError>;
