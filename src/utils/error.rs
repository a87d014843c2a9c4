use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Request to {url} failed: {source}")]
    NetworkFailure {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request to {url} returned HTTP {status}")]
    HttpStatusFailure { url: String, status: u16 },

    #[error("Could not decode pet records: {message}")]
    DecodeFailure { message: String },

    #[error("Render target '#{element_id}' not found in document")]
    TargetMissing { element_id: String },

    #[error("Template rendering failed: {0}")]
    TemplateError(#[from] askama::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Http,
    Decode,
    Document,
    Template,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl RenderError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            RenderError::NetworkFailure { .. } => ErrorCategory::Network,
            RenderError::HttpStatusFailure { .. } => ErrorCategory::Http,
            RenderError::DecodeFailure { .. } => ErrorCategory::Decode,
            RenderError::TargetMissing { .. } | RenderError::IoError(_) => {
                ErrorCategory::Document
            }
            RenderError::TemplateError(_) => ErrorCategory::Template,
            RenderError::ConfigError { .. }
            | RenderError::ConfigValidationError { .. }
            | RenderError::InvalidConfigValueError { .. }
            | RenderError::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 暫時性錯誤，重新執行可能成功
            RenderError::NetworkFailure { .. } => ErrorSeverity::Medium,
            RenderError::HttpStatusFailure { status, .. } if *status >= 500 => {
                ErrorSeverity::Medium
            }
            RenderError::HttpStatusFailure { .. } | RenderError::DecodeFailure { .. } => {
                ErrorSeverity::High
            }
            RenderError::TargetMissing { .. } | RenderError::TemplateError(_) => {
                ErrorSeverity::High
            }
            RenderError::IoError(_)
            | RenderError::ConfigError { .. }
            | RenderError::ConfigValidationError { .. }
            | RenderError::InvalidConfigValueError { .. }
            | RenderError::MissingConfigError { .. } => ErrorSeverity::Critical,
        }
    }

    /// Whether the fallback notice may be written after this failure.
    ///
    /// Document failures mean there is nowhere sensible to write it.
    pub fn allows_fallback(&self) -> bool {
        !matches!(self.category(), ErrorCategory::Document)
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            RenderError::NetworkFailure { url, .. } => format!(
                "Check that the backend at {} is reachable and retry",
                url
            ),
            RenderError::HttpStatusFailure { status, .. } if *status >= 500 => {
                "The backend reported a server error; retry once it recovers".to_string()
            }
            RenderError::HttpStatusFailure { .. } => {
                "Verify the endpoint URL points at the pets API".to_string()
            }
            RenderError::DecodeFailure { .. } => {
                "The endpoint must return a JSON array of objects with 'name' and 'breed'"
                    .to_string()
            }
            RenderError::TargetMissing { element_id } => format!(
                "Add an element with id=\"{}\" to the document or pass --target-id",
                element_id
            ),
            RenderError::TemplateError(_) => "Re-run with --verbose for details".to_string(),
            RenderError::IoError(_) => {
                "Check that the document path exists and is writable".to_string()
            }
            RenderError::ConfigError { .. }
            | RenderError::ConfigValidationError { .. }
            | RenderError::InvalidConfigValueError { .. }
            | RenderError::MissingConfigError { .. } => {
                "Fix the configuration value and run again".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Could not reach the pets service: {}", self),
            ErrorCategory::Http => format!("The pets service rejected the request: {}", self),
            ErrorCategory::Decode => format!("The pets service sent unexpected data: {}", self),
            ErrorCategory::Document => format!("Could not update the page: {}", self),
            ErrorCategory::Template => format!("Could not render the pet list: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
        }
    }
}

impl From<serde_json::Error> for RenderError {
    fn from(e: serde_json::Error) -> Self {
        RenderError::DecodeFailure {
            message: e.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RenderError>;
