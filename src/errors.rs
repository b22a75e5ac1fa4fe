use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::error;

/// Session-wide error types with categories for better error handling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum AppError {
    /// Translation service errors (backend failed, unsupported input, etc.)
    Translation(String),

    /// Clipboard read/write errors (no display, permission refused, etc.)
    Clipboard(String),

    /// Share errors (opener missing, endpoint rejected, etc.)
    Share(String),

    /// Settings file errors
    Settings(String),

    /// Generic errors that don't fit other categories
    Other(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Translation(msg) => write!(f, "Translation Error: {}", msg),
            AppError::Clipboard(msg) => write!(f, "Clipboard Error: {}", msg),
            AppError::Share(msg) => write!(f, "Share Error: {}", msg),
            AppError::Settings(msg) => write!(f, "Settings Error: {}", msg),
            AppError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    /// Returns a user-friendly title for the error
    pub fn title(&self) -> &str {
        match self {
            AppError::Translation(_) => "Translation Failed",
            AppError::Clipboard(_) => "Clipboard Unavailable",
            AppError::Share(_) => "Share Failed",
            AppError::Settings(_) => "Settings Problem",
            AppError::Other(_) => "Error",
        }
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        match self {
            AppError::Translation(msg)
            | AppError::Clipboard(msg)
            | AppError::Share(msg)
            | AppError::Settings(msg)
            | AppError::Other(msg) => msg,
        }
    }

    /// Returns a suggested action for the user
    pub fn suggested_action(&self) -> Option<&str> {
        match self {
            AppError::Translation(_) => Some("Edit the text to translate it again"),
            AppError::Clipboard(_) => Some("Allow clipboard access or type the text instead"),
            AppError::Share(_) => Some("Copy the text and post it manually"),
            AppError::Settings(_) => Some("Check the settings file for typos"),
            AppError::Other(_) => None,
        }
    }
}

/// Error event payload handed to whatever renders the session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEvent {
    pub error: AppError,
    pub timestamp: u64,
    pub context: Option<String>,
}

impl ErrorEvent {
    pub fn new(error: AppError) -> Self {
        Self {
            error,
            timestamp: crate::util::now_ms(),
            context: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

/// Log an error and wrap it into an event.
pub(crate) fn report_error(error: &AppError, context: Option<&str>) -> ErrorEvent {
    let event = if let Some(ctx) = context {
        ErrorEvent::new(error.clone()).with_context(ctx)
    } else {
        ErrorEvent::new(error.clone())
    };

    error!("{}: {}", error.title(), error.message());

    event
}
