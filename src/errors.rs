use serde::{Deserialize, Serialize};
use std::fmt;

/// Application-wide error types with categories for better error handling
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum AppError {
    /// Geometry applet errors (script unavailable, injection failed, etc.)
    Applet(String),

    /// Formula rendering errors (malformed markup, renderer missing)
    Render(String),

    /// PNG export errors (empty input, bad capture, write failed)
    Export(String),

    /// Settings storage errors
    Storage(String),

    /// Window management errors
    Window(String),

    /// Generic errors that don't fit other categories
    Other(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Applet(msg) => write!(f, "Applet Error: {}", msg),
            AppError::Render(msg) => write!(f, "Render Error: {}", msg),
            AppError::Export(msg) => write!(f, "Export Error: {}", msg),
            AppError::Storage(msg) => write!(f, "Storage Error: {}", msg),
            AppError::Window(msg) => write!(f, "Window Error: {}", msg),
            AppError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    /// Returns a user-friendly title for the error
    pub fn title(&self) -> &str {
        match self {
            AppError::Applet(_) => "Applet Unavailable",
            AppError::Render(_) => "Render Failed",
            AppError::Export(_) => "Export Failed",
            AppError::Storage(_) => "Storage Error",
            AppError::Window(_) => "Window Error",
            AppError::Other(_) => "Error",
        }
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        match self {
            AppError::Applet(msg)
            | AppError::Render(msg)
            | AppError::Export(msg)
            | AppError::Storage(msg)
            | AppError::Window(msg)
            | AppError::Other(msg) => msg,
        }
    }

    /// Whether the page should raise a blocking alert instead of a passive
    /// status-line update. Only export failures block; applet and render
    /// failures surface inline and leave the rest of the page usable.
    pub fn is_blocking(&self) -> bool {
        matches!(self, AppError::Export(_))
    }
}

/// Convert from String to AppError::Other
impl From<String> for AppError {
    fn from(error: String) -> Self {
        AppError::Other(error)
    }
}

/// Convert from &str to AppError::Other
impl From<&str> for AppError {
    fn from(error: &str) -> Self {
        AppError::Other(error.to_string())
    }
}

/// Error event payload sent to the frontend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEvent {
    pub error: AppError,
    pub blocking: bool,
    pub timestamp: u64,
    pub context: Option<String>,
}

impl ErrorEvent {
    pub fn new(error: AppError) -> Self {
        let blocking = error.is_blocking();
        Self {
            error,
            blocking,
            timestamp: crate::util::now_ms(),
            context: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}
