//! Operator-facing status lines.

use crate::LocatorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Success,
    Error,
}

impl StatusLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

/// One line for the status banner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub level: StatusLevel,
    pub text: String,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: StatusLevel::Info,
            text: text.into(),
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: StatusLevel::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: StatusLevel::Error,
            text: text.into(),
        }
    }

    pub fn loading() -> Self {
        Self::info("Loading and processing page...")
    }

    pub fn missing_search_input() -> Self {
        Self::error("Please enter both URL and text to highlight.")
    }

    /// Zero matches is informational, not a failure.
    pub fn no_matches(query: &str) -> Self {
        Self::info(format!("No occurrences of \"{query}\" found."))
    }

    pub fn highlighted(count: usize, query: &str) -> Self {
        Self::success(format!(
            "Successfully highlighted {count} occurrences of \"{query}\"."
        ))
    }

    pub fn from_error(error: &LocatorError) -> Self {
        if error.is_input_validation() {
            return Self::error(error.message.clone());
        }
        Self::error(format!("Error: {}", error.message))
    }
}
