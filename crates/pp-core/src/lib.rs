//! Shared primitives used across Pinpoint crates.

pub mod config;
pub mod status;

use core::fmt;

pub use config::EngineConfig;
pub use config::PresentationMode;
pub use status::StatusLevel;
pub use status::StatusMessage;

/// Result alias used across the workspace.
pub type LocatorResult<T> = Result<T, LocatorError>;

/// Broad error classes surfaced at the engine's call boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Empty URL, empty query and similar operator input problems.
    InputValidation,
    /// Proxy transport failure or non-success proxy response.
    Fetch,
    /// Search pattern could not be compiled.
    Pattern,
    /// Tree handle did not resolve to a usable node.
    Dom,
    Config,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InputValidation => "input",
            Self::Fetch => "fetch",
            Self::Pattern => "pattern",
            Self::Dom => "dom",
            Self::Config => "config",
        }
    }
}

/// Top-level error type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatorError {
    pub kind: ErrorKind,
    pub code: &'static str,
    pub message: String,
}

impl LocatorError {
    pub fn new(kind: ErrorKind, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            kind,
            code,
            message: message.into(),
        }
    }

    pub fn input(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InputValidation, code, message)
    }

    pub fn fetch(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Fetch, code, message)
    }

    pub fn dom(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Dom, code, message)
    }

    pub fn is_input_validation(&self) -> bool {
        self.kind == ErrorKind::InputValidation
    }

    pub fn is_fetch(&self) -> bool {
        self.kind == ErrorKind::Fetch
    }
}

impl fmt::Display for LocatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for LocatorError {}
