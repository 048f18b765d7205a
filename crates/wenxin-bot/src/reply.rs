//! Reply envelope handed back to the hosting framework.

use std::fmt;

/// The outcome of one inbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Model output to show the user.
    Text(String),
    /// Bot-generated notice (e.g. memory cleared).
    Info(String),
    /// Something went wrong; the text is safe to show the user.
    Error(String),
    /// URL of a generated image.
    ImageUrl(String),
}

impl Reply {
    /// The payload regardless of variant.
    pub fn content(&self) -> &str {
        match self {
            Self::Text(s) | Self::Info(s) | Self::Error(s) | Self::ImageUrl(s) => s,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f, "{s}"),
            Self::Info(s) => write!(f, "[INFO] {s}"),
            Self::Error(s) => write!(f, "[ERROR] {s}"),
            Self::ImageUrl(s) => write!(f, "[IMAGE] {s}"),
        }
    }
}
