use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Engine error taxonomy.
///
/// Validation and policy variants carry deliberately short, user-safe
/// messages: SSRF rejections must not leak which internal range or
/// resolution detail triggered them.
#[derive(Debug, Error)]
pub enum BexError {
    #[error("URL too long")]
    UrlTooLong,

    #[error("Invalid URL")]
    InvalidUrl,

    #[error("Only HTTP/HTTPS allowed")]
    SchemeNotAllowed,

    #[error("URL not allowed")]
    HostNotAllowed,

    #[error("Could not resolve hostname")]
    HostnameUnresolved,

    #[error("URL resolves to blocked IP")]
    BlockedIp,

    #[error("Browser error ({phase}): {message}")]
    Browser { phase: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid request: {0}")]
    Request(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl BexError {
    pub fn browser(phase: impl Into<String>, message: impl Into<String>) -> Self {
        BexError::Browser {
            phase: phase.into(),
            message: message.into(),
        }
    }

    pub fn request(message: impl Into<String>) -> Self {
        BexError::Request(message.into())
    }

    /// True when the failure was caused by the caller's input rather than the
    /// engine or the target; callers map these to a 4xx status.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            BexError::UrlTooLong
                | BexError::InvalidUrl
                | BexError::SchemeNotAllowed
                | BexError::HostNotAllowed
                | BexError::HostnameUnresolved
                | BexError::BlockedIp
                | BexError::Request(_)
        )
    }

    pub fn to_payload(&self) -> ErrorPayload {
        let category = match self {
            BexError::UrlTooLong | BexError::InvalidUrl | BexError::SchemeNotAllowed => {
                ErrorCategory::Validation
            }
            BexError::HostNotAllowed | BexError::HostnameUnresolved | BexError::BlockedIp => {
                ErrorCategory::Policy
            }
            BexError::Browser { .. } => ErrorCategory::Render,
            BexError::Network(_) => ErrorCategory::Network,
            BexError::Image(_) => ErrorCategory::Image,
            BexError::Request(_) => ErrorCategory::Validation,
            BexError::Io(_) | BexError::Serialization(_) | BexError::Config(_) => {
                ErrorCategory::Config
            }
        };
        ErrorPayload {
            category,
            message: self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BexError>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Validation,
    Policy,
    Render,
    Network,
    Image,
    Config,
}

/// Serializable error surface handed to callers (and printed by the CLI).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    pub category: ErrorCategory,
    pub message: String,
}
