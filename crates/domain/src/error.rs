//! User-facing error taxonomy and the classifier that maps raw failures onto it

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::normalize::NormalizeError;
use crate::ports::{MediaError, ProviderError};

/// Stable error kinds surfaced to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Auth,
    Permission,
    MalformedResponse,
    Capacity,
    QuotaExceeded,
    SafetyRejection,
    Transport,
    Refusal,
    EmptyResult,
    Cancelled,
    DeadlineExceeded,
    Unknown,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Auth => "auth",
            ErrorKind::Permission => "permission",
            ErrorKind::MalformedResponse => "malformed_response",
            ErrorKind::Capacity => "capacity",
            ErrorKind::QuotaExceeded => "quota_exceeded",
            ErrorKind::SafetyRejection => "safety_rejection",
            ErrorKind::Transport => "transport",
            ErrorKind::Refusal => "refusal",
            ErrorKind::EmptyResult => "empty_result",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::DeadlineExceeded => "deadline_exceeded",
            ErrorKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified, ready-to-display failure
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct AppError {
    pub kind: ErrorKind,
    pub message: String,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Raised when a client is built without the settings it needs
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("API key environment variable {0} is not set")]
    MissingApiKey(String),
    #[error("API key environment variable {0} is empty")]
    EmptyApiKey(String),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl From<ConfigurationError> for AppError {
    fn from(error: ConfigurationError) -> Self {
        match error {
            ConfigurationError::MissingApiKey(_) | ConfigurationError::EmptyApiKey(_) => {
                AppError::new(
                    ErrorKind::Auth,
                    format!("API key error: {}. Configure a valid Gemini API key.", error),
                )
            }
            ConfigurationError::Invalid(_) => AppError::new(ErrorKind::Unknown, error.to_string()),
        }
    }
}

/// Any failure produced while running an operation, before classification
#[derive(Debug, Error)]
pub enum RawError {
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error(transparent)]
    Normalize(#[from] NormalizeError),
    #[error("Video generation failed: {0}")]
    JobFailed(String),
    #[error("Could not store media: {0}")]
    Media(#[from] MediaError),
    #[error("Operation cancelled")]
    Cancelled,
    #[error("Operation exceeded its time budget of {0:?}")]
    DeadlineExceeded(Duration),
}

/// Capability a permission failure refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    General,
    WebSearch,
    Images,
    Video,
}

/// Label of the calling operation, used to specialize messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallContext {
    Tweet,
    Thread,
    Proofreading,
    Regeneration,
    Refinement,
    FileSummary,
    UrlSummary,
    WebSearchSummary,
    WebSearch,
    PostSearch,
    TrendingTopics,
    Image,
    ImageEdit,
    Video,
}

impl CallContext {
    pub fn label(&self) -> &'static str {
        match self {
            CallContext::Tweet => "tweet",
            CallContext::Thread => "thread",
            CallContext::Proofreading => "proofreading",
            CallContext::Regeneration => "tweet regeneration",
            CallContext::Refinement => "refinement",
            CallContext::FileSummary => "summary",
            CallContext::UrlSummary => "URL summary",
            CallContext::WebSearchSummary => "web search summary",
            CallContext::WebSearch => "web search",
            CallContext::PostSearch => "X post search",
            CallContext::TrendingTopics => "trending topics",
            CallContext::Image => "image",
            CallContext::ImageEdit => "image edit",
            CallContext::Video => "video",
        }
    }

    /// Capability named in permission-denied messages
    pub fn capability(&self) -> Capability {
        let label = self.label();
        if label.contains("search") || label.contains("URL summary") || label.contains("trend") {
            Capability::WebSearch
        } else if label.contains("image") {
            Capability::Images
        } else if label.contains("video") {
            Capability::Video
        } else {
            Capability::General
        }
    }
}

impl fmt::Display for CallContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

const AUTH_SIGNATURES: &[&str] = &["api key", "clave api", "authentication", "unauthenticated"];
const PERMISSION_SIGNATURES: &[&str] = &["permission denied", "403"];
const MALFORMED_SIGNATURES: &[&str] = &["unexpected end of json input"];
const CAPACITY_SIGNATURES: &[&str] = &["at capacity", "overloaded"];
const QUOTA_SIGNATURES: &[&str] = &["resource_exhausted", "quota"];
const SAFETY_SIGNATURES: &[&str] = &["usage guidelines", "safety policy", "blocked by safety"];
const TRANSPORT_SIGNATURES: &[&str] = &[
    "xhr error",
    "rpc failed",
    "network error",
    "timed out",
    "500",
];

fn matches_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

/// Map a raw failure onto the stable taxonomy. Pure; the same input always
/// yields the same kind and message.
pub fn classify(raw: &RawError, context: CallContext) -> AppError {
    match raw {
        RawError::Normalize(NormalizeError::Refusal(message)) => {
            return AppError::new(ErrorKind::Refusal, message.clone());
        }
        RawError::Normalize(NormalizeError::Empty(message)) => {
            return AppError::new(ErrorKind::EmptyResult, message.clone());
        }
        RawError::Cancelled => {
            return AppError::new(
                ErrorKind::Cancelled,
                format!("The {} request was cancelled.", context),
            );
        }
        RawError::DeadlineExceeded(budget) => {
            return AppError::new(
                ErrorKind::DeadlineExceeded,
                format!(
                    "The {} request did not finish within {} seconds. Please try again later.",
                    context,
                    budget.as_secs()
                ),
            );
        }
        _ => {}
    }

    let message = raw.to_string();
    let lower = message.to_lowercase();

    let structurally_malformed = matches!(
        raw,
        RawError::Provider(ProviderError::InvalidResponse(_))
            | RawError::Normalize(NormalizeError::Malformed(_))
    );

    if matches_any(&lower, AUTH_SIGNATURES) {
        AppError::new(
            ErrorKind::Auth,
            "API key error: the configured Gemini API key appears to be invalid. Please check your configuration.",
        )
    } else if matches_any(&lower, PERMISSION_SIGNATURES) {
        let action = match context.capability() {
            Capability::WebSearch => "use web search",
            Capability::Images => "generate images",
            Capability::Video => "generate videos",
            Capability::General => "perform this action",
        };
        AppError::new(
            ErrorKind::Permission,
            format!(
                "Permission error: your Gemini API key does not have the permissions needed to {}. Make sure the required APIs are enabled in your Google Cloud project.",
                action
            ),
        )
    } else if structurally_malformed || matches_any(&lower, MALFORMED_SIGNATURES) {
        AppError::new(
            ErrorKind::MalformedResponse,
            "API error (Gemini): the AI returned an invalid or incomplete response. This can happen under high demand. Please try again.",
        )
    } else if matches_any(&lower, CAPACITY_SIGNATURES) {
        AppError::new(
            ErrorKind::Capacity,
            "The AI model is experiencing high demand right now. Please try again in a few moments.",
        )
    } else if matches_any(&lower, QUOTA_SIGNATURES) {
        AppError::new(
            ErrorKind::QuotaExceeded,
            "The Gemini API quota has been exceeded. Please review your plan and billing details.",
        )
    } else if matches_any(&lower, SAFETY_SIGNATURES) {
        AppError::new(
            ErrorKind::SafetyRejection,
            "The request could not be sent because of safety restrictions. Please try rephrasing it.",
        )
    } else if matches_any(&lower, TRANSPORT_SIGNATURES) {
        AppError::new(
            ErrorKind::Transport,
            format!(
                "A network error occurred while talking to the AI. This may be temporary, please try again. (Details: {})",
                message
            ),
        )
    } else {
        AppError::new(
            ErrorKind::Unknown,
            format!("Unexpected error while generating {}: {}", context, message),
        )
    }
}
