//! Port definitions (traits) for external dependencies
//!
//! These traits define the boundaries between the domain and external systems.
//! Adapters implement these traits to connect to real infrastructure.

use async_trait::async_trait;
use thiserror::Error;
use time::OffsetDateTime;

use crate::model::MediaHandle;
use crate::request::{
    ContentRequest, ContentResponse, DownloadedMedia, ImageRequest, VideoOperation,
    VideoSubmission,
};

/// Error type for model provider calls
///
/// Display strings are what the retry executor and the error classifier
/// inspect, so they keep the provider's own wording.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("network error: {0}")]
    Transport(String),
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },
    #[error("invalid response body: {0}")]
    InvalidResponse(String),
    #[error("blocked by safety policy: {0}")]
    Blocked(String),
    #[error("{0}")]
    Other(String),
}

/// Port for the generative model service
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Generate text (and optionally image parts) for a conversation
    async fn generate_content(
        &self,
        request: &ContentRequest,
    ) -> Result<ContentResponse, ProviderError>;

    /// Generate images, returning base64 payloads in provider order
    async fn generate_images(&self, request: &ImageRequest) -> Result<Vec<String>, ProviderError>;

    /// Submit a long-running video job
    async fn submit_video(
        &self,
        submission: &VideoSubmission,
    ) -> Result<VideoOperation, ProviderError>;

    /// Refresh the state of a video job
    async fn fetch_video_operation(
        &self,
        operation: &VideoOperation,
    ) -> Result<VideoOperation, ProviderError>;

    /// Download a finished artifact from its signed URI
    async fn download_media(&self, uri: &str) -> Result<DownloadedMedia, ProviderError>;

    /// Provider name used in logs
    fn name(&self) -> &'static str;
}

#[async_trait]
impl<P: ModelProvider + ?Sized> ModelProvider for std::sync::Arc<P> {
    async fn generate_content(
        &self,
        request: &ContentRequest,
    ) -> Result<ContentResponse, ProviderError> {
        (**self).generate_content(request).await
    }

    async fn generate_images(&self, request: &ImageRequest) -> Result<Vec<String>, ProviderError> {
        (**self).generate_images(request).await
    }

    async fn submit_video(
        &self,
        submission: &VideoSubmission,
    ) -> Result<VideoOperation, ProviderError> {
        (**self).submit_video(submission).await
    }

    async fn fetch_video_operation(
        &self,
        operation: &VideoOperation,
    ) -> Result<VideoOperation, ProviderError> {
        (**self).fetch_video_operation(operation).await
    }

    async fn download_media(&self, uri: &str) -> Result<DownloadedMedia, ProviderError> {
        (**self).download_media(uri).await
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Error type for media store operations
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Empty artifact")]
    Empty,
}

/// Port for materializing downloaded bytes into a locally resolvable handle
#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn store(&self, media: DownloadedMedia) -> Result<MediaHandle, MediaError>;
}

/// Port for time/clock operations (enables deterministic testing)
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> OffsetDateTime;
}

/// Real clock implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}
