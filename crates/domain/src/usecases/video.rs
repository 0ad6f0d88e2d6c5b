//! Video job poller - drives a long-running generation job to a stored artifact

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

use crate::error::{AppError, CallContext, RawError};
use crate::limiter::RateLimiter;
use crate::model::{MediaHandle, VideoRequest};
use crate::normalize::NormalizeError;
use crate::ports::{MediaStore, ModelProvider, ProviderError};
use crate::prompts;
use crate::request::{VideoOperation, VideoSubmission};
use crate::retry::{RetryPolicy, with_retry};
use crate::usecases::generate::surface;

/// Progress events emitted while a video job runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoProgress {
    Starting,
    Processing,
    Generating,
    Finalizing,
    Ready,
    Failed(String),
}

impl fmt::Display for VideoProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VideoProgress::Starting => f.write_str("🚀 Starting video generation..."),
            VideoProgress::Processing => f.write_str("🤖 The AI is processing the request..."),
            VideoProgress::Generating => {
                f.write_str("⏳ Generating frames, this can take a few minutes...")
            }
            VideoProgress::Finalizing => f.write_str("✅ Finalizing the video..."),
            VideoProgress::Ready => f.write_str("🎉 The video is ready!"),
            VideoProgress::Failed(message) => write!(f, "Error: {}", message),
        }
    }
}

/// Receives progress events
pub trait ProgressReporter: Send + Sync {
    fn report(&self, progress: &VideoProgress);
}

impl<F> ProgressReporter for F
where
    F: Fn(&VideoProgress) + Send + Sync,
{
    fn report(&self, progress: &VideoProgress) {
        self(progress)
    }
}

/// Reporter that drops every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn report(&self, _progress: &VideoProgress) {}
}

/// Polling cadence and wall-clock budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub interval: Duration,
    /// `None` waits indefinitely
    pub max_wait: Option<Duration>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            max_wait: Some(Duration::from_secs(600)),
        }
    }
}

/// Submits a video job, polls it until it settles, downloads and stores the result
pub struct VideoJobPoller<P: ?Sized, M: ?Sized> {
    provider: Arc<P>,
    media: Arc<M>,
    retry: RetryPolicy,
    config: PollConfig,
    limiter: Option<Arc<RateLimiter>>,
}

impl<P, M> VideoJobPoller<P, M>
where
    P: ModelProvider + ?Sized,
    M: MediaStore + ?Sized,
{
    pub fn new(provider: Arc<P>, media: Arc<M>, retry: RetryPolicy, config: PollConfig) -> Self {
        Self {
            provider,
            media,
            retry,
            config,
            limiter: None,
        }
    }

    pub fn with_rate_limiter(mut self, limiter: Arc<RateLimiter>) -> Self {
        self.limiter = Some(limiter);
        self
    }

    /// Generate a video and return a handle to the stored file
    pub async fn generate_video(
        &self,
        request: &VideoRequest,
        progress: &dyn ProgressReporter,
        cancel: &CancellationToken,
    ) -> Result<MediaHandle, AppError> {
        let span = tracing::info_span!(
            "video",
            call_id = %Uuid::new_v4(),
            provider = self.provider.name()
        );

        let result = async {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(RawError::Cancelled),
                result = self.run_with_budget(request, progress) => result,
            }
        }
        .instrument(span)
        .await;

        result.map_err(|raw| {
            let error = surface(raw, CallContext::Video);
            progress.report(&VideoProgress::Failed(error.message.clone()));
            error
        })
    }

    async fn run_with_budget(
        &self,
        request: &VideoRequest,
        progress: &dyn ProgressReporter,
    ) -> Result<MediaHandle, RawError> {
        match self.config.max_wait {
            Some(budget) => tokio::time::timeout(budget, self.run(request, progress))
                .await
                .unwrap_or_else(|_| Err(RawError::DeadlineExceeded(budget))),
            None => self.run(request, progress).await,
        }
    }

    async fn run(
        &self,
        request: &VideoRequest,
        progress: &dyn ProgressReporter,
    ) -> Result<MediaHandle, RawError> {
        let provider = self.provider.as_ref();
        let submission = VideoSubmission {
            prompt: prompts::video_prompt(&request.prompt, request.style.as_deref()),
            reference_image: request.reference_image.clone(),
            count: 1,
        };
        let submission = &submission;

        progress.report(&VideoProgress::Starting);
        tracing::info!(
            with_image = submission.reference_image.is_some(),
            "Submitting video job"
        );

        let mut operation = self
            .attempt(move || provider.submit_video(submission))
            .await?;
        progress.report(&VideoProgress::Processing);

        loop {
            if let Some(error) = &operation.error {
                tracing::warn!(operation = %operation.name, error = %error, "Video job reported an error");
                return Err(RawError::JobFailed(error.clone()));
            }
            if operation.done {
                break;
            }

            progress.report(&VideoProgress::Generating);
            tokio::time::sleep(self.config.interval).await;

            let current: &VideoOperation = &operation;
            operation = self
                .attempt(move || provider.fetch_video_operation(current))
                .await?;
            tracing::debug!(operation = %operation.name, done = operation.done, "Polled video job");
        }

        let uri = operation
            .video_uri
            .filter(|uri| !uri.trim().is_empty())
            .ok_or_else(|| {
                NormalizeError::Empty(
                    "The video generation finished, but no download link was found.".to_string(),
                )
            })?;

        progress.report(&VideoProgress::Finalizing);

        if let Some(limiter) = &self.limiter {
            limiter.acquire().await;
        }
        let media = provider.download_media(&uri).await?;
        let handle = self.media.store(media).await?;

        tracing::info!(uri = %handle.uri, size_bytes = handle.size_bytes, "Video stored");
        progress.report(&VideoProgress::Ready);
        Ok(handle)
    }

    /// One provider call through the limiter and the retry executor
    async fn attempt<T, F, Fut>(&self, mut call: F) -> Result<T, ProviderError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        let limiter = self.limiter.as_deref();
        with_retry(&self.retry, move || {
            let pending = call();
            async move {
                if let Some(limiter) = limiter {
                    limiter.acquire().await;
                }
                pending.await
            }
        })
        .await
    }
}
