//! Hand-written port fakes shared by the use case tests

use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use time::OffsetDateTime;

use crate::model::{ImagePayload, MediaHandle};
use crate::ports::{Clock, MediaError, MediaStore, ModelProvider, ProviderError};
use crate::request::{
    ContentRequest, ContentResponse, DownloadedMedia, ImageRequest, ResponsePart,
    VideoOperation, VideoSubmission,
};

type Scripted<T> = Mutex<VecDeque<Result<T, ProviderError>>>;

fn next<T>(queue: &Scripted<T>, what: &str) -> Result<T, ProviderError> {
    queue
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or_else(|| Err(ProviderError::Other(format!("no scripted {}", what))))
}

/// Provider that replays scripted replies and records every request
#[derive(Default)]
pub struct ScriptedProvider {
    content: Scripted<ContentResponse>,
    images: Scripted<Vec<String>>,
    submissions: Scripted<VideoOperation>,
    polls: Scripted<VideoOperation>,
    downloads: Scripted<DownloadedMedia>,
    pub content_requests: Mutex<Vec<ContentRequest>>,
    pub image_requests: Mutex<Vec<ImageRequest>>,
    pub video_submissions: Mutex<Vec<VideoSubmission>>,
    pub download_uris: Mutex<Vec<String>>,
    pub poll_count: AtomicU32,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, response: Result<ContentResponse, ProviderError>) -> Self {
        self.content.lock().unwrap().push_back(response);
        self
    }

    pub fn reply_text(self, text: &str) -> Self {
        self.reply(Ok(ContentResponse::from_text(text)))
    }

    pub fn reply_image(self, text: Option<&str>, image: Option<(&str, &str)>) -> Self {
        let mut parts = Vec::new();
        if let Some(text) = text {
            parts.push(ResponsePart::Text(text.to_string()));
        }
        if let Some((data, mime_type)) = image {
            parts.push(ResponsePart::Image(ImagePayload {
                data: data.to_string(),
                mime_type: mime_type.to_string(),
            }));
        }
        self.reply(Ok(ContentResponse {
            parts,
            sources: vec![],
        }))
    }

    pub fn fail(self, error: ProviderError) -> Self {
        self.reply(Err(error))
    }

    pub fn images(self, response: Result<Vec<String>, ProviderError>) -> Self {
        self.images.lock().unwrap().push_back(response);
        self
    }

    pub fn submitted(self, response: Result<VideoOperation, ProviderError>) -> Self {
        self.submissions.lock().unwrap().push_back(response);
        self
    }

    pub fn polled(self, response: Result<VideoOperation, ProviderError>) -> Self {
        self.polls.lock().unwrap().push_back(response);
        self
    }

    pub fn downloaded(self, response: Result<DownloadedMedia, ProviderError>) -> Self {
        self.downloads.lock().unwrap().push_back(response);
        self
    }

    pub fn content_calls(&self) -> usize {
        self.content_requests.lock().unwrap().len()
    }

    pub fn last_content_request(&self) -> ContentRequest {
        self.content_requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no content request recorded")
    }

    pub fn polls(&self) -> u32 {
        self.poll_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelProvider for ScriptedProvider {
    async fn generate_content(
        &self,
        request: &ContentRequest,
    ) -> Result<ContentResponse, ProviderError> {
        self.content_requests.lock().unwrap().push(request.clone());
        next(&self.content, "content")
    }

    async fn generate_images(&self, request: &ImageRequest) -> Result<Vec<String>, ProviderError> {
        self.image_requests.lock().unwrap().push(request.clone());
        next(&self.images, "images")
    }

    async fn submit_video(
        &self,
        submission: &VideoSubmission,
    ) -> Result<VideoOperation, ProviderError> {
        self.video_submissions
            .lock()
            .unwrap()
            .push(submission.clone());
        next(&self.submissions, "submission")
    }

    async fn fetch_video_operation(
        &self,
        _operation: &VideoOperation,
    ) -> Result<VideoOperation, ProviderError> {
        self.poll_count.fetch_add(1, Ordering::SeqCst);
        next(&self.polls, "poll")
    }

    async fn download_media(&self, uri: &str) -> Result<DownloadedMedia, ProviderError> {
        self.download_uris.lock().unwrap().push(uri.to_string());
        next(&self.downloads, "download")
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// Media store that keeps artifacts in memory
#[derive(Default)]
pub struct MemoryMediaStore {
    pub stored: Mutex<Vec<DownloadedMedia>>,
}

#[async_trait]
impl MediaStore for MemoryMediaStore {
    async fn store(&self, media: DownloadedMedia) -> Result<MediaHandle, MediaError> {
        if media.bytes.is_empty() {
            return Err(MediaError::Empty);
        }
        let mut stored = self.stored.lock().unwrap();
        let path = PathBuf::from(format!("/tmp/artifact-{}.mp4", stored.len()));
        let handle = MediaHandle {
            uri: format!("file://{}", path.display()),
            path,
            mime_type: media.mime_type.clone(),
            size_bytes: media.bytes.len() as u64,
        };
        stored.push(media);
        Ok(handle)
    }
}

pub struct FixedClock(pub OffsetDateTime);

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        self.0
    }
}
