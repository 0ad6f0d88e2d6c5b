//! Stub model provider for offline runs and CLI tests

use async_trait::async_trait;
use content_studio_domain::model::Source;
use content_studio_domain::request::{
    ContentRequest, ContentResponse, DownloadedMedia, ImageRequest, OutputMode, Part,
    ResponsePart, VideoOperation, VideoSubmission,
};
use content_studio_domain::{ImagePayload, ModelProvider, ProviderError};

/// base64 of `stub`
pub const STUB_IMAGE_BASE64: &str = "c3R1Yg==";
pub const STUB_VIDEO_URI: &str = "stub://video";

const STUB_OPERATION: &str = "operations/stub";

/// Stub provider that echoes prompts back, or replays a fixed reply
#[derive(Debug, Clone, Default)]
pub struct StubProvider {
    reply: Option<String>,
    error: Option<String>,
}

impl StubProvider {
    /// Create a stub that echoes the last prompt
    pub fn echo() -> Self {
        Self::default()
    }

    /// Create a stub that answers every content request with `text`
    pub fn with_reply(text: impl Into<String>) -> Self {
        Self {
            reply: Some(text.into()),
            error: None,
        }
    }

    /// Create a stub that fails every call with `message`
    pub fn with_error(message: impl Into<String>) -> Self {
        Self {
            reply: None,
            error: Some(message.into()),
        }
    }

    fn check(&self) -> Result<(), ProviderError> {
        match &self.error {
            Some(message) => Err(ProviderError::Other(message.clone())),
            None => Ok(()),
        }
    }

    fn echo_text(request: &ContentRequest) -> String {
        let prompt = request
            .turns
            .last()
            .and_then(|turn| {
                turn.parts.iter().find_map(|part| match part {
                    Part::Text(text) => Some(text.as_str()),
                    Part::Inline(_) => None,
                })
            })
            .unwrap_or_default();
        let preview: String = prompt.chars().take(60).collect();
        format!("Stub response for: {}", preview.trim())
    }
}

#[async_trait]
impl ModelProvider for StubProvider {
    async fn generate_content(
        &self,
        request: &ContentRequest,
    ) -> Result<ContentResponse, ProviderError> {
        self.check()?;

        let text = match (&self.reply, &request.mode) {
            (Some(reply), _) => reply.clone(),
            (None, OutputMode::Schema(schema)) => {
                serde_json::json!({ schema.field: ["Stub post 1", "Stub post 2"] }).to_string()
            }
            (None, _) => Self::echo_text(request),
        };

        let mut parts = vec![ResponsePart::Text(text)];
        if request.with_image_output {
            parts.push(ResponsePart::Image(ImagePayload {
                data: STUB_IMAGE_BASE64.to_string(),
                mime_type: "image/png".to_string(),
            }));
        }

        let sources = if request.mode.uses_web_search() {
            vec![Source::new("https://example.com/stub", "Stub source")]
        } else {
            vec![]
        };

        Ok(ContentResponse { parts, sources })
    }

    async fn generate_images(&self, request: &ImageRequest) -> Result<Vec<String>, ProviderError> {
        self.check()?;
        Ok(vec![STUB_IMAGE_BASE64.to_string(); request.count as usize])
    }

    async fn submit_video(
        &self,
        _submission: &VideoSubmission,
    ) -> Result<VideoOperation, ProviderError> {
        self.check()?;
        Ok(VideoOperation {
            name: STUB_OPERATION.to_string(),
            ..VideoOperation::default()
        })
    }

    async fn fetch_video_operation(
        &self,
        operation: &VideoOperation,
    ) -> Result<VideoOperation, ProviderError> {
        self.check()?;
        Ok(VideoOperation {
            name: operation.name.clone(),
            done: true,
            error: None,
            video_uri: Some(STUB_VIDEO_URI.to_string()),
        })
    }

    async fn download_media(&self, _uri: &str) -> Result<DownloadedMedia, ProviderError> {
        self.check()?;
        Ok(DownloadedMedia {
            bytes: b"stub video".to_vec(),
            mime_type: "video/mp4".to_string(),
        })
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}
