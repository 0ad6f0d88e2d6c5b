//! Google Gemini REST adapter
//!
//! Serves text, schema-constrained and search-grounded generation, Imagen
//! image generation, multimodal image editing and Veo video jobs through one
//! authenticated HTTP client.

mod wire;

use async_trait::async_trait;
use content_studio_domain::request::{
    ContentRequest, ContentResponse, DownloadedMedia, ImageRequest, ModelRole, VideoOperation,
    VideoSubmission,
};
use content_studio_domain::{ConfigurationError, ModelProvider, ProviderError};
use reqwest::{Client, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

use wire::{
    ErrorEnvelope, GenerateContentRequest, GenerateContentResponse, LongRunningOperation,
    PredictRequest, PredictResponse, VideoRequestBody,
};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_API_KEY_ENV: &str = "GEMINI_API_KEY";

const DEFAULT_VIDEO_MIME: &str = "video/mp4";

/// Endpoint and model selection for [`GeminiProvider`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeminiSettings {
    pub base_url: String,
    pub text_model: String,
    pub image_model: String,
    pub image_edit_model: String,
    pub video_model: String,
    pub timeout_secs: u64,
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            text_model: "gemini-2.5-flash".to_string(),
            image_model: "imagen-4.0-generate-001".to_string(),
            image_edit_model: "gemini-2.5-flash-image".to_string(),
            video_model: "veo-2.0-generate-001".to_string(),
            timeout_secs: 120,
        }
    }
}

/// Gemini model provider
pub struct GeminiProvider {
    client: Client,
    api_key: SecretString,
    settings: GeminiSettings,
}

impl GeminiProvider {
    pub fn new(api_key: SecretString, settings: GeminiSettings) -> Result<Self, ConfigurationError> {
        if api_key.expose_secret().trim().is_empty() {
            return Err(ConfigurationError::Invalid("API key is empty".to_string()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| ConfigurationError::Invalid(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            settings,
        })
    }

    /// Build a provider reading the API key from the environment variable `var`
    pub fn from_env(var: &str, settings: GeminiSettings) -> Result<Self, ConfigurationError> {
        let key = std::env::var(var).map_err(|_| ConfigurationError::MissingApiKey(var.to_string()))?;
        if key.trim().is_empty() {
            return Err(ConfigurationError::EmptyApiKey(var.to_string()));
        }
        Self::new(SecretString::new(key.into()), settings)
    }

    pub fn settings(&self) -> &GeminiSettings {
        &self.settings
    }

    fn model_url(&self, model: &str, method: &str) -> String {
        format!(
            "{}/models/{}:{}",
            self.settings.base_url.trim_end_matches('/'),
            model,
            method
        )
    }

    async fn post<B: Serialize, R: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<R, ProviderError> {
        let response = self.send(self.client.post(url).json(body)).await?;
        response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.without_url().to_string()))
    }

    async fn send(&self, builder: RequestBuilder) -> Result<reqwest::Response, ProviderError> {
        let response = builder
            .header("x-goog-api-key", self.api_key.expose_secret())
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorEnvelope>(&body)
            .map(ErrorEnvelope::describe)
            .unwrap_or(body);

        tracing::debug!(status = status.as_u16(), message = %message, "Gemini call failed");

        Err(ProviderError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

fn transport_error(error: reqwest::Error) -> ProviderError {
    let error = error.without_url();
    if error.is_timeout() {
        ProviderError::Timeout(error.to_string())
    } else {
        ProviderError::Transport(error.to_string())
    }
}

#[async_trait]
impl ModelProvider for GeminiProvider {
    async fn generate_content(
        &self,
        request: &ContentRequest,
    ) -> Result<ContentResponse, ProviderError> {
        let model = match request.model {
            ModelRole::Text => &self.settings.text_model,
            ModelRole::ImageEdit => &self.settings.image_edit_model,
        };
        let url = self.model_url(model, "generateContent");

        let response: GenerateContentResponse = self
            .post(&url, &GenerateContentRequest::from(request))
            .await?;
        response.into_domain()
    }

    async fn generate_images(&self, request: &ImageRequest) -> Result<Vec<String>, ProviderError> {
        let url = self.model_url(&self.settings.image_model, "predict");
        let body = PredictRequest::new(
            &request.prompt,
            request.count,
            &request.aspect_ratio,
            &request.output_mime_type,
        );

        let response: PredictResponse = self.post(&url, &body).await?;
        Ok(response.into_images())
    }

    async fn submit_video(
        &self,
        submission: &VideoSubmission,
    ) -> Result<VideoOperation, ProviderError> {
        let url = self.model_url(&self.settings.video_model, "predictLongRunning");

        let operation: LongRunningOperation = self
            .post(&url, &VideoRequestBody::from(submission))
            .await?;
        Ok(operation.into())
    }

    async fn fetch_video_operation(
        &self,
        operation: &VideoOperation,
    ) -> Result<VideoOperation, ProviderError> {
        let url = format!(
            "{}/{}",
            self.settings.base_url.trim_end_matches('/'),
            operation.name
        );

        let response = self.send(self.client.get(&url)).await?;
        let refreshed: LongRunningOperation = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.without_url().to_string()))?;
        Ok(refreshed.into())
    }

    async fn download_media(&self, uri: &str) -> Result<DownloadedMedia, ProviderError> {
        let response = self
            .send(
                self.client
                    .get(uri)
                    .query(&[("key", self.api_key.expose_secret())]),
            )
            .await?;

        let mime_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or(v).trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_VIDEO_MIME.to_string());

        let bytes = response.bytes().await.map_err(transport_error)?;

        Ok(DownloadedMedia {
            bytes: bytes.to_vec(),
            mime_type,
        })
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use content_studio_domain::request::OutputMode;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer) -> GeminiProvider {
        GeminiProvider::new(
            SecretString::new("test-key".into()),
            GeminiSettings {
                base_url: server.uri(),
                timeout_secs: 5,
                ..GeminiSettings::default()
            },
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_generate_content_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/models/gemini-2.5-flash:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(serde_json::json!({
                "tools": [{"googleSearch": {}}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{"content": {"parts": [{"text": "Hola mundo"}]}}]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let response = provider(&mock_server)
            .generate_content(&ContentRequest::text("saluda", OutputMode::WebSearch))
            .await
            .unwrap();

        assert_eq!(response.text(), "Hola mundo");
    }

    #[tokio::test]
    async fn test_error_envelope_becomes_status_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/models/gemini-2.5-flash:generateContent"))
            .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
                "error": {
                    "code": 403,
                    "message": "The caller does not have permission",
                    "status": "PERMISSION_DENIED"
                }
            })))
            .mount(&mock_server)
            .await;

        let err = provider(&mock_server)
            .generate_content(&ContentRequest::text("x", OutputMode::Unconstrained))
            .await
            .unwrap_err();

        match err {
            ProviderError::Status { status, message } => {
                assert_eq!(status, 403);
                assert_eq!(message, "PERMISSION_DENIED: The caller does not have permission");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_undecodable_body_is_invalid_response() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/models/gemini-2.5-flash:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&mock_server)
            .await;

        let err = provider(&mock_server)
            .generate_content(&ContentRequest::text("x", OutputMode::Unconstrained))
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_generate_images_forwards_aspect_ratio() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/models/imagen-4.0-generate-001:predict"))
            .and(body_partial_json(serde_json::json!({
                "instances": [{"prompt": "un faro"}],
                "parameters": {"sampleCount": 1, "aspectRatio": "16:9", "outputMimeType": "image/jpeg"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "predictions": [{"bytesBase64Encoded": "aW1n", "mimeType": "image/jpeg"}]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let images = provider(&mock_server)
            .generate_images(&ImageRequest {
                prompt: "un faro".to_string(),
                aspect_ratio: "16:9".to_string(),
                count: 1,
                output_mime_type: "image/jpeg".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(images, vec!["aW1n"]);
    }

    #[tokio::test]
    async fn test_video_submit_poll_and_download() {
        let mock_server = MockServer::start().await;
        let video_uri = format!("{}/files/abc:download?alt=media", mock_server.uri());

        Mock::given(method("POST"))
            .and(path("/models/veo-2.0-generate-001:predictLongRunning"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": "models/veo-2.0-generate-001/operations/op1"
            })))
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/models/veo-2.0-generate-001/operations/op1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": "models/veo-2.0-generate-001/operations/op1",
                "done": true,
                "response": {"generateVideoResponse": {"generatedSamples": [
                    {"video": {"uri": video_uri}}
                ]}}
            })))
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/files/abc:download"))
            .and(query_param("alt", "media"))
            .and(query_param("key", "test-key"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "video/mp4")
                    .set_body_bytes(b"mp4-bytes".to_vec()),
            )
            .mount(&mock_server)
            .await;

        let gemini = provider(&mock_server);
        let submitted = gemini
            .submit_video(&VideoSubmission {
                prompt: "olas".to_string(),
                reference_image: None,
                count: 1,
            })
            .await
            .unwrap();
        assert!(!submitted.done);

        let polled = gemini.fetch_video_operation(&submitted).await.unwrap();
        assert!(polled.done);
        let uri = polled.video_uri.unwrap();

        let media = gemini.download_media(&uri).await.unwrap();
        assert_eq!(media.bytes, b"mp4-bytes");
        assert_eq!(media.mime_type, "video/mp4");
    }

    #[test]
    fn test_from_env_missing_key() {
        let result = GeminiProvider::from_env(
            "CONTENT_STUDIO_TEST_UNSET_GEMINI_KEY",
            GeminiSettings::default(),
        );
        assert!(matches!(
            result,
            Err(ConfigurationError::MissingApiKey(var)) if var == "CONTENT_STUDIO_TEST_UNSET_GEMINI_KEY"
        ));
    }

    #[test]
    fn test_default_settings_point_at_public_api() {
        let settings = GeminiSettings::default();
        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
        assert_eq!(settings.text_model, "gemini-2.5-flash");
        assert_eq!(settings.video_model, "veo-2.0-generate-001");
    }
}
