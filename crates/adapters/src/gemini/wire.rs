//! Gemini REST wire types and their mapping to domain shapes

use content_studio_domain::ProviderError;
use content_studio_domain::model::{ImagePayload, InlineFile};
use content_studio_domain::repair;
use content_studio_domain::request::{
    ContentRequest, ContentResponse, OutputMode, Part, ResponsePart, Role, StringArraySchema,
    Turn, VideoOperation, VideoSubmission,
};
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<WirePart>,
}

#[derive(Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct WirePart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Tool {
    google_search: GoogleSearch,
}

#[derive(Serialize)]
struct GoogleSearch {}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_modalities: Option<Vec<&'static str>>,
}

fn wire_part(part: &Part) -> WirePart {
    match part {
        Part::Text(text) => WirePart {
            text: Some(text.clone()),
            inline_data: None,
        },
        Part::Inline(InlineFile { mime_type, data }) => WirePart {
            text: None,
            inline_data: Some(InlineData {
                mime_type: mime_type.clone(),
                data: data.clone(),
            }),
        },
    }
}

fn content(turn: &Turn) -> Content {
    Content {
        role: Some(match turn.role {
            Role::User => "user",
            Role::Model => "model",
        }),
        parts: turn.parts.iter().map(wire_part).collect(),
    }
}

fn response_schema(schema: &StringArraySchema) -> serde_json::Value {
    let mut value = serde_json::json!({
        "type": "OBJECT",
        "properties": {
            schema.field: {
                "type": "ARRAY",
                "items": { "type": "STRING" }
            }
        }
    });
    if schema.required {
        value["required"] = serde_json::json!([schema.field]);
    }
    value
}

impl From<&ContentRequest> for GenerateContentRequest {
    fn from(request: &ContentRequest) -> Self {
        let (tools, mut config) = match &request.mode {
            OutputMode::Unconstrained => (vec![], None),
            OutputMode::WebSearch => (
                vec![Tool {
                    google_search: GoogleSearch {},
                }],
                None,
            ),
            OutputMode::Schema(schema) => (
                vec![],
                Some(GenerationConfig {
                    response_mime_type: Some("application/json"),
                    response_schema: Some(response_schema(schema)),
                    response_modalities: None,
                }),
            ),
        };

        if request.with_image_output {
            config
                .get_or_insert(GenerationConfig {
                    response_mime_type: None,
                    response_schema: None,
                    response_modalities: None,
                })
                .response_modalities = Some(vec!["IMAGE", "TEXT"]);
        }

        Self {
            contents: request.turns.iter().map(content).collect(),
            system_instruction: request.system_instruction.as_ref().map(|text| Content {
                role: None,
                parts: vec![WirePart {
                    text: Some(text.clone()),
                    inline_data: None,
                }],
            }),
            tools,
            generation_config: config,
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub(super) struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
    #[serde(default)]
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<WirePart>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Deserialize)]
struct GroundingChunk {
    #[serde(default)]
    web: Option<WebChunk>,
}

#[derive(Deserialize)]
struct WebChunk {
    #[serde(default)]
    uri: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

const BLOCKING_FINISH_REASONS: &[&str] = &["SAFETY", "PROHIBITED_CONTENT", "BLOCKLIST", "SPII"];

impl GenerateContentResponse {
    /// Map the first candidate onto domain parts and sources
    pub(super) fn into_domain(self) -> Result<ContentResponse, ProviderError> {
        let block_reason = self.prompt_feedback.and_then(|f| f.block_reason);
        let Some(candidate) = self.candidates.into_iter().next() else {
            return match block_reason {
                Some(reason) => Err(ProviderError::Blocked(reason)),
                None => Ok(ContentResponse::default()),
            };
        };

        let parts: Vec<ResponsePart> = candidate
            .content
            .map(|c| c.parts)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|part| match (part.text, part.inline_data) {
                (_, Some(inline)) => Some(ResponsePart::Image(ImagePayload {
                    data: inline.data,
                    mime_type: inline.mime_type,
                })),
                (Some(text), None) => Some(ResponsePart::Text(text)),
                (None, None) => None,
            })
            .collect();

        if parts.is_empty()
            && let Some(reason) = candidate
                .finish_reason
                .filter(|r| BLOCKING_FINISH_REASONS.contains(&r.as_str()))
        {
            return Err(ProviderError::Blocked(reason));
        }

        let sources = candidate
            .grounding_metadata
            .map(|m| m.grounding_chunks)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|chunk| chunk.web)
            .filter_map(|web| repair::source(web.uri.as_deref(), web.title.as_deref()))
            .collect();

        Ok(ContentResponse { parts, sources })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PredictRequest {
    instances: Vec<PromptInstance>,
    parameters: ImageParameters,
}

#[derive(Serialize)]
struct PromptInstance {
    prompt: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageParameters {
    sample_count: u32,
    aspect_ratio: String,
    output_mime_type: String,
}

impl PredictRequest {
    pub(super) fn new(prompt: &str, count: u32, aspect_ratio: &str, output_mime_type: &str) -> Self {
        Self {
            instances: vec![PromptInstance {
                prompt: prompt.to_string(),
            }],
            parameters: ImageParameters {
                sample_count: count,
                aspect_ratio: aspect_ratio.to_string(),
                output_mime_type: output_mime_type.to_string(),
            },
        }
    }
}

#[derive(Deserialize)]
pub(super) struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Prediction {
    #[serde(default)]
    bytes_base64_encoded: Option<String>,
}

impl PredictResponse {
    pub(super) fn into_images(self) -> Vec<String> {
        self.predictions
            .into_iter()
            .filter_map(|p| p.bytes_base64_encoded)
            .collect()
    }
}

#[derive(Serialize)]
pub(super) struct VideoRequestBody {
    instances: Vec<VideoInstance>,
    parameters: VideoParameters,
}

#[derive(Serialize)]
struct VideoInstance {
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<VeoImage>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VeoImage {
    bytes_base64_encoded: String,
    mime_type: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VideoParameters {
    sample_count: u32,
}

impl From<&VideoSubmission> for VideoRequestBody {
    fn from(submission: &VideoSubmission) -> Self {
        Self {
            instances: vec![VideoInstance {
                prompt: submission.prompt.clone(),
                image: submission.reference_image.as_ref().map(|image| VeoImage {
                    bytes_base64_encoded: image.data.clone(),
                    mime_type: image.mime_type.clone(),
                }),
            }],
            parameters: VideoParameters {
                sample_count: submission.count,
            },
        }
    }
}

#[derive(Deserialize)]
pub(super) struct LongRunningOperation {
    name: String,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<OperationError>,
    #[serde(default)]
    response: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct OperationError {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    message: Option<String>,
}

const VIDEO_URI_POINTERS: &[&str] = &[
    "/generateVideoResponse/generatedSamples/0/video/uri",
    "/generateVideoResponse/generatedSamples/0/videoUri",
    "/generatedVideos/0/video/uri",
];

impl From<LongRunningOperation> for VideoOperation {
    fn from(operation: LongRunningOperation) -> Self {
        let error = operation.error.map(|e| match (e.code, e.message) {
            (Some(code), Some(message)) => format!("{} (code {})", message, code),
            (None, Some(message)) => message,
            (Some(code), None) => format!("error code {}", code),
            (None, None) => "unknown error".to_string(),
        });

        let video_uri = operation.response.as_ref().and_then(|response| {
            VIDEO_URI_POINTERS
                .iter()
                .find_map(|pointer| response.pointer(pointer).and_then(|v| v.as_str()))
                .map(str::to_string)
        });

        Self {
            name: operation.name,
            done: operation.done,
            error,
            video_uri,
        }
    }
}

/// Error envelope returned with non-success statuses
#[derive(Deserialize)]
pub(super) struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

impl ErrorEnvelope {
    pub(super) fn describe(self) -> String {
        match self.error.status {
            Some(status) => format!("{}: {}", status, self.error.message),
            None => self.error.message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use content_studio_domain::request::ModelRole;

    fn schema_request() -> ContentRequest {
        ContentRequest::text(
            "hola",
            OutputMode::Schema(StringArraySchema {
                field: "thread",
                required: true,
            }),
        )
        .with_system_instruction("sistema")
    }

    #[test]
    fn test_schema_mode_sets_json_config_without_tools() {
        let body = serde_json::to_value(GenerateContentRequest::from(&schema_request())).unwrap();

        assert!(body.get("tools").is_none());
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(
            body["generationConfig"]["responseSchema"]["properties"]["thread"]["type"],
            "ARRAY"
        );
        assert_eq!(
            body["generationConfig"]["responseSchema"]["required"],
            serde_json::json!(["thread"])
        );
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "sistema");
        assert_eq!(body["contents"][0]["role"], "user");
    }

    #[test]
    fn test_web_search_mode_sets_tool_only() {
        let request = ContentRequest::text("hola", OutputMode::WebSearch);
        let body = serde_json::to_value(GenerateContentRequest::from(&request)).unwrap();

        assert_eq!(body["tools"], serde_json::json!([{"googleSearch": {}}]));
        assert!(body.get("generationConfig").is_none());
    }

    #[test]
    fn test_image_output_requests_both_modalities() {
        let request = ContentRequest {
            model: ModelRole::ImageEdit,
            system_instruction: None,
            turns: vec![Turn::user(vec![
                Part::Inline(InlineFile {
                    mime_type: "image/png".to_string(),
                    data: "aW1n".to_string(),
                }),
                Part::Text("edita".to_string()),
            ])],
            mode: OutputMode::Unconstrained,
            with_image_output: true,
        };
        let body = serde_json::to_value(GenerateContentRequest::from(&request)).unwrap();

        assert_eq!(
            body["generationConfig"]["responseModalities"],
            serde_json::json!(["IMAGE", "TEXT"])
        );
        assert_eq!(body["contents"][0]["parts"][0]["inlineData"]["mimeType"], "image/png");
    }

    #[test]
    fn test_response_maps_parts_and_sources() {
        let response: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": {"parts": [
                    {"text": "hola"},
                    {"inlineData": {"mimeType": "image/png", "data": "aW1n"}}
                ]},
                "groundingMetadata": {"groundingChunks": [
                    {"web": {"uri": "https://a.com", "title": "A"}},
                    {"web": {"title": "no uri"}},
                    {"web": {"uri": "https://b.com"}}
                ]}
            }]
        }))
        .unwrap();

        let response = response.into_domain().unwrap();
        assert_eq!(response.text(), "hola");
        assert_eq!(response.image().unwrap().data, "aW1n");
        assert_eq!(response.sources.len(), 2);
        assert_eq!(response.sources[1].title, repair::DEFAULT_SOURCE_TITLE);
    }

    #[test]
    fn test_prompt_block_is_blocked_error() {
        let response: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "promptFeedback": {"blockReason": "SAFETY"}
        }))
        .unwrap();

        assert!(matches!(
            response.into_domain(),
            Err(ProviderError::Blocked(reason)) if reason == "SAFETY"
        ));
    }

    #[test]
    fn test_operation_maps_uri_and_error() {
        let done: LongRunningOperation = serde_json::from_value(serde_json::json!({
            "name": "operations/abc",
            "done": true,
            "response": {"generateVideoResponse": {"generatedSamples": [
                {"video": {"uri": "https://files/v.mp4?alt=media"}}
            ]}}
        }))
        .unwrap();
        let done = VideoOperation::from(done);
        assert!(done.done);
        assert_eq!(done.video_uri.as_deref(), Some("https://files/v.mp4?alt=media"));

        let failed: LongRunningOperation = serde_json::from_value(serde_json::json!({
            "name": "operations/abc",
            "done": true,
            "error": {"code": 8, "message": "Quota exceeded"}
        }))
        .unwrap();
        assert_eq!(
            VideoOperation::from(failed).error.as_deref(),
            Some("Quota exceeded (code 8)")
        );
    }
}
