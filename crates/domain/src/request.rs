//! Provider-facing request and response shapes
//!
//! These are transport-agnostic: adapters translate them to a concrete wire
//! format. `OutputMode` is a tagged union so that schema-constrained output and
//! the web-search tool can never be requested together.

use crate::model::{ImagePayload, InlineFile, Source};

/// Which configured model should serve a content request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelRole {
    /// General text model
    Text,
    /// Multimodal model able to return edited images
    ImageEdit,
}

/// Author of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Model,
}

/// A piece of a turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    Text(String),
    Inline(InlineFile),
}

/// One conversation turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub parts: Vec<Part>,
}

impl Turn {
    pub fn user(parts: Vec<Part>) -> Self {
        Self {
            role: Role::User,
            parts,
        }
    }

    pub fn user_text(text: impl Into<String>) -> Self {
        Self::user(vec![Part::Text(text.into())])
    }

    pub fn model_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            parts: vec![Part::Text(text.into())],
        }
    }
}

/// JSON schema of an object holding a single array-of-strings field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringArraySchema {
    pub field: &'static str,
    pub required: bool,
}

/// How the model output is constrained for a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputMode {
    /// Free-form output, no tools
    Unconstrained,
    /// JSON output matching the schema, no tools
    Schema(StringArraySchema),
    /// Grounded web search tool enabled, free-form output
    WebSearch,
}

impl OutputMode {
    pub fn uses_web_search(&self) -> bool {
        matches!(self, OutputMode::WebSearch)
    }
}

/// A content generation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRequest {
    pub model: ModelRole,
    pub system_instruction: Option<String>,
    pub turns: Vec<Turn>,
    pub mode: OutputMode,
    /// Ask for image parts in addition to text
    pub with_image_output: bool,
}

impl ContentRequest {
    /// A single-turn text request
    pub fn text(prompt: impl Into<String>, mode: OutputMode) -> Self {
        Self {
            model: ModelRole::Text,
            system_instruction: None,
            turns: vec![Turn::user_text(prompt)],
            mode,
            with_image_output: false,
        }
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }
}

/// A piece of a model reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponsePart {
    Text(String),
    Image(ImagePayload),
}

/// A content generation reply
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentResponse {
    pub parts: Vec<ResponsePart>,
    /// Grounding sources in provider order
    pub sources: Vec<Source>,
}

impl ContentResponse {
    /// Build a text-only reply
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            parts: vec![ResponsePart::Text(text.into())],
            sources: vec![],
        }
    }

    pub fn with_sources(mut self, sources: Vec<Source>) -> Self {
        self.sources = sources;
        self
    }

    /// Concatenated text of all text parts
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|part| match part {
                ResponsePart::Text(text) => Some(text.as_str()),
                ResponsePart::Image(_) => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }

    /// The last image part, if any
    pub fn image(&self) -> Option<&ImagePayload> {
        self.parts.iter().rev().find_map(|part| match part {
            ResponsePart::Image(image) => Some(image),
            ResponsePart::Text(_) => None,
        })
    }
}

/// An image generation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    pub prompt: String,
    /// Passed to the provider verbatim, e.g. `16:9`
    pub aspect_ratio: String,
    pub count: u32,
    pub output_mime_type: String,
}

/// A video job submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoSubmission {
    pub prompt: String,
    pub reference_image: Option<ImagePayload>,
    pub count: u32,
}

/// Provider-side state of a long-running video job
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoOperation {
    /// Opaque operation reference
    pub name: String,
    pub done: bool,
    /// Error message reported by the job, if it failed
    pub error: Option<String>,
    /// Signed download URI of the finished video
    pub video_uri: Option<String>,
}

/// Raw bytes fetched from a download URI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedMedia {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_text_skips_images() {
        let response = ContentResponse {
            parts: vec![
                ResponsePart::Text("Hola ".to_string()),
                ResponsePart::Image(ImagePayload {
                    data: "aGk=".to_string(),
                    mime_type: "image/png".to_string(),
                }),
                ResponsePart::Text("mundo".to_string()),
            ],
            sources: vec![],
        };

        assert_eq!(response.text(), "Hola mundo");
        assert_eq!(response.image().map(|i| i.data.as_str()), Some("aGk="));
    }

    #[test]
    fn test_only_web_search_mode_uses_tool() {
        assert!(OutputMode::WebSearch.uses_web_search());
        assert!(!OutputMode::Unconstrained.uses_web_search());
        assert!(
            !OutputMode::Schema(StringArraySchema {
                field: "thread",
                required: true
            })
            .uses_web_search()
        );
    }
}
