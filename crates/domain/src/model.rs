//! Domain models and value objects

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use time::OffsetDateTime;

/// A citation attached to grounded results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub uri: String,
    pub title: String,
}

impl Source {
    pub fn new(uri: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            title: title.into(),
        }
    }
}

/// A file sent inline with a request (base64 payload)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineFile {
    pub mime_type: String,
    /// Base64-encoded bytes
    pub data: String,
}

/// Tone presets for generated posts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Authority,
    Storytelling,
    Analytical,
    Conversational,
    Inspirational,
}

impl Tone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Authority => "authority",
            Tone::Storytelling => "storytelling",
            Tone::Analytical => "analytical",
            Tone::Conversational => "conversational",
            Tone::Inspirational => "inspirational",
        }
    }
}

impl FromStr for Tone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "authority" => Ok(Tone::Authority),
            "storytelling" => Ok(Tone::Storytelling),
            "analytical" => Ok(Tone::Analytical),
            "conversational" => Ok(Tone::Conversational),
            "inspirational" => Ok(Tone::Inspirational),
            other => Err(format!("unknown tone '{}'", other)),
        }
    }
}

/// Structural format presets for generated posts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostFormat {
    Announcement,
    Listicle,
    HowTo,
    Question,
    QuickTip,
    SupportStatement,
}

impl PostFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostFormat::Announcement => "announcement",
            PostFormat::Listicle => "listicle",
            PostFormat::HowTo => "how_to",
            PostFormat::Question => "question",
            PostFormat::QuickTip => "quick_tip",
            PostFormat::SupportStatement => "support_statement",
        }
    }
}

impl FromStr for PostFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "announcement" => Ok(PostFormat::Announcement),
            "listicle" => Ok(PostFormat::Listicle),
            "how_to" => Ok(PostFormat::HowTo),
            "question" => Ok(PostFormat::Question),
            "quick_tip" => Ok(PostFormat::QuickTip),
            "support_statement" => Ok(PostFormat::SupportStatement),
            other => Err(format!("unknown format '{}'", other)),
        }
    }
}

impl fmt::Display for PostFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User-defined brand voice profile
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandVoice {
    #[serde(default)]
    pub tone_and_style: String,
    #[serde(default)]
    pub target_audience: String,
    #[serde(default)]
    pub key_topics: String,
    #[serde(default)]
    pub topics_to_avoid: String,
}

impl BrandVoice {
    /// True when no field carries any content
    pub fn is_empty(&self) -> bool {
        [
            &self.tone_and_style,
            &self.target_audience,
            &self.key_topics,
            &self.topics_to_avoid,
        ]
        .iter()
        .all(|field| field.trim().is_empty())
    }
}

/// Input for text and thread generation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,
    #[serde(default)]
    pub source: Option<Source>,
    #[serde(default)]
    pub audience: Option<String>,
    #[serde(default)]
    pub tone: Option<Tone>,
    #[serde(default)]
    pub format: Option<PostFormat>,
    #[serde(default)]
    pub keywords: Option<String>,
    #[serde(default)]
    pub brand_voice: Option<BrandVoice>,
    #[serde(default)]
    pub file: Option<InlineFile>,
    #[serde(default)]
    pub use_web_search: bool,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }
}

/// A single web search hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchItem {
    pub title: String,
    pub uri: String,
    pub summary: String,
}

/// A currently trending topic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendingTopic {
    pub topic: String,
    pub description: String,
}

/// Trending topics plus the grounding sources used to find them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendReport {
    pub trends: Vec<TrendingTopic>,
    pub sources: Vec<Source>,
}

/// Summary text plus the grounding sources used to write it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundedSummary {
    pub summary: String,
    pub sources: Vec<Source>,
}

/// Author of a synthesized post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostAuthor {
    pub name: String,
    pub handle: String,
    pub avatar_url: String,
    pub verified: bool,
}

/// Engagement counters of a synthesized post
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostStats {
    pub likes: u64,
    pub retweets: u64,
    pub impressions: u64,
    pub replies: u64,
}

/// Kind of media attached to a post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

/// Media attached to a synthesized post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostMedia {
    pub kind: MediaKind,
    pub url: String,
}

/// A post-like record synthesized from grounded search results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthesizedPost {
    pub id: String,
    pub content: String,
    pub author: PostAuthor,
    pub media: Option<PostMedia>,
    pub stats: PostStats,
    #[serde(with = "time::serde::rfc3339")]
    pub posted_at: OffsetDateTime,
}

/// Synthesized posts plus the grounding sources used
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostSearch {
    pub posts: Vec<SynthesizedPost>,
    pub sources: Vec<Source>,
}

/// An image payload returned by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePayload {
    /// Base64-encoded bytes
    pub data: String,
    pub mime_type: String,
}

/// Result of an image edit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditResult {
    /// Any text the model returned alongside the image
    pub text: String,
    pub image: ImagePayload,
}

/// Input for video generation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoRequest {
    pub prompt: String,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub reference_image: Option<ImagePayload>,
}

/// A locally resolvable handle to a downloaded artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaHandle {
    /// `file://` URI of the stored artifact
    pub uri: String,
    pub path: std::path::PathBuf,
    pub mime_type: String,
    pub size_bytes: u64,
}

/// Whether a generation produced a single post or a thread
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostKind {
    Single,
    Thread,
}
