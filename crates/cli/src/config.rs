//! Configuration loading and management

use anyhow::{Context, Result};
use content_studio_adapters::GeminiSettings;
use content_studio_adapters::gemini::{DEFAULT_API_KEY_ENV, DEFAULT_BASE_URL};
use content_studio_domain::BrandVoice;
use content_studio_domain::RetryPolicy;
use content_studio_domain::usecases::PollConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub video: VideoConfig,

    #[serde(default)]
    pub limits: LimitsConfig,

    /// Applied to tweet and thread generation when any field is set
    #[serde(default)]
    pub brand_voice: BrandVoice,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_media_dir")]
    pub media_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// gemini or stub
    #[serde(default = "default_provider_kind")]
    pub kind: String,

    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_text_model")]
    pub text_model: String,

    #[serde(default = "default_image_model")]
    pub image_model: String,

    #[serde(default = "default_image_edit_model")]
    pub image_edit_model: String,

    #[serde(default = "default_video_model")]
    pub video_model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoConfig {
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// 0 waits indefinitely
    #[serde(default = "default_max_wait")]
    pub max_wait_secs: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LimitsConfig {
    #[serde(default)]
    pub rate_limit_per_minute: u32,

    #[serde(default)]
    pub rate_limit_per_hour: u32,
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_media_dir() -> PathBuf {
    PathBuf::from("./media")
}

fn default_provider_kind() -> String {
    "gemini".to_string()
}

fn default_api_key_env() -> String {
    DEFAULT_API_KEY_ENV.to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout() -> u64 {
    GeminiSettings::default().timeout_secs
}

fn default_text_model() -> String {
    GeminiSettings::default().text_model
}

fn default_image_model() -> String {
    GeminiSettings::default().image_model
}

fn default_image_edit_model() -> String {
    GeminiSettings::default().image_edit_model
}

fn default_video_model() -> String {
    GeminiSettings::default().video_model
}

fn default_max_attempts() -> u32 {
    RetryPolicy::default().max_attempts
}

fn default_initial_delay_ms() -> u64 {
    RetryPolicy::default().initial_delay_ms
}

fn default_backoff_multiplier() -> f64 {
    RetryPolicy::default().backoff_multiplier
}

fn default_poll_interval() -> u64 {
    10
}

fn default_max_wait() -> u64 {
    600
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            media_dir: default_media_dir(),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: default_provider_kind(),
            api_key_env: default_api_key_env(),
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            text_model: default_text_model(),
            image_model: default_image_model(),
            image_edit_model: default_image_edit_model(),
            video_model: default_video_model(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
            max_wait_secs: default_max_wait(),
        }
    }
}

impl ProviderConfig {
    pub fn gemini_settings(&self) -> GeminiSettings {
        GeminiSettings {
            base_url: self.base_url.clone(),
            text_model: self.text_model.clone(),
            image_model: self.image_model.clone(),
            image_edit_model: self.image_edit_model.clone(),
            video_model: self.video_model.clone(),
            timeout_secs: self.timeout_secs,
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_attempts,
            self.initial_delay_ms,
            self.backoff_multiplier,
        )
    }
}

impl VideoConfig {
    pub fn poll_config(&self) -> PollConfig {
        PollConfig {
            interval: Duration::from_secs(self.poll_interval_secs.max(1)),
            max_wait: (self.max_wait_secs > 0).then(|| Duration::from_secs(self.max_wait_secs)),
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        // Try default config path if none specified
        let default_path = PathBuf::from("./config.toml");
        let path = config_path.unwrap_or(&default_path);

        if path.exists() {
            builder = builder.add_source(config::File::from(path));
        } else if config_path.is_some() {
            anyhow::bail!("Config file not found: {}", path.display());
        }

        builder = builder.add_source(
            config::Environment::with_prefix("CONTENT_STUDIO")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Generate example configuration as TOML string
    pub fn example_toml() -> String {
        r#"# content-studio configuration

[general]
log_level = "info"
# Downloaded videos are stored here
media_dir = "./media"

[provider]
kind = "gemini"  # gemini, stub
api_key_env = "GEMINI_API_KEY"
base_url = "https://generativelanguage.googleapis.com/v1beta"
timeout_secs = 120
text_model = "gemini-2.5-flash"
image_model = "imagen-4.0-generate-001"
image_edit_model = "gemini-2.5-flash-image"
video_model = "veo-2.0-generate-001"

[retry]
max_attempts = 3
initial_delay_ms = 1000
backoff_multiplier = 2.0

[video]
poll_interval_secs = 10
# 0 waits indefinitely
max_wait_secs = 600

[limits]
# 0 disables rate limiting
rate_limit_per_minute = 0
rate_limit_per_hour = 0

[brand_voice]
# tone_and_style = "Cercano, directo y con humor"
# target_audience = "Emprendedores digitales"
# key_topics = "productividad, IA"
# topics_to_avoid = "política"
"#
        .to_string()
    }
}
