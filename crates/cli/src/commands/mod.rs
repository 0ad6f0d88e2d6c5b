//! Subcommand implementations and the wiring they share

pub mod config;
pub mod doctor;
pub mod media;
pub mod post;
pub mod research;

use anyhow::{Context, Result, bail};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use content_studio_adapters::{GeminiProvider, StubProvider};
use content_studio_domain::usecases::GenerationClient;
use content_studio_domain::{AppError, InlineFile, ModelProvider, RateLimiter};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

use crate::config::AppConfig;

pub(crate) type Client = GenerationClient<dyn ModelProvider>;

pub(crate) fn build_provider(config: &AppConfig) -> Result<Arc<dyn ModelProvider>> {
    match config.provider.kind.as_str() {
        "gemini" => {
            let provider = GeminiProvider::from_env(
                &config.provider.api_key_env,
                config.provider.gemini_settings(),
            )
            .map_err(AppError::from)?;
            Ok(Arc::new(provider))
        }
        "stub" => Ok(Arc::new(StubProvider::echo())),
        other => bail!("Unknown provider kind: {} (expected gemini or stub)", other),
    }
}

pub(crate) fn build_rate_limiter(config: &AppConfig) -> Option<Arc<RateLimiter>> {
    RateLimiter::from_limits(
        config.limits.rate_limit_per_minute,
        config.limits.rate_limit_per_hour,
    )
    .map(Arc::new)
}

pub(crate) fn build_client(config: &AppConfig) -> Result<Client> {
    let provider = build_provider(config)?;
    let client = GenerationClient::new(provider, config.retry.policy());

    Ok(match build_rate_limiter(config) {
        Some(limiter) => client.with_rate_limiter(limiter),
        None => client,
    })
}

/// Read a file as a base64 inline payload, guessing its MIME type from the extension
pub(crate) fn read_inline_file(path: &Path, mime_type: Option<&str>) -> Result<InlineFile> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))?;
    if bytes.is_empty() {
        bail!("File is empty: {}", path.display());
    }

    let mime_type = match mime_type {
        Some(mime_type) => mime_type.to_string(),
        None => mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string(),
    };

    Ok(InlineFile {
        mime_type,
        data: STANDARD.encode(bytes),
    })
}

pub(crate) fn write_base64(path: &Path, data: &str) -> Result<usize> {
    let bytes = STANDARD
        .decode(data)
        .context("Model returned an image that is not valid base64")?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    std::fs::write(path, &bytes)
        .with_context(|| format!("Failed to write file: {}", path.display()))?;

    Ok(bytes.len())
}

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}
