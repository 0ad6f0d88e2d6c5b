//! Media commands - image generation, image editing and video

use anyhow::{Result, bail};
use content_studio_adapters::media::FsMediaStore;
use content_studio_domain::usecases::{VideoJobPoller, VideoProgress};
use content_studio_domain::{ImagePayload, VideoRequest};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use super::{
    build_client, build_provider, build_rate_limiter, print_json, read_inline_file, write_base64,
};
use crate::args::{EditImageArgs, ImageArgs, VideoArgs};
use crate::config::AppConfig;

pub async fn image(args: ImageArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;
    if args.prompt.trim().is_empty() {
        bail!("No prompt provided");
    }

    let client = build_client(&config)?;
    let images = client
        .generate_image(&args.prompt, &args.aspect_ratio)
        .await?;

    // One image is requested; extra payloads are ignored
    let Some(image) = images.first() else {
        bail!("The model did not return an image");
    };
    let size = write_base64(&args.output, image)?;
    println!("Image written to {} ({} bytes)", args.output.display(), size);
    Ok(())
}

pub async fn edit_image(args: EditImageArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;
    if args.instruction.trim().is_empty() {
        bail!("No edit instruction provided");
    }

    let input = read_inline_file(&args.input, None)?;
    let client = build_client(&config)?;
    let result = client
        .edit_image(&input.data, &input.mime_type, &args.instruction)
        .await?;

    let size = write_base64(&args.output, &result.image.data)?;
    println!(
        "Edited image written to {} ({}, {} bytes)",
        args.output.display(),
        result.image.mime_type,
        size
    );
    if !result.text.trim().is_empty() {
        println!("{}", result.text.trim());
    }
    Ok(())
}

pub async fn video(args: VideoArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;
    if args.prompt.trim().is_empty() {
        bail!("No prompt provided");
    }

    let reference_image = match &args.image {
        Some(path) => {
            let file = read_inline_file(path, None)?;
            Some(ImagePayload {
                data: file.data,
                mime_type: file.mime_type,
            })
        }
        None => None,
    };

    let mut poll_config = config.video.poll_config();
    if let Some(secs) = args.max_wait_secs {
        poll_config.max_wait = (secs > 0).then(|| Duration::from_secs(secs));
    }

    let provider = build_provider(&config)?;
    let store = Arc::new(FsMediaStore::new(config.general.media_dir.clone()));
    let mut poller = VideoJobPoller::new(provider, store, config.retry.policy(), poll_config);
    if let Some(limiter) = build_rate_limiter(&config) {
        poller = poller.with_rate_limiter(limiter);
    }

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling video job");
            on_interrupt.cancel();
        }
    });

    let request = VideoRequest {
        prompt: args.prompt.clone(),
        style: args.style.clone(),
        reference_image,
    };
    let reporter = |progress: &VideoProgress| eprintln!("{}", progress);

    let handle = poller.generate_video(&request, &reporter, &cancel).await?;

    if args.json {
        print_json(&handle)?;
    } else {
        println!("Video stored at {} ({} bytes)", handle.uri, handle.size_bytes);
    }
    Ok(())
}
