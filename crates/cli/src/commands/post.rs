//! Post commands - tweet, thread, proofread, regenerate

use anyhow::{Context, Result, bail};
use content_studio_domain::{GenerationRequest, PostKind, Source};
use serde::Serialize;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use super::{build_client, print_json, read_inline_file};
use crate::args::{PostArgs, ProofreadArgs, RegenerateArgs, ThreadArgs};
use crate::config::AppConfig;

#[derive(Debug, Serialize)]
struct PostOutput<'a> {
    kind: PostKind,
    posts: &'a [String],
}

fn generation_request(args: &PostArgs, config: &AppConfig) -> Result<GenerationRequest> {
    if args.prompt.trim().is_empty() {
        bail!("No prompt provided");
    }

    let source = args.source_url.as_ref().map(|uri| {
        Source::new(
            uri.clone(),
            args.source_title.clone().unwrap_or_else(|| uri.clone()),
        )
    });

    let file = match &args.file {
        Some(path) => Some(read_inline_file(path, None)?),
        None => None,
    };

    let brand_voice = (!args.no_brand_voice && !config.brand_voice.is_empty())
        .then(|| config.brand_voice.clone());

    Ok(GenerationRequest {
        prompt: args.prompt.clone(),
        source,
        audience: args.audience.clone(),
        tone: args.tone,
        format: args.format,
        keywords: args.keywords.clone(),
        brand_voice,
        file,
        use_web_search: args.web_search,
    })
}

fn print_posts(kind: PostKind, posts: &[String], json: bool) -> Result<()> {
    if json {
        return print_json(&PostOutput { kind, posts });
    }

    match posts {
        [single] if kind == PostKind::Single => println!("{}", single),
        _ => {
            for (i, post) in posts.iter().enumerate() {
                println!("[{}/{}] {}", i + 1, posts.len(), post);
                println!();
            }
        }
    }
    Ok(())
}

pub async fn tweet(args: PostArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;
    let request = generation_request(&args, &config)?;
    let client = build_client(&config)?;

    tracing::info!(
        provider = client.provider_name(),
        web_search = request.use_web_search,
        "Writing post"
    );

    let text = client.generate_text(&request).await?;
    print_posts(PostKind::Single, &[text], args.json)
}

pub async fn thread(args: ThreadArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;
    let request = generation_request(&args.post, &config)?;
    let client = build_client(&config)?;

    let mut posts = client.generate_thread(&request).await?;

    if !args.refine.is_empty() {
        let mut session = client.start_refinement(&request, PostKind::Thread, &posts);
        for instruction in &args.refine {
            tracing::info!(instruction = %instruction, "Applying refinement");
            posts = session.refine(instruction).await?;
        }
    }

    if args.proofread {
        posts = client.proofread(&posts).await?;
    }

    print_posts(PostKind::Thread, &posts, args.post.json)
}

pub async fn proofread(args: ProofreadArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;

    let posts = match &args.file {
        Some(path) => read_lines(path)?,
        None => args.posts.clone(),
    };
    if posts.is_empty() {
        bail!("No posts provided for proofreading");
    }

    let client = build_client(&config)?;
    let corrected = client.proofread(&posts).await?;
    print_posts(PostKind::Thread, &corrected, args.json)
}

pub async fn regenerate(args: RegenerateArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;
    if args.text.trim().is_empty() {
        bail!("No text provided to regenerate");
    }

    let client = build_client(&config)?;
    let text = client.regenerate(&args.text).await?;
    println!("{}", text);
    Ok(())
}

fn read_lines(path: &Path) -> Result<Vec<String>> {
    let content = if path.as_os_str() == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        buffer
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?
    };

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_lines_skips_blank_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("thread.txt");
        std::fs::write(&path, "Primer tuit\n\n  Segundo tuit  \n").unwrap();

        let lines = read_lines(path.as_path()).unwrap();
        assert_eq!(lines, vec!["Primer tuit", "Segundo tuit"]);
    }
}
