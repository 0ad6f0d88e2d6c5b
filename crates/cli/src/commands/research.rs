//! Research commands - summaries, grounded search and trending topics

use anyhow::Result;
use content_studio_domain::Source;
use std::path::PathBuf;

use super::{build_client, print_json, read_inline_file};
use crate::args::{SearchArgs, SearchCommands, SummarizeArgs, SummarizeCommands};
use crate::config::AppConfig;

pub async fn summarize(args: SummarizeArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;
    let client = build_client(&config)?;

    match args.command {
        SummarizeCommands::Url { url } => {
            println!("{}", client.summarize_url(&url).await?);
        }
        SummarizeCommands::File { path, mime_type } => {
            let file = read_inline_file(&path, mime_type.as_deref())?;
            tracing::info!(mime_type = %file.mime_type, "Summarizing file");
            println!(
                "{}",
                client.summarize_file(&file.mime_type, &file.data).await?
            );
        }
        SummarizeCommands::Search { query, json } => {
            let summary = client.summarize_web_search(&query).await?;
            if json {
                print_json(&summary)?;
            } else {
                println!("{}", summary.summary);
                print_sources(&summary.sources);
            }
        }
    }

    Ok(())
}

pub async fn search(args: SearchArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;
    let client = build_client(&config)?;

    match args.command {
        SearchCommands::Web { query, json } => {
            let items = client.search_web(&query).await?;
            if json {
                return print_json(&items);
            }
            if items.is_empty() {
                println!("No results.");
            }
            for item in &items {
                println!("{}", item.title);
                println!("  {}", item.uri);
                println!("  {}", item.summary);
                println!();
            }
        }
        SearchCommands::Posts { query, json } => {
            let found = client.search_posts(&query).await?;
            if json {
                return print_json(&found);
            }
            if found.posts.is_empty() {
                println!("No posts found.");
            }
            for post in &found.posts {
                let verified = if post.author.verified { " ✓" } else { "" };
                println!("{} ({}){}", post.author.name, post.author.handle, verified);
                println!("  {}", post.content);
                println!(
                    "  ♥ {}  ⟲ {}  💬 {}  👁 {}",
                    post.stats.likes, post.stats.retweets, post.stats.replies, post.stats.impressions
                );
                if let Some(media) = &post.media {
                    println!("  [{:?}] {}", media.kind, media.url);
                }
                println!();
            }
            print_sources(&found.sources);
        }
        SearchCommands::Trends { json } => {
            let report = client.trending_topics().await?;
            if json {
                return print_json(&report);
            }
            if report.trends.is_empty() {
                println!("No trending topics found.");
            }
            for (i, trend) in report.trends.iter().enumerate() {
                println!("{}. {}", i + 1, trend.topic);
                println!("   {}", trend.description);
            }
            print_sources(&report.sources);
        }
    }

    Ok(())
}

fn print_sources(sources: &[Source]) {
    if sources.is_empty() {
        return;
    }
    println!();
    println!("Sources:");
    for source in sources {
        println!("  - {} <{}>", source.title, source.uri);
    }
}
