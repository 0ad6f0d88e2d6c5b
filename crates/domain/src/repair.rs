//! Field repair for loosely shaped model JSON
//!
//! Each record field has one accessor that knows the spellings the model has
//! been seen to use, tried in order, and the default applied when none match.

use serde_json::Value;
use time::OffsetDateTime;

use crate::model::{
    MediaKind, PostAuthor, PostMedia, PostStats, SearchItem, Source, SynthesizedPost,
    TrendingTopic,
};

/// Neutral silhouette used when a synthesized post has no avatar
pub const DEFAULT_AVATAR_URL: &str = "data:image/svg+xml,%3Csvg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 24 24' fill='%23657786'%3E%3Cpath d='M16 7a4 4 0 11-8 0 4 4 0 018 0zM12 14a7 7 0 00-7 7h14a7 7 0 00-7-7z'/%3E%3C/svg%3E";

pub const DEFAULT_CONTENT: &str = "[No content]";
pub const DEFAULT_AUTHOR_NAME: &str = "Unknown User";
pub const DEFAULT_HANDLE: &str = "@unknown";
pub const DEFAULT_TITLE: &str = "Untitled";
pub const DEFAULT_SOURCE_TITLE: &str = "Unknown source";

/// Resolve a dotted path such as `author.name`
fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(value, |current, key| current.get(key))
}

/// First non-empty string among the given paths
fn first_str(value: &Value, paths: &[&str]) -> Option<String> {
    paths
        .iter()
        .filter_map(|path| lookup(value, path))
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

/// First strict boolean among the given paths
fn first_bool(value: &Value, paths: &[&str]) -> Option<bool> {
    paths
        .iter()
        .filter_map(|path| lookup(value, path))
        .find_map(Value::as_bool)
}

/// A non-negative count given as a JSON number or a numeric string
fn as_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().replace(',', "").parse().ok(),
        _ => None,
    }
}

fn first_count(value: &Value, paths: &[&str]) -> u64 {
    paths
        .iter()
        .filter_map(|path| lookup(value, path))
        .find_map(as_count)
        .unwrap_or(0)
}

pub fn post_id(raw: &Value, index: usize) -> String {
    first_str(raw, &["id", "postId"])
        .or_else(|| {
            // Numeric ids are common in post-shaped output
            ["id", "postId"]
                .iter()
                .filter_map(|key| raw.get(*key))
                .find_map(Value::as_u64)
                .map(|n| n.to_string())
        })
        .unwrap_or_else(|| format!("search-post-{}", index))
}

pub fn post_content(raw: &Value) -> String {
    first_str(raw, &["content", "text"]).unwrap_or_else(|| DEFAULT_CONTENT.to_string())
}

pub fn author_name(raw: &Value) -> String {
    first_str(raw, &["author.name", "name", "author_name"])
        .unwrap_or_else(|| DEFAULT_AUTHOR_NAME.to_string())
}

pub fn author_handle(raw: &Value) -> String {
    first_str(
        raw,
        &["author.handle", "handle", "author.username", "username"],
    )
    .unwrap_or_else(|| DEFAULT_HANDLE.to_string())
}

pub fn author_avatar(raw: &Value) -> String {
    first_str(
        raw,
        &[
            "author.avatarUrl",
            "avatarUrl",
            "author.avatar_url",
            "avatar_url",
        ],
    )
    .unwrap_or_else(|| DEFAULT_AVATAR_URL.to_string())
}

pub fn author_verified(raw: &Value) -> bool {
    first_bool(raw, &["author.verified", "verified"]).unwrap_or(false)
}

pub fn post_stats(raw: &Value) -> PostStats {
    PostStats {
        likes: first_count(raw, &["stats.likes", "likes"]),
        retweets: first_count(raw, &["stats.retweets", "retweets"]),
        impressions: first_count(raw, &["stats.impressions", "impressions"]),
        replies: first_count(raw, &["stats.replies", "replies"]),
    }
}

pub fn post_media(raw: &Value) -> Option<PostMedia> {
    let media = raw.get("media")?;
    let kind = match media.get("type").and_then(Value::as_str)?.to_lowercase().as_str() {
        "image" => MediaKind::Image,
        "video" => MediaKind::Video,
        _ => return None,
    };
    let url = first_str(media, &["url"])?;
    Some(PostMedia { kind, url })
}

/// Build a post from one raw entry, applying every field default
pub fn synthesized_post(raw: &Value, index: usize, posted_at: OffsetDateTime) -> SynthesizedPost {
    SynthesizedPost {
        id: post_id(raw, index),
        content: post_content(raw),
        author: PostAuthor {
            name: author_name(raw),
            handle: author_handle(raw),
            avatar_url: author_avatar(raw),
            verified: author_verified(raw),
        },
        media: post_media(raw),
        stats: post_stats(raw),
        posted_at,
    }
}

/// Build a search hit; entries without a link are dropped
pub fn search_item(raw: &Value) -> Option<SearchItem> {
    let uri = first_str(raw, &["uri", "url", "link"])?;
    Some(SearchItem {
        title: first_str(raw, &["title", "name"]).unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        uri,
        summary: first_str(raw, &["summary", "description", "snippet"]).unwrap_or_default(),
    })
}

/// Build a trend; entries without a topic are dropped
pub fn trending_topic(raw: &Value) -> Option<TrendingTopic> {
    let topic = first_str(raw, &["topic", "name", "hashtag"])?;
    Some(TrendingTopic {
        topic,
        description: first_str(raw, &["description", "summary", "reason"]).unwrap_or_default(),
    })
}

/// Build a grounding source; chunks without a URI are dropped
pub fn source(uri: Option<&str>, title: Option<&str>) -> Option<Source> {
    let uri = uri.map(str::trim).filter(|u| !u.is_empty())?;
    let title = title
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_SOURCE_TITLE);
    Some(Source::new(uri, title))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_post_missing_avatar_and_stats_gets_defaults() {
        let raw = json!({"content": "Hola", "author": {"name": "Ana", "handle": "@ana"}});
        let post = synthesized_post(&raw, 0, OffsetDateTime::UNIX_EPOCH);

        assert_eq!(post.author.avatar_url, DEFAULT_AVATAR_URL);
        assert_eq!(
            post.stats,
            PostStats {
                likes: 0,
                retweets: 0,
                impressions: 0,
                replies: 0
            }
        );
        assert_eq!(post.author.name, "Ana");
        assert_eq!(post.id, "search-post-0");
    }

    #[test]
    fn test_flat_author_fields_are_accepted() {
        let raw = json!({"text": "Flat", "name": "Bo", "username": "@bo", "avatar_url": "https://a/b.png", "verified": true});
        let post = synthesized_post(&raw, 4, OffsetDateTime::UNIX_EPOCH);

        assert_eq!(post.content, "Flat");
        assert_eq!(post.author.name, "Bo");
        assert_eq!(post.author.handle, "@bo");
        assert_eq!(post.author.avatar_url, "https://a/b.png");
        assert!(post.author.verified);
        assert_eq!(post.id, "search-post-4");
    }

    #[test]
    fn test_nested_author_wins_over_flat() {
        let raw = json!({"author": {"name": "Nested"}, "name": "Flat"});
        assert_eq!(author_name(&raw), "Nested");
    }

    #[test]
    fn test_verified_must_be_boolean() {
        let raw = json!({"author": {"verified": "yes"}});
        assert!(!author_verified(&raw));
    }

    #[test]
    fn test_stats_accept_numeric_strings() {
        let raw = json!({"stats": {"likes": "1,200", "retweets": 5}, "replies": 3});
        let stats = post_stats(&raw);
        assert_eq!(stats.likes, 1200);
        assert_eq!(stats.retweets, 5);
        assert_eq!(stats.impressions, 0);
        assert_eq!(stats.replies, 3);
    }

    #[test]
    fn test_media_requires_type_and_url() {
        assert_eq!(
            post_media(&json!({"media": {"type": "image", "url": "https://x/y.jpg"}})),
            Some(PostMedia {
                kind: MediaKind::Image,
                url: "https://x/y.jpg".to_string()
            })
        );
        assert_eq!(post_media(&json!({"media": {"type": "image"}})), None);
        assert_eq!(post_media(&json!({"media": {"type": "gif", "url": "u"}})), None);
    }

    #[test]
    fn test_search_item_defaults_and_drops() {
        let item = search_item(&json!({"link": "https://e.com", "snippet": "s"})).unwrap();
        assert_eq!(item.title, DEFAULT_TITLE);
        assert_eq!(item.summary, "s");
        assert!(search_item(&json!({"title": "No link"})).is_none());
    }

    #[test]
    fn test_trend_accepts_hashtag() {
        let trend = trending_topic(&json!({"hashtag": "#Rust", "reason": "release"})).unwrap();
        assert_eq!(trend.topic, "#Rust");
        assert_eq!(trend.description, "release");
    }

    #[test]
    fn test_source_requires_uri() {
        assert_eq!(
            source(Some("https://e.com"), None),
            Some(Source::new("https://e.com", DEFAULT_SOURCE_TITLE))
        );
        assert_eq!(source(Some("  "), Some("t")), None);
        assert_eq!(source(None, Some("t")), None);
    }
}
