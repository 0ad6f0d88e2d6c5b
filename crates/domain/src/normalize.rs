//! Extraction of structured data from free-form model output

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use thiserror::Error;

use crate::model::{PostSearch, SearchItem, Source, SynthesizedPost, TrendingTopic};
use crate::repair;
use time::OffsetDateTime;

/// Delimiter between posts when the web-search tool is active
pub const THREAD_DELIMITER: &str = "|||";

/// Maximum number of web search results returned
pub const MAX_SEARCH_RESULTS: usize = 10;

/// Lowercase phrases that mark a textual refusal
pub const REFUSAL_PHRASES: &[&str] = &[
    "i cannot",
    "i am unable",
    "i'm unable",
    "no puedo",
    "soy incapaz",
    "unable to access",
    "no se encontraron",
];

/// Error type for normalization failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("malformed model output: {0}")]
    Malformed(String),
    #[error("{0}")]
    Refusal(String),
    #[error("{0}")]
    Empty(String),
}

static OPENING_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^```[A-Za-z]*[ \t]*\r?\n?").expect("opening fence pattern is valid")
});

static JSON_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:json|JSON)[ \t]*\r?\n(.*?)```").expect("json block pattern is valid")
});

/// Strip a Markdown code fence wrapper, if present, and trim whitespace.
///
/// Only a reply that starts with a fence, or that embeds a block tagged
/// `json`, is unwrapped. Backticks inside raw JSON are left alone.
pub fn strip_code_fence(response: &str) -> &str {
    let trimmed = response.trim();

    if let Some(opening) = OPENING_FENCE.find(trimmed) {
        let body = &trimmed[opening.end()..];
        // An unterminated opening fence still wraps JSON
        return body.strip_suffix("```").unwrap_or(body).trim();
    }

    if let Some(body) = JSON_BLOCK.captures(trimmed).and_then(|c| c.get(1)) {
        return body.as_str().trim();
    }

    trimmed
}

/// Parse a fenced or raw JSON document
pub fn parse_json(response: &str) -> Result<Value, NormalizeError> {
    serde_json::from_str(strip_code_fence(response))
        .map_err(|e| NormalizeError::Malformed(e.to_string()))
}

/// Read an array-of-strings field; non-string elements are skipped
fn string_array(value: &Value, field: &str) -> Option<Vec<String>> {
    value.get(field).and_then(Value::as_array).map(|items| {
        items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect()
    })
}

/// Parse a JSON object holding a single array-of-strings field
pub fn parse_json_thread(response: &str, field: &str) -> Result<Vec<String>, NormalizeError> {
    let value = parse_json(response)?;
    let posts = string_array(&value, field).unwrap_or_default();

    if posts.is_empty() {
        return Err(NormalizeError::Empty(
            "The AI returned an empty thread.".to_string(),
        ));
    }

    Ok(posts)
}

/// Like [`parse_json_thread`] but reports a missing field as `None`
pub fn parse_optional_json_array(
    response: &str,
    field: &str,
) -> Result<Option<Vec<String>>, NormalizeError> {
    let value = parse_json(response)?;
    Ok(string_array(&value, field))
}

/// Best-effort thread parsing used by conversational refinement: fall back to
/// one post per non-blank line when the output is not JSON
pub fn parse_thread_lenient(response: &str, field: &str) -> Vec<String> {
    match parse_json(response) {
        Ok(value) => string_array(&value, field).unwrap_or_default(),
        Err(e) => {
            tracing::warn!(error = %e, "Refinement output was not JSON, splitting on newlines");
            response
                .split('\n')
                .filter(|line| !line.trim().is_empty())
                .map(str::to_string)
                .collect()
        }
    }
}

/// Split delimiter-joined posts, trimming and dropping empty segments
pub fn parse_delimited_thread(response: &str) -> Vec<String> {
    response
        .split(THREAD_DELIMITER)
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

/// Whether the text reads as a model refusal
pub fn is_refusal(text: &str) -> bool {
    let lower = text.to_lowercase();
    REFUSAL_PHRASES.iter().any(|phrase| lower.contains(phrase))
}

/// Reject empty or refusing plain-text output
pub fn ensure_substantive(text: &str, refusal_message: &str) -> Result<(), NormalizeError> {
    if text.trim().is_empty() || is_refusal(text) {
        return Err(NormalizeError::Refusal(refusal_message.to_string()));
    }
    Ok(())
}

/// Parse a list payload; a parse failure on refusal text becomes a refusal
fn parse_list_payload(response: &str, refusal_message: &str) -> Result<Value, NormalizeError> {
    parse_json(response).map_err(|error| {
        if is_refusal(strip_code_fence(response)) {
            NormalizeError::Refusal(refusal_message.to_string())
        } else {
            error
        }
    })
}

fn array_field<'a>(value: &'a Value, field: &str) -> &'a [Value] {
    value
        .get(field)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Parse grounded web search results (`{"results": [...]}`), at most ten
pub fn parse_search_results(response: &str) -> Result<Vec<SearchItem>, NormalizeError> {
    let value = parse_list_payload(
        response,
        "The AI could not process this search. This can happen with sensitive topics or when no relevant results exist. Please try a different query.",
    )?;

    let items: Vec<SearchItem> = array_field(&value, "results")
        .iter()
        .filter_map(repair::search_item)
        .take(MAX_SEARCH_RESULTS)
        .collect();

    tracing::debug!(count = items.len(), "Parsed search results");
    Ok(items)
}

/// Parse trending topics (`{"trends": [...]}`)
pub fn parse_trends(response: &str) -> Result<Vec<TrendingTopic>, NormalizeError> {
    let value = parse_list_payload(
        response,
        "The AI could not retrieve trending topics right now. Please try again later.",
    )?;

    Ok(array_field(&value, "trends")
        .iter()
        .filter_map(repair::trending_topic)
        .collect())
}

/// Parse synthesized posts (`{"tweets": [...]}`) with per-field repair
pub fn parse_synthesized_posts(
    response: &str,
    sources: Vec<Source>,
    posted_at: OffsetDateTime,
) -> Result<PostSearch, NormalizeError> {
    let value = parse_list_payload(
        response,
        "The AI could not find posts for this query. Please try a different one.",
    )?;

    let posts: Vec<SynthesizedPost> = array_field(&value, "tweets")
        .iter()
        .enumerate()
        .map(|(index, raw)| repair::synthesized_post(raw, index, posted_at))
        .collect();

    Ok(PostSearch { posts, sources })
}
