//! Generation client - text, thread, summary, search, image operations

use std::future::Future;
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

use crate::error::{AppError, CallContext, RawError, classify};
use crate::limiter::RateLimiter;
use crate::model::{
    EditResult, GenerationRequest, GroundedSummary, InlineFile, PostKind, PostSearch,
    SearchItem, TrendReport,
};
use crate::normalize::{self, NormalizeError};
use crate::ports::{Clock, ModelProvider, ProviderError, SystemClock};
use crate::prompts;
use crate::request::{
    ContentRequest, ContentResponse, ImageRequest, ModelRole, OutputMode, Part,
    StringArraySchema, Turn,
};
use crate::retry::{RetryPolicy, with_retry};
use crate::usecases::refine::RefinementSession;

pub(crate) const THREAD_SCHEMA: StringArraySchema = StringArraySchema {
    field: "thread",
    required: true,
};

const PROOFREAD_SCHEMA: StringArraySchema = StringArraySchema {
    field: "corrected_thread",
    required: false,
};

const IMAGE_MIME_TYPE: &str = "image/jpeg";

/// Send one content request through the limiter and the retry executor
pub(crate) async fn call_content<P: ModelProvider + ?Sized>(
    provider: &P,
    retry: &RetryPolicy,
    limiter: Option<&RateLimiter>,
    request: &ContentRequest,
) -> Result<ContentResponse, ProviderError> {
    with_retry(retry, move || async move {
        if let Some(limiter) = limiter {
            limiter.acquire().await;
        }
        provider.generate_content(request).await
    })
    .await
}

/// Classify a raw failure and log it once
pub(crate) fn surface(raw: RawError, context: CallContext) -> AppError {
    let error = classify(&raw, context);
    tracing::error!(
        context = %context,
        kind = %error.kind,
        error = %raw,
        "Generation failed"
    );
    error
}

fn empty(message: &str) -> RawError {
    RawError::Normalize(NormalizeError::Empty(message.to_string()))
}

/// Client for every request/response generation operation
pub struct GenerationClient<P: ?Sized> {
    provider: Arc<P>,
    retry: RetryPolicy,
    limiter: Option<Arc<RateLimiter>>,
    clock: Arc<dyn Clock>,
}

impl<P: ModelProvider + ?Sized> GenerationClient<P> {
    pub fn new(provider: Arc<P>, retry: RetryPolicy) -> Self {
        Self {
            provider,
            retry,
            limiter: None,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_rate_limiter(mut self, limiter: Arc<RateLimiter>) -> Self {
        self.limiter = Some(limiter);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    async fn content(&self, request: &ContentRequest) -> Result<ContentResponse, RawError> {
        call_content(
            self.provider.as_ref(),
            &self.retry,
            self.limiter.as_deref(),
            request,
        )
        .await
        .map_err(RawError::from)
    }

    /// Run one operation inside a call span and surface its failure
    async fn run<T, Fut>(&self, context: CallContext, operation: Fut) -> Result<T, AppError>
    where
        Fut: Future<Output = Result<T, RawError>>,
    {
        let span = tracing::info_span!(
            "generation",
            call_id = %Uuid::new_v4(),
            context = %context,
            provider = self.provider.name()
        );
        async move {
            tracing::info!("Starting generation");
            operation.await.map_err(|raw| surface(raw, context))
        }
        .instrument(span)
        .await
    }

    /// Write a single post
    pub async fn generate_text(&self, request: &GenerationRequest) -> Result<String, AppError> {
        self.run(CallContext::Tweet, async {
            let mode = if request.use_web_search {
                OutputMode::WebSearch
            } else {
                OutputMode::Unconstrained
            };
            let content = post_request(request, prompts::tweet_system_instruction(request), mode);
            let text = self.content(&content).await?.text();

            if text.trim().is_empty() {
                return Err(empty("The AI returned an empty tweet."));
            }
            Ok(text)
        })
        .await
    }

    /// Write a thread; JSON output without search, delimited output with it
    pub async fn generate_thread(
        &self,
        request: &GenerationRequest,
    ) -> Result<Vec<String>, AppError> {
        self.run(CallContext::Thread, async {
            let system = prompts::thread_system_instruction(request);

            let posts = if request.use_web_search {
                let content = post_request(request, system, OutputMode::WebSearch);
                let text = self.content(&content).await?.text();
                normalize::parse_delimited_thread(&text)
            } else {
                let content = post_request(request, system, OutputMode::Schema(THREAD_SCHEMA));
                let text = self.content(&content).await?.text();
                normalize::parse_json_thread(&text, THREAD_SCHEMA.field)?
            };

            if posts.is_empty() {
                return Err(empty("The AI returned an empty thread."));
            }
            tracing::debug!(posts = posts.len(), "Parsed thread");
            Ok(posts)
        })
        .await
    }

    /// Fix spelling and grammar; one output post per input post, same order
    pub async fn proofread(&self, thread: &[String]) -> Result<Vec<String>, AppError> {
        if thread.is_empty() {
            return Ok(vec![]);
        }

        self.run(CallContext::Proofreading, async {
            let content = ContentRequest::text(
                prompts::proofread_prompt(thread),
                OutputMode::Schema(PROOFREAD_SCHEMA),
            );
            let text = self.content(&content).await?.text();

            match normalize::parse_optional_json_array(&text, PROOFREAD_SCHEMA.field)? {
                None => {
                    tracing::warn!("Proofreading reply had no corrections, keeping input");
                    Ok(thread.to_vec())
                }
                Some(corrected) if corrected.len() != thread.len() => {
                    Err(RawError::Normalize(NormalizeError::Malformed(format!(
                        "proofreading returned {} posts for {} inputs",
                        corrected.len(),
                        thread.len()
                    ))))
                }
                Some(corrected) => Ok(corrected),
            }
        })
        .await
    }

    /// Rewrite a post with a fresh angle
    pub async fn regenerate(&self, original: &str) -> Result<String, AppError> {
        self.run(CallContext::Regeneration, async {
            let content = ContentRequest::text(
                prompts::regenerate_prompt(original),
                OutputMode::Unconstrained,
            );
            let text = self.content(&content).await?.text();

            if text.trim().is_empty() {
                return Err(empty("The AI returned an empty tweet."));
            }
            Ok(text)
        })
        .await
    }

    /// Summarize the page behind a URL using grounded search
    pub async fn summarize_url(&self, url: &str) -> Result<String, AppError> {
        self.run(CallContext::UrlSummary, async {
            let content =
                ContentRequest::text(prompts::summarize_url_prompt(url), OutputMode::WebSearch);
            let summary = self.content(&content).await?.text();

            normalize::ensure_substantive(
                &summary,
                "The AI reported that it could not access the content of the provided URL. Make sure it is a public, direct link and try again.",
            )?;
            Ok(summary)
        })
        .await
    }

    /// Summarize an uploaded document
    pub async fn summarize_file(&self, mime_type: &str, data: &str) -> Result<String, AppError> {
        self.run(CallContext::FileSummary, async {
            let content = ContentRequest {
                model: ModelRole::Text,
                system_instruction: None,
                turns: vec![Turn::user(vec![
                    Part::Text(prompts::SUMMARIZE_FILE_PROMPT.to_string()),
                    Part::Inline(InlineFile {
                        mime_type: mime_type.to_string(),
                        data: data.to_string(),
                    }),
                ])],
                mode: OutputMode::Unconstrained,
                with_image_output: false,
            };
            let summary = self.content(&content).await?.text();

            normalize::ensure_substantive(
                &summary,
                "The AI could not summarize this document. Check that the file is readable and try again.",
            )?;
            Ok(summary)
        })
        .await
    }

    /// Summarize a topic from grounded search, with the sources used
    pub async fn summarize_web_search(&self, query: &str) -> Result<GroundedSummary, AppError> {
        self.run(CallContext::WebSearchSummary, async {
            let content = ContentRequest::text(
                prompts::summarize_search_prompt(query),
                OutputMode::WebSearch,
            );
            let response = self.content(&content).await?;
            let summary = response.text();

            if summary.trim().is_empty() {
                return Err(empty(
                    "The AI returned an empty summary. This may be due to a lack of search results for the topic.",
                ));
            }
            normalize::ensure_substantive(
                &summary,
                "The AI could not find enough information to summarize this topic. Please try a different query.",
            )?;

            tracing::debug!(sources = response.sources.len(), "Grounded summary ready");
            Ok(GroundedSummary {
                summary,
                sources: response.sources,
            })
        })
        .await
    }

    /// Up to ten grounded web results
    pub async fn search_web(&self, query: &str) -> Result<Vec<SearchItem>, AppError> {
        self.run(CallContext::WebSearch, async {
            let content =
                ContentRequest::text(prompts::search_web_prompt(query), OutputMode::WebSearch);
            let text = self.content(&content).await?.text();
            Ok(normalize::parse_search_results(&text)?)
        })
        .await
    }

    /// Post-like records synthesized from grounded search
    pub async fn search_posts(&self, query: &str) -> Result<PostSearch, AppError> {
        self.run(CallContext::PostSearch, async {
            let content =
                ContentRequest::text(prompts::search_posts_prompt(query), OutputMode::WebSearch);
            let response = self.content(&content).await?;
            let search = normalize::parse_synthesized_posts(
                &response.text(),
                response.sources,
                self.clock.now(),
            )?;

            tracing::debug!(posts = search.posts.len(), "Synthesized posts");
            Ok(search)
        })
        .await
    }

    /// Current trending topics with the sources used
    pub async fn trending_topics(&self) -> Result<TrendReport, AppError> {
        self.run(CallContext::TrendingTopics, async {
            let content =
                ContentRequest::text(prompts::TRENDING_TOPICS_PROMPT, OutputMode::WebSearch);
            let response = self.content(&content).await?;
            let trends = normalize::parse_trends(&response.text())?;

            tracing::debug!(trends = trends.len(), "Parsed trends");
            Ok(TrendReport {
                trends,
                sources: response.sources,
            })
        })
        .await
    }

    /// Generate one JPEG; the aspect ratio is forwarded verbatim
    pub async fn generate_image(
        &self,
        prompt: &str,
        aspect_ratio: &str,
    ) -> Result<Vec<String>, AppError> {
        self.run(CallContext::Image, async {
            let request = ImageRequest {
                prompt: prompt.to_string(),
                aspect_ratio: aspect_ratio.to_string(),
                count: 1,
                output_mime_type: IMAGE_MIME_TYPE.to_string(),
            };
            let provider = self.provider.as_ref();
            let limiter = self.limiter.as_deref();
            let request = &request;

            let images: Vec<String> = with_retry(&self.retry, move || async move {
                if let Some(limiter) = limiter {
                    limiter.acquire().await;
                }
                provider.generate_images(request).await
            })
            .await?
            .into_iter()
            .filter(|image| !image.is_empty())
            .collect();

            if images.is_empty() {
                return Err(empty("The AI did not return any image."));
            }
            Ok(images)
        })
        .await
    }

    /// Edit an image according to an instruction
    pub async fn edit_image(
        &self,
        data: &str,
        mime_type: &str,
        instruction: &str,
    ) -> Result<EditResult, AppError> {
        self.run(CallContext::ImageEdit, async {
            let content = ContentRequest {
                model: ModelRole::ImageEdit,
                system_instruction: None,
                turns: vec![Turn::user(vec![
                    Part::Inline(InlineFile {
                        mime_type: mime_type.to_string(),
                        data: data.to_string(),
                    }),
                    Part::Text(prompts::edit_image_prompt(instruction)),
                ])],
                mode: OutputMode::Unconstrained,
                with_image_output: true,
            };
            let response = self.content(&content).await?;
            let text = response.text();

            match response.image() {
                Some(image) => Ok(EditResult {
                    text,
                    image: image.clone(),
                }),
                None if !text.trim().is_empty() => {
                    Err(RawError::Normalize(NormalizeError::Refusal(format!(
                        "The AI did not return an image and replied with: \"{}\"",
                        text.trim()
                    ))))
                }
                None => Err(empty(
                    "The AI did not return an edited image. This can happen when the request violates safety policies or the instruction is unclear.",
                )),
            }
        })
        .await
    }

    /// Open a conversational refinement over a finished post or thread
    pub fn start_refinement(
        &self,
        request: &GenerationRequest,
        kind: PostKind,
        posts: &[String],
    ) -> RefinementSession<P> {
        RefinementSession::new(
            Arc::clone(&self.provider),
            self.retry,
            self.limiter.clone(),
            request,
            kind,
            posts,
        )
    }
}

/// Build the request for a post or thread: grounded prompt plus optional file
fn post_request(request: &GenerationRequest, system: String, mode: OutputMode) -> ContentRequest {
    let mut parts = vec![Part::Text(prompts::grounded_prompt(
        &request.prompt,
        request.source.as_ref(),
    ))];
    if let Some(file) = &request.file {
        parts.push(Part::Inline(file.clone()));
    }

    ContentRequest {
        model: ModelRole::Text,
        system_instruction: Some(system),
        turns: vec![Turn::user(parts)],
        mode,
        with_image_output: false,
    }
}
