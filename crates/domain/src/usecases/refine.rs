//! Conversational refinement of a generated post or thread

use std::sync::Arc;

use crate::error::{AppError, CallContext, RawError};
use crate::limiter::RateLimiter;
use crate::model::{GenerationRequest, PostKind};
use crate::normalize::{self, NormalizeError};
use crate::ports::ModelProvider;
use crate::prompts;
use crate::request::{ContentRequest, ModelRole, OutputMode, Turn};
use crate::retry::RetryPolicy;
use crate::usecases::generate::{THREAD_SCHEMA, call_content, surface};

/// A chat over one generation. History grows by two turns per successful
/// refinement and is left untouched when a refinement fails.
pub struct RefinementSession<P: ?Sized> {
    provider: Arc<P>,
    retry: RetryPolicy,
    limiter: Option<Arc<RateLimiter>>,
    system_instruction: String,
    kind: PostKind,
    history: Vec<Turn>,
}

impl<P: ModelProvider + ?Sized> RefinementSession<P> {
    pub(crate) fn new(
        provider: Arc<P>,
        retry: RetryPolicy,
        limiter: Option<Arc<RateLimiter>>,
        request: &GenerationRequest,
        kind: PostKind,
        posts: &[String],
    ) -> Self {
        let (system_instruction, reply) = match kind {
            PostKind::Thread => {
                // The chat asks for JSON, so the instruction must not describe delimited output
                let json_request = GenerationRequest {
                    use_web_search: false,
                    ..request.clone()
                };
                (
                    prompts::thread_system_instruction(&json_request),
                    serde_json::json!({ "thread": posts }).to_string(),
                )
            }
            PostKind::Single => (
                prompts::tweet_system_instruction(request),
                posts.first().cloned().unwrap_or_default(),
            ),
        };

        Self {
            provider,
            retry,
            limiter,
            system_instruction,
            kind,
            history: vec![
                Turn::user_text(request.prompt.clone()),
                Turn::model_text(reply),
            ],
        }
    }

    pub fn kind(&self) -> PostKind {
        self.kind
    }

    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    /// Ask for a revised version following `instruction`
    pub async fn refine(&mut self, instruction: &str) -> Result<Vec<String>, AppError> {
        tracing::info!(kind = ?self.kind, turns = self.history.len(), "Refining generation");

        let prompt = prompts::refinement_prompt(instruction, self.kind);
        match self.exchange(&prompt).await {
            Ok((reply, posts)) => {
                self.history.push(Turn::user_text(prompt));
                self.history.push(Turn::model_text(reply));
                Ok(posts)
            }
            Err(raw) => Err(surface(raw, CallContext::Refinement)),
        }
    }

    async fn exchange(&self, prompt: &str) -> Result<(String, Vec<String>), RawError> {
        let mode = match self.kind {
            PostKind::Thread => OutputMode::Schema(THREAD_SCHEMA),
            PostKind::Single => OutputMode::WebSearch,
        };

        let mut turns = self.history.clone();
        turns.push(Turn::user_text(prompt));

        let request = ContentRequest {
            model: ModelRole::Text,
            system_instruction: Some(self.system_instruction.clone()),
            turns,
            mode,
            with_image_output: false,
        };

        let reply = call_content(
            self.provider.as_ref(),
            &self.retry,
            self.limiter.as_deref(),
            &request,
        )
        .await?
        .text();

        let posts = match self.kind {
            PostKind::Thread => normalize::parse_thread_lenient(&reply, THREAD_SCHEMA.field),
            PostKind::Single if reply.trim().is_empty() => vec![],
            PostKind::Single => vec![reply.clone()],
        };

        if posts.is_empty() {
            return Err(RawError::Normalize(NormalizeError::Empty(
                "The AI returned an empty response.".to_string(),
            )));
        }

        Ok((reply, posts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::request::{Part, Role};
    use crate::testing::ScriptedProvider;
    use crate::usecases::GenerationClient;

    fn text_of(turn: &Turn) -> &str {
        match &turn.parts[0] {
            Part::Text(text) => text,
            Part::Inline(_) => panic!("expected text part"),
        }
    }

    #[tokio::test]
    async fn test_thread_refinement_sends_history_with_schema() {
        let provider = Arc::new(
            ScriptedProvider::new().reply_text(r#"{"thread":["uno corto","dos corto"]}"#),
        );
        let client = GenerationClient::new(Arc::clone(&provider), RetryPolicy::default());
        let request = GenerationRequest::new("hilo sobre ahorro");
        let mut session = client.start_refinement(
            &request,
            PostKind::Thread,
            &["uno".to_string(), "dos".to_string()],
        );

        let posts = session.refine("más corto").await.unwrap();
        assert_eq!(posts, vec!["uno corto", "dos corto"]);

        let sent = provider.last_content_request();
        assert_eq!(sent.mode, OutputMode::Schema(THREAD_SCHEMA));
        assert_eq!(sent.turns.len(), 3);
        assert_eq!(sent.turns[1].role, Role::Model);
        assert_eq!(text_of(&sent.turns[1]), r#"{"thread":["uno","dos"]}"#);
        assert!(text_of(&sent.turns[2]).contains("\"más corto\""));
        assert_eq!(session.history().len(), 4);
    }

    #[tokio::test]
    async fn test_thread_refinement_falls_back_to_lines() {
        let provider = Arc::new(ScriptedProvider::new().reply_text("Primero\n\n🧵 2/2 Segundo\n"));
        let client = GenerationClient::new(Arc::clone(&provider), RetryPolicy::default());
        let mut session = client.start_refinement(
            &GenerationRequest::new("tema"),
            PostKind::Thread,
            &["a".to_string(), "b".to_string()],
        );

        let posts = session.refine("otro gancho").await.unwrap();
        assert_eq!(posts, vec!["Primero", "🧵 2/2 Segundo"]);
    }

    #[tokio::test]
    async fn test_single_refinement_uses_search_and_verbatim_text() {
        let provider = Arc::new(ScriptedProvider::new().reply_text("Tuit nuevo"));
        let client = GenerationClient::new(Arc::clone(&provider), RetryPolicy::default());
        let mut session = client.start_refinement(
            &GenerationRequest::new("tema"),
            PostKind::Single,
            &["Tuit viejo".to_string()],
        );

        assert_eq!(session.refine("más humor").await.unwrap(), vec!["Tuit nuevo"]);
        let sent = provider.last_content_request();
        assert_eq!(sent.mode, OutputMode::WebSearch);
        assert!(sent.system_instruction.unwrap().contains("ViralTweetGPT"));
    }

    #[tokio::test]
    async fn test_failed_refinement_keeps_history() {
        let provider = Arc::new(ScriptedProvider::new().reply_text("   "));
        let client = GenerationClient::new(Arc::clone(&provider), RetryPolicy::default());
        let mut session = client.start_refinement(
            &GenerationRequest::new("tema"),
            PostKind::Single,
            &["Tuit".to_string()],
        );

        let err = session.refine("x").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::EmptyResult);
        assert_eq!(session.history().len(), 2);
    }
}
