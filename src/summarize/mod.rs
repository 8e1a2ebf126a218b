use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::OpenAiConfig;

pub mod openai;

pub use openai::OpenAiClient;

/// One role-tagged conversation turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Chat completion request body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

/// Chat completion response body
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

/// Outcome of a summarization request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryResult {
    Success(String),
    Failure(String),
}

/// Errors raised by a completion client
#[derive(thiserror::Error, Debug)]
pub enum CompletionError {
    #[error("missing API key: set the OPENAI_API_KEY environment variable")]
    MissingApiKey,

    #[error("completion service returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// A chat-style completion endpoint
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, CompletionError>;
}

/// Summarization stage of the pipeline
pub struct Summarizer {
    client: Box<dyn CompletionClient>,
    model: String,
    system_prompt: String,
    user_prompt_prefix: String,
    timeout: Duration,
}

impl Summarizer {
    pub fn new(
        client: Box<dyn CompletionClient>,
        model: impl Into<String>,
        system_prompt: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            model: model.into(),
            system_prompt: system_prompt.into(),
            user_prompt_prefix: "Summarize the following text:".to_string(),
            timeout,
        }
    }

    /// Build a summarizer from the `openai` config section
    pub fn from_config(client: Box<dyn CompletionClient>, config: &OpenAiConfig) -> Self {
        Self::new(
            client,
            config.model.clone(),
            config.system_prompt.clone(),
            Duration::from_secs(config.timeout_secs),
        )
        .with_user_prompt_prefix(config.user_prompt_prefix.clone())
    }

    pub fn with_user_prompt_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.user_prompt_prefix = prefix.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// The two-turn conversation sent for `text`
    pub fn build_request(&self, text: &str) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(self.system_prompt.clone()),
                ChatMessage::user(format!("{}\n\n{}", self.user_prompt_prefix, text)),
            ],
        }
    }

    /// Summarize `text` with a single completion request.
    ///
    /// The whole text goes out in one request; it is never chunked or
    /// truncated, so oversized transcripts surface as an API failure.
    pub async fn summarize(&self, text: &str) -> SummaryResult {
        tracing::info!("Requesting summary from {} ({} chars)", self.model, text.chars().count());

        let request = self.build_request(text);
        let completion = tokio::time::timeout(self.timeout, self.client.complete(request));
        let response = match completion.await {
            Err(_) => {
                tracing::warn!("Completion request timed out");
                return SummaryResult::Failure(format!(
                    "request timed out after {}s",
                    self.timeout.as_secs()
                ));
            }
            Ok(Err(e)) => {
                tracing::warn!("Completion request failed: {}", e);
                return SummaryResult::Failure(e.to_string());
            }
            Ok(Ok(response)) => response,
        };

        match response.choices.into_iter().next() {
            Some(ChatChoice {
                message: ChoiceMessage { content: Some(content) },
            }) => SummaryResult::Success(content),
            Some(_) => SummaryResult::Failure("first choice has no message content".to_string()),
            None => SummaryResult::Failure("response contained no choices".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(contents: &[Option<&str>]) -> ChatResponse {
        ChatResponse {
            choices: contents
                .iter()
                .map(|content| ChatChoice {
                    message: ChoiceMessage {
                        content: content.map(str::to_string),
                    },
                })
                .collect(),
        }
    }

    fn summarizer(client: MockCompletionClient) -> Summarizer {
        Summarizer::new(
            Box::new(client),
            "gpt-4o-mini",
            "You are an assistant that summarizes texts.",
            Duration::from_secs(5),
        )
    }

    #[test]
    fn request_has_system_and_user_turns() {
        let request = summarizer(MockCompletionClient::new()).build_request("Hello world");

        assert_eq!(request.model, "gpt-4o-mini");
        assert_eq!(
            request.messages,
            vec![
                ChatMessage::system("You are an assistant that summarizes texts."),
                ChatMessage::user("Summarize the following text:\n\nHello world"),
            ]
        );
    }

    #[tokio::test]
    async fn uses_only_first_choice_verbatim() {
        let mut client = MockCompletionClient::new();
        client
            .expect_complete()
            .withf(|request| {
                request.messages.len() == 2 && request.messages[1].content.ends_with("long text")
            })
            .times(1)
            .returning(|_| Ok(response(&[Some("  First.\n"), Some("Second.")])));

        let result = summarizer(client).summarize("long text").await;
        assert_eq!(result, SummaryResult::Success("  First.\n".to_string()));
    }

    #[tokio::test]
    async fn client_error_becomes_failure() {
        let mut client = MockCompletionClient::new();
        client.expect_complete().returning(|_| {
            Err(CompletionError::Api {
                status: 401,
                message: "Incorrect API key provided".to_string(),
            })
        });

        match summarizer(client).summarize("text").await {
            SummaryResult::Failure(reason) => {
                assert!(reason.contains("401"));
                assert!(reason.contains("Incorrect API key provided"));
            }
            other => panic!("expected Failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn empty_choices_and_null_content_fail() {
        let mut client = MockCompletionClient::new();
        client.expect_complete().times(1).returning(|_| Ok(response(&[])));
        assert!(matches!(summarizer(client).summarize("text").await, SummaryResult::Failure(_)));

        let mut client = MockCompletionClient::new();
        client.expect_complete().times(1).returning(|_| Ok(response(&[None, Some("late")])));
        assert!(matches!(summarizer(client).summarize("text").await, SummaryResult::Failure(_)));
    }

    #[test]
    fn config_prefix_is_applied() {
        let mut config = crate::config::Config::default().openai;
        config.user_prompt_prefix = "Resuma o seguinte texto:".to_string();

        let summarizer = Summarizer::from_config(Box::new(MockCompletionClient::new()), &config);
        let request = summarizer.build_request("abc");
        assert_eq!(request.messages[1].content, "Resuma o seguinte texto:\n\nabc");
        assert_eq!(summarizer.model(), "gpt-4o-mini");
    }

    struct SlowClient;

    #[async_trait]
    impl CompletionClient for SlowClient {
        async fn complete(&self, _request: ChatRequest) -> Result<ChatResponse, CompletionError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(response(&[Some("late")]))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn slow_completion_times_out() {
        let summarizer = Summarizer::new(
            Box::new(SlowClient),
            "gpt-4o-mini",
            "You are an assistant that summarizes texts.",
            Duration::from_secs(2),
        );

        assert_eq!(
            summarizer.summarize("text").await,
            SummaryResult::Failure("request timed out after 2s".to_string())
        );
    }
}
