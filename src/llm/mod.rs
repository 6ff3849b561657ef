//! Chat and embedding collaborator.
//!
//! Provides the [`LlmClient`] trait consumed by the formation and maintenance
//! pipelines, and an OpenAI-compatible HTTP implementation created via
//! [`create_client`] from configuration. Both calls are fallible I/O; callers
//! decide whether a failure is fatal (fact extraction, contradiction checks)
//! or degrades gracefully (episode and meta-belief embeddings).

pub mod http;

use anyhow::Result;

/// One message in a chat exchange.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    /// "system" | "user" | "assistant"
    pub role: &'static str,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system", content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user", content: content.into() }
    }
}

/// Per-call chat options.
#[derive(Debug, Clone, Default)]
pub struct ChatOptions {
    pub temperature: Option<f64>,
}

/// Trait for the LLM collaborator.
///
/// All methods are synchronous — the engine serializes its collaborator calls
/// and relies on the implementation's own timeout for boundedness.
pub trait LlmClient: Send + Sync {
    /// Send a chat exchange and return the assistant's text.
    fn chat(&self, messages: &[ChatMessage], options: &ChatOptions) -> Result<String>;

    /// Embed a single text string into a vector.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Create an LLM client from config.
pub fn create_client(config: &crate::config::LlmConfig) -> Result<Box<dyn LlmClient>> {
    let client = http::HttpLlmClient::new(config)?;
    Ok(Box::new(client))
}
