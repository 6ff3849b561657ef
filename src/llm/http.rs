//! OpenAI-compatible HTTP client for chat and embeddings.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::time::Duration;

use super::{ChatMessage, ChatOptions, LlmClient};
use crate::config::LlmConfig;

pub struct HttpLlmClient {
    http: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
    chat_model: String,
    embed_model: String,
    default_temperature: f64,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingRow>,
}

#[derive(Deserialize)]
struct EmbeddingRow {
    embedding: Vec<f32>,
}

impl HttpLlmClient {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env).with_context(|| {
            format!("API key environment variable {} is not set", config.api_key_env)
        })?;

        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            chat_model: config.chat_model.clone(),
            embed_model: config.embed_model.clone(),
            default_temperature: config.temperature,
        })
    }
}

impl LlmClient for HttpLlmClient {
    fn chat(&self, messages: &[ChatMessage], options: &ChatOptions) -> Result<String> {
        let body = serde_json::json!({
            "model": self.chat_model,
            "temperature": options.temperature.unwrap_or(self.default_temperature),
            "messages": messages
                .iter()
                .map(|m| serde_json::json!({"role": m.role, "content": m.content}))
                .collect::<Vec<_>>(),
        });

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .context("chat request failed")?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().unwrap_or_default();
            bail!("chat request returned {status}: {text}");
        }

        let parsed: ChatCompletionResponse =
            response.json().context("failed to parse chat response")?;
        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        Ok(text)
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let body = serde_json::json!({
            "model": self.embed_model,
            "input": text,
        });

        let response = self
            .http
            .post(format!("{}/embeddings", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .context("embedding request failed")?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().unwrap_or_default();
            bail!("embedding request returned {status}: {text}");
        }

        let parsed: EmbeddingResponse =
            response.json().context("failed to parse embedding response")?;
        let embedding = parsed
            .data
            .into_iter()
            .next()
            .map(|row| row.embedding)
            .unwrap_or_default();

        if embedding.is_empty() {
            bail!("embedding response contained no vector");
        }

        Ok(embedding)
    }
}
