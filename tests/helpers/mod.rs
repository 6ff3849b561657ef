#![allow(dead_code)]

use anyhow::{bail, Result};
use rusqlite::Connection;
use std::collections::VecDeque;
use std::sync::Mutex;

use tenet::llm::{ChatMessage, ChatOptions, LlmClient};

/// Open a fresh in-memory database with schema and migrations applied.
pub fn test_db() -> Connection {
    tenet::db::open_memory_database().unwrap()
}

/// Deterministic embedding with a spike at position `seed`. Distinct seeds
/// produce orthogonal vectors.
pub fn test_embedding(seed: u8) -> Vec<f32> {
    let mut v = vec![0.0f32; 16];
    v[seed as usize % 16] = 1.0;
    v
}

/// Unit vector in the first two dimensions at `degrees` from the first axis.
/// Cosine similarity between two of these is the cosine of their angle gap.
pub fn embedding_at(degrees: f32) -> Vec<f32> {
    let radians = degrees.to_radians();
    let mut v = vec![0.0f32; 16];
    v[0] = radians.cos();
    v[1] = radians.sin();
    v
}

/// Scripted LLM double: chat replies pop in order, embeddings resolve by
/// keyword lookup against the text being embedded.
pub struct MockLlm {
    chat_replies: Mutex<VecDeque<Result<String, String>>>,
    embeddings: Vec<(String, Vec<f32>)>,
    default_embedding: Vec<f32>,
    fail_embed: bool,
}

impl MockLlm {
    pub fn new() -> Self {
        Self {
            chat_replies: Mutex::new(VecDeque::new()),
            embeddings: Vec::new(),
            default_embedding: test_embedding(0),
            fail_embed: false,
        }
    }

    pub fn with_chat(self, reply: &str) -> Self {
        self.chat_replies
            .lock()
            .unwrap()
            .push_back(Ok(reply.to_string()));
        self
    }

    pub fn with_chat_error(self, message: &str) -> Self {
        self.chat_replies
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
        self
    }

    /// Texts containing `keyword` embed to `embedding`.
    pub fn with_embedding(mut self, keyword: &str, embedding: Vec<f32>) -> Self {
        self.embeddings.push((keyword.to_string(), embedding));
        self
    }

    pub fn failing_embeddings(mut self) -> Self {
        self.fail_embed = true;
        self
    }

    /// A structured extraction reply for `fact`.
    pub fn extraction_json(fact: &str, fact_type: &str, importance: u8) -> String {
        format!(
            "{{\"fact\": \"{fact}\", \"fact_type\": \"{fact_type}\", \"importance\": {importance}}}"
        )
    }
}

impl LlmClient for MockLlm {
    fn chat(&self, _messages: &[ChatMessage], _options: &ChatOptions) -> Result<String> {
        match self.chat_replies.lock().unwrap().pop_front() {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(message)) => bail!(message),
            None => bail!("mock llm ran out of scripted replies"),
        }
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if self.fail_embed {
            bail!("mock embedding failure");
        }
        for (keyword, embedding) in &self.embeddings {
            if text.contains(keyword.as_str()) {
                return Ok(embedding.clone());
            }
        }
        Ok(self.default_embedding.clone())
    }
}
