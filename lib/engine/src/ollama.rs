//! Completion and embedding models served by a local Ollama instance.
//!
//! Both clients are blocking; the engine only calls them from worker
//! threads, never from the async runtime itself.

use crate::config::OllamaConfig;
use crate::embedder::Embedder;
use crate::generator::TextModel;
use hotelrag_core::{Error, Result, Vector};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    num_predict: usize,
    num_ctx: usize,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
    #[serde(default)]
    eval_count: Option<usize>,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

fn build_client(timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| Error::Startup(format!("cannot build HTTP client: {}", e)))
}

fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path)
}

/// Completion model behind Ollama's `/api/generate`
pub struct OllamaModel {
    client: Client,
    url: String,
    model: String,
    num_ctx: usize,
}

impl OllamaModel {
    pub fn new(config: &OllamaConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config.timeout_secs)?,
            url: endpoint(&config.base_url, "api/generate"),
            model: config.model.clone(),
            num_ctx: config.num_ctx,
        })
    }

    fn request<'a>(&'a self, prompt: &'a str, max_tokens: usize) -> GenerateRequest<'a> {
        GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: GenerateOptions {
                num_predict: max_tokens,
                num_ctx: self.num_ctx,
            },
        }
    }
}

impl TextModel for OllamaModel {
    fn name(&self) -> &str {
        &self.model
    }

    fn complete(&self, prompt: &str, max_tokens: usize) -> Result<String> {
        let response = self
            .client
            .post(&self.url)
            .json(&self.request(prompt, max_tokens))
            .send()
            .map_err(|e| Error::Generation(format!("ollama request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(Error::Generation(format!("ollama returned {}: {}", status, body)));
        }

        let parsed: GenerateResponse = response
            .json()
            .map_err(|e| Error::Generation(format!("malformed ollama response: {}", e)))?;
        debug!("ollama generated {:?} tokens", parsed.eval_count);
        Ok(parsed.response)
    }

    // The server queues overlapping requests itself.
    fn supports_concurrent_calls(&self) -> bool {
        true
    }
}

/// Embedding model behind Ollama's `/api/embeddings`
pub struct OllamaEmbedder {
    client: Client,
    url: String,
    model: String,
    dim: usize,
}

impl OllamaEmbedder {
    pub fn new(config: &OllamaConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config.timeout_secs)?,
            url: endpoint(&config.base_url, "api/embeddings"),
            model: config.embedding_model.clone(),
            dim: config.embedding_dim,
        })
    }
}

impl Embedder for OllamaEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn embed(&self, text: &str) -> Result<Vector> {
        if text.trim().is_empty() {
            return Err(Error::Encoding("cannot embed empty text".into()));
        }

        let response = self
            .client
            .post(&self.url)
            .json(&EmbeddingRequest {
                model: &self.model,
                prompt: text,
            })
            .send()
            .map_err(|e| Error::Encoding(format!("ollama request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(Error::Encoding(format!("ollama returned {}: {}", status, body)));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .map_err(|e| Error::Encoding(format!("malformed ollama response: {}", e)))?;
        if parsed.embedding.len() != self.dim {
            return Err(Error::Encoding(format!(
                "model {} returned dimension {}, expected {}",
                self.model,
                parsed.embedding.len(),
                self.dim
            )));
        }
        Ok(Vector::new(parsed.embedding))
    }
}
