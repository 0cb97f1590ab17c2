//! Text generation behind a bounded, trimmed, failure-typed interface.

use hotelrag_core::{Error, Result};
use parking_lot::Mutex;
use std::time::Instant;
use tracing::{debug, warn};

/// A local text-completion model.
///
/// `complete` blocks until the model finishes. Implementations return at
/// most `max_tokens` generated tokens; mid-sentence truncation is expected.
pub trait TextModel: Send + Sync {
    fn name(&self) -> &str;

    fn complete(&self, prompt: &str, max_tokens: usize) -> Result<String>;

    /// Whether the backend tolerates overlapping `complete` calls.
    /// When false, [`Generator`] runs calls one at a time.
    fn supports_concurrent_calls(&self) -> bool {
        false
    }
}

/// Wraps a [`TextModel`] with output trimming and error normalization
pub struct Generator {
    model: Box<dyn TextModel>,
    /// Single-slot gate for models that cannot overlap calls
    gate: Option<Mutex<()>>,
}

impl Generator {
    pub fn new(model: Box<dyn TextModel>) -> Self {
        let gate = if model.supports_concurrent_calls() {
            None
        } else {
            Some(Mutex::new(()))
        };
        Self { model, gate }
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    pub fn is_serialized(&self) -> bool {
        self.gate.is_some()
    }

    /// Complete `prompt`, capped at `max_output_tokens`.
    ///
    /// Only leading and trailing whitespace is removed. Any model failure,
    /// or a completion that is empty after trimming, is an
    /// [`Error::Generation`].
    pub fn complete(&self, prompt: &str, max_output_tokens: usize) -> Result<String> {
        if max_output_tokens == 0 {
            return Err(Error::Generation("max_output_tokens must be positive".into()));
        }

        let started = Instant::now();
        let raw = {
            let _slot = self.gate.as_ref().map(|gate| gate.lock());
            self.model.complete(prompt, max_output_tokens)
        };

        let raw = raw.map_err(|e| match e {
            Error::Generation(msg) => Error::Generation(msg),
            other => Error::Generation(other.to_string()),
        })?;

        let answer = raw.trim();
        if answer.is_empty() {
            warn!("Model {} returned an empty completion", self.model.name());
            return Err(Error::Generation(format!(
                "model {} returned no text",
                self.model.name()
            )));
        }

        debug!(
            "Generated {} chars with {} in {:?}",
            answer.len(),
            self.model.name(),
            started.elapsed()
        );
        Ok(answer.to_string())
    }
}
