use hotelrag_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Per-request pipeline settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Records retrieved per query
    pub top_k: usize,
    /// Completion length cap handed to the model
    pub max_output_tokens: usize,
    /// Character budget for the assembled context
    pub max_context_chars: usize,
    /// Joins record texts in the context
    pub context_separator: String,
    /// Queries allowed in the blocking worker pool at once
    pub max_concurrent_requests: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            max_output_tokens: 50,
            max_context_chars: 6000,
            context_separator: " ".to_string(),
            max_concurrent_requests: 1,
        }
    }
}

impl EngineConfig {
    /// Read a JSON config file; omitted fields keep their defaults.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::InvalidConfig(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_str(&raw)
            .map_err(|e| Error::InvalidConfig(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            return Err(Error::InvalidConfig("top_k must be positive".into()));
        }
        if self.max_output_tokens == 0 {
            return Err(Error::InvalidConfig("max_output_tokens must be positive".into()));
        }
        if self.max_concurrent_requests == 0 {
            return Err(Error::InvalidConfig(
                "max_concurrent_requests must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Connection settings for a local Ollama server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    pub base_url: String,
    /// Completion model
    pub model: String,
    pub embedding_model: String,
    /// Dimension the embedding model produces
    pub embedding_dim: usize,
    /// Model context window, in tokens
    pub num_ctx: usize,
    pub timeout_secs: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:11434".to_string(),
            model: "phi".to_string(),
            embedding_model: "all-minilm".to_string(),
            embedding_dim: 384,
            num_ctx: 2048,
            timeout_secs: 120,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.top_k, 3);
        assert_eq!(config.max_output_tokens, 50);
        assert_eq!(config.context_separator, " ");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{"top_k": 5}"#).unwrap();
        let config = EngineConfig::from_path(file.path()).unwrap();
        assert_eq!(config.top_k, 5);
        assert_eq!(config.max_output_tokens, 50);
    }

    #[test]
    fn test_rejects_zero_limits() {
        let config = EngineConfig {
            max_output_tokens: 0,
            ..EngineConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

        let config = EngineConfig {
            max_concurrent_requests: 0,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
