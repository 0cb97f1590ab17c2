//! # hotelrag Engine
//!
//! Retrieval-augmented question answering over the hotel booking rows.
//!
//! ```text
//! query ──> Retriever ──> ContextAssembler ──> prompt ──> Generator ──> Answer
//!           (embed + k-NN                     template    (bounded,
//!            + row lookup)                                 trimmed)
//! ```
//!
//! [`EngineContext`] owns everything loaded at startup (rows, index,
//! embedder, generator) and is shared by `Arc`. [`QueryEngine::answer`] runs
//! one query synchronously; [`QueryEngine::ask`] runs it on a bounded pool of
//! blocking workers so slow generations never stall the async runtime.
//! Failures come back as a [`QueryFailure`] carrying the error kind and the
//! pipeline stage; the engine keeps serving afterwards.

pub mod config;
pub mod context;
pub mod embedder;
pub mod engine;
pub mod generator;
pub mod ollama;
pub mod retriever;

pub use config::{EngineConfig, OllamaConfig};
pub use context::{build_prompt, ContextAssembler};
pub use embedder::{Embedder, HashingEmbedder};
pub use engine::{Answer, EngineContext, QueryEngine, QueryFailure, QueryState};
pub use generator::{Generator, TextModel};
pub use ollama::{OllamaEmbedder, OllamaModel};
pub use retriever::{Retrieved, Retriever, DEFAULT_TOP_K};
