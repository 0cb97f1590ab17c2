//! # hotelrag
//!
//! Question answering over a hotel booking dataset with retrieval-augmented
//! generation, plus aggregate booking analytics.
//!
//! ## Quick Start
//!
//! ### As a CLI
//!
//! ```bash
//! hotelrag --rows data/hotel_rows.jsonl --index data/hotel.index \
//!     ask "Which bookings were canceled for city hotels?"
//! hotelrag --rows data/hotel_rows.jsonl --index data/hotel.index analytics
//! ```
//!
//! ### As a Library
//!
//! ```rust,no_run
//! use hotelrag::prelude::*;
//! use std::sync::Arc;
//!
//! # fn main() -> hotelrag::Result<()> {
//! let dataset = Dataset::load("data/hotel_rows.jsonl", "data/hotel.index")?;
//! let model = OllamaModel::new(&OllamaConfig::default())?;
//! let context = EngineContext::new(
//!     dataset,
//!     Box::new(HashingEmbedder::default()),
//!     Generator::new(Box::new(model)),
//! )?;
//! let engine = QueryEngine::new(Arc::new(context), EngineConfig::default())?;
//!
//! match engine.answer("cheap hotel near downtown") {
//!     Ok(answer) => println!("{}", answer.answer),
//!     Err(failure) => eprintln!("{:?}: {}", failure.kind, failure.message),
//! }
//! println!("{:?}", engine.analytics());
//! # Ok(())
//! # }
//! ```
//!
//! ## Crate Structure
//!
//! - `hotelrag-core` - records, row store, vectors, flat and HNSW indexes, analytics
//! - `hotelrag-storage` - row store and index snapshot loaders
//! - `hotelrag-engine` - embedders, retriever, context assembly, generator, query engine

// Re-export core types
pub use hotelrag_core::{
    Analytics, Distance, Error, ErrorKind, FlatIndex, HnswIndex, HnswParams, Neighbor,
    Record, Result, RowStore, Vector, VectorIndex,
};

// Re-export storage
pub use hotelrag_storage::{Dataset, IndexKind, IndexSnapshot};

// Re-export engine
pub use hotelrag_engine::{
    Answer, ContextAssembler, Embedder, EngineConfig, EngineContext, Generator,
    HashingEmbedder, OllamaConfig, OllamaEmbedder, OllamaModel, QueryEngine, QueryFailure,
    QueryState, Retriever, TextModel,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Analytics, Answer, Dataset, Embedder, EngineConfig, EngineContext, Error, Generator,
        HashingEmbedder, OllamaConfig, OllamaModel, QueryEngine, QueryFailure, Record,
        Result, RowStore, TextModel, VectorIndex,
    };
}
