//! Text embedding models.
//!
//! An [`Embedder`] must be deterministic: the same text always maps to the
//! same vector, otherwise queries drift away from the offline index.

use ahash::RandomState;
use hotelrag_core::{Error, Result, Vector};
use std::hash::BuildHasher;

/// Default dimension, matching common MiniLM sentence encoders
pub const DEFAULT_EMBEDDING_DIM: usize = 384;

// Fixed seeds keep feature positions stable between processes.
const SEEDS: [u64; 4] = [
    0x243f_6a88_85a3_08d3,
    0x1319_8a2e_0370_7344,
    0xa409_3822_299f_31d0,
    0x082e_fa98_ec4e_6c89,
];

pub trait Embedder: Send + Sync {
    /// Length of every vector this embedder returns
    fn dim(&self) -> usize;

    fn model_name(&self) -> &str;

    /// Embed one text. Empty input is an [`Error::Encoding`].
    fn embed(&self, text: &str) -> Result<Vector>;
}

/// Feature-hashing embedder over character trigrams and words.
///
/// Runs in-process with no model weights. Texts sharing words or word
/// fragments land close together, which is enough for keyword-heavy
/// booking descriptions.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dim: usize,
    hasher: RandomState,
}

impl HashingEmbedder {
    /// Name recorded in index snapshots built with this embedder
    pub const MODEL_NAME: &'static str = "hashing-trigram";

    pub fn new(dim: usize) -> Result<Self> {
        if dim == 0 {
            return Err(Error::InvalidConfig("embedding dimension must be positive".into()));
        }
        Ok(Self {
            dim,
            hasher: RandomState::with_seeds(SEEDS[0], SEEDS[1], SEEDS[2], SEEDS[3]),
        })
    }

    #[inline]
    fn bucket<T: std::hash::Hash>(&self, feature: T) -> usize {
        (self.hasher.hash_one(feature) % self.dim as u64) as usize
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self {
            dim: DEFAULT_EMBEDDING_DIM,
            hasher: RandomState::with_seeds(SEEDS[0], SEEDS[1], SEEDS[2], SEEDS[3]),
        }
    }
}

impl Embedder for HashingEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn model_name(&self) -> &str {
        Self::MODEL_NAME
    }

    fn embed(&self, text: &str) -> Result<Vector> {
        let normalized = text.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(Error::Encoding("cannot embed empty text".into()));
        }

        let mut data = vec![0.0f32; self.dim];

        let padded: Vec<char> = format!("  {}  ", normalized).chars().collect();
        for window in padded.windows(3) {
            let trigram: String = window.iter().collect();
            data[self.bucket(trigram.as_str())] += 1.0;
        }

        // Whole words weigh more than fragments
        for word in normalized.split_whitespace() {
            data[self.bucket(word)] += 2.0;
        }

        let mut vector = Vector::new(data);
        vector.normalize();
        Ok(vector)
    }
}
