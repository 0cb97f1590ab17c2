//! # hotelrag Core
//!
//! Data structures shared by the hotel booking question-answering engine.
//!
//! - [`Record`] / [`RowStore`] - typed booking rows addressed by position
//! - [`Vector`] - dense embedding vector
//! - [`VectorIndex`] - k-NN search, with [`FlatIndex`] (exact) and
//!   [`HnswIndex`] (approximate) implementations
//! - [`Analytics`] - revenue, cancellation and lead-time aggregates
//!
//! Row `i` of the store and vector `i` of the index describe the same
//! booking. Both are built offline and never change after load.
//!
//! ## Example
//!
//! ```rust
//! use hotelrag_core::{Distance, FlatIndex, Vector, VectorIndex};
//!
//! let vectors = vec![Vector::new(vec![1.0, 0.0]), Vector::new(vec![0.0, 1.0])];
//! let index = FlatIndex::from_vectors(2, Distance::Euclidean, &vectors).unwrap();
//!
//! let hits = index.search(&Vector::new(vec![0.9, 0.1]), 1).unwrap();
//! assert_eq!(hits[0].position, 0);
//! ```

pub mod analytics;
pub mod error;
pub mod index;
pub mod record;
pub mod vector;

/// Distance kernels with an AVX2 path on x86_64
pub mod simd;

pub use analytics::Analytics;
pub use error::{Error, ErrorKind, Result};
pub use index::{Distance, FlatIndex, HnswIndex, HnswParams, Neighbor, VectorIndex};
pub use record::{Record, RowStore};
pub use vector::Vector;
