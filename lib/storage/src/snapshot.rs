// Index snapshot file: the precomputed row embeddings plus how to index them.
// Written once offline, read once at startup.

use atomicwrites::{AtomicFile, OverwriteBehavior};
use hotelrag_core::{
    Distance, Error, FlatIndex, HnswIndex, HnswParams, Result, Vector, VectorIndex,
};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexKind {
    Flat,
    Hnsw {
        max_connections: usize,
        max_layers: usize,
        ef_construction: usize,
        ef_search: usize,
        seed: u64,
    },
}

impl From<HnswParams> for IndexKind {
    fn from(p: HnswParams) -> Self {
        IndexKind::Hnsw {
            max_connections: p.max_connections,
            max_layers: p.max_layers,
            ef_construction: p.ef_construction,
            ef_search: p.ef_search,
            seed: p.seed,
        }
    }
}

/// On-disk form of the vector index. `vectors[i]` belongs to row `i`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexSnapshot {
    /// `model_name` of the embedder that produced `vectors`; queries must
    /// be embedded by the same model
    pub embedder: String,
    pub kind: IndexKind,
    pub distance: Distance,
    pub dim: usize,
    pub vectors: Vec<Vec<f32>>,
}

impl IndexSnapshot {
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Build the searchable index. Ragged or non-finite vectors fail startup.
    pub fn into_index(self) -> Result<Box<dyn VectorIndex>> {
        let vectors: Vec<Vector> = self.vectors.into_iter().map(Vector::new).collect();
        let built: Result<Box<dyn VectorIndex>> = match self.kind {
            IndexKind::Flat => FlatIndex::from_vectors(self.dim, self.distance, &vectors)
                .map(|i| Box::new(i) as Box<dyn VectorIndex>),
            IndexKind::Hnsw {
                max_connections,
                max_layers,
                ef_construction,
                ef_search,
                seed,
            } => {
                let params = HnswParams {
                    max_connections,
                    max_layers,
                    ef_construction,
                    ef_search,
                    seed,
                };
                HnswIndex::build(self.dim, self.distance, &vectors, params)
                    .map(|i| Box::new(i) as Box<dyn VectorIndex>)
            }
        };
        built.map_err(|e| Error::Startup(format!("invalid index snapshot: {}", e)))
    }
}

pub fn read_index_snapshot<P: AsRef<Path>>(path: P) -> Result<IndexSnapshot> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|e| {
        Error::Startup(format!("cannot read index {}: {}", path.display(), e))
    })?;
    let snapshot: IndexSnapshot = bincode::deserialize(&data).map_err(|e| {
        Error::Startup(format!("cannot decode index {}: {}", path.display(), e))
    })?;
    info!(
        "Read index snapshot {} ({} vectors, dim {}, {:?}, embedded by {})",
        path.display(),
        snapshot.len(),
        snapshot.dim,
        snapshot.kind,
        snapshot.embedder
    );
    Ok(snapshot)
}

/// Write atomically: readers see the old file or the new one, never a torn write.
pub fn write_index_snapshot<P: AsRef<Path>>(path: P, snapshot: &IndexSnapshot) -> Result<()> {
    let data = bincode::serialize(snapshot).map_err(|e| Error::Serialization(e.to_string()))?;
    AtomicFile::new(path.as_ref(), OverwriteBehavior::AllowOverwrite)
        .write(|f| f.write_all(&data))
        .map_err(|e| Error::Io(std::io::Error::other(e.to_string())))?;
    Ok(())
}
