use super::{check_dim, rank, Distance, Neighbor, VectorIndex};
use crate::{Error, Result, Vector};
use ordered_float::OrderedFloat;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use smallvec::SmallVec;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Tuning knobs for [`HnswIndex`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HnswParams {
    /// Links per node on upper layers; layer 0 keeps twice as many
    pub max_connections: usize,
    pub max_layers: usize,
    pub ef_construction: usize,
    /// Beam width at query time, raised to `k` when smaller
    pub ef_search: usize,
    /// Seed for level assignment so rebuilding from the same vectors
    /// yields the same graph
    pub seed: u64,
}

impl Default for HnswParams {
    fn default() -> Self {
        Self {
            max_connections: 16,
            max_layers: 4,
            ef_construction: 200,
            ef_search: 64,
            seed: 0x5eed,
        }
    }
}

/// Generation-stamped bit set for visited-node tracking.
/// Clearing bumps the generation instead of zeroing the words.
struct VisitedSet {
    bits: Vec<u64>,
    generations: Vec<u64>,
    generation: u64,
}

impl VisitedSet {
    fn new(capacity: usize) -> Self {
        let words = capacity.div_ceil(64).max(1);
        Self {
            bits: vec![0; words],
            generations: vec![0; words],
            generation: 1,
        }
    }

    fn clear(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        if self.generation == 0 {
            self.generation = 1;
            self.bits.fill(0);
            self.generations.fill(0);
        }
    }

    /// Mark `idx`; returns false when it was already marked this generation.
    fn insert(&mut self, idx: usize) -> bool {
        let word = idx / 64;
        let mask = 1u64 << (idx % 64);
        if word >= self.bits.len() {
            self.bits.resize(word + 1, 0);
            self.generations.resize(word + 1, 0);
        }
        if self.generations[word] != self.generation {
            self.bits[word] = 0;
            self.generations[word] = self.generation;
        }
        let fresh = self.bits[word] & mask == 0;
        self.bits[word] |= mask;
        fresh
    }
}

type Links = SmallVec<[usize; 16]>;

#[derive(Debug, Clone)]
struct HnswNode {
    layers: Vec<Links>,
}

/// Approximate nearest-neighbor index (hierarchical navigable small world).
///
/// Built once from a fixed vector set in position order; queries take
/// `&self` and allocate their own visited set, so one index can serve many
/// threads without locking. Recall is high but not guaranteed, so a search
/// may return fewer than `min(k, len)` hits on pathological graphs.
pub struct HnswIndex {
    dim: usize,
    distance: Distance,
    params: HnswParams,
    nodes: Vec<HnswNode>,
    /// Contiguous `len * dim` storage of prepared vectors
    vectors: Vec<f32>,
    entry_point: Option<usize>,
    top_layer: usize,
}

impl HnswIndex {
    pub fn new(dim: usize, distance: Distance, params: HnswParams) -> Result<Self> {
        if dim == 0 {
            return Err(Error::InvalidConfig("index dimension must be positive".into()));
        }
        if params.max_connections == 0 || params.max_layers == 0 {
            return Err(Error::InvalidConfig(
                "hnsw max_connections and max_layers must be positive".into(),
            ));
        }
        Ok(Self {
            dim,
            distance,
            params,
            nodes: Vec::new(),
            vectors: Vec::new(),
            entry_point: None,
            top_layer: 0,
        })
    }

    /// Build an index whose position `i` holds `vectors[i]`.
    pub fn build(
        dim: usize,
        distance: Distance,
        vectors: &[Vector],
        params: HnswParams,
    ) -> Result<Self> {
        let mut index = Self::new(dim, distance, params)?;
        let mut rng = StdRng::seed_from_u64(params.seed);
        index.vectors.reserve(vectors.len() * dim);
        for (position, vector) in vectors.iter().enumerate() {
            check_dim(dim, vector)?;
            if !vector.is_finite() {
                return Err(Error::InvalidConfig(format!(
                    "vector for position {} contains non-finite values",
                    position
                )));
            }
            let level = index.select_layer(&mut rng);
            index.insert(&distance.prepare(vector), level);
        }
        Ok(index)
    }

    #[inline]
    fn vector(&self, idx: usize) -> &[f32] {
        let start = idx * self.dim;
        &self.vectors[start..start + self.dim]
    }

    #[inline]
    fn distance_to(&self, query: &[f32], idx: usize) -> f32 {
        self.distance.between(query, self.vector(idx))
    }

    fn select_layer(&self, rng: &mut StdRng) -> usize {
        let mut layer = 0;
        while layer < self.params.max_layers - 1 && rng.random::<f32>() < 0.5 {
            layer += 1;
        }
        layer
    }

    fn layer_capacity(&self, layer: usize) -> usize {
        if layer == 0 {
            self.params.max_connections * 2
        } else {
            self.params.max_connections
        }
    }

    /// Beam search on one layer; result is sorted nearest first.
    fn search_layer(
        &self,
        query: &[f32],
        entry: usize,
        ef: usize,
        layer: usize,
        visited: &mut VisitedSet,
    ) -> Vec<(usize, f32)> {
        visited.clear();

        let entry_dist = self.distance_to(query, entry);
        let mut candidates = BinaryHeap::with_capacity(ef * 2);
        let mut results = BinaryHeap::with_capacity(ef + 1);
        candidates.push(Reverse((OrderedFloat(entry_dist), entry)));
        results.push((OrderedFloat(entry_dist), entry));
        visited.insert(entry);

        while let Some(Reverse((OrderedFloat(dist), current))) = candidates.pop() {
            let worst = results.peek().map(|(d, _)| d.0).unwrap_or(f32::INFINITY);
            if results.len() >= ef && dist > worst {
                break;
            }

            let Some(links) = self.nodes[current].layers.get(layer) else {
                continue;
            };

            for &next in links {
                if !visited.insert(next) {
                    continue;
                }
                let d = self.distance_to(query, next);
                let worst = results.peek().map(|(w, _)| w.0).unwrap_or(f32::INFINITY);
                if results.len() < ef || d < worst {
                    candidates.push(Reverse((OrderedFloat(d), next)));
                    results.push((OrderedFloat(d), next));
                    if results.len() > ef {
                        results.pop();
                    }
                }
            }
        }

        let mut out: Vec<(usize, f32)> = results.into_iter().map(|(d, i)| (i, d.0)).collect();
        out.sort_unstable_by_key(|&(i, d)| (OrderedFloat(d), i));
        out
    }

    fn insert(&mut self, vector: &Vector, level: usize) {
        self.vectors.extend_from_slice(vector.as_slice());
        let idx = self.nodes.len();
        self.nodes.push(HnswNode {
            layers: vec![Links::new(); level + 1],
        });

        let Some(mut entry) = self.entry_point else {
            self.entry_point = Some(idx);
            self.top_layer = level;
            return;
        };

        let query = vector.as_slice();
        let mut visited = VisitedSet::new(self.nodes.len());

        let mut layer = self.top_layer;
        while layer > level {
            if let Some(&(closest, _)) = self.search_layer(query, entry, 1, layer, &mut visited).first() {
                entry = closest;
            }
            layer -= 1;
        }

        for layer in (0..=level.min(self.top_layer)).rev() {
            let found = self.search_layer(query, entry, self.params.ef_construction, layer, &mut visited);
            let cap = self.layer_capacity(layer);
            let links: Links = found
                .iter()
                .filter(|(i, _)| *i != idx)
                .take(cap)
                .map(|(i, _)| *i)
                .collect();

            for &neighbor in &links {
                self.link(neighbor, idx, layer);
            }
            self.nodes[idx].layers[layer] = links;

            if let Some(&(closest, _)) = found.first() {
                entry = closest;
            }
        }

        if level > self.top_layer {
            self.entry_point = Some(idx);
            self.top_layer = level;
        }
    }

    /// Add a back-link `from -> to`, pruning `from`'s list to its nearest links.
    fn link(&mut self, from: usize, to: usize, layer: usize) {
        let cap = self.layer_capacity(layer);
        if layer >= self.nodes[from].layers.len() {
            return;
        }
        self.nodes[from].layers[layer].push(to);
        if self.nodes[from].layers[layer].len() <= cap {
            return;
        }

        let origin = self.vector(from).to_vec();
        let mut scored: Vec<(usize, f32)> = self.nodes[from].layers[layer]
            .iter()
            .map(|&n| (n, self.distance_to(&origin, n)))
            .collect();
        scored.sort_unstable_by_key(|&(n, d)| (OrderedFloat(d), n));
        scored.truncate(cap);
        self.nodes[from].layers[layer] = scored.into_iter().map(|(n, _)| n).collect();
    }
}

impl VectorIndex for HnswIndex {
    fn dim(&self) -> usize {
        self.dim
    }

    fn len(&self) -> usize {
        self.nodes.len()
    }

    fn distance(&self) -> Distance {
        self.distance
    }

    fn search(&self, query: &Vector, k: usize) -> Result<Vec<Neighbor>> {
        check_dim(self.dim, query)?;
        let Some(mut entry) = self.entry_point else {
            return Ok(Vec::new());
        };
        if k == 0 {
            return Ok(Vec::new());
        }

        let prepared = self.distance.prepare(query);
        let q = prepared.as_slice();
        let mut visited = VisitedSet::new(self.nodes.len());

        for layer in (1..=self.top_layer).rev() {
            if let Some(&(closest, _)) = self.search_layer(q, entry, 1, layer, &mut visited).first() {
                entry = closest;
            }
        }

        let ef = self.params.ef_search.max(k);
        let mut hits: Vec<Neighbor> = self
            .search_layer(q, entry, ef, 0, &mut visited)
            .into_iter()
            .map(|(position, distance)| Neighbor { position, distance })
            .collect();
        rank(&mut hits);
        hits.truncate(k);
        Ok(hits)
    }
}
