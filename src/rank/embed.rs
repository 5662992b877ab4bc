//! Text embedding backends.
//!
//! The ranker only talks to the [`Embedder`] trait. [`HashingEmbedder`] is
//! always available; the ONNX sentence embedder lives behind the `onnx`
//! feature.

use ndarray::Array1;
use sha2::{Digest, Sha256};

use crate::error::Result;

/// A fixed-length text embedding.
pub type Embedding = Array1<f32>;

/// Default number of hashing buckets.
pub const DEFAULT_HASH_DIM: usize = 512;

/// Batch text embedder.
pub trait Embedder: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &str;

    /// Embed every text in one call, preserving order.
    fn embed(&self, texts: &[&str]) -> Result<Vec<Embedding>>;

    /// Similarity between two embeddings (cosine by default).
    fn similarity(&self, a: &Embedding, b: &Embedding) -> f32 {
        cosine_similarity(a, b)
    }
}

/// Cosine similarity; 0.0 when either vector is zero or the lengths differ.
pub fn cosine_similarity(a: &Embedding, b: &Embedding) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let norm_a = a.dot(a).sqrt();
    let norm_b = b.dot(b).sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    a.dot(b) / (norm_a * norm_b)
}

/// Scale a vector to unit length in place; zero vectors are left alone.
pub fn l2_normalize(v: &mut Embedding) {
    let norm = v.dot(v).sqrt();
    if norm > 0.0 {
        v.mapv_inplace(|x| x / norm);
    }
}

/// Deterministic bag-of-words embedder using signed feature hashing.
///
/// Features are lowercase alphanumeric word unigrams and adjacent-word
/// bigrams, hashed with SHA-256 so vectors are identical across builds and
/// platforms. No model files are needed.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimension: usize,
}

impl HashingEmbedder {
    /// Embedder with the given number of buckets (at least 1).
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed_one(&self, text: &str) -> Embedding {
        let mut v = Array1::zeros(self.dimension);
        let words = tokenize(text);

        for word in &words {
            self.add_feature(&mut v, word);
        }
        for pair in words.windows(2) {
            self.add_feature(&mut v, &format!("{} {}", pair[0], pair[1]));
        }

        l2_normalize(&mut v);
        v
    }

    fn add_feature(&self, v: &mut Embedding, feature: &str) {
        let h = feature_hash(feature);
        let bucket = (h % self.dimension as u64) as usize;
        let sign = if h >> 63 == 0 { 1.0 } else { -1.0 };
        v[bucket] += sign;
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_HASH_DIM)
    }
}

impl Embedder for HashingEmbedder {
    fn name(&self) -> &str {
        "hashing"
    }

    fn embed(&self, texts: &[&str]) -> Result<Vec<Embedding>> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }
}

/// First eight bytes of the feature's SHA-256 digest, little endian.
fn feature_hash(feature: &str) -> u64 {
    let digest = Sha256::digest(feature.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

/// Lowercase alphanumeric words.
fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_cosine_similarity() {
        let a = array![1.0, 0.0];
        let b = array![0.0, 1.0];
        assert_eq!(cosine_similarity(&a, &a), 1.0);
        assert_eq!(cosine_similarity(&a, &b), 0.0);
        let c = array![-2.0, 0.0];
        assert!((cosine_similarity(&a, &c) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_zero_and_mismatched() {
        let zero = array![0.0, 0.0];
        let a = array![1.0, 2.0];
        assert_eq!(cosine_similarity(&zero, &a), 0.0);
        assert_eq!(cosine_similarity(&a, &array![1.0, 2.0, 3.0]), 0.0);
    }

    #[test]
    fn test_hashing_embedder_is_deterministic_and_normalized() {
        let embedder = HashingEmbedder::default();
        let out = embedder
            .embed(&["Plan a trip to the coast", "Plan a trip to the coast"])
            .unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0], out[1]);
        assert_eq!(out[0].len(), DEFAULT_HASH_DIM);
        assert!((out[0].dot(&out[0]).sqrt() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_hashing_embedder_overlap_scores_higher() {
        let embedder = HashingEmbedder::default();
        let out = embedder
            .embed(&[
                "travel planner coastal trip itinerary",
                "coastal trip itinerary for a group of friends",
                "quarterly revenue accounting ledger",
            ])
            .unwrap();
        let related = embedder.similarity(&out[0], &out[1]);
        let unrelated = embedder.similarity(&out[0], &out[2]);
        assert!(related > unrelated);
    }

    #[test]
    fn test_empty_text_embeds_to_zero() {
        let embedder = HashingEmbedder::new(8);
        let out = embedder.embed(&["", "..."]).unwrap();
        assert!(out.iter().all(|v| v.iter().all(|x| *x == 0.0)));
    }

    #[test]
    fn test_feature_hash_is_stable() {
        assert_eq!(feature_hash("hello"), 0x0ea3_b05f_ba4d_f22c);

        let v = &HashingEmbedder::default().embed(&["Hello"]).unwrap()[0];
        assert_eq!(v[44], 1.0);
        assert_eq!(v.iter().filter(|x| **x != 0.0).count(), 1);
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(tokenize("Hello, World! 2024"), vec!["hello", "world", "2024"]);
    }
}
