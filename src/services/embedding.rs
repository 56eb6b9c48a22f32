//! Deterministic hashed bag-of-words embeddings.
//!
//! Maps text to a fixed-dimension vector without any model call: tokens are
//! hashed into count buckets and the bucket vector is L2-normalized. The same
//! text always yields the same vector, so the whole corpus can be embedded at
//! startup and queries embedded per request with zero external state.
//!
//! Similarity between these vectors reflects lexical overlap, not meaning.
//! That precision ceiling is accepted: the corpus is small, and bucket
//! collisions are an intentional dimensionality-reduction trade-off.

/// Default vector dimension.
pub const EMBEDDING_DIMENSIONS: usize = 256;

const FNV_OFFSET_BASIS: u32 = 2_166_136_261;
const FNV_PRIME: u32 = 16_777_619;

/// Hashing embedder over a fixed bucket count.
#[derive(Debug, Clone)]
pub struct HashedEmbedder {
    dimensions: usize,
}

impl Default for HashedEmbedder {
    fn default() -> Self {
        Self::new(EMBEDDING_DIMENSIONS)
    }
}

impl HashedEmbedder {
    /// Create an embedder producing vectors of the given dimension.
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    /// Vector dimension of this embedder.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Embed text as a unit-norm token-count vector.
    ///
    /// Text that tokenizes to nothing embeds as the all-zero vector; every
    /// other input embeds with L2 norm 1.
    pub fn embed(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0_f32; self.dimensions];

        for token in tokenize(text) {
            let bucket = bucket_index(hash_token(&token), self.dimensions);
            vector[bucket] += 1.0;
        }

        normalize(&mut vector);
        vector
    }
}

/// Lowercase, strip everything outside `[a-z0-9]` and whitespace, split on
/// whitespace.
fn tokenize(text: &str) -> Vec<String> {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();

    cleaned.split_whitespace().map(str::to_string).collect()
}

/// 32-bit FNV-1a over the token bytes.
fn hash_token(token: &str) -> u32 {
    let mut hash = FNV_OFFSET_BASIS;
    for byte in token.bytes() {
        hash ^= u32::from(byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Fold the hash through its signed 32-bit magnitude, then reduce modulo the
/// bucket count.
fn bucket_index(hash: u32, dimensions: usize) -> usize {
    (hash as i32).unsigned_abs() as usize % dimensions
}

/// Scale to unit L2 norm. A zero vector is left untouched rather than
/// dividing by zero.
fn normalize(vector: &mut [f32]) {
    // Accumulate in f64 to avoid rounding drift across many buckets.
    let sum_squares: f64 = vector.iter().map(|v| f64::from(*v) * f64::from(*v)).sum();
    if sum_squares == 0.0 {
        return;
    }

    let magnitude = sum_squares.sqrt() as f32;
    for value in vector.iter_mut() {
        *value /= magnitude;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn l2_norm(vector: &[f32]) -> f32 {
        vector.iter().map(|v| v * v).sum::<f32>().sqrt()
    }

    #[test]
    fn test_dimensions() {
        let embedder = HashedEmbedder::default();
        assert_eq!(embedder.embed("hello world").len(), EMBEDDING_DIMENSIONS);

        let small = HashedEmbedder::new(16);
        assert_eq!(small.embed("hello world").len(), 16);
    }

    #[test]
    fn test_deterministic() {
        let embedder = HashedEmbedder::default();
        let text = "Admissions open in June for all undergraduate courses.";

        // Bit-identical, not merely close.
        assert_eq!(embedder.embed(text), embedder.embed(text));
    }

    #[test]
    fn test_unit_norm() {
        let embedder = HashedEmbedder::default();
        let norm = l2_norm(&embedder.embed("placement statistics for 2023"));
        assert!((norm - 1.0).abs() < 1e-5, "norm was {norm}");
    }

    #[test]
    fn test_blank_text_embeds_to_zero() {
        let embedder = HashedEmbedder::default();
        assert!(embedder.embed("").iter().all(|v| *v == 0.0));
        assert!(embedder.embed("   \n\t  ").iter().all(|v| *v == 0.0));
        // Punctuation-only text tokenizes to nothing as well.
        assert!(embedder.embed("?!.,;:").iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_punctuation_and_case_are_ignored() {
        let embedder = HashedEmbedder::default();
        assert_eq!(
            embedder.embed("Hello, World!"),
            embedder.embed("hello world")
        );
    }

    #[test]
    fn test_token_order_is_ignored() {
        let embedder = HashedEmbedder::default();
        assert_eq!(
            embedder.embed("placement statistics"),
            embedder.embed("statistics placement")
        );
    }

    #[test]
    fn test_disjoint_vocabulary_is_orthogonal() {
        let embedder = HashedEmbedder::default();
        let a = embedder.embed("admissions deadline");
        let b = embedder.embed("cafeteria menu");

        let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        // Different tokens may still collide into the same bucket, but these
        // four do not.
        assert!(dot.abs() < 1e-6, "dot was {dot}");
    }
}
