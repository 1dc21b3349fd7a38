//! Local deterministic embedding provider using FNV-1a hash.
//!
//! Produces repeatable embeddings with no external dependencies: useful for
//! testing and offline development. Identical texts always map to identical
//! vectors; unrelated texts carry no semantic similarity.

/// Generate a deterministic embedding for a single text using FNV-1a hashing.
///
/// The algorithm seeds an FNV-1a hash from the input text, then uses an
/// xorshift PRNG to fill the vector with values in `[-1, 1]`.
pub fn embed(text: &str, dimensions: usize) -> Vec<f32> {
    let mut seed: u32 = 2_166_136_261;
    for byte in text.bytes() {
        seed ^= byte as u32;
        seed = seed.wrapping_mul(16_777_619);
    }

    // xorshift never leaves zero, so nudge an all-zero seed
    let mut x = if seed == 0 { 0x9E37_79B9 } else { seed };
    let mut vector = Vec::with_capacity(dimensions);
    for _ in 0..dimensions {
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        let normalized = (x as f64) / (u32::MAX as f64);
        vector.push((normalized * 2.0 - 1.0) as f32);
    }

    vector
}

/// Embed a batch of texts using the local deterministic provider.
pub fn embed_batch(texts: &[String], dimensions: usize) -> Vec<Vec<f32>> {
    texts.iter().map(|text| embed(text, dimensions)).collect()
}
