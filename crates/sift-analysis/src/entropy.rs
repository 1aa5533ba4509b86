//! Shannon entropy over artifact bytes
//!
//! Entropy values range from 0.0 (uniform) to 8.0 (maximum for bytes).
//! High entropy across a region usually means compression, encryption, or
//! packing; the per-chunk variant makes those regions visible.

/// Entropy of one fixed-size chunk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChunkEntropy {
    /// Chunk index, 0-based
    pub index: usize,
    /// Entropy of that chunk
    pub entropy: f64,
}

/// Shannon entropy of the whole input, in bits per byte.
#[must_use]
pub fn shannon(data: &[u8]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }

    let mut freq = [0u64; 256];
    for &byte in data {
        freq[byte as usize] += 1;
    }

    let len = data.len() as f64;
    let mut entropy = 0.0;
    for &count in freq.iter().filter(|&&c| c > 0) {
        let probability = count as f64 / len;
        entropy -= probability * probability.log2();
    }
    entropy
}

/// Entropy per `chunk_size`-byte chunk; the final chunk may be short.
///
/// Returns an empty vector when `chunk_size` is 0 or the input is empty.
#[must_use]
pub fn by_chunks(data: &[u8], chunk_size: usize) -> Vec<ChunkEntropy> {
    if chunk_size == 0 || data.is_empty() {
        return Vec::new();
    }

    data.chunks(chunk_size)
        .enumerate()
        .map(|(index, chunk)| ChunkEntropy {
            index,
            entropy: shannon(chunk),
        })
        .collect()
}
