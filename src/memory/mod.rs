pub mod decay;
pub mod export;
pub mod formation;
pub mod maintenance;
pub mod search;
pub mod stats;
pub mod store;
pub mod types;

use crate::error::MemoryError;

/// Convert an f32 embedding slice to little-endian bytes for storage.
pub fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(embedding.len() * 4);
    for value in embedding {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

/// Decode a stored embedding blob back into an f32 vector.
///
/// Fails with [`MemoryError::MalformedEmbedding`] if the blob is empty or not
/// a whole number of f32s; batch scans count these rows instead of crashing.
pub fn bytes_to_embedding(bytes: &[u8], owner_id: &str) -> Result<Vec<f32>, MemoryError> {
    if bytes.is_empty() || bytes.len() % 4 != 0 {
        return Err(MemoryError::MalformedEmbedding(owner_id.to_string()));
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

/// Cosine similarity between two vectors.
///
/// Returns 0.0 for mismatched lengths or zero-norm inputs rather than erroring
/// — such pairs are simply not similar.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += *x as f64 * *y as f64;
        norm_a += *x as f64 * *x as f64;
        norm_b += *y as f64 * *y as f64;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedding_bytes_round_trip() {
        let original = vec![0.25f32, -1.5, 0.0, 3.75];
        let bytes = embedding_to_bytes(&original);
        let decoded = bytes_to_embedding(&bytes, "b1").unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn malformed_blob_is_rejected() {
        assert!(bytes_to_embedding(&[], "b1").is_err());
        assert!(bytes_to_embedding(&[1, 2, 3], "b1").is_err());
    }

    #[test]
    fn cosine_of_identical_vectors_is_one() {
        let v = vec![0.3f32, 0.4, 0.5];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn cosine_of_orthogonal_vectors_is_zero() {
        let a = vec![1.0f32, 0.0];
        let b = vec![0.0f32, 1.0];
        assert!(cosine_similarity(&a, &b).abs() < 1e-9);
    }

    #[test]
    fn cosine_handles_mismatched_and_zero_inputs() {
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }
}
