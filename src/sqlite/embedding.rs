//! Embedding BLOB conversion and cosine distance computation.

use crate::errors::Error;

/// Convert a vector of f32 embedding values to a BLOB (little-endian bytes).
pub fn vec_to_blob(vec: &[f32]) -> Vec<u8> {
    vec.iter().flat_map(|&x| x.to_le_bytes()).collect()
}

/// Convert a BLOB (little-endian bytes) to a vector of `dims` f32 values.
///
/// # Errors
///
/// Returns `Error::CorruptRecord` if the blob is not exactly `dims * 4` bytes.
pub fn blob_to_vec(id: &str, blob: &[u8], dims: usize) -> Result<Vec<f32>, Error> {
    if blob.len() != dims * 4 {
        return Err(Error::CorruptRecord {
            id: id.to_string(),
            reason: format!(
                "embedding blob is {} bytes, expected {} ({} dimensions)",
                blob.len(),
                dims * 4,
                dims
            ),
        });
    }
    Ok(blob
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

/// Reject empty vectors and vectors holding NaN or infinite values.
pub fn validate_vector(vec: &[f32]) -> Result<(), Error> {
    if vec.is_empty() {
        return Err(Error::InvalidInput("vector cannot be empty".to_string()));
    }
    if vec.iter().any(|x| !x.is_finite()) {
        return Err(Error::InvalidInput(
            "vector contains NaN or infinite values".to_string(),
        ));
    }
    Ok(())
}

/// Compute cosine similarity between two equal-length vectors.
///
/// A zero-norm vector is treated as orthogonal to everything (similarity 0.0).
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f64, Error> {
    if a.len() != b.len() {
        return Err(Error::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }

    let dot: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| (*x as f64) * (*y as f64))
        .sum();
    let norm_a: f64 = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }

    // rounding can push identical vectors a hair past 1.0
    Ok((dot / (norm_a * norm_b)).clamp(-1.0, 1.0))
}

/// Cosine distance, `1 - cosine_similarity`, in `[0.0, 2.0]`.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> Result<f64, Error> {
    Ok(1.0 - cosine_similarity(a, b)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_to_blob_size() {
        let blob = vec_to_blob(&[0.1f32; 384]);
        assert_eq!(blob.len(), 1536);
    }

    #[test]
    fn test_blob_to_vec_recovers_values() {
        let vec = vec![0.1f32, -2.5, 3.75];
        let recovered = blob_to_vec("mem_1", &vec_to_blob(&vec), 3).unwrap();
        assert_eq!(recovered, vec);
    }

    #[test]
    fn test_blob_to_vec_wrong_size() {
        let blob = vec![0u8; 1500];
        assert!(matches!(
            blob_to_vec("mem_1", &blob, 384),
            Err(Error::CorruptRecord { .. })
        ));
    }

    #[test]
    fn test_validate_vector() {
        assert!(validate_vector(&[0.5, 0.5]).is_ok());
        assert!(matches!(validate_vector(&[]), Err(Error::InvalidInput(_))));
        assert!(matches!(
            validate_vector(&[1.0, f32::NAN]),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            validate_vector(&[f32::INFINITY, 1.0]),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_cosine_similarity_identical_vectors() {
        let vec = vec![1.0f32; 384];
        let sim = cosine_similarity(&vec, &vec).unwrap();
        assert!((sim - 1.0).abs() < 1e-6);
        assert!(cosine_distance(&vec, &vec).unwrap().abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_orthogonal_vectors() {
        let mut a = vec![0.0f32; 384];
        let mut b = vec![0.0f32; 384];
        a[0] = 1.0;
        b[1] = 1.0;
        let sim = cosine_similarity(&a, &b).unwrap();
        assert!((sim - 0.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_distance_opposite() {
        let a = vec![1.0f32; 8];
        let b = vec![-1.0f32; 8];
        assert!((cosine_distance(&a, &b).unwrap() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_mismatched_dimensions() {
        let a = vec![1.0f32; 384];
        let b = vec![1.0f32; 256];
        assert!(matches!(
            cosine_similarity(&a, &b),
            Err(Error::DimensionMismatch {
                expected: 384,
                actual: 256
            })
        ));
    }

    #[test]
    fn test_cosine_similarity_zero_norm() {
        let zero = vec![0.0f32; 384];
        let vec = vec![1.0f32; 384];
        assert_eq!(cosine_similarity(&zero, &vec).unwrap(), 0.0);
    }
}
