//! Vector distance and cache hit rule
//!
//! Distances are negative inner products, the same value pgvector's `<#>`
//! operator returns. For normalized embeddings the range is roughly
//! `[-1.0, 1.0]` and more negative means more similar.

use crate::domain::DomainError;

/// pgvector operator computing the negative inner product
pub const INNER_PRODUCT_OPERATOR: &str = "<#>";

/// Distance at or below which a semantic cache entry counts as a hit
pub const DEFAULT_DISTANCE_THRESHOLD: f32 = -0.95;

/// Negative inner product of two vectors of equal dimension
pub fn distance(a: &[f32], b: &[f32]) -> Result<f32, DomainError> {
    if a.len() != b.len() {
        return Err(DomainError::dimension_mismatch(a.len(), b.len()));
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();

    Ok(-dot_product)
}

/// Hit iff `distance <= threshold`; the boundary itself is a hit
pub fn is_hit(distance: f32, threshold: f32) -> bool {
    distance <= threshold
}

/// Display percentage `(1 + distance) * 50`, clamped to `[0, 100]`
///
/// -1.0 maps to 0, 0.0 to 50 and 1.0 to 100.
pub fn similarity_percentage(distance: f32) -> f32 {
    ((1.0 + distance) * 50.0).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_unit_vectors() {
        let a = vec![1.0, 0.0, 0.0];

        let d = distance(&a, &a).unwrap();

        assert!((d + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_orthogonal_vectors() {
        let d = distance(&[1.0, 0.0], &[0.0, 1.0]).unwrap();
        assert!(d.abs() < 1e-6);
    }

    #[test]
    fn test_opposite_vectors() {
        let d = distance(&[1.0, 0.0], &[-1.0, 0.0]).unwrap();
        assert!((d - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_dimension_mismatch_is_rejected() {
        let err = distance(&[1.0, 2.0], &[1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(err, DomainError::DimensionMismatch { left: 2, right: 3 }));
    }

    #[test]
    fn test_threshold_boundary_is_hit() {
        assert!(is_hit(-0.95, -0.95));
        assert!(is_hit(-0.99, -0.95));
        assert!(!is_hit(-0.94, -0.95));
    }

    #[test]
    fn test_similarity_percentage() {
        assert!(similarity_percentage(-1.0).abs() < 1e-4);
        assert!((similarity_percentage(0.0) - 50.0).abs() < 1e-4);
        assert!((similarity_percentage(1.0) - 100.0).abs() < 1e-4);
    }

    #[test]
    fn test_similarity_percentage_is_clamped() {
        assert_eq!(similarity_percentage(-3.0), 0.0);
        assert_eq!(similarity_percentage(2.5), 100.0);
    }
}
