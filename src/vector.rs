//! This is the vector math module
//! Provide dot product, L2 norm and cosine similarity

use crate::error::StoreError;

/// L2 Norm
/// ||vec|| = sqrt(sum(vec[i]^2))
/// Accumulated in f64, an empty vector has norm 0
pub fn l2_norm(vector: &[f32]) -> f32 {
    vector.iter()
        .map(|&x| f64::from(x) * f64::from(x))
        .sum::<f64>()
        .sqrt() as f32
}

/// Dot Product
/// dot_prod = sum(a[i] * b[i]) for i = 0..a.len()
/// Can only process vectors with same dimensions
pub fn dot_product(left: &[f32], right: &[f32]) -> Result<f32, StoreError> {
    check_dimensions(left, right)?;

    let dot_prod = left.iter()
        .zip(right.iter())
        .map(|(&x, &y)| f64::from(x) * f64::from(y))
        .sum::<f64>();

    Ok(dot_prod as f32)
}

/// Cosine Similarity
/// cos = dot(a, b) / (||a|| * ||b||)
///
/// A zero vector on either side scores `0.0` instead of producing NaN.
/// Dot product and both norms are summed in a single left-to-right pass in
/// f64, so the same inputs always give bit-identical scores.
pub fn cosine_similarity(left: &[f32], right: &[f32]) -> Result<f32, StoreError> {
    check_dimensions(left, right)?;

    let mut dot = 0.0_f64;
    let mut norm_left = 0.0_f64;
    let mut norm_right = 0.0_f64;
    for (&x, &y) in left.iter().zip(right.iter()) {
        let x = f64::from(x);
        let y = f64::from(y);
        dot += x * y;
        norm_left += x * x;
        norm_right += y * y;
    }

    if norm_left == 0.0 || norm_right == 0.0 {
        return Ok(0.0);
    }

    let score = (dot / (norm_left.sqrt() * norm_right.sqrt())) as f32;
    // A tiny negative dot underflows to -0.0; ranking must see a single zero
    Ok(score + 0.0)
}

fn check_dimensions(left: &[f32], right: &[f32]) -> Result<(), StoreError> {
    if left.len() != right.len() {
        return Err(StoreError::DimensionMismatch {
            expected: left.len(),
            actual: right.len(),
        });
    }
    Ok(())
}
