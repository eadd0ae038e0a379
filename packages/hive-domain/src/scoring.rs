/// Cosine similarity in `[-1, 1]`.
///
/// Empty or mismatched-length inputs and zero-magnitude vectors score `0.0`. That value is a
/// fallback, not a measured similarity.
pub fn cosine_similarity(lhs: &[f32], rhs: &[f32]) -> f32 {
	if lhs.is_empty() || lhs.len() != rhs.len() {
		return 0.0;
	}

	// Squared f32 components must not underflow or overflow; accumulate in f64.
	let mut dot = 0.0_f64;
	let mut lhs_norm = 0.0_f64;
	let mut rhs_norm = 0.0_f64;

	for (l, r) in lhs.iter().zip(rhs.iter()) {
		let (l, r) = (f64::from(*l), f64::from(*r));

		dot += l * r;
		lhs_norm += l * l;
		rhs_norm += r * r;
	}

	if lhs_norm == 0.0 || rhs_norm == 0.0 {
		return 0.0;
	}

	let similarity = (dot / (lhs_norm.sqrt() * rhs_norm.sqrt())) as f32;

	if !similarity.is_finite() {
		return 0.0;
	}

	similarity.clamp(-1.0, 1.0)
}

/// Euclidean distance; `0.0` for empty or mismatched-length inputs.
pub fn euclidean_distance(lhs: &[f32], rhs: &[f32]) -> f32 {
	if lhs.is_empty() || lhs.len() != rhs.len() {
		return 0.0;
	}

	lhs.iter().zip(rhs.iter()).map(|(l, r)| (l - r) * (l - r)).sum::<f32>().sqrt()
}
