use std::{cmp::Ordering, sync::Arc};

use crate::{
	passage::{Passage, ScoredPassage},
	scoring,
};

/// Scores every passage against `query` and returns the best `k`.
///
/// Order: similarity descending, then distance ascending, then input order. The sort is stable,
/// so passages that tie on both scores keep their document order. Fewer than `k` passages yields
/// all of them, ranked.
pub fn rank(passages: &[Arc<Passage>], query: &[f32], k: usize) -> Vec<ScoredPassage> {
	let mut scored: Vec<ScoredPassage> = passages
		.iter()
		.map(|passage| ScoredPassage {
			similarity: scoring::cosine_similarity(&passage.embedding, query),
			distance: scoring::euclidean_distance(&passage.embedding, query),
			passage: passage.clone(),
		})
		.collect();

	scored.sort_by(compare);
	scored.truncate(k);

	scored
}

/// Total order used by [`rank`]; NaN scores sort last.
pub fn compare(lhs: &ScoredPassage, rhs: &ScoredPassage) -> Ordering {
	cmp_f32_desc(lhs.similarity, rhs.similarity)
		.then_with(|| cmp_f32_asc(lhs.distance, rhs.distance))
}

fn cmp_f32_desc(a: f32, b: f32) -> Ordering {
	match (a.is_nan(), b.is_nan()) {
		(true, true) => Ordering::Equal,
		(true, false) => Ordering::Greater,
		(false, true) => Ordering::Less,
		(false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
	}
}

fn cmp_f32_asc(a: f32, b: f32) -> Ordering {
	match (a.is_nan(), b.is_nan()) {
		(true, true) => Ordering::Equal,
		(true, false) => Ordering::Greater,
		(false, true) => Ordering::Less,
		(false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
	}
}
