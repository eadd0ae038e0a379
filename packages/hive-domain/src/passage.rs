use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
	pub title: String,
	pub heading: String,
	pub content: String,
	pub embedding: Vec<f32>,
}

/// A passage scored against one query embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredPassage {
	pub passage: Arc<Passage>,
	pub similarity: f32,
	pub distance: f32,
}
impl ScoredPassage {
	/// `title - heading`, the label shown next to a result.
	pub fn label(&self) -> String {
		format!("{} - {}", self.passage.title, self.passage.heading)
	}
}

/// Wire shape produced by document ingestion.
#[derive(Debug, Deserialize)]
pub struct DocumentPayload {
	pub sections: Vec<Passage>,
}

/// An ordered, non-empty set of passages sharing one embedding dimensionality.
#[derive(Debug, Clone)]
pub struct Document {
	passages: Vec<Arc<Passage>>,
	dimensions: usize,
}
impl Document {
	pub fn new(passages: Vec<Passage>) -> Result<Self> {
		let Some(first) = passages.first() else {
			return Err(Error::EmptyDocument);
		};
		let dimensions = first.embedding.len();

		for (index, passage) in passages.iter().enumerate() {
			if passage.embedding.is_empty() {
				return Err(Error::EmptyEmbedding { index });
			}
			if passage.embedding.len() != dimensions {
				return Err(Error::DimensionMismatch {
					index,
					expected: dimensions,
					actual: passage.embedding.len(),
				});
			}
		}

		Ok(Self { passages: passages.into_iter().map(Arc::new).collect(), dimensions })
	}

	pub fn from_payload(payload: DocumentPayload) -> Result<Self> {
		Self::new(payload.sections)
	}

	pub fn passages(&self) -> &[Arc<Passage>] {
		&self.passages
	}

	pub fn dimensions(&self) -> usize {
		self.dimensions
	}

	pub fn len(&self) -> usize {
		self.passages.len()
	}

	pub fn is_empty(&self) -> bool {
		self.passages.is_empty()
	}
}
