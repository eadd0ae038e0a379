pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
	#[error("Document has no passages.")]
	EmptyDocument,
	#[error("Passage {index} has an empty embedding.")]
	EmptyEmbedding { index: usize },
	#[error("Passage {index} has {actual} embedding dimensions; expected {expected}.")]
	DimensionMismatch { index: usize, expected: usize, actual: usize },
}
