use serde::Serialize;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Network failure: {message}")]
	Network { message: String },
	#[error("Malformed embedding: {message}")]
	MalformedEmbedding { message: String },
	#[error("Unparseable action: {message}")]
	UnparseableAction { message: String },
	#[error("Model requested another search after {hops} extra searches.")]
	HopBudgetExhausted { hops: u32 },
	#[error("No document is loaded.")]
	NoDocument,
	#[error("Invalid query: {message}")]
	InvalidQuery { message: String },
	#[error("Invalid document: {0}")]
	InvalidDocument(#[from] hive_domain::Error),
}
impl Error {
	pub fn kind(&self) -> FailureKind {
		match self {
			Self::Network { .. } => FailureKind::Network,
			Self::MalformedEmbedding { .. } => FailureKind::MalformedEmbedding,
			Self::UnparseableAction { .. } => FailureKind::UnparseableAction,
			Self::HopBudgetExhausted { .. } => FailureKind::HopBudgetExhausted,
			Self::NoDocument => FailureKind::NoDocument,
			Self::InvalidQuery { .. } => FailureKind::InvalidQuery,
			Self::InvalidDocument(_) => FailureKind::InvalidDocument,
		}
	}

	/// Maps an embedding call failure: a bad 2xx body is a malformed embedding, anything else
	/// that kept the request from yielding a vector is a network failure.
	pub fn from_embedding(err: hive_providers::Error) -> Self {
		if err.is_malformed_response() {
			Self::MalformedEmbedding { message: err.to_string() }
		} else {
			Self::Network { message: err.to_string() }
		}
	}

	pub fn from_completion(err: hive_providers::Error) -> Self {
		Self::Network { message: err.to_string() }
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
	Network,
	MalformedEmbedding,
	UnparseableAction,
	HopBudgetExhausted,
	NoDocument,
	InvalidQuery,
	InvalidDocument,
}
impl FailureKind {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Network => "network",
			Self::MalformedEmbedding => "malformed_embedding",
			Self::UnparseableAction => "unparseable_action",
			Self::HopBudgetExhausted => "hop_budget_exhausted",
			Self::NoDocument => "no_document",
			Self::InvalidQuery => "invalid_query",
			Self::InvalidDocument => "invalid_document",
		}
	}
}
