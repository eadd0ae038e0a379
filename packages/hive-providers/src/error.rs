pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Reqwest(#[from] reqwest::Error),
	#[error(transparent)]
	SerdeJson(#[from] serde_json::Error),
	#[error(transparent)]
	InvalidHeaderName(#[from] reqwest::header::InvalidHeaderName),
	#[error(transparent)]
	InvalidHeaderValue(#[from] reqwest::header::InvalidHeaderValue),
	#[error("{message}")]
	InvalidConfig { message: String },
	#[error("{message}")]
	InvalidResponse { message: String },
}
impl Error {
	pub(crate) fn response(message: impl Into<String>) -> Self {
		Self::InvalidResponse { message: message.into() }
	}

	/// True only for a 2xx reply whose body could not be read as the expected shape.
	///
	/// Transport failures, timeouts, non-2xx statuses and bad request settings are all false.
	pub fn is_malformed_response(&self) -> bool {
		match self {
			Self::Reqwest(err) => err.is_decode(),
			Self::SerdeJson(_) | Self::InvalidResponse { .. } => true,
			Self::InvalidHeaderName(_) | Self::InvalidHeaderValue(_) | Self::InvalidConfig { .. } =>
				false,
		}
	}
}
