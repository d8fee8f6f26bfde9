pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid input: {message}")]
	InvalidInput { message: String },
	#[error("Oracle unavailable: {message}")]
	OracleUnavailable { message: String },
	#[error("Oracle response could not be parsed: {message}")]
	OracleParse { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
	#[error("Not found: {message}")]
	NotFound { message: String },
	#[error("Delivery failed: {message}")]
	Delivery { message: String },
}
impl From<scout_storage::Error> for Error {
	fn from(err: scout_storage::Error) -> Self {
		match err {
			scout_storage::Error::Sqlx(inner) => Self::Storage { message: inner.to_string() },
			scout_storage::Error::MissingConversationId { .. } =>
				Self::InvalidInput { message: err.to_string() },
		}
	}
}

impl From<scout_providers::Error> for Error {
	fn from(err: scout_providers::Error) -> Self {
		Self::OracleUnavailable { message: err.to_string() }
	}
}
