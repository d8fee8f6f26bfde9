use reqwest::header::{InvalidHeaderName, InvalidHeaderValue};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Http(#[from] reqwest::Error),
	#[error("Invalid provider header name: {0}")]
	HeaderName(#[from] InvalidHeaderName),
	#[error("Invalid provider header value: {0}")]
	HeaderValue(#[from] InvalidHeaderValue),
	#[error("{message}")]
	InvalidConfig { message: String },
	#[error("Unusable completion: {message}")]
	UnusableCompletion { message: String },
}
