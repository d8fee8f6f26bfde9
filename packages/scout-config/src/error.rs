use std::path::PathBuf;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Cannot read scout config at {path:?}.")]
	Read { path: PathBuf, source: std::io::Error },
	#[error("Cannot parse scout config at {path:?}: {source}")]
	Parse { path: PathBuf, source: toml::de::Error },
	#[error("Invalid scout config: {message}")]
	Validation { message: String },
}
