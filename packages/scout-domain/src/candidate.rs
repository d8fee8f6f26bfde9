use serde::{Deserialize, Serialize};

/// A retrieval hit from either candidate pool. Scores computed at query time are never stored here.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateRecord {
	pub id: String,
	pub name: String,
	pub headline: Option<String>,
	pub description: Option<String>,
	pub categories: Vec<String>,
	pub stages: Vec<String>,
	pub location: Option<String>,
	pub contact: Option<String>,
	/// Pool-intrinsic quality score in the range 0-100.
	pub score: f32,
}
