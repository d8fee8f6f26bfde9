use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	#[serde(default)]
	pub conversation: Conversation,
	#[serde(default)]
	pub profile: Profile,
	#[serde(default)]
	pub search: Search,
	#[serde(default)]
	pub delivery: Delivery,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
	#[serde(default = "default_true")]
	pub bind_localhost_only: bool,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub llm: LlmProviderConfig,
}

#[derive(Debug, Deserialize)]
pub struct LlmProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Conversation {
	/// Language used for replies when detection is inconclusive. One of "spanish" or "english".
	pub default_language: String,
	/// Messages scoring at or above this value on the spam screen are refused.
	pub spam_score_threshold: f32,
	pub max_message_chars: u32,
}
impl Default for Conversation {
	fn default() -> Self {
		Self {
			default_language: "spanish".to_string(),
			spam_score_threshold: 30.0,
			max_message_chars: 4_000,
		}
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Profile {
	/// Minimum completeness (0-100) before an investor search is allowed.
	pub search_completeness_threshold: f32,
}
impl Default for Profile {
	fn default() -> Self {
		Self { search_completeness_threshold: 50.0 }
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Search {
	pub pool_a_limit: u32,
	pub pool_b_limit: u32,
	pub result_cap: u32,
	pub pool_a_min_score: f32,
	pub child_min_score: f32,
	pub child_limit: u32,
	/// Bonus added to a pool B record per qualifying child, capped at the record's base score.
	pub child_bonus: f32,
	pub max_keywords: u32,
	pub stage_weights: StageWeights,
}
impl Default for Search {
	fn default() -> Self {
		Self {
			pool_a_limit: 15,
			pool_b_limit: 15,
			result_cap: 15,
			pool_a_min_score: 40.0,
			child_min_score: 5.9,
			child_limit: 5,
			child_bonus: 5.0,
			max_keywords: 25,
			stage_weights: StageWeights::default(),
		}
	}
}

/// Pool A weight per stage band. Pool B always receives the complement.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct StageWeights {
	pub earliest: f32,
	pub seed: f32,
	pub growth: f32,
	pub late: f32,
	pub unknown: f32,
}
impl Default for StageWeights {
	fn default() -> Self {
		Self { earliest: 0.8, seed: 0.6, growth: 0.3, late: 0.1, unknown: 0.5 }
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Delivery {
	pub replay_capacity: u32,
}
impl Default for Delivery {
	fn default() -> Self {
		Self { replay_capacity: 100 }
	}
}

fn default_true() -> bool {
	true
}
