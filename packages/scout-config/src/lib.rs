mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, Conversation, Delivery, LlmProviderConfig, Postgres, Profile, Providers, Search,
	Service, StageWeights, Storage,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::Read { path: path.to_path_buf(), source: err })?;

	parse(&raw).map_err(|err| match err {
		Error::Parse { source, .. } =>
			Error::Parse { path: path.to_path_buf(), source },
		other => other,
	})
}

pub fn parse(raw: &str) -> Result<Config> {
	let mut cfg: Config = toml::from_str(raw)
		.map_err(|err| Error::Parse { path: Default::default(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}

	let llm = &cfg.providers.llm;

	for (label, value) in [
		("providers.llm.api_base", &llm.api_base),
		("providers.llm.api_key", &llm.api_key),
		("providers.llm.model", &llm.model),
	] {
		if value.trim().is_empty() {
			return Err(Error::Validation { message: format!("{label} must be non-empty.") });
		}
	}

	if !llm.temperature.is_finite() || llm.temperature < 0.0 {
		return Err(Error::Validation {
			message: "providers.llm.temperature must be a finite number, zero or greater."
				.to_string(),
		});
	}
	if llm.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "providers.llm.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if !matches!(cfg.conversation.default_language.as_str(), "spanish" | "english") {
		return Err(Error::Validation {
			message: "conversation.default_language must be one of spanish or english."
				.to_string(),
		});
	}
	if !cfg.conversation.spam_score_threshold.is_finite()
		|| cfg.conversation.spam_score_threshold <= 0.0
	{
		return Err(Error::Validation {
			message: "conversation.spam_score_threshold must be greater than zero.".to_string(),
		});
	}
	if cfg.conversation.max_message_chars == 0 {
		return Err(Error::Validation {
			message: "conversation.max_message_chars must be greater than zero.".to_string(),
		});
	}

	let threshold = cfg.profile.search_completeness_threshold;

	if !threshold.is_finite() || !(0.0..=100.0).contains(&threshold) {
		return Err(Error::Validation {
			message: "profile.search_completeness_threshold must be in the range 0-100."
				.to_string(),
		});
	}

	for (label, value) in [
		("search.pool_a_limit", cfg.search.pool_a_limit),
		("search.pool_b_limit", cfg.search.pool_b_limit),
		("search.result_cap", cfg.search.result_cap),
		("search.max_keywords", cfg.search.max_keywords),
	] {
		if value == 0 {
			return Err(Error::Validation {
				message: format!("{label} must be greater than zero."),
			});
		}
	}

	for (label, value) in [
		("search.pool_a_min_score", cfg.search.pool_a_min_score),
		("search.child_min_score", cfg.search.child_min_score),
		("search.child_bonus", cfg.search.child_bonus),
	] {
		if !value.is_finite() || value < 0.0 {
			return Err(Error::Validation {
				message: format!("{label} must be a finite number, zero or greater."),
			});
		}
	}

	let weights = &cfg.search.stage_weights;

	for (label, value) in [
		("search.stage_weights.earliest", weights.earliest),
		("search.stage_weights.seed", weights.seed),
		("search.stage_weights.growth", weights.growth),
		("search.stage_weights.late", weights.late),
		("search.stage_weights.unknown", weights.unknown),
	] {
		if !value.is_finite() {
			return Err(Error::Validation { message: format!("{label} must be a finite number.") });
		}
		if !(0.0..=1.0).contains(&value) {
			return Err(Error::Validation {
				message: format!("{label} must be in the range 0.0-1.0."),
			});
		}
	}

	if cfg.delivery.replay_capacity == 0 {
		return Err(Error::Validation {
			message: "delivery.replay_capacity must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	cfg.conversation.default_language =
		cfg.conversation.default_language.trim().to_ascii_lowercase();
	cfg.service.log_level = cfg.service.log_level.trim().to_string();

	if cfg.providers.llm.api_base.ends_with('/') && cfg.providers.llm.path.starts_with('/') {
		cfg.providers.llm.api_base = cfg.providers.llm.api_base.trim_end_matches('/').to_string();
	}
}
