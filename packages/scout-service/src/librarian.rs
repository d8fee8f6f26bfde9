//! Post-turn profile upkeep: asks the oracle for a JSON extraction of the exchange and folds it into
//! the stored profile. Every failure leaves the profile untouched.

use serde::Serialize;
use serde_json::{Map, Value};

use scout_domain::profile::{self, ExtractionResult, Funding, Metrics, ProjectProfile, Team};

use crate::{Error, Result, Scout};

const MAX_EXCHANGE_CHARS: usize = 2_000;

#[derive(Clone, Debug, Serialize)]
pub struct ProfileUpdate {
	pub profile: ProjectProfile,
	pub completeness: f32,
	pub extraction: ExtractionResult,
	pub fields: Vec<String>,
}
impl ProfileUpdate {
	fn unchanged(profile: &ProjectProfile) -> Self {
		Self {
			profile: profile.clone(),
			completeness: profile.completeness(),
			extraction: ExtractionResult::default(),
			fields: Vec::new(),
		}
	}
}

impl Scout {
	pub async fn update_profile(
		&self,
		profile: &ProjectProfile,
		user_message: &str,
		reply: &str,
	) -> ProfileUpdate {
		let prompt = build_prompt(profile, user_message, reply);
		let outcome = match self.providers.oracle.complete(&self.cfg.providers.llm, &prompt).await {
			Ok(raw) => parse_extraction(&raw),
			Err(err) => Err(err),
		};
		let extraction = match outcome {
			Ok(extraction) => extraction,
			Err(err) => {
				tracing::warn!(error = %err, "Profile extraction failed. Keeping profile unchanged.");

				return ProfileUpdate::unchanged(profile);
			},
		};
		let (merged, completeness) = profile::merge(profile, &extraction);
		let fields =
			profile::extracted_fields(&extraction).into_iter().map(str::to_string).collect();

		ProfileUpdate { profile: merged, completeness, extraction, fields }
	}
}

pub fn build_prompt(profile: &ProjectProfile, user_message: &str, reply: &str) -> String {
	let known = |value: &Option<String>| value.clone().unwrap_or_else(|| "unknown".to_string());
	let categories = if profile.categories.is_empty() {
		"unknown".to_string()
	} else {
		profile.categories.join(", ")
	};

	format!(
		"\
You extract structured business facts from a conversation between a founder and a mentor.

FOUNDER: \"{user}\"
MENTOR: \"{mentor}\"

Facts already on file:
- Categories: {categories}
- Stage: {stage}
- Problem: {problem}
- Solution: {solution}
- Target market: {market}
- Business model: {model}

Extract only new information stated in this exchange. Omit any field that is not mentioned.
Respond with JSON only, using this shape:
{{
  \"categories\": [\"fintech\"],
  \"stage\": \"idea | prototype | mvp | seed | series a | growth\",
  \"problem_solved\": \"...\",
  \"solution\": \"...\",
  \"target_market\": \"...\",
  \"business_model\": \"...\",
  \"metrics\": {{ \"revenue\": \"...\", \"users\": \"...\", \"growth_rate\": \"...\" }},
  \"team_info\": {{ \"size\": \"...\", \"founders\": [\"...\"], \"experience\": \"...\", \"technical_team\": \"...\" }},
  \"funding_info\": {{ \"funding_stage\": \"...\", \"amount_raised\": \"...\", \"target_amount\": \"...\", \"use_of_funds\": \"...\" }}
}}",
		user = truncate(user_message),
		mentor = truncate(reply),
		stage = known(&profile.stage),
		problem = known(&profile.problem),
		solution = known(&profile.solution),
		market = known(&profile.target_market),
		model = known(&profile.business_model),
	)
}

/// Parses the oracle's JSON answer. Markdown fences and surrounding prose are tolerated.
pub fn parse_extraction(raw: &str) -> Result<ExtractionResult> {
	let unfenced = raw.replace("```json", "").replace("```", "");
	let (Some(start), Some(end)) = (unfenced.find('{'), unfenced.rfind('}')) else {
		return Err(Error::OracleParse {
			message: "Extraction response contains no JSON object.".to_string(),
		});
	};

	if end < start {
		return Err(Error::OracleParse {
			message: "Extraction response contains no JSON object.".to_string(),
		});
	}

	let value: Value = serde_json::from_str(&unfenced[start..=end])
		.map_err(|err| Error::OracleParse { message: format!("Invalid extraction JSON: {err}") })?;
	let Value::Object(object) = value else {
		return Err(Error::OracleParse {
			message: "Extraction response must be a JSON object.".to_string(),
		});
	};

	Ok(extraction_from_object(&object))
}

fn extraction_from_object(object: &Map<String, Value>) -> ExtractionResult {
	let field = |keys: &[&str]| keys.iter().find_map(|key| object.get(*key));
	let text_of = |keys: &[&str]| field(keys).and_then(text);
	let metrics = field(&["metrics"]).and_then(Value::as_object);
	let mut team = field(&["team_info", "team"]).and_then(Value::as_object).map(|team| Team {
		size: team.get("size").and_then(text),
		founders: team.get("founders").map(list).unwrap_or_default(),
		experience: team.get("experience").and_then(text),
		technical_team: team.get("technical_team").and_then(text),
	});

	// Team size is sometimes reported among the metrics.
	if let Some(size) = metrics.and_then(|m| m.get("team_size")).and_then(text) {
		let team = team.get_or_insert_with(Team::default);

		if team.size.is_none() {
			team.size = Some(size);
		}
	}

	ExtractionResult {
		categories: field(&["categories", "category"]).map(list).unwrap_or_default(),
		stage: text_of(&["stage"]),
		problem: text_of(&["problem_solved", "problem"]),
		solution: text_of(&["solution"]),
		target_market: text_of(&["target_market", "market"]),
		business_model: text_of(&["business_model"]),
		metrics: metrics.map(|m| Metrics {
			revenue: m.get("revenue").and_then(text),
			users: m.get("users").and_then(text),
			growth_rate: m.get("growth_rate").and_then(text),
			mrr: m.get("mrr").and_then(text),
			arr: m.get("arr").and_then(text),
			burn_rate: m.get("burn_rate").and_then(text),
			runway: m.get("runway").and_then(text),
		}),
		team,
		funding: field(&["funding_info", "funding"]).and_then(Value::as_object).map(|f| Funding {
			funding_stage: f.get("funding_stage").and_then(text),
			amount_raised: f.get("amount_raised").and_then(text),
			target_amount: f.get("target_amount").and_then(text),
			use_of_funds: f.get("use_of_funds").and_then(text),
		}),
		keywords: Vec::new(),
	}
}

fn text(value: &Value) -> Option<String> {
	let rendered = match value {
		Value::String(s) => s.trim().to_string(),
		Value::Number(n) => n.to_string(),
		Value::Bool(b) => (if *b { "yes" } else { "no" }).to_string(),
		Value::Array(items) => items.iter().filter_map(text).collect::<Vec<_>>().join(", "),
		Value::Null | Value::Object(_) => return None,
	};

	if rendered.is_empty() { None } else { Some(rendered) }
}

fn list(value: &Value) -> Vec<String> {
	match value {
		Value::Array(items) => items.iter().filter_map(text).collect(),
		Value::String(s) =>
			s.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect(),
		other => text(other).into_iter().collect(),
	}
}

fn truncate(text: &str) -> String {
	text.trim().chars().take(MAX_EXCHANGE_CHARS).collect()
}
