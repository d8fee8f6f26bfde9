use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

const BASIC_WEIGHT: f32 = 40.0;
const BUSINESS_WEIGHT: f32 = 20.0;
const METRICS_WEIGHT: f32 = 20.0;
const TEAM_WEIGHT: f32 = 10.0;
const FUNDING_WEIGHT: f32 = 10.0;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Metrics {
	pub revenue: Option<String>,
	pub users: Option<String>,
	pub growth_rate: Option<String>,
	pub mrr: Option<String>,
	pub arr: Option<String>,
	pub burn_rate: Option<String>,
	pub runway: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Team {
	pub size: Option<String>,
	pub founders: Vec<String>,
	pub experience: Option<String>,
	pub technical_team: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Funding {
	pub funding_stage: Option<String>,
	pub amount_raised: Option<String>,
	pub target_amount: Option<String>,
	pub use_of_funds: Option<String>,
}

/// Structured project data produced by a single turn. Never mutated after production, only merged.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionResult {
	pub categories: Vec<String>,
	pub stage: Option<String>,
	pub problem: Option<String>,
	pub solution: Option<String>,
	pub target_market: Option<String>,
	pub business_model: Option<String>,
	pub metrics: Option<Metrics>,
	pub team: Option<Team>,
	pub funding: Option<Funding>,
	/// Search keywords suggested alongside the extraction. Not merged into the profile.
	pub keywords: Vec<String>,
}
impl ExtractionResult {
	pub fn is_empty(&self) -> bool {
		extracted_fields(self).is_empty() && self.keywords.iter().all(|kw| kw.trim().is_empty())
	}
}

/// Cumulative project data for one conversation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectProfile {
	pub categories: Vec<String>,
	pub stage: Option<String>,
	pub problem: Option<String>,
	pub solution: Option<String>,
	pub target_market: Option<String>,
	pub business_model: Option<String>,
	pub metrics: Option<Metrics>,
	pub team: Option<Team>,
	pub funding: Option<Funding>,
}
impl ProjectProfile {
	/// Weighted share of populated fields, in the range 0-100.
	pub fn completeness(&self) -> f32 {
		let basic = [
			!self.categories.is_empty(),
			is_filled(&self.stage),
			is_filled(&self.problem),
			is_filled(&self.solution),
		];
		let business = [is_filled(&self.target_market), is_filled(&self.business_model)];
		let metrics = match &self.metrics {
			Some(m) => [is_filled(&m.revenue), is_filled(&m.users), is_filled(&m.growth_rate)],
			None => [false; 3],
		};
		let team = match &self.team {
			Some(t) => [is_filled(&t.size), !t.founders.is_empty()],
			None => [false; 2],
		};
		let funding = match &self.funding {
			Some(f) => [
				is_filled(&f.funding_stage),
				is_filled(&f.amount_raised),
				is_filled(&f.target_amount),
			],
			None => [false; 3],
		};
		let achieved = group_score(&basic, BASIC_WEIGHT)
			+ group_score(&business, BUSINESS_WEIGHT)
			+ group_score(&metrics, METRICS_WEIGHT)
			+ group_score(&team, TEAM_WEIGHT)
			+ group_score(&funding, FUNDING_WEIGHT);
		let total = BASIC_WEIGHT + BUSINESS_WEIGHT + METRICS_WEIGHT + TEAM_WEIGHT + FUNDING_WEIGHT;

		(100.0 * achieved / total).clamp(0.0, 100.0)
	}

	pub fn stage(&self) -> &str {
		self.stage.as_deref().map(str::trim).unwrap_or_default()
	}

	pub fn primary_category(&self) -> Option<&str> {
		self.categories.first().map(String::as_str)
	}
}

/// Folds an extraction into a profile and returns the merged profile with its fresh completeness.
pub fn merge(profile: &ProjectProfile, extraction: &ExtractionResult) -> (ProjectProfile, f32) {
	let mut merged = profile.clone();

	union_into(&mut merged.categories, &extraction.categories);
	merge_scalar(&mut merged.stage, &extraction.stage);
	merge_scalar(&mut merged.problem, &extraction.problem);
	merge_scalar(&mut merged.solution, &extraction.solution);
	merge_scalar(&mut merged.target_market, &extraction.target_market);
	merge_scalar(&mut merged.business_model, &extraction.business_model);

	if let Some(incoming) = &extraction.metrics {
		let mut metrics = merged.metrics.take().unwrap_or_default();

		merge_scalar(&mut metrics.revenue, &incoming.revenue);
		merge_scalar(&mut metrics.users, &incoming.users);
		merge_scalar(&mut metrics.growth_rate, &incoming.growth_rate);
		merge_scalar(&mut metrics.mrr, &incoming.mrr);
		merge_scalar(&mut metrics.arr, &incoming.arr);
		merge_scalar(&mut metrics.burn_rate, &incoming.burn_rate);
		merge_scalar(&mut metrics.runway, &incoming.runway);

		merged.metrics = keep_if_populated(metrics);
	}
	if let Some(incoming) = &extraction.team {
		let mut team = merged.team.take().unwrap_or_default();

		merge_scalar(&mut team.size, &incoming.size);
		union_into(&mut team.founders, &incoming.founders);
		merge_scalar(&mut team.experience, &incoming.experience);
		merge_scalar(&mut team.technical_team, &incoming.technical_team);

		merged.team = keep_if_populated(team);
	}
	if let Some(incoming) = &extraction.funding {
		let mut funding = merged.funding.take().unwrap_or_default();

		merge_scalar(&mut funding.funding_stage, &incoming.funding_stage);
		merge_scalar(&mut funding.amount_raised, &incoming.amount_raised);
		merge_scalar(&mut funding.target_amount, &incoming.target_amount);
		merge_scalar(&mut funding.use_of_funds, &incoming.use_of_funds);

		merged.funding = keep_if_populated(funding);
	}

	let completeness = merged.completeness();

	(merged, completeness)
}

/// Dotted names of the fields an extraction populates, in a stable order.
pub fn extracted_fields(extraction: &ExtractionResult) -> Vec<&'static str> {
	let mut fields = Vec::new();

	if extraction.categories.iter().any(|c| !c.trim().is_empty()) {
		fields.push("categories");
	}

	for (name, value) in [
		("stage", &extraction.stage),
		("problem", &extraction.problem),
		("solution", &extraction.solution),
		("target_market", &extraction.target_market),
		("business_model", &extraction.business_model),
	] {
		if is_filled(value) {
			fields.push(name);
		}
	}

	if let Some(m) = &extraction.metrics {
		for (name, value) in [
			("metrics.revenue", &m.revenue),
			("metrics.users", &m.users),
			("metrics.growth_rate", &m.growth_rate),
			("metrics.mrr", &m.mrr),
			("metrics.arr", &m.arr),
			("metrics.burn_rate", &m.burn_rate),
			("metrics.runway", &m.runway),
		] {
			if is_filled(value) {
				fields.push(name);
			}
		}
	}
	if let Some(t) = &extraction.team {
		if is_filled(&t.size) {
			fields.push("team.size");
		}
		if t.founders.iter().any(|f| !f.trim().is_empty()) {
			fields.push("team.founders");
		}
		if is_filled(&t.experience) {
			fields.push("team.experience");
		}
		if is_filled(&t.technical_team) {
			fields.push("team.technical_team");
		}
	}
	if let Some(f) = &extraction.funding {
		for (name, value) in [
			("funding.funding_stage", &f.funding_stage),
			("funding.amount_raised", &f.amount_raised),
			("funding.target_amount", &f.target_amount),
			("funding.use_of_funds", &f.use_of_funds),
		] {
			if is_filled(value) {
				fields.push(name);
			}
		}
	}

	fields
}

/// Case-insensitive identity used when de-duplicating set-valued fields.
pub fn dedupe_key(value: &str) -> String {
	value.trim().nfkc().collect::<String>().to_lowercase()
}

/// Appends the non-blank entries of `incoming` whose key is not already present. First spelling wins.
pub fn union_into(target: &mut Vec<String>, incoming: &[String]) {
	let mut seen: Vec<String> = target.iter().map(|value| dedupe_key(value)).collect();

	for value in incoming {
		let trimmed = value.trim();

		if trimmed.is_empty() {
			continue;
		}

		let key = dedupe_key(trimmed);

		if seen.contains(&key) {
			continue;
		}

		seen.push(key);
		target.push(trimmed.to_string());
	}
}

fn merge_scalar(current: &mut Option<String>, incoming: &Option<String>) {
	if let Some(value) = incoming.as_deref().map(str::trim).filter(|value| !value.is_empty()) {
		*current = Some(value.to_string());
	}
}

fn keep_if_populated<T>(value: T) -> Option<T>
where
	T: Default + PartialEq,
{
	if value == T::default() { None } else { Some(value) }
}

fn is_filled(value: &Option<String>) -> bool {
	value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

fn group_score(populated: &[bool], weight: f32) -> f32 {
	if populated.is_empty() {
		return 0.0;
	}

	let filled = populated.iter().filter(|present| **present).count();

	filled as f32 / populated.len() as f32 * weight
}
