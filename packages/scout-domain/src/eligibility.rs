use serde::Serialize;

use crate::profile::ProjectProfile;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EligibilityGap {
	Completeness { actual: f32, required: f32 },
	MissingStage,
	MissingCategories,
}
impl EligibilityGap {
	pub fn describe(&self) -> String {
		match self {
			Self::Completeness { actual, required } =>
				format!("profile completeness is {actual:.0}%, at least {required:.0}% is required"),
			Self::MissingStage => "project stage is missing".to_string(),
			Self::MissingCategories => "project categories are missing".to_string(),
		}
	}
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Eligibility {
	pub allowed: bool,
	pub completeness: f32,
	/// Empty when allowed. Otherwise names every failing condition.
	pub reason: String,
	pub gaps: Vec<EligibilityGap>,
}

/// Decides whether a profile is rich enough for an investor search.
pub fn can_search(profile: &ProjectProfile, threshold: f32) -> Eligibility {
	let completeness = profile.completeness();
	let mut gaps = Vec::new();

	if completeness < threshold {
		gaps.push(EligibilityGap::Completeness { actual: completeness, required: threshold });
	}
	if profile.stage().is_empty() {
		gaps.push(EligibilityGap::MissingStage);
	}
	if !profile.categories.iter().any(|category| !category.trim().is_empty()) {
		gaps.push(EligibilityGap::MissingCategories);
	}

	let reason = gaps.iter().map(EligibilityGap::describe).collect::<Vec<_>>().join("; ");

	Eligibility { allowed: gaps.is_empty(), completeness, reason, gaps }
}
