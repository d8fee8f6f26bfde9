use std::sync::Arc;

use scout_domain::profile::ProjectProfile;

use super::{MemoryProfiles, ScriptedOracle, StubCandidates};

fn scout_with(oracle: ScriptedOracle) -> scout_service::Scout {
	super::scout(
		oracle,
		super::memory_stores(
			Arc::new(MemoryProfiles::default()),
			StubCandidates::default(),
			StubCandidates::default(),
		),
	)
}

fn known_profile() -> ProjectProfile {
	ProjectProfile {
		categories: vec!["fintech".to_string()],
		stage: Some("mvp".to_string()),
		..Default::default()
	}
}

#[tokio::test]
async fn extraction_is_merged_and_fields_reported() {
	let oracle = ScriptedOracle {
		extract: Some(
			"```json\n{\"categories\": [\"FinTech\", \"payments\"], \"problem_solved\": \"Slow payouts\", \
			 \"metrics\": {\"users\": 300}}\n```"
				.to_string(),
		),
		..Default::default()
	};
	let scout = scout_with(oracle);
	let before = known_profile();
	let update = scout.update_profile(&before, "Tenemos 300 usuarios", "Great traction.").await;

	assert_eq!(update.profile.categories, vec!["fintech", "payments"]);
	assert_eq!(update.profile.problem.as_deref(), Some("Slow payouts"));
	assert_eq!(
		update.profile.metrics.as_ref().and_then(|m| m.users.as_deref()),
		Some("300")
	);
	assert!(update.completeness > before.completeness());
	assert_eq!(update.fields, vec!["categories", "problem", "metrics.users"]);
}

#[tokio::test]
async fn oracle_failure_leaves_profile_unchanged() {
	let scout = scout_with(ScriptedOracle::default());
	let before = known_profile();
	let update = scout.update_profile(&before, "Hola", "Hola").await;

	assert_eq!(update.profile, before);
	assert_eq!(update.completeness, before.completeness());
	assert!(update.fields.is_empty());
}

#[tokio::test]
async fn unusable_json_leaves_profile_unchanged() {
	let oracle =
		ScriptedOracle { extract: Some("[\"not\", \"an object\"]".to_string()), ..Default::default() };
	let scout = scout_with(oracle);
	let before = known_profile();
	let update = scout.update_profile(&before, "Hola", "Hola").await;

	assert_eq!(update.profile, before);
	assert!(update.extraction.is_empty());
}
