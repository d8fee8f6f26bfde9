use std::sync::Arc;

use scout_domain::conversation::Intent;
use scout_service::{Providers, Scout, SearchStatus, Stores, TurnRequest};
use scout_storage::db::Db;
use scout_testkit::TestDatabase;

use super::ScriptedOracle;

#[tokio::test]
#[ignore = "Requires external Postgres. Set SCOUT_PG_DSN to run."]
async fn turns_persist_profile_and_state_in_postgres() {
	let Some(base_dsn) = scout_testkit::env_dsn() else {
		eprintln!(
			"Skipping turns_persist_profile_and_state_in_postgres; set SCOUT_PG_DSN to run this test."
		);

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let cfg = super::test_config(test_db.dsn());
	let db = Db::connect(&cfg.storage.postgres).await.expect("Failed to connect to Postgres.");

	db.ensure_schema().await.expect("Failed to ensure schema.");

	let oracle = ScriptedOracle {
		classify: Some("INTENT: search_companies\nCATEGORIES: saas".to_string()),
		extract: Some("{\"stage\": \"mvp\"}".to_string()),
		mentor: None,
		..Default::default()
	};
	let scout =
		Scout::with_providers(cfg, Stores::postgres(db.clone()), Providers::new(Arc::new(oracle)));
	let request = TurnRequest {
		conversation_id: "conv-pg".to_string(),
		message: "Necesito un abogado para mi startup".to_string(),
	};
	let response = scout.handle_turn(request.clone()).await.expect("Failed first turn.");
	let search = response.search.expect("Company search must run.");

	assert_eq!(search.status, SearchStatus::Complete);
	assert!(search.results.is_empty());

	let second = scout.handle_turn(request).await.expect("Failed second turn.");

	assert_eq!(second.intent, Some(Intent::SearchCompanies));
	assert_eq!(second.message_count, 2);
	assert_eq!(second.profile.categories, vec!["saas"]);
	assert_eq!(second.profile.stage.as_deref(), Some("mvp"));

	let stored = scout
		.stores
		.profiles
		.load_state("conv-pg")
		.await
		.expect("Failed to load state.")
		.expect("State must exist.");

	assert_eq!(stored.message_count, 2);
	assert!(stored.extracted_fields.contains(&"stage".to_string()));

	drop(scout);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
