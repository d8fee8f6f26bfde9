use std::sync::{Arc, atomic::Ordering};

use scout_domain::conversation::Intent;
use scout_service::{Error, EventKind, SearchStatus, SearchTarget, TurnRequest, reply};

use super::{MemoryProfiles, RecordingSink, ScriptedOracle, StubCandidates, record};

const READY_PROFILE_ANSWER: &str = "\
INTENT: search_investors
CONFIDENCE: 0.9
CATEGORIES: fintech
STAGE: seed
PROBLEM: Cross-border payouts take days
SOLUTION: Instant stablecoin rails
MARKET: Latin American freelancers
BUSINESS_MODEL: Transaction fees
KEYWORDS: payments";

fn request(conversation_id: &str, message: &str) -> TurnRequest {
	TurnRequest { conversation_id: conversation_id.to_string(), message: message.to_string() }
}

#[tokio::test]
async fn spam_is_refused_without_classification() {
	let oracle = ScriptedOracle::classifying("INTENT: welcome");
	let calls = oracle.calls.clone();
	let profiles = Arc::new(MemoryProfiles::default());
	let scout = super::scout(
		oracle,
		super::memory_stores(profiles.clone(), StubCandidates::default(), StubCandidates::default()),
	);
	let response = scout
		.handle_turn(request("conv-spam", &"buy now cheap ".repeat(12)))
		.await
		.expect("Spam turns must not fail.");

	assert!(response.spam.is_spam);
	assert_eq!(response.intent, None);
	assert!(response.search.is_none());
	assert_eq!(response.reply, reply::spam_reply(&response.spam, response.language));
	assert_eq!(response.message_count, 1);
	assert_eq!(calls.load(Ordering::SeqCst), 0);
	assert_eq!(profiles.state("conv-spam").map(|s| s.message_count), Some(1));
}

#[tokio::test]
async fn welcome_uses_canned_text() {
	let scout = super::scout(
		ScriptedOracle::classifying("INTENT: welcome\nCONFIDENCE: 0.95"),
		super::memory_stores(
			Arc::new(MemoryProfiles::default()),
			StubCandidates::default(),
			StubCandidates::default(),
		),
	);
	let response =
		scout.handle_turn(request("conv-hi", "Hola, buenos días")).await.expect("Failed turn.");

	assert_eq!(response.intent, Some(Intent::Welcome));
	assert_eq!(response.reply, reply::welcome_text(response.language));
}

#[tokio::test]
async fn thin_profile_refuses_investor_search() {
	let investors = StubCandidates::with_pools(Some(vec![record("a-1", 90.0)]), Some(Vec::new()));
	let seen_keywords = investors.seen_keywords.clone();
	let profiles = Arc::new(MemoryProfiles::default());
	let scout = super::scout(
		ScriptedOracle::classifying("INTENT: search_investors\nCATEGORIES: fintech"),
		super::memory_stores(profiles.clone(), investors, StubCandidates::default()),
	);
	let response = scout
		.handle_turn(request("conv-thin", "Busco inversores para mi startup fintech"))
		.await
		.expect("Failed turn.");

	assert_eq!(response.intent, Some(Intent::ImproveProfile));
	assert!(response.search.is_none());
	assert!(!response.eligibility.allowed);
	assert_eq!(response.reply, reply::refusal_reply(&response.eligibility, response.language));
	assert!(seen_keywords.lock().expect("keywords lock").is_empty());

	let saved = profiles.profile("conv-thin").expect("Profile must be saved.");

	assert_eq!(saved.categories, vec!["fintech"]);

	let state = profiles.state("conv-thin").expect("State must be saved.");

	assert_eq!(state.last_intent, Some(Intent::SearchInvestors));
	assert!(state.extracted_fields.contains(&"categories".to_string()));
}

#[tokio::test]
async fn ready_profile_runs_investor_search_and_publishes_in_order() {
	let investors = StubCandidates::with_pools(
		Some(vec![record("a-1", 90.0), record("a-2", 60.0)]),
		Some(vec![record("f-1", 70.0)]),
	);
	let seen_keywords = investors.seen_keywords.clone();
	let scout = super::scout(
		ScriptedOracle::classifying(READY_PROFILE_ANSWER),
		super::memory_stores(
			Arc::new(MemoryProfiles::default()),
			investors,
			StubCandidates::default(),
		),
	);
	let sink = RecordingSink::default();

	scout.delivery.subscribe("conv-ready", Arc::new(sink.clone())).await;

	let response = scout
		.handle_turn(request("conv-ready", "Busco inversores seed para mi startup fintech"))
		.await
		.expect("Failed turn.");
	let search = response.search.as_ref().expect("Search must run.");

	assert_eq!(response.intent, Some(Intent::SearchInvestors));
	assert!(response.completeness >= 50.0);
	assert_eq!(search.target, SearchTarget::Investors);
	assert_eq!(search.status, SearchStatus::Complete);
	assert_eq!(search.results.len(), 3);
	assert_eq!(response.reply, reply::search_reply(search, response.language));

	let keywords = seen_keywords.lock().expect("keywords lock").clone();

	assert_eq!(keywords, vec!["payments", "fintech", "seed"]);

	let kinds: Vec<EventKind> = sink.events().iter().map(|event| event.kind).collect();

	assert_eq!(
		kinds,
		vec![
			EventKind::JudgeDecision,
			EventKind::SearchResults,
			EventKind::AiResponse,
			EventKind::ProfileUpdate,
		]
	);
}

#[tokio::test]
async fn company_search_is_not_gated_and_derives_service_keywords() {
	let companies = StubCandidates::with_pools(Some(vec![record("c-1", 75.0)]), None);
	let seen_keywords = companies.seen_keywords.clone();
	let scout = super::scout(
		ScriptedOracle::classifying("INTENT: search_companies\nCONFIDENCE: 0.8"),
		super::memory_stores(
			Arc::new(MemoryProfiles::default()),
			StubCandidates::default(),
			companies,
		),
	);
	let response = scout
		.handle_turn(request("conv-co", "Necesito una agencia de marketing para mi startup"))
		.await
		.expect("Failed turn.");
	let search = response.search.as_ref().expect("Search must run.");

	assert_eq!(search.target, SearchTarget::Companies);
	assert_eq!(search.status, SearchStatus::PartialFailure { failed: scout_service::Pool::B });
	assert_eq!(search.results.len(), 1);
	assert!(seen_keywords.lock().expect("keywords lock").contains(&"marketing".to_string()));
	assert!(response.reply.ends_with(match response.language {
		scout_domain::language::Language::Spanish =>
			"los resultados pueden estar incompletos.",
		scout_domain::language::Language::English => "these results may be incomplete.",
	}));
}

#[tokio::test]
async fn general_conversation_falls_back_when_mentor_is_down() {
	let oracle = ScriptedOracle {
		classify: Some("INTENT: general_conversation".to_string()),
		extract: Some("{}".to_string()),
		mentor: None,
		..Default::default()
	};
	let scout = super::scout(
		oracle,
		super::memory_stores(
			Arc::new(MemoryProfiles::default()),
			StubCandidates::default(),
			StubCandidates::default(),
		),
	);
	let response = scout
		.handle_turn(request("conv-chat", "¿Cómo valido mi idea de negocio?"))
		.await
		.expect("Failed turn.");

	assert_eq!(response.intent, Some(Intent::GeneralConversation));
	assert_eq!(response.reply, reply::mentor_fallback(response.language));
}

#[tokio::test]
async fn message_count_accumulates_across_turns() {
	let profiles = Arc::new(MemoryProfiles::default());
	let scout = super::scout(
		ScriptedOracle::classifying("INTENT: general_conversation"),
		super::memory_stores(profiles.clone(), StubCandidates::default(), StubCandidates::default()),
	);

	for _ in 0..3 {
		scout.handle_turn(request("conv-many", "Tengo una startup de software")).await.expect("turn");
	}

	assert_eq!(profiles.state("conv-many").map(|s| s.message_count), Some(3));
}

#[tokio::test]
async fn invalid_input_and_store_failures_surface_as_errors() {
	let scout = super::scout(
		ScriptedOracle::classifying("INTENT: welcome"),
		super::memory_stores(
			Arc::new(MemoryProfiles::default()),
			StubCandidates::default(),
			StubCandidates::default(),
		),
	);

	assert!(matches!(
		scout.handle_turn(request("conv-x", "  ")).await,
		Err(Error::InvalidInput { .. })
	));
	assert!(matches!(
		scout.handle_turn(request("conv-x", &"a".repeat(4_001))).await,
		Err(Error::InvalidInput { .. })
	));

	let offline = super::scout(
		ScriptedOracle::classifying("INTENT: welcome"),
		super::memory_stores(
			Arc::new(MemoryProfiles::failing()),
			StubCandidates::default(),
			StubCandidates::default(),
		),
	);

	assert!(matches!(
		offline.handle_turn(request("conv-x", "Hola")).await,
		Err(Error::Storage { .. })
	));
}
