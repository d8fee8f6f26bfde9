use std::sync::Arc;

use scout_domain::{
	conversation::{ConversationState, Intent},
	profile::ProjectProfile,
};
use scout_service::Error;

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

#[tokio::test]
async fn unparsable_classifier_output_degrades_to_general_conversation() {
	let scout = scout_with(ScriptedOracle::classifying("Sure! Happy to help with that."));
	let mut state = ConversationState::new("conv-d");
	let classification = scout
		.classify("Quiero hablar de mi startup", &mut state, &ProjectProfile::default())
		.await
		.expect("Classification must not fail on bad oracle output.");

	assert_eq!(classification.intent, Intent::GeneralConversation);
	assert_eq!(classification.confidence, 0.5);
	assert!(classification.extraction.is_empty());
	assert!(classification.fallback);
	assert!(classification.reasoning.starts_with("Fallback classification:"));
	assert_eq!(state.message_count, 1);
	assert_eq!(state.last_intent, Some(Intent::GeneralConversation));
}

#[tokio::test]
async fn oracle_outage_degrades_to_general_conversation() {
	let scout = scout_with(ScriptedOracle::default());
	let mut state = ConversationState::new("conv-outage");
	let classification = scout
		.classify("Necesito inversores", &mut state, &ProjectProfile::default())
		.await
		.expect("Classification must not fail when the oracle is down.");

	assert_eq!(classification.intent, Intent::GeneralConversation);
	assert!(classification.fallback);
	assert_eq!(state.message_count, 1);
}

#[tokio::test]
async fn labeled_answer_updates_state_and_extraction() {
	let scout = scout_with(ScriptedOracle::classifying(
		"INTENT: search_investors\n\
		CONFIDENCE: 0.92\n\
		CATEGORIES: fintech\n\
		STAGE: seed\n\
		KEYWORDS: payments",
	));
	let mut state = ConversationState::new("conv-ok");

	state.message_count = 4;

	let classification = scout
		.classify("Busco inversores seed para pagos", &mut state, &ProjectProfile::default())
		.await
		.expect("Failed to classify.");

	assert_eq!(classification.intent, Intent::SearchInvestors);
	assert!((classification.confidence - 0.92).abs() < 1e-6);
	assert_eq!(classification.extraction.categories, vec!["fintech"]);
	assert_eq!(classification.extraction.keywords, vec!["payments"]);
	assert!(!classification.fallback);
	assert_eq!(state.message_count, 5);
	assert_eq!(state.last_intent, Some(Intent::SearchInvestors));
}

#[tokio::test]
async fn blank_message_is_rejected_without_calling_the_oracle() {
	let oracle = ScriptedOracle::classifying("INTENT: welcome");
	let calls = oracle.calls.clone();
	let scout = scout_with(oracle);
	let mut state = ConversationState::new("conv-blank");
	let err = scout
		.classify("   ", &mut state, &ProjectProfile::default())
		.await
		.expect_err("Expected blank message to be rejected.");

	assert!(matches!(err, Error::InvalidInput { .. }));
	assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);
	assert_eq!(state.message_count, 0);
}
