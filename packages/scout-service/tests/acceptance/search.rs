use std::{
	collections::HashMap,
	sync::{Arc, atomic::Ordering},
	time::Duration,
};

use tokio::sync::Barrier;

use scout_domain::{candidate::CandidateRecord, profile::ProjectProfile, stage::StageBand};
use scout_service::{
	BoxFuture, CandidateStore, Pool, Result, SearchRequest, SearchStatus, SearchTarget, Stores,
};

use super::{MemoryProfiles, ScriptedOracle, StubCandidates, record};

fn scout_with(investors: StubCandidates, companies: StubCandidates) -> scout_service::Scout {
	super::scout(
		ScriptedOracle::default(),
		super::memory_stores(Arc::new(MemoryProfiles::default()), investors, companies),
	)
}

fn investors(stage: &str) -> SearchRequest {
	SearchRequest {
		target: SearchTarget::Investors,
		keywords: vec!["fintech".to_string()],
		stage: stage.to_string(),
		..Default::default()
	}
}

#[tokio::test]
async fn pool_a_failure_returns_pool_b_with_partial_status() {
	let pool_b = (1..=5).map(|i| record(&format!("f-{i}"), 40.0 + i as f32 * 10.0)).collect();
	let scout =
		scout_with(StubCandidates::with_pools(None, Some(pool_b)), StubCandidates::default());
	let response = scout.search(investors("seed")).await;

	assert_eq!(response.results.len(), 5);
	assert_eq!(response.status, SearchStatus::PartialFailure { failed: Pool::A });
	assert!(response.status.is_degraded());
	assert_eq!(response.pool_a_found, 0);
	assert_eq!(response.pool_b_found, 5);
	assert_eq!(response.results[0].record.id, "f-5");
	assert!(response.results.iter().all(|r| r.pool == Pool::B));
}

#[tokio::test]
async fn both_pools_failing_is_total_failure_not_an_error() {
	let scout = scout_with(StubCandidates::with_pools(None, None), StubCandidates::default());
	let response = scout.search(investors("seed")).await;

	assert!(response.results.is_empty());
	assert_eq!(response.status, SearchStatus::TotalFailure);
}

#[tokio::test]
async fn blended_ranking_uses_stage_weights_and_child_bonus() {
	let mut store = StubCandidates::with_pools(
		Some(vec![record("a-1", 80.0), record("a-2", 30.0), record("a-3", 45.0)]),
		Some(vec![record("f-1", 50.0), record("f-2", 40.0)]),
	);

	store.children = HashMap::from([(
		"f-1".to_string(),
		vec![record("e-1", 8.0), record("e-2", 7.0), record("e-3", 3.0)],
	)]);
	store.failing_children = vec!["f-2".to_string()];

	let scout = scout_with(store, StubCandidates::default());
	let response = scout.search(investors("Seed")).await;
	let ids: Vec<&str> = response.results.iter().map(|r| r.record.id.as_str()).collect();

	assert_eq!(response.status, SearchStatus::Complete);
	assert_eq!(response.band, StageBand::Seed);
	assert!((response.weights.pool_a - 0.6).abs() < 1e-6);
	assert!((response.weights.pool_b - 0.4).abs() < 1e-6);
	assert_eq!(ids, vec!["a-1", "a-3", "f-1", "f-2"]);

	let fund = &response.results[2];

	assert_eq!(fund.children.len(), 2);
	assert!((fund.intrinsic - 60.0).abs() < 1e-6);
	assert!((fund.blended - 0.24).abs() < 1e-6);
	assert!(response.results[3].children.is_empty());

	for pair in response.results.windows(2) {
		assert!(pair[0].blended >= pair[1].blended);
	}
}

#[tokio::test]
async fn results_are_capped_and_keywords_normalized() {
	let pool_a = (0..20).map(|i| record(&format!("a-{i:02}"), 50.0 + i as f32)).collect();
	let store = StubCandidates::with_pools(Some(pool_a), Some(Vec::new()));
	let mut scout = scout_with(store, StubCandidates::default());

	scout.cfg.search.result_cap = 3;

	let response = scout
		.search(SearchRequest {
			keywords: vec![" SaaS ".to_string(), "saas".to_string(), "".to_string()],
			pool_a_limit: Some(20),
			..Default::default()
		})
		.await;

	assert_eq!(response.results.len(), 3);
	assert_eq!(response.pool_a_found, 20);
	assert_eq!(response.keywords, vec!["SaaS"]);
	assert_eq!(response.band, StageBand::Unknown);
}

#[tokio::test]
async fn company_search_ignores_stage_and_children() {
	let companies = StubCandidates::with_pools(
		Some(vec![record("c-1", 70.0)]),
		Some(vec![record("c-2", 90.0)]),
	);
	let child_calls = companies.child_calls.clone();
	let scout = scout_with(StubCandidates::default(), companies);
	let response = scout
		.search(SearchRequest {
			target: SearchTarget::Companies,
			keywords: vec!["marketing".to_string()],
			stage: "seed".to_string(),
			..Default::default()
		})
		.await;

	assert_eq!(response.target, SearchTarget::Companies);
	assert_eq!(response.band, StageBand::Unknown);
	assert!((response.weights.pool_a - 0.5).abs() < 1e-6);
	assert_eq!(child_calls.load(Ordering::SeqCst), 0);
	assert_eq!(response.results[0].record.id, "c-2");
}

#[tokio::test]
async fn eligibility_follows_profile_gaps() {
	let scout = scout_with(StubCandidates::default(), StubCandidates::default());
	let missing_stage =
		ProjectProfile { categories: vec!["fintech".to_string()], ..Default::default() };
	let refused = scout.can_search(&missing_stage);

	assert!(!refused.allowed);
	assert!(refused.reason.contains("stage"));

	let ready = ProjectProfile {
		categories: vec!["saas".to_string()],
		stage: Some("seed".to_string()),
		problem: Some("Manual invoicing".to_string()),
		solution: Some("Automated billing".to_string()),
		target_market: Some("SMBs".to_string()),
		..Default::default()
	};
	let allowed = scout.can_search(&ready);

	assert!(allowed.completeness >= 50.0);
	assert!(allowed.allowed);
	assert!(allowed.reason.is_empty());
}

#[tokio::test]
async fn equal_blended_scores_rank_higher_intrinsic_first() {
	let store = StubCandidates::with_pools(
		Some(vec![record("a-1", 40.0)]),
		Some(vec![record("f-1", 60.0)]),
	);
	let scout = scout_with(store, StubCandidates::default());
	let response = scout.search(investors("seed")).await;
	let ids: Vec<&str> = response.results.iter().map(|r| r.record.id.as_str()).collect();

	assert_eq!(response.results[0].blended, response.results[1].blended);
	assert_eq!(ids, vec!["f-1", "a-1"]);
}

#[tokio::test]
async fn provider_matched_by_both_company_pools_is_listed_once() {
	let mut shared = record("c-1", 70.0);

	shared.description = Some("Marketing agency".to_string());

	let companies = StubCandidates::with_pools(
		Some(vec![shared.clone(), record("c-2", 50.0)]),
		Some(vec![shared]),
	);
	let scout = scout_with(StubCandidates::default(), companies);
	let response = scout
		.search(SearchRequest {
			target: SearchTarget::Companies,
			keywords: vec!["marketing".to_string(), "seo".to_string()],
			..Default::default()
		})
		.await;
	let ids: Vec<&str> = response.results.iter().map(|r| r.record.id.as_str()).collect();

	assert_eq!(ids, vec!["c-1", "c-2"]);
	assert_eq!(response.pool_a_found, 2);
	assert_eq!(response.pool_b_found, 1);
}

#[tokio::test]
async fn zero_pool_limit_skips_that_pool() {
	let store = StubCandidates::with_pools(
		Some(vec![record("a-1", 80.0)]),
		Some(vec![record("f-1", 60.0)]),
	);
	let scout = scout_with(store, StubCandidates::default());
	let response =
		scout.search(SearchRequest { pool_a_limit: Some(0), ..investors("seed") }).await;

	assert_eq!(response.status, SearchStatus::Complete);
	assert_eq!(response.pool_a_found, 0);
	assert_eq!(response.pool_b_found, 1);
	assert!(response.results.iter().all(|r| r.pool == Pool::B));
}

/// Both pool queries wait for each other, so a sequential search never finishes.
struct RendezvousPools {
	barrier: Barrier,
}
impl CandidateStore for RendezvousPools {
	fn query_pool_a<'a>(
		&'a self,
		_keywords: &'a [String],
		_min_score: f32,
		_limit: u32,
	) -> BoxFuture<'a, Result<Vec<CandidateRecord>>> {
		Box::pin(async move {
			self.barrier.wait().await;

			Ok(vec![record("a-1", 80.0)])
		})
	}

	fn query_pool_b<'a>(
		&'a self,
		_keywords: &'a [String],
		_limit: u32,
	) -> BoxFuture<'a, Result<Vec<CandidateRecord>>> {
		Box::pin(async move {
			self.barrier.wait().await;

			Ok(vec![record("f-1", 70.0)])
		})
	}

	fn query_pool_b_children<'a>(
		&'a self,
		_parent_id: &'a str,
		_min_score: f32,
		_limit: u32,
	) -> BoxFuture<'a, Result<Vec<CandidateRecord>>> {
		Box::pin(async { Ok(Vec::new()) })
	}
}

#[tokio::test]
async fn pools_are_queried_concurrently() {
	let stores = Stores::new(
		Arc::new(MemoryProfiles::default()),
		Arc::new(RendezvousPools { barrier: Barrier::new(2) }),
		Arc::new(StubCandidates::default()),
	);
	let scout = super::scout(ScriptedOracle::default(), stores);
	let response = tokio::time::timeout(Duration::from_secs(5), scout.search(investors("seed")))
		.await
		.expect("Pool queries were not issued concurrently.");

	assert_eq!(response.status, SearchStatus::Complete);
	assert_eq!(response.results.len(), 2);
}
