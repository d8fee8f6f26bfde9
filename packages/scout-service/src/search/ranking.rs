use std::{cmp::Ordering, collections::HashSet};

use scout_domain::{candidate::CandidateRecord, profile::dedupe_key};

use crate::search::{Pool, RankedResult};

pub const NAME_MATCH_WEIGHT: f32 = 1.0;
pub const CATEGORY_MATCH_WEIGHT: f32 = 1.5;
pub const STAGE_MATCH_WEIGHT: f32 = 1.0;
pub const DESCRIPTION_MATCH_WEIGHT: f32 = 0.5;
/// Blended scores are kept to six decimals so complementary pool weights produce exact ties.
pub const BLENDED_SCALE: f32 = 1_000_000.0;

pub fn normalize_score(score: f32) -> f32 {
	if !score.is_finite() {
		return 0.0;
	}

	score.clamp(0.0, 100.0) / 100.0
}

/// Pool B score with the child bonus. The bonus never exceeds the base and the sum caps at 100.
pub fn pool_b_intrinsic(base: f32, children: usize, per_child_bonus: f32) -> f32 {
	let base = if base.is_finite() { base.max(0.0) } else { 0.0 };
	let bonus = (children as f32 * per_child_bonus.max(0.0)).min(base);

	(base + bonus).min(100.0)
}

/// Sum over keywords of the best-matching field weight.
pub fn keyword_relevance(record: &CandidateRecord, keywords: &[String]) -> f32 {
	let name = dedupe_key(&record.name);
	let categories: Vec<String> = record.categories.iter().map(|c| dedupe_key(c)).collect();
	let stages: Vec<String> = record.stages.iter().map(|s| dedupe_key(s)).collect();
	let description = [record.headline.as_deref(), record.description.as_deref()]
		.into_iter()
		.flatten()
		.map(dedupe_key)
		.collect::<Vec<_>>()
		.join(" ");
	let mut total = 0.0;

	for keyword in keywords {
		let needle = dedupe_key(keyword);

		if needle.is_empty() {
			continue;
		}

		let mut best: f32 = 0.0;

		if categories.iter().any(|c| c.contains(&needle)) {
			best = best.max(CATEGORY_MATCH_WEIGHT);
		}
		if name.contains(&needle) {
			best = best.max(NAME_MATCH_WEIGHT);
		}
		if stages.iter().any(|s| s.contains(&needle)) {
			best = best.max(STAGE_MATCH_WEIGHT);
		}
		if description.contains(&needle) {
			best = best.max(DESCRIPTION_MATCH_WEIGHT);
		}

		total += best;
	}

	total
}

pub fn score_record(
	record: CandidateRecord,
	pool: Pool,
	intrinsic: f32,
	weight: f32,
	keywords: &[String],
	children: Vec<CandidateRecord>,
) -> RankedResult {
	let relevance = keyword_relevance(&record, keywords);
	let blended = (normalize_score(intrinsic) * weight * BLENDED_SCALE).round() / BLENDED_SCALE;

	RankedResult { record, pool, relevance, intrinsic, weight, blended, children }
}

/// Blended score desc, intrinsic desc, relevance desc, id asc.
pub fn cmp_ranked(a: &RankedResult, b: &RankedResult) -> Ordering {
	cmp_f32_desc(a.blended, b.blended)
		.then_with(|| cmp_f32_desc(a.intrinsic, b.intrinsic))
		.then_with(|| cmp_f32_desc(a.relevance, b.relevance))
		.then_with(|| a.record.id.cmp(&b.record.id))
}

pub fn rank(mut results: Vec<RankedResult>, cap: usize) -> Vec<RankedResult> {
	results.sort_by(cmp_ranked);
	results.truncate(cap);

	results
}

/// Keeps only the best-ranked copy of each record id.
pub fn dedupe_by_id(mut results: Vec<RankedResult>) -> Vec<RankedResult> {
	let mut seen = HashSet::new();

	results.sort_by(cmp_ranked);
	results.retain(|result| seen.insert(result.record.id.clone()));

	results
}

pub fn cmp_f32_desc(a: f32, b: f32) -> Ordering {
	match (a.is_nan(), b.is_nan()) {
		(true, true) => Ordering::Equal,
		(true, false) => Ordering::Greater,
		(false, true) => Ordering::Less,
		(false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
	}
}
