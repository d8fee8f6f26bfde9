pub mod ranking;

use serde::{Deserialize, Serialize};

use scout_domain::{
	candidate::CandidateRecord,
	eligibility::{self, Eligibility},
	keywords,
	profile::ProjectProfile,
	stage::{self, PoolWeights, StageBand},
};

use crate::{CandidateStore, Result, Scout};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchTarget {
	#[default]
	Investors,
	Companies,
}
impl SearchTarget {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Investors => "investors",
			Self::Companies => "companies",
		}
	}

	fn has_children(self) -> bool {
		matches!(self, Self::Investors)
	}

	/// Both company pools read the same provider table, so one provider can surface twice.
	fn pools_share_records(self) -> bool {
		matches!(self, Self::Companies)
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Pool {
	#[serde(rename = "pool_a")]
	A,
	#[serde(rename = "pool_b")]
	B,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SearchStatus {
	Complete,
	PartialFailure { failed: Pool },
	TotalFailure,
}
impl SearchStatus {
	pub fn is_degraded(self) -> bool {
		!matches!(self, Self::Complete)
	}
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct SearchRequest {
	#[serde(default)]
	pub target: SearchTarget,
	#[serde(default)]
	pub keywords: Vec<String>,
	#[serde(default)]
	pub stage: String,
	pub pool_a_limit: Option<u32>,
	pub pool_b_limit: Option<u32>,
}

#[derive(Clone, Debug, Serialize)]
pub struct RankedResult {
	#[serde(flatten)]
	pub record: CandidateRecord,
	pub pool: Pool,
	pub relevance: f32,
	/// Pool-intrinsic score actually used, after any pool B bonus.
	pub intrinsic: f32,
	pub weight: f32,
	pub blended: f32,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub children: Vec<CandidateRecord>,
}

#[derive(Clone, Debug, Serialize)]
pub struct RankedResponse {
	pub target: SearchTarget,
	pub results: Vec<RankedResult>,
	pub status: SearchStatus,
	pub band: StageBand,
	pub weights: PoolWeights,
	pub pool_a_found: usize,
	pub pool_b_found: usize,
	pub keywords: Vec<String>,
}

impl Scout {
	pub fn can_search(&self, profile: &ProjectProfile) -> Eligibility {
		eligibility::can_search(profile, self.cfg.profile.search_completeness_threshold)
	}

	/// Retrieves both pools concurrently, blends them with stage weights, and ranks the union.
	/// Pool failures are reported through the status, never as an error.
	pub async fn search(&self, req: SearchRequest) -> RankedResponse {
		let cfg = &self.cfg.search;
		let keywords = keywords::normalize_keywords(&req.keywords, cfg.max_keywords as usize);
		let band = match req.target {
			SearchTarget::Investors => stage::stage_band(&req.stage),
			SearchTarget::Companies => StageBand::Unknown,
		};
		let weights = stage::band_weights(band, &cfg.stage_weights);
		let store = self.stores.for_target(req.target);
		let pool_a_limit = req.pool_a_limit.unwrap_or(cfg.pool_a_limit);
		let pool_b_limit = req.pool_b_limit.unwrap_or(cfg.pool_b_limit);
		let (pool_a, pool_b) = tokio::join!(
			async {
				if pool_a_limit == 0 {
					return Ok(Vec::new());
				}

				store.query_pool_a(&keywords, cfg.pool_a_min_score, pool_a_limit).await
			},
			self.fetch_pool_b(store, req.target, &keywords, pool_b_limit),
		);
		let mut scored = Vec::new();
		let mut pool_a_found = 0;
		let mut pool_b_found = 0;
		let mut failed = Vec::new();

		match pool_a {
			Ok(records) => {
				pool_a_found = records.len();

				for record in records {
					let intrinsic = record.score;

					scored.push(ranking::score_record(
						record,
						Pool::A,
						intrinsic,
						weights.pool_a,
						&keywords,
						Vec::new(),
					));
				}
			},
			Err(err) => {
				tracing::warn!(
					error = %err,
					search_target = req.target.as_str(),
					"Pool A retrieval failed."
				);

				failed.push(Pool::A);
			},
		}
		match pool_b {
			Ok(records) => {
				pool_b_found = records.len();

				for (record, children) in records {
					let intrinsic = if req.target.has_children() {
						ranking::pool_b_intrinsic(record.score, children.len(), cfg.child_bonus)
					} else {
						record.score
					};

					scored.push(ranking::score_record(
						record,
						Pool::B,
						intrinsic,
						weights.pool_b,
						&keywords,
						children,
					));
				}
			},
			Err(err) => {
				tracing::warn!(
					error = %err,
					search_target = req.target.as_str(),
					"Pool B retrieval failed."
				);

				failed.push(Pool::B);
			},
		}

		let status = match failed.as_slice() {
			[] => SearchStatus::Complete,
			[pool] => SearchStatus::PartialFailure { failed: *pool },
			_ => SearchStatus::TotalFailure,
		};
		let scored =
			if req.target.pools_share_records() { ranking::dedupe_by_id(scored) } else { scored };
		let results = ranking::rank(scored, cfg.result_cap as usize);

		tracing::info!(
			search_target = req.target.as_str(),
			band = ?band,
			pool_a_found,
			pool_b_found,
			returned = results.len(),
			status = ?status,
			"Search completed."
		);

		RankedResponse {
			target: req.target,
			results,
			status,
			band,
			weights,
			pool_a_found,
			pool_b_found,
			keywords,
		}
	}

	async fn fetch_pool_b(
		&self,
		store: &dyn CandidateStore,
		target: SearchTarget,
		keywords: &[String],
		limit: u32,
	) -> Result<Vec<(CandidateRecord, Vec<CandidateRecord>)>> {
		if limit == 0 {
			return Ok(Vec::new());
		}

		let records = store.query_pool_b(keywords, limit).await?;
		let cfg = &self.cfg.search;
		let mut out = Vec::with_capacity(records.len());

		for record in records {
			let children = if target.has_children() {
				match store
					.query_pool_b_children(&record.id, cfg.child_min_score, cfg.child_limit)
					.await
				{
					Ok(children) => children,
					Err(err) => {
						tracing::warn!(
							error = %err,
							record_id = %record.id,
							"Child retrieval failed. Continuing without children."
						);

						Vec::new()
					},
				}
			} else {
				Vec::new()
			};

			out.push((record, children));
		}

		Ok(out)
	}
}
