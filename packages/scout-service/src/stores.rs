use scout_domain::{
	candidate::CandidateRecord, conversation::ConversationState, profile::ProjectProfile,
};
use scout_storage::{
	candidates::{PgCompanyStore, PgInvestorStore},
	profiles::PgProfileStore,
};

use crate::{BoxFuture, CandidateStore, ProfileStore, Result};

impl ProfileStore for PgProfileStore {
	fn load_profile<'a>(
		&'a self,
		conversation_id: &'a str,
	) -> BoxFuture<'a, Result<Option<ProjectProfile>>> {
		Box::pin(async move { Ok(PgProfileStore::load_profile(self, conversation_id).await?) })
	}

	fn save_profile<'a>(
		&'a self,
		conversation_id: &'a str,
		profile: &'a ProjectProfile,
	) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			Ok(PgProfileStore::save_profile(self, conversation_id, profile).await?)
		})
	}

	fn load_state<'a>(
		&'a self,
		conversation_id: &'a str,
	) -> BoxFuture<'a, Result<Option<ConversationState>>> {
		Box::pin(async move { Ok(PgProfileStore::load_state(self, conversation_id).await?) })
	}

	fn save_state<'a>(&'a self, state: &'a ConversationState) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move { Ok(PgProfileStore::save_state(self, state).await?) })
	}
}

impl CandidateStore for PgInvestorStore {
	fn query_pool_a<'a>(
		&'a self,
		keywords: &'a [String],
		min_score: f32,
		limit: u32,
	) -> BoxFuture<'a, Result<Vec<CandidateRecord>>> {
		Box::pin(async move { Ok(self.query_angels(keywords, min_score, limit).await?) })
	}

	fn query_pool_b<'a>(
		&'a self,
		keywords: &'a [String],
		limit: u32,
	) -> BoxFuture<'a, Result<Vec<CandidateRecord>>> {
		Box::pin(async move { Ok(self.query_funds(keywords, limit).await?) })
	}

	fn query_pool_b_children<'a>(
		&'a self,
		parent_id: &'a str,
		min_score: f32,
		limit: u32,
	) -> BoxFuture<'a, Result<Vec<CandidateRecord>>> {
		Box::pin(async move { Ok(self.query_fund_employees(parent_id, min_score, limit).await?) })
	}
}

impl CandidateStore for PgCompanyStore {
	fn query_pool_a<'a>(
		&'a self,
		keywords: &'a [String],
		min_score: f32,
		limit: u32,
	) -> BoxFuture<'a, Result<Vec<CandidateRecord>>> {
		Box::pin(async move { Ok(self.query_general(keywords, min_score, limit).await?) })
	}

	fn query_pool_b<'a>(
		&'a self,
		keywords: &'a [String],
		limit: u32,
	) -> BoxFuture<'a, Result<Vec<CandidateRecord>>> {
		Box::pin(async move { Ok(self.query_specific(keywords, limit).await?) })
	}

	// Providers have no child records.
	fn query_pool_b_children<'a>(
		&'a self,
		_parent_id: &'a str,
		_min_score: f32,
		_limit: u32,
	) -> BoxFuture<'a, Result<Vec<CandidateRecord>>> {
		Box::pin(async { Ok(Vec::new()) })
	}
}
