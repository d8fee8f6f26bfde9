pub mod classify;
pub mod delivery;
pub mod librarian;
pub mod reply;
pub mod search;
pub mod time_serde;
pub mod turn;

mod error;
mod stores;

use std::{future::Future, pin::Pin, sync::Arc};

pub use classify::Classification;
pub use delivery::{DeliveryEvent, EventKind, EventSink, FanOut, Subscription};
pub use error::{Error, Result};
pub use librarian::ProfileUpdate;
pub use search::{
	Pool, RankedResponse, RankedResult, SearchRequest, SearchStatus, SearchTarget,
};
pub use turn::{TurnRequest, TurnResponse};

use scout_config::{Config, LlmProviderConfig};
use scout_domain::{
	candidate::CandidateRecord, conversation::ConversationState, language::Language,
	profile::ProjectProfile,
};
use scout_storage::{
	candidates::{PgCompanyStore, PgInvestorStore},
	db::Db,
	profiles::PgProfileStore,
};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Free-text completion backend shared by the classifier, the librarian and the mentor reply.
pub trait TextOracle
where
	Self: Send + Sync,
{
	fn complete<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		prompt: &'a str,
	) -> BoxFuture<'a, Result<String>>;
}

pub trait ProfileStore
where
	Self: Send + Sync,
{
	fn load_profile<'a>(
		&'a self,
		conversation_id: &'a str,
	) -> BoxFuture<'a, Result<Option<ProjectProfile>>>;

	fn save_profile<'a>(
		&'a self,
		conversation_id: &'a str,
		profile: &'a ProjectProfile,
	) -> BoxFuture<'a, Result<()>>;

	fn load_state<'a>(
		&'a self,
		conversation_id: &'a str,
	) -> BoxFuture<'a, Result<Option<ConversationState>>>;

	fn save_state<'a>(&'a self, state: &'a ConversationState) -> BoxFuture<'a, Result<()>>;
}

/// Two-pool candidate source. Pool B records may own children that boost their score.
pub trait CandidateStore
where
	Self: Send + Sync,
{
	fn query_pool_a<'a>(
		&'a self,
		keywords: &'a [String],
		min_score: f32,
		limit: u32,
	) -> BoxFuture<'a, Result<Vec<CandidateRecord>>>;

	fn query_pool_b<'a>(
		&'a self,
		keywords: &'a [String],
		limit: u32,
	) -> BoxFuture<'a, Result<Vec<CandidateRecord>>>;

	fn query_pool_b_children<'a>(
		&'a self,
		parent_id: &'a str,
		min_score: f32,
		limit: u32,
	) -> BoxFuture<'a, Result<Vec<CandidateRecord>>>;
}

#[derive(Clone)]
pub struct Providers {
	pub oracle: Arc<dyn TextOracle>,
}
impl Providers {
	pub fn new(oracle: Arc<dyn TextOracle>) -> Self {
		Self { oracle }
	}
}
impl Default for Providers {
	fn default() -> Self {
		Self { oracle: Arc::new(DefaultProviders) }
	}
}

#[derive(Clone)]
pub struct Stores {
	pub profiles: Arc<dyn ProfileStore>,
	pub investors: Arc<dyn CandidateStore>,
	pub companies: Arc<dyn CandidateStore>,
}
impl Stores {
	pub fn new(
		profiles: Arc<dyn ProfileStore>,
		investors: Arc<dyn CandidateStore>,
		companies: Arc<dyn CandidateStore>,
	) -> Self {
		Self { profiles, investors, companies }
	}

	pub fn postgres(db: Db) -> Self {
		Self {
			profiles: Arc::new(PgProfileStore::new(db.clone())),
			investors: Arc::new(PgInvestorStore::new(db.clone())),
			companies: Arc::new(PgCompanyStore::new(db)),
		}
	}

	pub fn for_target(&self, target: SearchTarget) -> &dyn CandidateStore {
		match target {
			SearchTarget::Investors => self.investors.as_ref(),
			SearchTarget::Companies => self.companies.as_ref(),
		}
	}
}

pub struct Scout {
	pub cfg: Config,
	pub providers: Providers,
	pub stores: Stores,
	pub delivery: FanOut,
}
impl Scout {
	pub fn new(cfg: Config, stores: Stores) -> Self {
		Self::with_providers(cfg, stores, Providers::default())
	}

	pub fn with_providers(cfg: Config, stores: Stores, providers: Providers) -> Self {
		let delivery = FanOut::new(cfg.delivery.replay_capacity as usize);

		Self { cfg, providers, stores, delivery }
	}

	pub fn default_language(&self) -> Language {
		Language::from_config(&self.cfg.conversation.default_language)
	}
}

struct DefaultProviders;

impl TextOracle for DefaultProviders {
	fn complete<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		prompt: &'a str,
	) -> BoxFuture<'a, Result<String>> {
		Box::pin(async move {
			Ok(scout_providers::completion::complete_prompt(cfg, prompt).await?)
		})
	}
}
