use std::{
	collections::HashMap,
	sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError},
};

use tokio::sync::{Mutex, OwnedMutexGuard};

use scout_service::{Scout, Stores};
use scout_storage::db::Db;

#[derive(Clone)]
pub struct AppState {
	pub scout: Arc<Scout>,
	turns: Arc<TurnLocks>,
}
impl AppState {
	pub async fn new(config: scout_config::Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema().await?;

		Ok(Self::from_scout(Scout::new(config, Stores::postgres(db))))
	}

	pub fn from_scout(scout: Scout) -> Self {
		Self { scout: Arc::new(scout), turns: Arc::new(TurnLocks::default()) }
	}

	/// Holds the conversation's turn lock until the guard drops. Ids are keyed after trimming, the
	/// same way the turn pipeline stores them.
	pub async fn lock_turn(&self, conversation_id: &str) -> TurnGuard {
		let key = conversation_id.trim().to_string();
		let lock = self.turns.acquire(&key);
		let guard = lock.lock_owned().await;

		TurnGuard { key, locks: self.turns.clone(), guard: Some(guard) }
	}

	/// Conversations that currently have a turn running or waiting.
	pub fn busy_conversations(&self) -> usize {
		self.turns.map().len()
	}
}

/// Releases the turn lock on drop and forgets the conversation once nobody is waiting on it.
pub struct TurnGuard {
	key: String,
	locks: Arc<TurnLocks>,
	guard: Option<OwnedMutexGuard<()>>,
}
impl Drop for TurnGuard {
	fn drop(&mut self) {
		self.guard.take();
		self.locks.release(&self.key);
	}
}

/// One async lock per conversation so turns for the same conversation run one at a time.
#[derive(Default)]
struct TurnLocks {
	locks: StdMutex<HashMap<String, Arc<Mutex<()>>>>,
}
impl TurnLocks {
	fn acquire(&self, key: &str) -> Arc<Mutex<()>> {
		self.map().entry(key.to_string()).or_default().clone()
	}

	// Clones are only handed out under the map lock, so a count of one means no holder or waiter.
	fn release(&self, key: &str) {
		let mut locks = self.map();

		if locks.get(key).is_some_and(|lock| Arc::strong_count(lock) == 1) {
			locks.remove(key);
		}
	}

	fn map(&self) -> MutexGuard<'_, HashMap<String, Arc<Mutex<()>>>> {
		self.locks.lock().unwrap_or_else(PoisonError::into_inner)
	}
}
