use sqlx::types::Json;

use scout_domain::{conversation::ConversationState, profile::ProjectProfile};

use crate::{Result, db::Db};

/// Profiles and conversation state, one row each per conversation.
#[derive(Clone)]
pub struct PgProfileStore {
	db: Db,
}
impl PgProfileStore {
	pub fn new(db: Db) -> Self {
		Self { db }
	}

	pub async fn load_profile(&self, conversation_id: &str) -> Result<Option<ProjectProfile>> {
		let row: Option<(Json<ProjectProfile>,)> =
			sqlx::query_as("SELECT profile FROM project_profiles WHERE conversation_id = $1")
				.bind(conversation_id)
				.fetch_optional(&self.db.pool)
				.await?;

		Ok(row.map(|(Json(profile),)| profile))
	}

	pub async fn save_profile(&self, conversation_id: &str, profile: &ProjectProfile) -> Result<()> {
		sqlx::query(
			"\
INSERT INTO project_profiles (conversation_id, profile, completeness, updated_at)
VALUES ($1, $2, $3, now())
ON CONFLICT (conversation_id) DO UPDATE
SET profile = EXCLUDED.profile,
	completeness = EXCLUDED.completeness,
	updated_at = EXCLUDED.updated_at",
		)
		.bind(conversation_id)
		.bind(Json(profile))
		.bind(profile.completeness())
		.execute(&self.db.pool)
		.await?;

		Ok(())
	}

	pub async fn load_state(&self, conversation_id: &str) -> Result<Option<ConversationState>> {
		let row: Option<(Json<ConversationState>,)> =
			sqlx::query_as("SELECT state FROM conversation_states WHERE conversation_id = $1")
				.bind(conversation_id)
				.fetch_optional(&self.db.pool)
				.await?;

		Ok(row.map(|(Json(state),)| state))
	}

	pub async fn save_state(&self, state: &ConversationState) -> Result<()> {
		if state.conversation_id.trim().is_empty() {
			return Err(crate::Error::MissingConversationId { kind: "Conversation state" });
		}

		sqlx::query(
			"\
INSERT INTO conversation_states (conversation_id, state, updated_at)
VALUES ($1, $2, now())
ON CONFLICT (conversation_id) DO UPDATE
SET state = EXCLUDED.state,
	updated_at = EXCLUDED.updated_at",
		)
		.bind(state.conversation_id.as_str())
		.bind(Json(state))
		.execute(&self.db.pool)
		.await?;

		Ok(())
	}
}
