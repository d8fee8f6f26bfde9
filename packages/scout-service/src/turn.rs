use serde::{Deserialize, Serialize};
use serde_json::Value;

use scout_domain::{
	conversation::{ConversationState, Intent},
	eligibility::Eligibility,
	keywords,
	language::{self, Language},
	profile::{self, ProjectProfile},
	spam::{self, SpamVerdict},
};

use crate::{
	Error, Result, Scout,
	delivery::{DeliveryEvent, EventKind},
	reply,
	search::{RankedResponse, SearchRequest, SearchTarget},
};

#[derive(Clone, Debug, Deserialize)]
pub struct TurnRequest {
	pub conversation_id: String,
	pub message: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct TurnResponse {
	pub conversation_id: String,
	pub reply: String,
	/// Absent when the message was screened out as spam.
	pub intent: Option<Intent>,
	pub confidence: Option<f32>,
	pub language: Language,
	pub spam: SpamVerdict,
	pub search: Option<RankedResponse>,
	pub eligibility: Eligibility,
	pub completeness: f32,
	pub profile: ProjectProfile,
	pub message_count: u32,
}

impl Scout {
	/// Runs one founder message through screening, classification, routing and profile upkeep.
	/// Only invalid input and store failures are returned as errors.
	pub async fn handle_turn(&self, req: TurnRequest) -> Result<TurnResponse> {
		let conversation_id = req.conversation_id.trim();
		let message = req.message.trim();

		if conversation_id.is_empty() {
			return Err(Error::InvalidInput {
				message: "conversation_id must be non-empty.".to_string(),
			});
		}
		if message.is_empty() {
			return Err(Error::InvalidInput { message: "Message must be non-empty.".to_string() });
		}

		let max_chars = self.cfg.conversation.max_message_chars as usize;

		if message.chars().count() > max_chars {
			return Err(Error::InvalidInput {
				message: format!("Message must be at most {max_chars} characters."),
			});
		}

		let profiles = self.stores.profiles.as_ref();
		let mut profile = profiles.load_profile(conversation_id).await?.unwrap_or_default();
		let mut state = profiles
			.load_state(conversation_id)
			.await?
			.unwrap_or_else(|| ConversationState::new(conversation_id));
		let fallback = state.language.unwrap_or_else(|| self.default_language());
		let detection = language::detect_language(message, fallback);
		let language = detection.language;

		state.language = Some(language);

		let verdict = spam::screen(message, self.cfg.conversation.spam_score_threshold);

		if verdict.is_spam {
			return self.finish_spam(conversation_id, profile, state, verdict, language).await;
		}

		let classification = self.classify(message, &mut state, &profile).await?;

		self.publish(
			conversation_id,
			EventKind::JudgeDecision,
			serde_json::json!({
				"intent": classification.intent,
				"confidence": classification.confidence,
				"reasoning": classification.reasoning,
				"fallback": classification.fallback,
			}),
		)
		.await;

		let (merged, _) = profile::merge(&profile, &classification.extraction);

		profile = merged;

		state.record_fields(&profile::extracted_fields(&classification.extraction));

		let search_cfg = &self.cfg.search;
		let max_keywords = search_cfg.max_keywords as usize;
		let mut intent = classification.intent;
		let mut search = None;
		let reply = match classification.intent {
			Intent::SearchInvestors => {
				let eligibility = self.can_search(&profile);

				if eligibility.allowed {
					let response = self
						.search(SearchRequest {
							target: SearchTarget::Investors,
							keywords: keywords::investor_keywords(
								&classification.extraction.keywords,
								&profile,
								max_keywords,
							),
							stage: profile.stage().to_string(),
							..Default::default()
						})
						.await;
					let text = reply::search_reply(&response, language);

					search = Some(response);

					text
				} else {
					tracing::info!(
						conversation_id,
						reason = %eligibility.reason,
						"Investor search refused."
					);

					intent = Intent::ImproveProfile;

					reply::refusal_reply(&eligibility, language)
				}
			},
			Intent::SearchCompanies => {
				let response = self
					.search(SearchRequest {
						target: SearchTarget::Companies,
						keywords: keywords::company_keywords(
							message,
							&classification.extraction.keywords,
							max_keywords,
						),
						..Default::default()
					})
					.await;
				let text = reply::search_reply(&response, language);

				search = Some(response);

				text
			},
			Intent::Welcome => reply::welcome_text(language).to_string(),
			Intent::GeneralConversation | Intent::ImproveProfile =>
				self.mentor_reply(message, &profile, language).await,
		};

		if let Some(response) = &search {
			self.publish(conversation_id, EventKind::SearchResults, to_payload(response)).await;
		}

		let update = self.update_profile(&profile, message, &reply).await;
		let fields: Vec<&str> = update.fields.iter().map(String::as_str).collect();

		state.record_fields(&fields);

		profile = update.profile;

		let completeness = profile.completeness();

		state.completeness = completeness;
		state.stage = profile.stage.clone().filter(|stage| !stage.trim().is_empty());
		state.primary_category = profile.primary_category().map(str::to_string);

		profiles.save_profile(conversation_id, &profile).await?;
		profiles.save_state(&state).await?;

		self.publish(
			conversation_id,
			EventKind::AiResponse,
			serde_json::json!({ "reply": reply, "intent": intent, "language": language }),
		)
		.await;
		self.publish(
			conversation_id,
			EventKind::ProfileUpdate,
			serde_json::json!({
				"profile": profile,
				"completeness": completeness,
				"fields": update.fields,
			}),
		)
		.await;

		tracing::info!(
			conversation_id,
			intent = %intent,
			message_count = state.message_count,
			completeness,
			searched = search.is_some(),
			"Turn completed."
		);

		Ok(TurnResponse {
			conversation_id: conversation_id.to_string(),
			reply,
			intent: Some(intent),
			confidence: Some(classification.confidence),
			language,
			spam: verdict,
			search,
			eligibility: self.can_search(&profile),
			completeness,
			profile,
			message_count: state.message_count,
		})
	}

	async fn finish_spam(
		&self,
		conversation_id: &str,
		profile: ProjectProfile,
		mut state: ConversationState,
		verdict: SpamVerdict,
		language: Language,
	) -> Result<TurnResponse> {
		let reply = reply::spam_reply(&verdict, language).to_string();

		state.message_count += 1;

		self.stores.profiles.save_state(&state).await?;

		tracing::warn!(
			conversation_id,
			score = verdict.score,
			tone = ?verdict.tone,
			"Message screened as spam."
		);

		self.publish(
			conversation_id,
			EventKind::AiResponse,
			serde_json::json!({ "reply": reply, "spam": verdict, "language": language }),
		)
		.await;

		Ok(TurnResponse {
			conversation_id: conversation_id.to_string(),
			reply,
			intent: None,
			confidence: None,
			language,
			spam: verdict,
			search: None,
			eligibility: self.can_search(&profile),
			completeness: profile.completeness(),
			profile,
			message_count: state.message_count,
		})
	}

	async fn publish(&self, conversation_id: &str, kind: EventKind, payload: Value) {
		let event = DeliveryEvent::new(kind, conversation_id, payload);
		let outcome = self.delivery.publish(event).await;

		tracing::debug!(
			conversation_id,
			kind = ?kind,
			delivered = outcome.delivered,
			dropped = outcome.dropped,
			queued = outcome.queued,
			"Event published."
		);
	}
}

fn to_payload<T>(value: &T) -> Value
where
	T: Serialize,
{
	match serde_json::to_value(value) {
		Ok(value) => value,
		Err(err) => {
			tracing::warn!(error = %err, "Failed to serialize event payload.");

			Value::Null
		},
	}
}
