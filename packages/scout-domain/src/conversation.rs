use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{language::Language, profile::union_into};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
	#[default]
	GeneralConversation,
	SearchInvestors,
	SearchCompanies,
	Welcome,
	ImproveProfile,
}
impl Intent {
	pub const ALL: [Intent; 5] = [
		Self::GeneralConversation,
		Self::SearchInvestors,
		Self::SearchCompanies,
		Self::Welcome,
		Self::ImproveProfile,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::GeneralConversation => "general_conversation",
			Self::SearchInvestors => "search_investors",
			Self::SearchCompanies => "search_companies",
			Self::Welcome => "welcome",
			Self::ImproveProfile => "improve_profile",
		}
	}

	/// Lenient label lookup. Unknown labels map to general conversation.
	pub fn from_label(label: &str) -> Self {
		let normalized = label.trim().to_ascii_lowercase().replace(['-', ' '], "_");

		Self::ALL
			.into_iter()
			.find(|intent| intent.as_str() == normalized)
			.unwrap_or(Self::GeneralConversation)
	}
}
impl fmt::Display for Intent {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Per-conversation bookkeeping, created on the first message and updated after every turn.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationState {
	pub conversation_id: String,
	pub message_count: u32,
	pub last_intent: Option<Intent>,
	pub extracted_fields: Vec<String>,
	pub completeness: f32,
	pub stage: Option<String>,
	pub primary_category: Option<String>,
	pub language: Option<Language>,
}
impl ConversationState {
	pub fn new(conversation_id: impl Into<String>) -> Self {
		Self { conversation_id: conversation_id.into(), ..Default::default() }
	}

	pub fn record_fields(&mut self, fields: &[&str]) {
		let fields: Vec<String> = fields.iter().map(|field| field.to_string()).collect();

		union_into(&mut self.extracted_fields, &fields);
	}
}
