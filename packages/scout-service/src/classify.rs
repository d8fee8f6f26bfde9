use serde::Serialize;

use scout_domain::{
	conversation::{ConversationState, Intent},
	language::Language,
	profile::{ExtractionResult, Funding, ProjectProfile},
};

use crate::{Error, Result, Scout};

const DEFAULT_CONFIDENCE: f32 = 0.5;
const EMPTY_VALUES: &[&str] =
	&["", "-", "none", "n/a", "na", "null", "unknown", "ninguno", "ninguna"];

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Classification {
	pub intent: Intent,
	pub confidence: f32,
	pub extraction: ExtractionResult,
	pub reasoning: String,
	/// True when the oracle failed or answered with nothing parsable.
	pub fallback: bool,
}
impl Classification {
	pub fn fallback(cause: &Error) -> Self {
		Self {
			intent: Intent::GeneralConversation,
			confidence: DEFAULT_CONFIDENCE,
			extraction: ExtractionResult::default(),
			reasoning: format!("Fallback classification: {cause}"),
			fallback: true,
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Label {
	Intent,
	Confidence,
	Reasoning,
	Categories,
	Stage,
	Keywords,
	Problem,
	Solution,
	Market,
	BusinessModel,
	FundingTarget,
}
impl Label {
	fn parse(raw: &str) -> Option<Self> {
		let normalized = raw.trim().to_ascii_uppercase().replace([' ', '-'], "_");

		Some(match normalized.as_str() {
			"INTENT" => Self::Intent,
			"CONFIDENCE" => Self::Confidence,
			"REASONING" | "REASON" => Self::Reasoning,
			"CATEGORIES" | "CATEGORY" => Self::Categories,
			"STAGE" => Self::Stage,
			"KEYWORDS" => Self::Keywords,
			"PROBLEM" => Self::Problem,
			"SOLUTION" => Self::Solution,
			"MARKET" | "TARGET_MARKET" => Self::Market,
			"BUSINESS_MODEL" => Self::BusinessModel,
			"FUNDING_TARGET" => Self::FundingTarget,
			_ => return None,
		})
	}
}

impl Scout {
	/// Classifies one message. Oracle failures and unparsable answers degrade to the safe default.
	pub async fn classify(
		&self,
		message: &str,
		state: &mut ConversationState,
		profile: &ProjectProfile,
	) -> Result<Classification> {
		if message.trim().is_empty() {
			return Err(Error::InvalidInput { message: "Message must be non-empty.".to_string() });
		}

		let language = state.language.unwrap_or_else(|| self.default_language());
		let prompt = build_prompt(message, state, profile, language);
		let outcome = match self.providers.oracle.complete(&self.cfg.providers.llm, &prompt).await {
			Ok(raw) => parse_classification(&raw),
			Err(err) => Err(err),
		};
		let classification = match outcome {
			Ok(classification) => classification,
			Err(err) => {
				tracing::warn!(
					error = %err,
					conversation_id = %state.conversation_id,
					"Classifier degraded to fallback."
				);

				Classification::fallback(&err)
			},
		};

		state.message_count += 1;
		state.last_intent = Some(classification.intent);

		tracing::info!(
			conversation_id = %state.conversation_id,
			intent = %classification.intent,
			confidence = classification.confidence,
			fallback = classification.fallback,
			"Message classified."
		);

		Ok(classification)
	}
}

pub fn build_prompt(
	message: &str,
	state: &ConversationState,
	profile: &ProjectProfile,
	language: Language,
) -> String {
	let last_intent = state.last_intent.map(Intent::as_str).unwrap_or("none");
	let categories = if profile.categories.is_empty() {
		"none".to_string()
	} else {
		profile.categories.join(", ")
	};
	let stage = if profile.stage().is_empty() { "unknown" } else { profile.stage() };

	format!(
		"\
You route messages from startup founders talking to a mentor assistant.

Conversation context:
- Previous intent: {last_intent}
- Messages so far: {count}
- Founder language: {language}
- Project categories: {categories}
- Project stage: {stage}
- Profile completeness: {completeness:.0}%

Classify the founder message into exactly one intent:
- search_investors: wants investors, funds, or funding contacts.
- search_companies: wants service providers (marketing, development, legal, accounting, and so on).
- welcome: greets or starts the conversation.
- improve_profile: asks how to improve the project or pitch before searching.
- general_conversation: anything else.

Also extract any project facts the message states. Leave a label out when the message says nothing about it.

Answer with labeled lines only:
INTENT: <intent>
CONFIDENCE: <number between 0 and 1>
REASONING: <one sentence>
CATEGORIES: <comma separated>
STAGE: <stage>
KEYWORDS: <comma separated search keywords>
PROBLEM: <problem solved>
SOLUTION: <solution>
MARKET: <target market>
BUSINESS_MODEL: <business model>
FUNDING_TARGET: <amount sought>

Founder message:
\"\"\"{message}\"\"\"",
		count = state.message_count,
		language = language.as_str(),
		completeness = profile.completeness(),
		message = message.trim(),
	)
}

/// Parses labeled oracle lines. Fails only when no known label is present.
pub fn parse_classification(raw: &str) -> Result<Classification> {
	let mut recognized = 0;
	let mut intent = Intent::GeneralConversation;
	let mut confidence = DEFAULT_CONFIDENCE;
	let mut reasoning = String::new();
	let mut extraction = ExtractionResult::default();

	for line in raw.lines() {
		let Some((label, value)) = split_labeled_line(line) else {
			continue;
		};

		recognized += 1;

		let Some(value) = clean_value(&value) else {
			continue;
		};

		match label {
			Label::Intent => intent = Intent::from_label(&value),
			Label::Confidence => confidence = parse_confidence(&value),
			Label::Reasoning => reasoning = value,
			Label::Categories => extraction.categories = split_list(&value),
			Label::Stage => extraction.stage = Some(value),
			Label::Keywords => extraction.keywords = split_list(&value),
			Label::Problem => extraction.problem = Some(value),
			Label::Solution => extraction.solution = Some(value),
			Label::Market => extraction.target_market = Some(value),
			Label::BusinessModel => extraction.business_model = Some(value),
			Label::FundingTarget =>
				extraction.funding =
					Some(Funding { target_amount: Some(value), ..Default::default() }),
		}
	}

	if recognized == 0 {
		return Err(Error::OracleParse {
			message: "Classifier response has no recognized labels.".to_string(),
		});
	}

	Ok(Classification { intent, confidence, extraction, reasoning, fallback: false })
}

fn split_labeled_line(line: &str) -> Option<(Label, String)> {
	let stripped = strip_decorations(line);
	let (label, value) = stripped.split_once(':')?;
	let label =
		Label::parse(label.trim_matches(|c: char| c == '*' || c == '_' || c.is_whitespace()))?;

	Some((label, value.to_string()))
}

fn strip_decorations(line: &str) -> String {
	let mut trimmed = line.trim();

	for prefix in ["- ", "* ", "• ", "> ", "#"] {
		if let Some(rest) = trimmed.strip_prefix(prefix) {
			trimmed = rest.trim_start_matches('#').trim();
		}
	}

	let without_number = trimmed
		.split_once(". ")
		.filter(|(head, _)| !head.is_empty() && head.chars().all(|c| c.is_ascii_digit()))
		.map(|(_, rest)| rest)
		.unwrap_or(trimmed);

	without_number.replace("**", "").replace("__", "")
}

fn clean_value(raw: &str) -> Option<String> {
	let trimmed = raw.trim().trim_matches(|c: char| c == '*' || c == '`').trim();
	let unquoted = trimmed
		.strip_prefix('"')
		.and_then(|v| v.strip_suffix('"'))
		.or_else(|| trimmed.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
		.unwrap_or(trimmed)
		.trim();

	if EMPTY_VALUES.contains(&unquoted.to_lowercase().as_str()) {
		return None;
	}

	Some(unquoted.to_string())
}

fn parse_confidence(raw: &str) -> f32 {
	let trimmed = raw.trim();
	let (number, percent) = match trimmed.strip_suffix('%') {
		Some(rest) => (rest.trim(), true),
		None => (trimmed, false),
	};
	let Ok(value) = number.parse::<f32>() else {
		return DEFAULT_CONFIDENCE;
	};

	if !value.is_finite() {
		return DEFAULT_CONFIDENCE;
	}

	let value = if percent { value / 100.0 } else { value };

	value.clamp(0.0, 1.0)
}

fn split_list(raw: &str) -> Vec<String> {
	raw.trim_start_matches('[')
		.trim_end_matches(']')
		.split([',', ';'])
		.filter_map(clean_value)
		.collect()
}
