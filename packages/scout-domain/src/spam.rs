use std::collections::HashSet;

use serde::Serialize;

const BUSINESS_VOCABULARY: &[&str] = &[
	"startup",
	"business",
	"investor",
	"funding",
	"company",
	"revenue",
	"empresa",
	"negocio",
	"inversor",
	"financiación",
	"financiacion",
	"ingresos",
];
const REPEATED_CONTENT_MIN_CHARS: usize = 100;
const REPEATED_CONTENT_MAX_UNIQUE_WORDS: usize = 10;
const EXCESSIVE_LENGTH_CHARS: usize = 2_000;
const NONSENSE_MIN_WORDS: usize = 20;
const NONSENSE_MAX_SPACE_RATIO: f32 = 0.1;
const OFF_TOPIC_MIN_CHARS: usize = 50;
const STRICT_SCORE: f32 = 50.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SpamIndicators {
	pub repeated_content: bool,
	pub excessive_length: bool,
	pub nonsensical_text: bool,
	pub off_topic: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpamTone {
	Normal,
	Warning,
	Strict,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SpamVerdict {
	pub is_spam: bool,
	pub score: f32,
	pub indicators: SpamIndicators,
	pub tone: SpamTone,
}

pub fn screen(text: &str, threshold: f32) -> SpamVerdict {
	let chars = text.chars().count();
	let lowered = text.to_lowercase();
	let words: Vec<&str> = lowered.split_whitespace().collect();
	let mut indicators = SpamIndicators::default();
	let mut score = 0.0;

	if chars > REPEATED_CONTENT_MIN_CHARS {
		let unique: HashSet<&str> = words.iter().copied().collect();

		if unique.len() < REPEATED_CONTENT_MAX_UNIQUE_WORDS {
			indicators.repeated_content = true;
			score += 20.0;
		}
	}
	if chars > EXCESSIVE_LENGTH_CHARS {
		indicators.excessive_length = true;
		score += 15.0;
	}
	if words.len() > NONSENSE_MIN_WORDS && chars > 0 {
		let spaces = text.chars().filter(|ch| *ch == ' ').count();

		if (spaces as f32 / chars as f32) < NONSENSE_MAX_SPACE_RATIO {
			indicators.nonsensical_text = true;
			score += 25.0;
		}
	}
	if chars > OFF_TOPIC_MIN_CHARS && !BUSINESS_VOCABULARY.iter().any(|kw| lowered.contains(kw)) {
		indicators.off_topic = true;
		score += 10.0;
	}

	let is_spam = score >= threshold;
	let tone = match (is_spam, score < STRICT_SCORE) {
		(false, _) => SpamTone::Normal,
		(true, true) => SpamTone::Warning,
		(true, false) => SpamTone::Strict,
	};

	SpamVerdict { is_spam, score, indicators, tone }
}
