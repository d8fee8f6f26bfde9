use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;
use whatlang::Lang;

const SPANISH_HINTS: &[&str] = &[
	"qué", "que", "cómo", "como", "dónde", "cuándo", "sí", "gracias", "hola", "necesito",
	"quiero", "busco", "ayuda", "empresa", "inversores", "para", "mi", "una", "tengo",
];
const ENGLISH_HINTS: &[&str] = &[
	"what", "how", "where", "when", "why", "yes", "thanks", "hello", "need", "want", "looking",
	"help", "company", "investors", "for", "my", "the", "have",
];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
	#[default]
	Spanish,
	English,
}
impl Language {
	pub fn from_config(value: &str) -> Self {
		match value {
			"english" => Self::English,
			_ => Self::Spanish,
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Spanish => "spanish",
			Self::English => "english",
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct LanguageDetection {
	pub language: Language,
	pub confidence: f32,
	/// Both Spanish and English hint words were present.
	pub mixed: bool,
}

/// Picks the reply language for a message: Spanish or English, else `fallback`.
pub fn detect_language(text: &str, fallback: Language) -> LanguageDetection {
	let lowered = text.to_lowercase();
	let words: Vec<&str> = lowered.unicode_words().collect();
	let spanish = words.iter().filter(|word| SPANISH_HINTS.contains(*word)).count();
	let english = words.iter().filter(|word| ENGLISH_HINTS.contains(*word)).count();
	let mixed = spanish > 0 && english > 0;

	if let Some(info) = whatlang::detect(text).filter(|info| info.is_reliable()) {
		match info.lang() {
			Lang::Spa =>
				return LanguageDetection {
					language: Language::Spanish,
					confidence: info.confidence() as f32,
					mixed,
				},
			Lang::Eng =>
				return LanguageDetection {
					language: Language::English,
					confidence: info.confidence() as f32,
					mixed,
				},
			_ => {},
		}
	}

	let (language, hits) = match spanish.cmp(&english) {
		std::cmp::Ordering::Greater => (Language::Spanish, spanish),
		std::cmp::Ordering::Less => (Language::English, english),
		std::cmp::Ordering::Equal =>
			return LanguageDetection { language: fallback, confidence: 0.5, mixed },
	};

	LanguageDetection { language, confidence: (0.7 + hits as f32 * 0.1).min(1.0), mixed }
}
