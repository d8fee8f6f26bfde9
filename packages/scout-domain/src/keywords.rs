use regex::Regex;

use crate::profile::{ProjectProfile, dedupe_key};

pub const COMPANY_FALLBACK_KEYWORDS: &[&str] = &["business services", "consulting"];

struct ServiceGroup {
	triggers: &'static [&'static str],
	expansions: &'static [&'static str],
}

const SERVICE_GROUPS: &[ServiceGroup] = &[
	ServiceGroup {
		triggers: &["marketing", "publicidad", "seo", "sem", "social media"],
		expansions: &["digital marketing", "content marketing"],
	},
	ServiceGroup {
		triggers: &["desarrollo", "software", "app", "web", "programación", "programacion"],
		expansions: &["app development", "tech"],
	},
	ServiceGroup {
		triggers: &["diseño", "diseno", "branding", "ui", "ux", "gráfico", "grafico"],
		expansions: &["graphic design", "ui/ux"],
	},
	ServiceGroup {
		triggers: &["legal", "abogado", "abogados", "asesoría", "asesoria", "compliance"],
		expansions: &["legal services", "asesoría legal"],
	},
	ServiceGroup {
		triggers: &["contabilidad", "finanzas", "accounting"],
		expansions: &["financial services"],
	},
	ServiceGroup {
		triggers: &["recursos humanos", "hr", "recruitment"],
		expansions: &["human resources"],
	},
];

/// Trims, drops blanks, de-duplicates case-insensitively (first spelling wins), and caps the list.
pub fn normalize_keywords<I, S>(keywords: I, max: usize) -> Vec<String>
where
	I: IntoIterator<Item = S>,
	S: AsRef<str>,
{
	let mut seen = Vec::new();
	let mut out = Vec::new();

	for keyword in keywords {
		if out.len() >= max {
			break;
		}

		let trimmed = keyword.as_ref().trim();

		if trimmed.is_empty() {
			continue;
		}

		let key = dedupe_key(trimmed);

		if seen.contains(&key) {
			continue;
		}

		seen.push(key);
		out.push(trimmed.to_string());
	}

	out
}

/// Investor search terms: classifier suggestions, then profile categories, then the stage.
pub fn investor_keywords(suggested: &[String], profile: &ProjectProfile, max: usize) -> Vec<String> {
	let stage = profile.stage().to_string();
	let all = suggested.iter().chain(profile.categories.iter()).chain(std::iter::once(&stage));

	normalize_keywords(all, max)
}

/// Service terms mentioned in a message, expanded with related phrasing for each matched service.
pub fn service_keywords(message: &str) -> Vec<String> {
	let mut found = Vec::new();

	for group in SERVICE_GROUPS {
		let matched: Vec<&str> =
			group.triggers.iter().copied().filter(|term| mentions(message, term)).collect();

		if matched.is_empty() {
			continue;
		}

		found.extend(matched.into_iter().map(str::to_string));
		found.extend(group.expansions.iter().map(|term| term.to_string()));
	}

	found
}

/// Company search terms. Falls back to generic service phrasing when nothing matched.
pub fn company_keywords(message: &str, suggested: &[String], max: usize) -> Vec<String> {
	let detected = service_keywords(message);
	let keywords = normalize_keywords(detected.iter().chain(suggested.iter()), max);

	if keywords.is_empty() {
		return COMPANY_FALLBACK_KEYWORDS.iter().map(|kw| kw.to_string()).collect();
	}

	keywords
}

fn mentions(message: &str, term: &str) -> bool {
	let pattern = format!(r"(?i)\b{}\b", regex::escape(term));

	Regex::new(&pattern).map(|re| re.is_match(message)).unwrap_or(false)
}
