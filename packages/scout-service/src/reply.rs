use scout_domain::{
	eligibility::{Eligibility, EligibilityGap},
	language::Language,
	profile::ProjectProfile,
	spam::{SpamTone, SpamVerdict},
};

use crate::{
	Scout,
	search::{RankedResponse, SearchTarget},
};

const MENTOR_FALLBACK_ES: &str = "Como mentor de Y-Combinator te diría: Enfócate en hacer algo que la gente quiera. Habla con tus usuarios, valida tu idea rápidamente y lanza tu MVP lo antes posible.";
const MENTOR_FALLBACK_EN: &str = "As a Y-Combinator mentor I'd tell you: Focus on making something people want. Talk to your users, validate your idea quickly and launch your MVP as soon as possible.";

impl Scout {
	/// Mentor answer from the oracle. Falls back to a fixed text when the oracle is unavailable.
	pub async fn mentor_reply(
		&self,
		message: &str,
		profile: &ProjectProfile,
		language: Language,
	) -> String {
		let prompt = mentor_prompt(message, profile, language);

		match self.providers.oracle.complete(&self.cfg.providers.llm, &prompt).await {
			Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
			Ok(_) => {
				tracing::warn!("Mentor reply was empty. Using fallback text.");

				mentor_fallback(language).to_string()
			},
			Err(err) => {
				tracing::warn!(error = %err, "Mentor reply failed. Using fallback text.");

				mentor_fallback(language).to_string()
			},
		}
	}
}

pub fn mentor_fallback(language: Language) -> &'static str {
	match language {
		Language::Spanish => MENTOR_FALLBACK_ES,
		Language::English => MENTOR_FALLBACK_EN,
	}
}

pub fn mentor_prompt(message: &str, profile: &ProjectProfile, language: Language) -> String {
	let stage = if profile.stage().is_empty() { "unknown" } else { profile.stage() };
	let category = profile.primary_category().unwrap_or("unknown");
	let answer_in = match language {
		Language::Spanish => "Answer in Spanish.",
		Language::English => "Answer in English.",
	};

	format!(
		"\
You are a Y-Combinator style startup mentor. Your answers are direct and actionable, at most 3-4 \
sentences, focused on execution and on the metrics that matter (ARR, MRR, growth). No theory.

Principles:
1. Make something people want.
2. Talk to your users.
3. Launch fast, iterate fast.
4. Traction beats ideas.
5. Problem-solution fit comes before product-market fit.

Founder context: stage {stage}, sector {category}, profile completeness {completeness:.0}%.

{answer_in} Focus on what the founder should do next.

Founder message:
\"\"\"{message}\"\"\"",
		completeness = profile.completeness(),
		message = message.trim(),
	)
}

pub fn spam_reply(verdict: &SpamVerdict, language: Language) -> &'static str {
	match (language, verdict.tone) {
		(Language::Spanish, SpamTone::Strict) =>
			"No puedo ayudarte con ese tipo de contenido. Enfoquémonos en tu startup.",
		(Language::Spanish, _) =>
			"Por favor, mantén tus mensajes relacionados con startups y emprendimiento. Estoy aquí para ayudarte con tu negocio.",
		(Language::English, SpamTone::Strict) =>
			"I can't help you with that type of content. Let's focus on your startup.",
		(Language::English, _) =>
			"Please keep your messages related to startups and entrepreneurship. I'm here to help you with your business.",
	}
}

pub fn welcome_text(language: Language) -> &'static str {
	match language {
		Language::Spanish =>
			"¡Hola! 👋 Soy tu mentor de startup especializado.\n\n\
Estoy aquí para ayudarte con:\n\
• Consejos estratégicos para tu startup\n\
• Guía sobre financiación y crecimiento\n\
• Análisis de tu modelo de negocio\n\n\
¿En qué puedo ayudarte hoy con tu proyecto?",
		Language::English =>
			"Hello! 👋 I'm your specialized startup mentor.\n\n\
I'm here to help you with:\n\
• Strategic advice for your startup\n\
• Funding and growth guidance\n\
• Business model analysis\n\n\
How can I help you with your project today?",
	}
}

/// Explains a refused investor search, naming every missing piece in the founder's language.
pub fn refusal_reply(eligibility: &Eligibility, language: Language) -> String {
	let gaps = eligibility
		.gaps
		.iter()
		.map(|gap| describe_gap(gap, language))
		.collect::<Vec<_>>()
		.join("; ");

	match language {
		Language::Spanish => format!(
			"Antes de buscar inversores necesito conocer mejor tu proyecto: {gaps}. Cuéntame en qué etapa estás y a qué sector pertenece tu startup."
		),
		Language::English => format!(
			"Before searching for investors I need to know your project better: {gaps}. Tell me what stage you are at and which sector your startup is in."
		),
	}
}

pub fn search_reply(response: &RankedResponse, language: Language) -> String {
	let count = response.results.len();
	let mut reply = match (response.target, language, count) {
		(SearchTarget::Investors, Language::Spanish, 0) =>
			"No he encontrado inversores que encajen ahora mismo. Cuéntame más sobre tu proyecto para afinar la búsqueda.".to_string(),
		(SearchTarget::Investors, Language::English, 0) =>
			"I couldn't find matching investors right now. Tell me more about your project so I can refine the search.".to_string(),
		(SearchTarget::Companies, Language::Spanish, 0) =>
			"No he encontrado empresas que encajen ahora mismo. Dime con más detalle qué servicio necesitas.".to_string(),
		(SearchTarget::Companies, Language::English, 0) =>
			"I couldn't find matching companies right now. Tell me in more detail which service you need.".to_string(),
		(SearchTarget::Investors, Language::Spanish, n) => format!(
			"He encontrado {n} inversores relevantes para tu startup. Antes de contactarlos, asegúrate de tener: 1) Métricas claras (usuarios, ingresos), 2) Tracción demostrable, 3) Un pitch deck sólido. Los mejores inversores quieren ver resultados, no solo ideas."
		),
		(SearchTarget::Investors, Language::English, n) => format!(
			"Found {n} relevant investors for your startup. Before contacting them, make sure you have: 1) Clear metrics (users, revenue), 2) Demonstrable traction, 3) A solid pitch deck. The best investors want to see results, not just ideas."
		),
		(SearchTarget::Companies, Language::Spanish, n) => format!(
			"He encontrado {n} empresas que pueden ayudarte. Como mentor te recomiendo: 1) Define claramente qué necesitas, 2) Compara precios y referencias, 3) Empieza con proyectos pequeños para probar la calidad. No gastes todo tu presupuesto de una vez."
		),
		(SearchTarget::Companies, Language::English, n) => format!(
			"Found {n} companies that can help you. As a mentor I recommend: 1) Clearly define what you need, 2) Compare prices and references, 3) Start with small projects to test quality. Don't spend all your budget at once."
		),
	};

	if response.status.is_degraded() {
		reply.push_str(match language {
			Language::Spanish =>
				" Nota: algunas fuentes no respondieron, así que los resultados pueden estar incompletos.",
			Language::English => " Note: some sources did not respond, so these results may be incomplete.",
		});
	}

	reply
}

fn describe_gap(gap: &EligibilityGap, language: Language) -> String {
	match (language, gap) {
		(Language::English, gap) => gap.describe(),
		(Language::Spanish, EligibilityGap::Completeness { actual, required }) => format!(
			"la completitud del perfil es {actual:.0}%, se necesita al menos {required:.0}%"
		),
		(Language::Spanish, EligibilityGap::MissingStage) => "falta la etapa del proyecto".to_string(),
		(Language::Spanish, EligibilityGap::MissingCategories) =>
			"faltan las categorías del proyecto".to_string(),
	}
}
