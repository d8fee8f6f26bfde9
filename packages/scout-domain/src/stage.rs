use serde::Serialize;

use scout_config::StageWeights;

const LATE: &[&str] = &[
	"series c",
	"series d",
	"series e",
	"serie c",
	"serie d",
	"serie e",
	"late stage",
	"mezzanine",
	"pre ipo",
	"ipo",
];
const GROWTH: &[&str] =
	&["series a", "series b", "serie a", "serie b", "growth", "expansion"];
const EARLIEST: &[&str] = &["pre seed", "preseed", "idea", "prototype", "mvp"];
const SEED: &[&str] = &["seed", "semilla"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageBand {
	Earliest,
	Seed,
	Growth,
	Late,
	Unknown,
}

/// Pool weights for a stage. `pool_a + pool_b` is always one.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PoolWeights {
	pub pool_a: f32,
	pub pool_b: f32,
}
impl PoolWeights {
	pub fn from_pool_a(pool_a: f32) -> Self {
		let pool_a = if pool_a.is_finite() { pool_a.clamp(0.0, 1.0) } else { 0.5 };

		Self { pool_a, pool_b: 1.0 - pool_a }
	}
}

/// Classifies free-form stage text by whole words; punctuation separates words. Later bands are
/// checked first so "series c" never lands in an earlier band, and pre-seed phrasing is checked
/// before plain seed.
pub fn stage_band(stage: &str) -> StageBand {
	let normalized = stage.to_lowercase();
	let words: Vec<&str> =
		normalized.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty()).collect();

	if words.is_empty() {
		return StageBand::Unknown;
	}

	for (band, phrases) in [
		(StageBand::Late, LATE),
		(StageBand::Growth, GROWTH),
		(StageBand::Earliest, EARLIEST),
		(StageBand::Seed, SEED),
	] {
		if phrases.iter().any(|phrase| contains_phrase(&words, phrase)) {
			return band;
		}
	}

	StageBand::Unknown
}

pub fn stage_weights(stage: &str, weights: &StageWeights) -> PoolWeights {
	band_weights(stage_band(stage), weights)
}

pub fn band_weights(band: StageBand, weights: &StageWeights) -> PoolWeights {
	let pool_a = match band {
		StageBand::Earliest => weights.earliest,
		StageBand::Seed => weights.seed,
		StageBand::Growth => weights.growth,
		StageBand::Late => weights.late,
		StageBand::Unknown => weights.unknown,
	};

	PoolWeights::from_pool_a(pool_a)
}

fn contains_phrase(words: &[&str], phrase: &str) -> bool {
	let needle: Vec<&str> = phrase.split(' ').collect();

	words.windows(needle.len()).any(|window| window == needle.as_slice())
}
