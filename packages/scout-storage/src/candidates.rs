use scout_domain::candidate::CandidateRecord;

use crate::{
	Result,
	db::Db,
	models::{CandidateRow, CompanyRow},
};

/// Individual angels (pool A) and funds with their employees (pool B).
#[derive(Clone)]
pub struct PgInvestorStore {
	db: Db,
}
impl PgInvestorStore {
	pub fn new(db: Db) -> Self {
		Self { db }
	}

	pub async fn query_angels(
		&self,
		keywords: &[String],
		min_score: f32,
		limit: u32,
	) -> Result<Vec<CandidateRecord>> {
		let rows: Vec<CandidateRow> = sqlx::query_as(
			"\
SELECT id, name, headline, description, categories, stages, location, contact, score
FROM angels
WHERE score >= $2
	AND (
		cardinality($1::text[]) = 0
		OR concat_ws(
			' ',
			name,
			headline,
			description,
			array_to_string(categories, ' '),
			array_to_string(stages, ' ')
		) ILIKE ANY($1::text[])
	)
ORDER BY score DESC, id ASC
LIMIT $3",
		)
		.bind(like_patterns(keywords))
		.bind(min_score)
		.bind(i64::from(limit))
		.fetch_all(&self.db.pool)
		.await?;

		Ok(rows.into_iter().map(CandidateRecord::from).collect())
	}

	pub async fn query_funds(&self, keywords: &[String], limit: u32) -> Result<Vec<CandidateRecord>> {
		let rows: Vec<CandidateRow> = sqlx::query_as(
			"\
SELECT id, name, headline, description, categories, stages, location, contact, score
FROM funds
WHERE cardinality($1::text[]) = 0
	OR concat_ws(
		' ',
		name,
		headline,
		description,
		array_to_string(categories, ' '),
		array_to_string(stages, ' ')
	) ILIKE ANY($1::text[])
ORDER BY score DESC, id ASC
LIMIT $2",
		)
		.bind(like_patterns(keywords))
		.bind(i64::from(limit))
		.fetch_all(&self.db.pool)
		.await?;

		Ok(rows.into_iter().map(CandidateRecord::from).collect())
	}

	pub async fn query_fund_employees(
		&self,
		fund_id: &str,
		min_score: f32,
		limit: u32,
	) -> Result<Vec<CandidateRecord>> {
		let rows: Vec<CandidateRow> = sqlx::query_as(
			"\
SELECT id, name, headline, description, categories, stages, location, contact, score
FROM fund_employees
WHERE fund_id = $1 AND score >= $2
ORDER BY score DESC, id ASC
LIMIT $3",
		)
		.bind(fund_id)
		.bind(min_score)
		.bind(i64::from(limit))
		.fetch_all(&self.db.pool)
		.await?;

		Ok(rows.into_iter().map(CandidateRecord::from).collect())
	}
}

/// Service providers matched on general keywords (pool A) or specific keywords (pool B).
#[derive(Clone)]
pub struct PgCompanyStore {
	db: Db,
}
impl PgCompanyStore {
	pub fn new(db: Db) -> Self {
		Self { db }
	}

	pub async fn query_general(
		&self,
		keywords: &[String],
		min_score: f32,
		limit: u32,
	) -> Result<Vec<CandidateRecord>> {
		let rows: Vec<CompanyRow> = sqlx::query_as(
			"\
SELECT id, name, description, keywords_general, keywords_specific, categories, location, contact, score
FROM companies
WHERE score >= $2
	AND (
		cardinality($1::text[]) = 0
		OR concat_ws(
			' ',
			name,
			description,
			array_to_string(keywords_general, ' '),
			array_to_string(categories, ' ')
		) ILIKE ANY($1::text[])
	)
ORDER BY score DESC, id ASC
LIMIT $3",
		)
		.bind(like_patterns(keywords))
		.bind(min_score)
		.bind(i64::from(limit))
		.fetch_all(&self.db.pool)
		.await?;

		Ok(rows.into_iter().map(CandidateRecord::from).collect())
	}

	pub async fn query_specific(
		&self,
		keywords: &[String],
		limit: u32,
	) -> Result<Vec<CandidateRecord>> {
		let rows: Vec<CompanyRow> = sqlx::query_as(
			"\
SELECT id, name, description, keywords_general, keywords_specific, categories, location, contact, score
FROM companies
WHERE cardinality(keywords_specific) > 0
	AND (
		cardinality($1::text[]) = 0
		OR array_to_string(keywords_specific, ' ') ILIKE ANY($1::text[])
	)
ORDER BY score DESC, id ASC
LIMIT $2",
		)
		.bind(like_patterns(keywords))
		.bind(i64::from(limit))
		.fetch_all(&self.db.pool)
		.await?;

		Ok(rows.into_iter().map(CandidateRecord::from).collect())
	}
}

/// `ILIKE` patterns for substring matching, with wildcard characters in the keyword escaped.
pub fn like_patterns(keywords: &[String]) -> Vec<String> {
	keywords
		.iter()
		.map(|keyword| keyword.trim())
		.filter(|keyword| !keyword.is_empty())
		.map(|keyword| {
			let escaped =
				keyword.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");

			format!("%{escaped}%")
		})
		.collect()
}
