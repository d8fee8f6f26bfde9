use scout_domain::candidate::CandidateRecord;

#[derive(Debug, sqlx::FromRow)]
pub struct CandidateRow {
	pub id: String,
	pub name: String,
	pub headline: Option<String>,
	pub description: Option<String>,
	pub categories: Vec<String>,
	pub stages: Vec<String>,
	pub location: Option<String>,
	pub contact: Option<String>,
	pub score: f32,
}
impl From<CandidateRow> for CandidateRecord {
	fn from(row: CandidateRow) -> Self {
		Self {
			id: row.id,
			name: row.name,
			headline: row.headline,
			description: row.description,
			categories: row.categories,
			stages: row.stages,
			location: row.location,
			contact: row.contact,
			score: row.score,
		}
	}
}

/// Service provider row. Keyword arrays are folded into categories so keyword relevance can see them.
#[derive(Debug, sqlx::FromRow)]
pub struct CompanyRow {
	pub id: String,
	pub name: String,
	pub description: Option<String>,
	pub keywords_general: Vec<String>,
	pub keywords_specific: Vec<String>,
	pub categories: Vec<String>,
	pub location: Option<String>,
	pub contact: Option<String>,
	pub score: f32,
}
impl From<CompanyRow> for CandidateRecord {
	fn from(row: CompanyRow) -> Self {
		let mut categories = row.categories;

		categories.extend(row.keywords_specific);
		categories.extend(row.keywords_general);

		Self {
			id: row.id,
			name: row.name,
			headline: None,
			description: row.description,
			categories,
			stages: Vec::new(),
			location: row.location,
			contact: row.contact,
			score: row.score,
		}
	}
}
