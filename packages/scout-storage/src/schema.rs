pub fn render_schema() -> String {
	expand_includes(include_str!("../../../sql/init.sql"))
}

fn expand_includes(sql: &str) -> String {
	let mut out = String::new();

	for line in sql.lines() {
		let trimmed = line.trim();

		if let Some(path) = trimmed.strip_prefix("\\ir ") {
			match path.trim() {
				"tables/001_conversation_states.sql" =>
					out.push_str(include_str!("../../../sql/tables/001_conversation_states.sql")),
				"tables/002_project_profiles.sql" =>
					out.push_str(include_str!("../../../sql/tables/002_project_profiles.sql")),
				"tables/003_angels.sql" =>
					out.push_str(include_str!("../../../sql/tables/003_angels.sql")),
				"tables/004_funds.sql" =>
					out.push_str(include_str!("../../../sql/tables/004_funds.sql")),
				"tables/005_fund_employees.sql" =>
					out.push_str(include_str!("../../../sql/tables/005_fund_employees.sql")),
				"tables/006_companies.sql" =>
					out.push_str(include_str!("../../../sql/tables/006_companies.sql")),
				_ => out.push_str(line),
			}
		} else {
			out.push_str(line);
		}

		out.push('\n');
	}

	out
}
