pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("SCOUT_PG_DSN is not a valid Postgres DSN: {0}")]
	Dsn(sqlx::Error),
	#[error("No admin database (postgres, template1) accepted the connection: {0}")]
	Admin(sqlx::Error),
	#[error("Failed to {action} test database {name}: {source}")]
	Lifecycle { action: &'static str, name: String, source: sqlx::Error },
}
