pub mod candidates;
pub mod db;
pub mod models;
pub mod profiles;
pub mod schema;

mod error;

pub use error::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;
