pub mod candidate;
pub mod conversation;
pub mod eligibility;
pub mod keywords;
pub mod language;
pub mod profile;
pub mod spam;
pub mod stage;
