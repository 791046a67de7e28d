//! Detection of style smells and the advice attached to them.

mod recommend;
mod smells;
mod types;

pub use recommend::{recommend, recommendation_for};
pub use smells::{detect_smells, is_oversized, MAX_METHOD_STATEMENTS};
pub use types::{Issue, IssueCategory, Recommendation};
