pub mod json_store;
pub mod schema;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::engine::aggregator::AttemptRecord;
use crate::engine::scheduler::GoalConfig;

/// One entry of a textbook's word list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogWord {
    pub word_number: u32,
    pub word: String,
    pub meaning: String,
}

pub trait GoalSource {
    fn active_goals(&self) -> Result<Vec<GoalConfig>>;
}

pub trait AttemptSource {
    /// Attempts whose incorrect-word list is non-empty.
    fn attempts_with_mistakes(&self) -> Result<Vec<AttemptRecord>>;
}

pub trait WordCatalog {
    /// Entries of `textbook` with `start <= word_number <= end`.
    fn words_in_range(&self, textbook: &str, start: u32, end: u32) -> Vec<CatalogWord>;
}

pub trait Entitlements {
    fn is_unlimited(&self) -> bool;
}
