use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::engine::aggregator::AttemptRecord;
use crate::engine::plan::Plan;
use crate::engine::scheduler::GoalConfig;
use crate::store::{AttemptSource, CatalogWord, Entitlements, GoalSource, WordCatalog};

pub const SCHEMA_VERSION: u32 = 1;

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProfileData {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(default)]
    pub plan: Plan,
    #[serde(default)]
    pub test_count: u32,
}

impl Default for ProfileData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            plan: Plan::Free,
            test_count: 0,
        }
    }
}

/// A persisted snapshot that records the schema version it was written with.
pub trait Snapshot {
    fn schema_version(&self) -> u32;

    /// Check if loaded data has a stale schema version and needs reset.
    fn needs_reset(&self) -> bool {
        self.schema_version() != SCHEMA_VERSION
    }
}

macro_rules! impl_snapshot {
    ($($ty:ty),*) => {
        $(impl Snapshot for $ty {
            fn schema_version(&self) -> u32 {
                self.schema_version
            }
        })*
    };
}

impl_snapshot!(ProfileData, GoalsData, AttemptHistoryData, WordCatalogData);

impl Entitlements for ProfileData {
    fn is_unlimited(&self) -> bool {
        self.plan == Plan::Pro
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GoalsData {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(default)]
    pub goals: Vec<GoalConfig>,
}

impl Default for GoalsData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            goals: Vec::new(),
        }
    }
}

impl GoalSource for GoalsData {
    fn active_goals(&self) -> anyhow::Result<Vec<GoalConfig>> {
        Ok(self.goals.clone())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AttemptHistoryData {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(default)]
    pub attempts: Vec<AttemptRecord>,
}

impl Default for AttemptHistoryData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            attempts: Vec::new(),
        }
    }
}

impl AttemptSource for AttemptHistoryData {
    fn attempts_with_mistakes(&self) -> anyhow::Result<Vec<AttemptRecord>> {
        Ok(self
            .attempts
            .iter()
            .filter(|a| !a.incorrect_words.is_empty())
            .cloned()
            .collect())
    }
}

/// Word lists keyed by textbook name.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WordCatalogData {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(default)]
    pub textbooks: BTreeMap<String, Vec<CatalogWord>>,
}

impl Default for WordCatalogData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            textbooks: BTreeMap::new(),
        }
    }
}

impl WordCatalog for WordCatalogData {
    fn words_in_range(&self, textbook: &str, start: u32, end: u32) -> Vec<CatalogWord> {
        self.textbooks
            .get(textbook)
            .map(|words| {
                words
                    .iter()
                    .filter(|w| start <= w.word_number && w.word_number <= end)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}
