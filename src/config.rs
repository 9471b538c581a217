use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::engine::date_math::Calendar;
use crate::engine::plan::{FREE_PLAN_WORD_CAP, Plan, PlanCap};
use crate::engine::scheduler::{DEFAULT_PREVIEW_DAYS, MAX_PREVIEW_DAYS};
use crate::session::word::TestMode;

const MAX_OFFSET_MINUTES: i32 = 14 * 60;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_free_plan_word_cap")]
    pub free_plan_word_cap: usize,
    #[serde(default = "default_utc_offset_minutes")]
    pub utc_offset_minutes: i32,
    #[serde(default = "default_test_mode")]
    pub test_mode: String,
    #[serde(default = "default_review_count")]
    pub review_count: usize,
    #[serde(default = "default_schedule_preview_days")]
    pub schedule_preview_days: usize,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

fn default_free_plan_word_cap() -> usize {
    FREE_PLAN_WORD_CAP
}
fn default_utc_offset_minutes() -> i32 {
    9 * 60
}
fn default_test_mode() -> String {
    TestMode::default().key().to_string()
}
fn default_review_count() -> usize {
    20
}
fn default_schedule_preview_days() -> usize {
    DEFAULT_PREVIEW_DAYS
}
fn default_data_dir() -> String {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("vocab-review")
        .to_string_lossy()
        .to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            free_plan_word_cap: default_free_plan_word_cap(),
            utc_offset_minutes: default_utc_offset_minutes(),
            test_mode: default_test_mode(),
            review_count: default_review_count(),
            schedule_preview_days: default_schedule_preview_days(),
            data_dir: default_data_dir(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let mut config: Config = toml::from_str(&content)?;
            config.validate();
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vocab-review")
            .join("config.toml")
    }

    /// Clamp numeric settings into usable ranges and reset unknown test modes.
    pub fn validate(&mut self) {
        self.free_plan_word_cap = self.free_plan_word_cap.max(1);
        self.utc_offset_minutes = self
            .utc_offset_minutes
            .clamp(-MAX_OFFSET_MINUTES, MAX_OFFSET_MINUTES);
        self.review_count = self.review_count.max(1);
        self.schedule_preview_days = self.schedule_preview_days.clamp(1, MAX_PREVIEW_DAYS);
        if TestMode::from_key(&self.test_mode).is_none() {
            self.test_mode = default_test_mode();
        }
    }

    pub fn test_mode(&self) -> TestMode {
        TestMode::from_key(&self.test_mode).unwrap_or_default()
    }

    pub fn calendar(&self) -> Calendar {
        Calendar::from_offset_minutes(self.utc_offset_minutes).unwrap_or_default()
    }

    pub fn plan_cap(&self, plan: Plan) -> PlanCap {
        plan.cap(self.free_plan_word_cap)
    }

    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.data_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_config_serde_defaults_from_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.free_plan_word_cap, 50);
        assert_eq!(config.utc_offset_minutes, 540);
        assert_eq!(config.test_mode(), TestMode::WordToMeaning);
        assert_eq!(config.schedule_preview_days, 30);
        assert!(config.data_dir.contains("vocab-review"));
    }

    #[test]
    fn test_config_serde_partial_fields() {
        let toml_str = r#"
free_plan_word_cap = 30
test_mode = "meaning-word"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.free_plan_word_cap, 30);
        assert_eq!(config.test_mode(), TestMode::MeaningToWord);
        assert_eq!(config.review_count, 20);
        assert_eq!(config.plan_cap(Plan::Free), PlanCap::Limited(30));
        assert_eq!(config.plan_cap(Plan::Pro), PlanCap::Unlimited);
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = Config::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(config.free_plan_word_cap, deserialized.free_plan_word_cap);
        assert_eq!(config.utc_offset_minutes, deserialized.utc_offset_minutes);
        assert_eq!(config.data_dir, deserialized.data_dir);
    }

    #[test]
    fn test_validate_clamps_values() {
        let mut config = Config::default();
        config.free_plan_word_cap = 0;
        config.utc_offset_minutes = 30 * 60;
        config.review_count = 0;
        config.schedule_preview_days = 10_000;
        config.test_mode = "en-ja".to_string();
        config.validate();

        assert_eq!(config.free_plan_word_cap, 1);
        assert_eq!(config.utc_offset_minutes, 14 * 60);
        assert_eq!(config.review_count, 1);
        assert_eq!(config.schedule_preview_days, 366);
        assert_eq!(config.test_mode, "word-meaning");
    }

    #[test]
    fn test_calendar_uses_offset() {
        let mut config = Config::default();
        config.utc_offset_minutes = -300;
        let at = chrono::Utc.with_ymd_and_hms(2024, 3, 1, 3, 0, 0).unwrap();
        assert_eq!(
            config.calendar().local_date(at),
            chrono::NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
    }
}
