use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use log::warn;
use serde::{Serialize, de::DeserializeOwned};

use crate::engine::aggregator::AttemptRecord;
use crate::engine::scheduler::GoalConfig;
use crate::store::schema::{
    AttemptHistoryData, GoalsData, ProfileData, SCHEMA_VERSION, Snapshot, WordCatalogData,
};
use crate::store::{AttemptSource, CatalogWord, Entitlements, GoalSource, WordCatalog};

const PROFILE_FILE: &str = "profile.json";
const GOALS_FILE: &str = "goals.json";
const ATTEMPTS_FILE: &str = "attempts.json";
const CATALOG_FILE: &str = "catalog.json";

/// File-backed snapshots for a single user.
pub struct JsonStore {
    base_dir: PathBuf,
}

impl JsonStore {
    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)
            .with_context(|| format!("creating data directory {}", base_dir.display()))?;
        Ok(Self { base_dir })
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(name)
    }

    /// Missing files load as defaults. Unreadable, unparsable or stale files are errors.
    fn load_strict<T: DeserializeOwned + Default + Snapshot>(&self, name: &str) -> Result<T> {
        let path = self.file_path(name);
        if !path.exists() {
            return Ok(T::default());
        }
        let content =
            fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
        let data: T =
            serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
        if data.needs_reset() {
            bail!(
                "{} has schema version {}, expected {SCHEMA_VERSION}",
                path.display(),
                data.schema_version()
            );
        }
        Ok(data)
    }

    fn load<T: DeserializeOwned + Default + Snapshot>(&self, name: &str) -> T {
        self.load_strict(name).unwrap_or_else(|err| {
            warn!("ignoring {name}: {err:#}");
            T::default()
        })
    }

    fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        let path = self.file_path(name);
        let tmp_path = path.with_extension("tmp");

        let json = serde_json::to_string_pretty(data)?;
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;

        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    /// Load and deserialize profile. Returns None if file exists but
    /// cannot be parsed (schema mismatch / corruption).
    pub fn load_profile(&self) -> Option<ProfileData> {
        self.load_strict(PROFILE_FILE).ok()
    }

    pub fn save_profile(&self, data: &ProfileData) -> Result<()> {
        self.save(PROFILE_FILE, data)
    }

    pub fn load_goals(&self) -> GoalsData {
        self.load(GOALS_FILE)
    }

    pub fn save_goals(&self, data: &GoalsData) -> Result<()> {
        self.save(GOALS_FILE, data)
    }

    pub fn load_attempts(&self) -> AttemptHistoryData {
        self.load(ATTEMPTS_FILE)
    }

    pub fn save_attempts(&self, data: &AttemptHistoryData) -> Result<()> {
        self.save(ATTEMPTS_FILE, data)
    }

    pub fn load_catalog(&self) -> WordCatalogData {
        self.load(CATALOG_FILE)
    }

    pub fn save_catalog(&self, data: &WordCatalogData) -> Result<()> {
        self.save(CATALOG_FILE, data)
    }

    /// Persist a finished session: append its attempt and bump the test counter.
    /// Nothing is written unless both existing files load cleanly.
    pub fn record_attempt(&self, attempt: AttemptRecord) -> Result<()> {
        let mut history: AttemptHistoryData = self
            .load_strict(ATTEMPTS_FILE)
            .context("not recording attempt over unreadable history")?;
        let mut profile: ProfileData = self
            .load_strict(PROFILE_FILE)
            .context("not recording attempt over unreadable profile")?;

        history.attempts.push(attempt);
        profile.test_count += 1;
        self.save_attempts(&history)?;
        self.save_profile(&profile)
    }
}

impl GoalSource for JsonStore {
    fn active_goals(&self) -> Result<Vec<GoalConfig>> {
        self.load_goals().active_goals()
    }
}

impl AttemptSource for JsonStore {
    fn attempts_with_mistakes(&self) -> Result<Vec<AttemptRecord>> {
        self.load_attempts().attempts_with_mistakes()
    }
}

impl WordCatalog for JsonStore {
    fn words_in_range(&self, textbook: &str, start: u32, end: u32) -> Vec<CatalogWord> {
        self.load_catalog().words_in_range(textbook, start, end)
    }
}

impl Entitlements for JsonStore {
    fn is_unlimited(&self) -> bool {
        self.load_profile().is_some_and(|p| p.is_unlimited())
    }
}
