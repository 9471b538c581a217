use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::engine::aggregator::{WeakWordMap, WeakWordStat};
use crate::engine::date_math::Calendar;

pub const RECENT_WINDOW_DAYS: i64 = 30;
pub const FREQUENT_MIN_WRONG: u32 = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyTag {
    Frequent,
    Recent,
    Single,
}

impl DifficultyTag {
    pub fn label(self) -> &'static str {
        match self {
            DifficultyTag::Frequent => "frequent",
            DifficultyTag::Recent => "recent",
            DifficultyTag::Single => "single",
        }
    }
}

/// Independent category memberships plus the single tag shown in lists.
/// `frequent` and `recent` can both hold; `single` excludes both.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub frequent: bool,
    pub recent: bool,
    pub single: bool,
    pub primary: DifficultyTag,
}

impl Classification {
    pub fn from_counts(wrong_count: u32, days_since_wrong: i64) -> Self {
        let frequent = wrong_count >= FREQUENT_MIN_WRONG;
        let recent = days_since_wrong <= RECENT_WINDOW_DAYS;
        let single = !frequent && !recent;

        let primary = if frequent {
            DifficultyTag::Frequent
        } else if recent {
            DifficultyTag::Recent
        } else {
            DifficultyTag::Single
        };

        Self {
            frequent,
            recent,
            single,
            primary,
        }
    }
}

pub fn classify(stat: &WeakWordStat, calendar: &Calendar, today: NaiveDate) -> Classification {
    Classification::from_counts(stat.wrong_count, calendar.days_since(stat.last_wrong_at, today))
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfiledWord {
    pub stat: WeakWordStat,
    pub classification: Classification,
}

/// Weak words of one textbook with per-category tallies. A word that is both
/// frequent and recent is counted in both tallies.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextbookWeakProfile {
    pub textbook: String,
    pub words: Vec<ProfiledWord>,
    pub recent_count: usize,
    pub frequent_count: usize,
    pub single_count: usize,
}

impl TextbookWeakProfile {
    pub fn new(textbook: impl Into<String>, words: Vec<ProfiledWord>) -> Self {
        let tally = |pred: fn(&Classification) -> bool| {
            words.iter().filter(|w| pred(&w.classification)).count()
        };
        let recent_count = tally(|c| c.recent);
        let frequent_count = tally(|c| c.frequent);
        let single_count = tally(|c| c.single);

        Self {
            textbook: textbook.into(),
            words,
            recent_count,
            frequent_count,
            single_count,
        }
    }

    pub fn count_for(&self, tag: DifficultyTag) -> usize {
        match tag {
            DifficultyTag::Frequent => self.frequent_count,
            DifficultyTag::Recent => self.recent_count,
            DifficultyTag::Single => self.single_count,
        }
    }
}

/// Classify every aggregated word, one profile per textbook in name order.
/// Words within a profile are ordered by word number.
pub fn build_profiles(map: &WeakWordMap, calendar: &Calendar, today: NaiveDate) -> Vec<TextbookWeakProfile> {
    map.iter()
        .filter(|(_, words)| !words.is_empty())
        .map(|(textbook, words)| {
            let profiled = words
                .values()
                .map(|stat| ProfiledWord {
                    stat: stat.clone(),
                    classification: classify(stat, calendar, today),
                })
                .collect();
            TextbookWeakProfile::new(textbook.clone(), profiled)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::aggregator::{AttemptRecord, IncorrectWord, aggregate};
    use chrono::{DateTime, TimeZone, Utc};

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 9, 0, 0).unwrap()
    }

    fn attempt(numbers: &[u32], occurred_at: DateTime<Utc>) -> AttemptRecord {
        AttemptRecord {
            textbook_name: "LEAP".to_string(),
            incorrect_words: numbers
                .iter()
                .map(|&n| IncorrectWord {
                    word_number: n,
                    word: format!("w{n}"),
                    meaning: format!("m{n}"),
                })
                .collect(),
            occurred_at,
        }
    }

    #[test]
    fn test_primary_tag_priority() {
        assert_eq!(Classification::from_counts(3, 0).primary, DifficultyTag::Frequent);
        assert_eq!(Classification::from_counts(3, 90).primary, DifficultyTag::Frequent);
        assert_eq!(Classification::from_counts(1, 30).primary, DifficultyTag::Recent);
        assert_eq!(Classification::from_counts(1, 31).primary, DifficultyTag::Single);
    }

    #[test]
    fn test_frequent_and_recent_overlap() {
        let c = Classification::from_counts(2, 5);
        assert!(c.frequent);
        assert!(c.recent);
        assert!(!c.single);
    }

    #[test]
    fn test_single_requires_old_and_once() {
        assert!(Classification::from_counts(1, 31).single);
        assert!(!Classification::from_counts(1, 30).single);
        assert!(!Classification::from_counts(2, 100).single);
    }

    #[test]
    fn test_profile_counts_are_independent_tallies() {
        let records = vec![
            // word 1: wrong twice, recently -> frequent + recent
            attempt(&[1, 2], at(2024, 3, 1)),
            attempt(&[1], at(2024, 3, 10)),
            // word 3: wrong once, long ago -> single
            attempt(&[3], at(2023, 11, 1)),
            // word 4: wrong twice, long ago -> frequent only
            attempt(&[4], at(2023, 10, 1)),
            attempt(&[4], at(2023, 10, 2)),
        ];
        let profiles = build_profiles(&aggregate(&records), &Calendar::utc(), NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert_eq!(profiles.len(), 1);
        let profile = &profiles[0];
        assert_eq!(profile.words.len(), 4);
        assert_eq!(profile.frequent_count, 2);
        assert_eq!(profile.recent_count, 2);
        assert_eq!(profile.single_count, 1);
        assert_eq!(profile.count_for(DifficultyTag::Single), 1);

        let numbers: Vec<u32> = profile.words.iter().map(|w| w.stat.word_number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4]);
        assert_eq!(profile.words[0].classification.primary, DifficultyTag::Frequent);
        assert_eq!(profile.words[1].classification.primary, DifficultyTag::Recent);
        assert_eq!(profile.words[2].classification.primary, DifficultyTag::Single);
    }

    #[test]
    fn test_recency_follows_reporting_timezone() {
        // 2024-01-01 20:00 UTC is 2024-01-02 in UTC+9: 30 days before 2024-02-01.
        let stat = WeakWordStat {
            word_number: 1,
            word: "w".to_string(),
            meaning: "m".to_string(),
            textbook: "LEAP".to_string(),
            wrong_count: 1,
            last_wrong_at: Utc.with_ymd_and_hms(2024, 1, 1, 20, 0, 0).unwrap(),
        };
        let today = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let tokyo = Calendar::from_offset_minutes(540).unwrap();
        assert!(classify(&stat, &tokyo, today).recent);
        assert!(!classify(&stat, &Calendar::utc(), today).recent);
    }
}
