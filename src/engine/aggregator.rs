use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use icu_normalizer::ComposingNormalizerBorrowed;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::engine::date_math::Calendar;

/// Markers that identify a review-session suffix such as "(復習テスト)".
const REVIEW_MARKERS: &[&str] = &["復習", "review"];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncorrectWord {
    pub word_number: u32,
    pub word: String,
    pub meaning: String,
}

/// One finished quiz, as persisted by the quiz-taking flow.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub textbook_name: String,
    #[serde(default)]
    pub incorrect_words: Vec<IncorrectWord>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeakWordStat {
    pub word_number: u32,
    pub word: String,
    pub meaning: String,
    pub textbook: String,
    pub wrong_count: u32,
    pub last_wrong_at: DateTime<Utc>,
}

impl WeakWordStat {
    pub fn last_wrong_date(&self, calendar: &Calendar) -> NaiveDate {
        calendar.local_date(self.last_wrong_at)
    }
}

/// Normalized textbook name -> word number -> stats.
pub type WeakWordMap = BTreeMap<String, BTreeMap<u32, WeakWordStat>>;

/// Canonical merge key for a textbook name.
///
/// The name is NFKC-folded (so full-width parentheses and spaces become their
/// ASCII forms) and a single trailing parenthetical containing a review marker
/// is removed: "ターゲット1900（復習テスト）" and "ターゲット1900" share a key.
pub fn normalize_textbook_name(name: &str) -> String {
    let folded = ComposingNormalizerBorrowed::new_nfkc().normalize(name).to_string();
    let trimmed = folded.trim();

    let Some(inner_end) = trimmed.strip_suffix(')') else {
        return trimmed.to_string();
    };
    let Some(open) = matching_open_paren(inner_end) else {
        return trimmed.to_string();
    };

    let inner = &inner_end[open + 1..];
    let lowered = inner.to_lowercase();
    if !REVIEW_MARKERS.iter().any(|m| lowered.contains(m)) {
        return trimmed.to_string();
    }

    trimmed[..open].trim_end().to_string()
}

/// Byte index of the `(` that balances a `)` just past the end of `s`.
fn matching_open_paren(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in s.char_indices().rev() {
        match c {
            ')' => depth += 1,
            '(' if depth == 0 => return Some(i),
            '(' => depth -= 1,
            _ => {}
        }
    }
    None
}

/// Fold attempt history into per-textbook, per-word mistake statistics.
///
/// Records may arrive in any order: `last_wrong_at` is the latest timestamp seen,
/// and the first spelling/meaning seen for a word number is kept.
pub fn aggregate(records: &[AttemptRecord]) -> WeakWordMap {
    let mut map = WeakWordMap::new();

    for record in records {
        if record.incorrect_words.is_empty() {
            continue;
        }
        let textbook = normalize_textbook_name(&record.textbook_name);
        if textbook.is_empty() {
            debug!("skipping attempt at {} with no textbook name", record.occurred_at);
            continue;
        }

        let words = map.entry(textbook.clone()).or_default();
        for incorrect in &record.incorrect_words {
            words
                .entry(incorrect.word_number)
                .and_modify(|stat| {
                    stat.wrong_count += 1;
                    stat.last_wrong_at = stat.last_wrong_at.max(record.occurred_at);
                })
                .or_insert_with(|| WeakWordStat {
                    word_number: incorrect.word_number,
                    word: incorrect.word.clone(),
                    meaning: incorrect.meaning.clone(),
                    textbook: textbook.clone(),
                    wrong_count: 1,
                    last_wrong_at: record.occurred_at,
                });
        }
    }

    debug!(
        "aggregated {} attempts into {} textbooks",
        records.len(),
        map.len()
    );
    map
}
