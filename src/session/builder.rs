use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::engine::aggregator::{AttemptRecord, IncorrectWord, normalize_textbook_name};
use crate::engine::classifier::TextbookWeakProfile;
use crate::engine::plan::PlanCap;
use crate::engine::scheduler::{GoalConfig, GoalStatus, compute_today_range};
use crate::engine::selector::{self, ReviewCriteria, WordRange, sample_without_replacement};
use crate::error::ReviewError;
use crate::session::word::{SessionWord, TestMode, number_positions};
use crate::store::WordCatalog;

/// Appended to the textbook name when titling a review session. Attempts logged
/// under this title fold back into the textbook's profile on aggregation.
pub const REVIEW_TITLE_SUFFIX: &str = "(復習テスト)";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionKind {
    Range(WordRange),
    Review,
}

/// A finished, immutable question list handed to the quiz UI.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub title: String,
    pub textbook: String,
    pub kind: SessionKind,
    pub mode: TestMode,
    pub words: Vec<SessionWord>,
}

impl Session {
    pub fn range(textbook: &str, range: WordRange, mode: TestMode, words: Vec<SessionWord>) -> Self {
        Self {
            title: textbook.to_string(),
            textbook: textbook.to_string(),
            kind: SessionKind::Range(range),
            mode,
            words,
        }
    }

    pub fn review(textbook: &str, mode: TestMode, words: Vec<SessionWord>) -> Self {
        Self {
            title: format!("{textbook} {REVIEW_TITLE_SUFFIX}"),
            textbook: textbook.to_string(),
            kind: SessionKind::Review,
            mode,
            words,
        }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// The history record for this session once answered. Word numbers not in
    /// the session are ignored.
    pub fn to_attempt(&self, incorrect_word_numbers: &[u32], occurred_at: DateTime<Utc>) -> AttemptRecord {
        let wrong: HashSet<u32> = incorrect_word_numbers.iter().copied().collect();
        AttemptRecord {
            textbook_name: self.title.clone(),
            incorrect_words: self
                .words
                .iter()
                .filter(|w| wrong.contains(&w.word_number))
                .map(|w| IncorrectWord {
                    word_number: w.word_number,
                    word: w.word.clone(),
                    meaning: w.meaning.clone(),
                })
                .collect(),
            occurred_at,
        }
    }
}

/// Sample `count` catalog words of `textbook` within `range`, numbered from 1.
pub fn build_from_range<C: WordCatalog + ?Sized, R: Rng + ?Sized>(
    catalog: &C,
    textbook: &str,
    range: WordRange,
    count: usize,
    plan_cap: PlanCap,
    rng: &mut R,
) -> Result<Vec<SessionWord>, ReviewError> {
    if count == 0 {
        return Err(ReviewError::InvalidCount);
    }

    let out_of_range = || ReviewError::OutOfRange {
        textbook: textbook.to_string(),
        start: range.start,
        end: range.end,
    };
    if range.start > range.end {
        return Err(out_of_range());
    }

    let mut seen = HashSet::new();
    let entries: Vec<_> = catalog
        .words_in_range(textbook, range.start, range.end)
        .into_iter()
        .filter(|w| range.contains(w.word_number) && seen.insert(w.word_number))
        .collect();
    if entries.is_empty() {
        return Err(out_of_range());
    }

    let amount = plan_cap.apply(count).min(entries.len());
    debug!(
        "sampling {amount} of {} words from {textbook} [{}, {}]",
        entries.len(),
        range.start,
        range.end
    );
    let picked = sample_without_replacement(entries, amount, rng);
    Ok(number_positions(picked, |position, w| SessionWord {
        position,
        word_number: w.word_number,
        word: w.word,
        meaning: w.meaning,
    }))
}

/// Today's goal quiz. `Ok(None)` when the goal has not started yet.
///
/// The quiz size is the goal's `words_per_test`, or the whole day's range when
/// that is unset or larger than the range.
pub fn build_from_goal<C: WordCatalog + ?Sized, R: Rng + ?Sized>(
    catalog: &C,
    goal: &GoalConfig,
    today: NaiveDate,
    mode: TestMode,
    plan_cap: PlanCap,
    rng: &mut R,
) -> Result<Option<Session>, ReviewError> {
    let assignment = match compute_today_range(goal, today)? {
        GoalStatus::Active(assignment) => assignment,
        GoalStatus::NotYetActive { .. } => return Ok(None),
    };

    let day_words = assignment.word_count();
    let count = if assignment.words_per_test == 0 || assignment.words_per_test > day_words {
        day_words
    } else {
        assignment.words_per_test
    };

    let range = WordRange::new(assignment.start, assignment.end);
    let words = build_from_range(catalog, &goal.textbook_id, range, count as usize, plan_cap, rng)?;
    Ok(Some(Session::range(&goal.textbook_id, range, mode, words)))
}

/// Weak-word review for `textbook`, which may be given with or without a
/// review suffix.
pub fn select_review<R: Rng + ?Sized>(
    profiles: &[TextbookWeakProfile],
    textbook: &str,
    criteria: &ReviewCriteria,
    mode: TestMode,
    plan_cap: PlanCap,
    rng: &mut R,
) -> Result<Session, ReviewError> {
    let key = normalize_textbook_name(textbook);
    let profile = profiles
        .iter()
        .find(|p| p.textbook == key)
        .ok_or(ReviewError::EmptySelection)?;

    let words = selector::select(profile, criteria, plan_cap, rng)?;
    Ok(Session::review(&profile.textbook, mode, words))
}
