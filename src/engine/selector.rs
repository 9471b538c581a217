use std::collections::HashSet;

use log::{debug, info};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::engine::classifier::{Classification, ProfiledWord, TextbookWeakProfile};
use crate::engine::plan::PlanCap;
use crate::error::ReviewError;
use crate::session::word::{SessionWord, number_positions};

/// Inclusive word-number range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordRange {
    pub start: u32,
    pub end: u32,
}

impl WordRange {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, word_number: u32) -> bool {
        self.start <= word_number && word_number <= self.end
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewCriteria {
    pub include_recent: bool,
    pub include_frequent: bool,
    pub include_single: bool,
    #[serde(default)]
    pub range: Option<WordRange>,
    pub requested_count: usize,
}

impl ReviewCriteria {
    /// All three categories, no range restriction.
    pub fn all(requested_count: usize) -> Self {
        Self {
            include_recent: true,
            include_frequent: true,
            include_single: true,
            range: None,
            requested_count,
        }
    }

    pub fn matches(&self, classification: &Classification) -> bool {
        (self.include_recent && classification.recent)
            || (self.include_frequent && classification.frequent)
            || (self.include_single && classification.single)
    }
}

/// Words matching any enabled category, each word number at most once,
/// restricted to `criteria.range` when given.
pub fn candidates<'a>(profile: &'a TextbookWeakProfile, criteria: &ReviewCriteria) -> Vec<&'a ProfiledWord> {
    let mut seen = HashSet::new();
    profile
        .words
        .iter()
        .filter(|w| criteria.matches(&w.classification))
        .filter(|w| criteria.range.is_none_or(|r| r.contains(w.stat.word_number)))
        .filter(|w| seen.insert(w.stat.word_number))
        .collect()
}

/// Shuffle-and-take: `amount` distinct items in uniformly random order.
pub fn sample_without_replacement<T, R: Rng + ?Sized>(mut items: Vec<T>, amount: usize, rng: &mut R) -> Vec<T> {
    items.shuffle(rng);
    items.truncate(amount);
    items
}

/// Draw a review session from a textbook's weak words.
pub fn select<R: Rng + ?Sized>(
    profile: &TextbookWeakProfile,
    criteria: &ReviewCriteria,
    plan_cap: PlanCap,
    rng: &mut R,
) -> Result<Vec<SessionWord>, ReviewError> {
    if criteria.requested_count == 0 {
        return Err(ReviewError::InvalidCount);
    }

    let pool = candidates(profile, criteria);
    if pool.is_empty() {
        debug!("no review candidates in {} for {criteria:?}", profile.textbook);
        return Err(ReviewError::EmptySelection);
    }

    let allowed = plan_cap.apply(criteria.requested_count);
    if allowed < criteria.requested_count {
        info!(
            "review request for {} words capped at {allowed} by plan",
            criteria.requested_count
        );
    }
    let amount = allowed.min(pool.len());

    let picked = sample_without_replacement(pool, amount, rng);
    Ok(number_positions(picked, |position, w| SessionWord {
        position,
        word_number: w.stat.word_number,
        word: w.stat.word.clone(),
        meaning: w.stat.meaning.clone(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::aggregator::WeakWordStat;
    use chrono::{TimeZone, Utc};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn profiled(word_number: u32, wrong_count: u32, days_since: i64) -> ProfiledWord {
        ProfiledWord {
            stat: WeakWordStat {
                word_number,
                word: format!("w{word_number}"),
                meaning: format!("m{word_number}"),
                textbook: "LEAP".to_string(),
                wrong_count,
                last_wrong_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            },
            classification: Classification::from_counts(wrong_count, days_since),
        }
    }

    fn mixed_profile() -> TextbookWeakProfile {
        TextbookWeakProfile::new(
            "LEAP",
            vec![
                profiled(1, 3, 2),  // frequent + recent
                profiled(2, 1, 5),  // recent
                profiled(3, 1, 60), // single
                profiled(4, 2, 90), // frequent
                profiled(5, 1, 10), // recent
            ],
        )
    }

    fn criteria(recent: bool, frequent: bool, single: bool, count: usize) -> ReviewCriteria {
        ReviewCriteria {
            include_recent: recent,
            include_frequent: frequent,
            include_single: single,
            range: None,
            requested_count: count,
        }
    }

    fn numbers(words: &[SessionWord]) -> Vec<u32> {
        let mut n: Vec<u32> = words.iter().map(|w| w.word_number).collect();
        n.sort();
        n
    }

    #[test]
    fn test_union_counts_overlapping_word_once() {
        let profile = mixed_profile();
        let pool = candidates(&profile, &criteria(true, true, false, 10));
        let mut found: Vec<u32> = pool.iter().map(|w| w.stat.word_number).collect();
        found.sort();
        assert_eq!(found, vec![1, 2, 4, 5]);
    }

    #[test]
    fn test_frequent_only_never_returns_single_mistakes() {
        let profile = mixed_profile();
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..20 {
            let words = select(&profile, &criteria(false, true, false, 10), PlanCap::Unlimited, &mut rng).unwrap();
            assert_eq!(numbers(&words), vec![1, 4]);
        }
    }

    #[test]
    fn test_range_intersects_candidates() {
        let profile = mixed_profile();
        let mut c = criteria(true, true, true, 10);
        c.range = Some(WordRange::new(2, 4));
        let mut rng = SmallRng::seed_from_u64(1);
        let words = select(&profile, &c, PlanCap::Unlimited, &mut rng).unwrap();
        assert_eq!(numbers(&words), vec![2, 3, 4]);
    }

    #[test]
    fn test_range_excluding_everything_is_empty_selection() {
        let profile = mixed_profile();
        let mut c = criteria(true, true, true, 10);
        c.range = Some(WordRange::new(100, 200));
        let mut rng = SmallRng::seed_from_u64(1);
        assert_eq!(
            select(&profile, &c, PlanCap::Unlimited, &mut rng),
            Err(ReviewError::EmptySelection)
        );
    }

    #[test]
    fn test_no_categories_is_empty_selection() {
        let profile = mixed_profile();
        let mut rng = SmallRng::seed_from_u64(1);
        assert_eq!(
            select(&profile, &criteria(false, false, false, 10), PlanCap::Unlimited, &mut rng),
            Err(ReviewError::EmptySelection)
        );
    }

    #[test]
    fn test_zero_count_rejected() {
        let profile = mixed_profile();
        let mut rng = SmallRng::seed_from_u64(1);
        assert_eq!(
            select(&profile, &criteria(true, true, true, 0), PlanCap::Unlimited, &mut rng),
            Err(ReviewError::InvalidCount)
        );
    }

    #[test]
    fn test_free_plan_cap_applies() {
        let words: Vec<ProfiledWord> = (1..=200).map(|n| profiled(n, 2, 1)).collect();
        let profile = TextbookWeakProfile::new("LEAP", words);
        let mut rng = SmallRng::seed_from_u64(3);
        let picked = select(&profile, &ReviewCriteria::all(100), PlanCap::Limited(50), &mut rng).unwrap();
        assert_eq!(picked.len(), 50);

        let unique: HashSet<u32> = picked.iter().map(|w| w.word_number).collect();
        assert_eq!(unique.len(), 50);
    }

    #[test]
    fn test_count_limited_by_pool_size() {
        let profile = mixed_profile();
        let mut rng = SmallRng::seed_from_u64(3);
        let picked = select(&profile, &ReviewCriteria::all(30), PlanCap::Unlimited, &mut rng).unwrap();
        assert_eq!(picked.len(), 5);
        let positions: Vec<usize> = picked.iter().map(|w| w.position).collect();
        assert_eq!(positions, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_same_seed_same_selection() {
        let words: Vec<ProfiledWord> = (1..=80).map(|n| profiled(n, 1, 3)).collect();
        let profile = TextbookWeakProfile::new("LEAP", words);
        let c = ReviewCriteria::all(25);
        let a = select(&profile, &c, PlanCap::Unlimited, &mut SmallRng::seed_from_u64(42)).unwrap();
        let b = select(&profile, &c, PlanCap::Unlimited, &mut SmallRng::seed_from_u64(42)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_duplicate_word_numbers_collapse() {
        let profile = TextbookWeakProfile::new("LEAP", vec![profiled(9, 2, 1), profiled(9, 2, 1)]);
        let pool = candidates(&profile, &ReviewCriteria::all(5));
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_sampling_is_a_permutation_subset() {
        let mut rng = SmallRng::seed_from_u64(11);
        let items: Vec<u32> = (0..100).collect();
        let sampled = sample_without_replacement(items, 100, &mut rng);
        let mut sorted = sampled.clone();
        sorted.sort();
        assert_eq!(sorted, (0..100).collect::<Vec<u32>>());
    }
}
