use chrono::{Days, NaiveDate};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::engine::date_math::elapsed_days;
use crate::error::ReviewError;

pub const DEFAULT_PREVIEW_DAYS: usize = 30;
pub const MAX_PREVIEW_DAYS: usize = 366;

/// A user's pace through one textbook: `daily_goal` words per day over
/// `[range_start, range_end]`, starting on `start_date`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalConfig {
    pub textbook_id: String,
    pub daily_goal: u32,
    pub start_date: NaiveDate,
    pub range_start: u32,
    pub range_end: u32,
    /// Zero means "test every word of the day".
    #[serde(default)]
    pub words_per_test: u32,
}

impl GoalConfig {
    pub fn validate(&self) -> Result<(), ReviewError> {
        if self.daily_goal < 1 {
            return Err(ReviewError::invalid_goal("daily goal must be at least 1"));
        }
        if self.range_start < 1 {
            return Err(ReviewError::invalid_goal("range must start at word 1 or later"));
        }
        if self.range_start > self.range_end {
            return Err(ReviewError::invalid_goal(format!(
                "range start {} is after range end {}",
                self.range_start, self.range_end
            )));
        }
        Ok(())
    }

    /// Number of words in the goal range. Only meaningful after `validate`.
    pub fn span(&self) -> u32 {
        self.range_end - self.range_start + 1
    }

    /// Days needed to walk the range once; the last day of a cycle may be short.
    pub fn days_per_cycle(&self) -> u32 {
        self.span().div_ceil(self.daily_goal)
    }

    /// Word range assigned on day `day` (0 = `start_date`).
    fn range_for_day(&self, day: u64) -> (u32, u32) {
        let cycle_day = day % u64::from(self.days_per_cycle());
        let offset = cycle_day * u64::from(self.daily_goal);
        // offset < span, so start stays within the range and fits in u32
        let start = u64::from(self.range_start) + offset;
        let end = (start + u64::from(self.daily_goal) - 1).min(u64::from(self.range_end));
        (start as u32, end as u32)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodayAssignment {
    pub textbook_id: String,
    pub day_index: u64,
    pub start: u32,
    pub end: u32,
    pub daily_goal: u32,
    pub words_per_test: u32,
}

impl TodayAssignment {
    pub fn word_count(&self) -> u32 {
        self.end - self.start + 1
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GoalStatus {
    Active(TodayAssignment),
    /// The goal's start date is still ahead; nothing is assigned yet.
    NotYetActive { starts_on: NaiveDate },
}

impl GoalStatus {
    pub fn assignment(&self) -> Option<&TodayAssignment> {
        match self {
            GoalStatus::Active(assignment) => Some(assignment),
            GoalStatus::NotYetActive { .. } => None,
        }
    }

    pub fn into_assignment(self) -> Option<TodayAssignment> {
        match self {
            GoalStatus::Active(assignment) => Some(assignment),
            GoalStatus::NotYetActive { .. } => None,
        }
    }
}

/// Today's slice of the goal range. Cycles back to `range_start` on the day after
/// the range end is reached, so a short final day is followed by a full first day.
pub fn compute_today_range(goal: &GoalConfig, today: NaiveDate) -> Result<GoalStatus, ReviewError> {
    goal.validate()?;

    let elapsed = elapsed_days(goal.start_date, today);
    if elapsed < 0 {
        return Ok(GoalStatus::NotYetActive {
            starts_on: goal.start_date,
        });
    }

    let day_index = elapsed as u64;
    let (start, end) = goal.range_for_day(day_index);
    Ok(GoalStatus::Active(TodayAssignment {
        textbook_id: goal.textbook_id.clone(),
        day_index,
        start,
        end,
        daily_goal: goal.daily_goal,
        words_per_test: goal.words_per_test,
    }))
}

/// Evaluate every goal independently; results are in input order.
pub fn compute_all(goals: &[GoalConfig], today: NaiveDate) -> Vec<Result<GoalStatus, ReviewError>> {
    goals
        .iter()
        .map(|goal| {
            let status = compute_today_range(goal, today);
            if let Err(err) = &status {
                warn!("skipping goal for {}: {err}", goal.textbook_id);
            }
            status
        })
        .collect()
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledDay {
    pub date: NaiveDate,
    pub day_index: u64,
    pub start: u32,
    pub end: u32,
}

/// The first `days` assignments of a goal, starting from its start date.
/// At most `MAX_PREVIEW_DAYS` entries are produced.
pub fn schedule(goal: &GoalConfig, days: usize) -> Result<Vec<ScheduledDay>, ReviewError> {
    goal.validate()?;

    let days = days.min(MAX_PREVIEW_DAYS);
    let mut out = Vec::with_capacity(days);
    for day_index in 0..days as u64 {
        let Some(date) = goal.start_date.checked_add_days(Days::new(day_index)) else {
            break;
        };
        let (start, end) = goal.range_for_day(day_index);
        out.push(ScheduledDay {
            date,
            day_index,
            start,
            end,
        });
    }
    Ok(out)
}
