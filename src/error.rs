use thiserror::Error;

/// Recoverable conditions reported by the scheduling and selection engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReviewError {
    #[error("invalid goal configuration: {reason}")]
    InvalidGoalConfig { reason: String },

    #[error("no weak words match the selected filters; try enabling more categories or widening the range")]
    EmptySelection,

    #[error("no words found in {textbook} between {start} and {end}; check the word numbers")]
    OutOfRange {
        textbook: String,
        start: u32,
        end: u32,
    },

    #[error("the number of words to test must be at least 1")]
    InvalidCount,
}

impl ReviewError {
    pub(crate) fn invalid_goal(reason: impl Into<String>) -> Self {
        Self::InvalidGoalConfig {
            reason: reason.into(),
        }
    }
}
