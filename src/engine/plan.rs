use serde::{Deserialize, Serialize};

pub const FREE_PLAN_WORD_CAP: usize = 50;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    #[default]
    Free,
    Pro,
}

impl Plan {
    pub fn from_unlimited(unlimited: bool) -> Self {
        if unlimited { Plan::Pro } else { Plan::Free }
    }

    pub fn cap(self, free_cap: usize) -> PlanCap {
        match self {
            Plan::Free => PlanCap::Limited(free_cap),
            Plan::Pro => PlanCap::Unlimited,
        }
    }
}

/// Upper bound on how many words a single session may contain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlanCap {
    Limited(usize),
    Unlimited,
}

impl Default for PlanCap {
    fn default() -> Self {
        PlanCap::Limited(FREE_PLAN_WORD_CAP)
    }
}

impl PlanCap {
    pub fn apply(self, requested: usize) -> usize {
        match self {
            PlanCap::Limited(cap) => requested.min(cap),
            PlanCap::Unlimited => requested,
        }
    }
}
