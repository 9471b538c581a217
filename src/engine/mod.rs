pub mod aggregator;
pub mod classifier;
pub mod date_math;
pub mod plan;
pub mod scheduler;
pub mod selector;
