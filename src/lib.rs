// Scheduling and weak-word review core. Everything here is a pure function of
// caller-supplied snapshots; `store` adapts JSON files to the collaborator traits.
pub mod config;
pub mod engine;
pub mod error;
pub mod session;
pub mod store;

pub use error::ReviewError;
