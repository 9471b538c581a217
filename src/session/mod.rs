pub mod builder;
pub mod word;
