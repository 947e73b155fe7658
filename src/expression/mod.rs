pub mod pattern;
pub mod predicate;

pub use predicate::{CompareOp, Predicate};
