//! Dynamic filter queries over any catalogued entity.
//!
//! A [`FilterRequest`] names an attribute, an operator token and a raw value,
//! optionally an object of per-attribute `jsonFilters`, a page window and a
//! column projection. [`FilterEngine::query`] validates it against the
//! entity's [`EntityDescriptor`](crate::core::EntityDescriptor), turns it into
//! a [`SelectPlan`](crate::planner::SelectPlan) and reports the rows with
//! total and matched counts.

pub mod builders;
pub mod coerce;
mod config;
mod engine;
pub mod json_filters;
mod operator;
mod request;
pub mod validate;

pub use builders::{BuilderRegistry, PredicateBuilder};
pub use config::FilterConfig;
pub use engine::{FilterEngine, QueryPlan};
pub use operator::Operator;
pub use request::FilterRequest;
