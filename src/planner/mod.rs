pub mod logical_plan;

pub use logical_plan::{SelectPlan, Window};
