pub mod between;
pub mod comparison;
pub mod is_null;
pub mod like;
pub mod logical;
