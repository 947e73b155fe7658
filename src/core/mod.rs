pub mod error;
pub mod types;
pub mod value;

pub use error::{DbError, ErrorCategory, Result};
pub use types::{Column, EntityDescriptor, Row};
pub use value::{DataType, Value};
