pub mod catalog;
pub mod engine;
pub mod memory;
pub mod table;

pub use catalog::Catalog;
pub use engine::{CountedRows, SessionSource, StoreSession};
pub use memory::InMemoryStorage;
pub use table::{RowId, Table};
