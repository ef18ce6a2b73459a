pub mod column;
pub mod schema;
pub mod simple_table;

pub use column::{TableColumn, TableIndex};
pub use schema::{ColumnOrder, ColumnSchema, DefaultAction};
pub use simple_table::SimpleTable;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TableError {
    #[error("value {value} at row {index} breaks the ordering of column '{column}'")]
    InvalidOrder {
        column: String,
        index: usize,
        value: f64,
    },
    #[error("column '{0}' has no explicit value to resolve defaults from")]
    FullyDefaulted(String),
    #[error("invalid operation on column '{column}': {reason}")]
    InvalidOperation { column: String, reason: String },
    #[error("row {index} is out of range for column '{column}' with {size} rows")]
    IndexOutOfRange {
        column: String,
        index: usize,
        size: usize,
    },
    #[error("table starting at column '{column}' expected {expected} entries, found {actual}")]
    SizeMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },
    #[error("table has no column named '{0}'")]
    MissingColumn(String),
}
