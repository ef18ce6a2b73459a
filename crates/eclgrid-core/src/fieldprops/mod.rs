//! Per active cell property fields built from deck input.

pub mod box_region;
pub mod field_data;
pub mod keywords;
pub mod manager;
pub mod operations;
pub mod tran;

pub use box_region::{CellIndex, GridBox};
pub use field_data::{FieldData, FieldValue, ValueStatus};
pub use keywords::KeywordInfo;
pub use manager::{FieldPropsManager, FieldType};
pub use operations::ScalarOperation;
pub use tran::{TranAction, TranCalculator};

use crate::deck::DeckError;
use crate::grid::GridError;

#[derive(Debug, thiserror::Error)]
pub enum FieldPropsError {
    #[error("keyword '{0}' is not a supported field property")]
    UnsupportedKeyword(String),
    #[error("field property '{0}' has not been assigned")]
    NotFound(String),
    #[error("field property '{0}' is only partially assigned")]
    Incomplete(String),
    #[error("keyword '{keyword}' has {actual} values, expected {expected}")]
    SizeMismatch {
        keyword: String,
        expected: usize,
        actual: usize,
    },
    #[error("keyword '{keyword}': {reason}")]
    InvalidOperation { keyword: String, reason: String },
    #[error("region keyword '{0}' is not available")]
    InvalidRegion(String),
    #[error("ACTNUM has {actual} values, expected {expected}")]
    ActnumSize { expected: usize, actual: usize },
    #[error("global cell {0} is inactive and can not be activated")]
    CannotActivate(usize),
    #[error("invalid box: {0}")]
    InvalidBox(String),
    #[error(transparent)]
    Deck(#[from] DeckError),
    #[error(transparent)]
    Grid(#[from] GridError),
}
