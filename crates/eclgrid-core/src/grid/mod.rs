pub mod cartesian;
pub mod coarse;
pub mod coord;
pub mod dims;
pub mod eclipse_grid;
pub mod geometry;
pub mod mapaxes;
pub mod pinch;
pub mod zcorn;

pub use coarse::CoarseCell;
pub use coord::CoordMapper;
pub use dims::GridDims;
pub use eclipse_grid::{EclipseGrid, InitPath, PorosityMode};
pub use geometry::CellCorners;
pub use mapaxes::{MapAxes, MapAxesError};
pub use pinch::{MinpvMode, MinpvSettings, PinchMode, PinchSettings};
pub use zcorn::{ZcornFixup, ZcornMapper};

use crate::deck::DeckError;
use crate::io::eclfile::EclFileError;

#[derive(Debug, thiserror::Error)]
pub enum GridError {
    #[error("grid dimensions ({nx}, {ny}, {nz}) must all be at least 1")]
    InvalidDimensions { nx: usize, ny: usize, nz: usize },
    #[error("{kind} index {index} is out of range for size {size}")]
    IndexOutOfRange {
        kind: &'static str,
        index: usize,
        size: usize,
    },
    #[error("global cell {0} is not active")]
    InactiveCell(usize),
    #[error("invalid grid specification: {0}")]
    InvalidGridSpecification(String),
    #[error("keyword '{keyword}' has {actual} values, expected {expected}")]
    SizeMismatch {
        keyword: String,
        expected: usize,
        actual: usize,
    },
    #[error("invalid coarse cell: {0}")]
    CoarseCell(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error(transparent)]
    MapAxes(#[from] MapAxesError),
    #[error(transparent)]
    Deck(#[from] DeckError),
    #[error(transparent)]
    EclFile(#[from] EclFileError),
}
