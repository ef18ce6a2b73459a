//! Corner-point grid model, per-cell field properties and Fortran binary
//! record I/O for ECLIPSE-style reservoir simulation input.

pub mod config;
pub mod connections;
pub mod deck;
pub mod domain;
pub mod fieldprops;
pub mod grid;
pub mod io;
pub mod state;
pub mod tables;

pub use connections::{AssembledConnections, ConnectionError};
pub use deck::{Deck, DeckItem, DeckKeyword, DeckRecord, Section};
pub use domain::{EclError, EclResult, ErrorCategory};
pub use fieldprops::{FieldPropsError, FieldPropsManager};
pub use grid::{CoarseCell, EclipseGrid, GridDims, GridError, MapAxes};
pub use state::EclipseState;
pub use tables::{ColumnSchema, TableColumn, TableError};
