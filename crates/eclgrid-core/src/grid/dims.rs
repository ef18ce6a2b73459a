use super::GridError;
use crate::deck::Deck;
use serde::{Deserialize, Serialize};

/// Cartesian extent of a grid. Global indices run i fastest, then j, then k.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridDims {
    nx: usize,
    ny: usize,
    nz: usize,
}

impl GridDims {
    pub fn new(nx: usize, ny: usize, nz: usize) -> Result<Self, GridError> {
        if nx == 0 || ny == 0 || nz == 0 {
            return Err(GridError::InvalidDimensions { nx, ny, nz });
        }
        Ok(Self { nx, ny, nz })
    }

    /// Reads `SPECGRID` or `DIMENS`, in that order of preference.
    pub fn from_deck(deck: &Deck) -> Result<Self, GridError> {
        let keyword = deck
            .get_keyword("SPECGRID")
            .or_else(|| deck.get_keyword("DIMENS"))
            .ok_or_else(|| {
                GridError::InvalidGridSpecification(
                    "deck has neither SPECGRID nor DIMENS".to_string(),
                )
            })?;
        let record = keyword.record(0).ok_or_else(|| {
            GridError::InvalidGridSpecification(format!("{} has no record", keyword.name()))
        })?;
        let dim = |index: usize| -> Result<usize, GridError> {
            record
                .int(index)
                .and_then(|value| usize::try_from(value).ok())
                .ok_or_else(|| {
                    GridError::InvalidGridSpecification(format!(
                        "{} item {} must be a positive integer",
                        keyword.name(),
                        index + 1
                    ))
                })
        };
        Self::new(dim(0)?, dim(1)?, dim(2)?)
    }

    pub const fn nx(&self) -> usize {
        self.nx
    }

    pub const fn ny(&self) -> usize {
        self.ny
    }

    pub const fn nz(&self) -> usize {
        self.nz
    }

    pub const fn cartesian_size(&self) -> usize {
        self.nx * self.ny * self.nz
    }

    pub const fn layer_size(&self) -> usize {
        self.nx * self.ny
    }

    pub fn global_index(&self, i: usize, j: usize, k: usize) -> Result<usize, GridError> {
        self.check_ijk(i, j, k)?;
        Ok(i + j * self.nx + k * self.nx * self.ny)
    }

    pub fn ijk(&self, global_index: usize) -> Result<[usize; 3], GridError> {
        self.check_global(global_index)?;
        let i = global_index % self.nx;
        let j = (global_index / self.nx) % self.ny;
        let k = global_index / (self.nx * self.ny);
        Ok([i, j, k])
    }

    pub fn check_ijk(&self, i: usize, j: usize, k: usize) -> Result<(), GridError> {
        for (kind, index, size) in [("i", i, self.nx), ("j", j, self.ny), ("k", k, self.nz)] {
            if index >= size {
                return Err(GridError::IndexOutOfRange { kind, index, size });
            }
        }
        Ok(())
    }

    pub fn check_global(&self, global_index: usize) -> Result<(), GridError> {
        if global_index >= self.cartesian_size() {
            return Err(GridError::IndexOutOfRange {
                kind: "global",
                index: global_index,
                size: self.cartesian_size(),
            });
        }
        Ok(())
    }
}
