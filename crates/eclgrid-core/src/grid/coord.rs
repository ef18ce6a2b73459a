use super::GridError;
use super::dims::GridDims;

/// Index arithmetic for the `6 * (nx + 1) * (ny + 1)` COORD array. Each
/// pillar holds its top point (layer 0) then its bottom point (layer 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordMapper {
    nx: usize,
    ny: usize,
}

impl CoordMapper {
    pub fn new(dims: GridDims) -> Self {
        Self {
            nx: dims.nx(),
            ny: dims.ny(),
        }
    }

    pub const fn size(&self) -> usize {
        6 * (self.nx + 1) * (self.ny + 1)
    }

    pub fn index(&self, i: usize, j: usize, dim: usize, layer: usize) -> Result<usize, GridError> {
        for (kind, index, size) in [
            ("pillar i", i, self.nx + 1),
            ("pillar j", j, self.ny + 1),
            ("dimension", dim, 3),
            ("pillar layer", layer, 2),
        ] {
            if index >= size {
                return Err(GridError::IndexOutOfRange { kind, index, size });
            }
        }
        Ok(6 * (i + j * (self.nx + 1)) + layer * 3 + dim)
    }

    /// Offsets of the four pillars around cell column (i, j), ordered to
    /// match the cell corner numbering.
    pub(crate) fn column_pillars(&self, i: usize, j: usize) -> [usize; 4] {
        let base = 6 * (i + j * (self.nx + 1));
        let row = 6 * (self.nx + 1);
        [base, base + 6, base + row, base + row + 6]
    }
}
