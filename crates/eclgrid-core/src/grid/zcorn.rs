use super::GridError;
use super::dims::GridDims;
use serde::{Deserialize, Serialize};

/// Which side wins when a cell corner crosses the corresponding corner of
/// the neighbouring cell along the same pillar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ZcornFixup {
    /// The upper point is kept and the lower one is moved up to it.
    #[default]
    AboveWins,
    /// The lower point is kept and the upper one is moved down to it.
    BelowWins,
    Disabled,
}

/// Index arithmetic for the `8 * nx * ny * nz` ZCORN array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZcornMapper {
    dims: GridDims,
    stride: [usize; 3],
    cell_shift: [usize; 8],
}

impl ZcornMapper {
    pub fn new(dims: GridDims) -> Self {
        let nx = dims.nx();
        let ny = dims.ny();
        let stride = [2, 4 * nx, 8 * nx * ny];
        let layer = 4 * nx * ny;
        let cell_shift = [
            0,
            1,
            2 * nx,
            2 * nx + 1,
            layer,
            layer + 1,
            layer + 2 * nx,
            layer + 2 * nx + 1,
        ];
        Self {
            dims,
            stride,
            cell_shift,
        }
    }

    pub const fn size(&self) -> usize {
        8 * self.dims.cartesian_size()
    }

    /// Position of corner `c` (0..8) of cell (i, j, k).
    pub fn index(&self, i: usize, j: usize, k: usize, c: usize) -> Result<usize, GridError> {
        self.dims.check_ijk(i, j, k)?;
        if c >= 8 {
            return Err(GridError::IndexOutOfRange {
                kind: "corner",
                index: c,
                size: 8,
            });
        }
        Ok(self.unchecked(i, j, k, c))
    }

    fn unchecked(&self, i: usize, j: usize, k: usize, c: usize) -> usize {
        i * self.stride[0] + j * self.stride[1] + k * self.stride[2] + self.cell_shift[c]
    }

    /// Corner positions of a cell in the 0..8 numbering.
    pub fn cell_indices(&self, i: usize, j: usize, k: usize) -> Result<[usize; 8], GridError> {
        self.dims.check_ijk(i, j, k)?;
        Ok(std::array::from_fn(|c| self.unchecked(i, j, k, c)))
    }

    /// Whether depths increase (`1.0`) or decrease (`-1.0`) down the grid.
    fn direction(&self, zcorn: &[f64]) -> f64 {
        let top = zcorn[self.unchecked(0, 0, 0, 0)];
        let bottom = zcorn[self.unchecked(0, 0, self.dims.nz() - 1, 4)];
        if top <= bottom { 1.0 } else { -1.0 }
    }

    /// Restores monotone depths along every pillar and returns how many
    /// values were changed. Crossings within `epsilon` are tolerated.
    pub fn fixup_zcorn(
        &self,
        zcorn: &mut [f64],
        policy: ZcornFixup,
        epsilon: f64,
    ) -> Result<usize, GridError> {
        if zcorn.len() != self.size() {
            return Err(GridError::SizeMismatch {
                keyword: "ZCORN".to_string(),
                expected: self.size(),
                actual: zcorn.len(),
            });
        }
        if policy == ZcornFixup::Disabled {
            return Ok(0);
        }

        let sign = self.direction(zcorn);
        let mut fixed = 0;
        let mut repair = |zcorn: &mut [f64], upper: usize, lower: usize| {
            if (zcorn[lower] - zcorn[upper]) * sign < -epsilon {
                match policy {
                    ZcornFixup::AboveWins => zcorn[lower] = zcorn[upper],
                    ZcornFixup::BelowWins => zcorn[upper] = zcorn[lower],
                    ZcornFixup::Disabled => {}
                }
                fixed += 1;
            }
        };

        // Layers are walked starting from the winning side.
        let below_wins = policy == ZcornFixup::BelowWins;
        let nz = self.dims.nz();
        for step in 0..nz {
            let k = if below_wins { nz - 1 - step } else { step };
            for j in 0..self.dims.ny() {
                for i in 0..self.dims.nx() {
                    for c in 0..4 {
                        let top = self.unchecked(i, j, k, c);
                        let bottom = self.unchecked(i, j, k, c + 4);
                        let above = (k > 0).then(|| self.unchecked(i, j, k - 1, c + 4));
                        if below_wins {
                            repair(zcorn, top, bottom);
                            if let Some(above) = above {
                                repair(zcorn, above, top);
                            }
                        } else {
                            if let Some(above) = above {
                                repair(zcorn, above, top);
                            }
                            repair(zcorn, top, bottom);
                        }
                    }
                }
            }
        }
        Ok(fixed)
    }
}

#[cfg(test)]
mod tests {
    use super::{ZcornFixup, ZcornMapper};
    use crate::grid::GridDims;

    fn layered_zcorn(mapper: &ZcornMapper, dims: GridDims, depths: &[f64]) -> Vec<f64> {
        // depths[k] is the top of layer k, depths[k + 1] its bottom
        let mut zcorn = vec![0.0; mapper.size()];
        for k in 0..dims.nz() {
            for j in 0..dims.ny() {
                for i in 0..dims.nx() {
                    let corners = mapper.cell_indices(i, j, k).expect("cell in range");
                    for (c, index) in corners.iter().enumerate() {
                        zcorn[*index] = if c < 4 { depths[k] } else { depths[k + 1] };
                    }
                }
            }
        }
        zcorn
    }

    #[test]
    fn strides_follow_the_corner_layout() {
        let dims = GridDims::new(2, 3, 2).expect("dims");
        let mapper = ZcornMapper::new(dims);
        assert_eq!(mapper.size(), 96);
        assert_eq!(mapper.index(0, 0, 0, 3).expect("corner"), 5);
        assert_eq!(mapper.index(1, 0, 0, 0).expect("corner"), 2);
        assert_eq!(mapper.index(0, 1, 0, 0).expect("corner"), 8);
        assert_eq!(mapper.index(0, 0, 1, 0).expect("corner"), 48);
        assert_eq!(mapper.index(0, 0, 0, 4).expect("corner"), 24);
        assert!(mapper.index(0, 0, 0, 8).is_err());
    }

    #[test]
    fn consistent_grid_needs_no_repair() {
        let dims = GridDims::new(2, 2, 2).expect("dims");
        let mapper = ZcornMapper::new(dims);
        let mut zcorn = layered_zcorn(&mapper, dims, &[0.0, 1.0, 2.0]);
        let fixed = mapper
            .fixup_zcorn(&mut zcorn, ZcornFixup::AboveWins, 0.0)
            .expect("sizes match");
        assert_eq!(fixed, 0);
    }

    #[test]
    fn crossing_layers_are_repaired_by_policy() {
        let dims = GridDims::new(1, 1, 2).expect("dims");
        let mapper = ZcornMapper::new(dims);
        let mut zcorn = layered_zcorn(&mapper, dims, &[0.0, 1.0, 2.0]);
        // lift the top of layer 1 above the bottom of layer 0
        for c in 0..4 {
            let index = mapper.index(0, 0, 1, c).expect("corner");
            zcorn[index] = 0.5;
        }

        let mut above = zcorn.clone();
        let fixed = mapper
            .fixup_zcorn(&mut above, ZcornFixup::AboveWins, 0.0)
            .expect("sizes match");
        assert_eq!(fixed, 4);
        assert_eq!(above[mapper.index(0, 0, 1, 0).expect("corner")], 1.0);

        let mut below = zcorn.clone();
        mapper
            .fixup_zcorn(&mut below, ZcornFixup::BelowWins, 0.0)
            .expect("sizes match");
        assert_eq!(below[mapper.index(0, 0, 0, 4).expect("corner")], 0.5);

        let mut untouched = zcorn.clone();
        assert_eq!(
            mapper
                .fixup_zcorn(&mut untouched, ZcornFixup::Disabled, 0.0)
                .expect("sizes match"),
            0
        );
        assert_eq!(untouched, zcorn);

        let mut tolerated = zcorn;
        assert_eq!(
            mapper
                .fixup_zcorn(&mut tolerated, ZcornFixup::AboveWins, 0.6)
                .expect("sizes match"),
            0
        );
    }

    #[test]
    fn below_wins_keeps_every_cell_monotone() {
        let dims = GridDims::new(1, 1, 2).expect("dims");
        let mapper = ZcornMapper::new(dims);
        let mut zcorn = layered_zcorn(&mapper, dims, &[0.0, 1.0, 2.0]);
        for c in 0..4 {
            let index = mapper.index(0, 0, 1, c).expect("corner");
            zcorn[index] = -0.5;
        }

        let fixed = mapper
            .fixup_zcorn(&mut zcorn, ZcornFixup::BelowWins, 0.0)
            .expect("sizes match");
        assert_eq!(fixed, 8);
        for c in 0..4 {
            let column: Vec<f64> = [(0, c), (0, c + 4), (1, c), (1, c + 4)]
                .iter()
                .map(|&(k, corner)| zcorn[mapper.index(0, 0, k, corner).expect("corner")])
                .collect();
            assert_eq!(column, vec![-0.5, -0.5, -0.5, 2.0]);
        }
    }

    #[test]
    fn wrong_length_is_rejected() {
        let mapper = ZcornMapper::new(GridDims::new(1, 1, 1).expect("dims"));
        assert!(
            mapper
                .fixup_zcorn(&mut [0.0; 7], ZcornFixup::AboveWins, 0.0)
                .is_err()
        );
    }
}
