use super::FieldPropsError;
use crate::deck::DeckRecord;
use crate::grid::GridDims;

/// A cell selected by a box, with its position in the active field arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellIndex {
    pub global_index: usize,
    pub active_index: usize,
    /// Position of the cell inside the box, i fastest.
    pub data_index: usize,
}

/// Inclusive, zero-based cell range `[i1, i2] x [j1, j2] x [k1, k2]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridBox {
    dims: GridDims,
    lower: [usize; 3],
    upper: [usize; 3],
}

impl GridBox {
    /// Box covering the whole grid.
    pub fn new(dims: GridDims) -> Self {
        Self {
            dims,
            lower: [0, 0, 0],
            upper: [dims.nx() - 1, dims.ny() - 1, dims.nz() - 1],
        }
    }

    pub fn with_bounds(
        dims: GridDims,
        lower: [usize; 3],
        upper: [usize; 3],
    ) -> Result<Self, FieldPropsError> {
        let extent = [dims.nx(), dims.ny(), dims.nz()];
        for axis in 0..3 {
            if lower[axis] > upper[axis] || upper[axis] >= extent[axis] {
                return Err(FieldPropsError::InvalidBox(format!(
                    "bounds {:?}..{:?} do not fit a {}x{}x{} grid",
                    lower.map(|v| v + 1),
                    upper.map(|v| v + 1),
                    extent[0],
                    extent[1],
                    extent[2]
                )));
            }
        }
        Ok(Self { dims, lower, upper })
    }

    /// Narrows the box from the six one-based items `I1 I2 J1 J2 K1 K2`
    /// starting at `first_item`. Defaulted items keep the current bound.
    pub fn update(&mut self, record: &DeckRecord, first_item: usize) -> Result<(), FieldPropsError> {
        let mut lower = self.lower;
        let mut upper = self.upper;
        for axis in 0..3 {
            for (offset, bound) in [(0, &mut lower[axis]), (1, &mut upper[axis])] {
                if let Some(value) = record.int(first_item + 2 * axis + offset) {
                    if value < 1 {
                        return Err(FieldPropsError::InvalidBox(format!(
                            "box index {value} must be at least 1"
                        )));
                    }
                    *bound = value as usize - 1;
                }
            }
        }
        *self = Self::with_bounds(self.dims, lower, upper)?;
        Ok(())
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.dims);
    }

    pub fn lower(&self) -> [usize; 3] {
        self.lower
    }

    pub fn upper(&self) -> [usize; 3] {
        self.upper
    }

    pub fn size(&self) -> usize {
        (0..3)
            .map(|axis| self.upper[axis] - self.lower[axis] + 1)
            .product()
    }

    pub fn is_global(&self) -> bool {
        *self == Self::new(self.dims)
    }

    /// Every cell of the box as `(global_index, data_index)`, i fastest.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let (nx, ny) = (self.dims.nx(), self.dims.ny());
        let [i1, j1, k1] = self.lower;
        let [i2, j2, k2] = self.upper;
        (k1..=k2)
            .flat_map(move |k| (j1..=j2).flat_map(move |j| (i1..=i2).map(move |i| (i, j, k))))
            .enumerate()
            .map(move |(data_index, (i, j, k))| (i + j * nx + k * nx * ny, data_index))
    }

    /// Active cells inside the box. `global_to_active` has one entry per
    /// cartesian cell.
    pub fn index_list(&self, global_to_active: &[Option<usize>]) -> Vec<CellIndex> {
        self.cells()
            .filter_map(|(global_index, data_index)| {
                let active_index = global_to_active.get(global_index).copied().flatten()?;
                Some(CellIndex {
                    global_index,
                    active_index,
                    data_index,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::GridBox;
    use crate::deck::{DeckItem, DeckRecord};
    use crate::fieldprops::FieldPropsError;
    use crate::grid::GridDims;

    #[test]
    fn defaulted_items_keep_previous_bounds() {
        let dims = GridDims::new(4, 3, 2).expect("dims");
        let mut grid_box = GridBox::new(dims);
        assert_eq!(grid_box.size(), 24);

        let record = DeckRecord::new(vec![
            DeckItem::Int(2),
            DeckItem::Int(3),
            DeckItem::Default,
            DeckItem::Default,
            DeckItem::Int(2),
        ]);
        grid_box.update(&record, 0).expect("box fits");
        assert_eq!(grid_box.lower(), [1, 0, 1]);
        assert_eq!(grid_box.upper(), [2, 2, 1]);
        assert_eq!(grid_box.size(), 6);
        assert!(!grid_box.is_global());

        grid_box.reset();
        assert!(grid_box.is_global());
    }

    #[test]
    fn boxes_outside_the_grid_are_rejected() {
        let dims = GridDims::new(2, 2, 1).expect("dims");
        let mut grid_box = GridBox::new(dims);
        let record = DeckRecord::new(vec![DeckItem::Int(1), DeckItem::Int(3)]);
        assert!(matches!(
            grid_box.update(&record, 0),
            Err(FieldPropsError::InvalidBox(_))
        ));
        let inverted = DeckRecord::new(vec![DeckItem::Int(2), DeckItem::Int(1)]);
        assert!(grid_box.update(&inverted, 0).is_err());
        assert!(grid_box.is_global());
    }

    #[test]
    fn index_list_skips_inactive_cells() {
        let dims = GridDims::new(2, 2, 1).expect("dims");
        let grid_box = GridBox::with_bounds(dims, [1, 0, 0], [1, 1, 0]).expect("box fits");
        let cells = grid_box.index_list(&[Some(0), None, Some(1), Some(2)]);
        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].global_index, 3);
        assert_eq!(cells[0].active_index, 2);
        assert_eq!(cells[0].data_index, 1);
    }
}
