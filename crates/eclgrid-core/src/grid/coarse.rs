use super::GridError;
use super::dims::GridDims;
use std::collections::{BTreeMap, HashSet};

/// A box of global cells that shares one active index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoarseCell {
    ijk_min: [usize; 3],
    ijk_max: [usize; 3],
    cells: Vec<usize>,
    active_index: Option<usize>,
    fracture_index: Option<usize>,
    active_value: Option<i32>,
}

impl CoarseCell {
    /// `cells` must list every global cell of the inclusive box exactly once.
    pub fn new(
        dims: GridDims,
        ijk_min: [usize; 3],
        ijk_max: [usize; 3],
        cells: Vec<usize>,
    ) -> Result<Self, GridError> {
        dims.check_ijk(ijk_max[0], ijk_max[1], ijk_max[2])?;
        if (0..3).any(|axis| ijk_min[axis] > ijk_max[axis]) {
            return Err(GridError::CoarseCell(format!(
                "box {ijk_min:?}..{ijk_max:?} is empty"
            )));
        }
        let box_size: usize = (0..3).map(|axis| ijk_max[axis] - ijk_min[axis] + 1).product();
        if box_size != cells.len() {
            return Err(GridError::CoarseCell(format!(
                "box {ijk_min:?}..{ijk_max:?} holds {box_size} cells but {} were listed",
                cells.len()
            )));
        }
        let mut seen = HashSet::with_capacity(cells.len());
        for &cell in &cells {
            if !seen.insert(cell) {
                return Err(GridError::CoarseCell(format!(
                    "cell {cell} is listed twice in box {ijk_min:?}..{ijk_max:?}"
                )));
            }
            let [i, j, k] = dims.ijk(cell)?;
            let inside = (0..3).all(|axis| {
                let value = [i, j, k][axis];
                value >= ijk_min[axis] && value <= ijk_max[axis]
            });
            if !inside {
                return Err(GridError::CoarseCell(format!(
                    "cell {cell} lies outside box {ijk_min:?}..{ijk_max:?}"
                )));
            }
        }
        Ok(Self {
            ijk_min,
            ijk_max,
            cells,
            active_index: None,
            fracture_index: None,
            active_value: None,
        })
    }

    /// Groups cells by a CORSNUM-style array (1-based group per cell, 0 for
    /// none). Each group must fill its bounding box.
    pub fn from_corsnum(dims: GridDims, corsnum: &[i32]) -> Result<Vec<Self>, GridError> {
        if corsnum.len() != dims.cartesian_size() {
            return Err(GridError::SizeMismatch {
                keyword: "CORSNUM".to_string(),
                expected: dims.cartesian_size(),
                actual: corsnum.len(),
            });
        }
        let mut members: BTreeMap<i32, Vec<usize>> = BTreeMap::new();
        for (global, &group) in corsnum.iter().enumerate() {
            if group > 0 {
                members.entry(group).or_default().push(global);
            }
        }

        members
            .into_values()
            .map(|cells| {
                let mut ijk_min = [usize::MAX; 3];
                let mut ijk_max = [0; 3];
                for &cell in &cells {
                    let ijk = dims.ijk(cell)?;
                    for axis in 0..3 {
                        ijk_min[axis] = ijk_min[axis].min(ijk[axis]);
                        ijk_max[axis] = ijk_max[axis].max(ijk[axis]);
                    }
                }
                Self::new(dims, ijk_min, ijk_max, cells)
            })
            .collect()
    }

    pub fn ijk_min(&self) -> [usize; 3] {
        self.ijk_min
    }

    pub fn ijk_max(&self) -> [usize; 3] {
        self.ijk_max
    }

    pub fn cells(&self) -> &[usize] {
        &self.cells
    }

    pub fn contains(&self, global_index: usize) -> bool {
        self.cells.contains(&global_index)
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active_index
    }

    pub fn fracture_index(&self) -> Option<usize> {
        self.fracture_index
    }

    pub fn active_value(&self) -> Option<i32> {
        self.active_value
    }

    /// Cells whose ACTNUM is positive, in box order.
    pub fn active_cells<'a>(&'a self, actnum: &'a [i32]) -> impl Iterator<Item = usize> + 'a {
        self.cells
            .iter()
            .copied()
            .filter(move |cell| actnum.get(*cell).is_some_and(|value| *value > 0))
    }

    pub(crate) fn reset(&mut self) {
        self.active_index = None;
        self.fracture_index = None;
        self.active_value = None;
    }

    /// Records that `global_index` is active with code `active_value`. Every
    /// active cell of a group must carry the same code.
    pub(crate) fn register_active(
        &mut self,
        global_index: usize,
        active_value: i32,
    ) -> Result<(), GridError> {
        match self.active_value {
            Some(existing) if existing != active_value => Err(GridError::CoarseCell(format!(
                "cell {global_index} has ACTNUM {active_value} but its coarse group uses {existing}"
            ))),
            _ => {
                self.active_value = Some(active_value);
                Ok(())
            }
        }
    }

    /// Matrix index of the group, allocating `next` on first use.
    pub(crate) fn matrix_index_or(&mut self, next: usize) -> (usize, bool) {
        match self.active_index {
            Some(index) => (index, false),
            None => {
                self.active_index = Some(next);
                (next, true)
            }
        }
    }

    pub(crate) fn fracture_index_or(&mut self, next: usize) -> (usize, bool) {
        match self.fracture_index {
            Some(index) => (index, false),
            None => {
                self.fracture_index = Some(next);
                (next, true)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::CoarseCell;
    use crate::grid::{GridDims, GridError};

    #[test]
    fn box_size_must_match_cell_list() {
        let dims = GridDims::new(3, 3, 1).expect("dims");
        let error = CoarseCell::new(dims, [0, 0, 0], [1, 1, 0], vec![0, 1, 3])
            .expect_err("one cell is missing");
        assert!(matches!(error, GridError::CoarseCell(_)));

        let cell = CoarseCell::new(dims, [0, 0, 0], [1, 1, 0], vec![0, 1, 3, 4])
            .expect("box is complete");
        assert_eq!(cell.cells().len(), 4);
        assert!(cell.contains(4));
        assert!(CoarseCell::new(dims, [0, 0, 0], [1, 1, 0], vec![0, 1, 3, 8]).is_err());

        let error = CoarseCell::new(dims, [0, 0, 0], [1, 1, 0], vec![0, 0, 1, 3])
            .expect_err("cell 0 repeats and cell 4 is missing");
        assert!(matches!(error, GridError::CoarseCell(message) if message.contains("twice")));
    }

    #[test]
    fn corsnum_groups_become_boxes() {
        let dims = GridDims::new(2, 2, 1).expect("dims");
        let cells = CoarseCell::from_corsnum(dims, &[1, 1, 0, 2]).expect("groups are boxes");
        assert_eq!(cells.len(), 2);
        assert_eq!(cells[0].ijk_max(), [1, 0, 0]);
        assert_eq!(cells[1].cells(), &[3]);

        assert!(CoarseCell::from_corsnum(dims, &[1, 0, 0, 1]).is_err());
        assert!(CoarseCell::from_corsnum(dims, &[1]).is_err());

        let sparse = CoarseCell::from_corsnum(dims, &[i32::MAX, i32::MAX, 0, 7])
            .expect("group numbers need not be dense");
        assert_eq!(sparse.len(), 2);
        assert_eq!(sparse[0].cells(), &[3]);
        assert_eq!(sparse[1].cells(), &[0, 1]);
    }

    #[test]
    fn active_codes_must_agree() {
        let dims = GridDims::new(2, 1, 1).expect("dims");
        let mut cell = CoarseCell::new(dims, [0, 0, 0], [1, 0, 0], vec![0, 1]).expect("box");
        cell.register_active(0, 1).expect("first code");
        assert!(cell.register_active(1, 2).is_err());
        assert_eq!(cell.matrix_index_or(5), (5, true));
        assert_eq!(cell.matrix_index_or(6), (5, false));
        cell.reset();
        assert_eq!(cell.active_index(), None);
    }
}
