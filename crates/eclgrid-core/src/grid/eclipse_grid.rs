use super::cartesian;
use super::coarse::CoarseCell;
use super::dims::GridDims;
use super::geometry::CellCorners;
use super::mapaxes::MapAxes;
use super::pinch::{MinpvSettings, PinchSettings};
use super::zcorn::{ZcornFixup, ZcornMapper};
use super::GridError;
use crate::deck::Deck;
use crate::domain::LengthUnit;
use crate::io::eclfile::{EclData, EclFile, EclKeyword, EclOutput};
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, info, warn};

const HEADER_LEN: usize = 100;

/// How the pillar and corner arrays of a grid were obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InitPath {
    /// `COORD` and `ZCORN`.
    CornerPoint,
    /// `DXV`, `DYV`, `DZV` and `DEPTHZ`.
    DepthVectors,
    /// `DX|DXV`, `DY|DYV`, `DZ|DZV` and `TOPS`.
    CellSizes,
    Uniform,
    Egrid,
}

impl InitPath {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CornerPoint => "corner-point",
            Self::DepthVectors => "dxv-dyv-dzv-depthz",
            Self::CellSizes => "dx-dy-dz-tops",
            Self::Uniform => "uniform",
            Self::Egrid => "egrid",
        }
    }
}

/// Single porosity grids treat any positive ACTNUM as active. In dual
/// porosity grids ACTNUM is a bitmask: 1 matrix, 2 fracture, 3 both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PorosityMode {
    #[default]
    Single,
    Dual,
}

#[derive(Debug, Clone)]
pub struct EclipseGrid {
    dims: GridDims,
    init_path: InitPath,
    porosity: PorosityMode,
    coord: Vec<f64>,
    zcorn: Vec<f64>,
    actnum: Vec<i32>,
    zcorn_fixed: usize,
    map_axes: Option<MapAxes>,
    pinch: Option<PinchSettings>,
    minpv: MinpvSettings,
    coarse_cells: Vec<CoarseCell>,
    coarse_of_cell: Vec<Option<usize>>,
    global_to_active: Vec<Option<usize>>,
    active_to_global: Vec<usize>,
    global_to_fracture: Vec<Option<usize>>,
    fracture_to_global: Vec<usize>,
    active_volume: OnceLock<Vec<f64>>,
}

impl EclipseGrid {
    /// Builds a grid from explicit pillars and corner depths. ZCORN
    /// inversions are repaired with [`ZcornFixup::AboveWins`].
    pub fn from_corner_point(
        dims: GridDims,
        coord: Vec<f64>,
        zcorn: Vec<f64>,
        actnum: Option<&[i32]>,
    ) -> Result<Self, GridError> {
        Self::assemble(
            dims,
            InitPath::CornerPoint,
            coord,
            zcorn,
            actnum,
            ZcornFixup::default(),
            0.0,
        )
    }

    /// A box grid of identical cells with every cell active.
    pub fn uniform(dims: GridDims, size: [f64; 3], top: f64) -> Result<Self, GridError> {
        if size.iter().any(|value| !value.is_finite() || *value <= 0.0) {
            return Err(GridError::InvalidArgument(format!(
                "cell size {size:?} must be positive"
            )));
        }
        let (coord, zcorn) = cartesian::uniform(dims, size, top);
        Self::assemble(
            dims,
            InitPath::Uniform,
            coord,
            zcorn,
            None,
            ZcornFixup::Disabled,
            0.0,
        )
    }

    pub fn from_deck(deck: &Deck) -> Result<Self, GridError> {
        Self::from_deck_with(deck, ZcornFixup::default(), 0.0)
    }

    /// Selects the construction path from the keywords present, then applies
    /// ACTNUM, MAPAXES, PINCH, MINPV and CORSNUM.
    pub fn from_deck_with(
        deck: &Deck,
        fixup: ZcornFixup,
        epsilon: f64,
    ) -> Result<Self, GridError> {
        let dims = GridDims::from_deck(deck)?;
        if deck.has_keyword("RADIAL") || deck.has_keyword("SPIDER") {
            return Err(GridError::InvalidGridSpecification(
                "radial and spider web grids are not supported".to_string(),
            ));
        }

        let has = |name: &str| deck.has_keyword(name);
        let data = |name: &str| -> Result<Vec<f64>, GridError> {
            Ok(deck.require_keyword(name)?.data_f64()?)
        };
        let (path, coord, zcorn) = if has("COORD") && has("ZCORN") {
            (InitPath::CornerPoint, data("COORD")?, data("ZCORN")?)
        } else if has("DXV") && has("DYV") && has("DZV") && has("DEPTHZ") {
            let (coord, zcorn) = cartesian::from_dxv(
                dims,
                &data("DXV")?,
                &data("DYV")?,
                &data("DZV")?,
                &data("DEPTHZ")?,
            )?;
            (InitPath::DepthVectors, coord, zcorn)
        } else if (has("DX") || has("DXV"))
            && (has("DY") || has("DYV"))
            && (has("DZ") || has("DZV"))
            && has("TOPS")
        {
            let dx = cell_sizes(deck, dims, 0, "DX", "DXV")?;
            let dy = cell_sizes(deck, dims, 1, "DY", "DYV")?;
            let dz = cell_sizes(deck, dims, 2, "DZ", "DZV")?;
            let tops = cartesian::stack_tops(dims, data("TOPS")?, &dz)?;
            let (coord, zcorn) = cartesian::from_cell_sizes(dims, &dx, &dy, &dz, &tops)?;
            (InitPath::CellSizes, coord, zcorn)
        } else {
            return Err(GridError::InvalidGridSpecification(
                "deck needs COORD and ZCORN, DXV/DYV/DZV/DEPTHZ or DX/DY/DZ/TOPS".to_string(),
            ));
        };

        let actnum = deck
            .get_keyword("ACTNUM")
            .map(|keyword| keyword.data_i32())
            .transpose()?;
        let mut grid = Self::assemble(dims, path, coord, zcorn, actnum.as_deref(), fixup, epsilon)?;

        if deck.has_keyword("DUALPORO") || deck.has_keyword("DUALPERM") {
            grid.porosity = PorosityMode::Dual;
        }
        grid.map_axes = MapAxes::from_deck(deck)?;
        grid.pinch = PinchSettings::from_deck(deck)?;
        grid.minpv = MinpvSettings::from_deck(deck, dims.cartesian_size())?;
        if let Some(keyword) = deck.get_keyword("CORSNUM") {
            grid.coarse_cells = CoarseCell::from_corsnum(dims, &keyword.data_i32()?)?;
        }
        grid.rebuild_index_maps()?;
        Ok(grid)
    }

    /// Reads an EGRID file. `GRIDHEAD`, `COORD` and `ZCORN` are required;
    /// lengths are converted to metres according to `GRIDUNIT`.
    pub fn from_egrid(path: impl AsRef<Path>) -> Result<Self, GridError> {
        let path = path.as_ref();
        let file = EclFile::read(path)?;

        let head = file.require("GRIDHEAD")?.as_int()?;
        let extent = |index: usize| {
            head.get(index)
                .and_then(|value| usize::try_from(*value).ok())
                .ok_or_else(|| {
                    GridError::InvalidGridSpecification(format!(
                        "GRIDHEAD item {index} is missing or negative"
                    ))
                })
        };
        let dims = GridDims::new(extent(1)?, extent(2)?, extent(3)?)?;

        let unit = match file.get("GRIDUNIT") {
            Some(keyword) => {
                let name = keyword.as_chars()?.first().cloned().unwrap_or_default();
                LengthUnit::from_keyword(&name).ok_or_else(|| {
                    GridError::InvalidGridSpecification(format!("unknown GRIDUNIT '{name}'"))
                })?
            }
            None => LengthUnit::Metres,
        };
        let scale = |mut values: Vec<f64>| {
            if unit != LengthUnit::Metres {
                let factor = unit.to_metres();
                values.iter_mut().for_each(|value| *value *= factor);
            }
            values
        };
        let coord = scale(file.require("COORD")?.to_f64_vec()?);
        let zcorn = scale(file.require("ZCORN")?.to_f64_vec()?);
        let actnum = file
            .get("ACTNUM")
            .map(|keyword| keyword.as_int().map(<[i32]>::to_vec))
            .transpose()?;

        let mut grid = Self::assemble(
            dims,
            InitPath::Egrid,
            coord,
            zcorn,
            actnum.as_deref(),
            ZcornFixup::default(),
            0.0,
        )?;

        let dual = file
            .get("FILEHEAD")
            .map(|keyword| keyword.as_int().map(|values| values.get(5) == Some(&1)))
            .transpose()?
            .unwrap_or(false);
        if dual {
            grid.porosity = PorosityMode::Dual;
        }
        if let Some(keyword) = file.get("MAPAXES") {
            let units = file
                .get("MAPUNITS")
                .map(|keyword| keyword.as_chars().map(|values| values.first().cloned()))
                .transpose()?
                .flatten();
            grid.map_axes = Some(MapAxes::from_values(
                units.as_deref(),
                &keyword.to_f64_vec()?,
            )?);
        }
        if let Some(keyword) = file.get("CORSNUM") {
            grid.coarse_cells = CoarseCell::from_corsnum(dims, keyword.as_int()?)?;
        }
        grid.rebuild_index_maps()?;
        info!(path = %path.display(), active = grid.num_active(), "loaded EGRID");
        Ok(grid)
    }

    /// Writes the grid as an EGRID file in metres.
    pub fn save_egrid(&self, path: impl AsRef<Path>) -> Result<(), GridError> {
        let mut output = EclOutput::create(path.as_ref())?;

        let mut filehead = vec![0; HEADER_LEN];
        filehead[0] = 3;
        filehead[1] = 2007;
        filehead[5] = i32::from(self.porosity == PorosityMode::Dual);
        filehead[6] = 1;
        output.write(&EclKeyword::new("FILEHEAD", EclData::Int(filehead)))?;

        if let Some(axes) = &self.map_axes {
            if let Some(unit) = axes.map_units() {
                output.write(&EclKeyword::new(
                    "MAPUNITS",
                    EclData::Char(vec![unit.as_str().to_string()]),
                ))?;
            }
            output.write(&EclKeyword::new(
                "MAPAXES",
                EclData::Real(axes.input().iter().map(|value| *value as f32).collect()),
            ))?;
        }
        output.write(&EclKeyword::new(
            "GRIDUNIT",
            EclData::Char(vec![LengthUnit::Metres.as_str().to_string(), String::new()]),
        ))?;

        let mut gridhead = vec![0; HEADER_LEN];
        gridhead[0] = 1;
        for (slot, extent) in [self.dims.nx(), self.dims.ny(), self.dims.nz()]
            .into_iter()
            .enumerate()
        {
            gridhead[slot + 1] = i32::try_from(extent).map_err(|_| {
                GridError::InvalidArgument(format!("grid extent {extent} does not fit GRIDHEAD"))
            })?;
        }
        gridhead[24] = 1;
        output.write(&EclKeyword::new("GRIDHEAD", EclData::Int(gridhead)))?;

        let real = |values: &[f64]| EclData::Real(values.iter().map(|value| *value as f32).collect());
        output.write(&EclKeyword::new("COORD", real(&self.coord)))?;
        output.write(&EclKeyword::new("ZCORN", real(&self.zcorn)))?;
        output.write(&EclKeyword::new("ACTNUM", EclData::Int(self.actnum.clone())))?;
        if !self.coarse_cells.is_empty() {
            output.write(&EclKeyword::new("CORSNUM", EclData::Int(self.corsnum())))?;
        }
        output.write(&EclKeyword::new("ENDGRID", EclData::Int(Vec::new())))?;
        output.finish()?;
        debug!(cells = self.dims.cartesian_size(), "wrote EGRID");
        Ok(())
    }

    fn assemble(
        dims: GridDims,
        init_path: InitPath,
        coord: Vec<f64>,
        mut zcorn: Vec<f64>,
        actnum: Option<&[i32]>,
        fixup: ZcornFixup,
        epsilon: f64,
    ) -> Result<Self, GridError> {
        let coord_len = 6 * (dims.nx() + 1) * (dims.ny() + 1);
        if coord.len() != coord_len {
            return Err(GridError::SizeMismatch {
                keyword: "COORD".to_string(),
                expected: coord_len,
                actual: coord.len(),
            });
        }
        let zcorn_fixed = ZcornMapper::new(dims).fixup_zcorn(&mut zcorn, fixup, epsilon)?;
        let size = dims.cartesian_size();
        let actnum = match actnum {
            Some(values) if values.len() != size => {
                return Err(GridError::SizeMismatch {
                    keyword: "ACTNUM".to_string(),
                    expected: size,
                    actual: values.len(),
                });
            }
            Some(values) => values.to_vec(),
            None => vec![1; size],
        };

        info!(
            path = init_path.as_str(),
            nx = dims.nx(),
            ny = dims.ny(),
            nz = dims.nz(),
            "creating grid"
        );
        if zcorn_fixed > 0 {
            warn!(points = zcorn_fixed, "repaired crossing ZCORN depths");
        }

        let mut grid = Self {
            dims,
            init_path,
            porosity: PorosityMode::Single,
            coord,
            zcorn,
            actnum,
            zcorn_fixed,
            map_axes: None,
            pinch: None,
            minpv: MinpvSettings::default(),
            coarse_cells: Vec::new(),
            coarse_of_cell: Vec::new(),
            global_to_active: Vec::new(),
            active_to_global: Vec::new(),
            global_to_fracture: Vec::new(),
            fracture_to_global: Vec::new(),
            active_volume: OnceLock::new(),
        };
        grid.rebuild_index_maps()?;
        Ok(grid)
    }

    fn rebuild_index_maps(&mut self) -> Result<(), GridError> {
        let size = self.dims.cartesian_size();
        self.coarse_of_cell = vec![None; size];
        for (group, cell) in self.coarse_cells.iter_mut().enumerate() {
            cell.reset();
            for &global in cell.cells() {
                self.coarse_of_cell[global] = Some(group);
            }
        }

        self.global_to_active = vec![None; size];
        self.active_to_global.clear();
        self.global_to_fracture = vec![None; size];
        self.fracture_to_global.clear();

        for global in 0..size {
            let code = self.actnum[global];
            if code <= 0 {
                continue;
            }
            let (matrix, fracture) = match self.porosity {
                PorosityMode::Single => (true, false),
                PorosityMode::Dual => (code & 1 != 0, code & 2 != 0),
            };

            match self.coarse_of_cell[global] {
                Some(group) => {
                    let cell = &mut self.coarse_cells[group];
                    cell.register_active(global, code)?;
                    if matrix {
                        let (index, fresh) = cell.matrix_index_or(self.active_to_global.len());
                        if fresh {
                            self.active_to_global.push(global);
                        }
                        self.global_to_active[global] = Some(index);
                    }
                    if fracture {
                        let (index, fresh) = cell.fracture_index_or(self.fracture_to_global.len());
                        if fresh {
                            self.fracture_to_global.push(global);
                        }
                        self.global_to_fracture[global] = Some(index);
                    }
                }
                None => {
                    if matrix {
                        self.global_to_active[global] = Some(self.active_to_global.len());
                        self.active_to_global.push(global);
                    }
                    if fracture {
                        self.global_to_fracture[global] = Some(self.fracture_to_global.len());
                        self.fracture_to_global.push(global);
                    }
                }
            }
        }
        self.active_volume = OnceLock::new();
        Ok(())
    }

    /// Replaces ACTNUM (all cells active for `None`) and rebuilds the index
    /// maps.
    pub fn reset_actnum(&mut self, actnum: Option<&[i32]>) -> Result<(), GridError> {
        let size = self.dims.cartesian_size();
        match actnum {
            Some(values) if values.len() != size => {
                return Err(GridError::SizeMismatch {
                    keyword: "ACTNUM".to_string(),
                    expected: size,
                    actual: values.len(),
                });
            }
            Some(values) => self.actnum.copy_from_slice(values),
            None => self.actnum.iter_mut().for_each(|value| *value = 1),
        }
        self.rebuild_index_maps()
    }

    pub fn set_porosity_mode(&mut self, mode: PorosityMode) -> Result<(), GridError> {
        self.porosity = mode;
        self.rebuild_index_maps()
    }

    pub fn set_coarse_cells(&mut self, cells: Vec<CoarseCell>) -> Result<(), GridError> {
        self.coarse_cells = cells;
        self.rebuild_index_maps()
    }

    pub fn set_map_axes(&mut self, map_axes: Option<MapAxes>) {
        self.map_axes = map_axes;
    }

    pub fn dims(&self) -> GridDims {
        self.dims
    }

    pub fn nx(&self) -> usize {
        self.dims.nx()
    }

    pub fn ny(&self) -> usize {
        self.dims.ny()
    }

    pub fn nz(&self) -> usize {
        self.dims.nz()
    }

    pub fn cartesian_size(&self) -> usize {
        self.dims.cartesian_size()
    }

    pub fn init_path(&self) -> InitPath {
        self.init_path
    }

    pub fn porosity_mode(&self) -> PorosityMode {
        self.porosity
    }

    pub fn coord(&self) -> &[f64] {
        &self.coord
    }

    pub fn zcorn(&self) -> &[f64] {
        &self.zcorn
    }

    pub fn actnum(&self) -> &[i32] {
        &self.actnum
    }

    /// Number of ZCORN values changed by the consistency repair.
    pub fn zcorn_fixed(&self) -> usize {
        self.zcorn_fixed
    }

    pub fn map_axes(&self) -> Option<&MapAxes> {
        self.map_axes.as_ref()
    }

    pub fn pinch(&self) -> Option<&PinchSettings> {
        self.pinch.as_ref()
    }

    pub fn minpv(&self) -> &MinpvSettings {
        &self.minpv
    }

    pub fn coarse_cells(&self) -> &[CoarseCell] {
        &self.coarse_cells
    }

    pub fn is_coarse(&self, global_index: usize) -> bool {
        self.coarse_of_cell
            .get(global_index)
            .is_some_and(Option::is_some)
    }

    fn corsnum(&self) -> Vec<i32> {
        self.coarse_of_cell
            .iter()
            .map(|group| group.map_or(0, |group| group as i32 + 1))
            .collect()
    }

    pub fn num_active(&self) -> usize {
        self.active_to_global.len()
    }

    pub fn num_active_fracture(&self) -> usize {
        self.fracture_to_global.len()
    }

    pub fn all_active(&self) -> bool {
        self.num_active() == self.cartesian_size()
    }

    pub fn global_index_ijk(&self, i: usize, j: usize, k: usize) -> Result<usize, GridError> {
        self.dims.global_index(i, j, k)
    }

    pub fn ijk(&self, global_index: usize) -> Result<[usize; 3], GridError> {
        self.dims.ijk(global_index)
    }

    /// Active index of a global cell; inactive cells are an error.
    pub fn active_index(&self, global_index: usize) -> Result<usize, GridError> {
        self.dims.check_global(global_index)?;
        self.global_to_active[global_index].ok_or(GridError::InactiveCell(global_index))
    }

    pub fn active_index_ijk(&self, i: usize, j: usize, k: usize) -> Result<usize, GridError> {
        self.active_index(self.dims.global_index(i, j, k)?)
    }

    pub fn active_fracture_index(&self, global_index: usize) -> Result<usize, GridError> {
        self.dims.check_global(global_index)?;
        self.global_to_fracture[global_index].ok_or(GridError::InactiveCell(global_index))
    }

    /// Global cell of an active index. For a coarse group this is the first
    /// active cell of the group.
    pub fn global_index(&self, active_index: usize) -> Result<usize, GridError> {
        self.active_to_global
            .get(active_index)
            .copied()
            .ok_or(GridError::IndexOutOfRange {
                kind: "active",
                index: active_index,
                size: self.active_to_global.len(),
            })
    }

    pub fn global_index_fracture(&self, fracture_index: usize) -> Result<usize, GridError> {
        self.fracture_to_global
            .get(fracture_index)
            .copied()
            .ok_or(GridError::IndexOutOfRange {
                kind: "fracture",
                index: fracture_index,
                size: self.fracture_to_global.len(),
            })
    }

    pub fn cell_active(&self, global_index: usize) -> Result<bool, GridError> {
        self.dims.check_global(global_index)?;
        Ok(self.global_to_active[global_index].is_some())
    }

    pub fn cell_active_ijk(&self, i: usize, j: usize, k: usize) -> Result<bool, GridError> {
        self.cell_active(self.dims.global_index(i, j, k)?)
    }

    pub fn active_map(&self) -> &[usize] {
        &self.active_to_global
    }

    /// Active-only view of a per-cell vector. Vectors already of active
    /// length are returned unchanged.
    pub fn compressed_vector<T: Clone>(&self, input: &[T]) -> Result<Vec<T>, GridError> {
        if input.len() == self.cartesian_size() {
            Ok(self
                .active_to_global
                .iter()
                .map(|global| input[*global].clone())
                .collect())
        } else if input.len() == self.num_active() {
            Ok(input.to_vec())
        } else {
            Err(GridError::InvalidArgument(format!(
                "vector of length {} is neither global ({}) nor active ({})",
                input.len(),
                self.cartesian_size(),
                self.num_active()
            )))
        }
    }

    pub fn cell_corners(&self, global_index: usize) -> Result<CellCorners, GridError> {
        let [i, j, k] = self.dims.ijk(global_index)?;
        CellCorners::from_arrays(self.dims, &self.coord, &self.zcorn, i, j, k)
    }

    pub fn corner_pos(&self, i: usize, j: usize, k: usize, corner: usize) -> Result<[f64; 3], GridError> {
        if corner >= 8 {
            return Err(GridError::IndexOutOfRange {
                kind: "corner",
                index: corner,
                size: 8,
            });
        }
        let corners = CellCorners::from_arrays(self.dims, &self.coord, &self.zcorn, i, j, k)?;
        Ok(corners.corner(corner))
    }

    pub fn cell_volume(&self, global_index: usize) -> Result<f64, GridError> {
        Ok(self.cell_corners(global_index)?.volume())
    }

    pub fn cell_center(&self, global_index: usize) -> Result<[f64; 3], GridError> {
        Ok(self.cell_corners(global_index)?.center())
    }

    pub fn cell_dims(&self, global_index: usize) -> Result<[f64; 3], GridError> {
        Ok(self.cell_corners(global_index)?.dims())
    }

    pub fn cell_depth(&self, global_index: usize) -> Result<f64, GridError> {
        Ok(self.cell_corners(global_index)?.depth())
    }

    pub fn cell_thickness(&self, global_index: usize) -> Result<f64, GridError> {
        Ok(self.cell_corners(global_index)?.thickness())
    }

    pub fn is_valid_cell_geometry(&self, global_index: usize) -> Result<bool, GridError> {
        Ok(self.cell_corners(global_index)?.is_valid())
    }

    /// Volumes of the active cells in active order. Computed on first use
    /// and dropped whenever ACTNUM changes.
    pub fn active_volume(&self) -> &[f64] {
        self.active_volume.get_or_init(|| {
            self.active_to_global
                .iter()
                .map(|global| {
                    self.cell_volume(*global)
                        .unwrap_or_default()
                })
                .collect()
        })
    }
}

fn cell_sizes(
    deck: &Deck,
    dims: GridDims,
    axis: usize,
    cell_keyword: &str,
    axis_keyword: &str,
) -> Result<Vec<f64>, GridError> {
    match deck.get_keyword(cell_keyword) {
        Some(keyword) => cartesian::expand_top_layers(dims, cell_keyword, keyword.data_f64()?),
        None => {
            let values = deck.require_keyword(axis_keyword)?.data_f64()?;
            cartesian::scatter_axis(dims, axis, axis_keyword, &values)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{EclipseGrid, InitPath, PorosityMode};
    use crate::deck::Deck;
    use crate::grid::{CoarseCell, GridDims, GridError};

    fn grid_2x2x1(actnum: &[i32]) -> EclipseGrid {
        let dims = GridDims::new(2, 2, 1).expect("dims");
        let mut grid = EclipseGrid::uniform(dims, [1.0, 1.0, 1.0], 0.0).expect("uniform grid");
        grid.reset_actnum(Some(actnum)).expect("actnum size matches");
        grid
    }

    #[test]
    fn inactive_cells_are_skipped_by_the_index_maps() {
        let grid = grid_2x2x1(&[1, 1, 0, 1]);
        assert_eq!(grid.num_active(), 3);
        assert!(matches!(grid.active_index(2), Err(GridError::InactiveCell(2))));
        assert_eq!(grid.global_index(2).expect("third active cell"), 3);
        assert_eq!(grid.active_index(3).expect("active"), 2);
        assert!(matches!(
            grid.global_index(3),
            Err(GridError::IndexOutOfRange { kind: "active", .. })
        ));
        assert!(!grid.cell_active(2).expect("in range"));
        assert!(grid.cell_active(9).is_err());
        assert!(!grid.all_active());
    }

    #[test]
    fn compressed_vector_filters_or_passes_through() {
        let grid = grid_2x2x1(&[1, 0, 1, 1]);
        let compressed = grid
            .compressed_vector(&[10, 20, 30, 40])
            .expect("global length");
        assert_eq!(compressed, vec![10, 30, 40]);
        assert_eq!(
            grid.compressed_vector(&compressed).expect("active length"),
            compressed
        );
        assert!(matches!(
            grid.compressed_vector(&[1, 2]),
            Err(GridError::InvalidArgument(_))
        ));
    }

    #[test]
    fn active_volume_is_recomputed_after_reset() {
        let mut grid = grid_2x2x1(&[1, 1, 1, 1]);
        assert!(grid.all_active());
        assert_eq!(grid.active_volume().len(), 4);
        assert!((grid.active_volume()[0] - 1.0).abs() < 1e-12);
        grid.reset_actnum(Some(&[0, 0, 0, 1])).expect("size matches");
        assert_eq!(grid.active_volume().len(), 1);
        assert!(grid.reset_actnum(Some(&[1])).is_err());
        grid.reset_actnum(None).expect("all active");
        assert_eq!(grid.num_active(), 4);
    }

    #[test]
    fn cell_queries_use_corner_geometry() {
        let dims = GridDims::new(2, 1, 2).expect("dims");
        let grid = EclipseGrid::uniform(dims, [10.0, 20.0, 5.0], 1000.0).expect("grid");
        let global = grid.global_index_ijk(1, 0, 1).expect("in range");
        assert_eq!(grid.cell_center(global).expect("center"), [15.0, 10.0, 1007.5]);
        assert_eq!(grid.cell_dims(global).expect("dims"), [10.0, 20.0, 5.0]);
        assert!((grid.cell_volume(global).expect("volume") - 1000.0).abs() < 1e-9);
        assert_eq!(grid.cell_depth(global).expect("depth"), 1007.5);
        assert_eq!(grid.cell_thickness(global).expect("thickness"), 5.0);
        assert_eq!(grid.corner_pos(0, 0, 0, 7).expect("corner"), [10.0, 20.0, 1005.0]);
        assert!(grid.corner_pos(0, 0, 0, 8).is_err());
        assert!(grid.corner_pos(2, 0, 0, 0).is_err());
        assert!(grid.is_valid_cell_geometry(global).expect("in range"));
        assert_eq!(grid.init_path(), InitPath::Uniform);
    }

    #[test]
    fn coarse_groups_share_one_active_index() {
        let dims = GridDims::new(3, 1, 1).expect("dims");
        let mut grid = EclipseGrid::uniform(dims, [1.0; 3], 0.0).expect("grid");
        let group = CoarseCell::new(dims, [0, 0, 0], [1, 0, 0], vec![0, 1]).expect("box");
        grid.set_coarse_cells(vec![group]).expect("consistent codes");
        assert_eq!(grid.num_active(), 2);
        assert_eq!(grid.active_index(0).expect("active"), 0);
        assert_eq!(grid.active_index(1).expect("active"), 0);
        assert_eq!(grid.active_index(2).expect("active"), 1);
        assert_eq!(grid.global_index(0).expect("group"), 0);
        assert!(grid.is_coarse(1));

        grid.reset_actnum(Some(&[0, 1, 1])).expect("first cell inactive");
        assert_eq!(grid.global_index(0).expect("group"), 1);
    }

    #[test]
    fn mixed_codes_in_a_coarse_group_fail() {
        let dims = GridDims::new(2, 1, 1).expect("dims");
        let mut grid = EclipseGrid::uniform(dims, [1.0; 3], 0.0).expect("grid");
        grid.set_porosity_mode(PorosityMode::Dual).expect("all matrix");
        let group = CoarseCell::new(dims, [0, 0, 0], [1, 0, 0], vec![0, 1]).expect("box");
        grid.set_coarse_cells(vec![group]).expect("same codes");
        assert!(matches!(
            grid.reset_actnum(Some(&[1, 3])),
            Err(GridError::CoarseCell(_))
        ));
    }

    #[test]
    fn dual_porosity_splits_matrix_and_fracture() {
        let dims = GridDims::new(3, 1, 1).expect("dims");
        let mut grid = EclipseGrid::uniform(dims, [1.0; 3], 0.0).expect("grid");
        grid.set_porosity_mode(PorosityMode::Dual).expect("mode");
        grid.reset_actnum(Some(&[1, 2, 3])).expect("size matches");
        assert_eq!(grid.num_active(), 2);
        assert_eq!(grid.num_active_fracture(), 2);
        assert!(grid.active_index(1).is_err());
        assert_eq!(grid.active_fracture_index(2).expect("fracture"), 1);
        assert_eq!(grid.global_index_fracture(0).expect("fracture"), 1);
    }

    #[test]
    fn deck_selects_the_construction_path() {
        let deck = Deck::parse(
            "DIMENS\n 2 1 1 /\nGRID\nDXV\n 2*10 /\nDYV\n 5 /\nDZV\n 2 /\nDEPTHZ\n 6*100 /\nACTNUM\n 1 0 /\n",
        )
        .expect("deck should parse");
        let grid = EclipseGrid::from_deck(&deck).expect("grid");
        assert_eq!(grid.init_path(), InitPath::DepthVectors);
        assert_eq!(grid.num_active(), 1);
        assert!((grid.cell_volume(1).expect("volume") - 100.0).abs() < 1e-9);

        let deck = Deck::parse(
            "DIMENS\n 2 1 2 /\nGRID\nDX\n 2*10 /\nDY\n 2*5 /\nDZ\n 4*2 /\nTOPS\n 2*100 /\n",
        )
        .expect("deck should parse");
        let grid = EclipseGrid::from_deck(&deck).expect("grid");
        assert_eq!(grid.init_path(), InitPath::CellSizes);
        assert_eq!(grid.cell_depth(3).expect("depth"), 103.0);

        let deck = Deck::parse("DIMENS\n 1 1 1 /\nRADIAL\nGRID\nDXV\n 1 /\n")
            .expect("deck should parse");
        assert!(matches!(
            EclipseGrid::from_deck(&deck),
            Err(GridError::InvalidGridSpecification(_))
        ));
        let deck = Deck::parse("DIMENS\n 1 1 1 /\nGRID\nDXV\n 1 /\n").expect("deck should parse");
        assert!(matches!(
            EclipseGrid::from_deck(&deck),
            Err(GridError::InvalidGridSpecification(_))
        ));
    }

    #[test]
    fn deck_vectors_of_the_wrong_size_name_the_keyword() {
        let deck = Deck::parse(
            "DIMENS\n 1 1 1 /\nGRID\nCOORD\n 6*0 /\nZCORN\n 8*0 /\n",
        )
        .expect("deck should parse");
        let error = EclipseGrid::from_deck(&deck).expect_err("COORD is too short");
        assert!(
            matches!(error, GridError::SizeMismatch { ref keyword, expected: 24, actual: 6 } if keyword == "COORD")
        );
    }
}
