//! COORD/ZCORN assembly for grids given by cell sizes instead of corner
//! points.

use super::GridError;
use super::dims::GridDims;
use super::zcorn::ZcornMapper;

/// Stacked TOPS values closer than this to the layer above are snapped to it.
pub const TOPS_TOLERANCE: f64 = 1.0e-6;

fn check_len(keyword: &str, values: &[f64], expected: usize) -> Result<(), GridError> {
    if values.len() != expected {
        return Err(GridError::SizeMismatch {
            keyword: keyword.to_string(),
            expected,
            actual: values.len(),
        });
    }
    Ok(())
}

fn partial_sums(values: &[f64]) -> Vec<f64> {
    let mut sums = Vec::with_capacity(values.len() + 1);
    sums.push(0.0);
    let mut total = 0.0;
    for value in values {
        total += value;
        sums.push(total);
    }
    sums
}

/// Vertical pillars from per-column sizes and the `(nx + 1) * (ny + 1)`
/// pillar top depths.
pub fn from_dxv(
    dims: GridDims,
    dxv: &[f64],
    dyv: &[f64],
    dzv: &[f64],
    depthz: &[f64],
) -> Result<(Vec<f64>, Vec<f64>), GridError> {
    let (nx, ny, nz) = (dims.nx(), dims.ny(), dims.nz());
    check_len("DXV", dxv, nx)?;
    check_len("DYV", dyv, ny)?;
    check_len("DZV", dzv, nz)?;
    check_len("DEPTHZ", depthz, (nx + 1) * (ny + 1))?;

    let x = partial_sums(dxv);
    let y = partial_sums(dyv);
    let z = partial_sums(dzv);

    let mut coord = Vec::with_capacity(6 * (nx + 1) * (ny + 1));
    for j in 0..=ny {
        for i in 0..=nx {
            let top = depthz[i + j * (nx + 1)];
            coord.extend_from_slice(&[x[i], y[j], top, x[i], y[j], top + z[nz]]);
        }
    }

    let mapper = ZcornMapper::new(dims);
    let mut zcorn = vec![0.0; mapper.size()];
    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                let corners = mapper.cell_indices(i, j, k)?;
                for (c, index) in corners.iter().enumerate() {
                    let pillar = (i + (c & 1)) + (j + ((c >> 1) & 1)) * (nx + 1);
                    let layer = if c < 4 { z[k] } else { z[k + 1] };
                    zcorn[*index] = depthz[pillar] + layer;
                }
            }
        }
    }
    Ok((coord, zcorn))
}

/// A box grid of identical cells whose top face lies at depth `top`.
pub fn uniform(dims: GridDims, size: [f64; 3], top: f64) -> (Vec<f64>, Vec<f64>) {
    let (nx, ny, nz) = (dims.nx(), dims.ny(), dims.nz());
    let x = partial_sums(&vec![size[0]; nx]);
    let y = partial_sums(&vec![size[1]; ny]);
    let z = partial_sums(&vec![size[2]; nz]);

    let mut coord = Vec::with_capacity(6 * (nx + 1) * (ny + 1));
    for &yj in &y {
        for &xi in &x {
            coord.extend_from_slice(&[xi, yj, top, xi, yj, top + z[nz]]);
        }
    }

    let layer = 4 * nx * ny;
    let mut zcorn = Vec::with_capacity(8 * dims.cartesian_size());
    for k in 0..nz {
        zcorn.extend(std::iter::repeat_n(top + z[k], layer));
        zcorn.extend(std::iter::repeat_n(top + z[k + 1], layer));
    }
    (coord, zcorn)
}

/// Extends a cell keyword given for the top layers only: missing layers
/// repeat the layer above.
pub fn expand_top_layers(
    dims: GridDims,
    keyword: &str,
    mut values: Vec<f64>,
) -> Result<Vec<f64>, GridError> {
    let area = dims.layer_size();
    let volume = dims.cartesian_size();
    if values.len() >= area && values.len() < volume {
        for target in values.len()..volume {
            let source = values[target - area];
            values.push(source);
        }
    }
    check_len(keyword, &values, volume)?;
    Ok(values)
}

/// Spreads a per-axis vector (`DXV` along i, `DYV` along j, `DZV` along k)
/// over every cell.
pub fn scatter_axis(
    dims: GridDims,
    axis: usize,
    keyword: &str,
    values: &[f64],
) -> Result<Vec<f64>, GridError> {
    let extent = [dims.nx(), dims.ny(), dims.nz()];
    let expected = *extent.get(axis).ok_or(GridError::IndexOutOfRange {
        kind: "axis",
        index: axis,
        size: 3,
    })?;
    check_len(keyword, values, expected)?;
    let mut cells = Vec::with_capacity(dims.cartesian_size());
    for k in 0..dims.nz() {
        for j in 0..dims.ny() {
            for i in 0..dims.nx() {
                cells.push(values[[i, j, k][axis]]);
            }
        }
    }
    Ok(cells)
}

/// Completes TOPS below the given layers by stacking `dz`; explicit values
/// within [`TOPS_TOLERANCE`] of the stacked depth are snapped to it.
pub fn stack_tops(dims: GridDims, mut tops: Vec<f64>, dz: &[f64]) -> Result<Vec<f64>, GridError> {
    let area = dims.layer_size();
    let volume = dims.cartesian_size();
    check_len("DZ", dz, volume)?;
    if tops.len() >= area {
        let given = tops.len();
        tops.resize(volume, 0.0);
        for target in area..volume {
            let source = target - area;
            let stacked = tops[source] + dz[source];
            if target >= given || (stacked - tops[target]).abs() < TOPS_TOLERANCE {
                tops[target] = stacked;
            }
        }
    }
    check_len("TOPS", &tops, volume)?;
    Ok(tops)
}

/// Pillars and corner depths from full per-cell `DX`, `DY`, `DZ` and `TOPS`.
/// Pillar positions follow the cumulative sizes of the neighbouring column
/// on the top and bottom layers; each column keeps its own depths.
pub fn from_cell_sizes(
    dims: GridDims,
    dx: &[f64],
    dy: &[f64],
    dz: &[f64],
    tops: &[f64],
) -> Result<(Vec<f64>, Vec<f64>), GridError> {
    let (nx, ny, nz) = (dims.nx(), dims.ny(), dims.nz());
    let volume = dims.cartesian_size();
    for (keyword, values) in [("DX", dx), ("DY", dy), ("DZ", dz), ("TOPS", tops)] {
        check_len(keyword, values, volume)?;
    }

    let cell = |i: usize, j: usize, k: usize| i + j * nx + k * nx * ny;
    // x of pillar column i along row j on layer k
    let x_at = |i: usize, j: usize, k: usize| (0..i).map(|ii| dx[cell(ii, j, k)]).sum::<f64>();
    let y_at = |i: usize, j: usize, k: usize| (0..j).map(|jj| dy[cell(i, jj, k)]).sum::<f64>();
    let column_height = |i: usize, j: usize| (0..nz).map(|k| dz[cell(i, j, k)]).sum::<f64>();

    let mut coord = Vec::with_capacity(6 * (nx + 1) * (ny + 1));
    for pj in 0..=ny {
        for pi in 0..=nx {
            let (ci, cj) = (pi.min(nx - 1), pj.min(ny - 1));
            let top = tops[cell(ci, cj, 0)];
            let bottom = top + column_height(ci, cj);
            coord.extend_from_slice(&[
                x_at(pi, cj, 0),
                y_at(ci, pj, 0),
                top,
                x_at(pi, cj, nz - 1),
                y_at(ci, pj, nz - 1),
                bottom,
            ]);
        }
    }

    let mapper = ZcornMapper::new(dims);
    let mut zcorn = vec![0.0; mapper.size()];
    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                let global = cell(i, j, k);
                let top = tops[global];
                let bottom = top + dz[global];
                let corners = mapper.cell_indices(i, j, k)?;
                for (c, index) in corners.iter().enumerate() {
                    zcorn[*index] = if c < 4 { top } else { bottom };
                }
            }
        }
    }
    Ok((coord, zcorn))
}
