use super::GridError;
use super::coord::CoordMapper;
use super::dims::GridDims;
use super::zcorn::ZcornMapper;

const MAX_COORDINATE: f64 = 1.0e20;
const MIN_PILLAR_SEPARATION: f64 = 1.0e-4;

/// The eight corners of one cell. Corners 0-3 form the top face and 4-7 the
/// bottom face; within a face i runs fastest, then j.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellCorners {
    pub x: [f64; 8],
    pub y: [f64; 8],
    pub z: [f64; 8],
}

impl CellCorners {
    /// Corners of cell (i, j, k), interpolated along its four pillars to the
    /// ZCORN depths.
    pub fn from_arrays(
        dims: GridDims,
        coord: &[f64],
        zcorn: &[f64],
        i: usize,
        j: usize,
        k: usize,
    ) -> Result<Self, GridError> {
        let pillars = CoordMapper::new(dims).column_pillars(i, j);
        let depths = ZcornMapper::new(dims).cell_indices(i, j, k)?;
        let mut corners = Self {
            x: [0.0; 8],
            y: [0.0; 8],
            z: [0.0; 8],
        };
        for c in 0..8 {
            let depth = *zcorn.get(depths[c]).ok_or(GridError::IndexOutOfRange {
                kind: "ZCORN",
                index: depths[c],
                size: zcorn.len(),
            })?;
            let offset = pillars[c % 4];
            let pillar = coord.get(offset..offset + 6).ok_or(GridError::IndexOutOfRange {
                kind: "COORD",
                index: offset,
                size: coord.len(),
            })?;
            let (x, y) = interpolate_pillar(pillar, depth);
            corners.x[c] = x;
            corners.y[c] = y;
            corners.z[c] = depth;
        }
        Ok(corners)
    }

    pub fn corner(&self, c: usize) -> [f64; 3] {
        [self.x[c], self.y[c], self.z[c]]
    }

    pub fn center(&self) -> [f64; 3] {
        mean_of(self, &[0, 1, 2, 3, 4, 5, 6, 7])
    }

    pub fn depth(&self) -> f64 {
        self.z.iter().sum::<f64>() / 8.0
    }

    /// Difference between the mean bottom and mean top depth.
    pub fn thickness(&self) -> f64 {
        let top = self.z[..4].iter().sum::<f64>() / 4.0;
        let bottom = self.z[4..].iter().sum::<f64>() / 4.0;
        (bottom - top).abs()
    }

    /// Extent along i, j and k measured between opposite face centroids.
    pub fn dims(&self) -> [f64; 3] {
        let horizontal = |low: [usize; 4], high: [usize; 4]| {
            let a = mean_of(self, &low);
            let b = mean_of(self, &high);
            (b[0] - a[0]).hypot(b[1] - a[1])
        };
        [
            horizontal([0, 2, 4, 6], [1, 3, 5, 7]),
            horizontal([0, 1, 4, 5], [2, 3, 6, 7]),
            self.thickness(),
        ]
    }

    /// Volume of the trilinear hexahedron, integrated with a 2x2x2 Gauss
    /// rule, which is exact for this element.
    pub fn volume(&self) -> f64 {
        let offset = 0.5 / 3f64.sqrt();
        let points = [0.5 - offset, 0.5 + offset];
        let mut total = 0.0;
        for &u in &points {
            for &v in &points {
                for &w in &points {
                    total += self.jacobian_determinant(u, v, w);
                }
            }
        }
        (total / 8.0).abs()
    }

    fn jacobian_determinant(&self, u: f64, v: f64, w: f64) -> f64 {
        let mut jacobian = [[0.0; 3]; 3];
        for c in 0..8 {
            let (bu, bv, bw) = (c & 1, (c >> 1) & 1, (c >> 2) & 1);
            let lu = if bu == 1 { u } else { 1.0 - u };
            let lv = if bv == 1 { v } else { 1.0 - v };
            let lw = if bw == 1 { w } else { 1.0 - w };
            let su = if bu == 1 { 1.0 } else { -1.0 };
            let sv = if bv == 1 { 1.0 } else { -1.0 };
            let sw = if bw == 1 { 1.0 } else { -1.0 };
            let gradient = [su * lv * lw, lu * sv * lw, lu * lv * sw];
            let point = self.corner(c);
            for (row, value) in point.iter().enumerate() {
                for (column, g) in gradient.iter().enumerate() {
                    jacobian[row][column] += value * g;
                }
            }
        }
        let [a, b, c] = jacobian;
        a[0] * (b[1] * c[2] - b[2] * c[1]) - a[1] * (b[0] * c[2] - b[2] * c[0])
            + a[2] * (b[0] * c[1] - b[1] * c[0])
    }

    /// Finite coordinates and at least one pillar with separated top and
    /// bottom corners.
    pub fn is_valid(&self) -> bool {
        let finite = self
            .x
            .iter()
            .chain(&self.y)
            .chain(&self.z)
            .all(|value| value.is_finite() && value.abs() < MAX_COORDINATE);
        if !finite {
            return false;
        }
        (0..4)
            .map(|c| {
                let top = self.corner(c);
                let bottom = self.corner(c + 4);
                ((bottom[0] - top[0]).powi(2)
                    + (bottom[1] - top[1]).powi(2)
                    + (bottom[2] - top[2]).powi(2))
                .sqrt()
            })
            .fold(0.0, f64::max)
            > MIN_PILLAR_SEPARATION
    }
}

fn mean_of(corners: &CellCorners, indices: &[usize]) -> [f64; 3] {
    let n = indices.len() as f64;
    let mut sum = [0.0; 3];
    for &c in indices {
        let point = corners.corner(c);
        for axis in 0..3 {
            sum[axis] += point[axis];
        }
    }
    sum.map(|value| value / n)
}

/// Horizontal position on a pillar `[xt, yt, zt, xb, yb, zb]` at `depth`.
pub(crate) fn interpolate_pillar(pillar: &[f64], depth: f64) -> (f64, f64) {
    let (xt, yt, zt) = (pillar[0], pillar[1], pillar[2]);
    let (xb, yb, zb) = (pillar[3], pillar[4], pillar[5]);
    if zt == zb {
        return (xt, yt);
    }
    let t = (zt - depth) / (zt - zb);
    (xt + (xb - xt) * t, yt + (yb - yt) * t)
}
