use crate::deck::Deck;
use crate::domain::LengthUnit;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MapAxesError {
    #[error("MAPAXES needs 6 values, found {0}")]
    WrongLength(usize),
    #[error("MAPAXES control points are collinear")]
    Degenerate,
    #[error("MAPAXES control points coincide")]
    CoincidentPoints,
    #[error("unsupported MAPUNITS value '{0}'")]
    UnknownUnit(String),
}

/// Affine transform between local grid coordinates and map coordinates,
/// defined by a point on the y axis, the origin and a point on the x axis.
#[derive(Debug, Clone, PartialEq)]
pub struct MapAxes {
    map_units: Option<LengthUnit>,
    input: [f64; 6],
    origin: [f64; 2],
    unit_x: [f64; 2],
    unit_y: [f64; 2],
    inv_norm: f64,
}

impl MapAxes {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64, x3: f64, y3: f64) -> Result<Self, MapAxesError> {
        Self::with_units(None, [x1, y1, x2, y2, x3, y3])
    }

    /// `input` is `[X1, Y1, X2, Y2, X3, Y3]` with (X2, Y2) the origin.
    pub fn with_units(map_units: Option<LengthUnit>, input: [f64; 6]) -> Result<Self, MapAxesError> {
        let factor = map_units.map_or(1.0, LengthUnit::to_metres);
        let [x1, y1, x2, y2, x3, y3] = input;
        let unit_x = normalize(x3 - x2, y3 - y2)?;
        let unit_y = normalize(x1 - x2, y1 - y2)?;
        let cross = unit_x[0] * unit_y[1] - unit_x[1] * unit_y[0];
        if cross.abs() < 1e-12 {
            return Err(MapAxesError::Degenerate);
        }
        Ok(Self {
            map_units,
            input,
            origin: [factor * x2, factor * y2],
            unit_x,
            unit_y,
            inv_norm: 1.0 / cross,
        })
    }

    pub fn from_values(map_units: Option<&str>, values: &[f64]) -> Result<Self, MapAxesError> {
        let input: [f64; 6] = values
            .try_into()
            .map_err(|_| MapAxesError::WrongLength(values.len()))?;
        let units = map_units
            .map(|unit| {
                LengthUnit::from_keyword(unit)
                    .ok_or_else(|| MapAxesError::UnknownUnit(unit.to_string()))
            })
            .transpose()?;
        Self::with_units(units, input)
    }

    /// `MAPAXES` with optional `MAPUNITS`, or `None` when the deck has no axes.
    pub fn from_deck(deck: &Deck) -> Result<Option<Self>, MapAxesError> {
        let Some(keyword) = deck.get_keyword("MAPAXES") else {
            return Ok(None);
        };
        let values: Vec<f64> = keyword
            .record(0)
            .map(|record| record.items().iter().filter_map(|item| item.as_f64()).collect())
            .unwrap_or_default();
        let units = deck
            .get_keyword("MAPUNITS")
            .and_then(|keyword| keyword.record(0))
            .and_then(|record| record.string(0));
        Self::from_values(units, &values).map(Some)
    }

    pub fn map_units(&self) -> Option<LengthUnit> {
        self.map_units
    }

    /// The six raw control point values.
    pub fn input(&self) -> [f64; 6] {
        self.input
    }

    pub fn origin(&self) -> [f64; 2] {
        self.origin
    }

    /// Local grid coordinates to map coordinates.
    pub fn transform(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.origin[0] + x * self.unit_x[0] + y * self.unit_y[0],
            self.origin[1] + x * self.unit_x[1] + y * self.unit_y[1],
        )
    }

    /// Map coordinates back to local grid coordinates.
    pub fn inv_transform(&self, x: f64, y: f64) -> (f64, f64) {
        let dx = x - self.origin[0];
        let dy = y - self.origin[1];
        (
            (dx * self.unit_y[1] - dy * self.unit_y[0]) * self.inv_norm,
            (-dx * self.unit_x[1] + dy * self.unit_x[0]) * self.inv_norm,
        )
    }
}

fn normalize(dx: f64, dy: f64) -> Result<[f64; 2], MapAxesError> {
    let length = dx.hypot(dy);
    if length == 0.0 || !length.is_finite() {
        return Err(MapAxesError::CoincidentPoints);
    }
    Ok([dx / length, dy / length])
}

#[cfg(test)]
mod tests {
    use super::{MapAxes, MapAxesError};
    use crate::deck::Deck;
    use crate::domain::LengthUnit;

    fn assert_close(actual: (f64, f64), expected: (f64, f64)) {
        let scale = expected.0.abs().max(expected.1.abs()).max(1.0);
        assert!((actual.0 - expected.0).abs() <= 1e-9 * scale, "{actual:?} vs {expected:?}");
        assert!((actual.1 - expected.1).abs() <= 1e-9 * scale, "{actual:?} vs {expected:?}");
    }

    #[test]
    fn axis_aligned_axes_translate_only() {
        let error = MapAxes::new(0.0, 0.0, 1.0, 1.0, 2.0, 2.0).expect_err("points are collinear");
        assert_eq!(error, MapAxesError::Degenerate);
        assert_eq!(
            MapAxes::new(1.0, 1.0, 1.0, 1.0, 2.0, 2.0),
            Err(MapAxesError::CoincidentPoints)
        );

        let axes = MapAxes::new(100.0, 201.0, 100.0, 200.0, 101.0, 200.0).expect("axes are valid");
        assert_close(axes.transform(5.0, 7.0), (105.0, 207.0));
    }

    #[test]
    fn rotated_axes_round_trip() {
        let axes = MapAxes::new(0.0, 10.0, 3.0, 4.0, 8.0, -1.0).expect("axes are valid");
        for point in [(0.0, 0.0), (12.5, -3.25), (1.0e5, 2.0e5)] {
            let mapped = axes.transform(point.0, point.1);
            assert_close(axes.inv_transform(mapped.0, mapped.1), point);
        }
    }

    #[test]
    fn feet_scale_the_origin() {
        let axes = MapAxes::with_units(Some(LengthUnit::Feet), [10.0, 1.0, 10.0, 0.0, 11.0, 0.0])
            .expect("axes are valid");
        assert_close(axes.transform(0.0, 0.0), (3.048, 0.0));
        assert_eq!(axes.input()[0], 10.0);
        assert_eq!(axes.map_units(), Some(LengthUnit::Feet));
    }

    #[test]
    fn deck_values_are_read_with_units() {
        let deck = Deck::parse("MAPUNITS\n 'FEET' /\nMAPAXES\n 0 100 0 0 100 0 /\n")
            .expect("deck should parse");
        let axes = MapAxes::from_deck(&deck)
            .expect("axes should be valid")
            .expect("axes should be present");
        assert_eq!(axes.map_units(), Some(LengthUnit::Feet));
        assert!(MapAxes::from_deck(&Deck::new()).expect("no axes").is_none());
        assert_eq!(
            MapAxes::from_values(None, &[1.0, 2.0]),
            Err(MapAxesError::WrongLength(2))
        );
        assert_eq!(
            MapAxes::from_values(Some("FURLONG"), &[0.0, 1.0, 0.0, 0.0, 1.0, 0.0]),
            Err(MapAxesError::UnknownUnit("FURLONG".to_string()))
        );
    }
}
