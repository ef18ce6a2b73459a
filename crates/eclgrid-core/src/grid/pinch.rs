use super::GridError;
use crate::deck::Deck;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PinchMode {
    All,
    Top,
    TopBot,
    Gap,
    NoGap,
}

impl PinchMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "ALL",
            Self::Top => "TOP",
            Self::TopBot => "TOPBOT",
            Self::Gap => "GAP",
            Self::NoGap => "NOGAP",
        }
    }
}

impl FromStr for PinchMode {
    type Err = GridError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "ALL" => Ok(Self::All),
            "TOP" => Ok(Self::Top),
            "TOPBOT" => Ok(Self::TopBot),
            "GAP" => Ok(Self::Gap),
            "NOGAP" => Ok(Self::NoGap),
            other => Err(GridError::InvalidArgument(format!(
                "unknown pinch option '{other}'"
            ))),
        }
    }
}

impl Display for PinchMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options of the `PINCH` keyword.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinchSettings {
    pub threshold_thickness: f64,
    pub gap_mode: PinchMode,
    pub max_empty_gap: f64,
    pub pinchout_mode: PinchMode,
    pub multz_mode: PinchMode,
}

impl Default for PinchSettings {
    fn default() -> Self {
        Self {
            threshold_thickness: 0.001,
            gap_mode: PinchMode::Gap,
            max_empty_gap: 1.0e20,
            pinchout_mode: PinchMode::TopBot,
            multz_mode: PinchMode::Top,
        }
    }
}

impl PinchSettings {
    pub fn with_threshold(threshold_thickness: f64) -> Self {
        Self {
            threshold_thickness,
            ..Self::default()
        }
    }

    pub fn from_deck(deck: &Deck) -> Result<Option<Self>, GridError> {
        let Some(keyword) = deck.get_keyword("PINCH") else {
            return Ok(None);
        };
        let mut settings = Self::default();
        let Some(record) = keyword.record(0) else {
            return Ok(Some(settings));
        };
        if let Some(threshold) = record.double(0) {
            settings.threshold_thickness = threshold;
        }
        if let Some(gap) = record.string(1) {
            settings.gap_mode = gap.parse()?;
        }
        if let Some(max_gap) = record.double(2) {
            settings.max_empty_gap = max_gap;
        }
        if let Some(pinchout) = record.string(3) {
            settings.pinchout_mode = pinchout.parse()?;
        }
        if let Some(multz) = record.string(4) {
            settings.multz_mode = multz.parse()?;
        }
        Ok(Some(settings))
    }

    /// Whether cells across an inactive gap may still be connected.
    pub fn bridges_gaps(&self) -> bool {
        self.gap_mode == PinchMode::Gap
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MinpvMode {
    #[default]
    Inactive,
    /// `MINPV` or `MINPVV`: cells below the limit are deactivated.
    Standard,
    /// `MINPVFIL`: cells below the limit stay active but are merged.
    Filter,
}

/// Minimum pore volume limits per global cell.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MinpvSettings {
    mode: MinpvMode,
    values: Vec<f64>,
}

impl MinpvSettings {
    pub fn scalar(mode: MinpvMode, limit: f64, cartesian_size: usize) -> Self {
        Self {
            mode,
            values: vec![limit; cartesian_size],
        }
    }

    pub fn from_deck(deck: &Deck, cartesian_size: usize) -> Result<Self, GridError> {
        if deck.has_keyword("MINPV") && deck.has_keyword("MINPVFIL") {
            return Err(GridError::InvalidGridSpecification(
                "MINPV and MINPVFIL can not both be given".to_string(),
            ));
        }
        let scalar = |name: &str| -> Result<Option<f64>, GridError> {
            let Some(keyword) = deck.get_keyword(name) else {
                return Ok(None);
            };
            keyword
                .record(0)
                .and_then(|record| record.double(0))
                .map(Some)
                .ok_or_else(|| {
                    GridError::InvalidGridSpecification(format!("{name} needs a value"))
                })
        };

        if let Some(limit) = scalar("MINPV")? {
            return Ok(Self::scalar(MinpvMode::Standard, limit, cartesian_size));
        }
        if let Some(keyword) = deck.get_keyword("MINPVV") {
            let values = keyword.data_f64()?;
            if values.len() != cartesian_size {
                return Err(GridError::SizeMismatch {
                    keyword: "MINPVV".to_string(),
                    expected: cartesian_size,
                    actual: values.len(),
                });
            }
            return Ok(Self {
                mode: MinpvMode::Standard,
                values,
            });
        }
        if let Some(limit) = scalar("MINPVFIL")? {
            return Ok(Self::scalar(MinpvMode::Filter, limit, cartesian_size));
        }
        Ok(Self {
            mode: MinpvMode::Inactive,
            values: vec![0.0; cartesian_size],
        })
    }

    pub fn mode(&self) -> MinpvMode {
        self.mode
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Replaces every limit with `limit`, switching the mode to standard.
    pub fn override_limit(&mut self, limit: f64) {
        self.mode = MinpvMode::Standard;
        self.values.iter_mut().for_each(|value| *value = limit);
    }
}

#[cfg(test)]
mod tests {
    use super::{MinpvMode, MinpvSettings, PinchMode, PinchSettings};
    use crate::deck::Deck;
    use crate::grid::GridError;

    #[test]
    fn pinch_options_are_parsed_with_defaults() {
        let deck = Deck::parse("GRID\nPINCH\n 0.5 NOGAP 1* ALL /\n").expect("deck should parse");
        let settings = PinchSettings::from_deck(&deck)
            .expect("options are valid")
            .expect("PINCH is present");
        assert_eq!(settings.threshold_thickness, 0.5);
        assert_eq!(settings.gap_mode, PinchMode::NoGap);
        assert_eq!(settings.max_empty_gap, 1.0e20);
        assert_eq!(settings.pinchout_mode, PinchMode::All);
        assert_eq!(settings.multz_mode, PinchMode::Top);
        assert!(!settings.bridges_gaps());

        assert!(PinchSettings::from_deck(&Deck::new()).expect("no PINCH").is_none());
        assert!("SIDEWAYS".parse::<PinchMode>().is_err());
    }

    #[test]
    fn minpv_and_minpvfil_are_exclusive() {
        let deck = Deck::parse("GRID\nMINPV\n 10 /\nMINPVFIL\n 5 /\n").expect("deck should parse");
        assert!(matches!(
            MinpvSettings::from_deck(&deck, 4),
            Err(GridError::InvalidGridSpecification(_))
        ));
    }

    #[test]
    fn minpv_limits_cover_every_cell() {
        let deck = Deck::parse("GRID\nMINPV\n 10 /\n").expect("deck should parse");
        let settings = MinpvSettings::from_deck(&deck, 3).expect("valid");
        assert_eq!(settings.mode(), MinpvMode::Standard);
        assert_eq!(settings.values(), &[10.0, 10.0, 10.0]);

        let deck = Deck::parse("GRID\nMINPVV\n 1 2 3 /\n").expect("deck should parse");
        let settings = MinpvSettings::from_deck(&deck, 3).expect("valid");
        assert_eq!(settings.values(), &[1.0, 2.0, 3.0]);
        assert!(MinpvSettings::from_deck(&deck, 4).is_err());

        let mut settings = MinpvSettings::from_deck(&Deck::new(), 2).expect("valid");
        assert_eq!(settings.mode(), MinpvMode::Inactive);
        settings.override_limit(7.0);
        assert_eq!(settings.values(), &[7.0, 7.0]);
    }
}
