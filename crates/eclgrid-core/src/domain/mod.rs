pub mod errors;

pub use errors::{EclError, EclResult, ErrorCategory};

use std::fmt::{Display, Formatter};

/// Unit system a length-carrying keyword was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LengthUnit {
    #[default]
    Metres,
    Feet,
    Centimetres,
}

impl LengthUnit {
    pub fn from_keyword(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "METRES" | "METERS" | "M" | "" => Some(Self::Metres),
            "FEET" | "FT" => Some(Self::Feet),
            "CM" => Some(Self::Centimetres),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Metres => "METRES",
            Self::Feet => "FEET",
            Self::Centimetres => "CM",
        }
    }

    /// Multiplier taking a value in this unit to metres.
    pub const fn to_metres(self) -> f64 {
        match self {
            Self::Metres => 1.0,
            Self::Feet => 0.3048,
            Self::Centimetres => 0.01,
        }
    }
}

impl Display for LengthUnit {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::LengthUnit;

    #[test]
    fn grid_units_parse_case_insensitively() {
        assert_eq!(LengthUnit::from_keyword("feet"), Some(LengthUnit::Feet));
        assert_eq!(LengthUnit::from_keyword(" METRES "), Some(LengthUnit::Metres));
        assert_eq!(LengthUnit::from_keyword("CM"), Some(LengthUnit::Centimetres));
        assert_eq!(LengthUnit::from_keyword("FURLONG"), None);
        assert_eq!(LengthUnit::Feet.to_metres(), 0.3048);
    }
}
