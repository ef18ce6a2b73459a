use super::field_data::{FieldData, FieldValue, ValueStatus};
use std::fmt::{Display, Formatter};

/// Scalar operation of the `EQUALS`/`MULTIPLY`/`ADD`/`MINVALUE`/`MAXVALUE`
/// family and of their region variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarOperation {
    Equal,
    Mul,
    Add,
    /// `MINVALUE`: raises values to at least the argument.
    Min,
    /// `MAXVALUE`: caps values at the argument.
    Max,
}

impl ScalarOperation {
    pub fn from_keyword(name: &str) -> Option<Self> {
        match name {
            "EQUALS" | "EQUALREG" => Some(Self::Equal),
            "MULTIPLY" | "MULTIREG" => Some(Self::Mul),
            "ADD" | "ADDREG" => Some(Self::Add),
            "MINVALUE" => Some(Self::Min),
            "MAXVALUE" => Some(Self::Max),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Equal => "EQUAL",
            Self::Mul => "MUL",
            Self::Add => "ADD",
            Self::Min => "MIN",
            Self::Max => "MAX",
        }
    }

    /// Combines a current value with the argument. `Equal` ignores the
    /// current value.
    pub fn combine<T: FieldValue>(self, current: T, argument: T) -> T {
        match self {
            Self::Equal => argument,
            Self::Mul => current * argument,
            Self::Add => current + argument,
            Self::Min => {
                if current < argument {
                    argument
                } else {
                    current
                }
            }
            Self::Max => {
                if current > argument {
                    argument
                } else {
                    current
                }
            }
        }
    }

    /// Applies the operation to the listed active cells. `Equal` assigns
    /// every cell; the other operations only touch cells holding a value.
    pub fn apply<T: FieldValue>(self, field: &mut FieldData<T>, argument: T, cells: &[usize]) {
        for &cell in cells {
            match self {
                Self::Equal => field.set(cell, argument, ValueStatus::DeckValue),
                _ if field.has_value(cell) => {
                    field.update(cell, |current| self.combine(current, argument));
                }
                _ => {}
            }
        }
    }
}

impl Display for ScalarOperation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
