#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnOrder {
    Increasing,
    Decreasing,
    StrictlyIncreasing,
    StrictlyDecreasing,
    Random,
}

impl ColumnOrder {
    /// Whether `next` may follow `previous` in a column with this ordering.
    pub fn allows(self, previous: f64, next: f64) -> bool {
        match self {
            Self::Increasing => next >= previous,
            Self::Decreasing => next <= previous,
            Self::StrictlyIncreasing => next > previous,
            Self::StrictlyDecreasing => next < previous,
            Self::Random => true,
        }
    }

    pub const fn is_monotonic(self) -> bool {
        !matches!(self, Self::Random)
    }

    pub const fn is_descending(self) -> bool {
        matches!(self, Self::Decreasing | Self::StrictlyDecreasing)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DefaultAction {
    /// Defaulted entries are rejected.
    None,
    /// Defaulted entries take a fixed value.
    Constant(f64),
    /// Defaulted entries are interpolated against the argument column.
    Linear,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSchema {
    name: String,
    order: ColumnOrder,
    default_action: DefaultAction,
}

impl ColumnSchema {
    pub fn new(name: impl Into<String>, order: ColumnOrder, default_action: DefaultAction) -> Self {
        Self {
            name: name.into(),
            order,
            default_action,
        }
    }

    pub fn with_default_value(name: impl Into<String>, order: ColumnOrder, value: f64) -> Self {
        Self::new(name, order, DefaultAction::Constant(value))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn order(&self) -> ColumnOrder {
        self.order
    }

    pub const fn default_action(&self) -> DefaultAction {
        self.default_action
    }

    pub const fn accepts_default(&self) -> bool {
        !matches!(self.default_action, DefaultAction::None)
    }

    pub fn default_value(&self) -> Option<f64> {
        match self.default_action {
            DefaultAction::Constant(value) => Some(value),
            DefaultAction::None | DefaultAction::Linear => None,
        }
    }

    pub const fn lookup_valid(&self) -> bool {
        self.order.is_monotonic()
    }
}

#[cfg(test)]
mod tests {
    use super::{ColumnOrder, ColumnSchema, DefaultAction};

    #[test]
    fn order_predicates_distinguish_strict_and_weak() {
        assert!(ColumnOrder::Increasing.allows(1.0, 1.0));
        assert!(!ColumnOrder::StrictlyIncreasing.allows(1.0, 1.0));
        assert!(ColumnOrder::Decreasing.allows(2.0, 1.0));
        assert!(!ColumnOrder::StrictlyDecreasing.allows(1.0, 2.0));
        assert!(ColumnOrder::Random.allows(5.0, -5.0));
    }

    #[test]
    fn constant_schema_reports_its_default() {
        let schema = ColumnSchema::with_default_value("KRW", ColumnOrder::Increasing, 0.0);
        assert!(schema.accepts_default());
        assert_eq!(schema.default_value(), Some(0.0));

        let strict = ColumnSchema::new("SW", ColumnOrder::StrictlyIncreasing, DefaultAction::None);
        assert!(!strict.accepts_default());
        assert!(strict.lookup_valid());
    }
}
