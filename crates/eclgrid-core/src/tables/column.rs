use super::TableError;
use super::schema::{ColumnOrder, ColumnSchema, DefaultAction};

/// Bracketing position of a lookup: `value = weight1 * v[index] + (1 - weight1) * v[index + 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableIndex {
    index: usize,
    weight1: f64,
}

impl TableIndex {
    pub const fn new(index: usize, weight1: f64) -> Self {
        Self { index, weight1 }
    }

    pub const fn index(&self) -> usize {
        self.index
    }

    pub const fn weight1(&self) -> f64 {
        self.weight1
    }

    pub fn weight2(&self) -> f64 {
        1.0 - self.weight1
    }
}

/// One column of a property table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableColumn {
    schema: ColumnSchema,
    values: Vec<f64>,
    defaulted: Vec<bool>,
    defaulted_count: usize,
}

impl TableColumn {
    pub fn new(schema: ColumnSchema) -> Self {
        Self {
            schema,
            values: Vec::new(),
            defaulted: Vec::new(),
            defaulted_count: 0,
        }
    }

    pub fn name(&self) -> &str {
        self.schema.name()
    }

    pub fn schema(&self) -> &ColumnSchema {
        &self.schema
    }

    pub fn size(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn has_default(&self) -> bool {
        self.defaulted_count > 0
    }

    pub fn defaulted_count(&self) -> usize {
        self.defaulted_count
    }

    pub fn is_defaulted(&self, index: usize) -> bool {
        self.defaulted.get(index).copied().unwrap_or(false)
    }

    /// Raw values; defaulted linear entries hold placeholders until
    /// [`TableColumn::apply_defaults`] has run.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn add_value(&mut self, value: f64) -> Result<(), TableError> {
        self.check_neighbours(self.values.len(), value)?;
        self.values.push(value);
        self.defaulted.push(false);
        Ok(())
    }

    pub fn add_default(&mut self) -> Result<(), TableError> {
        match self.schema.default_action() {
            DefaultAction::None => Err(TableError::InvalidOperation {
                column: self.name().to_string(),
                reason: "column does not accept default values".to_string(),
            }),
            DefaultAction::Constant(value) => self.add_value(value),
            DefaultAction::Linear => {
                self.values.push(f64::NAN);
                self.defaulted.push(true);
                self.defaulted_count += 1;
                Ok(())
            }
        }
    }

    pub fn update_value(&mut self, index: usize, value: f64) -> Result<(), TableError> {
        self.check_index(index)?;
        self.check_neighbours(index, value)?;
        self.values[index] = value;
        if self.defaulted[index] {
            self.defaulted[index] = false;
            self.defaulted_count -= 1;
        }
        Ok(())
    }

    pub fn get(&self, index: usize) -> Result<f64, TableError> {
        self.check_index(index)?;
        if self.defaulted[index] {
            return Err(self.invalid("value is defaulted and not yet resolved"));
        }
        Ok(self.values[index])
    }

    /// Resolves linear defaults against `argument`, the column this one is a
    /// function of.
    pub fn apply_defaults(&mut self, argument: &TableColumn) -> Result<(), TableError> {
        if !self.has_default() {
            return Ok(());
        }
        if argument.size() != self.size() {
            return Err(TableError::SizeMismatch {
                column: self.name().to_string(),
                expected: self.size(),
                actual: argument.size(),
            });
        }
        if argument.has_default() {
            return Err(self.invalid("argument column still holds defaulted values"));
        }
        let explicit: Vec<usize> = (0..self.size()).filter(|&i| !self.defaulted[i]).collect();
        if explicit.is_empty() {
            return Err(TableError::FullyDefaulted(self.name().to_string()));
        }

        for index in 0..self.size() {
            if !self.defaulted[index] {
                continue;
            }
            let after = explicit.partition_point(|&candidate| candidate < index);
            let previous = after.checked_sub(1).map(|position| explicit[position]);
            let next = explicit.get(after).copied();

            self.values[index] = match (previous, next) {
                (Some(lo), Some(hi)) => {
                    let x0 = argument.values[lo];
                    let x1 = argument.values[hi];
                    let y0 = self.values[lo];
                    let y1 = self.values[hi];
                    if x1 == x0 {
                        y0
                    } else {
                        y0 + (y1 - y0) * (argument.values[index] - x0) / (x1 - x0)
                    }
                }
                (Some(lo), None) => self.values[lo],
                (None, Some(hi)) => self.values[hi],
                (None, None) => return Err(TableError::FullyDefaulted(self.name().to_string())),
            };
        }

        self.defaulted.iter_mut().for_each(|flag| *flag = false);
        self.defaulted_count = 0;
        Ok(())
    }

    pub fn min(&self) -> Result<f64, TableError> {
        self.require_resolved()?;
        Ok(self.values.iter().copied().fold(f64::INFINITY, f64::min))
    }

    pub fn max(&self) -> Result<f64, TableError> {
        self.require_resolved()?;
        Ok(self.values.iter().copied().fold(f64::NEG_INFINITY, f64::max))
    }

    pub fn front(&self) -> Result<f64, TableError> {
        self.require_resolved()?;
        Ok(self.values[0])
    }

    pub fn back(&self) -> Result<f64, TableError> {
        self.require_resolved()?;
        Ok(self.values[self.values.len() - 1])
    }

    /// Locates `x` in a monotonic column. Arguments outside the column range
    /// clamp to the extreme element with weight 1.0.
    pub fn lookup(&self, x: f64) -> Result<TableIndex, TableError> {
        self.require_resolved()?;
        if !self.schema.lookup_valid() {
            return Err(self.invalid("lookup requires a monotonic column"));
        }
        if !x.is_finite() {
            return Err(self.invalid(&format!("cannot look up non-finite argument {x}")));
        }
        let last = self.values.len() - 1;
        if last == 0 {
            return Ok(TableIndex::new(0, 1.0));
        }

        let descending = self.schema.order().is_descending();
        let (min_index, max_index) = if descending { (last, 0) } else { (0, last) };
        if x <= self.values[min_index] {
            return Ok(TableIndex::new(min_index, 1.0));
        }
        if x >= self.values[max_index] {
            return Ok(TableIndex::new(max_index, 1.0));
        }

        let index = if descending {
            self.values.partition_point(|&value| value >= x) - 1
        } else {
            self.values.partition_point(|&value| value <= x) - 1
        };
        let lo = self.values[index];
        let hi = self.values[index + 1];
        Ok(TableIndex::new(index, (hi - x) / (hi - lo)))
    }

    pub fn eval(&self, index: TableIndex) -> Result<f64, TableError> {
        let first = self.get(index.index())?;
        if index.weight1() == 1.0 {
            return Ok(first);
        }
        let second = self.get(index.index() + 1)?;
        Ok(index.weight1() * first + index.weight2() * second)
    }

    fn check_index(&self, index: usize) -> Result<(), TableError> {
        if index >= self.values.len() {
            return Err(TableError::IndexOutOfRange {
                column: self.name().to_string(),
                index,
                size: self.values.len(),
            });
        }
        Ok(())
    }

    fn check_neighbours(&self, index: usize, value: f64) -> Result<(), TableError> {
        let order = self.schema.order();
        if order == ColumnOrder::Random {
            return Ok(());
        }
        let previous = (0..index).rev().find(|&i| !self.defaulted[i]);
        let next = (index + 1..self.values.len()).find(|&i| !self.defaulted[i]);
        let after_previous = previous.is_none_or(|i| order.allows(self.values[i], value));
        let before_next = next.is_none_or(|i| order.allows(value, self.values[i]));
        if after_previous && before_next {
            Ok(())
        } else {
            Err(self.order_error(index, value))
        }
    }

    fn require_resolved(&self) -> Result<(), TableError> {
        if self.values.is_empty() {
            return Err(self.invalid("column is empty"));
        }
        if self.has_default() {
            return Err(self.invalid("column holds unresolved default values"));
        }
        Ok(())
    }

    fn order_error(&self, index: usize, value: f64) -> TableError {
        TableError::InvalidOrder {
            column: self.name().to_string(),
            index,
            value,
        }
    }

    fn invalid(&self, reason: &str) -> TableError {
        TableError::InvalidOperation {
            column: self.name().to_string(),
            reason: reason.to_string(),
        }
    }
}
