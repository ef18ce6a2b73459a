use super::TableError;
use super::column::TableColumn;
use super::schema::{ColumnOrder, ColumnSchema, DefaultAction};

/// Row-oriented table whose first column is the argument of all others.
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleTable {
    columns: Vec<TableColumn>,
}

impl SimpleTable {
    pub fn new(schemas: Vec<ColumnSchema>) -> Self {
        Self {
            columns: schemas.into_iter().map(TableColumn::new).collect(),
        }
    }

    /// Builds a table from a flat row-major list where `None` marks a
    /// defaulted entry, then resolves the defaults.
    pub fn from_flat(
        schemas: Vec<ColumnSchema>,
        values: &[Option<f64>],
    ) -> Result<Self, TableError> {
        let mut table = Self::new(schemas);
        let width = table.num_columns();
        if width == 0 || values.len() % width != 0 {
            return Err(TableError::SizeMismatch {
                column: table
                    .columns
                    .first()
                    .map(|column| column.name().to_string())
                    .unwrap_or_default(),
                expected: width,
                actual: values.len(),
            });
        }
        for row in values.chunks(width) {
            table.add_row(row)?;
        }
        table.apply_defaults()?;
        Ok(table)
    }

    /// Relative permeability table for water/oil (`SWOF`).
    pub fn swof_schema() -> Vec<ColumnSchema> {
        vec![
            ColumnSchema::new("SW", ColumnOrder::StrictlyIncreasing, DefaultAction::None),
            ColumnSchema::new("KRW", ColumnOrder::Increasing, DefaultAction::Linear),
            ColumnSchema::new("KROW", ColumnOrder::Decreasing, DefaultAction::Linear),
            ColumnSchema::new("PCOW", ColumnOrder::Decreasing, DefaultAction::Linear),
        ]
    }

    /// Relative permeability table for gas/oil (`SGOF`).
    pub fn sgof_schema() -> Vec<ColumnSchema> {
        vec![
            ColumnSchema::new("SG", ColumnOrder::StrictlyIncreasing, DefaultAction::None),
            ColumnSchema::new("KRG", ColumnOrder::Increasing, DefaultAction::Linear),
            ColumnSchema::new("KROG", ColumnOrder::Decreasing, DefaultAction::Linear),
            ColumnSchema::new("PCOG", ColumnOrder::Increasing, DefaultAction::Linear),
        ]
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn num_rows(&self) -> usize {
        self.columns.first().map_or(0, TableColumn::size)
    }

    pub fn columns(&self) -> &[TableColumn] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Result<&TableColumn, TableError> {
        self.columns
            .iter()
            .find(|column| column.name() == name)
            .ok_or_else(|| TableError::MissingColumn(name.to_string()))
    }

    pub fn add_row(&mut self, row: &[Option<f64>]) -> Result<(), TableError> {
        if row.len() != self.columns.len() {
            return Err(TableError::SizeMismatch {
                column: self
                    .columns
                    .first()
                    .map(|column| column.name().to_string())
                    .unwrap_or_default(),
                expected: self.columns.len(),
                actual: row.len(),
            });
        }
        for (column, value) in self.columns.iter_mut().zip(row) {
            match value {
                Some(value) => column.add_value(*value)?,
                None => column.add_default()?,
            }
        }
        Ok(())
    }

    pub fn apply_defaults(&mut self) -> Result<(), TableError> {
        let Some((argument, rest)) = self.columns.split_first_mut() else {
            return Ok(());
        };
        for column in rest {
            column.apply_defaults(argument)?;
        }
        Ok(())
    }

    /// Interpolates `column` at argument value `x`.
    pub fn evaluate(&self, column: &str, x: f64) -> Result<f64, TableError> {
        let argument = self
            .columns
            .first()
            .ok_or_else(|| TableError::MissingColumn(column.to_string()))?;
        let index = argument.lookup(x)?;
        self.column(column)?.eval(index)
    }
}
