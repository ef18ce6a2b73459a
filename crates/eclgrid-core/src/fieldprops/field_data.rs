use crate::deck::{DeckError, DeckKeyword};
use std::fmt::Debug;
use std::ops::{Add, Mul};

/// Element types a field can hold.
pub trait FieldValue: Copy + Default + PartialOrd + Debug + Add<Output = Self> + Mul<Output = Self> {
    /// Operation arguments are read as doubles; integer fields truncate.
    fn from_f64(value: f64) -> Self;

    /// Array data of a deck keyword, with defaulted entries as `None`.
    fn deck_data(keyword: &DeckKeyword) -> Result<Vec<Option<Self>>, DeckError>;
}

impl FieldValue for f64 {
    fn from_f64(value: f64) -> Self {
        value
    }

    fn deck_data(keyword: &DeckKeyword) -> Result<Vec<Option<Self>>, DeckError> {
        keyword.data_f64_opt()
    }
}

impl FieldValue for i32 {
    fn from_f64(value: f64) -> Self {
        value as i32
    }

    fn deck_data(keyword: &DeckKeyword) -> Result<Vec<Option<Self>>, DeckError> {
        keyword.data_i32_opt()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueStatus {
    Uninitialized,
    /// Filled from the keyword default or derived from other fields.
    ValidDefault,
    DeckValue,
}

impl ValueStatus {
    pub const fn has_value(self) -> bool {
        !matches!(self, Self::Uninitialized)
    }
}

/// One property over the active cells, with per-cell provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldData<T> {
    data: Vec<T>,
    status: Vec<ValueStatus>,
}

impl<T: FieldValue> FieldData<T> {
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![T::default(); size],
            status: vec![ValueStatus::Uninitialized; size],
        }
    }

    pub fn with_default(size: usize, value: T) -> Self {
        Self {
            data: vec![value; size],
            status: vec![ValueStatus::ValidDefault; size],
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn status(&self) -> &[ValueStatus] {
        &self.status
    }

    /// Every cell holds a value.
    pub fn valid(&self) -> bool {
        self.status.iter().all(|status| status.has_value())
    }

    pub fn valid_default(&self) -> bool {
        self.status
            .iter()
            .all(|status| *status == ValueStatus::ValidDefault)
    }

    pub fn has_value(&self, index: usize) -> bool {
        self.status
            .get(index)
            .is_some_and(|status| status.has_value())
    }

    pub fn value(&self, index: usize) -> Option<T> {
        self.has_value(index).then(|| self.data[index])
    }

    pub fn set(&mut self, index: usize, value: T, status: ValueStatus) {
        self.data[index] = value;
        self.status[index] = status;
    }

    pub fn update(&mut self, index: usize, f: impl FnOnce(T) -> T) {
        self.data[index] = f(self.data[index]);
    }

    /// Fills every cell that is not yet assigned.
    pub fn default_update(&mut self, values: &[T]) {
        for ((value, status), default) in self.data.iter_mut().zip(&mut self.status).zip(values) {
            if !status.has_value() {
                *value = *default;
                *status = ValueStatus::ValidDefault;
            }
        }
    }

    /// Rebuilds the field with cell `n` taken from current cell `source[n]`.
    pub fn gather(&mut self, source: &[usize]) {
        self.data = source.iter().map(|&old| self.data[old]).collect();
        self.status = source.iter().map(|&old| self.status[old]).collect();
    }

    pub fn defaulted(&self) -> Vec<bool> {
        self.status
            .iter()
            .map(|status| *status == ValueStatus::ValidDefault)
            .collect()
    }
}
