//! Tokenised deck keywords consumed by the grid and field property builders.

pub mod parser;

pub use parser::{KeywordShape, keyword_shape, parse_deck};

use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum DeckError {
    #[error("failed to read deck '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("line {line}: unknown keyword '{name}'")]
    UnknownKeyword { name: String, line: usize },
    #[error("line {line}: expected a keyword, found '{token}'")]
    ExpectedKeyword { token: String, line: usize },
    #[error("keyword '{0}' is not terminated before the end of input")]
    UnexpectedEof(String),
    #[error("line {line}: invalid repeat count '{token}' in keyword '{keyword}'")]
    InvalidRepeat {
        keyword: String,
        token: String,
        line: usize,
    },
    #[error("line {0}: unterminated quoted string")]
    UnterminatedString(usize),
    #[error("keyword '{keyword}' item {index}: expected {expected}")]
    InvalidItem {
        keyword: String,
        index: usize,
        expected: &'static str,
    },
    #[error("keyword '{0}' is missing from the deck")]
    MissingKeyword(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Runspec,
    Grid,
    Edit,
    Props,
    Regions,
    Solution,
    Summary,
    Schedule,
}

impl Section {
    pub fn from_keyword(name: &str) -> Option<Self> {
        match name {
            "RUNSPEC" => Some(Self::Runspec),
            "GRID" => Some(Self::Grid),
            "EDIT" => Some(Self::Edit),
            "PROPS" => Some(Self::Props),
            "REGIONS" => Some(Self::Regions),
            "SOLUTION" => Some(Self::Solution),
            "SUMMARY" => Some(Self::Summary),
            "SCHEDULE" => Some(Self::Schedule),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Runspec => "RUNSPEC",
            Self::Grid => "GRID",
            Self::Edit => "EDIT",
            Self::Props => "PROPS",
            Self::Regions => "REGIONS",
            Self::Solution => "SOLUTION",
            Self::Summary => "SUMMARY",
            Self::Schedule => "SCHEDULE",
        }
    }
}

impl Display for Section {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeckItem {
    Int(i32),
    Double(f64),
    Str(String),
    Default,
}

impl DeckItem {
    pub fn is_default(&self) -> bool {
        matches!(self, Self::Default)
    }

    /// Integer view; integral doubles are accepted.
    pub fn as_int(&self) -> Option<i32> {
        match self {
            Self::Int(value) => Some(*value),
            Self::Double(value) if value.fract() == 0.0 && value.abs() <= f64::from(i32::MAX) => {
                Some(*value as i32)
            }
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(value) => Some(f64::from(*value)),
            Self::Double(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(value) => Some(value),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeckRecord {
    items: Vec<DeckItem>,
}

impl DeckRecord {
    pub fn new(items: Vec<DeckItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[DeckItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Item `index`, or `None` when missing or defaulted.
    pub fn get(&self, index: usize) -> Option<&DeckItem> {
        self.items.get(index).filter(|item| !item.is_default())
    }

    pub fn int(&self, index: usize) -> Option<i32> {
        self.get(index).and_then(DeckItem::as_int)
    }

    pub fn double(&self, index: usize) -> Option<f64> {
        self.get(index).and_then(DeckItem::as_f64)
    }

    pub fn string(&self, index: usize) -> Option<&str> {
        self.get(index).and_then(DeckItem::as_str)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeckKeyword {
    name: String,
    section: Section,
    records: Vec<DeckRecord>,
}

impl DeckKeyword {
    pub fn new(name: impl Into<String>, section: Section, records: Vec<DeckRecord>) -> Self {
        Self {
            name: name.into(),
            section,
            records,
        }
    }

    /// Array keyword holding `values` in its single record.
    pub fn from_f64(name: impl Into<String>, section: Section, values: &[f64]) -> Self {
        let items = values.iter().map(|value| DeckItem::Double(*value)).collect();
        Self::new(name, section, vec![DeckRecord::new(items)])
    }

    pub fn from_i32(name: impl Into<String>, section: Section, values: &[i32]) -> Self {
        let items = values.iter().map(|value| DeckItem::Int(*value)).collect();
        Self::new(name, section, vec![DeckRecord::new(items)])
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn section(&self) -> Section {
        self.section
    }

    pub fn records(&self) -> &[DeckRecord] {
        &self.records
    }

    pub fn record(&self, index: usize) -> Option<&DeckRecord> {
        self.records.get(index)
    }

    fn data_items(&self) -> &[DeckItem] {
        self.records
            .first()
            .map(DeckRecord::items)
            .unwrap_or_default()
    }

    /// Array data with defaulted entries as `None`.
    pub fn data_f64_opt(&self) -> Result<Vec<Option<f64>>, DeckError> {
        self.data_items()
            .iter()
            .enumerate()
            .map(|(index, item)| match item {
                DeckItem::Default => Ok(None),
                other => other.as_f64().map(Some).ok_or_else(|| DeckError::InvalidItem {
                    keyword: self.name.clone(),
                    index,
                    expected: "a number",
                }),
            })
            .collect()
    }

    pub fn data_i32_opt(&self) -> Result<Vec<Option<i32>>, DeckError> {
        self.data_items()
            .iter()
            .enumerate()
            .map(|(index, item)| match item {
                DeckItem::Default => Ok(None),
                other => other.as_int().map(Some).ok_or_else(|| DeckError::InvalidItem {
                    keyword: self.name.clone(),
                    index,
                    expected: "an integer",
                }),
            })
            .collect()
    }

    pub fn data_f64(&self) -> Result<Vec<f64>, DeckError> {
        self.data_f64_opt()?
            .into_iter()
            .enumerate()
            .map(|(index, value)| value.ok_or_else(|| self.defaulted(index)))
            .collect()
    }

    pub fn data_i32(&self) -> Result<Vec<i32>, DeckError> {
        self.data_i32_opt()?
            .into_iter()
            .enumerate()
            .map(|(index, value)| value.ok_or_else(|| self.defaulted(index)))
            .collect()
    }

    fn defaulted(&self, index: usize) -> DeckError {
        DeckError::InvalidItem {
            keyword: self.name.clone(),
            index,
            expected: "an explicit value",
        }
    }
}

/// Ordered keyword list of one input deck.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Deck {
    keywords: Vec<DeckKeyword>,
}

impl Deck {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(text: &str) -> Result<Self, DeckError> {
        parse_deck(text)
    }

    pub fn read(path: impl AsRef<Path>) -> Result<Self, DeckError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| DeckError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    pub fn add_keyword(&mut self, keyword: DeckKeyword) {
        self.keywords.push(keyword);
    }

    pub fn keywords(&self) -> &[DeckKeyword] {
        &self.keywords
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    pub fn has_keyword(&self, name: &str) -> bool {
        self.keywords.iter().any(|keyword| keyword.name == name)
    }

    /// Last occurrence of `name`.
    pub fn get_keyword(&self, name: &str) -> Option<&DeckKeyword> {
        self.keywords.iter().rev().find(|keyword| keyword.name == name)
    }

    pub fn require_keyword(&self, name: &str) -> Result<&DeckKeyword, DeckError> {
        self.get_keyword(name)
            .ok_or_else(|| DeckError::MissingKeyword(name.to_string()))
    }

    pub fn count(&self, name: &str) -> usize {
        self.keywords
            .iter()
            .filter(|keyword| keyword.name == name)
            .count()
    }

    pub fn section_keywords(&self, section: Section) -> impl Iterator<Item = &DeckKeyword> {
        self.keywords
            .iter()
            .filter(move |keyword| keyword.section == section)
    }
}

#[cfg(test)]
mod tests {
    use super::{Deck, DeckError, DeckItem, DeckKeyword, DeckRecord, Section};

    #[test]
    fn last_occurrence_wins_for_lookup() {
        let mut deck = Deck::new();
        deck.add_keyword(DeckKeyword::from_f64("PORO", Section::Grid, &[0.1]));
        deck.add_keyword(DeckKeyword::from_f64("PORO", Section::Grid, &[0.2]));

        assert_eq!(deck.count("PORO"), 2);
        let poro = deck.get_keyword("PORO").expect("PORO should exist");
        assert_eq!(poro.data_f64().expect("numeric data"), vec![0.2]);
        assert!(matches!(
            deck.require_keyword("PERMX"),
            Err(DeckError::MissingKeyword(_))
        ));
    }

    #[test]
    fn record_accessors_skip_defaults() {
        let record = DeckRecord::new(vec![
            DeckItem::Str("PERMX".into()),
            DeckItem::Default,
            DeckItem::Double(2.0),
        ]);
        assert_eq!(record.string(0), Some("PERMX"));
        assert_eq!(record.double(1), None);
        assert_eq!(record.int(2), Some(2));
        assert_eq!(record.double(7), None);
    }

    #[test]
    fn defaulted_entries_are_rejected_by_strict_accessors() {
        let keyword = DeckKeyword::new(
            "ACTNUM",
            Section::Grid,
            vec![DeckRecord::new(vec![DeckItem::Int(1), DeckItem::Default])],
        );
        assert_eq!(
            keyword.data_i32_opt().expect("optional view"),
            vec![Some(1), None]
        );
        assert!(matches!(
            keyword.data_i32(),
            Err(DeckError::InvalidItem { index: 1, .. })
        ));
    }
}
