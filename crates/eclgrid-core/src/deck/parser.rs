//! Minimal text deck reader.
//!
//! Handles `--` comments, `/` terminators (text after a terminator is
//! ignored), `N*value` repeats, `N*` defaults and quoted strings. The record
//! layout of each keyword comes from [`keyword_shape`].

use super::{Deck, DeckError, DeckItem, DeckKeyword, DeckRecord, Section};
use crate::fieldprops::keywords::{is_double_keyword, is_int_keyword};
use tracing::debug;

/// Largest record a repeat may expand to; array lengths are `i32` on disk.
const MAX_RECORD_ITEMS: usize = i32::MAX as usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordShape {
    /// Section markers and flags.
    NoData,
    /// One record of arbitrary length (array keywords).
    Data,
    /// Exactly one record.
    Single,
    /// Records until an empty record.
    Multi,
    /// One record per saturation table region (`TABDIMS` item 1).
    Table,
}

pub fn keyword_shape(name: &str) -> Option<KeywordShape> {
    if Section::from_keyword(name).is_some() {
        return Some(KeywordShape::NoData);
    }
    let shape = match name {
        "ENDBOX" | "ECHO" | "NOECHO" | "METRIC" | "FIELD" | "OIL" | "WATER" | "GAS"
        | "DISGAS" | "VAPOIL" | "DUALPORO" | "DUALPERM" | "RADIAL" | "SPIDER" | "NONNC"
        | "END" => KeywordShape::NoData,
        "COORD" | "ZCORN" | "DXV" | "DYV" | "DZV" | "DEPTHZ" | "CORSNUM" | "TRANX" | "TRANY"
        | "TRANZ" => KeywordShape::Data,
        "DIMENS" | "SPECGRID" | "MAPUNITS" | "MAPAXES" | "GRIDUNIT" | "PINCH" | "MINPV"
        | "MINPVFIL" | "BOX" | "GRIDOPTS" | "TABDIMS" => KeywordShape::Single,
        "EQUALS" | "MULTIPLY" | "ADD" | "COPY" | "MINVALUE" | "MAXVALUE" | "EQUALREG"
        | "MULTIREG" | "ADDREG" => KeywordShape::Multi,
        "SWOF" | "SGOF" => KeywordShape::Table,
        other if is_double_keyword(other) || is_int_keyword(other) => KeywordShape::Data,
        _ => return None,
    };
    Some(shape)
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Word(String),
    Quoted(String),
    Slash,
}

#[derive(Debug, Clone, PartialEq)]
struct Located {
    token: Token,
    line: usize,
}

fn tokenize(text: &str) -> Result<Vec<Located>, DeckError> {
    let mut tokens = Vec::new();
    for (line_index, raw_line) in text.lines().enumerate() {
        let line = line_index + 1;
        let mut chars = raw_line.char_indices().peekable();
        let mut word = String::new();

        let flush = |word: &mut String, tokens: &mut Vec<Located>| {
            if !word.is_empty() {
                tokens.push(Located {
                    token: Token::Word(std::mem::take(word)),
                    line,
                });
            }
        };

        while let Some((position, ch)) = chars.next() {
            match ch {
                '\'' => {
                    flush(&mut word, &mut tokens);
                    let rest = &raw_line[position + 1..];
                    let end = rest.find('\'').ok_or(DeckError::UnterminatedString(line))?;
                    tokens.push(Located {
                        token: Token::Quoted(rest[..end].to_string()),
                        line,
                    });
                    for _ in 0..=rest[..end].chars().count() {
                        chars.next();
                    }
                }
                '-' if raw_line[position..].starts_with("--") => break,
                '/' => {
                    flush(&mut word, &mut tokens);
                    tokens.push(Located {
                        token: Token::Slash,
                        line,
                    });
                    break;
                }
                c if c.is_whitespace() => flush(&mut word, &mut tokens),
                c => word.push(c),
            }
        }
        flush(&mut word, &mut tokens);
    }
    Ok(tokens)
}

fn is_keyword_token(word: &str) -> bool {
    word.len() <= 8
        && word.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '+')
}

fn parse_scalar(word: &str) -> DeckItem {
    if let Ok(value) = word.parse::<i32>() {
        return DeckItem::Int(value);
    }
    let normalised = word.replace(['d', 'D'], "E");
    match normalised.parse::<f64>() {
        Ok(value) => DeckItem::Double(value),
        Err(_) => DeckItem::Str(word.to_string()),
    }
}

fn expand_word(
    word: &str,
    keyword: &str,
    line: usize,
    items: &mut Vec<DeckItem>,
) -> Result<(), DeckError> {
    let Some((count, value)) = word.split_once('*') else {
        items.push(parse_scalar(word));
        return Ok(());
    };
    let count = if count.is_empty() {
        1
    } else {
        count
            .parse::<usize>()
            .ok()
            .filter(|count| *count > 0 && items.len().saturating_add(*count) <= MAX_RECORD_ITEMS)
            .ok_or_else(|| DeckError::InvalidRepeat {
                keyword: keyword.to_string(),
                token: word.to_string(),
                line,
            })?
    };
    let item = if value.is_empty() {
        DeckItem::Default
    } else {
        parse_scalar(value)
    };
    items.extend(std::iter::repeat_n(item, count));
    Ok(())
}

struct Cursor {
    tokens: Vec<Located>,
    position: usize,
}

impl Cursor {
    fn next(&mut self) -> Option<Located> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    fn read_record(&mut self, keyword: &str) -> Result<DeckRecord, DeckError> {
        let mut items = Vec::new();
        loop {
            let Some(located) = self.next() else {
                return Err(DeckError::UnexpectedEof(keyword.to_string()));
            };
            match located.token {
                Token::Slash => return Ok(DeckRecord::new(items)),
                Token::Quoted(value) => items.push(DeckItem::Str(value)),
                Token::Word(word) => expand_word(&word, keyword, located.line, &mut items)?,
            }
        }
    }
}

fn table_count(deck: &Deck) -> usize {
    deck.get_keyword("TABDIMS")
        .and_then(|keyword| keyword.record(0))
        .and_then(|record| record.int(0))
        .and_then(|count| usize::try_from(count).ok())
        .filter(|count| *count > 0)
        .unwrap_or(1)
}

pub fn parse_deck(text: &str) -> Result<Deck, DeckError> {
    let mut cursor = Cursor {
        tokens: tokenize(text)?,
        position: 0,
    };
    let mut deck = Deck::new();
    let mut section = Section::Runspec;

    while let Some(located) = cursor.next() {
        let name = match located.token {
            Token::Word(word) if is_keyword_token(&word) => word.to_ascii_uppercase(),
            Token::Word(word) | Token::Quoted(word) => {
                return Err(DeckError::ExpectedKeyword {
                    token: word,
                    line: located.line,
                });
            }
            Token::Slash => {
                return Err(DeckError::ExpectedKeyword {
                    token: "/".to_string(),
                    line: located.line,
                });
            }
        };
        let shape = keyword_shape(&name).ok_or_else(|| DeckError::UnknownKeyword {
            name: name.clone(),
            line: located.line,
        })?;
        if let Some(next_section) = Section::from_keyword(&name) {
            section = next_section;
        }

        let records = match shape {
            KeywordShape::NoData => Vec::new(),
            KeywordShape::Data | KeywordShape::Single => vec![cursor.read_record(&name)?],
            KeywordShape::Multi => {
                let mut records = Vec::new();
                loop {
                    let record = cursor.read_record(&name)?;
                    if record.is_empty() {
                        break;
                    }
                    records.push(record);
                }
                records
            }
            KeywordShape::Table => {
                let count = table_count(&deck);
                (0..count)
                    .map(|_| cursor.read_record(&name))
                    .collect::<Result<Vec<_>, _>>()?
            }
        };
        deck.add_keyword(DeckKeyword::new(name, section, records));
    }

    debug!(keywords = deck.len(), "parsed deck");
    Ok(deck)
}
