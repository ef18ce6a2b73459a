//! Keyword files (EGRID, INIT, ...) built from binary records.
//!
//! Each keyword is a 16 byte header record (`char[8]` name, `i32` count,
//! `char[4]` type) followed by data records holding at most 1000 elements
//! (105 for `CHAR`). Files are big-endian.

use super::fortio::{ElementWidth, FortioError, RecordOptions, RecordStream};
use byteorder::{BigEndian, ByteOrder};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

const HEADER_BYTES: usize = 16;
const NAME_BYTES: usize = 8;
const STRING_BYTES: usize = 8;
const BLOCK_SIZE: usize = 1000;
const CHAR_BLOCK_SIZE: usize = 105;

#[derive(Debug, thiserror::Error)]
pub enum EclFileError {
    #[error("failed to open keyword file '{}': {source}", path.display())]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Record(#[from] FortioError),
    #[error("keyword header at byte offset {offset} is {length} bytes, expected 16")]
    InvalidHeader { offset: u64, length: usize },
    #[error("keyword '{keyword}' has unknown element type '{tag}'")]
    UnknownType { keyword: String, tag: String },
    #[error("keyword '{keyword}' declares {expected} elements but holds {actual}")]
    CountMismatch {
        keyword: String,
        expected: usize,
        actual: usize,
    },
    #[error("keyword '{keyword}' declares {count} elements, more than can be addressed")]
    CountOverflow { keyword: String, count: usize },
    #[error("keyword '{keyword}' declares a negative element count {count}")]
    NegativeCount { keyword: String, count: i32 },
    #[error("keyword '{0}' is missing")]
    MissingKeyword(String),
    #[error("keyword '{keyword}' holds {actual} data, expected {expected}")]
    TypeMismatch {
        keyword: String,
        expected: EclType,
        actual: EclType,
    },
    #[error("keyword name '{0}' is longer than 8 characters")]
    NameTooLong(String),
    #[error("string '{value}' in keyword '{keyword}' is longer than 8 characters")]
    StringTooLong { keyword: String, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EclType {
    Inte,
    Real,
    Doub,
    Logi,
    Char,
    Mess,
}

impl EclType {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "INTE" => Some(Self::Inte),
            "REAL" => Some(Self::Real),
            "DOUB" => Some(Self::Doub),
            "LOGI" => Some(Self::Logi),
            "CHAR" => Some(Self::Char),
            "MESS" => Some(Self::Mess),
            _ => None,
        }
    }

    pub const fn tag(self) -> &'static str {
        match self {
            Self::Inte => "INTE",
            Self::Real => "REAL",
            Self::Doub => "DOUB",
            Self::Logi => "LOGI",
            Self::Char => "CHAR",
            Self::Mess => "MESS",
        }
    }

    const fn element_bytes(self) -> usize {
        match self {
            Self::Inte | Self::Real | Self::Logi => 4,
            Self::Doub | Self::Char => 8,
            Self::Mess => 0,
        }
    }

    const fn record_options(self) -> RecordOptions {
        let width = match self {
            Self::Inte | Self::Real | Self::Logi => ElementWidth::Four,
            Self::Doub => ElementWidth::Eight,
            Self::Char | Self::Mess => ElementWidth::One,
        };
        // Payloads are decoded explicitly as big-endian below.
        RecordOptions::new(width).without_transform()
    }

    const fn block_size(self) -> usize {
        match self {
            Self::Char => CHAR_BLOCK_SIZE,
            _ => BLOCK_SIZE,
        }
    }
}

impl std::fmt::Display for EclType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EclData {
    Int(Vec<i32>),
    Real(Vec<f32>),
    Double(Vec<f64>),
    Logical(Vec<bool>),
    Char(Vec<String>),
    Message,
}

impl EclData {
    pub const fn ecl_type(&self) -> EclType {
        match self {
            Self::Int(_) => EclType::Inte,
            Self::Real(_) => EclType::Real,
            Self::Double(_) => EclType::Doub,
            Self::Logical(_) => EclType::Logi,
            Self::Char(_) => EclType::Char,
            Self::Message => EclType::Mess,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Int(values) => values.len(),
            Self::Real(values) => values.len(),
            Self::Double(values) => values.len(),
            Self::Logical(values) => values.len(),
            Self::Char(values) => values.len(),
            Self::Message => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EclKeyword {
    name: String,
    data: EclData,
}

impl EclKeyword {
    pub fn new(name: impl Into<String>, data: EclData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &EclData {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_int(&self) -> Result<&[i32], EclFileError> {
        match &self.data {
            EclData::Int(values) => Ok(values),
            other => Err(self.mismatch(EclType::Inte, other)),
        }
    }

    pub fn as_chars(&self) -> Result<&[String], EclFileError> {
        match &self.data {
            EclData::Char(values) => Ok(values),
            other => Err(self.mismatch(EclType::Char, other)),
        }
    }

    /// REAL and DOUB payloads widened to `f64`.
    pub fn to_f64_vec(&self) -> Result<Vec<f64>, EclFileError> {
        match &self.data {
            EclData::Real(values) => Ok(values.iter().map(|value| f64::from(*value)).collect()),
            EclData::Double(values) => Ok(values.clone()),
            other => Err(self.mismatch(EclType::Doub, other)),
        }
    }

    fn mismatch(&self, expected: EclType, actual: &EclData) -> EclFileError {
        EclFileError::TypeMismatch {
            keyword: self.name.clone(),
            expected,
            actual: actual.ecl_type(),
        }
    }
}

/// All keywords of one file, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EclFile {
    keywords: Vec<EclKeyword>,
}

impl EclFile {
    pub fn read(path: impl AsRef<Path>) -> Result<Self, EclFileError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| EclFileError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let parsed = Self::from_reader(BufReader::new(file))?;
        debug!(
            path = %path.display(),
            keywords = parsed.keywords.len(),
            "read keyword file"
        );
        Ok(parsed)
    }

    pub fn from_reader<S: Read + Seek>(reader: S) -> Result<Self, EclFileError> {
        let mut stream = RecordStream::new(reader, RecordOptions::default());
        let mut keywords = Vec::new();
        while !stream.at_end()? {
            keywords.push(read_keyword(&mut stream)?);
        }
        Ok(Self { keywords })
    }

    pub fn keywords(&self) -> &[EclKeyword] {
        &self.keywords
    }

    pub fn has_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// First keyword named `name`.
    pub fn get(&self, name: &str) -> Option<&EclKeyword> {
        self.keywords.iter().find(|keyword| keyword.name == name)
    }

    pub fn require(&self, name: &str) -> Result<&EclKeyword, EclFileError> {
        self.get(name)
            .ok_or_else(|| EclFileError::MissingKeyword(name.to_string()))
    }
}

fn read_keyword<S: Read + Seek>(
    stream: &mut RecordStream<S>,
) -> Result<EclKeyword, EclFileError> {
    let offset = stream.position()?;
    stream.set_options(RecordOptions::default());
    let mut header = Vec::with_capacity(HEADER_BYTES);
    stream.read_record(&mut header)?;
    if header.len() != HEADER_BYTES {
        return Err(EclFileError::InvalidHeader {
            offset,
            length: header.len(),
        });
    }

    let name = decode_string(&header[..NAME_BYTES]);
    let count = BigEndian::read_i32(&header[NAME_BYTES..NAME_BYTES + 4]);
    let tag = decode_string(&header[NAME_BYTES + 4..]);
    let ecl_type = EclType::from_tag(&tag).ok_or_else(|| EclFileError::UnknownType {
        keyword: name.clone(),
        tag: tag.clone(),
    })?;
    let count = usize::try_from(count).map_err(|_| EclFileError::NegativeCount {
        keyword: name.clone(),
        count,
    })?;

    if ecl_type == EclType::Mess {
        return Ok(EclKeyword::new(name, EclData::Message));
    }

    let element_bytes = ecl_type.element_bytes();
    let expected_bytes = count
        .checked_mul(element_bytes)
        .ok_or_else(|| EclFileError::CountOverflow {
            keyword: name.clone(),
            count,
        })?;
    // Grows with the blocks actually read; the declared count is untrusted.
    let mut payload = Vec::new();
    let mut block = Vec::new();
    stream.set_options(ecl_type.record_options());
    while payload.len() < expected_bytes {
        stream.read_record(&mut block)?;
        if block.is_empty() {
            break;
        }
        payload.extend_from_slice(&block);
    }
    if payload.len() != expected_bytes {
        return Err(EclFileError::CountMismatch {
            keyword: name,
            expected: count,
            actual: payload.len() / element_bytes,
        });
    }

    let data = match ecl_type {
        EclType::Inte => EclData::Int(payload.chunks_exact(4).map(BigEndian::read_i32).collect()),
        EclType::Real => EclData::Real(payload.chunks_exact(4).map(BigEndian::read_f32).collect()),
        EclType::Doub => {
            EclData::Double(payload.chunks_exact(8).map(BigEndian::read_f64).collect())
        }
        EclType::Logi => EclData::Logical(
            payload
                .chunks_exact(4)
                .map(|chunk| BigEndian::read_i32(chunk) != 0)
                .collect(),
        ),
        EclType::Char => EclData::Char(
            payload
                .chunks_exact(STRING_BYTES)
                .map(decode_string)
                .collect(),
        ),
        EclType::Mess => EclData::Message,
    };
    Ok(EclKeyword::new(name, data))
}

fn decode_string(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).trim_end().to_string()
}

fn encode_padded(value: &str, out: &mut Vec<u8>) {
    out.extend_from_slice(value.as_bytes());
    out.extend(std::iter::repeat_n(b' ', STRING_BYTES - value.len()));
}

/// Sequential keyword writer.
#[derive(Debug)]
pub struct EclOutput<W: Write> {
    stream: RecordStream<W>,
}

impl EclOutput<BufWriter<File>> {
    pub fn create(path: impl AsRef<Path>) -> Result<Self, EclFileError> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| EclFileError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> EclOutput<W> {
    pub fn new(writer: W) -> Self {
        Self {
            stream: RecordStream::new(writer, RecordOptions::default()),
        }
    }

    pub fn write(&mut self, keyword: &EclKeyword) -> Result<(), EclFileError> {
        if keyword.name.len() > NAME_BYTES {
            return Err(EclFileError::NameTooLong(keyword.name.clone()));
        }
        let ecl_type = keyword.data.ecl_type();
        let count = i32::try_from(keyword.len()).map_err(|_| {
            FortioError::InvalidArgument(format!(
                "keyword '{}' has too many elements ({})",
                keyword.name,
                keyword.len()
            ))
        })?;

        let mut header = Vec::with_capacity(HEADER_BYTES);
        header.extend_from_slice(keyword.name.as_bytes());
        header.extend(std::iter::repeat_n(b' ', NAME_BYTES - keyword.name.len()));
        let mut count_bytes = [0u8; 4];
        BigEndian::write_i32(&mut count_bytes, count);
        header.extend_from_slice(&count_bytes);
        header.extend_from_slice(ecl_type.tag().as_bytes());
        self.stream.set_options(RecordOptions::default());
        self.stream.write_record(&header)?;

        let payload = encode_payload(keyword)?;
        if payload.is_empty() {
            return Ok(());
        }
        let block_bytes = ecl_type.block_size() * ecl_type.element_bytes();
        self.stream.set_options(ecl_type.record_options());
        for block in payload.chunks(block_bytes) {
            self.stream.write_record(block)?;
        }
        Ok(())
    }

    pub fn finish(mut self) -> Result<W, EclFileError> {
        self.stream.flush()?;
        Ok(self.stream.into_inner())
    }
}

fn encode_payload(keyword: &EclKeyword) -> Result<Vec<u8>, EclFileError> {
    let mut payload = Vec::with_capacity(keyword.len() * keyword.data.ecl_type().element_bytes());
    match &keyword.data {
        EclData::Int(values) => {
            for value in values {
                payload.extend_from_slice(&value.to_be_bytes());
            }
        }
        EclData::Real(values) => {
            for value in values {
                payload.extend_from_slice(&value.to_be_bytes());
            }
        }
        EclData::Double(values) => {
            for value in values {
                payload.extend_from_slice(&value.to_be_bytes());
            }
        }
        EclData::Logical(values) => {
            for value in values {
                let encoded: i32 = if *value { -1 } else { 0 };
                payload.extend_from_slice(&encoded.to_be_bytes());
            }
        }
        EclData::Char(values) => {
            for value in values {
                if value.len() > STRING_BYTES {
                    return Err(EclFileError::StringTooLong {
                        keyword: keyword.name.clone(),
                        value: value.clone(),
                    });
                }
                encode_padded(value, &mut payload);
            }
        }
        EclData::Message => {}
    }
    Ok(payload)
}
