//! Fortran sequential binary records.
//!
//! A record on disk is `[i32 head][head bytes][i32 tail]` with `head == tail`.
//! Every read entry point is transactional: on failure the stream is moved
//! back to where it was before the call, so callers may try several layouts in turn.

use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Seek, SeekFrom, Write};
use tracing::debug;

pub const RECORD_MARKER_BYTES: u64 = 4;
const WRITE_CHUNK_BYTES: usize = 64 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum FortioError {
    #[error("failed to read record at byte offset {offset}: {source}")]
    Read { offset: u64, source: io::Error },
    #[error("failed to write record: {source}")]
    Write { source: io::Error },
    #[error("invalid record at byte offset {offset}: {reason}")]
    InvalidRecord { offset: u64, reason: String },
    #[error("invalid record argument: {0}")]
    InvalidArgument(String),
    #[error("failed to restore stream position {offset}: {source}")]
    Seek { offset: u64, source: io::Error },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementWidth {
    One,
    Two,
    Four,
    Eight,
}

impl ElementWidth {
    pub const fn bytes(self) -> usize {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Four => 4,
            Self::Eight => 8,
        }
    }

    pub const fn from_bytes(bytes: usize) -> Option<Self> {
        match bytes {
            1 => Some(Self::One),
            2 => Some(Self::Two),
            4 => Some(Self::Four),
            8 => Some(Self::Eight),
            _ => None,
        }
    }
}

/// Element type tags used by callers to pick the swap granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    Char,
    Int,
    Float,
    Double,
}

impl ElementType {
    pub const fn from_tag(tag: char) -> Option<Self> {
        match tag {
            'c' => Some(Self::Char),
            'i' => Some(Self::Int),
            'f' => Some(Self::Float),
            'd' => Some(Self::Double),
            _ => None,
        }
    }

    pub const fn tag(self) -> char {
        match self {
            Self::Char => 'c',
            Self::Int => 'i',
            Self::Float => 'f',
            Self::Double => 'd',
        }
    }

    pub const fn width(self) -> ElementWidth {
        match self {
            Self::Char => ElementWidth::One,
            Self::Int | Self::Float => ElementWidth::Four,
            Self::Double => ElementWidth::Eight,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endianness {
    Big,
    Little,
}

impl Endianness {
    #[cfg(target_endian = "big")]
    pub const NATIVE: Self = Self::Big;
    #[cfg(target_endian = "little")]
    pub const NATIVE: Self = Self::Little;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TailPolicy {
    Required,
    /// End of file or a mismatching tail is tolerated; the stream is left
    /// at the end of the payload.
    AllowMissing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordOptions {
    pub element_width: ElementWidth,
    pub endianness: Endianness,
    /// Normalise payload byte order to the host when the file order differs.
    pub transform: bool,
    pub tail: TailPolicy,
    pub write_tail: bool,
}

impl RecordOptions {
    pub const fn new(element_width: ElementWidth) -> Self {
        Self {
            element_width,
            endianness: Endianness::Big,
            transform: true,
            tail: TailPolicy::Required,
            write_tail: true,
        }
    }

    pub const fn for_type(element_type: ElementType) -> Self {
        Self::new(element_type.width())
    }

    pub fn from_tag(tag: char) -> Result<Self, FortioError> {
        ElementType::from_tag(tag)
            .map(Self::for_type)
            .ok_or_else(|| FortioError::InvalidArgument(format!("unknown element tag '{tag}'")))
    }

    pub const fn with_endianness(mut self, endianness: Endianness) -> Self {
        self.endianness = endianness;
        self
    }

    pub const fn without_transform(mut self) -> Self {
        self.transform = false;
        self
    }

    pub const fn allow_missing_tail(mut self) -> Self {
        self.tail = TailPolicy::AllowMissing;
        self
    }

    pub const fn without_tail(mut self) -> Self {
        self.write_tail = false;
        self
    }

    fn swaps_payload(&self) -> bool {
        self.transform && self.endianness != Endianness::NATIVE
    }
}

impl Default for RecordOptions {
    fn default() -> Self {
        Self::new(ElementWidth::One)
    }
}

/// Reverses the byte order of every element in `payload`.
pub fn swap_in_place(payload: &mut [u8], width: ElementWidth) -> Result<(), FortioError> {
    let bytes = width.bytes();
    if payload.len() % bytes != 0 {
        return Err(FortioError::InvalidArgument(format!(
            "payload of {} bytes is not a multiple of the {}-byte element width",
            payload.len(),
            bytes
        )));
    }

    match width {
        ElementWidth::One => {}
        ElementWidth::Two | ElementWidth::Four | ElementWidth::Eight => {
            payload
                .chunks_exact_mut(bytes)
                .for_each(|element| element.reverse());
        }
    }
    Ok(())
}

enum RecordTarget<'a> {
    Skip,
    Fixed(&'a mut [u8]),
    Growable(&'a mut Vec<u8>),
}

/// Reads the next record into `buffer`, resizing it to the payload length.
/// Returns the element count.
pub fn read_record<S: Read + Seek>(
    stream: &mut S,
    opts: &RecordOptions,
    buffer: &mut Vec<u8>,
) -> Result<usize, FortioError> {
    get(stream, opts, RecordTarget::Growable(buffer))
}

/// Reads the next record into a caller-sized buffer. Fails with
/// `InvalidArgument` when the record is larger than `buffer`.
pub fn read_record_into<S: Read + Seek>(
    stream: &mut S,
    opts: &RecordOptions,
    buffer: &mut [u8],
) -> Result<usize, FortioError> {
    get(stream, opts, RecordTarget::Fixed(buffer))
}

/// Steps over the next record without reading its payload.
pub fn skip_record<S: Read + Seek>(
    stream: &mut S,
    opts: &RecordOptions,
) -> Result<usize, FortioError> {
    get(stream, opts, RecordTarget::Skip)
}

/// Skips `count` records; the whole operation is rolled back on failure.
pub fn skip<S: Read + Seek>(
    stream: &mut S,
    opts: &RecordOptions,
    count: i64,
) -> Result<(), FortioError> {
    if count < 0 {
        return Err(FortioError::InvalidArgument(format!(
            "cannot skip a negative number of records ({count})"
        )));
    }

    let start = position(stream)?;
    for _ in 0..count {
        if let Err(error) = skip_record(stream, opts) {
            rewind(stream, start)?;
            return Err(error);
        }
    }
    Ok(())
}

/// Element count of the next record; the stream position is unchanged.
pub fn record_len<S: Read + Seek>(
    stream: &mut S,
    opts: &RecordOptions,
) -> Result<usize, FortioError> {
    let start = position(stream)?;
    let result = read_marker(stream, opts.endianness)
        .map_err(|source| FortioError::Read {
            offset: start,
            source,
        })
        .and_then(|head| validate_head(head, opts, start));
    rewind(stream, start)?;
    result.map(|bytes| bytes / opts.element_width.bytes())
}

/// Writes `payload` as one record. The payload is given in host order and
/// swapped to the file order while being copied through a bounded buffer.
pub fn write_record<W: Write>(
    stream: &mut W,
    opts: &RecordOptions,
    payload: &[u8],
) -> Result<(), FortioError> {
    let width = opts.element_width.bytes();
    if payload.len() % width != 0 {
        return Err(FortioError::InvalidArgument(format!(
            "payload of {} bytes is not a multiple of the {width}-byte element width",
            payload.len()
        )));
    }
    let head = i32::try_from(payload.len()).map_err(|_| {
        FortioError::InvalidArgument(format!(
            "{} elements of {width} bytes overflow the 32-bit record length",
            payload.len() / width
        ))
    })?;

    write_marker(stream, opts.endianness, head).map_err(|source| FortioError::Write { source })?;

    if opts.swaps_payload() && width > 1 {
        let chunk_bytes = WRITE_CHUNK_BYTES - WRITE_CHUNK_BYTES % width;
        let mut scratch = Vec::with_capacity(chunk_bytes.min(payload.len()));
        for chunk in payload.chunks(chunk_bytes) {
            scratch.clear();
            scratch.extend_from_slice(chunk);
            swap_in_place(&mut scratch, opts.element_width)?;
            stream
                .write_all(&scratch)
                .map_err(|source| FortioError::Write { source })?;
        }
    } else {
        stream
            .write_all(payload)
            .map_err(|source| FortioError::Write { source })?;
    }

    if opts.write_tail {
        write_marker(stream, opts.endianness, head)
            .map_err(|source| FortioError::Write { source })?;
    }
    debug!(bytes = payload.len(), "wrote binary record");
    Ok(())
}

fn get<S: Read + Seek>(
    stream: &mut S,
    opts: &RecordOptions,
    target: RecordTarget<'_>,
) -> Result<usize, FortioError> {
    let start = position(stream)?;
    match get_at(stream, opts, target, start) {
        Ok(count) => Ok(count),
        Err(error) => {
            rewind(stream, start)?;
            Err(error)
        }
    }
}

fn get_at<S: Read + Seek>(
    stream: &mut S,
    opts: &RecordOptions,
    target: RecordTarget<'_>,
    start: u64,
) -> Result<usize, FortioError> {
    let head = read_marker(stream, opts.endianness).map_err(|source| FortioError::Read {
        offset: start,
        source,
    })?;
    let length = validate_head(head, opts, start)?;
    let payload_offset = start + RECORD_MARKER_BYTES;

    match target {
        RecordTarget::Skip => {
            stream
                .seek(SeekFrom::Current(i64::from(head)))
                .map_err(|source| FortioError::Seek {
                    offset: payload_offset,
                    source,
                })?;
        }
        RecordTarget::Fixed(buffer) => {
            if length > buffer.len() {
                return Err(FortioError::InvalidArgument(format!(
                    "record of {length} bytes does not fit in a buffer of {} bytes",
                    buffer.len()
                )));
            }
            read_payload(stream, opts, &mut buffer[..length], payload_offset)?;
        }
        RecordTarget::Growable(buffer) => {
            let available = remaining(stream, payload_offset)?;
            if length as u64 > available {
                return Err(FortioError::InvalidRecord {
                    offset: start,
                    reason: format!(
                        "record of {length} bytes runs past the end of the stream ({available} bytes left)"
                    ),
                });
            }
            let mut payload = vec![0; length];
            read_payload(stream, opts, &mut payload, payload_offset)?;
            *buffer = payload;
        }
    }

    let payload_end = payload_offset + length as u64;
    match read_marker(stream, opts.endianness) {
        Ok(tail) if tail == head => {}
        Ok(tail) => match opts.tail {
            TailPolicy::Required => {
                return Err(FortioError::InvalidRecord {
                    offset: start,
                    reason: format!("tail {tail} does not match head {head}"),
                });
            }
            TailPolicy::AllowMissing => seek_to(stream, payload_end)?,
        },
        Err(source)
            if source.kind() == io::ErrorKind::UnexpectedEof
                && opts.tail == TailPolicy::AllowMissing =>
        {
            seek_to(stream, payload_end)?;
        }
        Err(source) => {
            return Err(FortioError::Read {
                offset: payload_end,
                source,
            });
        }
    }

    Ok(length / opts.element_width.bytes())
}

fn read_payload<S: Read>(
    stream: &mut S,
    opts: &RecordOptions,
    payload: &mut [u8],
    offset: u64,
) -> Result<(), FortioError> {
    stream
        .read_exact(payload)
        .map_err(|source| FortioError::Read { offset, source })?;
    if opts.swaps_payload() {
        swap_in_place(payload, opts.element_width)?;
    }
    Ok(())
}

fn validate_head(head: i32, opts: &RecordOptions, offset: u64) -> Result<usize, FortioError> {
    let width = opts.element_width.bytes();
    if head < 0 {
        return Err(FortioError::InvalidRecord {
            offset,
            reason: format!("negative record length {head}"),
        });
    }
    let length = head as usize;
    if length % width != 0 {
        return Err(FortioError::InvalidRecord {
            offset,
            reason: format!("record length {head} is not a multiple of element width {width}"),
        });
    }
    Ok(length)
}

fn read_marker<S: Read>(stream: &mut S, endianness: Endianness) -> io::Result<i32> {
    match endianness {
        Endianness::Big => stream.read_i32::<BigEndian>(),
        Endianness::Little => stream.read_i32::<LittleEndian>(),
    }
}

fn write_marker<W: Write>(stream: &mut W, endianness: Endianness, value: i32) -> io::Result<()> {
    match endianness {
        Endianness::Big => stream.write_i32::<BigEndian>(value),
        Endianness::Little => stream.write_i32::<LittleEndian>(value),
    }
}

fn position<S: Seek>(stream: &mut S) -> Result<u64, FortioError> {
    stream
        .stream_position()
        .map_err(|source| FortioError::Seek { offset: 0, source })
}

fn seek_to<S: Seek>(stream: &mut S, offset: u64) -> Result<(), FortioError> {
    stream
        .seek(SeekFrom::Start(offset))
        .map(|_| ())
        .map_err(|source| FortioError::Seek { offset, source })
}

/// Bytes left after the current position, which is `offset`.
fn remaining<S: Seek>(stream: &mut S, offset: u64) -> Result<u64, FortioError> {
    let end = stream
        .seek(SeekFrom::End(0))
        .map_err(|source| FortioError::Seek { offset, source })?;
    seek_to(stream, offset)?;
    Ok(end.saturating_sub(offset))
}

fn rewind<S: Seek>(stream: &mut S, offset: u64) -> Result<(), FortioError> {
    seek_to(stream, offset)
}

/// A stream bound to one set of record options.
#[derive(Debug)]
pub struct RecordStream<S> {
    stream: S,
    opts: RecordOptions,
}

impl<S> RecordStream<S> {
    pub fn new(stream: S, opts: RecordOptions) -> Self {
        Self { stream, opts }
    }

    pub fn options(&self) -> &RecordOptions {
        &self.opts
    }

    pub fn set_options(&mut self, opts: RecordOptions) {
        self.opts = opts;
    }

    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    pub fn into_inner(self) -> S {
        self.stream
    }
}

impl<S: Read + Seek> RecordStream<S> {
    pub fn read_record(&mut self, buffer: &mut Vec<u8>) -> Result<usize, FortioError> {
        read_record(&mut self.stream, &self.opts, buffer)
    }

    pub fn read_record_into(&mut self, buffer: &mut [u8]) -> Result<usize, FortioError> {
        read_record_into(&mut self.stream, &self.opts, buffer)
    }

    pub fn skip_record(&mut self) -> Result<usize, FortioError> {
        skip_record(&mut self.stream, &self.opts)
    }

    pub fn skip(&mut self, count: i64) -> Result<(), FortioError> {
        skip(&mut self.stream, &self.opts, count)
    }

    pub fn record_len(&mut self) -> Result<usize, FortioError> {
        record_len(&mut self.stream, &self.opts)
    }

    pub fn position(&mut self) -> Result<u64, FortioError> {
        position(&mut self.stream)
    }

    /// True when no bytes remain after the current position.
    pub fn at_end(&mut self) -> Result<bool, FortioError> {
        let start = position(&mut self.stream)?;
        let end = self
            .stream
            .seek(SeekFrom::End(0))
            .map_err(|source| FortioError::Seek {
                offset: start,
                source,
            })?;
        seek_to(&mut self.stream, start)?;
        Ok(start >= end)
    }
}

impl<S: Write> RecordStream<S> {
    pub fn write_record(&mut self, payload: &[u8]) -> Result<(), FortioError> {
        write_record(&mut self.stream, &self.opts, payload)
    }

    pub fn flush(&mut self) -> Result<(), FortioError> {
        self.stream
            .flush()
            .map_err(|source| FortioError::Write { source })
    }
}
