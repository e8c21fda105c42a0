//! Record model and the slice record decoder.

use crate::codec::{
    decode_f64be, decode_u32be, decode_u64be, put_f64be, put_u32be, put_u64be, F64_WIDTH,
    U32_WIDTH, U64_WIDTH,
};
use crate::config::TagPolicy;
use crate::error::{LogError, Result};
use std::fmt;

/// Bytes shared by every record: tag, timestamp and user id.
pub const FIXED_LEN: usize = 1 + U32_WIDTH + U64_WIDTH;

/// Encoded size of a Debit or Credit record.
pub const AMOUNT_RECORD_LEN: usize = FIXED_LEN + F64_WIDTH;

const TIMESTAMP_OFFSET: usize = 1;
const USER_ID_OFFSET: usize = TIMESTAMP_OFFSET + U32_WIDTH;
const AMOUNT_OFFSET: usize = FIXED_LEN;

/// Record type, selected by the first byte of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// Money out of the user's account. Tag `0x00`.
    Debit,

    /// Money into the user's account. Tag `0x01`.
    Credit,

    /// Autopay was switched on. Tag `0x02`.
    StartAutopay,

    /// Autopay was switched off. Tag `0x03`, and every undefined tag in
    /// lenient mode.
    EndAutopay,
}

impl RecordKind {
    /// Maps a tag byte to a kind with the catch-all fallthrough: anything
    /// that is not 0, 1 or 2 is `EndAutopay`.
    pub fn from_tag(tag: u8) -> Self {
        match tag {
            0 => RecordKind::Debit,
            1 => RecordKind::Credit,
            2 => RecordKind::StartAutopay,
            _ => RecordKind::EndAutopay,
        }
    }

    /// Maps a tag byte to a kind, accepting only the four defined tags.
    pub fn try_from_tag(tag: u8) -> Option<Self> {
        match tag {
            0..=3 => Some(Self::from_tag(tag)),
            _ => None,
        }
    }

    /// Resolves `tag` under `policy`, reporting the record position on
    /// rejection.
    pub fn resolve(tag: u8, policy: TagPolicy, index: u64, offset: u64) -> Result<Self> {
        match policy {
            TagPolicy::Lenient => Ok(Self::from_tag(tag)),
            TagPolicy::Strict => {
                Self::try_from_tag(tag).ok_or(LogError::UnknownTag { index, offset, tag })
            }
        }
    }

    /// The canonical tag byte for this kind.
    pub fn tag(self) -> u8 {
        match self {
            RecordKind::Debit => 0,
            RecordKind::Credit => 1,
            RecordKind::StartAutopay => 2,
            RecordKind::EndAutopay => 3,
        }
    }

    /// Whether records of this kind carry an amount field.
    pub fn has_amount(self) -> bool {
        matches!(self, RecordKind::Debit | RecordKind::Credit)
    }

    /// Total encoded size of a record of this kind, tag included.
    pub fn encoded_len(self) -> usize {
        if self.has_amount() {
            AMOUNT_RECORD_LEN
        } else {
            FIXED_LEN
        }
    }

    /// Upper-case label used in reports.
    pub fn label(self) -> &'static str {
        match self {
            RecordKind::Debit => "DEBIT",
            RecordKind::Credit => "CREDIT",
            RecordKind::StartAutopay => "AUTOPAY START",
            RecordKind::EndAutopay => "AUTOPAY END",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single decoded log record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Record {
    /// The tag byte as it appeared on disk.
    pub tag: u8,

    /// Kind derived from the tag.
    pub kind: RecordKind,

    /// Unix epoch seconds, decoded signed.
    pub timestamp: i32,

    /// User the record belongs to.
    pub user_id: u64,

    /// Dollar amount; present only for Debit and Credit.
    pub amount: Option<f64>,
}

impl Record {
    pub fn debit(timestamp: i32, user_id: u64, amount: f64) -> Self {
        Self::with_kind(RecordKind::Debit, timestamp, user_id, Some(amount))
    }

    pub fn credit(timestamp: i32, user_id: u64, amount: f64) -> Self {
        Self::with_kind(RecordKind::Credit, timestamp, user_id, Some(amount))
    }

    pub fn start_autopay(timestamp: i32, user_id: u64) -> Self {
        Self::with_kind(RecordKind::StartAutopay, timestamp, user_id, None)
    }

    pub fn end_autopay(timestamp: i32, user_id: u64) -> Self {
        Self::with_kind(RecordKind::EndAutopay, timestamp, user_id, None)
    }

    fn with_kind(kind: RecordKind, timestamp: i32, user_id: u64, amount: Option<f64>) -> Self {
        Record {
            tag: kind.tag(),
            kind,
            timestamp,
            user_id,
            amount,
        }
    }

    /// Size of this record on disk.
    pub fn encoded_len(&self) -> usize {
        self.kind.encoded_len()
    }

    /// Encodes the record into its wire form, preserving the raw tag byte.
    ///
    /// A Debit or Credit without an amount is written with `0.0`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        out.push(self.tag);
        put_u32be(&mut out, self.timestamp as u32);
        put_u64be(&mut out, self.user_id);
        if self.kind.has_amount() {
            put_f64be(&mut out, self.amount.unwrap_or(0.0));
        }
        out
    }
}

/// Decodes the record starting at `offset` in `buf`.
///
/// `index` is the record's 0-based position in the log and is only used for
/// error reporting. Returns the record and the number of bytes it occupied.
pub fn decode_record(
    buf: &[u8],
    offset: usize,
    index: u64,
    policy: TagPolicy,
) -> Result<(Record, usize)> {
    let available = buf.len().saturating_sub(offset);
    let truncated = |needed: usize| LogError::TruncatedRecord {
        index,
        offset: offset as u64,
        needed,
        available,
    };

    let tag = *buf.get(offset).ok_or_else(|| truncated(1))?;
    let kind = RecordKind::resolve(tag, policy, index, offset as u64)?;
    let needed = kind.encoded_len();
    if available < needed {
        return Err(truncated(needed));
    }

    let timestamp =
        decode_u32be(buf, offset + TIMESTAMP_OFFSET).ok_or_else(|| truncated(needed))?;
    let user_id = decode_u64be(buf, offset + USER_ID_OFFSET).ok_or_else(|| truncated(needed))?;
    let amount = if kind.has_amount() {
        Some(decode_f64be(buf, offset + AMOUNT_OFFSET).ok_or_else(|| truncated(needed))?)
    } else {
        None
    };

    Ok((
        Record {
            tag,
            kind,
            timestamp,
            user_id,
            amount,
        },
        needed,
    ))
}
