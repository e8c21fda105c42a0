//! Error types for the transaction log decoder.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for decoder operations
pub type Result<T> = std::result::Result<T, LogError>;

/// Errors that can occur while decoding or reporting a transaction log.
///
/// Every decode error is fatal for the run: records carry no framing of their
/// own, so once one record is misread the cursor for every later record is
/// unknown.
#[derive(Error, Debug)]
pub enum LogError {
    /// The input could not be opened
    #[error("cannot read {}: {source}", path.display())]
    UnreadableSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Read or write failure after the input was opened
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV report error
    #[error("CSV output error: {0}")]
    Csv(#[from] csv::Error),

    /// Fewer than 9 bytes were available for the header
    #[error("truncated header: need 9 bytes, only {available} available")]
    TruncatedHeader { available: usize },

    /// Not enough bytes remained to decode a record
    ///
    /// `index` is 0-based; messages number records from 1 like the reports.
    #[error(
        "truncated record {} at offset {offset}: need {needed} bytes, only {available} available",
        .index + 1
    )]
    TruncatedRecord {
        index: u64,
        offset: u64,
        needed: usize,
        available: usize,
    },

    /// Tag outside 0..=3, only raised when strict tag validation is on
    #[error("unknown record tag {tag:#04x} for record {} at offset {offset}", .index + 1)]
    UnknownTag { index: u64, offset: u64, tag: u8 },

    /// Header magic did not match the configured value
    #[error("bad magic: expected {expected:?}, found {found:?}")]
    BadMagic { expected: String, found: String },

    /// `--expect-magic` was not exactly four bytes
    #[error("magic must be exactly 4 bytes, got {0:?}")]
    InvalidMagicArgument(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_errors_number_from_one() {
        let truncated = LogError::TruncatedRecord {
            index: 1,
            offset: 30,
            needed: 21,
            available: 20,
        };
        assert_eq!(
            truncated.to_string(),
            "truncated record 2 at offset 30: need 21 bytes, only 20 available"
        );

        let unknown = LogError::UnknownTag {
            index: 0,
            offset: 9,
            tag: 4,
        };
        assert_eq!(
            unknown.to_string(),
            "unknown record tag 0x04 for record 1 at offset 9"
        );
    }
}
