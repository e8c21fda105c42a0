//! Incremental log reader.
//!
//! [`LogReader`] decodes the same format as [`LogHeader::decode`] and
//! [`decode_record`] but pulls bytes from any [`Read`] one record at a time,
//! so truncation is detected at the first short read instead of after the
//! whole file has been loaded.

use crate::config::DecoderConfig;
use crate::error::{LogError, Result};
use crate::header::{LogHeader, HEADER_LEN};
use crate::record::{decode_record, Record, RecordKind, AMOUNT_RECORD_LEN};
use std::io::{self, ErrorKind, Read};

/// Reads a log header eagerly, then yields its records on demand.
///
/// Iteration yields `(index, record)` pairs, exactly
/// [`LogHeader::record_count`] of them. The first error ends iteration.
///
/// # Examples
///
/// ```
/// use txnlog::{DecoderConfig, LogHeader, LogReader, Record};
/// use std::io::Cursor;
///
/// let header = LogHeader { magic: *b"TXN1", version: 1, raw_count: 0 };
/// let mut bytes = header.to_bytes();
/// bytes.extend(Record::credit(1000, 42, 100.0).to_bytes());
///
/// let reader = LogReader::new(Cursor::new(bytes), DecoderConfig::new()).unwrap();
/// let records: Vec<_> = reader.collect::<Result<_, _>>().unwrap();
/// assert_eq!(records, vec![(0, Record::credit(1000, 42, 100.0))]);
/// ```
pub struct LogReader<R> {
    inner: R,
    header: LogHeader,
    config: DecoderConfig,
    offset: u64,
    next_index: u64,
    failed: bool,
}

impl<R: Read> LogReader<R> {
    /// Reads and validates the header from `inner`.
    pub fn new(mut inner: R, config: DecoderConfig) -> Result<Self> {
        let mut buf = [0u8; HEADER_LEN];
        let read = fill(&mut inner, &mut buf)?;
        let (header, next) = LogHeader::decode(&buf[..read])?;
        header.validate(&config)?;

        Ok(LogReader {
            inner,
            header,
            config,
            offset: next as u64,
            next_index: 0,
            failed: false,
        })
    }

    pub fn header(&self) -> &LogHeader {
        &self.header
    }

    /// Absolute byte offset of the next record.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Records still to be decoded.
    pub fn remaining(&self) -> u64 {
        self.header.record_count() - self.next_index
    }

    /// Whether any byte follows the current position. Reads at most one byte.
    pub fn has_trailing_bytes(&mut self) -> Result<bool> {
        let mut next = [0u8; 1];
        Ok(fill(&mut self.inner, &mut next)? > 0)
    }

    fn read_record(&mut self) -> Result<Record> {
        let index = self.next_index;
        let offset = self.offset;
        let policy = self.config.tag_policy;
        let mut buf = [0u8; AMOUNT_RECORD_LEN];

        if fill(&mut self.inner, &mut buf[..1])? == 0 {
            return Err(LogError::TruncatedRecord {
                index,
                offset,
                needed: 1,
                available: 0,
            });
        }
        let needed = RecordKind::resolve(buf[0], policy, index, offset)?.encoded_len();
        let got = 1 + fill(&mut self.inner, &mut buf[1..needed])?;

        let (record, consumed) =
            decode_record(&buf[..got], 0, index, policy).map_err(|e| relocate(e, offset))?;
        self.offset += consumed as u64;
        self.next_index += 1;
        Ok(record)
    }
}

impl<R: Read> Iterator for LogReader<R> {
    type Item = Result<(u64, Record)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.remaining() == 0 {
            return None;
        }

        let index = self.next_index;
        match self.read_record() {
            Ok(record) => Some(Ok((index, record))),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

/// Reads until `buf` is full or the source is exhausted; returns bytes read.
fn fill<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Rewrites record offsets from a record-local buffer to the stream position.
fn relocate(err: LogError, base: u64) -> LogError {
    match err {
        LogError::TruncatedRecord {
            index,
            offset,
            needed,
            available,
        } => LogError::TruncatedRecord {
            index,
            offset: base + offset,
            needed,
            available,
        },
        LogError::UnknownTag { index, offset, tag } => LogError::UnknownTag {
            index,
            offset: base + offset,
            tag,
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TagPolicy;
    use std::io::Cursor;

    fn log_bytes(records: &[Record]) -> Vec<u8> {
        let header = LogHeader {
            magic: *b"TXN1",
            version: 1,
            raw_count: records.len() as i32 - 1,
        };
        let mut bytes = header.to_bytes();
        for record in records {
            bytes.extend(record.to_bytes());
        }
        bytes
    }

    /// Hands out at most one byte per `read` call.
    struct Trickle<R>(R);

    impl<R: Read> Read for Trickle<R> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let end = buf.len().min(1);
            self.0.read(&mut buf[..end])
        }
    }

    #[test]
    fn test_reads_all_records_in_order() {
        let records = [
            Record::credit(1000, 42, 100.0),
            Record::start_autopay(1001, 42),
            Record::debit(1002, 42, 40.0),
        ];
        let reader = LogReader::new(Cursor::new(log_bytes(&records)), DecoderConfig::new()).unwrap();
        assert_eq!(reader.header().record_count(), 3);

        let decoded: Vec<_> = reader.collect::<Result<_>>().unwrap();
        assert_eq!(
            decoded,
            vec![(0, records[0]), (1, records[1]), (2, records[2])]
        );
    }

    #[test]
    fn test_short_reads_are_reassembled() {
        let records = [Record::debit(5, 6, 7.25), Record::end_autopay(8, 9)];
        let source = Trickle(Cursor::new(log_bytes(&records)));
        let mut reader = LogReader::new(source, DecoderConfig::new()).unwrap();

        assert_eq!(reader.next().unwrap().unwrap(), (0, records[0]));
        assert_eq!(reader.offset(), 9 + 21);
        assert_eq!(reader.next().unwrap().unwrap(), (1, records[1]));
        assert_eq!(reader.offset(), 9 + 21 + 13);
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_truncated_header() {
        let bytes = log_bytes(&[Record::start_autopay(1, 1)]);
        match LogReader::new(Cursor::new(&bytes[..6]), DecoderConfig::new()) {
            Err(LogError::TruncatedHeader { available }) => assert_eq!(available, 6),
            Err(other) => panic!("Expected TruncatedHeader, got {:?}", other),
            Ok(_) => panic!("Expected TruncatedHeader"),
        }
    }

    #[test]
    fn test_truncated_record_reports_absolute_offset() {
        let mut bytes = log_bytes(&[Record::start_autopay(1, 1), Record::credit(2, 2, 2.0)]);
        bytes.truncate(bytes.len() - 3);

        let mut reader = LogReader::new(Cursor::new(bytes), DecoderConfig::new()).unwrap();
        assert!(reader.next().unwrap().is_ok());
        match reader.next().unwrap() {
            Err(LogError::TruncatedRecord {
                index,
                offset,
                needed,
                available,
            }) => {
                assert_eq!(index, 1);
                assert_eq!(offset, 22);
                assert_eq!(needed, 21);
                assert_eq!(available, 18);
            }
            other => panic!("Expected TruncatedRecord, got {:?}", other),
        }
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_count_exceeds_data() {
        let mut bytes = log_bytes(&[Record::start_autopay(1, 1)]);
        bytes[8] = 4;

        let results: Vec<_> = LogReader::new(Cursor::new(bytes), DecoderConfig::new())
            .unwrap()
            .collect();
        assert_eq!(results.len(), 2);
        assert!(matches!(
            results[1],
            Err(LogError::TruncatedRecord {
                index: 1,
                offset: 22,
                needed: 1,
                available: 0,
            })
        ));
    }

    #[test]
    fn test_strict_unknown_tag_offset() {
        let mut bytes = log_bytes(&[Record::start_autopay(1, 1), Record::end_autopay(2, 2)]);
        bytes[22] = 0x10;

        let config = DecoderConfig::new().with_tag_policy(TagPolicy::Strict);
        let results: Vec<_> = LogReader::new(Cursor::new(bytes), config).unwrap().collect();
        assert!(matches!(
            results[1],
            Err(LogError::UnknownTag {
                index: 1,
                offset: 22,
                tag: 0x10,
            })
        ));
    }

    #[test]
    fn test_bad_magic_fails_before_records() {
        let bytes = log_bytes(&[Record::start_autopay(1, 1)]);
        let config = DecoderConfig::new().with_expected_magic(*b"MPS7");
        assert!(matches!(
            LogReader::new(Cursor::new(bytes), config),
            Err(LogError::BadMagic { .. })
        ));
    }

    #[test]
    fn test_no_trailing_bytes() {
        let bytes = log_bytes(&[Record::start_autopay(1, 1)]);
        let mut reader = LogReader::new(Cursor::new(bytes), DecoderConfig::new()).unwrap();
        assert_eq!(reader.by_ref().count(), 1);
        assert!(!reader.has_trailing_bytes().unwrap());
    }

    #[test]
    fn test_trailing_bytes_detected() {
        let mut bytes = log_bytes(&[Record::start_autopay(1, 1)]);
        bytes.extend_from_slice(&[0, 0, 0]);

        let mut reader = LogReader::new(Cursor::new(bytes), DecoderConfig::new()).unwrap();
        assert_eq!(reader.by_ref().count(), 1);
        assert!(reader.has_trailing_bytes().unwrap());
    }
}
