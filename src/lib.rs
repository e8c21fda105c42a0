//! # txnlog
//!
//! Decodes fixed-layout, big-endian binary transaction logs into typed
//! records and accumulates running totals.
//!
//! ## Format
//!
//! A 9-byte header (4-byte magic, version byte, 32-bit count field holding
//! one less than the number of records) followed by records of 13 or 21
//! bytes: tag, 32-bit timestamp, 64-bit user id and, for debits and credits,
//! a 64-bit float amount.
//!
//! ## Design Principles
//!
//! - **Bounds-checked**: every field read is length checked; short input is a
//!   typed error naming the record and offset
//! - **Incremental**: [`LogReader`] decodes from any `Read` without loading
//!   the whole file
//! - **Fatal errors**: records have no framing of their own, so decoding
//!   stops at the first bad record and no summary is reported
//!
//! ## Example
//!
//! ```no_run
//! use txnlog::{DecoderConfig, LogProcessor, TextReport};
//! use std::fs::File;
//! use std::io::BufReader;
//!
//! let file = BufReader::new(File::open("txnlog.dat").unwrap());
//! let mut processor = LogProcessor::new(DecoderConfig::new(), TextReport::new(std::io::stdout()));
//! processor.process_reader(file).unwrap();
//! ```

pub mod aggregate;
pub mod codec;
pub mod config;
pub mod error;
pub mod header;
pub mod reader;
pub mod record;
pub mod report;

pub use aggregate::{AggregateState, LogProcessor};
pub use config::{DecoderConfig, TagPolicy, DEFAULT_TRACKED_USER};
pub use error::{LogError, Result};
pub use header::{LogHeader, HEADER_LEN};
pub use reader::LogReader;
pub use record::{decode_record, Record, RecordKind};
pub use report::{CsvReport, NullReport, ReportSink, TextReport};
