//! Running totals over a decoded record stream.
//!
//! [`AggregateState`] is the pure fold; [`LogProcessor`] drives a decoder
//! across a whole log, folding each record and handing it to a
//! [`ReportSink`] in file order.

use crate::config::DecoderConfig;
use crate::error::Result;
use crate::header::LogHeader;
use crate::reader::LogReader;
use crate::record::{decode_record, Record, RecordKind};
use crate::report::ReportSink;
use log::{debug, info, warn};
use std::io::Read;

/// Totals accumulated over every record seen so far.
///
/// All sums are order-independent, so the state only depends on which
/// records were applied, not in what order.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateState {
    /// Sum of all Debit amounts.
    pub debit_total: f64,

    /// Sum of all Credit amounts.
    pub credit_total: f64,

    /// Number of StartAutopay records.
    pub autopay_start_count: u64,

    /// Number of EndAutopay records, undefined tags included.
    pub autopay_end_count: u64,

    /// Credits minus debits for [`tracked_user`](Self::tracked_user).
    pub tracked_user_balance: f64,

    /// The user id whose balance is tracked.
    pub tracked_user: u64,

    /// Records applied.
    pub records: u64,
}

impl AggregateState {
    /// Creates zeroed totals tracking `tracked_user`.
    pub fn new(tracked_user: u64) -> Self {
        AggregateState {
            debit_total: 0.0,
            credit_total: 0.0,
            autopay_start_count: 0,
            autopay_end_count: 0,
            tracked_user_balance: 0.0,
            tracked_user,
            records: 0,
        }
    }

    /// Folds one record into the totals.
    pub fn apply(&mut self, record: &Record) {
        let amount = record.amount.unwrap_or(0.0);
        let tracked = record.user_id == self.tracked_user;

        match record.kind {
            RecordKind::Debit => {
                self.debit_total += amount;
                if tracked {
                    self.tracked_user_balance -= amount;
                }
            }
            RecordKind::Credit => {
                self.credit_total += amount;
                if tracked {
                    self.tracked_user_balance += amount;
                }
            }
            RecordKind::StartAutopay => self.autopay_start_count += 1,
            RecordKind::EndAutopay => self.autopay_end_count += 1,
        }

        self.records += 1;
    }
}

/// Decodes a full log, folding records into an [`AggregateState`].
///
/// The sink sees the header, then every record in file order, then the
/// summary. The summary is only emitted once every record announced by the
/// header has decoded; a failure part way through returns the error with
/// no summary.
pub struct LogProcessor<S> {
    config: DecoderConfig,
    state: AggregateState,
    sink: S,
}

impl<S: ReportSink> LogProcessor<S> {
    /// Creates a processor with fresh totals.
    pub fn new(config: DecoderConfig, sink: S) -> Self {
        let state = AggregateState::new(config.tracked_user);
        LogProcessor {
            config,
            state,
            sink,
        }
    }

    /// Totals accumulated so far.
    pub fn state(&self) -> &AggregateState {
        &self.state
    }

    /// Decodes a log from a reader, one record at a time.
    pub fn process_reader<R: Read>(&mut self, reader: R) -> Result<()> {
        let mut log = LogReader::new(reader, self.config.clone())?;
        self.begin(log.header())?;

        for item in log.by_ref() {
            let (index, record) = item?;
            self.fold(index, record)?;
        }

        if log.has_trailing_bytes()? {
            debug!("Ignoring trailing bytes after last record");
        }
        self.finish()
    }

    /// Decodes a log that is already fully in memory.
    pub fn process_bytes(&mut self, buf: &[u8]) -> Result<()> {
        let (header, mut cursor) = LogHeader::decode(buf)?;
        header.validate(&self.config)?;
        self.begin(&header)?;

        for index in 0..header.record_count() {
            let (record, consumed) = decode_record(buf, cursor, index, self.config.tag_policy)?;
            cursor += consumed;
            self.fold(index, record)?;
        }

        if cursor < buf.len() {
            debug!(
                "Ignoring {} trailing bytes after last record",
                buf.len() - cursor
            );
        }
        self.finish()
    }

    /// Consumes the processor, returning the totals and the sink.
    pub fn into_parts(self) -> (AggregateState, S) {
        (self.state, self.sink)
    }

    fn begin(&mut self, header: &LogHeader) -> Result<()> {
        info!(
            "Decoding log {:?} v{} with {} records",
            header.magic_str(),
            header.version,
            header.record_count()
        );
        self.sink.header(header)
    }

    fn fold(&mut self, index: u64, record: Record) -> Result<()> {
        if RecordKind::try_from_tag(record.tag).is_none() {
            warn!(
                "Record {}: undefined tag {:#04x} treated as {}",
                index + 1,
                record.tag,
                record.kind
            );
        }
        debug!(
            "Record {}: {} user {} at {}",
            index + 1,
            record.kind,
            record.user_id,
            record.timestamp
        );

        self.state.apply(&record);
        self.sink.record(index, &record, &self.state)
    }

    fn finish(&mut self) -> Result<()> {
        info!("Decoded {} records", self.state.records);
        self.sink.summary(&self.state)
    }
}
