//! Report sinks that render decoded records and final totals.

use crate::aggregate::AggregateState;
use crate::error::Result;
use crate::header::LogHeader;
use crate::record::{Record, RecordKind};
use serde::Serialize;
use std::io::Write;

/// Receives decoding progress from a [`LogProcessor`](crate::LogProcessor).
///
/// `record` is called once per record in file order with the totals after
/// that record was applied. `summary` is called only if the whole log
/// decoded.
pub trait ReportSink {
    fn header(&mut self, header: &LogHeader) -> Result<()>;

    fn record(&mut self, index: u64, record: &Record, state: &AggregateState) -> Result<()>;

    fn summary(&mut self, state: &AggregateState) -> Result<()>;
}

/// Discards everything; useful when only the totals are wanted.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReport;

impl ReportSink for NullReport {
    fn header(&mut self, _header: &LogHeader) -> Result<()> {
        Ok(())
    }

    fn record(&mut self, _index: u64, _record: &Record, _state: &AggregateState) -> Result<()> {
        Ok(())
    }

    fn summary(&mut self, _state: &AggregateState) -> Result<()> {
        Ok(())
    }
}

/// Human-readable console report.
///
/// Record numbers are 1-based. Amounts are printed in dollars with two
/// decimal places.
pub struct TextReport<W> {
    writer: W,
}

impl<W: Write> TextReport<W> {
    pub fn new(writer: W) -> Self {
        TextReport { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ReportSink for TextReport<W> {
    fn header(&mut self, header: &LogHeader) -> Result<()> {
        writeln!(self.writer, "File type: {}", header.magic_str())?;
        writeln!(self.writer, "Version: {}", header.version)?;
        writeln!(self.writer, "Number of Records: {}", header.record_count())?;
        Ok(())
    }

    fn record(&mut self, index: u64, record: &Record, state: &AggregateState) -> Result<()> {
        let w = &mut self.writer;
        writeln!(w)?;
        writeln!(w, "Record No. {} - {}", index + 1, record.kind)?;
        writeln!(w, "unix epoch: {}", record.timestamp)?;
        writeln!(w, "userid: {}", record.user_id)?;
        match record.kind {
            RecordKind::Debit | RecordKind::Credit => {
                writeln!(w, "amount: ${:.2}", record.amount.unwrap_or(0.0))?;
            }
            RecordKind::StartAutopay => {
                writeln!(w, "autopay start count: {}", state.autopay_start_count)?;
            }
            RecordKind::EndAutopay => {
                writeln!(w, "autopay end count: {}", state.autopay_end_count)?;
            }
        }
        Ok(())
    }

    fn summary(&mut self, state: &AggregateState) -> Result<()> {
        let w = &mut self.writer;
        writeln!(w)?;
        writeln!(w, "Total Debit: ${:.2}", state.debit_total)?;
        writeln!(w, "Total Credit: ${:.2}", state.credit_total)?;
        writeln!(w, "Total Autopays Started: {}", state.autopay_start_count)?;
        writeln!(w, "Total Autopays Ended: {}", state.autopay_end_count)?;
        writeln!(w)?;
        writeln!(
            w,
            "User {} balance: ${:.2}",
            state.tracked_user, state.tracked_user_balance
        )?;
        w.flush()?;
        Ok(())
    }
}

/// One CSV row per decoded record.
#[derive(Debug, Serialize)]
struct RecordRow {
    record: u64,
    kind: &'static str,
    tag: u8,
    timestamp: i32,
    user_id: u64,
    amount: Option<f64>,
}

/// CSV report: a `record,kind,tag,timestamp,user_id,amount` block followed
/// by a `metric,value` summary block.
pub struct CsvReport<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CsvReport<W> {
    pub fn new(writer: W) -> Self {
        let writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(writer);
        CsvReport { writer }
    }

    /// Flushes and returns the underlying writer.
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| e.into_error().into())
    }
}

impl<W: Write> ReportSink for CsvReport<W> {
    fn header(&mut self, _header: &LogHeader) -> Result<()> {
        Ok(())
    }

    fn record(&mut self, index: u64, record: &Record, _state: &AggregateState) -> Result<()> {
        let kind = match record.kind {
            RecordKind::Debit => "debit",
            RecordKind::Credit => "credit",
            RecordKind::StartAutopay => "start_autopay",
            RecordKind::EndAutopay => "end_autopay",
        };
        self.writer.serialize(RecordRow {
            record: index + 1,
            kind,
            tag: record.tag,
            timestamp: record.timestamp,
            user_id: record.user_id,
            amount: record.amount,
        })?;
        Ok(())
    }

    fn summary(&mut self, state: &AggregateState) -> Result<()> {
        self.writer.write_record(["metric", "value"])?;
        self.writer.serialize(("debit_total", state.debit_total))?;
        self.writer.serialize(("credit_total", state.credit_total))?;
        self.writer
            .serialize(("autopay_start_count", state.autopay_start_count))?;
        self.writer
            .serialize(("autopay_end_count", state.autopay_end_count))?;
        self.writer.serialize(("tracked_user", state.tracked_user))?;
        self.writer
            .serialize(("tracked_user_balance", state.tracked_user_balance))?;
        self.writer.flush()?;
        Ok(())
    }
}
