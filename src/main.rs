//! txnlog CLI
//!
//! Decodes a binary transaction log and prints every record followed by the
//! totals.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- txnlog.dat
//! cargo run -- --strict-tags --expect-magic MPS7 --format csv txnlog.dat
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Set to `debug` or `warn` to control logging verbosity

use clap::{Parser, ValueEnum};
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;
use std::process;
use txnlog::config::parse_magic;
use txnlog::{
    CsvReport, DecoderConfig, LogError, LogProcessor, ReportSink, Result, TagPolicy, TextReport,
    DEFAULT_TRACKED_USER,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Csv,
}

#[derive(Debug, Parser)]
#[command(version, about = "Decode a binary transaction log and report totals")]
struct Args {
    /// Path to the transaction log
    #[arg(env = "TXNLOG_INPUT")]
    input: PathBuf,

    /// Reject record tags other than 0-3 instead of reading them as autopay end
    #[arg(long, default_value_t = false)]
    strict_tags: bool,

    /// Require the header magic to equal this 4-character tag
    #[arg(long, value_name = "TAG")]
    expect_magic: Option<String>,

    /// User id whose net balance is reported
    #[arg(long, env = "TXNLOG_TRACKED_USER", default_value_t = DEFAULT_TRACKED_USER)]
    tracked_user: u64,

    /// Report format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,
}

impl Args {
    fn decoder_config(&self) -> Result<DecoderConfig> {
        let mut config = DecoderConfig::new().with_tracked_user(self.tracked_user);
        if self.strict_tags {
            config = config.with_tag_policy(TagPolicy::Strict);
        }
        if let Some(magic) = &self.expect_magic {
            config = config.with_expected_magic(parse_magic(magic)?);
        }
        Ok(config)
    }
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let config = args.decoder_config()?;
    let file = File::open(&args.input).map_err(|source| LogError::UnreadableSource {
        path: args.input.clone(),
        source,
    })?;
    let reader = BufReader::new(file);

    let stdout = io::stdout();
    let handle = stdout.lock();
    match args.format {
        Format::Text => decode(config, reader, TextReport::new(handle)),
        Format::Csv => decode(config, reader, CsvReport::new(handle)),
    }
}

fn decode<S: ReportSink>(config: DecoderConfig, reader: BufReader<File>, sink: S) -> Result<()> {
    let mut processor = LogProcessor::new(config, sink);
    let outcome = processor.process_reader(reader);
    // Dropping the sink flushes rows buffered before a failure.
    drop(processor);
    io::stdout().flush()?;
    outcome
}
