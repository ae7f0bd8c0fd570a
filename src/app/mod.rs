pub mod cli;
pub mod config;
pub mod logging_system;

pub use cli::{CliArgs, DiagnosticLevel};
pub use config::{ConfigError, EnrichmentConfig, SharedConfig};
pub use logging_system::{LoggingError, LoggingSystem, setup_logging};

use crate::agent::LocalAgent;
use crate::domain::log_record::MESSAGE;
use crate::domain::{EnricherError, LogRecord};
use crate::enricher::EnrichmentMode;
use crate::format::{Format, FormatChainHost, FormatOptions, create_formatter};
use serde_json::Value;
use std::path::Path;
use std::process;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};
use tracing::{debug, error, info, warn};

/// Counts from one pass over the input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub lines_read: u64,
    pub records_written: u64,
    pub records_forwarded: u64,
}

/// The `log-enricher` filter: NDJSON in, enriched NDJSON out.
pub struct App {
    args: CliArgs,
    agent: Arc<LocalAgent>,
    formatter: Arc<dyn Format>,
    options: FormatOptions,
}

impl App {
    pub fn from_args<I, T>(args: I) -> Result<Self, EnricherError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let args = CliArgs::from_args(args)?;
        let config = EnrichmentConfig::load(args.config_file.as_deref())?;
        Ok(Self::new(args, config))
    }

    pub fn new(args: CliArgs, config: EnrichmentConfig) -> Self {
        let agent = Arc::new(LocalAgent::new(config));
        let host = FormatChainHost::new();
        let formatter = create_formatter(agent.clone(), &host);
        let options = FormatOptions {
            pretty: args.pretty,
        };

        Self {
            args,
            agent,
            formatter,
            options,
        }
    }

    pub fn agent(&self) -> &Arc<LocalAgent> {
        &self.agent
    }

    pub fn args(&self) -> &CliArgs {
        &self.args
    }

    /// Mode the next record will be enriched in.
    pub fn mode(&self) -> EnrichmentMode {
        EnrichmentMode::for_agent(self.agent.as_ref())
    }

    /// Enriches one input line. Blank lines yield `None`.
    pub fn process_line(&self, line: &str) -> Option<String> {
        if line.trim().is_empty() {
            return None;
        }

        let record = parse_record(line);
        let record = self.formatter.transform(record, &self.options)?;
        record.rendered().map(str::to_string)
    }

    /// Reads the configured input, writes to stdout and harvests forwarded
    /// records.
    pub async fn run(&self) -> Result<RunSummary, EnricherError> {
        let stdout = tokio::io::stdout();
        let mut summary = match &self.args.input {
            Some(path) => {
                let file = tokio::fs::File::open(path).await?;
                self.run_with(BufReader::new(file), stdout).await?
            }
            None => {
                self.run_with(BufReader::new(tokio::io::stdin()), stdout)
                    .await?
            }
        };

        summary.records_forwarded = match &self.args.forward_output {
            Some(path) => self.write_forwarded(path).await?,
            None => 0,
        };

        for (name, count) in self.agent.in_memory_metrics().snapshot() {
            info!(metric = %name, count, "Supportability metric");
        }
        info!(
            lines_read = summary.lines_read,
            records_written = summary.records_written,
            records_forwarded = summary.records_forwarded,
            "log-enricher finished"
        );

        Ok(summary)
    }

    /// Enriches every line of `reader` into `writer`.
    ///
    /// Lines that are not valid UTF-8 are decoded lossily and carried
    /// through as messages. Whatever was written is flushed even when
    /// reading or writing fails part-way.
    pub async fn run_with<R, W>(&self, mut reader: R, writer: W) -> Result<RunSummary, EnricherError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut writer = BufWriter::new(writer);
        let mut summary = RunSummary::default();
        let mut buf = Vec::new();

        let outcome: std::io::Result<()> = loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break Ok(()),
                Ok(_) => {}
                Err(e) => break Err(e),
            }
            summary.lines_read += 1;

            let line = String::from_utf8_lossy(strip_line_ending(&buf));
            if let Some(rendered) = self.process_line(&line) {
                if let Err(e) = write_line(&mut writer, &rendered).await {
                    break Err(e);
                }
                summary.records_written += 1;
            }
        };

        let flushed = writer.flush().await;
        if let Err(e) = &outcome {
            warn!(
                lines_read = summary.lines_read,
                "Stopped enriching input: {}", e
            );
        }
        outcome?;
        flushed?;
        Ok(summary)
    }

    /// Drains the aggregator into `path` as NDJSON. Returns the number of
    /// records written.
    pub async fn write_forwarded(&self, path: &Path) -> Result<u64, EnricherError> {
        let records = self.agent.aggregator().drain();
        debug!(
            records = records.len(),
            seen = self.agent.aggregator().seen(),
            "Harvesting forwarded records"
        );

        let mut buffer = Vec::new();
        for record in &records {
            serde_json::to_writer(&mut buffer, record)?;
            buffer.push(b'\n');
        }
        tokio::fs::write(path, buffer).await?;

        Ok(records.len() as u64)
    }
}

fn strip_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

async fn write_line<W>(writer: &mut W, line: &str) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(line.as_bytes()).await?;
    writer.write_all(b"\n").await
}

/// JSON objects become records; anything else is wrapped as a message.
pub fn parse_record(line: &str) -> LogRecord {
    match serde_json::from_str::<Value>(line) {
        Ok(Value::Object(fields)) => LogRecord::from_map(fields),
        _ => LogRecord::new().with(MESSAGE, line),
    }
}

pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

pub async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = match CliArgs::from_args(std::env::args()) {
        Ok(args) => args,
        Err(e) => e.exit(),
    };

    if let Err(e) = setup_logging(args.log_level) {
        eprintln!("Warning: {e}");
    }

    let config = match EnrichmentConfig::load(args.config_file.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {}", e);
            process::exit(1);
        }
    };

    info!("Starting log-enricher v{}", get_version());
    let app = App::new(args, config);
    info!("Enrichment mode: {}", app.mode());

    if let Err(e) = app.run().await {
        error!("Application error: {}", e);
        process::exit(1);
    }

    Ok(())
}
