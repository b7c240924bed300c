//! Trace replay front-end for the cachestore set-associative cache.

use std::cell::RefCell;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::process;
use std::rc::Rc;

use clap::Parser;
use serde::Serialize;
use thiserror::Error;

use cachestore::sim::{Access, Driver, MemoryBacking, TraceError, load_trace};
use cachestore::{
    CacheConfig, CacheError, CacheEvent, CacheObserver, CacheStats, ConfigError, Fanout, LogObserver, PolicyKind,
};

#[derive(Parser, Debug)]
#[command(
    name = "cachestore",
    author,
    version,
    about = "Replay an address trace against a set-associative cache",
    long_about = None,
)]
struct Cli {
    /// Address trace to replay.
    #[arg(short = 't', long)]
    trace: String,

    /// JSON cache configuration.
    #[arg(short = 'c', long, conflicts_with_all = ["set_bits", "ways", "block_bits", "policy"])]
    config: Option<String>,

    /// Set-index bits (2^s sets).
    #[arg(short = 's', long)]
    set_bits: Option<u32>,

    /// Lines per set.
    #[arg(short = 'E', long)]
    ways: Option<usize>,

    /// Block-offset bits (2^b byte blocks).
    #[arg(short = 'b', long)]
    block_bits: Option<u32>,

    /// Replacement policy: LRU or FIFO.
    #[arg(short = 'p', long)]
    policy: Option<PolicyKind>,

    /// Write every cache event to this file as JSON lines.
    #[arg(long)]
    events: Option<String>,

    /// Print one JSON record per access before the summary.
    #[arg(long)]
    records: bool,

    /// Print statistics as a table instead of JSON.
    #[arg(long)]
    table: bool,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Trace(#[from] TraceError),
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
    #[error("failed to encode output: {0}")]
    Json(#[from] serde_json::Error),
    #[error("event log {path}: {source}")]
    Events { path: String, source: io::Error },
}

/// Writes each event as one JSON object per line.
///
/// Writing stops at the first error, which [`finish`](Self::finish) reports.
struct JsonLinesObserver<W: Write> {
    out: W,
    error: Option<io::Error>,
}

impl<W: Write> JsonLinesObserver<W> {
    fn new(out: W) -> Self {
        Self { out, error: None }
    }

    /// Flushes the sink, or returns the first write error seen.
    fn finish(&mut self) -> io::Result<()> {
        match self.error.take() {
            Some(e) => Err(e),
            None => self.out.flush(),
        }
    }
}

impl<W: Write> CacheObserver for JsonLinesObserver<W> {
    fn notify(&mut self, event: &CacheEvent) {
        if self.error.is_some() {
            return;
        }
        let written = serde_json::to_writer(&mut self.out, event)
            .map_err(io::Error::from)
            .and_then(|_| self.out.write_all(b"\n"));
        if let Err(e) = written {
            log::warn!("failed to write event: {}", e);
            self.error = Some(e);
        }
    }
}

#[derive(Serialize)]
struct Summary<'a> {
    config: &'a CacheConfig,
    accesses: usize,
    stats: &'a CacheStats,
    hit_rate: f64,
}

fn fatal(msg: impl std::fmt::Display) -> ! {
    eprintln!("\n\x1b[1;31merror:\x1b[0m {}", msg);
    process::exit(1);
}

fn build_config(cli: &Cli) -> Result<CacheConfig, CliError> {
    if let Some(path) = &cli.config {
        return Ok(CacheConfig::from_json_file(path)?);
    }

    let defaults = CacheConfig::default();
    let config = CacheConfig {
        set_bits: cli.set_bits.unwrap_or(defaults.set_bits),
        ways: cli.ways.unwrap_or(defaults.ways),
        block_bits: cli.block_bits.unwrap_or(defaults.block_bits),
        policy: cli.policy.unwrap_or(defaults.policy),
        ..defaults
    };
    config.validate()?;
    Ok(config)
}

/// Replays `accesses`, printing per-access records if asked.
///
/// The driver is dropped on return, so observers have seen the final event
/// whether or not the replay succeeded.
fn replay(
    config: CacheConfig,
    accesses: &[Access],
    observer: impl CacheObserver + 'static,
    records: bool,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let mut driver = Driver::with_observer(config, MemoryBacking::new(), observer)?;
    for access in accesses {
        let record = driver.access(access)?;
        if records {
            let line = serde_json::to_string(&record)?;
            writeln!(out, "{}", line)?;
        }
    }
    Ok(())
}

fn run(cli: &Cli, out: &mut dyn Write) -> Result<(), CliError> {
    let config = build_config(cli)?;
    let accesses = load_trace(&cli.trace)?;
    log::info!("loaded {} accesses from {}", accesses.len(), cli.trace);

    let stats = Rc::new(RefCell::new(CacheStats::new()));
    let mut observers = Fanout::new().with(Rc::clone(&stats));
    if cli.verbose > 0 {
        observers = observers.with(LogObserver);
    }
    let mut sink = None;
    if let Some(path) = &cli.events {
        let file = File::create(path).map_err(|source| CliError::Events {
            path: path.clone(),
            source,
        })?;
        let events = Rc::new(RefCell::new(JsonLinesObserver::new(BufWriter::new(file))));
        observers = observers.with(Rc::clone(&events));
        sink = Some((path, events));
    }

    let replayed = replay(config.clone(), &accesses, observers, cli.records, out);
    let flushed = match &sink {
        Some((path, events)) => events.borrow_mut().finish().map_err(|source| CliError::Events {
            path: (*path).clone(),
            source,
        }),
        None => Ok(()),
    };
    replayed?;
    flushed?;

    let stats = stats.borrow();
    if cli.table {
        stats.write_table(&mut *out)?;
    } else {
        let summary = Summary {
            config: &config,
            accesses: accesses.len(),
            stats: &stats,
            hit_rate: stats.hit_rate(),
        };
        let text = serde_json::to_string_pretty(&summary)?;
        writeln!(out, "{}", text)?;
    }
    out.flush()?;
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    let stdout = io::stdout();
    if let Err(e) = run(&cli, &mut stdout.lock()) {
        fatal(e);
    }
}
