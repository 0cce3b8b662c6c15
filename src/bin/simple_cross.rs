//! Replays an action file through the engine and prints the results.
//!
//! Usage: `simple-cross actions.txt [--format text|json|results]`

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use simple_cross::{Engine, EngineConfig, OutputEvent};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    /// One `F` / `X` / `E` / `P` line per event
    Text,
    /// One JSON object per event
    Json,
    /// One `results.size() == N` block per input line, results indented below
    Results,
}

#[derive(Debug, Parser)]
#[command(name = "simple-cross", version, about = "Limit order book crossing engine")]
struct Args {
    /// Action file, one command per line
    input: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// JSON file with engine sizing (overridden by the flags below)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Order slots to reserve up front
    #[arg(long)]
    reserve_orders: Option<usize>,

    /// Price-level slots to reserve per book
    #[arg(long)]
    reserve_levels: Option<usize>,
}

impl Args {
    fn engine_config(&self) -> Result<EngineConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let file = File::open(path)
                    .with_context(|| format!("opening config {}", path.display()))?;
                serde_json::from_reader(BufReader::new(file))
                    .with_context(|| format!("parsing config {}", path.display()))?
            }
            None => EngineConfig::default(),
        };
        if let Some(n) = self.reserve_orders {
            config.order_reserve = n;
        }
        if let Some(n) = self.reserve_levels {
            config.level_reserve = n;
        }
        Ok(config)
    }
}

fn write_events(out: &mut impl Write, events: &[OutputEvent], format: Format) -> Result<()> {
    match format {
        Format::Text => {
            for event in events {
                writeln!(out, "{event}")?;
            }
        }
        Format::Json => {
            for event in events {
                serde_json::to_writer(&mut *out, event)?;
                writeln!(out)?;
            }
        }
        Format::Results => {
            writeln!(out, "results.size() == {}", events.len())?;
            for (i, event) in events.iter().enumerate() {
                writeln!(out, "\tresults[{i}] == \"{event}\"")?;
            }
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = args.engine_config()?;
    let mut engine = Engine::new(config).context("reserving engine pools")?;

    let input = File::open(&args.input)
        .with_context(|| format!("opening {}", args.input.display()))?;
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    let mut processed = 0usize;
    for (lineno, line) in BufReader::new(input).lines().enumerate() {
        let line = line.with_context(|| format!("reading line {}", lineno + 1))?;
        let events = engine
            .process_line(&line)
            .with_context(|| format!("processing line {}", lineno + 1))?;
        write_events(&mut out, &events, args.format)?;
        processed += 1;
    }
    out.flush()?;

    info!(
        lines = processed,
        resting = engine.order_count(),
        "finished replay"
    );
    Ok(())
}
