//! Synthetic latency report: random order flow across a few symbols,
//! recorded per command in an HDR histogram.

use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use clap::Parser;
use hdrhistogram::Histogram;
use simple_cross::{CancelOrder, Command, Engine, EngineConfig, NewOrder, Side, Symbol};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "latency-report", about = "Per-command latency histogram")]
struct Args {
    /// Number of commands to time
    #[arg(long, default_value_t = 1_000_000)]
    iterations: u32,

    /// Pin the benchmark thread to the last CPU core
    #[arg(long)]
    pin: bool,

    /// Order slots to reserve before timing
    #[arg(long, default_value_t = 100_000)]
    reserve_orders: usize,
}

/// Pin the current thread to the last available CPU core.
///
/// The last core is typically isolated from OS interrupts.
fn pin_to_last_core() {
    match core_affinity::get_core_ids().and_then(|ids| ids.last().copied()) {
        Some(core) => {
            if !core_affinity::set_for_current(core) {
                warn!(?core, "failed to pin thread");
            }
        }
        None => warn!("no core ids available"),
    }
}

/// Deterministic workload: mostly new orders around a fixed mid, with a
/// cancel of an older id every fourth step.
fn command_for(step: u32, symbols: &[Symbol]) -> Command {
    if step % 4 == 3 {
        return Command::Cancel(CancelOrder {
            order_id: step.saturating_sub(50),
        });
    }
    Command::New(NewOrder {
        order_id: step,
        symbol: symbols[(step as usize) % symbols.len()],
        side: if step % 2 == 0 { Side::Buy } else { Side::Sell },
        qty: 10 + (step % 7) as u16,
        price: 10_000_000 + u64::from(step % 100) * 1_000,
    })
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    if args.pin {
        pin_to_last_core();
    }

    let symbols = ["IBM", "AAPL", "MSFT", "GOOG"]
        .iter()
        .filter_map(|s| Symbol::new(s))
        .collect::<Vec<_>>();

    let mut engine = Engine::new(EngineConfig {
        order_reserve: args.reserve_orders,
        ..EngineConfig::default()
    })?;
    let mut histogram = Histogram::<u64>::new_with_bounds(1, 100_000, 3)
        .map_err(|e| anyhow!("creating histogram: {e:?}"))?;

    info!(iterations = args.iterations, "running latency benchmark");

    let mut total_duration = Duration::ZERO;
    for step in 0..args.iterations {
        let cmd = command_for(step, &symbols);

        let start = Instant::now();
        std::hint::black_box(engine.process_command(cmd)?);
        let elapsed = start.elapsed();

        // Outliers past the histogram bound are dropped
        histogram.record(elapsed.as_nanos() as u64).unwrap_or(());
        total_duration += elapsed;
    }

    println!("\n=== Latency Report (ns) ===");
    println!("Total Ops:  {}", args.iterations);
    println!(
        "Throughput: {:.2} ops/sec",
        f64::from(args.iterations) / total_duration.as_secs_f64()
    );
    println!("Resting:    {}", engine.order_count());
    println!("---------------------------");
    println!("Min:    {:6} ns", histogram.min());
    println!("P50:    {:6} ns", histogram.value_at_quantile(0.50));
    println!("P90:    {:6} ns", histogram.value_at_quantile(0.90));
    println!("P99:    {:6} ns", histogram.value_at_quantile(0.99));
    println!("P99.9:  {:6} ns", histogram.value_at_quantile(0.999));
    println!("P99.99: {:6} ns", histogram.value_at_quantile(0.9999));
    println!("Max:    {:6} ns", histogram.max());
    println!("---------------------------");

    println!("\nDistribution:");
    for v in histogram.iter_log(100, 2.0) {
        let count = v.count_since_last_iteration();
        if count > 0 {
            println!("<= {:8} ns: {:10} count", v.value_iterated_to(), count);
        }
    }
    Ok(())
}
