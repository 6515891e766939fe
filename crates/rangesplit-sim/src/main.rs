#![doc = include_str!("../README.md")]

mod sim;

use clap::Parser;
use rangesplit::{QueryContext, SplitByInterval, StaticLimits, TimeQuery};
use sim::config::{CliArgs, SimConfig};
use sim::report::Report;
use sim::store::{SyntheticStore, merge_batches};
use sim::telemetry::init_telemetry;
use std::time::{Instant, SystemTime};
use tokio::signal;

// Using mimalloc for better performance under contention, especially in musl
// environments.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = SimConfig::try_from(args)?;

    let providers = init_telemetry()?;
    log_startup_info(&config);

    let result = run(&config).await;
    providers.shutdown();
    result
}

async fn run(config: &SimConfig) -> anyhow::Result<()> {
    let end = SystemTime::now();
    let start = end
        .checked_sub(config.range)
        .ok_or_else(|| anyhow::anyhow!("RANGE_SECS reaches before the system clock's epoch"))?;

    let store = SyntheticStore::new(start, config.split.interval(), config.entries_per_sec)
        .with_latency(config.latency)
        .with_fail_index(config.fail_index);
    let split = SplitByInterval::new(
        store,
        StaticLimits::new(config.parallelism),
        merge_batches,
        config.split,
    );

    let mut ctx = QueryContext::new().with_org_id(config.org_id.as_str());
    if let Some(deadline) = config.deadline {
        ctx = ctx.with_timeout(deadline);
    }

    let query = TimeQuery::new("{job=\"rangesplit-sim\"}", start, end)
        .with_limit(config.limit)
        .with_direction(config.direction);

    // A signal cancels the root context; the query then unwinds on its own.
    let watcher = {
        let ctx = ctx.clone();
        tokio::spawn(async move {
            shutdown_signal().await;
            ctx.cancel();
        })
    };

    let started = Instant::now();
    let outcome = split.split_query(&ctx, query).await;
    let elapsed = started.elapsed();
    watcher.abort();

    if let Err(_e) = split.shutdown().await {
        #[cfg(feature = "tracing")]
        tracing::error!("Error during splitter shutdown: {:?}", _e);
    }

    let batch = outcome?;
    let report = Report::new(config, &batch, elapsed);
    if config.json {
        println!("{}", report.to_json()?);
    } else {
        print!("{report}");
    }
    Ok(())
}

fn log_startup_info(_config: &SimConfig) {
    if cfg!(debug_assertions) {
        #[cfg(feature = "tracing")]
        tracing::info!("Starting simulation with full config: {:#?}", _config);
    } else {
        #[cfg(feature = "tracing")]
        tracing::info!(
            "Starting simulation over {}s split by {}s with parallelism {}",
            _config.range.as_secs(),
            _config.split.interval().as_secs(),
            _config.parallelism
        );
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(_e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!("Failed to install SIGTERM handler: {_e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let ctrl_c = async {
        if let Err(_e) = signal::ctrl_c().await {
            #[cfg(feature = "tracing")]
            tracing::warn!("Failed to install Ctrl+C handler: {_e}");
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        () = ctrl_c => {
            #[cfg(feature = "tracing")]
            tracing::info!("Received Ctrl+C signal");
        },
        () = terminate => {
            #[cfg(feature = "tracing")]
            tracing::info!("Received SIGTERM signal");
        },
    }

    #[cfg(feature = "tracing")]
    tracing::info!("Cancelling query...");
}
