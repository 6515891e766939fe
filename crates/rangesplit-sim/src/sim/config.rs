use anyhow::bail;
use clap::{Parser, ValueEnum};
use core::time::Duration;
use rangesplit::{Direction, SplitConfig};

/// Read order of the simulated query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum DirectionArg {
    /// Oldest entries first.
    #[default]
    Forward,
    /// Newest entries first.
    Backward,
}

impl From<DirectionArg> for Direction {
    fn from(value: DirectionArg) -> Self {
        match value {
            DirectionArg::Forward => Direction::Forward,
            DirectionArg::Backward => Direction::Backward,
        }
    }
}

/// Runtime configuration for the `rangesplit-sim` binary.
///
/// Describes one query over a synthetic log store: how long its time range
/// is, how it is split, how many sub-ranges may run at once, and how the
/// store behaves. Every value can come from a CLI flag or the environment
/// (including a `.env` file).
#[derive(Parser, Debug, Clone)]
#[command(
    name = "rangesplit-sim",
    version,
    about = "Runs a split-by-interval query against a synthetic log store"
)]
pub struct CliArgs {
    /// Length of the queried time range, in seconds. The range ends at the
    /// current time.
    ///
    /// Environment variable: `RANGE_SECS`
    #[arg(long, env = "RANGE_SECS", default_value_t = 3_600)]
    pub range_secs: u64,

    /// Length of each sub-range, in seconds.
    ///
    /// Environment variable: `SPLIT_INTERVAL_SECS`
    #[arg(long, env = "SPLIT_INTERVAL_SECS", default_value_t = 300)]
    pub interval_secs: u64,

    /// Result limit. Execution stops once this many entries are collected.
    ///
    /// Environment variable: `LIMIT`
    #[arg(long, env = "LIMIT", default_value_t = 1_000)]
    pub limit: u32,

    /// Read order.
    ///
    /// Environment variable: `DIRECTION`
    #[arg(long, env = "DIRECTION", value_enum, default_value_t = DirectionArg::Forward)]
    pub direction: DirectionArg,

    /// Maximum number of sub-ranges executed concurrently. Defaults to the
    /// number of logical CPUs.
    ///
    /// Environment variable: `MAX_QUERY_PARALLELISM`
    #[arg(long, env = "MAX_QUERY_PARALLELISM", default_value_t = num_cpus::get())]
    pub parallelism: usize,

    /// Tenant the query runs as.
    ///
    /// Environment variable: `ORG_ID`
    #[arg(long, env = "ORG_ID", default_value_t = String::from("fake"))]
    pub org_id: String,

    /// Log lines the synthetic store holds per second of range.
    ///
    /// Environment variable: `ENTRIES_PER_SEC`
    #[arg(long, env = "ENTRIES_PER_SEC", default_value_t = 1)]
    pub entries_per_sec: u64,

    /// Simulated latency of each sub-query, in milliseconds.
    ///
    /// Environment variable: `LATENCY_MS`
    #[arg(long, env = "LATENCY_MS", default_value_t = 25)]
    pub latency_ms: u64,

    /// Forward-order index of a sub-range that fails instead of answering.
    ///
    /// Environment variable: `FAIL_INDEX`
    #[arg(long, env = "FAIL_INDEX")]
    pub fail_index: Option<usize>,

    /// Deadline for the whole query, in milliseconds.
    ///
    /// Environment variable: `DEADLINE_MS`
    #[arg(long, env = "DEADLINE_MS")]
    pub deadline_ms: Option<u64>,

    /// Print the merged result as JSON on stdout.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Debug, Clone)]
pub struct SimConfig {
    pub range: Duration,
    pub split: SplitConfig,
    pub limit: u32,
    pub direction: Direction,
    pub parallelism: usize,
    pub org_id: String,
    pub entries_per_sec: u64,
    pub latency: Duration,
    pub fail_index: Option<usize>,
    pub deadline: Option<Duration>,
    pub json: bool,
}

impl TryFrom<CliArgs> for SimConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.range_secs == 0 {
            bail!("RANGE_SECS must be greater than 0");
        }

        if args.interval_secs == 0 {
            bail!("SPLIT_INTERVAL_SECS must be greater than 0");
        }

        if args.parallelism == 0 {
            bail!("MAX_QUERY_PARALLELISM must be greater than 0");
        }

        if args.org_id.trim().is_empty() {
            bail!("ORG_ID must not be blank");
        }

        let intervals = args.range_secs.div_ceil(args.interval_secs);
        if let Some(index) = args.fail_index {
            if index as u64 >= intervals {
                bail!(
                    "FAIL_INDEX ({}) is out of range for {} sub-ranges",
                    index,
                    intervals
                );
            }
        }

        if args.deadline_ms == Some(0) {
            bail!("DEADLINE_MS must be greater than 0");
        }

        let split = SplitConfig::new(Duration::from_secs(args.interval_secs))?;

        Ok(Self {
            range: Duration::from_secs(args.range_secs),
            split,
            limit: args.limit,
            direction: args.direction.into(),
            parallelism: args.parallelism,
            org_id: args.org_id,
            entries_per_sec: args.entries_per_sec,
            latency: Duration::from_millis(args.latency_ms),
            fail_index: args.fail_index,
            deadline: args.deadline_ms.map(Duration::from_millis),
            json: args.json,
        })
    }
}
