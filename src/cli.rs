// cli.rs
// Command-line arguments and their conversion into a SchedulerConfig.
use anyhow::Context;
use clap::Parser;
use scheduler::{RemainderPolicy, SchedulerConfig, StartMode};
use std::path::PathBuf;

/// Splits the range 1..=max into chunks and squares every chunk concurrently.
///
/// Values come from, in increasing priority: built-in defaults, the JSON file
/// given with `--config`, environment variables (a `.env` file is honored),
/// and command-line flags.
#[derive(Parser, Debug, Clone)]
#[command(name = "chunk-scheduling", version, about)]
pub struct CliArgs {
    /// JSON configuration file. Flags override its values.
    ///
    /// Environment variable: `CHUNK_CONFIG`
    #[arg(long, env = "CHUNK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Total number of elements; the range is 1..=max. [default: 53]
    ///
    /// Environment variable: `CHUNK_MAX`
    #[arg(long, env = "CHUNK_MAX", allow_negative_numbers = true)]
    pub max: Option<i64>,

    /// Requested number of chunks. [default: 5]
    ///
    /// Environment variable: `CHUNK_COUNT`
    #[arg(long, env = "CHUNK_COUNT", allow_negative_numbers = true)]
    pub chunks: Option<i64>,

    /// Remainder policy: even, all-in-first, all-in-last, additional-chunk or
    /// ignored. [default: even]
    ///
    /// Environment variable: `CHUNK_POLICY`
    #[arg(long, env = "CHUNK_POLICY")]
    pub policy: Option<RemainderPolicy>,

    /// Spawn the chunk tasks only once the results are awaited.
    #[arg(long, default_value_t = false)]
    pub lazy: bool,

    /// Milliseconds to spend between launching the tasks and awaiting them.
    /// [default: 0]
    ///
    /// Environment variable: `CHUNK_IDLE_MS`
    #[arg(long, env = "CHUNK_IDLE_MS")]
    pub idle_ms: Option<u64>,

    /// Lower bound of the simulated work delay per chunk. [default: 500]
    #[arg(long)]
    pub min_delay_ms: Option<u64>,

    /// Upper bound of the simulated work delay per chunk. [default: 2500]
    #[arg(long)]
    pub max_delay_ms: Option<u64>,

    /// Fail the run when any chunk task takes longer than this.
    ///
    /// Environment variable: `CHUNK_TIMEOUT_MS`
    #[arg(long, env = "CHUNK_TIMEOUT_MS")]
    pub timeout_ms: Option<u64>,

    /// Print debug-level progress lines.
    #[arg(short, long, default_value_t = false)]
    pub debug: bool,
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub scheduler: SchedulerConfig,
}

impl TryFrom<CliArgs> for RunConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let mut scheduler = match &args.config {
            Some(path) => SchedulerConfig::from_json_file(path)
                .with_context(|| format!("failed to load {}", path.display()))?,
            None => SchedulerConfig::default(),
        };

        if let Some(max) = args.max {
            scheduler.max = max;
        }
        if let Some(chunks) = args.chunks {
            scheduler.chunks = chunks;
        }
        if let Some(policy) = args.policy {
            scheduler.policy = policy;
        }
        if args.lazy {
            scheduler.start = StartMode::Lazy;
        }
        if let Some(idle_ms) = args.idle_ms {
            scheduler.idle_ms = idle_ms;
        }
        if let Some(min) = args.min_delay_ms {
            scheduler.min_delay_ms = min;
        }
        if let Some(max) = args.max_delay_ms {
            scheduler.max_delay_ms = max;
        }
        if args.timeout_ms.is_some() {
            scheduler.task_timeout_ms = args.timeout_ms;
        }
        scheduler.debug |= args.debug;

        scheduler.validate()?;
        Ok(Self { scheduler })
    }
}
