use std::{
    io::{self, BufWriter, Write},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use combi_enumerator::{
    binomial,
    config::{DEFAULT_K, DEFAULT_N},
    run, EnumeratorConfig, EnumeratorTelemetry, OutputFormat, RunSummary, WriterSink,
};
use shared_logging::LogLevel;

#[derive(Parser, Debug)]
#[command(
    name = "combi",
    version,
    about = "Prints every k-combination of 1..=n in lexicographic order"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Enumerates the combinations, one per line on stdout.
    Run(RunArgs),
    /// Prints C(n, k) without enumerating.
    Count {
        #[arg(short, long, default_value_t = DEFAULT_N)]
        n: u32,
        #[arg(short, long, default_value_t = DEFAULT_K)]
        k: usize,
    },
}

#[derive(Args, Debug, Default)]
struct RunArgs {
    /// Inclusive upper bound (overrides the config file).
    #[arg(short, long)]
    n: Option<u32>,
    /// Combination length (overrides the config file).
    #[arg(short, long)]
    k: Option<usize>,
    /// `text` or `json`.
    #[arg(long)]
    format: Option<OutputFormat>,
    /// TOML file with `n`, `k`, `format` and `log_path`.
    #[arg(long)]
    config: Option<PathBuf>,
    /// JSON-lines run log.
    #[arg(long)]
    log_file: Option<PathBuf>,
    /// Writes run records to stderr when no log file is set.
    #[arg(long)]
    log_stderr: bool,
    #[arg(long, default_value_t = LogLevel::Info)]
    log_level: LogLevel,
    /// Prints the run summary as JSON on stderr.
    #[arg(long)]
    summary: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    // Without a subcommand, behave like `combi run` with n = 4, k = 2.
    match cli
        .command
        .unwrap_or_else(|| Commands::Run(RunArgs::default()))
    {
        Commands::Run(args) => {
            let summary = handle_run(&args, io::stdout().lock())?;
            if args.summary {
                eprintln!("{}", serde_json::to_string_pretty(&summary)?);
            }
            Ok(())
        }
        Commands::Count { n, k } => {
            println!("{}", handle_count(n, k)?);
            Ok(())
        }
    }
}

fn resolve_config(args: &RunArgs) -> Result<EnumeratorConfig> {
    let mut config = match &args.config {
        Some(path) => EnumeratorConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EnumeratorConfig::default(),
    };
    if let Some(n) = args.n {
        config = config.with_n(n);
    }
    if let Some(k) = args.k {
        config = config.with_k(k);
    }
    if let Some(format) = args.format {
        config = config.with_format(format);
    }
    if let Some(path) = &args.log_file {
        config = config.with_log_path(path);
    }
    Ok(config)
}

fn handle_run<W: Write>(args: &RunArgs, out: W) -> Result<RunSummary> {
    let config = resolve_config(args)?;
    let mut telemetry = EnumeratorTelemetry::builder("combi")
        .stderr(args.log_stderr)
        .min_level(args.log_level);
    if let Some(path) = &config.log_path {
        telemetry = telemetry.log_path(path);
    }
    let telemetry = telemetry.build().context("opening run log")?;

    let mut sink = WriterSink::new(BufWriter::new(out), config.format);
    let summary = run(&config, &mut sink, &telemetry).context("enumerating combinations")?;
    sink.flush().context("flushing output")?;
    Ok(summary)
}

fn handle_count(n: u32, k: usize) -> Result<u64> {
    binomial(n, k).with_context(|| format!("C({n}, {k}) overflows u64"))
}
