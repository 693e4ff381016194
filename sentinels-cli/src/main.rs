mod loader;
mod report;
mod util;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;

use loader::FileDataLoader;
use report::{run_setups, write_console_report, write_json_report, write_markdown_report};
use sentinels_setup::constants::{
    DEFAULT_LOSS_PCT, DEFAULT_MAX_TRIALS, DEFAULT_PLAYER_COUNT, DEFAULT_TOLERANCE,
};
use sentinels_setup::{EmbeddedDataLoader, SearchConfig, SetupEngine, SetupRequest};
use util::parse_packs;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Colored summary for a terminal
    Console,
    /// Machine-readable run report
    Json,
    /// Markdown tables
    Markdown,
}

#[derive(Debug, Parser)]
#[command(name = "sentinels", version)]
#[command(
    about = "Pick a random Sentinels of the Multiverse setup that matches a target difficulty"
)]
struct Args {
    /// Number of heroes (3-5)
    #[arg(short, long, default_value_t = DEFAULT_PLAYER_COUNT)]
    players: usize,

    /// Target expected loss percentage (1-99)
    #[arg(short, long, default_value_t = DEFAULT_LOSS_PCT)]
    loss_pct: i32,

    /// Allowed difficulty variance around the target band
    #[arg(short, long, default_value_t = DEFAULT_TOLERANCE)]
    range: u32,

    /// Card sets to draw from (comma-separated, or "all")
    #[arg(long, default_value = "baseset,miniexpansion")]
    packs: String,

    /// Include promo cards
    #[arg(long)]
    promos: bool,

    /// Seed for reproducible runs (random when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Number of independent setups to generate
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    count: u32,

    /// Maximum draws per setup before giving up
    #[arg(long, default_value_t = DEFAULT_MAX_TRIALS)]
    max_trials: u32,

    /// Card dataset to use instead of the bundled one
    #[arg(long)]
    data: Option<PathBuf>,

    /// Output report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
    report: ReportFormat,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// List the cards in the selected sets and exit
    #[arg(long)]
    list_cards: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let request = build_request(&args)?;
    let engine = load_engine(&args)?;

    if args.list_cards {
        let mut output_target = open_output(&args)?;
        write!(output_target.writer(), "{}", engine.eligible(&request.packs))?;
        output_target.flush_inner()?;
        return Ok(());
    }

    // The report file is only opened once there is a report to write.
    request.validate().context("invalid setup request")?;
    let seed = args.seed.unwrap_or_else(rand::random);
    let report = run_setups(&engine, &request, seed, args.count)?;

    let mut output_target = open_output(&args)?;
    let writer = output_target.writer();
    match args.report {
        ReportFormat::Console => write_console_report(writer, &report)?,
        ReportFormat::Json => write_json_report(writer, &report)?,
        ReportFormat::Markdown => write_markdown_report(writer, &report)?,
    }
    output_target.flush_inner()?;

    if !report.all_found() {
        std::process::exit(1);
    }

    Ok(())
}

fn open_output(args: &Args) -> Result<OutputTarget> {
    let output_target = OutputTarget::new(args.output.clone())?;
    if output_target.is_file() {
        colored::control::set_override(false);
    }
    Ok(output_target)
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    let env = env_logger::Env::default().default_filter_or(default_filter);
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .try_init();
}

fn build_request(args: &Args) -> Result<SetupRequest> {
    let packs = parse_packs(&args.packs, args.promos).context("invalid --packs")?;
    Ok(SetupRequest::new(args.players, args.loss_pct, args.range, packs))
}

fn load_engine(args: &Args) -> Result<SetupEngine> {
    let engine = match &args.data {
        Some(path) => SetupEngine::from_loader(&FileDataLoader::new(path))
            .with_context(|| format!("failed to load card data from {}", path.display()))?,
        None => SetupEngine::from_loader(&EmbeddedDataLoader)?,
    };
    let config = SearchConfig::default().with_max_trials(args.max_trials);
    engine
        .with_config(config)
        .context("invalid search limits")
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    const fn is_file(&self) -> bool {
        matches!(self, Self::File(_))
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}
