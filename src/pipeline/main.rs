mod csv_bars;
mod report;

use anyhow::{Context, Result};
use chrono::NaiveTime;
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use orb_stats::analytics::{resample, session_open_utc, split_sessions};
use orb_stats::{ClassifierConfig, DayClassifier, DayStats, OrbAnalyzer, OrbStats};

#[derive(Parser, Debug)]
#[command(name = "orb-stats")]
#[command(about = "Day-type classification & opening range breakout statistics")]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Print verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Classify each session's day type from intraday bars
    Classify {
        /// Path to a bar CSV file (.csv or .csv.zst)
        #[arg(short, long)]
        input: PathBuf,

        /// Instrument symbol for reporting
        #[arg(short, long, default_value = "UNKNOWN")]
        symbol: String,

        /// Resample bars to this timeframe before analysis (minutes)
        #[arg(short, long)]
        timeframe_mins: Option<u32>,

        /// Exchange timezone for session grouping
        #[arg(long, default_value = "America/New_York")]
        tz: String,

        /// Output directory for JSON results
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Compute per-session ORB statistics plus a multi-day summary
    Orb {
        /// Path to a bar CSV file (.csv or .csv.zst)
        #[arg(short, long)]
        input: PathBuf,

        /// Instrument symbol for reporting
        #[arg(short, long, default_value = "UNKNOWN")]
        symbol: String,

        /// Opening range window length in minutes
        #[arg(short, long, default_value = "30")]
        window_mins: i64,

        /// Session open in exchange-local time (HH:MM); defaults to each
        /// session's first bar
        #[arg(long)]
        session_open: Option<String>,

        /// Exchange timezone for session grouping
        #[arg(long, default_value = "America/New_York")]
        tz: String,

        /// Output directory for JSON results
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match args.command {
        Commands::Classify {
            input,
            symbol,
            timeframe_mins,
            tz,
            output_dir,
        } => run_classify(input, symbol, timeframe_mins, &tz, output_dir),
        Commands::Orb {
            input,
            symbol,
            window_mins,
            session_open,
            tz,
            output_dir,
        } => run_orb(input, symbol, window_mins, session_open, &tz, output_dir),
    }
}

fn parse_tz(tz: &str) -> Result<Tz> {
    tz.parse()
        .map_err(|e| anyhow::anyhow!("Invalid timezone {}: {}", tz, e))
}

fn run_classify(
    input: PathBuf,
    symbol: String,
    timeframe_mins: Option<u32>,
    tz: &str,
    output_dir: Option<PathBuf>,
) -> Result<()> {
    let tz = parse_tz(tz)?;

    let mut bars = csv_bars::load_bars(&input)?;
    info!("Loaded {} bars from {:?}", bars.len(), input);

    if let Some(mins) = timeframe_mins {
        bars = resample(&bars, mins)?;
        info!("Resampled to {} {}-minute bars", bars.len(), mins);
    }

    let sessions = split_sessions(&bars, tz);
    info!("Split into {} sessions", sessions.len());

    let classifier = DayClassifier::new(ClassifierConfig::default());
    let mut all_stats: Vec<DayStats> = Vec::with_capacity(sessions.len());
    for (date, session_bars) in &sessions {
        let stats = classifier.classify(&symbol, session_bars)?;
        tracing::debug!("{}: {} ({:.2})", date, stats.day_type, stats.confidence);
        all_stats.push(stats);
    }

    report::print_day_stats(&all_stats);

    if let Some(dir) = output_dir {
        write_json(&dir, "day_stats.json", &all_stats)?;
    }

    Ok(())
}

fn run_orb(
    input: PathBuf,
    symbol: String,
    window_mins: i64,
    session_open: Option<String>,
    tz: &str,
    output_dir: Option<PathBuf>,
) -> Result<()> {
    let tz = parse_tz(tz)?;

    let open_time = session_open
        .map(|s| {
            NaiveTime::parse_from_str(&s, "%H:%M")
                .with_context(|| format!("Invalid session open time: {}", s))
        })
        .transpose()?;

    let bars = csv_bars::load_bars(&input)?;
    info!("Loaded {} bars from {:?}", bars.len(), input);

    let sessions = split_sessions(&bars, tz);
    info!("Split into {} sessions", sessions.len());

    let analyzer = OrbAnalyzer::new(window_mins);
    let daily: Vec<OrbStats> = sessions
        .par_iter()
        .map(|(date, session_bars)| {
            let session_start = open_time
                .and_then(|open| session_open_utc(*date, open, tz))
                .unwrap_or(session_bars[0].timestamp);
            analyzer.analyze_day(&symbol, session_bars, session_start)
        })
        .collect();

    let summary = analyzer.summarize(&symbol, &daily);
    report::print_orb_report(&daily, &summary);

    if let Some(dir) = output_dir {
        write_json(&dir, "orb_stats.json", &daily)?;
        write_json(&dir, "orb_summary.json", &summary)?;
    }

    Ok(())
}

fn write_json<T: serde::Serialize>(dir: &Path, name: &str, value: &T) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {:?}", dir))?;

    let path = dir.join(name);
    let json = serde_json::to_vec_pretty(value)?;
    std::fs::write(&path, json).with_context(|| format!("Failed to write: {:?}", path))?;
    info!("Wrote {:?}", path);

    Ok(())
}
