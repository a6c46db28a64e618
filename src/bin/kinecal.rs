//! Kinecal CLI - Command-line interface for the calibration engine
//!
//! Commands:
//! - analyze: run a full calibration session over recorded samples
//! - trial: replay samples against a persisted threshold set
//! - validate: check that a sample file parses as finite floats

use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use kinecal::{
    CalibrationError, CalibrationSession, JsonFileThresholdStore, ReportEncoder, SessionStatus,
    ThresholdStore,
};
use kinecal::ENGINE_VERSION;

/// Kinecal - On-device calibration engine for motion-sensor jump detection
#[derive(Parser)]
#[command(name = "kinecal")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Derive jump-detection thresholds from motion-sensor samples", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a full calibration session over recorded samples
    Analyze {
        /// Input file with one sample per line (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Target rank (expected event count) for the detail window
        #[arg(long, default_value = "10")]
        rank: usize,

        /// Print the full report payload as JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Persist the derived thresholds to this file
        #[arg(long)]
        save_thresholds: Option<PathBuf>,
    },

    /// Replay samples against a persisted threshold set
    Trial {
        /// Input file with one sample per line (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Threshold file written by `analyze --save-thresholds`
        #[arg(short, long)]
        thresholds: PathBuf,
    },

    /// Check that a sample file parses as finite floats
    Validate {
        /// Input file with one sample per line (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,
    },
}

fn read_lines(path: &Path) -> Result<Vec<String>, CalibrationError> {
    if path.as_os_str() == "-" {
        if atty::is(atty::Stream::Stdin) {
            eprintln!("reading samples from stdin; pipe a file or press Ctrl-D to finish");
        }
        let stdin = io::stdin();
        let mut lines = Vec::new();
        for line in stdin.lock().lines() {
            lines.push(line?);
        }
        Ok(lines)
    } else {
        Ok(fs::read_to_string(path)?
            .lines()
            .map(|l| l.to_string())
            .collect())
    }
}

/// Parse one sample per line; blank lines and `#` comments are skipped.
fn read_samples(path: &Path) -> Result<Vec<f32>, CalibrationError> {
    let mut samples = Vec::new();
    for (number, line) in read_lines(path)?.iter().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let value: f32 = trimmed.parse().map_err(|_| {
            CalibrationError::InvalidSample(format!("line {}: {:?}", number + 1, trimmed))
        })?;
        if !value.is_finite() {
            return Err(CalibrationError::InvalidSample(format!(
                "line {}: non-finite value {}",
                number + 1,
                trimmed
            )));
        }
        samples.push(value);
    }
    Ok(samples)
}

fn run_session(samples: &[f32], rank: usize) -> CalibrationSession<kinecal::HostDrivenSource> {
    let mut session = CalibrationSession::default();
    session.set_rank(rank);
    session.start();
    for &v in samples {
        session.push_sample(v);
    }
    session.stop();
    session
}

fn cmd_analyze(
    input: &Path,
    rank: usize,
    json: bool,
    save_thresholds: Option<&Path>,
) -> Result<(), CalibrationError> {
    let samples = read_samples(input)?;
    let session = run_session(&samples, rank);

    if session.status() != SessionStatus::HasResult {
        return Err(CalibrationError::InsufficientData(format!(
            "{} samples produced too few peaks; collect a longer recording",
            samples.len()
        )));
    }

    if json {
        println!("{}", ReportEncoder::new().encode_to_json(&session)?);
    } else {
        for field in session.statistics().fields() {
            println!("{:<14} {}", field.label(), field.value);
        }
    }

    if let Some(path) = save_thresholds {
        let thresholds = session.statistics().thresholds();
        let mut store = JsonFileThresholdStore::new(path);
        store.save(Some(&thresholds))?;
        eprintln!("thresholds saved to {}", path.display());
    }

    Ok(())
}

fn cmd_trial(input: &Path, thresholds: &Path) -> Result<(), CalibrationError> {
    let store = JsonFileThresholdStore::new(thresholds);
    let thresholds = store.load()?.ok_or_else(|| {
        CalibrationError::InsufficientData(format!(
            "no threshold set stored at {}",
            store.path().display()
        ))
    })?;

    let samples = read_samples(input)?;
    let mut session = CalibrationSession::default();
    session.adopt_thresholds(thresholds);
    session.start();
    for &v in &samples {
        session.push_sample(v);
    }
    session.stop();

    let counters = session.trial_counters();
    println!("- Hit       {}", counters.neg_hit);
    println!("- Near-miss {}", counters.neg_med);
    println!("+ Hit       {}", counters.pos_hit);
    println!("+ Near-miss {}", counters.pos_med);
    Ok(())
}

fn cmd_validate(input: &Path) -> Result<(), CalibrationError> {
    let mut bad_lines = Vec::new();
    let mut count = 0usize;
    for (number, line) in read_lines(input)?.iter().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        match trimmed.parse::<f32>() {
            Ok(v) if v.is_finite() => count += 1,
            _ => bad_lines.push(number + 1),
        }
    }

    if bad_lines.is_empty() {
        println!("ok: {count} samples");
        Ok(())
    } else {
        Err(CalibrationError::InvalidSample(format!(
            "{} invalid line(s): {:?}",
            bad_lines.len(),
            bad_lines
        )))
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Analyze {
            input,
            rank,
            json,
            save_thresholds,
        } => cmd_analyze(input, *rank, *json, save_thresholds.as_deref()),
        Commands::Trial { input, thresholds } => cmd_trial(input, thresholds),
        Commands::Validate { input } => cmd_validate(input),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
