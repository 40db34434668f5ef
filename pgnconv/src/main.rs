//! pgnconv - convert chess moves between coordinate and algebraic notation.
//!
//! - `to-san`: coordinate moves (`e2e4 e7e5 g1f3`) to PGN move text
//!   (`1. e4 e5 2. Nf3`). Malformed moves are skipped and reported on stderr.
//! - `fen`: the FEN reached after playing coordinate moves.
//! - `to-coord`: PGN text to one line of coordinate moves per game line,
//!   variations included. Lines that cannot be resolved are reported and the
//!   rest of the batch still converts.
//!
//! Logging goes to stderr and is controlled with `RUST_LOG`; strictness and
//! worker count default from the environment (see [`config`]).

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use notation::{
    pgn_to_coordinate, AlgebraicWriter, ConvertOptions, RejectedMove, ResolvePolicy,
};
use tracing_subscriber::EnvFilter;

mod config;
mod input;
mod report;

#[derive(Parser)]
#[command(
    name = "pgnconv",
    version,
    about = "Convert chess moves between coordinate and PGN algebraic notation"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert coordinate moves to algebraic move text.
    ToSan {
        /// Moves such as `e2e4 e7e5 g1f3`. Read from --file or stdin when omitted.
        moves: Vec<String>,
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Print the FEN after playing coordinate moves from the starting position.
    Fen {
        moves: Vec<String>,
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Convert PGN text to coordinate moves, one game line per output line.
    ToCoord {
        /// PGN file. Read from stdin when omitted.
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// Print outcomes as JSON.
        #[arg(long)]
        json: bool,
        /// Fail on SAN that more than one piece could have played.
        #[arg(long, overrides_with = "no_strict")]
        strict: bool,
        /// Take the first matching piece, overriding PGNCONV_STRICT.
        #[arg(long, overrides_with = "strict")]
        no_strict: bool,
        /// Threads used for conversion.
        #[arg(short, long)]
        workers: Option<usize>,
    },
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("failed to read input: {0}")]
    Input(#[from] std::io::Error),

    #[error("failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),
}

fn report_rejected(rejected: &[RejectedMove]) {
    for r in rejected {
        eprintln!("skipped move {} ({}): {}", r.index + 1, r.token, r.error);
    }
}

fn to_san(moves: &[String], file: Option<PathBuf>) -> Result<(), CliError> {
    let moves = input::coordinate_moves(moves, file.as_deref())?;
    let mut writer = AlgebraicWriter::new();
    writer.push_all(&moves);
    report_rejected(writer.rejected());
    println!("{}", writer.text());
    Ok(())
}

fn fen(moves: &[String], file: Option<PathBuf>) -> Result<(), CliError> {
    let moves = input::coordinate_moves(moves, file.as_deref())?;
    let mut writer = AlgebraicWriter::new();
    writer.push_all(&moves);
    report_rejected(writer.rejected());
    println!("{}", writer.to_fen());
    Ok(())
}

/// Resolve policy from the flags; the last of `--strict` / `--no-strict`
/// wins, and without either the environment decides.
fn resolve_policy(strict: bool, no_strict: bool) -> ResolvePolicy {
    let strict = match (strict, no_strict) {
        (true, _) => true,
        (_, true) => false,
        _ => config::get_strict(),
    };
    if strict {
        ResolvePolicy::Strict
    } else {
        ResolvePolicy::FirstMatch
    }
}

fn to_coord(
    file: Option<PathBuf>,
    json: bool,
    policy: ResolvePolicy,
    workers: Option<usize>,
) -> Result<(), CliError> {
    let pgn = input::read_source(file.as_deref())?;
    let options = ConvertOptions {
        policy,
        workers: workers.unwrap_or_else(config::get_workers),
    };
    tracing::debug!(?options, "converting PGN");

    let outcomes = pgn_to_coordinate(&pgn, &options);
    let failed = outcomes.iter().filter(|o| o.is_err()).count();
    if failed > 0 {
        tracing::warn!(failed, total = outcomes.len(), "some lines could not be converted");
    }

    if json {
        println!("{}", report::to_json(&outcomes)?);
    } else {
        report::print_plain(&outcomes);
    }
    Ok(())
}

fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::ToSan { moves, file } => to_san(&moves, file),
        Commands::Fen { moves, file } => fen(&moves, file),
        Commands::ToCoord {
            file,
            json,
            strict,
            no_strict,
            workers,
        } => to_coord(file, json, resolve_policy(strict, no_strict), workers),
    }
}
