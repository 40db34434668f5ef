//! Batch conversion in both directions.
//!
//! Every game line is translated on its own board, so a failure is reported
//! in that line's outcome and never affects its neighbours.

use crate::coordinate::CoordinateMove;
use crate::pgn::san::{LineError, ResolvePolicy, SanTranslator};
use crate::pgn::tokenizer::{tokenize, GameLine};
use crate::pgn::writer::{write_pgn, RejectedMove};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertOptions {
    pub policy: ResolvePolicy,
    /// Threads used by [`convert_lines`]. 0 and 1 both mean the calling thread.
    pub workers: usize,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            policy: ResolvePolicy::FirstMatch,
            workers: 1,
        }
    }
}

/// The coordinate moves of one line, or why it was abandoned.
pub type LineOutcome = Result<Vec<CoordinateMove>, LineError>;

/// Convert every line of every game in `pgn`, variations first, in the
/// order the tokenizer emits them.
pub fn pgn_to_coordinate(pgn: &str, options: &ConvertOptions) -> Vec<LineOutcome> {
    let lines = tokenize(pgn);
    convert_lines(&lines, options)
}

/// Convert already tokenized lines. Outcomes are in input order regardless
/// of the worker count.
pub fn convert_lines(lines: &[GameLine], options: &ConvertOptions) -> Vec<LineOutcome> {
    let workers = options.workers.clamp(1, lines.len().max(1));
    let policy = options.policy;

    if workers == 1 {
        return lines
            .iter()
            .enumerate()
            .map(|(index, line)| convert_line(index, line, policy))
            .collect();
    }

    let chunk_size = lines.len().div_ceil(workers);
    tracing::debug!(lines = lines.len(), workers, chunk_size, "converting in parallel");

    std::thread::scope(|s| {
        let handles: Vec<_> = lines
            .chunks(chunk_size)
            .enumerate()
            .map(|(chunk_index, chunk)| {
                s.spawn(move || {
                    let offset = chunk_index * chunk_size;
                    chunk
                        .iter()
                        .enumerate()
                        .map(|(i, line)| convert_line(offset + i, line, policy))
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut outcomes = Vec::with_capacity(lines.len());
        for handle in handles {
            match handle.join() {
                Ok(chunk) => outcomes.extend(chunk),
                Err(panic) => std::panic::resume_unwind(panic),
            }
        }
        outcomes
    })
}

fn convert_line(index: usize, line: &GameLine, policy: ResolvePolicy) -> LineOutcome {
    let outcome = SanTranslator::translate_line(line, policy);
    match &outcome {
        Ok(moves) => tracing::debug!(line = index, plies = moves.len(), "converted line"),
        Err(e) => tracing::warn!(line = index, error = %e, "abandoned line"),
    }
    outcome
}

/// Convert space-separated coordinate moves to algebraic move text. Bad
/// tokens are skipped and returned alongside the text.
pub fn coordinate_to_pgn(moves: &str) -> (String, Vec<RejectedMove>) {
    write_pgn(moves)
}
