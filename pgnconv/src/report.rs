//! Printable forms of per-line conversion outcomes.

use notation::{format_line, LineOutcome};
use serde::Serialize;

/// One converted PGN line, as emitted by `to-coord --json`.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LineReport {
    Converted {
        line: usize,
        moves: Vec<String>,
    },
    Failed {
        line: usize,
        ply: usize,
        token: String,
        error: String,
    },
}

impl LineReport {
    pub fn from_outcome(line: usize, outcome: &LineOutcome) -> Self {
        match outcome {
            Ok(moves) => Self::Converted {
                line,
                moves: moves.iter().map(ToString::to_string).collect(),
            },
            Err(e) => Self::Failed {
                line,
                ply: e.ply,
                token: e.token.clone(),
                error: e.source.to_string(),
            },
        }
    }
}

pub fn to_json(outcomes: &[LineOutcome]) -> serde_json::Result<String> {
    let reports: Vec<LineReport> = outcomes
        .iter()
        .enumerate()
        .map(|(line, outcome)| LineReport::from_outcome(line, outcome))
        .collect();
    serde_json::to_string_pretty(&reports)
}

/// Plain-text form: converted lines go to stdout, failures to stderr.
pub fn print_plain(outcomes: &[LineOutcome]) {
    for (line, outcome) in outcomes.iter().enumerate() {
        match outcome {
            Ok(moves) => println!("{}", format_line(moves)),
            Err(e) => eprintln!("line {}: {}", line + 1, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notation::{pgn_to_coordinate, ConvertOptions};

    #[test]
    fn test_json_report() {
        let outcomes = pgn_to_coordinate("1. e4 (1. Nd4) e5", &ConvertOptions::default());
        let json: serde_json::Value = serde_json::from_str(&to_json(&outcomes).unwrap()).unwrap();

        assert_eq!(json[0]["status"], "failed");
        assert_eq!(json[0]["ply"], 0);
        assert_eq!(json[0]["token"], "Nd4");
        assert_eq!(json[1]["status"], "converted");
        assert_eq!(json[1]["line"], 1);
        assert_eq!(json[1]["moves"], serde_json::json!(["e2e4", "e7e5"]));
    }
}
