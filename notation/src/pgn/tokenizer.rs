//! PGN text → clean, linear SAN move sequences.
//!
//! Two passes. [`split_games`] scans each movetext line once, dropping
//! annotation characters, `[...]` tags, `{...}` comments and `$n` glyphs, and
//! splits the text wherever a fresh `1. ` starts a new game. Then
//! [`expand_variations`] walks the tokens of each game with a stack of
//! in-progress lines, one per open `(`.

/// Characters annotating the previous move.
const SKIP_CHARS: [char; 5] = ['!', '?', '+', '#', '*'];

const RESULTS: [&str; 3] = ["1-0", "0-1", "1/2-1/2"];

/// One path through a game's variation tree, as raw SAN tokens.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GameLine {
    moves: Vec<String>,
}

impl GameLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn moves(&self) -> &[String] {
        &self.moves
    }

    pub fn push(&mut self, san: impl Into<String>) {
        self.moves.push(san.into());
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// A copy of this line with its last move removed: the starting point of
    /// a variation, which replaces the move before it.
    fn branch(&self) -> Self {
        let mut moves = self.moves.clone();
        moves.pop();
        Self { moves }
    }
}

impl From<Vec<String>> for GameLine {
    fn from(moves: Vec<String>) -> Self {
        Self { moves }
    }
}

impl std::fmt::Display for GameLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.moves.join(" "))
    }
}

/// Every linear line of every game in `pgn`, variations included.
pub fn tokenize(pgn: &str) -> Vec<GameLine> {
    let games = split_games(pgn);
    let lines: Vec<GameLine> = games.iter().flat_map(|game| expand_variations(game)).collect();
    tracing::debug!(games = games.len(), lines = lines.len(), "tokenized PGN");
    lines
}

/// Clean movetext of each game found in `pgn`.
///
/// Only lines starting with `1. ` are game text. Skipped regions nest through
/// a stack keyed by the opening delimiter; `$` regions end at the next space.
/// Skipped regions do not carry over to the next text line.
pub fn split_games(pgn: &str) -> Vec<String> {
    let mut games = Vec::new();

    for raw in pgn.lines() {
        let line = raw.trim();
        if !line.starts_with("1. ") {
            continue;
        }

        let mut clean = String::with_capacity(line.len());
        let mut recent = ['x'; 3];
        let mut skip: Vec<char> = Vec::new();

        for c in line.chars() {
            if SKIP_CHARS.contains(&c) {
                continue;
            }
            if matches!(c, '[' | '{' | '$') {
                skip.push(c);
            }
            if let Some(&open) = skip.last() {
                if closes(open, c) {
                    skip.pop();
                }
                continue;
            }

            if c == ' ' && clean.ends_with(' ') {
                continue;
            }
            if c == ' ' && recent == [' ', '1', '.'] && !clean.ends_with("( 1.") {
                // " 1. " mid-line outside a variation: the previous game ended here
                clean.truncate(clean.len() - 3);
                games.push(std::mem::replace(&mut clean, "1. ".to_string()));
                recent = ['1', '.', ' '];
                continue;
            }
            recent = [recent[1], recent[2], c];
            clean.push(c);
        }

        if clean.len() > 3 {
            games.push(clean);
        }
    }

    games
}

fn closes(open: char, c: char) -> bool {
    matches!((open, c), ('[', ']') | ('{', '}') | ('$', ' '))
}

/// Linear lines of one game's movetext: every closed variation as soon as
/// its `)` is seen, then whatever is still open, innermost first, ending
/// with the main line. Empty lines are dropped.
pub fn expand_variations(game: &str) -> Vec<GameLine> {
    let mut finished = Vec::new();
    let mut stack = vec![GameLine::new()];

    for token in game.split_whitespace() {
        let opens = token.chars().take_while(|&c| c == '(').count();
        let closes = token.chars().rev().take_while(|&c| c == ')').count();
        let body = token.trim_matches(|c| c == '(' || c == ')');

        for _ in 0..opens {
            let branch = stack.last().map(GameLine::branch).unwrap_or_default();
            stack.push(branch);
        }

        if let Some(san) = move_text(body) {
            if let Some(line) = stack.last_mut() {
                line.push(san);
            }
        }

        for _ in 0..closes {
            if stack.len() > 1 {
                finished.extend(stack.pop());
            } else {
                tracing::debug!(token, "ignoring unmatched ')'");
            }
        }
    }

    if stack.len() > 1 {
        tracing::debug!(open = stack.len() - 1, "flushing unclosed variations");
    }
    while let Some(line) = stack.pop() {
        finished.push(line);
    }

    finished.retain(|line| !line.is_empty());
    finished
}

/// The move carried by a token, if any. Move numbers (`12.`, `12...`) are
/// dropped, keeping a move glued to them (`12...Nf6`); results are dropped.
fn move_text(body: &str) -> Option<&str> {
    if body.is_empty() || RESULTS.contains(&body) {
        return None;
    }
    if !body.starts_with(|c: char| c.is_ascii_digit()) {
        return Some(body);
    }
    if body == "0-0" || body == "0-0-0" {
        return Some(body);
    }

    let after_digits = body.trim_start_matches(|c: char| c.is_ascii_digit());
    let rest = after_digits.trim_start_matches('.');
    if rest.len() == after_digits.len() || rest.is_empty() {
        None
    } else {
        Some(rest)
    }
}
