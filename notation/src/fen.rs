//! FEN-relevant position state and its text form.

use crate::board::{BoardError, BoardGrid, CastleSide};
use crate::types::{PieceColor, Square};

/// The four independent castling rights.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CastlingRights {
    pub white_kingside: bool,
    pub white_queenside: bool,
    pub black_kingside: bool,
    pub black_queenside: bool,
}

impl CastlingRights {
    pub const ALL: Self = Self {
        white_kingside: true,
        white_queenside: true,
        black_kingside: true,
        black_queenside: true,
    };

    pub const NONE: Self = Self {
        white_kingside: false,
        white_queenside: false,
        black_kingside: false,
        black_queenside: false,
    };

    pub fn revoke(&mut self, color: PieceColor, side: CastleSide) {
        match (color, side) {
            (PieceColor::White, CastleSide::Kingside) => self.white_kingside = false,
            (PieceColor::White, CastleSide::Queenside) => self.white_queenside = false,
            (PieceColor::Black, CastleSide::Kingside) => self.black_kingside = false,
            (PieceColor::Black, CastleSide::Queenside) => self.black_queenside = false,
        }
    }

    pub fn revoke_all(&mut self, color: PieceColor) {
        self.revoke(color, CastleSide::Kingside);
        self.revoke(color, CastleSide::Queenside);
    }

    /// Any move touching a rook's home corner removes that right.
    pub fn touch(&mut self, sq: Square) {
        for color in [PieceColor::White, PieceColor::Black] {
            if sq.row != color.back_row() {
                continue;
            }
            match sq.col {
                0 => self.revoke(color, CastleSide::Queenside),
                7 => self.revoke(color, CastleSide::Kingside),
                _ => {}
            }
        }
    }

    fn to_field(self) -> String {
        let field: String = [
            (self.white_kingside, 'K'),
            (self.white_queenside, 'Q'),
            (self.black_kingside, 'k'),
            (self.black_queenside, 'q'),
        ]
        .iter()
        .filter(|(on, _)| *on)
        .map(|(_, c)| *c)
        .collect();
        if field.is_empty() {
            "-".to_string()
        } else {
            field
        }
    }

    fn from_field(field: &str) -> Result<Self, FenError> {
        let mut rights = Self::NONE;
        if field == "-" {
            return Ok(rights);
        }
        for c in field.chars() {
            match c {
                'K' => rights.white_kingside = true,
                'Q' => rights.white_queenside = true,
                'k' => rights.black_kingside = true,
                'q' => rights.black_queenside = true,
                _ => return Err(FenError::InvalidCastling(field.to_string())),
            }
        }
        Ok(rights)
    }
}

impl Default for CastlingRights {
    fn default() -> Self {
        Self::ALL
    }
}

/// Board occupancy plus the auxiliary state a FEN records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub grid: BoardGrid,
    pub side_to_move: PieceColor,
    pub castling: CastlingRights,
    pub en_passant: Option<Square>,
    pub halfmove_clock: u32,
    pub fullmove_number: u32,
}

impl Position {
    pub fn standard() -> Self {
        Self {
            grid: BoardGrid::standard(),
            side_to_move: PieceColor::White,
            castling: CastlingRights::ALL,
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::standard()
    }
}

/// Format a position as a FEN string.
pub fn format_fen(position: &Position) -> String {
    let side = match position.side_to_move {
        PieceColor::White => 'w',
        PieceColor::Black => 'b',
    };
    let en_passant = position
        .en_passant
        .map_or_else(|| "-".to_string(), |sq| sq.to_string());
    format!(
        "{} {} {} {} {} {}",
        position.grid.placement(),
        side,
        position.castling.to_field(),
        en_passant,
        position.halfmove_clock,
        position.fullmove_number
    )
}

/// Parse a FEN string. The two counters may be omitted.
pub fn parse_fen(fen: &str) -> Result<Position, FenError> {
    let parts: Vec<&str> = fen.split_whitespace().collect();
    if parts.len() < 4 {
        return Err(FenError::InvalidFormat);
    }

    let grid = BoardGrid::from_placement(parts[0])?;
    let side_to_move = parse_color(parts[1])?;
    let castling = CastlingRights::from_field(parts[2])?;
    let en_passant = match parts[3] {
        "-" => None,
        s => Some(Square::parse(s).ok_or_else(|| FenError::InvalidEnPassant(s.to_string()))?),
    };
    let halfmove_clock = parse_counter(parts.get(4), 0)?;
    let fullmove_number = parse_counter(parts.get(5), 1)?;

    Ok(Position {
        grid,
        side_to_move,
        castling,
        en_passant,
        halfmove_clock,
        fullmove_number,
    })
}

fn parse_color(s: &str) -> Result<PieceColor, FenError> {
    match s {
        "w" => Ok(PieceColor::White),
        "b" => Ok(PieceColor::Black),
        _ => Err(FenError::InvalidColor(s.to_string())),
    }
}

fn parse_counter(field: Option<&&str>, default: u32) -> Result<u32, FenError> {
    match field {
        None => Ok(default),
        Some(s) => s
            .parse()
            .map_err(|_| FenError::InvalidCounter(s.to_string())),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FenError {
    #[error("Invalid FEN format")]
    InvalidFormat,
    #[error("Invalid board layout: {0}")]
    InvalidBoardLayout(#[from] BoardError),
    #[error("Invalid color: {0}")]
    InvalidColor(String),
    #[error("Invalid castling field: {0}")]
    InvalidCastling(String),
    #[error("Invalid en passant square: {0}")]
    InvalidEnPassant(String),
    #[error("Invalid move counter: {0}")]
    InvalidCounter(String),
}
