//! Canonical square, piece and color types shared by both translation
//! directions.
//!
//! Squares are addressed the way the board grid stores them: row 0 is rank 8,
//! row 7 is rank 1, column 0 is file a.

/// File letters indexed by column.
pub const FILES: [char; 8] = ['a', 'b', 'c', 'd', 'e', 'f', 'g', 'h'];

/// Rank digits indexed by row.
pub const RANKS: [char; 8] = ['8', '7', '6', '5', '4', '3', '2', '1'];

/// Piece type without color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

/// Side owning a piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PieceColor {
    White,
    Black,
}

impl PieceKind {
    pub fn to_char_upper(self) -> char {
        match self {
            Self::Pawn => 'P',
            Self::Knight => 'N',
            Self::Bishop => 'B',
            Self::Rook => 'R',
            Self::Queen => 'Q',
            Self::King => 'K',
        }
    }

    pub fn to_char_lower(self) -> char {
        self.to_char_upper().to_ascii_lowercase()
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'p' => Some(Self::Pawn),
            'n' => Some(Self::Knight),
            'b' => Some(Self::Bishop),
            'r' => Some(Self::Rook),
            'q' => Some(Self::Queen),
            'k' => Some(Self::King),
            _ => None,
        }
    }

    /// Pieces a pawn may promote to.
    pub fn is_promotion_target(self) -> bool {
        matches!(self, Self::Knight | Self::Bishop | Self::Rook | Self::Queen)
    }
}

impl PieceColor {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::White => "white",
            Self::Black => "black",
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }

    /// Row delta of a single pawn step for this side.
    pub fn pawn_step(self) -> i8 {
        match self {
            Self::White => -1,
            Self::Black => 1,
        }
    }

    /// Row holding this side's pieces at the start of the game.
    pub fn back_row(self) -> u8 {
        match self {
            Self::White => 7,
            Self::Black => 0,
        }
    }
}

/// A colored piece, stored on the grid as a single letter (uppercase = white).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub kind: PieceKind,
    pub color: PieceColor,
}

impl Piece {
    pub const fn new(kind: PieceKind, color: PieceColor) -> Self {
        Self { kind, color }
    }

    pub fn letter(self) -> char {
        match self.color {
            PieceColor::White => self.kind.to_char_upper(),
            PieceColor::Black => self.kind.to_char_lower(),
        }
    }

    pub fn from_letter(c: char) -> Option<Self> {
        let kind = PieceKind::from_char(c)?;
        let color = if c.is_ascii_uppercase() {
            PieceColor::White
        } else {
            PieceColor::Black
        };
        Some(Self { kind, color })
    }
}

/// A board square in grid coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square {
    pub row: u8,
    pub col: u8,
}

impl Square {
    /// Builds a square from grid coordinates, `None` when off the board.
    pub fn new(row: i8, col: i8) -> Option<Self> {
        if (0..8).contains(&row) && (0..8).contains(&col) {
            Some(Self {
                row: row as u8,
                col: col as u8,
            })
        } else {
            None
        }
    }

    pub fn from_index(index: u8) -> Self {
        Self {
            row: index / 8,
            col: index % 8,
        }
    }

    /// Index into 64-entry tables, `row * 8 + col`.
    pub fn index(self) -> usize {
        self.row as usize * 8 + self.col as usize
    }

    pub fn file_char(self) -> char {
        FILES[self.col as usize]
    }

    pub fn rank_char(self) -> char {
        RANKS[self.row as usize]
    }

    /// Column for a file letter.
    pub fn col_from_file(c: char) -> Option<u8> {
        FILES.iter().position(|&f| f == c).map(|i| i as u8)
    }

    /// Row for a rank digit.
    pub fn row_from_rank(c: char) -> Option<u8> {
        RANKS.iter().position(|&r| r == c).map(|i| i as u8)
    }

    /// Parses a two-character square name such as `e4`.
    pub fn parse(s: &str) -> Option<Self> {
        let mut chars = s.chars();
        let file = chars.next()?;
        let rank = chars.next()?;
        if chars.next().is_some() {
            return None;
        }
        Some(Self {
            row: Self::row_from_rank(rank)?,
            col: Self::col_from_file(file)?,
        })
    }

    /// Square offset by the given row and column deltas.
    pub fn offset(self, d_row: i8, d_col: i8) -> Option<Self> {
        Self::new(self.row as i8 + d_row, self.col as i8 + d_col)
    }

    pub fn all() -> impl Iterator<Item = Square> {
        (0..64u8).map(Self::from_index)
    }
}

impl std::fmt::Display for PieceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_char_upper())
    }
}

impl std::fmt::Display for PieceColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::fmt::Display for Piece {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.letter())
    }
}

impl std::fmt::Display for Square {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.file_char(), self.rank_char())
    }
}
