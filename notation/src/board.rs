//! Board representations.
//!
//! [`BoardGrid`] is the plain letter grid used by the coordinate → algebraic
//! direction. [`BoardState`] layers piece identities on top of it so the
//! algebraic → coordinate direction can tell otherwise identical pieces apart
//! across moves.

use std::collections::{BTreeSet, HashMap};

use crate::types::{Piece, PieceColor, PieceKind, Square};

/// Placement field of the standard starting position.
pub const STANDARD_PLACEMENT: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR";

/// Which side of the board a castling move goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastleSide {
    Kingside,
    Queenside,
}

impl CastleSide {
    /// King and rook columns as `(king_to, rook_from, rook_to)`.
    pub fn columns(self) -> (u8, u8, u8) {
        match self {
            Self::Kingside => (6, 7, 5),
            Self::Queenside => (2, 0, 3),
        }
    }

    pub fn san(self) -> &'static str {
        match self {
            Self::Kingside => "O-O",
            Self::Queenside => "O-O-O",
        }
    }
}

/// Column the king starts on.
pub const KING_COL: u8 = 4;

/// An 8x8 grid of optional pieces.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BoardGrid {
    squares: [[Option<Piece>; 8]; 8],
}

impl BoardGrid {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The standard starting position.
    pub fn standard() -> Self {
        let mut grid = Self::empty();
        for (col, kind) in [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ]
        .into_iter()
        .enumerate()
        {
            grid.squares[0][col] = Some(Piece::new(kind, PieceColor::Black));
            grid.squares[1][col] = Some(Piece::new(PieceKind::Pawn, PieceColor::Black));
            grid.squares[6][col] = Some(Piece::new(PieceKind::Pawn, PieceColor::White));
            grid.squares[7][col] = Some(Piece::new(kind, PieceColor::White));
        }
        grid
    }

    /// Parse the placement field of a FEN string (`rnbqkbnr/pppppppp/8/...`).
    pub fn from_placement(placement: &str) -> Result<Self, BoardError> {
        let rows: Vec<&str> = placement.split('/').collect();
        if rows.len() != 8 {
            return Err(BoardError::InvalidPlacement(placement.to_string()));
        }

        let mut grid = Self::empty();
        for (row, row_str) in rows.iter().enumerate() {
            let mut col = 0usize;
            for c in row_str.chars() {
                if let Some(skip) = c.to_digit(10) {
                    col += skip as usize;
                } else {
                    if col > 7 {
                        return Err(BoardError::InvalidPlacement(placement.to_string()));
                    }
                    let piece = Piece::from_letter(c).ok_or(BoardError::InvalidPiece(c))?;
                    grid.squares[row][col] = Some(piece);
                    col += 1;
                }
            }
            if col != 8 {
                return Err(BoardError::InvalidPlacement(placement.to_string()));
            }
        }

        Ok(grid)
    }

    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.squares[sq.row as usize][sq.col as usize]
    }

    pub fn is_empty(&self, sq: Square) -> bool {
        self.piece_at(sq).is_none()
    }

    pub fn set(&mut self, sq: Square, piece: Option<Piece>) {
        self.squares[sq.row as usize][sq.col as usize] = piece;
    }

    /// Remove and return whatever stands on `sq`.
    pub fn take(&mut self, sq: Square) -> Option<Piece> {
        self.squares[sq.row as usize][sq.col as usize].take()
    }

    /// Squares holding exactly this piece, in row-major order.
    pub fn squares_of(&self, piece: Piece) -> impl Iterator<Item = Square> + '_ {
        Square::all().filter(move |&sq| self.piece_at(sq) == Some(piece))
    }

    pub fn find_king(&self, color: PieceColor) -> Option<Square> {
        self.squares_of(Piece::new(PieceKind::King, color)).next()
    }

    /// Rows from rank 8 down to rank 1.
    pub fn rows(&self) -> impl Iterator<Item = &[Option<Piece>; 8]> {
        self.squares.iter()
    }

    /// Placement field of the FEN for this grid.
    pub fn placement(&self) -> String {
        let mut out = String::with_capacity(72);
        for (row, cells) in self.rows().enumerate() {
            let mut empty = 0;
            for cell in cells {
                match cell {
                    Some(piece) => {
                        if empty > 0 {
                            out.push_str(&empty.to_string());
                            empty = 0;
                        }
                        out.push(piece.letter());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                out.push_str(&empty.to_string());
            }
            if row != 7 {
                out.push('/');
            }
        }
        out
    }
}

/// Square of the pawn taken en passant when `piece` moves `from` → `to`.
///
/// Only a pawn moving diagonally onto an empty square qualifies, and only when
/// an enemy pawn stands beside its origin on the destination file.
pub fn en_passant_victim(
    grid: &BoardGrid,
    piece: Piece,
    from: Square,
    to: Square,
) -> Option<Square> {
    if piece.kind != PieceKind::Pawn || from.col == to.col || !grid.is_empty(to) {
        return None;
    }
    let passed = Square {
        row: from.row,
        col: to.col,
    };
    let enemy_pawn = Piece::new(PieceKind::Pawn, piece.color.opposite());
    (grid.piece_at(passed) == Some(enemy_pawn)).then_some(passed)
}

/// Stable token for one physical piece within a single game line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PieceId(u32);

impl PieceId {
    pub fn get(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for PieceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy)]
struct PieceRecord {
    piece: Piece,
    square: Square,
}

/// Identity-tracked board.
///
/// Every non-pawn piece carries a [`PieceId`]. Records live in an arena indexed
/// by the id; a captured piece leaves a hole. The `index` groups live ids by
/// colored piece and is kept in step with every mutation. Pawns carry no
/// identity; a promoted pawn receives a freshly allocated one.
#[derive(Debug, Clone)]
pub struct BoardState {
    grid: BoardGrid,
    ids: [[Option<PieceId>; 8]; 8],
    arena: Vec<Option<PieceRecord>>,
    index: HashMap<Piece, BTreeSet<PieceId>>,
}

impl BoardState {
    /// Standard starting position with 16 identities.
    pub fn new() -> Self {
        let mut state = Self::blank();
        state.reset();
        state
    }

    fn blank() -> Self {
        Self {
            grid: BoardGrid::empty(),
            ids: [[None; 8]; 8],
            arena: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Identity-tracked board for an arbitrary placement. Identities are
    /// assigned in row-major order starting from rank 8.
    pub fn from_grid(grid: BoardGrid) -> Self {
        let mut state = Self::blank();
        state.grid = grid;
        state.register_all();
        state
    }

    pub fn from_placement(placement: &str) -> Result<Self, BoardError> {
        Ok(Self::from_grid(BoardGrid::from_placement(placement)?))
    }

    /// Restore the starting position and its identity registry.
    ///
    /// Black pieces get ids 0..8 along rank 8, white pieces ids 8..16 along
    /// rank 1; the next promotion receives id 16.
    pub fn reset(&mut self) {
        self.grid = BoardGrid::standard();
        self.register_all();
    }

    fn register_all(&mut self) {
        self.ids = [[None; 8]; 8];
        self.arena.clear();
        self.index.clear();
        for sq in Square::all() {
            if let Some(piece) = self.grid.piece_at(sq) {
                if piece.kind != PieceKind::Pawn {
                    self.register(piece, sq);
                }
            }
        }
    }

    fn register(&mut self, piece: Piece, sq: Square) -> PieceId {
        let id = PieceId(self.arena.len() as u32);
        self.arena.push(Some(PieceRecord { piece, square: sq }));
        self.index.entry(piece).or_default().insert(id);
        self.ids[sq.row as usize][sq.col as usize] = Some(id);
        id
    }

    fn deregister(&mut self, id: PieceId) {
        if let Some(record) = self.arena.get_mut(id.0 as usize).and_then(Option::take) {
            if let Some(set) = self.index.get_mut(&record.piece) {
                set.remove(&id);
            }
        }
    }

    fn id_slot(&mut self, sq: Square) -> &mut Option<PieceId> {
        &mut self.ids[sq.row as usize][sq.col as usize]
    }

    pub fn grid(&self) -> &BoardGrid {
        &self.grid
    }

    pub fn identity_at(&self, sq: Square) -> Option<PieceId> {
        self.ids[sq.row as usize][sq.col as usize]
    }

    pub fn square_of(&self, id: PieceId) -> Option<Square> {
        self.record(id).map(|r| r.square)
    }

    pub fn piece_of(&self, id: PieceId) -> Option<Piece> {
        self.record(id).map(|r| r.piece)
    }

    fn record(&self, id: PieceId) -> Option<&PieceRecord> {
        self.arena.get(id.0 as usize).and_then(Option::as_ref)
    }

    /// Live identities of `piece` with their squares, lowest id first.
    pub fn identities(&self, piece: Piece) -> impl Iterator<Item = (PieceId, Square)> + '_ {
        self.index
            .get(&piece)
            .into_iter()
            .flat_map(|set| set.iter())
            .filter_map(|&id| self.square_of(id).map(|sq| (id, sq)))
    }

    pub fn king_square(&self, color: PieceColor) -> Option<Square> {
        self.identities(Piece::new(PieceKind::King, color))
            .next()
            .map(|(_, sq)| sq)
    }

    /// Number of live identities.
    pub fn identity_count(&self) -> usize {
        self.index.values().map(BTreeSet::len).sum()
    }

    /// Move the piece on `from` to `to`.
    ///
    /// Any identity on `to` is captured and deregistered. A pawn moving
    /// diagonally onto an empty square also removes the enemy pawn it passed
    /// (en passant); anything else on that square is left alone. With a
    /// promotion the moving pawn is replaced by a new piece of `promotion`
    /// with a newly allocated identity. No legality check happens here.
    pub fn apply_identity_move(
        &mut self,
        piece: Piece,
        from: Square,
        to: Square,
        promotion: Option<PieceKind>,
    ) {
        if let Some(passed) = en_passant_victim(&self.grid, piece, from, to) {
            self.grid.set(passed, None);
        }

        if let Some(captured) = self.id_slot(to).take() {
            self.deregister(captured);
        }

        self.grid.set(from, None);
        let moving = self.id_slot(from).take();

        match promotion {
            Some(kind) => {
                if let Some(id) = moving {
                    self.deregister(id);
                }
                let promoted = Piece::new(kind, piece.color);
                self.grid.set(to, Some(promoted));
                self.register(promoted, to);
            }
            None => {
                self.grid.set(to, Some(piece));
                if let Some(id) = moving {
                    if let Some(Some(record)) = self.arena.get_mut(id.0 as usize) {
                        record.square = to;
                    }
                    *self.id_slot(to) = Some(id);
                }
            }
        }
    }

    pub fn castle_kingside(&mut self, color: PieceColor) -> Result<(), BoardError> {
        self.castle(color, CastleSide::Kingside)
    }

    pub fn castle_queenside(&mut self, color: PieceColor) -> Result<(), BoardError> {
        self.castle(color, CastleSide::Queenside)
    }

    /// Move king and rook together. Both must stand on their home squares.
    pub fn castle(&mut self, color: PieceColor, side: CastleSide) -> Result<(), BoardError> {
        let row = color.back_row();
        let (king_to, rook_from, rook_to) = side.columns();
        let king_sq = Square { row, col: KING_COL };
        let rook_sq = Square { row, col: rook_from };

        let king = Piece::new(PieceKind::King, color);
        let rook = Piece::new(PieceKind::Rook, color);
        if self.grid.piece_at(king_sq) != Some(king) || self.grid.piece_at(rook_sq) != Some(rook) {
            return Err(BoardError::CastlingPiecesMissing { color, side });
        }

        self.relocate(king_sq, Square { row, col: king_to });
        self.relocate(rook_sq, Square { row, col: rook_to });
        Ok(())
    }

    fn relocate(&mut self, from: Square, to: Square) {
        let piece = self.grid.take(from);
        self.grid.set(to, piece);
        let id = self.id_slot(from).take();
        *self.id_slot(to) = id;
        if let Some(id) = id {
            if let Some(Some(record)) = self.arena.get_mut(id.0 as usize) {
                record.square = to;
            }
        }
    }
}

impl Default for BoardState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("Invalid placement: {0}")]
    InvalidPlacement(String),
    #[error("Invalid piece character: {0}")]
    InvalidPiece(char),
    #[error("{color} cannot castle {side:?}: king or rook not on its home square")]
    CastlingPiecesMissing { color: PieceColor, side: CastleSide },
}
