//! Coordinate → algebraic translation.
//!
//! Replays coordinate moves on a plain [`BoardGrid`] and writes
//! move-number-prefixed SAN, keeping the FEN-relevant state (castling rights,
//! en-passant target, half-move clock) up to date as it goes.

use smallvec::SmallVec;

use crate::board::{en_passant_victim, BoardGrid, CastleSide, KING_COL};
use crate::coordinate::{parse_coordinate, CoordinateError, CoordinateMove};
use crate::fen::{format_fen, Position};
use crate::movement::can_reach;
use crate::pin::would_expose_own_king;
use crate::types::{Piece, PieceColor, PieceKind, Square};

/// A coordinate token that could not be played.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedMove {
    /// Position of the token in the input, counting from zero.
    pub index: usize,
    pub token: String,
    pub error: CoordinateError,
}

/// Stateful coordinate → algebraic translator.
#[derive(Debug, Clone)]
pub struct AlgebraicWriter {
    position: Position,
    plies: u64,
    text: String,
    rejected: Vec<RejectedMove>,
}

impl AlgebraicWriter {
    pub fn new() -> Self {
        Self::from_position(Position::standard())
    }

    /// Start from an arbitrary position; move numbers continue from its
    /// full-move number.
    pub fn from_position(position: Position) -> Self {
        let plies = u64::from(position.fullmove_number.saturating_sub(1)) * 2
            + u64::from(position.side_to_move == PieceColor::Black);
        Self {
            position,
            plies,
            text: String::new(),
            rejected: Vec::new(),
        }
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn grid(&self) -> &BoardGrid {
        &self.position.grid
    }

    pub fn side_to_move(&self) -> PieceColor {
        self.position.side_to_move
    }

    /// Formatted algebraic text written so far.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn rejected(&self) -> &[RejectedMove] {
        &self.rejected
    }

    pub fn to_fen(&self) -> String {
        format_fen(&self.position)
    }

    pub fn into_text(self) -> String {
        self.text
    }

    /// Play every whitespace-separated token of `moves`. A malformed token is
    /// recorded and skipped; the text written before it stays intact.
    pub fn push_all(&mut self, moves: &str) -> &str {
        for (index, token) in moves.split_whitespace().enumerate() {
            if let Err(error) = self.push_coordinate(token) {
                tracing::warn!(index, token, %error, "skipping coordinate move");
                self.rejected.push(RejectedMove {
                    index,
                    token: token.to_string(),
                    error,
                });
            }
        }
        &self.text
    }

    /// Parse and play one coordinate token, returning its SAN.
    pub fn push_coordinate(&mut self, token: &str) -> Result<String, CoordinateError> {
        let mv = parse_coordinate(token)?;
        self.play(mv)
    }

    /// Play a move and append its SAN to the text.
    pub fn play(&mut self, mv: CoordinateMove) -> Result<String, CoordinateError> {
        let grid = &self.position.grid;
        let piece = grid
            .piece_at(mv.from)
            .ok_or(CoordinateError::EmptyOrigin(mv.from))?;
        let target = grid.piece_at(mv.to);
        let diagonal_step = piece.kind == PieceKind::Pawn && mv.from.col != mv.to.col;
        let en_passant = en_passant_victim(grid, piece, mv.from, mv.to).is_some();
        if diagonal_step && target.is_none() && !en_passant {
            return Err(CoordinateError::NoEnPassantVictim(mv.to));
        }
        let capture = target.is_some() || en_passant;
        let castle = castle_side(piece, mv);

        let promotion = match mv.promotion {
            Some(kind) if piece.kind == PieceKind::Pawn => Some(kind),
            _ => None,
        };

        let san = match castle {
            Some(side) => side.san().to_string(),
            None => self.san_for(piece, mv.from, mv.to, capture, promotion),
        };

        self.update_state(piece, mv, capture);
        self.apply(piece, mv, en_passant, castle, promotion);
        self.write(&san);

        tracing::trace!(mv = %mv, san = %san, "wrote move");
        Ok(san)
    }

    fn san_for(
        &self,
        piece: Piece,
        from: Square,
        to: Square,
        capture: bool,
        promotion: Option<PieceKind>,
    ) -> String {
        let mut san = String::with_capacity(8);
        match piece.kind {
            PieceKind::Pawn => {
                if capture {
                    san.push(from.file_char());
                    san.push('x');
                }
                san.push_str(&to.to_string());
                if let Some(kind) = promotion {
                    san.push('=');
                    san.push(kind.to_char_upper());
                }
            }
            PieceKind::King => {
                san.push('K');
                if capture {
                    san.push('x');
                }
                san.push_str(&to.to_string());
            }
            kind => {
                san.push(kind.to_char_upper());
                san.push_str(&self.disambiguation(piece, from, to));
                if capture {
                    san.push('x');
                }
                san.push_str(&to.to_string());
            }
        }
        san
    }

    /// Shortest origin hint that singles out the mover among same pieces
    /// which could also legally reach `to`: nothing, file, rank, or both.
    fn disambiguation(&self, piece: Piece, from: Square, to: Square) -> String {
        let grid = &self.position.grid;
        let king = grid.find_king(piece.color);
        let rivals: SmallVec<[Square; 4]> = grid
            .squares_of(piece)
            .filter(|&sq| sq != from)
            .filter(|&sq| can_reach(piece.kind, sq, to, grid))
            .filter(|&sq| {
                king.map_or(true, |k| {
                    !would_expose_own_king(piece.kind, sq, to, piece.color, grid, k)
                })
            })
            .collect();

        if rivals.is_empty() {
            return String::new();
        }
        let shares_file = rivals.iter().any(|sq| sq.col == from.col);
        let shares_rank = rivals.iter().any(|sq| sq.row == from.row);
        match (shares_file, shares_rank) {
            (false, _) => from.file_char().to_string(),
            (true, false) => from.rank_char().to_string(),
            (true, true) => from.to_string(),
        }
    }

    fn update_state(&mut self, piece: Piece, mv: CoordinateMove, capture: bool) {
        let position = &mut self.position;

        if piece.kind == PieceKind::Pawn || capture {
            position.halfmove_clock = 0;
        } else {
            position.halfmove_clock += 1;
        }

        position.castling.touch(mv.from);
        position.castling.touch(mv.to);
        if piece.kind == PieceKind::King {
            position.castling.revoke_all(piece.color);
        }

        position.en_passant = None;
        if piece.kind == PieceKind::Pawn && mv.from.col == mv.to.col {
            let distance = (mv.to.row as i8 - mv.from.row as i8).abs();
            if distance == 2 {
                let enemy_pawn = Piece::new(PieceKind::Pawn, piece.color.opposite());
                let flanked = [-1i8, 1]
                    .iter()
                    .filter_map(|&dc| mv.to.offset(0, dc))
                    .any(|sq| position.grid.piece_at(sq) == Some(enemy_pawn));
                if flanked {
                    position.en_passant = Some(Square {
                        row: (mv.from.row + mv.to.row) / 2,
                        col: mv.from.col,
                    });
                }
            }
        }
    }

    fn apply(
        &mut self,
        piece: Piece,
        mv: CoordinateMove,
        en_passant: bool,
        castle: Option<CastleSide>,
        promotion: Option<PieceKind>,
    ) {
        let grid = &mut self.position.grid;
        if en_passant {
            grid.set(
                Square {
                    row: mv.from.row,
                    col: mv.to.col,
                },
                None,
            );
        }

        grid.set(mv.from, None);
        let placed = promotion.map_or(piece, |kind| Piece::new(kind, piece.color));
        grid.set(mv.to, Some(placed));

        if let Some(side) = castle {
            let (_, rook_from, rook_to) = side.columns();
            let row = mv.from.row;
            let rook = grid.take(Square { row, col: rook_from });
            grid.set(Square { row, col: rook_to }, rook);
        }
    }

    fn write(&mut self, san: &str) {
        if self.plies % 2 == 0 {
            if !self.text.is_empty() {
                self.text.push(' ');
            }
            self.text.push_str(&format!("{}. ", self.plies / 2 + 1));
        } else if self.text.is_empty() {
            self.text.push_str(&format!("{}... ", self.plies / 2 + 1));
        } else {
            self.text.push(' ');
        }
        self.text.push_str(san);

        self.plies += 1;
        let position = &mut self.position;
        if position.side_to_move == PieceColor::Black {
            position.fullmove_number = position.fullmove_number.saturating_add(1);
        }
        position.side_to_move = position.side_to_move.opposite();
    }
}

impl Default for AlgebraicWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// King moves from its home square two files sideways.
fn castle_side(piece: Piece, mv: CoordinateMove) -> Option<CastleSide> {
    let home = Square {
        row: piece.color.back_row(),
        col: KING_COL,
    };
    if piece.kind != PieceKind::King || mv.from != home || mv.to.row != home.row {
        return None;
    }
    match mv.to.col {
        6 => Some(CastleSide::Kingside),
        2 => Some(CastleSide::Queenside),
        _ => None,
    }
}

/// Convert a space-separated coordinate sequence to algebraic text.
pub fn write_pgn(moves: &str) -> (String, Vec<RejectedMove>) {
    let mut writer = AlgebraicWriter::new();
    writer.push_all(moves);
    let rejected = writer.rejected.clone();
    (writer.into_text(), rejected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fen::parse_fen;

    fn writer_at(fen: &str) -> AlgebraicWriter {
        AlgebraicWriter::from_position(parse_fen(fen).unwrap())
    }

    #[test]
    fn test_opening_moves() {
        let (text, rejected) = write_pgn("e2e4 e7e5 g1f3");
        assert_eq!(text, "1. e4 e5 2. Nf3");
        assert!(rejected.is_empty());
    }

    #[test]
    fn test_kingside_castle() {
        let mut writer = writer_at("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1");
        assert_eq!(writer.push_coordinate("e1g1").unwrap(), "O-O");
        assert_eq!(writer.push_coordinate("e8c8").unwrap(), "O-O-O");
        assert_eq!(
            writer.grid().placement(),
            "2kr3r/pppppppp/8/8/8/8/PPPPPPPP/R4RK1"
        );
        assert_eq!(writer.position().castling, crate::fen::CastlingRights::NONE);
    }

    #[test]
    fn test_file_disambiguation_for_rooks_on_one_rank() {
        let mut writer = writer_at("6k1/8/8/8/8/8/8/R4RK1 w - - 0 1");
        assert_eq!(writer.push_coordinate("a1d1").unwrap(), "Rad1");
    }

    #[test]
    fn test_rank_disambiguation_for_rooks_on_one_file() {
        let mut writer = writer_at("R5k1/8/8/8/8/8/8/R5K1 w - - 0 1");
        assert_eq!(writer.push_coordinate("a1a4").unwrap(), "R1a4");
    }

    #[test]
    fn test_full_square_disambiguation() {
        let mut writer = writer_at("6k1/8/8/8/Q2Q4/8/8/Q5K1 w - - 0 1");
        assert_eq!(writer.push_coordinate("a4d1").unwrap(), "Qa4d1");
    }

    #[test]
    fn test_pinned_rival_needs_no_disambiguation() {
        // Knight on e3 is pinned by the rook on e8, so Nc3-d5 stays plain.
        let mut writer = writer_at("4r1k1/8/8/8/8/2N1N3/8/4K3 w - - 0 1");
        assert_eq!(writer.push_coordinate("c3d5").unwrap(), "Nd5");
    }

    #[test]
    fn test_blocked_rival_needs_no_disambiguation() {
        let mut writer = writer_at("6k1/8/8/8/8/8/8/R2N1RK1 w - - 0 1");
        assert_eq!(writer.push_coordinate("f1e1").unwrap(), "Re1");
    }

    #[test]
    fn test_en_passant_target_and_capture() {
        let mut writer = AlgebraicWriter::new();
        writer.push_all("e2e4 a7a6 e4e5 d7d5");
        assert_eq!(writer.position().en_passant, Square::parse("d6"));
        assert_eq!(writer.push_coordinate("e5d6").unwrap(), "exd6");
        assert_eq!(writer.position().en_passant, None);
        assert!(writer.grid().is_empty(Square::parse("d5").unwrap()));
        assert_eq!(writer.text(), "1. e4 a6 2. e5 d5 3. exd6");
    }

    #[test]
    fn test_double_push_without_neighbour_sets_no_target() {
        let mut writer = AlgebraicWriter::new();
        writer.push_coordinate("e2e4").unwrap();
        assert_eq!(writer.position().en_passant, None);
        assert_eq!(
            writer.to_fen(),
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1"
        );
    }

    #[test]
    fn test_promotion_and_capture_suffixes() {
        let mut writer = writer_at("1n4k1/P7/8/8/8/8/8/6K1 w - - 0 1");
        assert_eq!(writer.push_coordinate("a7b8q").unwrap(), "axb8=Q");
        assert_eq!(
            writer.grid().piece_at(Square::parse("b8").unwrap()),
            Some(Piece::new(PieceKind::Queen, PieceColor::White))
        );
    }

    #[test]
    fn test_malformed_token_skipped_and_reported() {
        let (text, rejected) = write_pgn("e2e4 zz e7e5 e3e4");
        assert_eq!(text, "1. e4 e5");
        assert_eq!(rejected.len(), 2);
        assert_eq!(rejected[0].index, 1);
        assert_eq!(rejected[1].index, 3);
        assert_eq!(
            rejected[1].error,
            CoordinateError::EmptyOrigin(Square::parse("e3").unwrap())
        );
    }

    #[test]
    fn test_clocks_and_counters() {
        let mut writer = AlgebraicWriter::new();
        writer.push_all("g1f3 g8f6 f3g1 f6g8");
        assert_eq!(writer.position().halfmove_clock, 4);
        assert_eq!(writer.position().fullmove_number, 3);
        writer.push_all("e2e4");
        assert_eq!(writer.position().halfmove_clock, 0);
    }

    #[test]
    fn test_diagonal_pawn_step_onto_empty_square_rejected() {
        let (text, rejected) = write_pgn("e2d3 e2e4");
        assert_eq!(text, "1. e4");
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].index, 0);
        assert_eq!(
            rejected[0].error,
            CoordinateError::NoEnPassantVictim(Square::parse("d3").unwrap())
        );

        // Own pawn beside the mover is not a victim either.
        let mut writer = writer_at("4k3/8/8/3PP3/8/8/8/4K3 w - - 0 1");
        assert!(writer.push_coordinate("e5d6").is_err());
        assert_eq!(writer.grid().placement(), "4k3/8/8/3PP3/8/8/8/4K3");
        assert_eq!(writer.side_to_move(), PieceColor::White);
    }

    #[test]
    fn test_huge_fullmove_number_keeps_counting() {
        let mut writer = writer_at("4k3/8/8/8/8/8/8/4K3 w - - 0 4294967295");
        writer.push_all("e1d1 e8d8 d1e1");
        assert_eq!(writer.text(), "4294967295. Kd1 Kd8 4294967296. Ke1");
        assert_eq!(writer.position().fullmove_number, u32::MAX);
    }

    #[test]
    fn test_black_to_move_start_uses_ellipsis() {
        let mut writer = writer_at("4k3/8/8/8/8/8/8/4K3 b - - 0 7");
        writer.push_all("e8d8 e1d1");
        assert_eq!(writer.text(), "7... Kd8 8. Kd1");
    }
}
