//! Algebraic → coordinate translation.
//!
//! A SAN token names a destination and a piece type, rarely the origin. The
//! translator keeps an identity-tracked [`BoardState`] for the line and
//! searches the identities of the right piece type for the one that can make
//! the move: geometry first ([`can_reach`]), then exposure of its own king
//! ([`would_expose_own_king`]).

use smallvec::SmallVec;

use crate::board::{en_passant_victim, BoardError, BoardState, CastleSide, PieceId, KING_COL};
use crate::coordinate::CoordinateMove;
use crate::movement::can_reach;
use crate::pgn::tokenizer::GameLine;
use crate::pin::would_expose_own_king;
use crate::types::{Piece, PieceColor, PieceKind, Square};

/// Characters trailing a SAN token that carry no move information.
const SUFFIX_CHARS: [char; 5] = ['+', '#', '!', '?', '*'];

/// How to pick among several identities that all satisfy a SAN token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolvePolicy {
    /// Take the lowest identity that qualifies, without checking for others.
    #[default]
    FirstMatch,
    /// Fail with [`SanError::AmbiguousMove`] when more than one qualifies.
    Strict,
}

/// Syntactic content of a SAN token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SanMove {
    Castle(CastleSide),
    Pawn {
        /// Origin file for captures.
        capture_from: Option<u8>,
        to: Square,
        promotion: Option<PieceKind>,
    },
    Piece {
        kind: PieceKind,
        from_col: Option<u8>,
        from_row: Option<u8>,
        to: Square,
    },
}

/// Parse the text of a SAN token without looking at a board.
pub fn parse_san(token: &str) -> Result<SanMove, SanError> {
    let san = token.trim_end_matches(SUFFIX_CHARS);
    match san {
        "O-O" | "0-0" => return Ok(SanMove::Castle(CastleSide::Kingside)),
        "O-O-O" | "0-0-0" => return Ok(SanMove::Castle(CastleSide::Queenside)),
        _ => {}
    }
    if !san.is_ascii() || san.len() < 2 {
        return Err(SanError::InvalidFormat(token.to_string()));
    }

    let first = san.as_bytes()[0] as char;
    if ('a'..='h').contains(&first) {
        return parse_pawn(token, san);
    }

    let kind = match PieceKind::from_char(first) {
        Some(kind) if first.is_ascii_uppercase() && kind != PieceKind::Pawn => kind,
        _ => return Err(SanError::InvalidFormat(token.to_string())),
    };
    let body: String = san[1..].chars().filter(|&c| c != 'x').collect();
    if body.len() < 2 {
        return Err(SanError::InvalidFormat(token.to_string()));
    }
    let (hint, dest) = body.split_at(body.len() - 2);
    let to = parse_square(dest)?;

    let mut hint_chars = hint.chars();
    let (from_col, from_row) = match (hint_chars.next(), hint_chars.next(), hint_chars.next()) {
        (None, _, _) => (None, None),
        (Some(c), None, _) if c.is_ascii_digit() => (None, Some(parse_rank(c)?)),
        (Some(c), None, _) => (Some(parse_file(c)?), None),
        (Some(f), Some(r), None) => (Some(parse_file(f)?), Some(parse_rank(r)?)),
        _ => return Err(SanError::InvalidFormat(token.to_string())),
    };

    Ok(SanMove::Piece {
        kind,
        from_col,
        from_row,
        to,
    })
}

fn parse_pawn(token: &str, san: &str) -> Result<SanMove, SanError> {
    let (body, promotion) = match san.split_once('=') {
        Some((body, promo)) => (body, Some(parse_promotion(promo)?)),
        None => match san.chars().last() {
            Some(c) if c.is_ascii_uppercase() => {
                let (body, promo) = san.split_at(san.len() - 1);
                (body, Some(parse_promotion(promo)?))
            }
            _ => (san, None),
        },
    };

    match body.split_once('x') {
        Some((from, dest)) => {
            let mut from_chars = from.chars();
            let file = match (from_chars.next(), from_chars.next()) {
                (Some(c), None) => parse_file(c)?,
                _ => return Err(SanError::InvalidFormat(token.to_string())),
            };
            Ok(SanMove::Pawn {
                capture_from: Some(file),
                to: parse_square(dest)?,
                promotion,
            })
        }
        None => Ok(SanMove::Pawn {
            capture_from: None,
            to: parse_square(body)?,
            promotion,
        }),
    }
}

fn parse_promotion(s: &str) -> Result<PieceKind, SanError> {
    let mut chars = s.chars();
    match (chars.next().and_then(PieceKind::from_char), chars.next()) {
        (Some(kind), None) if kind.is_promotion_target() => Ok(kind),
        _ => Err(SanError::InvalidPromotion(s.to_string())),
    }
}

fn parse_square(s: &str) -> Result<Square, SanError> {
    Square::parse(s).ok_or_else(|| SanError::InvalidSquare(s.to_string()))
}

fn parse_file(c: char) -> Result<u8, SanError> {
    Square::col_from_file(c).ok_or(SanError::InvalidFile(c))
}

fn parse_rank(c: char) -> Result<u8, SanError> {
    Square::row_from_rank(c).ok_or(SanError::InvalidRank(c))
}

/// Stateful algebraic → coordinate translator for one game line.
#[derive(Debug, Clone)]
pub struct SanTranslator {
    board: BoardState,
    side_to_move: PieceColor,
    policy: ResolvePolicy,
}

impl SanTranslator {
    pub fn new(policy: ResolvePolicy) -> Self {
        Self::from_board(BoardState::new(), PieceColor::White, policy)
    }

    pub fn from_board(board: BoardState, side_to_move: PieceColor, policy: ResolvePolicy) -> Self {
        Self {
            board,
            side_to_move,
            policy,
        }
    }

    pub fn board(&self) -> &BoardState {
        &self.board
    }

    pub fn side_to_move(&self) -> PieceColor {
        self.side_to_move
    }

    /// Resolve one SAN token for the side to move, play it, and return the
    /// coordinate move. On error the board is left untouched.
    pub fn play_san(&mut self, token: &str) -> Result<CoordinateMove, SanError> {
        let color = self.side_to_move;
        let mv = match parse_san(token)? {
            SanMove::Castle(side) => {
                self.board.castle(color, side)?;
                let row = color.back_row();
                let (king_to, _, _) = side.columns();
                CoordinateMove::new(
                    Square { row, col: KING_COL },
                    Square { row, col: king_to },
                    None,
                )
            }
            SanMove::Pawn {
                capture_from,
                to,
                promotion,
            } => {
                let from = self.pawn_origin(token, color, capture_from, to)?;
                let pawn = Piece::new(PieceKind::Pawn, color);
                self.board.apply_identity_move(pawn, from, to, promotion);
                CoordinateMove::new(from, to, promotion)
            }
            SanMove::Piece {
                kind,
                from_col,
                from_row,
                to,
            } => {
                let piece = Piece::new(kind, color);
                let from = match (from_col, from_row) {
                    (Some(col), Some(row)) => {
                        let from = Square { row, col };
                        if self.board.grid().piece_at(from) != Some(piece) {
                            return Err(SanError::NoLegalMove(token.to_string()));
                        }
                        from
                    }
                    _ => self.search_origin(token, piece, from_col, from_row, to)?,
                };
                self.board.apply_identity_move(piece, from, to, None);
                CoordinateMove::new(from, to, None)
            }
        };

        tracing::trace!(token, mv = %mv, "resolved SAN");
        self.side_to_move = color.opposite();
        Ok(mv)
    }

    /// Pawn origin from rank arithmetic: captures come from one rank behind
    /// on the named file, pushes from one rank behind unless that square
    /// holds no pawn of ours, in which case the pawn made its double step.
    /// A capture onto an empty square must take an enemy pawn en passant.
    fn pawn_origin(
        &self,
        token: &str,
        color: PieceColor,
        capture_from: Option<u8>,
        to: Square,
    ) -> Result<Square, SanError> {
        let back = -color.pawn_step();
        let mover = Piece::new(PieceKind::Pawn, color);
        let pawn = Some(mover);
        let grid = self.board.grid();

        let from = match capture_from {
            Some(col) => Square::new(to.row as i8 + back, col as i8),
            None => match to.offset(back, 0) {
                Some(one) if grid.piece_at(one) == pawn => Some(one),
                _ => to.offset(back * 2, 0),
            },
        };

        match from {
            Some(from) if grid.piece_at(from) == pawn => {
                let empty_capture = capture_from.is_some() && grid.is_empty(to);
                if empty_capture && en_passant_victim(grid, mover, from, to).is_none() {
                    return Err(SanError::NoLegalMove(token.to_string()));
                }
                Ok(from)
            }
            _ => Err(SanError::NoLegalMove(token.to_string())),
        }
    }

    /// Search the identities of `piece` for one that matches the origin hint,
    /// can reach `to`, and does not expose its own king.
    fn search_origin(
        &self,
        token: &str,
        piece: Piece,
        from_col: Option<u8>,
        from_row: Option<u8>,
        to: Square,
    ) -> Result<Square, SanError> {
        let grid = self.board.grid();
        let king = self
            .board
            .king_square(piece.color)
            .ok_or(SanError::MissingKing(piece.color))?;

        let mut candidates = self
            .board
            .identities(piece)
            .filter(|(_, sq)| from_col.map_or(true, |col| sq.col == col))
            .filter(|(_, sq)| from_row.map_or(true, |row| sq.row == row))
            .filter(|&(_, sq)| can_reach(piece.kind, sq, to, grid))
            .filter(|&(id, sq)| {
                let exposed = would_expose_own_king(piece.kind, sq, to, piece.color, grid, king);
                if exposed {
                    tracing::trace!(token, %id, from = %sq, "candidate pinned");
                }
                !exposed
            });

        match self.policy {
            ResolvePolicy::FirstMatch => candidates
                .next()
                .map(|(_, sq)| sq)
                .ok_or_else(|| SanError::NoLegalMove(token.to_string())),
            ResolvePolicy::Strict => {
                let found: SmallVec<[(PieceId, Square); 4]> = candidates.collect();
                match found.as_slice() {
                    [] => Err(SanError::NoLegalMove(token.to_string())),
                    [(_, sq)] => Ok(*sq),
                    _ => Err(SanError::AmbiguousMove(token.to_string())),
                }
            }
        }
    }

    /// Translate a whole line on a fresh board. The first unresolvable token
    /// abandons the line and its partial output.
    pub fn translate_line(
        line: &GameLine,
        policy: ResolvePolicy,
    ) -> Result<Vec<CoordinateMove>, LineError> {
        let mut translator = Self::new(policy);
        line.moves()
            .iter()
            .enumerate()
            .map(|(ply, token)| {
                translator.play_san(token).map_err(|source| LineError {
                    ply,
                    token: token.clone(),
                    source,
                })
            })
            .collect()
    }
}

impl Default for SanTranslator {
    fn default() -> Self {
        Self::new(ResolvePolicy::default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SanError {
    #[error("No legal move found for: {0}")]
    NoLegalMove(String),
    #[error("Ambiguous move: {0}")]
    AmbiguousMove(String),
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
    #[error("Invalid square: {0}")]
    InvalidSquare(String),
    #[error("Invalid file: {0}")]
    InvalidFile(char),
    #[error("Invalid rank: {0}")]
    InvalidRank(char),
    #[error("Invalid promotion: {0}")]
    InvalidPromotion(String),
    #[error("No {0} king on the board")]
    MissingKing(PieceColor),
    #[error(transparent)]
    Board(#[from] BoardError),
}

/// Why a game line was abandoned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("ply {ply} ({token}): {source}")]
pub struct LineError {
    /// Index of the failing token in the line, counting from zero.
    pub ply: usize,
    pub token: String,
    #[source]
    pub source: SanError,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinate::format_line;

    fn sq(name: &str) -> Square {
        Square::parse(name).unwrap()
    }

    fn line(tokens: &str) -> GameLine {
        GameLine::from(tokens.split_whitespace().map(String::from).collect::<Vec<_>>())
    }

    fn translate(tokens: &str) -> Result<String, LineError> {
        SanTranslator::translate_line(&line(tokens), ResolvePolicy::FirstMatch)
            .map(|moves| format_line(&moves))
    }

    fn at(placement: &str, side: PieceColor) -> SanTranslator {
        SanTranslator::from_board(
            BoardState::from_placement(placement).unwrap(),
            side,
            ResolvePolicy::FirstMatch,
        )
    }

    #[test]
    fn test_parse_san_forms() {
        assert_eq!(parse_san("O-O+"), Ok(SanMove::Castle(CastleSide::Kingside)));
        assert_eq!(parse_san("0-0-0"), Ok(SanMove::Castle(CastleSide::Queenside)));
        assert_eq!(
            parse_san("exd8=Q#"),
            Ok(SanMove::Pawn {
                capture_from: Some(4),
                to: sq("d8"),
                promotion: Some(PieceKind::Queen),
            })
        );
        assert_eq!(
            parse_san("Rdd8"),
            Ok(SanMove::Piece {
                kind: PieceKind::Rook,
                from_col: Some(3),
                from_row: None,
                to: sq("d8"),
            })
        );
        assert_eq!(
            parse_san("R1xa4"),
            Ok(SanMove::Piece {
                kind: PieceKind::Rook,
                from_col: None,
                from_row: Some(7),
                to: sq("a4"),
            })
        );
        assert_eq!(
            parse_san("Qa4xd1"),
            Ok(SanMove::Piece {
                kind: PieceKind::Queen,
                from_col: Some(0),
                from_row: Some(4),
                to: sq("d1"),
            })
        );
    }

    #[test]
    fn test_parse_san_rejects_garbage() {
        assert!(matches!(parse_san("Z4"), Err(SanError::InvalidFormat(_))));
        assert!(matches!(parse_san("N"), Err(SanError::InvalidFormat(_))));
        assert!(matches!(parse_san("e9"), Err(SanError::InvalidSquare(_))));
        assert!(matches!(parse_san("e8=K"), Err(SanError::InvalidPromotion(_))));
        assert!(matches!(parse_san("Rzd8"), Err(SanError::InvalidFile('z'))));
    }

    #[test]
    fn test_opening_line() {
        assert_eq!(translate("e4 e5 Nf3 Nc6 Bb5 a6").unwrap(), "e2e4 e7e5 g1f3 b8c6 f1b5 a7a6");
    }

    #[test]
    fn test_single_and_double_pushes_from_occupancy() {
        assert_eq!(translate("e3 e6 e4 e5").unwrap(), "e2e3 e7e6 e3e4 e6e5");
    }

    #[test]
    fn test_castling_both_sides() {
        assert_eq!(
            translate("e4 e5 Nf3 Nc6 Bc4 d6 O-O Bg4 d3 Qd7 Nc3 O-O-O").unwrap(),
            "e2e4 e7e5 g1f3 b8c6 f1c4 d7d6 e1g1 c8g4 d2d3 d8d7 b1c3 e8c8"
        );
    }

    #[test]
    fn test_castling_without_rook_fails() {
        let mut translator = at("4k3/8/8/8/8/8/8/4K3", PieceColor::White);
        assert!(matches!(
            translator.play_san("O-O"),
            Err(SanError::Board(BoardError::CastlingPiecesMissing { .. }))
        ));
    }

    #[test]
    fn test_en_passant_capture() {
        let mut translator = SanTranslator::default();
        for token in ["e4", "a6", "e5", "d5"] {
            translator.play_san(token).unwrap();
        }
        let mv = translator.play_san("exd6").unwrap();
        assert_eq!(mv.to_string(), "e5d6");
        assert!(translator.board().grid().is_empty(sq("d5")));
    }

    #[test]
    fn test_capture_onto_empty_square_needs_enemy_pawn() {
        // d4 is white's own pawn, so exd5 cannot be en passant.
        let err = translate("e4 a6 d4 a5 exd5").unwrap_err();
        assert_eq!(err.ply, 4);
        assert_eq!(err.source, SanError::NoLegalMove("exd5".to_string()));

        let mut translator = at("4k3/8/8/4Pn2/8/8/8/4K3", PieceColor::White);
        assert!(matches!(translator.play_san("exf6"), Err(SanError::NoLegalMove(_))));
        assert_eq!(
            translator.board().grid().piece_at(sq("f5")),
            Some(Piece::new(PieceKind::Knight, PieceColor::Black))
        );
    }

    #[test]
    fn test_knight_search_uses_geometry() {
        assert_eq!(translate("Nf3 Nf6 Nc3").unwrap(), "g1f3 g8f6 b1c3");
    }

    #[test]
    fn test_file_disambiguation_picks_named_rook() {
        // Both rooks reach d1; the file selects the a-rook.
        let mut translator = at("6k1/8/8/8/8/8/8/R4RK1", PieceColor::White);
        let mv = translator.play_san("Rad1").unwrap();
        assert_eq!(mv.to_string(), "a1d1");

        let mut translator = at("6k1/8/8/8/8/8/8/R4RK1", PieceColor::White);
        let mv = translator.play_san("Rfd1").unwrap();
        assert_eq!(mv.to_string(), "f1d1");
    }

    #[test]
    fn test_rank_disambiguation() {
        let mut translator = at("R5k1/8/8/8/8/8/8/R5K1", PieceColor::White);
        assert_eq!(translator.play_san("R8a4").unwrap().to_string(), "a8a4");
    }

    #[test]
    fn test_pinned_rook_is_excluded() {
        // Rooks on d2 and a1 both reach d1. The d2 rook comes first but is
        // pinned by the bishop on a5 against the king on e1.
        let mut translator = at("6k1/8/8/b7/8/8/3R4/R3K3", PieceColor::White);
        assert_eq!(translator.play_san("Rd1").unwrap().to_string(), "a1d1");
    }

    #[test]
    fn test_pinned_candidate_on_named_file_is_skipped() {
        // Two knights on the c-file both jump to e4; the c5 knight is pinned
        // by the rook on a5 against the king on h5.
        let mut translator = at("6k1/8/8/r1N4K/8/2N5/8/8", PieceColor::White);
        assert_eq!(translator.play_san("Nce4").unwrap().to_string(), "c3e4");
    }

    #[test]
    fn test_unresolvable_token_abandons_line() {
        let err = translate("e4 e5 Qh8").unwrap_err();
        assert_eq!(err.ply, 2);
        assert_eq!(err.token, "Qh8");
        assert_eq!(err.source, SanError::NoLegalMove("Qh8".to_string()));
    }

    #[test]
    fn test_pawn_without_origin_pawn_is_rejected() {
        assert!(matches!(
            translate("e5").unwrap_err().source,
            SanError::NoLegalMove(_)
        ));
        assert!(matches!(
            translate("exd5").unwrap_err().source,
            SanError::NoLegalMove(_)
        ));
    }

    #[test]
    fn test_full_origin_must_hold_the_piece() {
        assert!(translate("Ng1f3").is_ok());
        assert!(matches!(
            translate("Ng2f4").unwrap_err().source,
            SanError::NoLegalMove(_)
        ));
    }

    #[test]
    fn test_promotion_creates_searchable_piece() {
        let mut translator = at("6k1/P7/8/8/8/8/8/6K1", PieceColor::White);
        assert_eq!(translator.play_san("a8=Q").unwrap().to_string(), "a7a8q");
        translator.play_san("Kh7").unwrap();
        assert_eq!(translator.play_san("Qb7").unwrap().to_string(), "a8b7");
    }

    #[test]
    fn test_first_match_versus_strict() {
        // Two rooks reach d1 and the token carries no hint.
        let mut first = at("6k1/8/8/8/8/8/8/R4RK1", PieceColor::White);
        assert_eq!(first.play_san("Rd1").unwrap().to_string(), "a1d1");

        let mut strict = SanTranslator::from_board(
            BoardState::from_placement("6k1/8/8/8/8/8/8/R4RK1").unwrap(),
            PieceColor::White,
            ResolvePolicy::Strict,
        );
        assert_eq!(
            strict.play_san("Rd1"),
            Err(SanError::AmbiguousMove("Rd1".to_string()))
        );
        assert_eq!(strict.play_san("Rad1").unwrap().to_string(), "a1d1");
    }

    #[test]
    fn test_failed_token_leaves_side_to_move() {
        let mut translator = SanTranslator::default();
        assert!(translator.play_san("Ke3").is_ok());
        assert_eq!(translator.side_to_move(), PieceColor::Black);
        assert!(translator.play_san("Qa1").is_err());
        assert_eq!(translator.side_to_move(), PieceColor::Black);
    }
}
