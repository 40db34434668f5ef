//! Movement geometry: can a piece type travel from one square to another,
//! ignoring whose turn it is and whether the king ends up in check.

use crate::board::BoardGrid;
use crate::types::{PieceKind, Square};

/// For each square, the set of squares on its diagonals as a 64-bit mask.
static DIAGONALS: [u64; 64] = build_diagonals();

const fn build_diagonals() -> [u64; 64] {
    let mut table = [0u64; 64];
    let mut from = 0;
    while from < 64 {
        let (row, col) = ((from / 8) as i32, (from % 8) as i32);
        let mut to = 0;
        while to < 64 {
            let (r, c) = ((to / 8) as i32, (to % 8) as i32);
            let (dr, dc) = (r - row, c - col);
            if dr != 0 && (dr == dc || dr == -dc) {
                table[from] |= 1u64 << to;
            }
            to += 1;
        }
        from += 1;
    }
    table
}

const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (2, 1),
    (2, -1),
    (-2, 1),
    (-2, -1),
    (1, 2),
    (1, -2),
    (-1, 2),
    (-1, -2),
];

/// Kind of straight line joining two squares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line {
    /// Same rank or same file.
    Orthogonal,
    Diagonal,
}

impl Line {
    /// Whether a slider of `kind` attacks along this line type.
    pub fn is_slid_by(self, kind: PieceKind) -> bool {
        match self {
            Self::Orthogonal => matches!(kind, PieceKind::Rook | PieceKind::Queen),
            Self::Diagonal => matches!(kind, PieceKind::Bishop | PieceKind::Queen),
        }
    }
}

pub fn on_diagonal(a: Square, b: Square) -> bool {
    DIAGONALS[a.index()] & (1u64 << b.index()) != 0
}

pub fn on_rank_or_file(a: Square, b: Square) -> bool {
    a != b && (a.row == b.row || a.col == b.col)
}

/// The line joining two distinct squares, if any.
pub fn line_between(a: Square, b: Square) -> Option<Line> {
    if on_rank_or_file(a, b) {
        Some(Line::Orthogonal)
    } else if on_diagonal(a, b) {
        Some(Line::Diagonal)
    } else {
        None
    }
}

/// Unit step from `a` toward `b` on each axis.
pub fn unit_step(a: Square, b: Square) -> (i8, i8) {
    (
        (b.row as i8 - a.row as i8).signum(),
        (b.col as i8 - a.col as i8).signum(),
    )
}

/// Walk unit steps from `from` toward `to`; every square strictly between
/// them must be empty. Whatever occupies `to` is not inspected.
pub fn path_is_clear(from: Square, to: Square, grid: &BoardGrid) -> bool {
    let (dr, dc) = unit_step(from, to);
    let mut current = from.offset(dr, dc);
    while let Some(sq) = current {
        if sq == to {
            return true;
        }
        if !grid.is_empty(sq) {
            return false;
        }
        current = sq.offset(dr, dc);
    }
    false
}

pub fn is_knight_jump(from: Square, to: Square) -> bool {
    KNIGHT_OFFSETS
        .iter()
        .any(|&(dr, dc)| from.offset(dr, dc) == Some(to))
}

/// Can a piece of `kind` on `from` reach `to` on this grid?
///
/// Kings always answer `true`: SAN king moves name an unambiguous destination
/// and there is only one king per side, so no adjacency check is made. Pawns
/// always answer `false`; their origin is reconstructed from rank arithmetic
/// instead.
pub fn can_reach(kind: PieceKind, from: Square, to: Square, grid: &BoardGrid) -> bool {
    if from == to {
        return false;
    }
    match kind {
        PieceKind::Bishop => on_diagonal(from, to) && path_is_clear(from, to, grid),
        PieceKind::Rook => on_rank_or_file(from, to) && path_is_clear(from, to, grid),
        PieceKind::Queen => {
            (on_diagonal(from, to) || on_rank_or_file(from, to)) && path_is_clear(from, to, grid)
        }
        PieceKind::Knight => is_knight_jump(from, to),
        PieceKind::King => true,
        PieceKind::Pawn => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        Square::parse(name).unwrap()
    }

    #[test]
    fn test_diagonal_table() {
        assert!(on_diagonal(sq("a1"), sq("h8")));
        assert!(on_diagonal(sq("c1"), sq("h6")));
        assert!(on_diagonal(sq("e4"), sq("b7")));
        assert!(!on_diagonal(sq("e4"), sq("e5")));
        assert!(!on_diagonal(sq("e4"), sq("e4")));
        assert!(!on_diagonal(sq("a1"), sq("b3")));
    }

    #[test]
    fn test_line_between() {
        assert_eq!(line_between(sq("a1"), sq("a8")), Some(Line::Orthogonal));
        assert_eq!(line_between(sq("a1"), sq("c3")), Some(Line::Diagonal));
        assert_eq!(line_between(sq("a1"), sq("b3")), None);
    }

    #[test]
    fn test_bishop_blocked_by_own_pawn() {
        let grid = BoardGrid::standard();
        assert!(!can_reach(PieceKind::Bishop, sq("f1"), sq("c4"), &grid));
        assert!(!can_reach(PieceKind::Bishop, sq("f1"), sq("f3"), &grid));
    }

    #[test]
    fn test_slider_may_land_on_occupied_square() {
        let grid = BoardGrid::from_placement("4k3/8/8/3p4/8/8/8/3RK3").unwrap();
        assert!(can_reach(PieceKind::Rook, sq("d1"), sq("d5"), &grid));
        assert!(!can_reach(PieceKind::Rook, sq("d1"), sq("d6"), &grid));
        assert!(can_reach(PieceKind::Queen, sq("d1"), sq("d5"), &grid));
    }

    #[test]
    fn test_knight_jumps_over_pieces() {
        let grid = BoardGrid::standard();
        assert!(can_reach(PieceKind::Knight, sq("g1"), sq("f3"), &grid));
        assert!(can_reach(PieceKind::Knight, sq("g1"), sq("h3"), &grid));
        assert!(!can_reach(PieceKind::Knight, sq("g1"), sq("g3"), &grid));
    }

    #[test]
    fn test_king_and_pawn_are_not_searched() {
        let grid = BoardGrid::standard();
        assert!(can_reach(PieceKind::King, sq("e1"), sq("e2"), &grid));
        assert!(!can_reach(PieceKind::Pawn, sq("e2"), sq("e4"), &grid));
    }
}
