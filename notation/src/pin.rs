//! Exposure of one's own king along a line the moving piece was blocking.

use crate::board::BoardGrid;
use crate::movement::{line_between, unit_step};
use crate::types::{PieceColor, PieceKind, Square};

/// Would moving a `kind` of `color` from `from` to `to` uncover a sliding
/// attack on the king standing on `king`?
///
/// Walks outward from the king through `from`. Reaching `to` first means the
/// piece stays on the line (or captures the attacker) and nothing is exposed.
/// Any other piece between the king and `from` already shields the king.
/// Beyond `from`, the first occupied square decides: an enemy slider of the
/// matching line type pins the mover.
pub fn would_expose_own_king(
    kind: PieceKind,
    from: Square,
    to: Square,
    color: PieceColor,
    grid: &BoardGrid,
    king: Square,
) -> bool {
    if kind == PieceKind::King || from == king {
        return false;
    }
    let Some(line) = line_between(king, from) else {
        return false;
    };

    let (dr, dc) = unit_step(king, from);
    let mut passed_mover = false;
    let mut current = king.offset(dr, dc);
    while let Some(sq) = current {
        if sq == to {
            return false;
        }
        if sq == from {
            passed_mover = true;
        } else if let Some(piece) = grid.piece_at(sq) {
            if !passed_mover {
                return false;
            }
            return piece.color != color && line.is_slid_by(piece.kind);
        }
        current = sq.offset(dr, dc);
    }
    false
}
