//! Coordinate ("Smith") move notation: origin square, destination square and
//! an optional promotion letter, e.g. `e2e4` or `e7e8q`.

use std::str::FromStr;

use crate::types::{PieceKind, Square};

/// A move in coordinate notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CoordinateMove {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceKind>,
}

impl CoordinateMove {
    pub fn new(from: Square, to: Square, promotion: Option<PieceKind>) -> Self {
        Self {
            from,
            to,
            promotion,
        }
    }
}

/// Parse coordinate notation (e2e4, e7e8q). The promotion letter is
/// case-insensitive.
pub fn parse_coordinate(s: &str) -> Result<CoordinateMove, CoordinateError> {
    if !s.is_ascii() || !(4..=5).contains(&s.len()) {
        return Err(CoordinateError::InvalidLength(s.to_string()));
    }

    let from = Square::parse(&s[0..2])
        .ok_or_else(|| CoordinateError::InvalidSquare(s.to_string()))?;
    let to = Square::parse(&s[2..4])
        .ok_or_else(|| CoordinateError::InvalidSquare(s.to_string()))?;

    let promotion = match s[4..].chars().next() {
        None => None,
        Some(c) => match PieceKind::from_char(c) {
            Some(kind) if kind.is_promotion_target() => Some(kind),
            _ => return Err(CoordinateError::InvalidPromotion(c)),
        },
    };

    Ok(CoordinateMove {
        from,
        to,
        promotion,
    })
}

/// Format a move in coordinate notation with a lowercase promotion letter.
pub fn format_coordinate(mv: CoordinateMove) -> String {
    let mut s = format!("{}{}", mv.from, mv.to);
    if let Some(promo) = mv.promotion {
        s.push(promo.to_char_lower());
    }
    s
}

/// Space-separated coordinate notation for a whole line.
pub fn format_line(moves: &[CoordinateMove]) -> String {
    moves
        .iter()
        .map(|&mv| format_coordinate(mv))
        .collect::<Vec<_>>()
        .join(" ")
}

impl FromStr for CoordinateMove {
    type Err = CoordinateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_coordinate(s)
    }
}

impl std::fmt::Display for CoordinateMove {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&format_coordinate(*self))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoordinateError {
    #[error("Invalid coordinate move length: {0}")]
    InvalidLength(String),
    #[error("Invalid square in coordinate move: {0}")]
    InvalidSquare(String),
    #[error("Invalid promotion: {0}")]
    InvalidPromotion(char),
    #[error("No piece on origin square {0}")]
    EmptyOrigin(Square),
    #[error("Pawn capture onto empty square {0} takes nothing en passant")]
    NoEnPassantVictim(Square),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_move() {
        let mv = parse_coordinate("e2e4").unwrap();
        assert_eq!(mv.from, Square::parse("e2").unwrap());
        assert_eq!(mv.to, Square::parse("e4").unwrap());
        assert_eq!(mv.promotion, None);
    }

    #[test]
    fn test_parse_promotion_any_case() {
        assert_eq!(
            parse_coordinate("e7e8q").unwrap().promotion,
            Some(PieceKind::Queen)
        );
        assert_eq!(
            parse_coordinate("a2a1N").unwrap().promotion,
            Some(PieceKind::Knight)
        );
    }

    #[test]
    fn test_parse_rejects_malformed_tokens() {
        assert!(matches!(
            parse_coordinate("e2e"),
            Err(CoordinateError::InvalidLength(_))
        ));
        assert!(matches!(
            parse_coordinate("e2e4qq"),
            Err(CoordinateError::InvalidLength(_))
        ));
        assert!(matches!(
            parse_coordinate("z2e4"),
            Err(CoordinateError::InvalidSquare(_))
        ));
        assert_eq!(
            parse_coordinate("e7e8k"),
            Err(CoordinateError::InvalidPromotion('k'))
        );
    }

    #[test]
    fn test_format_coordinate_move() {
        let mv: CoordinateMove = "e7e8Q".parse().unwrap();
        assert_eq!(mv.to_string(), "e7e8q");
        assert_eq!(format_line(&[mv, "g1f3".parse().unwrap()]), "e7e8q g1f3");
    }
}
