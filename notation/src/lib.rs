pub mod board;
pub mod convert;
pub mod coordinate;
pub mod fen;
pub mod movement;
pub mod pgn;
pub mod pin;
pub mod types;

pub use board::{BoardError, BoardGrid, BoardState, CastleSide, PieceId};
pub use convert::{
    convert_lines, coordinate_to_pgn, pgn_to_coordinate, ConvertOptions, LineOutcome,
};
pub use coordinate::{
    format_coordinate, format_line, parse_coordinate, CoordinateError, CoordinateMove,
};
pub use fen::{format_fen, parse_fen, CastlingRights, FenError, Position};
pub use pgn::{
    tokenize, AlgebraicWriter, GameLine, LineError, RejectedMove, ResolvePolicy, SanError,
    SanTranslator,
};
pub use types::{Piece, PieceColor, PieceKind, Square};
