pub mod san;
pub mod tokenizer;
pub mod writer;

pub use san::{parse_san, LineError, ResolvePolicy, SanError, SanMove, SanTranslator};
pub use tokenizer::{expand_variations, split_games, tokenize, GameLine};
pub use writer::{write_pgn, AlgebraicWriter, RejectedMove};
