pub mod attack_tables;
pub mod bitboard;
pub mod board;
pub mod config;
pub mod engine;
pub mod error;
pub mod evaluation;
pub mod movegen;
pub mod perft;
pub mod search;
pub mod time_control;
pub mod transposition;
pub mod zobrist;

pub use attack_tables::AttackTables;
pub use bitboard::Bitboard;
pub use board::{Board, Color, Piece, START_FEN};
pub use config::{EngineConfig, SearchConfig, SearchFeatures};
pub use engine::Engine;
pub use error::{EngineError, FenError, MoveParseError};
pub use evaluation::{Evaluate, Evaluator};
pub use movegen::{Move, MoveGenerator};
pub use perft::Divide;
pub use search::{Search, SearchResult};
pub use transposition::TranspositionTable;
pub use zobrist::ZobristKeys;
