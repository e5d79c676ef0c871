use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FenError {
    #[error("expected at least 4 fields, found {0}")]
    MissingFields(usize),

    #[error("expected 8 ranks in piece placement, found {0}")]
    RankCount(usize),

    #[error("rank {rank} does not describe exactly 8 squares")]
    RankLength { rank: u8 },

    #[error("invalid piece character '{0}'")]
    InvalidPiece(char),

    #[error("invalid side to move '{0}'")]
    InvalidSide(String),

    #[error("invalid castling character '{0}'")]
    InvalidCastling(char),

    #[error("invalid en passant square '{0}'")]
    InvalidEnPassant(String),

    #[error("invalid move counter '{0}'")]
    InvalidCounter(String),

    #[error("each side needs exactly one king")]
    KingCount,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveParseError {
    #[error("malformed move text '{0}'")]
    Syntax(String),

    #[error("no legal move matches '{0}'")]
    NoSuchMove(String),
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid position: {0}")]
    Fen(#[from] FenError),

    #[error("invalid move: {0}")]
    Move(#[from] MoveParseError),
}

pub type Result<T> = std::result::Result<T, EngineError>;
