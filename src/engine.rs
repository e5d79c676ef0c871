use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::attack_tables::AttackTables;
use crate::board::Board;
use crate::config::EngineConfig;
use crate::error::Result;
use crate::evaluation::Evaluator;
use crate::movegen::{Move, MoveGenerator};
use crate::perft::Divide;
use crate::search::{Search, SearchResult};
use crate::transposition::TranspositionTable;
use crate::zobrist::ZobristKeys;

/// The surface a front end drives: one game position plus a search that
/// keeps its transposition table between moves.
pub struct Engine {
    keys: Arc<ZobristKeys>,
    board: Board,
    search: Search<Evaluator>,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        // Keys and tables exist before any board
        let keys = Arc::new(ZobristKeys::new(config.zobrist_seed));
        let tables = Arc::new(AttackTables::new());
        let board = Board::startpos(keys.clone());
        let search = Search::new(
            Evaluator::new(),
            MoveGenerator::new(tables),
            TranspositionTable::new(config.hash_entries),
            config.search,
        );
        Self { keys, board, search }
    }

    pub fn new_game(&mut self) {
        self.board = Board::startpos(self.keys.clone());
        self.search.clear();
        debug!("new game");
    }

    /// Sets up `fen` (the start position when `None`) and plays `moves` on
    /// it. The current position is kept if anything fails to parse.
    pub fn set_position(&mut self, fen: Option<&str>, moves: &[&str]) -> Result<()> {
        let mut board = match fen {
            Some(fen) => Board::from_fen(fen, self.keys.clone())?,
            None => Board::startpos(self.keys.clone()),
        };
        let generator = self.search.move_generator();
        for text in moves {
            let mv = generator.find_move(&mut board, text)?;
            board.make_move(mv);
        }
        self.board = board;
        Ok(())
    }

    /// Plays one move given in long algebraic notation.
    pub fn play(&mut self, text: &str) -> Result<Move> {
        let mv = self.search.move_generator().find_move(&mut self.board, text)?;
        self.board.make_move(mv);
        Ok(mv)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn search(&self) -> &Search<Evaluator> {
        &self.search
    }

    pub fn go(&mut self, remaining: Duration, moves_to_go: u32) -> SearchResult {
        self.search
            .find_best_move(&mut self.board, remaining, moves_to_go)
    }

    pub fn go_depth(&mut self, depth: i32) -> SearchResult {
        self.search.search_depth(&mut self.board, depth)
    }

    pub fn perft(&mut self, depth: u32) -> u64 {
        self.search.move_generator().perft(&mut self.board, depth)
    }

    pub fn divide(&mut self, depth: u32) -> Divide {
        self.search.move_generator().divide(&mut self.board, depth)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{EngineError, FenError, MoveParseError};

    fn small_engine() -> Engine {
        Engine::new(EngineConfig {
            hash_entries: 1 << 14,
            ..EngineConfig::default()
        })
    }

    #[test]
    fn test_set_position_with_moves() {
        let mut engine = small_engine();
        engine.set_position(None, &["e2e4", "e7e5", "g1f3"]).unwrap();
        assert_eq!(
            engine.board().to_fen(),
            "rnbqkbnr/pppp1ppp/8/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R b KQkq - 1 2"
        );
    }

    #[test]
    fn test_bad_input_keeps_position() {
        let mut engine = small_engine();
        engine.play("d2d4").unwrap();
        let before = engine.board().to_fen();

        let err = engine.set_position(None, &["e2e4", "e2e4"]).unwrap_err();
        assert!(matches!(err, EngineError::Move(MoveParseError::NoSuchMove(_))));
        let err = engine.set_position(Some("not a fen"), &[]).unwrap_err();
        assert!(matches!(err, EngineError::Fen(FenError::MissingFields(3))));
        assert!(engine.play("zz").is_err());

        assert_eq!(engine.board().to_fen(), before);
    }

    #[test]
    fn test_go_returns_legal_move_and_ponder() {
        let mut engine = small_engine();
        let result = engine.go_depth(4);
        let best = result.best_move.unwrap();
        let mut board = engine.board().clone();
        assert!(engine.search().move_generator().legal_moves(&mut board).contains(&best));
        assert_eq!(result.depth, 4);
        if let Some(ponder) = result.ponder_move {
            assert_eq!(result.pv[1], ponder);
        }
    }

    #[test]
    fn test_new_game_resets_board() {
        let mut engine = small_engine();
        engine.play("e2e4").unwrap();
        engine.new_game();
        assert_eq!(engine.board().to_fen(), crate::board::START_FEN);
        assert_eq!(engine.perft(2), 400);
    }
}
