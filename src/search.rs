use std::time::Duration;

use tracing::{debug, info, trace};

use crate::board::Board;
use crate::config::SearchConfig;
use crate::evaluation::{Evaluate, Evaluator};
use crate::movegen::{Move, MoveGenerator};
use crate::time_control::TimeControl;
use crate::transposition::{score_to_tt, NodeType, TranspositionTable};

pub const MATE: i32 = 30_000;
pub const INFINITY: i32 = 32_000;
pub const DRAW: i32 = 0;
pub const MAX_PLY: i32 = 128;

// Move ordering scores
const HASH_MOVE_SCORE: i32 = 250;
const MVV_LVA_OFFSET: i32 = 150;
const KILLER_SCORES: [i32; 2] = [100, 50];

// MVV_LVA[victim][attacker]
const MVV_LVA: [[i32; 6]; 6] = [
    [15, 14, 13, 12, 11, 10],
    [25, 24, 23, 22, 21, 20],
    [35, 34, 33, 32, 31, 30],
    [45, 44, 43, 42, 41, 40],
    [55, 54, 53, 52, 51, 50],
    [0, 0, 0, 0, 0, 0],
];

// Promotion ordering in pawn units
const PROMOTION_SCORES: [i32; 6] = [0, 3, 3, 5, 9, 0];

#[derive(Debug, Clone, Copy)]
struct ScoredMove {
    mv: Move,
    score: i32,
}

/// Report for one fully searched depth.
#[derive(Debug, Clone)]
pub struct IterationInfo {
    pub depth: i32,
    pub score: i32,
    pub nodes: u64,
    pub elapsed: Duration,
    /// Transposition table fill in permille.
    pub hashfull: u32,
    pub pv: Vec<Move>,
}

#[derive(Debug, Clone, Default)]
pub struct SearchResult {
    pub best_move: Option<Move>,
    pub ponder_move: Option<Move>,
    pub score: i32,
    /// Deepest iteration that finished.
    pub depth: i32,
    pub nodes: u64,
    pub pv: Vec<Move>,
    pub iterations: Vec<IterationInfo>,
}

pub fn is_mate_score(score: i32) -> bool {
    score.abs() >= MATE - MAX_PLY
}

pub struct Search<E: Evaluate = Evaluator> {
    evaluator: E,
    move_generator: MoveGenerator,
    transposition_table: TranspositionTable,
    config: SearchConfig,
    killers: Vec<[Option<Move>; 2]>,
    nodes_searched: u64,
    time_control: TimeControl,
}

impl<E: Evaluate> Search<E> {
    pub fn new(
        evaluator: E,
        move_generator: MoveGenerator,
        transposition_table: TranspositionTable,
        config: SearchConfig,
    ) -> Self {
        Self {
            evaluator,
            move_generator,
            transposition_table,
            config,
            killers: vec![[None; 2]; MAX_PLY as usize],
            nodes_searched: 0,
            time_control: TimeControl::infinite(),
        }
    }

    /// Searches with a share of the remaining clock time.
    pub fn find_best_move(
        &mut self,
        board: &mut Board,
        remaining: Duration,
        moves_remaining: u32,
    ) -> SearchResult {
        let budget = TimeControl::budget_for(remaining, moves_remaining);
        let time_control = TimeControl::new(Some(budget), self.config.time_check_interval);
        self.iterative_deepening(board, time_control, self.config.max_depth)
    }

    /// Searches to exactly `depth` with no clock.
    pub fn search_depth(&mut self, board: &mut Board, depth: i32) -> SearchResult {
        let time_control = TimeControl::new(None, self.config.time_check_interval);
        self.iterative_deepening(board, time_control, depth)
    }

    /// Searches until `nodes` positions have been visited, with no clock.
    pub fn search_nodes(&mut self, board: &mut Board, nodes: u64) -> SearchResult {
        let time_control =
            TimeControl::new(None, self.config.time_check_interval).with_node_limit(nodes);
        self.iterative_deepening(board, time_control, self.config.max_depth)
    }

    /// Forgets everything learned in earlier games.
    pub fn clear(&mut self) {
        self.transposition_table.clear();
        self.killers.iter_mut().for_each(|k| *k = [None; 2]);
        debug!("transposition table cleared");
    }

    pub fn transposition_table(&self) -> &TranspositionTable {
        &self.transposition_table
    }

    pub fn move_generator(&self) -> &MoveGenerator {
        &self.move_generator
    }

    pub fn iterative_deepening(
        &mut self,
        board: &mut Board,
        time_control: TimeControl,
        max_depth: i32,
    ) -> SearchResult {
        self.time_control = time_control;
        self.time_control.start();
        self.nodes_searched = 0;
        self.killers.iter_mut().for_each(|k| *k = [None; 2]);
        self.transposition_table.new_search();
        debug!(
            max_depth,
            budget_ms = self.time_control.budget().map(|budget| budget.as_millis() as u64),
            "search started"
        );

        let mut result = SearchResult::default();
        let root_moves = self.move_generator.legal_moves(board);
        if root_moves.is_empty() {
            let us = board.side_to_move();
            result.score = if self.move_generator.in_check(board, us) { -MATE } else { DRAW };
            return result;
        }

        let max_depth = max_depth.clamp(1, MAX_PLY - 1);
        for depth in 1..=max_depth {
            let iteration = self.search_root(board, &root_moves, depth, result.best_move);

            if self.time_control.is_stopped() {
                trace!(depth, "iteration abandoned, time is up");
                if result.best_move.is_none() {
                    result.best_move = iteration.map(|(mv, _)| mv).or(Some(root_moves[0]));
                }
                break;
            }

            let (best_move, score) = match iteration {
                Some(found) => found,
                None => break,
            };
            result.best_move = Some(best_move);
            result.score = score;
            result.depth = depth;
            result.pv = self.extract_pv(board, best_move, depth as usize);

            let info = IterationInfo {
                depth,
                score,
                nodes: self.nodes_searched,
                elapsed: self.time_control.elapsed(),
                hashfull: self.transposition_table.occupancy(),
                pv: result.pv.clone(),
            };
            debug!(
                depth,
                score,
                nodes = info.nodes,
                elapsed_ms = info.elapsed.as_millis() as u64,
                hashfull = info.hashfull,
                pv = %format_line(&info.pv),
                "iteration complete"
            );
            result.iterations.push(info);

            // A proven mate cannot get shorter with more depth
            if is_mate_score(score) && MATE - score.abs() <= depth {
                break;
            }
            if self.time_control.check_time() {
                break;
            }
        }

        result.ponder_move = result
            .pv
            .get(1)
            .copied()
            .filter(|_| result.pv.first() == result.best_move.as_ref());
        result.nodes = self.nodes_searched;
        info!(
            best = %result.best_move.map(|mv| mv.to_string()).unwrap_or_default(),
            score = result.score,
            depth = result.depth,
            nodes = result.nodes,
            "search finished"
        );
        result
    }

    fn search_root(
        &mut self,
        board: &mut Board,
        root_moves: &[Move],
        depth: i32,
        previous_best: Option<Move>,
    ) -> Option<(Move, i32)> {
        let hash = board.hash();
        let hash_move = previous_best.or_else(|| self.transposition_table.best_move(hash));
        let moves = self.order_moves(root_moves.to_vec(), hash_move, 0);

        let mut alpha = -INFINITY;
        let beta = INFINITY;
        let mut best: Option<(Move, i32)> = None;

        for (index, scored) in moves.into_iter().enumerate() {
            let mv = scored.mv;
            board.make_move(mv);
            let score = self.search_child(board, mv, alpha, beta, depth, 0, index);
            board.unmake_move(mv);

            if self.time_control.is_stopped() {
                return best;
            }
            if best.is_none() || score > alpha {
                alpha = score;
                best = Some((mv, score));
            }
        }

        if let Some((mv, score)) = best {
            self.store_tt(hash, depth, score, NodeType::Exact, Some(mv), 0);
        }
        best
    }

    // Searches the child reached by `mv`, which has already been applied.
    // Applies principal variation search and late move reductions.
    #[allow(clippy::too_many_arguments)]
    fn search_child(
        &mut self,
        board: &mut Board,
        mv: Move,
        alpha: i32,
        beta: i32,
        depth: i32,
        ply: i32,
        move_index: usize,
    ) -> i32 {
        if move_index == 0 {
            return -self.negamax(board, -beta, -alpha, depth - 1, ply + 1, true);
        }

        let reduce = self.config.features.late_move_reductions
            && move_index >= self.config.lmr_full_depth_moves
            && depth >= self.config.lmr_min_depth
            && mv.is_quiet()
            && !self.move_generator.in_check(board, board.side_to_move());
        let reduction = if reduce { 1 } else { 0 };

        let mut score = -self.negamax(board, -alpha - 1, -alpha, depth - 1 - reduction, ply + 1, true);
        if score > alpha && reduction > 0 {
            score = -self.negamax(board, -alpha - 1, -alpha, depth - 1, ply + 1, true);
        }
        if score > alpha && score < beta {
            score = -self.negamax(board, -beta, -alpha, depth - 1, ply + 1, true);
        }
        score
    }

    fn negamax(
        &mut self,
        board: &mut Board,
        mut alpha: i32,
        beta: i32,
        depth: i32,
        ply: i32,
        null_allowed: bool,
    ) -> i32 {
        if self.time_control.poll(self.nodes_searched) {
            return DRAW;
        }
        if depth <= 0 {
            return self.quiescence(board, alpha, beta, ply);
        }
        self.nodes_searched += 1;

        if board.is_drawn() {
            return DRAW;
        }
        if ply >= MAX_PLY - 1 {
            return self.evaluator.evaluate(board);
        }

        let hash = board.hash();
        let mut hash_move = None;
        if let Some(entry) = self.transposition_table.probe(hash) {
            if self.config.features.transposition_cutoffs {
                if let Some(score) = entry.cutoff(depth, alpha, beta, ply) {
                    return score;
                }
            }
            hash_move = entry.best_move;
        }

        let in_check = self.move_generator.in_check(board, board.side_to_move());

        let reduction = self.config.null_move_reduction;
        if self.config.features.null_move
            && null_allowed
            && !in_check
            && depth > reduction
            && self.evaluator.evaluate(board) >= beta - self.config.null_move_margin
        {
            board.make_null_move();
            let score = -self.negamax(board, -beta, -beta + 1, depth - reduction - 1, ply + 1, false);
            board.unmake_null_move();
            if self.time_control.is_stopped() {
                return DRAW;
            }
            if score >= beta {
                return beta;
            }
        }

        let pseudo_legal = self.move_generator.generate_moves(board);
        let moves = self.order_moves(pseudo_legal, hash_move, ply);

        let original_alpha = alpha;
        let mut best_move = None;
        let mut legal_moves = 0;

        for scored in moves {
            let mv = scored.mv;
            board.make_move(mv);
            if !self.move_generator.is_legal_after_make(board) {
                board.unmake_move(mv);
                continue;
            }
            let score = self.search_child(board, mv, alpha, beta, depth, ply, legal_moves);
            board.unmake_move(mv);
            legal_moves += 1;

            if self.time_control.is_stopped() {
                return DRAW;
            }
            if score >= beta {
                if !mv.is_capture() {
                    self.store_killer(mv, ply);
                }
                self.store_tt(hash, depth, beta, NodeType::LowerBound, Some(mv), ply);
                return beta;
            }
            if score > alpha {
                alpha = score;
                best_move = Some(mv);
            }
        }

        if legal_moves == 0 {
            return if in_check { -MATE + ply } else { DRAW };
        }

        let node_type = if alpha > original_alpha {
            NodeType::Exact
        } else {
            NodeType::UpperBound
        };
        self.store_tt(hash, depth, alpha, node_type, best_move, ply);
        alpha
    }

    fn quiescence(&mut self, board: &mut Board, mut alpha: i32, beta: i32, ply: i32) -> i32 {
        if self.time_control.poll(self.nodes_searched) {
            return DRAW;
        }
        self.nodes_searched += 1;

        let stand_pat = self.evaluator.evaluate(board);
        if !self.config.features.quiescence || ply >= MAX_PLY - 1 {
            return stand_pat;
        }
        if stand_pat >= beta {
            return beta;
        }
        if stand_pat > alpha {
            alpha = stand_pat;
        }

        let captures = self.move_generator.generate_captures(board);
        for scored in self.order_moves(captures, None, ply) {
            let mv = scored.mv;
            board.make_move(mv);
            if !self.move_generator.is_legal_after_make(board) {
                board.unmake_move(mv);
                continue;
            }
            let score = -self.quiescence(board, -beta, -alpha, ply + 1);
            board.unmake_move(mv);

            if self.time_control.is_stopped() {
                return DRAW;
            }
            if score >= beta {
                return beta;
            }
            if score > alpha {
                alpha = score;
            }
        }
        alpha
    }

    fn score_move(&self, mv: Move, hash_move: Option<Move>, killers: [Option<Move>; 2]) -> i32 {
        if hash_move == Some(mv) {
            return HASH_MOVE_SCORE;
        }
        if let Some(victim) = mv.captured_piece {
            return MVV_LVA_OFFSET + MVV_LVA[victim.index()][mv.piece.index()];
        }
        for (killer, score) in killers.iter().zip(KILLER_SCORES) {
            if *killer == Some(mv) {
                return score;
            }
        }
        match mv.promotion {
            Some(piece) => PROMOTION_SCORES[piece.index()],
            None => 0,
        }
    }

    // Sorted best first; ties keep generation order
    fn order_moves(&self, moves: Vec<Move>, hash_move: Option<Move>, ply: i32) -> Vec<ScoredMove> {
        let killers = self.killers[ply as usize];
        let mut scored: Vec<ScoredMove> = moves
            .into_iter()
            .map(|mv| ScoredMove {
                mv,
                score: self.score_move(mv, hash_move, killers),
            })
            .collect();
        scored.sort_by(|a, b| b.score.cmp(&a.score));
        scored
    }

    fn store_killer(&mut self, mv: Move, ply: i32) {
        let slot = &mut self.killers[ply as usize];
        if slot[0] != Some(mv) {
            slot[1] = slot[0];
            slot[0] = Some(mv);
        }
    }

    fn store_tt(
        &mut self,
        hash: u64,
        depth: i32,
        score: i32,
        node_type: NodeType,
        best_move: Option<Move>,
        ply: i32,
    ) {
        if self.time_control.is_stopped() {
            return;
        }
        self.transposition_table
            .store(hash, depth, score_to_tt(score, ply), node_type, best_move);
    }

    // Follows stored best moves from the root, checking each is still legal
    fn extract_pv(&self, board: &mut Board, first: Move, max_len: usize) -> Vec<Move> {
        let mut pv = vec![first];
        board.make_move(first);
        while pv.len() < max_len && !board.is_drawn() {
            let mv = match self.transposition_table.best_move(board.hash()) {
                Some(mv) => mv,
                None => break,
            };
            if !self.move_generator.legal_moves(board).contains(&mv) {
                break;
            }
            board.make_move(mv);
            pv.push(mv);
        }
        for mv in pv.iter().rev() {
            board.unmake_move(*mv);
        }
        pv
    }
}

impl Search<Evaluator> {
    /// Search with the bundled evaluator.
    pub fn with_defaults(move_generator: MoveGenerator, table_size: usize) -> Self {
        Self::new(
            Evaluator::new(),
            move_generator,
            TranspositionTable::new(table_size),
            SearchConfig::default(),
        )
    }
}

pub fn format_line(moves: &[Move]) -> String {
    moves
        .iter()
        .map(|mv| mv.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::attack_tables::AttackTables;
    use crate::bitboard::parse_square;
    use crate::board::Piece;
    use crate::zobrist::ZobristKeys;

    fn search() -> Search {
        Search::with_defaults(MoveGenerator::new(Arc::new(AttackTables::new())), 1 << 16)
    }

    fn position(fen: &str) -> Board {
        Board::from_fen(fen, Arc::new(ZobristKeys::default())).unwrap()
    }

    fn sq(name: &str) -> u8 {
        parse_square(name).unwrap()
    }

    #[test]
    fn test_move_ordering() {
        let mut search = search();
        let hash_move = Move::new(sq("b1"), sq("c3"), Piece::Knight);
        let killer = Move::new(sq("g1"), sq("f3"), Piece::Knight);
        search.store_killer(killer, 3);

        let pawn_takes_queen = Move::new_capture(sq("e4"), sq("d5"), Piece::Pawn, Piece::Queen);
        let queen_takes_pawn = Move::new_capture(sq("d1"), sq("d7"), Piece::Queen, Piece::Pawn);
        let promotion = Move::new_promotion(sq("a7"), sq("a8"), Piece::Queen);
        let quiet = Move::new(sq("a2"), sq("a3"), Piece::Pawn);

        let ordered = search.order_moves(
            vec![quiet, promotion, queen_takes_pawn, killer, pawn_takes_queen, hash_move],
            Some(hash_move),
            3,
        );
        let moves: Vec<Move> = ordered.iter().map(|s| s.mv).collect();
        assert_eq!(
            moves,
            vec![hash_move, pawn_takes_queen, queen_takes_pawn, killer, promotion, quiet]
        );
    }

    #[test]
    fn test_killers_shift() {
        let mut search = search();
        let first = Move::new(sq("g1"), sq("f3"), Piece::Knight);
        let second = Move::new(sq("b1"), sq("c3"), Piece::Knight);
        search.store_killer(first, 2);
        search.store_killer(first, 2);
        assert_eq!(search.killers[2], [Some(first), None]);
        search.store_killer(second, 2);
        assert_eq!(search.killers[2], [Some(second), Some(first)]);
        assert_eq!(search.killers[1], [None, None]);
    }

    #[test]
    fn test_finds_mate_in_one() {
        let mut search = search();
        let mut board = position("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1");
        let result = search.search_depth(&mut board, 4);
        assert_eq!(result.best_move, Some(Move::new(sq("a1"), sq("a8"), Piece::Rook)));
        assert_eq!(result.score, MATE - 1);
    }

    #[test]
    fn test_takes_free_queen() {
        let mut search = search();
        let mut board = position("4k3/8/8/3q4/4P3/8/8/4K3 w - - 0 1");
        let result = search.search_depth(&mut board, 3);
        assert_eq!(
            result.best_move,
            Some(Move::new_capture(sq("e4"), sq("d5"), Piece::Pawn, Piece::Queen))
        );
        assert!(result.score > 500);
    }

    #[test]
    fn test_search_restores_board() {
        let mut search = search();
        let mut board = position("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1");
        let before = board.clone();
        let result = search.search_depth(&mut board, 3);
        assert!(result.best_move.is_some());
        assert_eq!(board, before);
        assert_eq!(result.iterations.len(), 3);
        assert_eq!(result.pv.first(), result.best_move.as_ref());
    }
}
