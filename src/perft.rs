use crate::board::Board;
use crate::movegen::{Move, MoveGenerator};

/// Leaf counts below each legal root move.
#[derive(Debug, Clone, Default)]
pub struct Divide {
    pub moves: Vec<(Move, u64)>,
    pub total: u64,
}

impl MoveGenerator {
    /// Counts the leaf positions reachable in exactly `depth` legal moves.
    pub fn perft(&self, board: &mut Board, depth: u32) -> u64 {
        if depth == 0 {
            return 1;
        }

        let mut nodes = 0;
        for mv in self.generate_moves(board) {
            board.make_move(mv);
            if self.is_legal_after_make(board) {
                nodes += if depth == 1 { 1 } else { self.perft(board, depth - 1) };
            }
            board.unmake_move(mv);
        }
        nodes
    }

    pub fn divide(&self, board: &mut Board, depth: u32) -> Divide {
        let mut divide = Divide::default();
        if depth == 0 {
            divide.total = 1;
            return divide;
        }

        for mv in self.legal_moves(board) {
            board.make_move(mv);
            let nodes = self.perft(board, depth - 1);
            board.unmake_move(mv);
            divide.total += nodes;
            divide.moves.push((mv, nodes));
        }
        divide
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::attack_tables::AttackTables;
    use crate::board::{Board, START_FEN};
    use crate::movegen::MoveGenerator;
    use crate::zobrist::ZobristKeys;

    #[test]
    fn test_perft_startpos_shallow() {
        let generator = MoveGenerator::new(Arc::new(AttackTables::new()));
        let mut board = Board::from_fen(START_FEN, Arc::new(ZobristKeys::default())).unwrap();
        let before = board.clone();
        assert_eq!(generator.perft(&mut board, 0), 1);
        assert_eq!(generator.perft(&mut board, 1), 20);
        assert_eq!(generator.perft(&mut board, 2), 400);
        assert_eq!(board, before);
    }

    #[test]
    fn test_divide_sums_to_total() {
        let generator = MoveGenerator::new(Arc::new(AttackTables::new()));
        let mut board = Board::from_fen(START_FEN, Arc::new(ZobristKeys::default())).unwrap();
        let divide = generator.divide(&mut board, 3);
        assert_eq!(divide.moves.len(), 20);
        assert_eq!(divide.total, 8902);
        assert_eq!(divide.moves.iter().map(|(_, n)| n).sum::<u64>(), divide.total);
        let e2e4 = divide.moves.iter().find(|(mv, _)| mv.to_string() == "e2e4").unwrap();
        assert_eq!(e2e4.1, 600);
    }
}
