use crate::bitboard::{file_of, rank_of, Squares};
use crate::board::{Board, Color, Piece};

/// Static evaluation consumed by the search, in centipawns from the point
/// of view of the side to move.
pub trait Evaluate {
    fn evaluate(&self, board: &Board) -> i32;
}

/// Material plus piece-square tables. Tables are written from white's
/// side with rank 8 on the first row.
pub struct Evaluator {
    pub piece_values: [i32; 6],
    pub position_bonus: [[[i32; 8]; 8]; 6],
    pub king_endgame_position_bonus: [[i32; 8]; 8],
}

impl Evaluator {
    pub fn new() -> Self {
        Self {
            piece_values: [100, 320, 330, 500, 900, 0],
            position_bonus: [
                // Pawn
                [
                    [0, 0, 0, 0, 0, 0, 0, 0],
                    [50, 50, 50, 50, 50, 50, 50, 50],
                    [10, 10, 20, 30, 30, 20, 10, 10],
                    [5, 5, 10, 25, 25, 10, 5, 5],
                    [0, 0, 0, 20, 20, 0, 0, 0],
                    [5, -5, -10, 0, 0, -10, -5, 5],
                    [5, 10, 10, -20, -20, 10, 10, 5],
                    [0, 0, 0, 0, 0, 0, 0, 0],
                ],
                // Knight
                [
                    [-50, -40, -30, -30, -30, -30, -40, -50],
                    [-40, -20, 0, 0, 0, 0, -20, -40],
                    [-30, 0, 10, 15, 15, 10, 0, -30],
                    [-30, 5, 15, 20, 20, 15, 5, -30],
                    [-30, 0, 15, 20, 20, 15, 0, -30],
                    [-30, 5, 10, 15, 15, 10, 5, -30],
                    [-40, -20, 0, 5, 5, 0, -20, -40],
                    [-50, -40, -30, -30, -30, -30, -40, -50],
                ],
                // Bishop
                [
                    [-20, -10, -10, -10, -10, -10, -10, -20],
                    [-10, 0, 0, 0, 0, 0, 0, -10],
                    [-10, 0, 5, 10, 10, 5, 0, -10],
                    [-10, 5, 5, 10, 10, 5, 5, -10],
                    [-10, 0, 10, 10, 10, 10, 0, -10],
                    [-10, 10, 10, 10, 10, 10, 10, -10],
                    [-10, 5, 0, 0, 0, 0, 5, -10],
                    [-20, -10, -10, -10, -10, -10, -10, -20],
                ],
                // Rook
                [
                    [0, 0, 0, 0, 0, 0, 0, 0],
                    [5, 10, 10, 10, 10, 10, 10, 5],
                    [-5, 0, 0, 0, 0, 0, 0, -5],
                    [-5, 0, 0, 0, 0, 0, 0, -5],
                    [-5, 0, 0, 0, 0, 0, 0, -5],
                    [-5, 0, 0, 0, 0, 0, 0, -5],
                    [-5, 0, 0, 0, 0, 0, 0, -5],
                    [0, 0, 0, 5, 5, 0, 0, 0],
                ],
                // Queen
                [
                    [-20, -10, -10, -5, -5, -10, -10, -20],
                    [-10, 0, 0, 0, 0, 0, 0, -10],
                    [-10, 0, 5, 5, 5, 5, 0, -10],
                    [-5, 0, 5, 5, 5, 5, 0, -5],
                    [0, 0, 5, 5, 5, 5, 0, -5],
                    [-10, 5, 5, 5, 5, 5, 0, -10],
                    [-10, 0, 5, 0, 0, 0, 0, -10],
                    [-20, -10, -10, -5, -5, -10, -10, -20],
                ],
                // King, middle game
                [
                    [-30, -40, -40, -50, -50, -40, -40, -30],
                    [-30, -40, -40, -50, -50, -40, -40, -30],
                    [-30, -40, -40, -50, -50, -40, -40, -30],
                    [-30, -40, -40, -50, -50, -40, -40, -30],
                    [-20, -30, -30, -40, -40, -30, -30, -20],
                    [-10, -20, -20, -20, -20, -20, -20, -10],
                    [20, 20, 0, 0, 0, 0, 20, 20],
                    [20, 30, 10, 0, 0, 10, 30, 20],
                ],
            ],
            king_endgame_position_bonus: [
                [-50, -40, -30, -20, -20, -30, -40, -50],
                [-30, -20, -10, 0, 0, -10, -20, -30],
                [-30, -10, 20, 30, 30, 20, -10, -30],
                [-30, -10, 30, 40, 40, 30, -10, -30],
                [-30, -10, 30, 40, 40, 30, -10, -30],
                [-30, -10, 20, 30, 30, 20, -10, -30],
                [-30, -30, 0, 0, 0, 0, -30, -30],
                [-50, -30, -30, -30, -30, -30, -30, -50],
            ],
        }
    }

    pub fn piece_value(&self, piece: Piece) -> i32 {
        self.piece_values[piece.index()]
    }

    fn square_value(&self, piece: Piece, color: Color, square: u8, is_endgame: bool) -> i32 {
        // Row 0 of every table is the far rank from white's point of view
        let row = match color {
            Color::White => 7 - rank_of(square) as usize,
            Color::Black => rank_of(square) as usize,
        };
        let file = file_of(square) as usize;
        let bonus = if piece == Piece::King && is_endgame {
            self.king_endgame_position_bonus[row][file]
        } else {
            self.position_bonus[piece.index()][row][file]
        };
        self.piece_value(piece) + bonus
    }

    fn is_endgame(&self, board: &Board) -> bool {
        (board.piece_bb(Piece::Queen) | board.piece_bb(Piece::Rook)).count_ones() <= 2
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluate for Evaluator {
    fn evaluate(&self, board: &Board) -> i32 {
        let is_endgame = self.is_endgame(board);
        let mut score = 0;
        for color in [Color::White, Color::Black] {
            let sign = if color == board.side_to_move() { 1 } else { -1 };
            for piece in Piece::ALL {
                for square in Squares(board.pieces(color, piece)) {
                    score += sign * self.square_value(piece, color, square, is_endgame);
                }
            }
        }
        score
    }
}
