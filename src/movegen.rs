use std::fmt;
use std::sync::Arc;

use crate::attack_tables::AttackTables;
use crate::bitboard::{
    anti_diagonal_mask, contains, diagonal_mask, file_mask, file_of, parse_square, rank_of,
    square_bb, square_name, Bitboard, Squares, RANK_1, RANK_2, RANK_7, RANK_8,
};
use crate::board::{
    Board, Color, Piece, BLACK_KINGSIDE, BLACK_QUEENSIDE, WHITE_KINGSIDE, WHITE_QUEENSIDE,
};
use crate::error::MoveParseError;

/// A single transition. Equality compares every field, promotion included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: u8,
    pub to: u8,
    pub piece: Piece,
    pub captured_piece: Option<Piece>,
    pub promotion: Option<Piece>,
    pub is_double_push: bool,
    pub is_en_passant: bool,
    pub is_castling: bool,
}

impl Move {
    pub fn new(from: u8, to: u8, piece: Piece) -> Self {
        Self {
            from,
            to,
            piece,
            captured_piece: None,
            promotion: None,
            is_double_push: false,
            is_en_passant: false,
            is_castling: false,
        }
    }

    pub fn new_capture(from: u8, to: u8, piece: Piece, captured_piece: Piece) -> Self {
        Self {
            captured_piece: Some(captured_piece),
            ..Self::new(from, to, piece)
        }
    }

    pub fn new_double_push(from: u8, to: u8) -> Self {
        Self {
            is_double_push: true,
            ..Self::new(from, to, Piece::Pawn)
        }
    }

    pub fn new_en_passant(from: u8, to: u8) -> Self {
        Self {
            captured_piece: Some(Piece::Pawn),
            is_en_passant: true,
            ..Self::new(from, to, Piece::Pawn)
        }
    }

    pub fn new_castling(from: u8, to: u8) -> Self {
        Self {
            is_castling: true,
            ..Self::new(from, to, Piece::King)
        }
    }

    pub fn new_promotion(from: u8, to: u8, promotion: Piece) -> Self {
        Self {
            promotion: Some(promotion),
            ..Self::new(from, to, Piece::Pawn)
        }
    }

    pub fn new_promotion_capture(from: u8, to: u8, captured_piece: Piece, promotion: Piece) -> Self {
        Self {
            captured_piece: Some(captured_piece),
            promotion: Some(promotion),
            ..Self::new(from, to, Piece::Pawn)
        }
    }

    #[inline]
    pub fn is_capture(&self) -> bool {
        self.captured_piece.is_some()
    }

    /// Neither a capture nor a promotion.
    #[inline]
    pub fn is_quiet(&self) -> bool {
        self.captured_piece.is_none() && self.promotion.is_none()
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", square_name(self.from), square_name(self.to))?;
        if let Some(promotion) = self.promotion {
            write!(f, "{}", promotion.to_char(Color::Black))?;
        }
        Ok(())
    }
}

// (right, king from, king to, rook square)
const WHITE_CASTLES: [(usize, u8, u8, u8); 2] = [(WHITE_KINGSIDE, 4, 6, 7), (WHITE_QUEENSIDE, 4, 2, 0)];
const BLACK_CASTLES: [(usize, u8, u8, u8); 2] =
    [(BLACK_KINGSIDE, 60, 62, 63), (BLACK_QUEENSIDE, 60, 58, 56)];

pub struct MoveGenerator {
    tables: Arc<AttackTables>,
    // Attacked squares on a rank, indexed by inner occupancy (6 bits) * 8 + file
    rank_attacks: [u8; 512],
}

impl MoveGenerator {
    pub fn new(tables: Arc<AttackTables>) -> Self {
        Self {
            tables,
            rank_attacks: build_rank_attacks(),
        }
    }

    fn rank_attacks(&self, square: u8, occupied: Bitboard) -> Bitboard {
        let shift = rank_of(square) * 8;
        let inner = ((occupied >> shift) >> 1) & 63;
        let attacks = self.rank_attacks[inner as usize * 8 + file_of(square) as usize];
        (attacks as Bitboard) << shift
    }

    pub fn bishop_attacks(&self, square: u8, occupied: Bitboard) -> Bitboard {
        line_attacks(square, occupied, diagonal_mask(square))
            | line_attacks(square, occupied, anti_diagonal_mask(square))
    }

    pub fn rook_attacks(&self, square: u8, occupied: Bitboard) -> Bitboard {
        line_attacks(square, occupied, file_mask(square)) | self.rank_attacks(square, occupied)
    }

    pub fn queen_attacks(&self, square: u8, occupied: Bitboard) -> Bitboard {
        self.bishop_attacks(square, occupied) | self.rook_attacks(square, occupied)
    }

    fn piece_attacks(&self, piece: Piece, color: Color, square: u8, occupied: Bitboard) -> Bitboard {
        match piece {
            Piece::Pawn => self.tables.pawn_attacks(color, square),
            Piece::Knight => self.tables.knight_attacks(square),
            Piece::Bishop => self.bishop_attacks(square, occupied),
            Piece::Rook => self.rook_attacks(square, occupied),
            Piece::Queen => self.queen_attacks(square, occupied),
            Piece::King => self.tables.king_attacks(square),
        }
    }

    /// Pieces of color `by` that attack `square`.
    pub fn attackers_to(&self, board: &Board, square: u8, by: Color) -> Bitboard {
        let occupied = board.occupied();
        let queens = board.pieces(by, Piece::Queen);

        (self.tables.pawn_attacks(by.opposite(), square) & board.pieces(by, Piece::Pawn))
            | (self.tables.knight_attacks(square) & board.pieces(by, Piece::Knight))
            | (self.tables.king_attacks(square) & board.pieces(by, Piece::King))
            | (self.bishop_attacks(square, occupied) & (board.pieces(by, Piece::Bishop) | queens))
            | (self.rook_attacks(square, occupied) & (board.pieces(by, Piece::Rook) | queens))
    }

    pub fn is_square_attacked(&self, board: &Board, square: u8, by: Color) -> bool {
        self.attackers_to(board, square, by) != 0
    }

    pub fn in_check(&self, board: &Board, color: Color) -> bool {
        match board.king_square(color) {
            Some(king) => self.is_square_attacked(board, king, color.opposite()),
            None => false,
        }
    }

    /// Whether the move just applied to `board` left the mover's king safe.
    pub fn is_legal_after_make(&self, board: &Board) -> bool {
        let mover = board.side_to_move().opposite();
        match board.king_square(mover) {
            Some(king) => !self.is_square_attacked(board, king, board.side_to_move()),
            None => false,
        }
    }

    /// All pseudo-legal moves for the side to move.
    pub fn generate_moves(&self, board: &Board) -> Vec<Move> {
        let mut moves = Vec::with_capacity(64);
        self.generate_pawn_moves(board, &mut moves, false);
        for piece in [Piece::Knight, Piece::Bishop, Piece::Rook, Piece::Queen, Piece::King] {
            self.generate_piece_moves(board, piece, &mut moves, false);
        }
        self.generate_castling(board, &mut moves);
        moves
    }

    /// Pseudo-legal captures only, en passant and capturing promotions included.
    pub fn generate_captures(&self, board: &Board) -> Vec<Move> {
        let mut moves = Vec::with_capacity(16);
        self.generate_pawn_moves(board, &mut moves, true);
        for piece in [Piece::Knight, Piece::Bishop, Piece::Rook, Piece::Queen, Piece::King] {
            self.generate_piece_moves(board, piece, &mut moves, true);
        }
        moves
    }

    /// Strictly legal moves, filtered by applying and taking back each one.
    pub fn legal_moves(&self, board: &mut Board) -> Vec<Move> {
        let mut legal = self.generate_moves(board);
        legal.retain(|&mv| {
            board.make_move(mv);
            let ok = self.is_legal_after_make(board);
            board.unmake_move(mv);
            ok
        });
        legal
    }

    /// Looks up a legal move from long algebraic text such as "e2e4" or "a7a8q".
    pub fn find_move(&self, board: &mut Board, text: &str) -> Result<Move, MoveParseError> {
        let syntax_error = || MoveParseError::Syntax(text.to_string());

        if !text.is_ascii() || !(4..=5).contains(&text.len()) {
            return Err(syntax_error());
        }
        let from = parse_square(&text[0..2]).ok_or_else(syntax_error)?;
        let to = parse_square(&text[2..4]).ok_or_else(syntax_error)?;
        let promotion = match text[4..].chars().next() {
            None => None,
            Some(c) => match Piece::from_char(c.to_ascii_lowercase()) {
                Some((piece, _)) if Piece::PROMOTIONS.contains(&piece) => Some(piece),
                _ => return Err(syntax_error()),
            },
        };

        self.legal_moves(board)
            .into_iter()
            .find(|mv| mv.from == from && mv.to == to && mv.promotion == promotion)
            .ok_or_else(|| MoveParseError::NoSuchMove(text.to_string()))
    }

    fn generate_pawn_moves(&self, board: &Board, moves: &mut Vec<Move>, captures_only: bool) {
        let us = board.side_to_move();
        let empty = board.empty_squares();
        let enemies = board.them();
        let (home_rank, last_rank) = match us {
            Color::White => (RANK_2, RANK_8),
            Color::Black => (RANK_7, RANK_1),
        };

        for from in Squares(board.own(Piece::Pawn)) {
            let attacks = self.tables.pawn_attacks(us, from);

            for to in Squares(attacks & enemies) {
                let captured = match board.piece_at(to) {
                    Some((piece, _)) => piece,
                    None => continue,
                };
                if contains(last_rank, to) {
                    for promotion in Piece::PROMOTIONS {
                        moves.push(Move::new_promotion_capture(from, to, captured, promotion));
                    }
                } else {
                    moves.push(Move::new_capture(from, to, Piece::Pawn, captured));
                }
            }

            if let Some(ep) = board.en_passant() {
                if contains(attacks, ep) {
                    moves.push(Move::new_en_passant(from, ep));
                }
            }

            if captures_only {
                continue;
            }

            let single = match us {
                Color::White => from + 8,
                Color::Black => from.wrapping_sub(8),
            };
            if single >= 64 || !contains(empty, single) {
                continue;
            }
            if contains(last_rank, single) {
                for promotion in Piece::PROMOTIONS {
                    moves.push(Move::new_promotion(from, single, promotion));
                }
                continue;
            }
            moves.push(Move::new(from, single, Piece::Pawn));

            if contains(home_rank, from) {
                let double = match us {
                    Color::White => single + 8,
                    Color::Black => single - 8,
                };
                if contains(empty, double) {
                    moves.push(Move::new_double_push(from, double));
                }
            }
        }
    }

    fn generate_piece_moves(
        &self,
        board: &Board,
        piece: Piece,
        moves: &mut Vec<Move>,
        captures_only: bool,
    ) {
        let us = board.side_to_move();
        let occupied = board.occupied();
        let enemies = board.them();

        for from in Squares(board.own(piece)) {
            let attacks = self.piece_attacks(piece, us, from, occupied);

            for to in Squares(attacks & enemies) {
                if let Some((captured, _)) = board.piece_at(to) {
                    moves.push(Move::new_capture(from, to, piece, captured));
                }
            }
            if !captures_only {
                for to in Squares(attacks & !occupied) {
                    moves.push(Move::new(from, to, piece));
                }
            }
        }
    }

    fn generate_castling(&self, board: &Board, moves: &mut Vec<Move>) {
        let us = board.side_to_move();
        let them = us.opposite();
        let candidates = match us {
            Color::White => WHITE_CASTLES,
            Color::Black => BLACK_CASTLES,
        };

        for (right, king_from, king_to, rook_square) in candidates {
            if !board.castling(right)
                || !contains(board.pieces(us, Piece::King), king_from)
                || !contains(board.pieces(us, Piece::Rook), rook_square)
            {
                continue;
            }
            if self.tables.between(king_from, rook_square) & board.occupied() != 0 {
                continue;
            }
            // The king may not start in, pass through, or land on an attacked square
            let king_path = self.tables.between(king_from, king_to)
                | square_bb(king_from)
                | square_bb(king_to);
            if Squares(king_path).any(|square| self.is_square_attacked(board, square, them)) {
                continue;
            }
            moves.push(Move::new_castling(king_from, king_to));
        }
    }
}

// Hyperbola quintessence along a line holding one square per rank (file or
// diagonal). Byte swapping mirrors the board vertically so the same
// subtraction finds the first blocker in the opposite direction.
fn line_attacks(square: u8, occupied: Bitboard, line: Bitboard) -> Bitboard {
    let slider = square_bb(square);
    let mask = line & !slider;
    let o = occupied & mask;
    let forward = o.wrapping_sub(slider);
    let reverse = o
        .swap_bytes()
        .wrapping_sub(slider.swap_bytes())
        .swap_bytes();
    (forward ^ reverse) & mask
}

fn build_rank_attacks() -> [u8; 512] {
    let mut table = [0u8; 512];
    for inner in 0..64usize {
        let occupancy = (inner << 1) as u8;
        for file in 0..8usize {
            let mut attacks = 0u8;
            for east in (file + 1)..8 {
                attacks |= 1 << east;
                if occupancy & (1 << east) != 0 {
                    break;
                }
            }
            for west in (0..file).rev() {
                attacks |= 1 << west;
                if occupancy & (1 << west) != 0 {
                    break;
                }
            }
            table[inner * 8 + file] = attacks;
        }
    }
    table
}
