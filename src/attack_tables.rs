use crate::bitboard::{file_of, rank_of, square_bb, Bitboard};
use crate::board::Color;

const KNIGHT_JUMPS: [i8; 8] = [17, 15, 10, 6, -6, -10, -15, -17];
const KING_JUMPS: [i8; 8] = [9, 8, 7, 1, -1, -7, -8, -9];
const WHITE_PAWN_JUMPS: [i8; 2] = [7, 9];
const BLACK_PAWN_JUMPS: [i8; 2] = [-7, -9];

// (rank step, file step) for the eight line directions
const LINE_STEPS: [(i8, i8); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

/// Precomputed attack sets for the non-sliding pieces and the
/// "strictly between" relation. Built once and shared read-only.
pub struct AttackTables {
    pawn: [[Bitboard; 64]; 2],
    knight: [Bitboard; 64],
    king: [Bitboard; 64],
    between: Vec<[Bitboard; 64]>,
}

impl AttackTables {
    pub fn new() -> Self {
        let mut pawn = [[0u64; 64]; 2];
        let mut knight = [0u64; 64];
        let mut king = [0u64; 64];

        for square in 0..64u8 {
            pawn[Color::White.index()][square as usize] = jump_targets(square, &WHITE_PAWN_JUMPS);
            pawn[Color::Black.index()][square as usize] = jump_targets(square, &BLACK_PAWN_JUMPS);
            knight[square as usize] = jump_targets(square, &KNIGHT_JUMPS);
            king[square as usize] = jump_targets(square, &KING_JUMPS);
        }

        Self {
            pawn,
            knight,
            king,
            between: build_between(),
        }
    }

    /// Squares a pawn of `color` standing on `square` attacks.
    #[inline]
    pub fn pawn_attacks(&self, color: Color, square: u8) -> Bitboard {
        self.pawn[color.index()][square as usize]
    }

    #[inline]
    pub fn knight_attacks(&self, square: u8) -> Bitboard {
        self.knight[square as usize]
    }

    #[inline]
    pub fn king_attacks(&self, square: u8) -> Bitboard {
        self.king[square as usize]
    }

    /// Squares strictly between `a` and `b` when they share a rank, file or
    /// diagonal; empty otherwise.
    #[inline]
    pub fn between(&self, a: u8, b: u8) -> Bitboard {
        self.between[a as usize][b as usize]
    }
}

impl Default for AttackTables {
    fn default() -> Self {
        Self::new()
    }
}

fn jump_targets(square: u8, jumps: &[i8]) -> Bitboard {
    let mut targets = 0u64;
    for &jump in jumps {
        let target = square as i16 + jump as i16;
        if !(0..64).contains(&target) {
            continue;
        }
        let target = target as u8;
        // A flat offset that wraps around the board edge moves more than
        // two ranks or files
        let rank_delta = (rank_of(target) as i8 - rank_of(square) as i8).abs();
        let file_delta = (file_of(target) as i8 - file_of(square) as i8).abs();
        if rank_delta > 2 || file_delta > 2 {
            continue;
        }
        targets |= square_bb(target);
    }
    targets
}

fn build_between() -> Vec<[Bitboard; 64]> {
    let mut table = vec![[0u64; 64]; 64];
    for from in 0..64u8 {
        for &(rank_step, file_step) in &LINE_STEPS {
            let mut rank = rank_of(from) as i8 + rank_step;
            let mut file = file_of(from) as i8 + file_step;
            let mut path = 0u64;
            while (0..8).contains(&rank) && (0..8).contains(&file) {
                let to = (rank * 8 + file) as u8;
                table[from as usize][to as usize] = path;
                path |= square_bb(to);
                rank += rank_step;
                file += file_step;
            }
        }
    }
    table
}
