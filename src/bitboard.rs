/// A set of squares, bit `i` standing for square `i` (a1 = 0, h8 = 63).
pub type Bitboard = u64;

pub const EMPTY: Bitboard = 0;

pub const FILE_A: Bitboard = 0x0101_0101_0101_0101;
pub const RANK_1: Bitboard = 0x0000_0000_0000_00FF;
pub const RANK_2: Bitboard = RANK_1 << 8;
pub const RANK_7: Bitboard = RANK_1 << 48;
pub const RANK_8: Bitboard = RANK_1 << 56;

const MAIN_DIAGONAL: Bitboard = 0x8040_2010_0804_0201;
const ANTI_DIAGONAL: Bitboard = 0x0102_0408_1020_4080;

#[inline]
pub fn square_bb(square: u8) -> Bitboard {
    1u64 << square
}

#[inline]
pub fn contains(bb: Bitboard, square: u8) -> bool {
    bb & square_bb(square) != 0
}

#[inline]
pub fn rank_of(square: u8) -> u8 {
    square >> 3
}

#[inline]
pub fn file_of(square: u8) -> u8 {
    square & 7
}

#[inline]
pub fn make_square(file: u8, rank: u8) -> u8 {
    rank * 8 + file
}

/// Index of the lowest set bit. The board must not be empty.
#[inline]
pub fn lsb(bb: Bitboard) -> u8 {
    debug_assert!(bb != 0);
    bb.trailing_zeros() as u8
}

#[inline]
pub fn pop_lsb(bb: &mut Bitboard) -> u8 {
    let square = lsb(*bb);
    *bb &= *bb - 1;
    square
}

pub fn file_mask(square: u8) -> Bitboard {
    FILE_A << file_of(square)
}

/// The a1-h8 direction diagonal through `square`.
pub fn diagonal_mask(square: u8) -> Bitboard {
    let diag = file_of(square) as i32 - rank_of(square) as i32;
    if diag >= 0 {
        MAIN_DIAGONAL >> (diag * 8)
    } else {
        MAIN_DIAGONAL << (-diag * 8)
    }
}

/// The h1-a8 direction diagonal through `square`.
pub fn anti_diagonal_mask(square: u8) -> Bitboard {
    let diag = 7 - file_of(square) as i32 - rank_of(square) as i32;
    if diag >= 0 {
        ANTI_DIAGONAL >> (diag * 8)
    } else {
        ANTI_DIAGONAL << (-diag * 8)
    }
}

/// Iterates the squares of a bitboard from a1 upwards.
pub struct Squares(pub Bitboard);

impl Iterator for Squares {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        if self.0 == 0 {
            None
        } else {
            Some(pop_lsb(&mut self.0))
        }
    }
}

pub fn square_name(square: u8) -> String {
    let file = (b'a' + file_of(square)) as char;
    let rank = (b'1' + rank_of(square)) as char;
    format!("{}{}", file, rank)
}

pub fn parse_square(text: &str) -> Option<u8> {
    let bytes = text.as_bytes();
    if bytes.len() != 2 {
        return None;
    }
    let file = bytes[0].wrapping_sub(b'a');
    let rank = bytes[1].wrapping_sub(b'1');
    if file < 8 && rank < 8 {
        Some(make_square(file, rank))
    } else {
        None
    }
}
