use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::board::{Color, Piece};

pub const DEFAULT_SEED: u64 = 0x5EED_C0FF_EE15_F15E;

/// Random keys for position hashing. Two boards only produce comparable
/// hashes when they share the same keys.
#[derive(Debug, Clone)]
pub struct ZobristKeys {
    pieces: [[[u64; 64]; 6]; 2],
    castling: [u64; 4],
    en_passant: [u64; 8],
    side: u64,
}

impl ZobristKeys {
    pub fn new(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);

        let mut pieces = [[[0u64; 64]; 6]; 2];
        for color in pieces.iter_mut() {
            for piece in color.iter_mut() {
                for key in piece.iter_mut() {
                    *key = rng.gen();
                }
            }
        }

        let mut castling = [0u64; 4];
        for key in castling.iter_mut() {
            *key = rng.gen();
        }

        let mut en_passant = [0u64; 8];
        for key in en_passant.iter_mut() {
            *key = rng.gen();
        }

        Self {
            pieces,
            castling,
            en_passant,
            side: rng.gen(),
        }
    }

    #[inline]
    pub fn piece(&self, piece: Piece, color: Color, square: u8) -> u64 {
        self.pieces[color.index()][piece.index()][square as usize]
    }

    #[inline]
    pub fn castling(&self, right: usize) -> u64 {
        self.castling[right]
    }

    #[inline]
    pub fn en_passant(&self, file: u8) -> u64 {
        self.en_passant[file as usize]
    }

    #[inline]
    pub fn side(&self) -> u64 {
        self.side
    }
}

impl Default for ZobristKeys {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_keys() {
        let a = ZobristKeys::new(42);
        let b = ZobristKeys::new(42);
        assert_eq!(a.side(), b.side());
        assert_eq!(a.piece(Piece::Queen, Color::Black, 59), b.piece(Piece::Queen, Color::Black, 59));
        assert_eq!(a.en_passant(3), b.en_passant(3));
    }

    #[test]
    fn test_keys_are_distinct() {
        let keys = ZobristKeys::default();
        let mut all = Vec::new();
        for piece in Piece::ALL {
            for color in [Color::White, Color::Black] {
                for square in 0..64 {
                    all.push(keys.piece(piece, color, square));
                }
            }
        }
        all.extend((0..4).map(|i| keys.castling(i)));
        all.extend((0..8).map(|f| keys.en_passant(f)));
        all.push(keys.side());
        let count = all.len();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), count);
    }
}
