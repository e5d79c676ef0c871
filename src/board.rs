use std::fmt;
use std::sync::Arc;

use crate::bitboard::{
    file_of, make_square, parse_square, rank_of, square_bb, square_name, Bitboard, Squares,
};
use crate::error::FenError;
use crate::movegen::Move;
use crate::zobrist::ZobristKeys;

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Half-move clock value at which a position counts as drawn.
pub const FIFTY_MOVE_HALFMOVES: u32 = 50;

/// Earlier occurrences of the current position (same side to move, no
/// irreversible move since) needed to call it a draw.
pub const REPETITIONS_FOR_DRAW: usize = 1;

// Castling right indices
pub const WHITE_KINGSIDE: usize = 0;
pub const WHITE_QUEENSIDE: usize = 1;
pub const BLACK_KINGSIDE: usize = 2;
pub const BLACK_QUEENSIDE: usize = 3;

const HISTORY_CAPACITY: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Piece {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl Piece {
    pub const ALL: [Piece; 6] = [
        Piece::Pawn,
        Piece::Knight,
        Piece::Bishop,
        Piece::Rook,
        Piece::Queen,
        Piece::King,
    ];

    pub const PROMOTIONS: [Piece; 4] = [Piece::Queen, Piece::Rook, Piece::Bishop, Piece::Knight];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn to_char(self, color: Color) -> char {
        let c = match self {
            Piece::Pawn => 'p',
            Piece::Knight => 'n',
            Piece::Bishop => 'b',
            Piece::Rook => 'r',
            Piece::Queen => 'q',
            Piece::King => 'k',
        };
        match color {
            Color::White => c.to_ascii_uppercase(),
            Color::Black => c,
        }
    }

    pub fn from_char(c: char) -> Option<(Piece, Color)> {
        let piece = match c.to_ascii_lowercase() {
            'p' => Piece::Pawn,
            'n' => Piece::Knight,
            'b' => Piece::Bishop,
            'r' => Piece::Rook,
            'q' => Piece::Queen,
            'k' => Piece::King,
            _ => return None,
        };
        let color = if c.is_ascii_uppercase() { Color::White } else { Color::Black };
        Some((piece, color))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn opposite(&self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Minimal state needed to take back one move.
#[derive(Debug, Clone, Copy)]
struct Undo {
    hash: u64,
    en_passant: Option<u8>,
    castling: [bool; 4],
    halfmove_clock: u32,
}

#[derive(Debug, Clone)]
pub struct Board {
    pieces: [Bitboard; 6],
    colors: [Bitboard; 2],
    side_to_move: Color,
    en_passant: Option<u8>,
    castling: [bool; 4],
    halfmove_clock: u32,
    ply: u32,
    hash: u64,
    history: Vec<Undo>,
    keys: Arc<ZobristKeys>,
}

impl Board {
    pub fn startpos(keys: Arc<ZobristKeys>) -> Self {
        let mut board = Self::empty(keys);
        let back_rank = [
            Piece::Rook,
            Piece::Knight,
            Piece::Bishop,
            Piece::Queen,
            Piece::King,
            Piece::Bishop,
            Piece::Knight,
            Piece::Rook,
        ];
        for (file, &piece) in back_rank.iter().enumerate() {
            let file = file as u8;
            board.put_piece(piece, Color::White, make_square(file, 0));
            board.put_piece(Piece::Pawn, Color::White, make_square(file, 1));
            board.put_piece(Piece::Pawn, Color::Black, make_square(file, 6));
            board.put_piece(piece, Color::Black, make_square(file, 7));
        }
        board.castling = [true; 4];
        board.hash = board.compute_hash();
        board
    }

    pub fn from_fen(fen: &str, keys: Arc<ZobristKeys>) -> Result<Self, FenError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() < 4 {
            return Err(FenError::MissingFields(fields.len()));
        }

        let mut board = Self::empty(keys);

        let ranks: Vec<&str> = fields[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::RankCount(ranks.len()));
        }
        for (i, rank_text) in ranks.iter().enumerate() {
            let rank = 7 - i as u8;
            let mut file = 0u8;
            for c in rank_text.chars() {
                if let Some(skip) = c.to_digit(10) {
                    if !(1..=8).contains(&skip) {
                        return Err(FenError::InvalidPiece(c));
                    }
                    file += skip as u8;
                } else {
                    let (piece, color) = Piece::from_char(c).ok_or(FenError::InvalidPiece(c))?;
                    if file >= 8 {
                        return Err(FenError::RankLength { rank: rank + 1 });
                    }
                    board.put_piece(piece, color, make_square(file, rank));
                    file += 1;
                }
                if file > 8 {
                    return Err(FenError::RankLength { rank: rank + 1 });
                }
            }
            if file != 8 {
                return Err(FenError::RankLength { rank: rank + 1 });
            }
        }

        for color in [Color::White, Color::Black] {
            if board.pieces(color, Piece::King).count_ones() != 1 {
                return Err(FenError::KingCount);
            }
        }

        board.side_to_move = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(FenError::InvalidSide(other.to_string())),
        };

        if fields[2] != "-" {
            for c in fields[2].chars() {
                let right = match c {
                    'K' => WHITE_KINGSIDE,
                    'Q' => WHITE_QUEENSIDE,
                    'k' => BLACK_KINGSIDE,
                    'q' => BLACK_QUEENSIDE,
                    _ => return Err(FenError::InvalidCastling(c)),
                };
                board.castling[right] = true;
            }
        }

        if fields[3] != "-" {
            let invalid = || FenError::InvalidEnPassant(fields[3].to_string());
            let square = parse_square(fields[3]).ok_or_else(invalid)?;
            let us = board.side_to_move;
            // Target is the empty square the enemy pawn just skipped over
            let target_rank = match us {
                Color::White => 5,
                Color::Black => 2,
            };
            if rank_of(square) != target_rank
                || board.piece_at(square).is_some()
                || board.piece_at(en_passant_victim(square, us)) != Some((Piece::Pawn, us.opposite()))
            {
                return Err(invalid());
            }
            board.en_passant = Some(square);
        }

        if let Some(text) = fields.get(4) {
            board.halfmove_clock = text
                .parse()
                .map_err(|_| FenError::InvalidCounter(text.to_string()))?;
        }
        let fullmove: u32 = match fields.get(5) {
            Some(text) => text
                .parse()
                .map_err(|_| FenError::InvalidCounter(text.to_string()))?,
            None => 1,
        };
        board.ply = fullmove.saturating_sub(1) * 2 + board.side_to_move.index() as u32;

        board.hash = board.compute_hash();
        Ok(board)
    }

    fn empty(keys: Arc<ZobristKeys>) -> Self {
        Self {
            pieces: [0; 6],
            colors: [0; 2],
            side_to_move: Color::White,
            en_passant: None,
            castling: [false; 4],
            halfmove_clock: 0,
            ply: 0,
            hash: 0,
            history: Vec::with_capacity(HISTORY_CAPACITY),
            keys,
        }
    }

    pub fn to_fen(&self) -> String {
        let mut fen = String::new();
        for rank in (0..8).rev() {
            let mut empty = 0;
            for file in 0..8 {
                match self.piece_at(make_square(file, rank)) {
                    Some((piece, color)) => {
                        if empty > 0 {
                            fen.push_str(&empty.to_string());
                            empty = 0;
                        }
                        fen.push(piece.to_char(color));
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                fen.push_str(&empty.to_string());
            }
            if rank > 0 {
                fen.push('/');
            }
        }

        fen.push_str(match self.side_to_move {
            Color::White => " w ",
            Color::Black => " b ",
        });

        let mut castling = String::new();
        for (right, c) in ['K', 'Q', 'k', 'q'].iter().enumerate() {
            if self.castling[right] {
                castling.push(*c);
            }
        }
        if castling.is_empty() {
            castling.push('-');
        }
        fen.push_str(&castling);

        match self.en_passant {
            Some(square) => fen.push_str(&format!(" {}", square_name(square))),
            None => fen.push_str(" -"),
        }
        fen.push_str(&format!(" {} {}", self.halfmove_clock, self.ply / 2 + 1));
        fen
    }

    /// Hash of the current position recomputed from nothing.
    pub fn compute_hash(&self) -> u64 {
        let mut hash = 0u64;
        for color in [Color::White, Color::Black] {
            for piece in Piece::ALL {
                for square in Squares(self.pieces(color, piece)) {
                    hash ^= self.keys.piece(piece, color, square);
                }
            }
        }
        for right in 0..4 {
            if self.castling[right] {
                hash ^= self.keys.castling(right);
            }
        }
        if let Some(square) = self.en_passant {
            hash ^= self.keys.en_passant(file_of(square));
        }
        if self.side_to_move == Color::Black {
            hash ^= self.keys.side();
        }
        hash
    }

    pub fn make_move(&mut self, mv: Move) {
        let us = self.side_to_move;
        let them = us.opposite();

        self.history.push(Undo {
            hash: self.hash,
            en_passant: self.en_passant,
            castling: self.castling,
            halfmove_clock: self.halfmove_clock,
        });

        // The captured pawn sits behind the destination square
        if mv.is_en_passant {
            self.toggle_piece(Piece::Pawn, them, en_passant_victim(mv.to, us));
        }

        self.update_castling_rights(mv);

        if mv.is_castling {
            if let Some((rook_from, rook_to)) = castling_rook_squares(mv.to) {
                self.toggle_piece(Piece::Rook, us, rook_from);
                self.toggle_piece(Piece::Rook, us, rook_to);
            }
        }

        if let Some(captured) = mv.captured_piece {
            if !mv.is_en_passant {
                self.toggle_piece(captured, them, mv.to);
            }
        }

        if let Some(square) = self.en_passant.take() {
            self.hash ^= self.keys.en_passant(file_of(square));
        }
        if mv.is_double_push {
            let square = (mv.from + mv.to) / 2;
            self.en_passant = Some(square);
            self.hash ^= self.keys.en_passant(file_of(square));
        }

        self.toggle_piece(mv.piece, us, mv.from);
        self.toggle_piece(mv.promotion.unwrap_or(mv.piece), us, mv.to);

        self.side_to_move = them;
        self.hash ^= self.keys.side();

        if mv.piece == Piece::Pawn || mv.is_capture() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }
        self.ply += 1;
    }

    pub fn unmake_move(&mut self, mv: Move) {
        let undo = match self.history.pop() {
            Some(undo) => undo,
            None => {
                debug_assert!(false, "unmake_move without a matching make_move");
                return;
            }
        };

        let us = self.side_to_move.opposite();
        let them = self.side_to_move;
        self.side_to_move = us;
        self.ply -= 1;

        self.xor_piece(mv.promotion.unwrap_or(mv.piece), us, mv.to);
        self.xor_piece(mv.piece, us, mv.from);

        if mv.is_castling {
            if let Some((rook_from, rook_to)) = castling_rook_squares(mv.to) {
                self.xor_piece(Piece::Rook, us, rook_to);
                self.xor_piece(Piece::Rook, us, rook_from);
            }
        }

        if let Some(captured) = mv.captured_piece {
            let square = if mv.is_en_passant {
                en_passant_victim(mv.to, us)
            } else {
                mv.to
            };
            self.xor_piece(captured, them, square);
        }

        self.hash = undo.hash;
        self.en_passant = undo.en_passant;
        self.castling = undo.castling;
        self.halfmove_clock = undo.halfmove_clock;
    }

    /// Passes the turn. Resets the half-move clock so repetition scans never
    /// look across a null move.
    pub fn make_null_move(&mut self) {
        self.history.push(Undo {
            hash: self.hash,
            en_passant: self.en_passant,
            castling: self.castling,
            halfmove_clock: self.halfmove_clock,
        });
        if let Some(square) = self.en_passant.take() {
            self.hash ^= self.keys.en_passant(file_of(square));
        }
        self.halfmove_clock = 0;
        self.side_to_move = self.side_to_move.opposite();
        self.hash ^= self.keys.side();
        self.ply += 1;
    }

    pub fn unmake_null_move(&mut self) {
        let undo = match self.history.pop() {
            Some(undo) => undo,
            None => {
                debug_assert!(false, "unmake_null_move without a matching make_null_move");
                return;
            }
        };
        self.side_to_move = self.side_to_move.opposite();
        self.ply -= 1;
        self.hash = undo.hash;
        self.en_passant = undo.en_passant;
        self.castling = undo.castling;
        self.halfmove_clock = undo.halfmove_clock;
    }

    pub fn is_drawn(&self) -> bool {
        self.halfmove_clock >= FIFTY_MOVE_HALFMOVES || self.repetitions() >= REPETITIONS_FOR_DRAW
    }

    /// Number of earlier positions identical to the current one, looking
    /// back only as far as the last pawn move or capture.
    pub fn repetitions(&self) -> usize {
        let len = self.history.len();
        let window = (self.halfmove_clock as usize).min(len);
        (2..=window)
            .step_by(2)
            .filter(|&plies_ago| self.history[len - plies_ago].hash == self.hash)
            .count()
    }

    fn update_castling_rights(&mut self, mv: Move) {
        let mut lost = castling_rights_touched(mv.from);
        if mv.is_capture() {
            lost |= castling_rights_touched(mv.to);
        }
        for right in 0..4 {
            if lost & (1 << right) != 0 && self.castling[right] {
                self.castling[right] = false;
                self.hash ^= self.keys.castling(right);
            }
        }
    }

    #[inline]
    fn xor_piece(&mut self, piece: Piece, color: Color, square: u8) {
        let bb = square_bb(square);
        self.pieces[piece.index()] ^= bb;
        self.colors[color.index()] ^= bb;
    }

    #[inline]
    fn toggle_piece(&mut self, piece: Piece, color: Color, square: u8) {
        self.xor_piece(piece, color, square);
        self.hash ^= self.keys.piece(piece, color, square);
    }

    fn put_piece(&mut self, piece: Piece, color: Color, square: u8) {
        debug_assert!(self.piece_at(square).is_none());
        self.xor_piece(piece, color, square);
    }

    #[inline]
    pub fn occupied(&self) -> Bitboard {
        self.colors[0] | self.colors[1]
    }

    #[inline]
    pub fn empty_squares(&self) -> Bitboard {
        !self.occupied()
    }

    #[inline]
    pub fn color_bb(&self, color: Color) -> Bitboard {
        self.colors[color.index()]
    }

    /// Pieces of the side to move.
    #[inline]
    pub fn us(&self) -> Bitboard {
        self.color_bb(self.side_to_move)
    }

    /// Pieces of the side not to move.
    #[inline]
    pub fn them(&self) -> Bitboard {
        self.color_bb(self.side_to_move.opposite())
    }

    /// Pieces of one kind, both colors.
    #[inline]
    pub fn piece_bb(&self, piece: Piece) -> Bitboard {
        self.pieces[piece.index()]
    }

    #[inline]
    pub fn pieces(&self, color: Color, piece: Piece) -> Bitboard {
        self.pieces[piece.index()] & self.colors[color.index()]
    }

    /// Pieces of one kind belonging to the side to move.
    #[inline]
    pub fn own(&self, piece: Piece) -> Bitboard {
        self.pieces(self.side_to_move, piece)
    }

    pub fn piece_at(&self, square: u8) -> Option<(Piece, Color)> {
        let mask = square_bb(square);
        let color = if self.colors[0] & mask != 0 {
            Color::White
        } else if self.colors[1] & mask != 0 {
            Color::Black
        } else {
            return None;
        };
        Piece::ALL
            .into_iter()
            .find(|piece| self.pieces[piece.index()] & mask != 0)
            .map(|piece| (piece, color))
    }

    pub fn king_square(&self, color: Color) -> Option<u8> {
        Squares(self.pieces(color, Piece::King)).next()
    }

    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    pub fn en_passant(&self) -> Option<u8> {
        self.en_passant
    }

    pub fn castling(&self, right: usize) -> bool {
        self.castling[right]
    }

    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    pub fn ply(&self) -> u32 {
        self.ply
    }

    pub fn hash(&self) -> u64 {
        self.hash
    }
}

// Squares the captured pawn of an en passant capture stood on
fn en_passant_victim(to: u8, mover: Color) -> u8 {
    match mover {
        Color::White => to - 8,
        Color::Black => to + 8,
    }
}

/// Rook origin and destination for a castling king landing on `king_to`.
pub fn castling_rook_squares(king_to: u8) -> Option<(u8, u8)> {
    match king_to {
        6 => Some((7, 5)),
        2 => Some((0, 3)),
        62 => Some((63, 61)),
        58 => Some((56, 59)),
        _ => None,
    }
}

// Bit set of castling rights lost when a move touches `square`
fn castling_rights_touched(square: u8) -> u8 {
    match square {
        4 => (1 << WHITE_KINGSIDE) | (1 << WHITE_QUEENSIDE),
        7 => 1 << WHITE_KINGSIDE,
        0 => 1 << WHITE_QUEENSIDE,
        60 => (1 << BLACK_KINGSIDE) | (1 << BLACK_QUEENSIDE),
        63 => 1 << BLACK_KINGSIDE,
        56 => 1 << BLACK_QUEENSIDE,
        _ => 0,
    }
}

impl PartialEq for Board {
    // Position identity; history and keys are bookkeeping
    fn eq(&self, other: &Self) -> bool {
        self.pieces == other.pieces
            && self.colors == other.colors
            && self.side_to_move == other.side_to_move
            && self.en_passant == other.en_passant
            && self.castling == other.castling
            && self.halfmove_clock == other.halfmove_clock
            && self.ply == other.ply
            && self.hash == other.hash
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for rank in (0..8).rev() {
            write!(f, "{} ", rank + 1)?;
            for file in 0..8 {
                let c = match self.piece_at(make_square(file, rank)) {
                    Some((piece, color)) => piece.to_char(color),
                    None => '.',
                };
                write!(f, "{}", c)?;
                if file < 7 {
                    write!(f, " ")?;
                }
            }
            writeln!(f)?;
        }
        writeln!(f, "  a b c d e f g h")?;
        write!(f, "{}", self.to_fen())
    }
}
