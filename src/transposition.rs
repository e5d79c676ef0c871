use crate::movegen::Move;
use crate::search::{MATE, MAX_PLY};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Exact,
    LowerBound,
    UpperBound,
}

#[derive(Debug, Clone, Copy)]
pub struct TranspositionEntry {
    pub hash: u64,
    pub depth: i32,
    pub score: i32,
    pub node_type: NodeType,
    pub best_move: Option<Move>,
    pub age: u16,
}

impl TranspositionEntry {
    /// The score to return straight away, if the stored bound already
    /// settles a search of `depth` with window (alpha, beta) at `ply`.
    pub fn cutoff(&self, depth: i32, alpha: i32, beta: i32, ply: i32) -> Option<i32> {
        if self.depth < depth {
            return None;
        }
        let score = score_from_tt(self.score, ply);
        match self.node_type {
            NodeType::Exact => Some(score.max(alpha).min(beta)),
            NodeType::LowerBound if score >= beta => Some(beta),
            NodeType::UpperBound if score <= alpha => Some(alpha),
            _ => None,
        }
    }
}

/// Mate scores are stored relative to the node so they stay correct when
/// the position is reached at another ply.
pub fn score_to_tt(score: i32, ply: i32) -> i32 {
    if score >= MATE - MAX_PLY {
        score + ply
    } else if score <= -MATE + MAX_PLY {
        score - ply
    } else {
        score
    }
}

pub fn score_from_tt(score: i32, ply: i32) -> i32 {
    if score >= MATE - MAX_PLY {
        score - ply
    } else if score <= -MATE + MAX_PLY {
        score + ply
    } else {
        score
    }
}

const OCCUPANCY_SAMPLE: usize = 1000;

/// Fixed-size table, one entry per slot, indexed by hash modulo size.
pub struct TranspositionTable {
    entries: Vec<Option<TranspositionEntry>>,
    age: u16,
}

impl TranspositionTable {
    pub fn new(size: usize) -> Self {
        Self {
            entries: vec![None; size.max(1)],
            age: 0,
        }
    }

    pub fn age(&self) -> u16 {
        self.age
    }

    /// Marks the start of a new search; entries from earlier searches become
    /// replaceable regardless of depth.
    pub fn new_search(&mut self) {
        self.age = self.age.wrapping_add(1);
    }

    pub fn clear(&mut self) {
        self.entries.iter_mut().for_each(|entry| *entry = None);
        self.age = 0;
    }

    #[inline]
    fn index(&self, hash: u64) -> usize {
        (hash % self.entries.len() as u64) as usize
    }

    /// Stores unless the slot holds deeper data from the current search.
    /// Returns whether the entry was written.
    pub fn store(
        &mut self,
        hash: u64,
        depth: i32,
        score: i32,
        node_type: NodeType,
        best_move: Option<Move>,
    ) -> bool {
        let age = self.age;
        let index = self.index(hash);
        let slot = &mut self.entries[index];
        let replace = match slot {
            None => true,
            Some(stored) => stored.age != age || stored.depth <= depth,
        };
        if replace {
            *slot = Some(TranspositionEntry {
                hash,
                depth,
                score,
                node_type,
                best_move,
                age,
            });
        }
        replace
    }

    /// The entry for `hash`, if its slot holds that exact position.
    pub fn probe(&self, hash: u64) -> Option<&TranspositionEntry> {
        self.entries[self.index(hash)]
            .as_ref()
            .filter(|entry| entry.hash == hash)
    }

    pub fn best_move(&self, hash: u64) -> Option<Move> {
        self.probe(hash).and_then(|entry| entry.best_move)
    }

    /// Permille of slots filled by the current search, sampled over the
    /// first thousand slots.
    pub fn occupancy(&self) -> u32 {
        let sample = &self.entries[..self.entries.len().min(OCCUPANCY_SAMPLE)];
        let used = sample
            .iter()
            .filter(|slot| matches!(slot, Some(entry) if entry.age == self.age))
            .count();
        (used * 1000 / sample.len()) as u32
    }
}
