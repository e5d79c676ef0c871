use crate::time_control::DEFAULT_CHECK_INTERVAL;
use crate::zobrist::DEFAULT_SEED;

/// Selective-search heuristics that can be switched off, e.g. to compare
/// against a plain minimax search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchFeatures {
    pub null_move: bool,
    pub late_move_reductions: bool,
    pub quiescence: bool,
    pub transposition_cutoffs: bool,
}

impl SearchFeatures {
    /// Only bound-preserving techniques: alpha-beta, PVS and move ordering.
    pub fn exact() -> Self {
        Self {
            null_move: false,
            late_move_reductions: false,
            quiescence: false,
            transposition_cutoffs: false,
        }
    }
}

impl Default for SearchFeatures {
    fn default() -> Self {
        Self {
            null_move: true,
            late_move_reductions: true,
            quiescence: true,
            transposition_cutoffs: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub max_depth: i32,
    pub time_check_interval: u64,
    pub null_move_reduction: i32,
    pub null_move_margin: i32,
    // Moves searched at full depth before reductions kick in
    pub lmr_full_depth_moves: usize,
    pub lmr_min_depth: i32,
    pub features: SearchFeatures,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_depth: 64,
            time_check_interval: DEFAULT_CHECK_INTERVAL,
            null_move_reduction: 2,
            null_move_margin: 50,
            lmr_full_depth_moves: 4,
            lmr_min_depth: 3,
            features: SearchFeatures::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Transposition table slots.
    pub hash_entries: usize,
    pub zobrist_seed: u64,
    pub search: SearchConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            hash_entries: 1 << 20,
            zobrist_seed: DEFAULT_SEED,
            search: SearchConfig::default(),
        }
    }
}
