use std::time::{Duration, Instant};

pub const DEFAULT_CHECK_INTERVAL: u64 = 1024;

/// Wall-clock budget for one search, optionally capped by a node count.
/// The clock is only read every `check_interval` nodes; once a limit is hit
/// the controller stays stopped until restarted.
#[derive(Debug, Clone)]
pub struct TimeControl {
    start: Instant,
    budget: Option<Duration>,
    node_limit: Option<u64>,
    check_interval: u64,
    stopped: bool,
}

impl TimeControl {
    pub fn new(budget: Option<Duration>, check_interval: u64) -> Self {
        Self {
            start: Instant::now(),
            budget,
            node_limit: None,
            check_interval: check_interval.max(1),
            stopped: false,
        }
    }

    /// No time limit.
    pub fn infinite() -> Self {
        Self::new(None, DEFAULT_CHECK_INTERVAL)
    }

    /// Stops the search once `nodes` have been visited.
    pub fn with_node_limit(mut self, nodes: u64) -> Self {
        self.node_limit = Some(nodes);
        self
    }

    /// Share of the remaining clock to spend on the next move.
    pub fn budget_for(remaining: Duration, moves_remaining: u32) -> Duration {
        remaining / (moves_remaining.saturating_add(1))
    }

    pub fn budget(&self) -> Option<Duration> {
        self.budget
    }

    pub fn start(&mut self) {
        self.start = Instant::now();
        self.stopped = false;
    }

    pub fn stop(&mut self) {
        self.stopped = true;
    }

    #[inline]
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Reads the clock when `nodes` hits the check interval and returns
    /// whether the search must stop.
    #[inline]
    pub fn poll(&mut self, nodes: u64) -> bool {
        if self.stopped {
            return true;
        }
        if matches!(self.node_limit, Some(limit) if nodes >= limit) {
            self.stopped = true;
        } else if nodes % self.check_interval == 0 {
            self.check_time();
        }
        self.stopped
    }

    /// Reads the clock unconditionally.
    pub fn check_time(&mut self) -> bool {
        if let Some(budget) = self.budget {
            if self.start.elapsed() >= budget {
                self.stopped = true;
            }
        }
        self.stopped
    }
}

impl Default for TimeControl {
    fn default() -> Self {
        Self::infinite()
    }
}
