/*!
# Search Budgets

The exponential engines (Hamiltonian cycle, Bron–Kerbosch) must stay
responsive inside a server, so every branching step consults a [`Budget`]
combining a wall-clock deadline with a step ceiling. The deadline bounds a
deep single branch, the step ceiling bounds a wide shallow search.
*/

use std::time::{Duration, Instant};

/// Cooperative bound on search effort.
///
/// A budget is owned by exactly one algorithm invocation and is never shared
/// across concurrent searches. Once [`Budget::consume`] has reported
/// exhaustion it keeps doing so for the rest of the budget's lifetime.
#[derive(Debug, Clone)]
pub struct Budget {
    deadline: Option<Instant>,
    step_limit: u64,
    steps: u64,
    expired: bool,
}

impl Budget {
    /// Creates a budget. `step_limit == 0` means unbounded steps; a missing
    /// timeout means no deadline.
    pub fn new(step_limit: u64, timeout: Option<Duration>) -> Self {
        Self {
            deadline: timeout.map(|t| Instant::now() + t),
            step_limit,
            steps: 0,
            expired: false,
        }
    }

    /// Creates a budget that never expires.
    pub fn unbounded() -> Self {
        Self::new(0, None)
    }

    /// Accounts one unit of work. Returns *true* iff the caller must abort
    /// now, i.e. the step ceiling is reached or the deadline has passed.
    pub fn consume(&mut self) -> bool {
        if self.expired {
            return true;
        }
        self.steps += 1;
        if self.step_limit != 0 && self.steps >= self.step_limit {
            self.expired = true;
        } else if self.deadline.is_some_and(|d| Instant::now() >= d) {
            self.expired = true;
        }
        self.expired
    }

    /// Returns *true* if the budget has been exhausted.
    pub fn is_expired(&self) -> bool {
        self.expired
    }

    /// Returns the number of steps consumed so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn step_limit_expires() {
        let mut budget = Budget::new(3, None);
        assert!(!budget.consume());
        assert!(!budget.consume());
        assert!(budget.consume());
        assert_eq!(budget.steps(), 3);
    }

    #[test]
    fn expiry_is_monotonic() {
        let mut budget = Budget::new(1, None);
        assert!(budget.consume());
        for _ in 0..100 {
            assert!(budget.consume());
            assert!(budget.is_expired());
        }
        // the step counter freezes once expired
        assert_eq!(budget.steps(), 1);
    }

    #[test]
    fn deadline_expires() {
        let mut budget = Budget::new(0, Some(Duration::ZERO));
        assert!(budget.consume());
        assert!(budget.is_expired());
    }

    #[test]
    fn unbounded_never_expires() {
        let mut budget = Budget::unbounded();
        for _ in 0..10_000 {
            assert!(!budget.consume());
        }
    }
}
