//! Individual stages of the search pipeline.
//!
//! Each stage is plain state with no timers or channels of its own, so the
//! coordinator in [`super::pipeline`] can drive them from one task.

use std::time::Duration;

use tokio::time::Instant;

/// Holds the latest submission until the input has been quiet long enough.
#[derive(Debug)]
pub struct Debouncer {
    quiet: Duration,
    pending: Option<(String, Instant)>,
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
        }
    }

    /// Replace any pending term and restart the quiet period from `now`.
    pub fn push(&mut self, term: String, now: Instant) {
        self.pending = Some((term, now + self.quiet));
    }

    /// When the pending term becomes due.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, due)| *due)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Take the pending term if its quiet period has elapsed at `now`.
    pub fn take_due(&mut self, now: Instant) -> Option<String> {
        if self.deadline().is_some_and(|due| due <= now) {
            self.flush()
        } else {
            None
        }
    }

    /// Take the pending term regardless of the deadline.
    pub fn flush(&mut self) -> Option<String> {
        self.pending.take().map(|(term, _)| term)
    }
}

/// Drops a term equal to the one emitted just before it.
#[derive(Debug, Default)]
pub struct DistinctAdjacent {
    last: Option<String>,
}

impl DistinctAdjacent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if `term` differs from the previously admitted term.
    pub fn admit(&mut self, term: &str) -> bool {
        if self.last.as_deref() == Some(term) {
            return false;
        }
        self.last = Some(term.to_string());
        true
    }
}

/// Monotonic generation counter for switch-dispatch.
///
/// Every dispatched search takes a new generation; a finished search is only
/// forwarded while its generation is still the newest.
#[derive(Debug, Default)]
pub struct GenerationGuard {
    current: u64,
}

impl GenerationGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new generation and return it.
    pub fn advance(&mut self) -> u64 {
        self.current += 1;
        self.current
    }

    pub fn current(&self) -> u64 {
        self.current
    }

    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUIET: Duration = Duration::from_millis(300);

    #[test]
    fn test_debouncer_keeps_last_of_burst() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(QUIET);

        debouncer.push("a".into(), start);
        debouncer.push("ab".into(), start + Duration::from_millis(100));
        debouncer.push("abc".into(), start + Duration::from_millis(120));

        assert_eq!(
            debouncer.deadline(),
            Some(start + Duration::from_millis(420))
        );
        assert_eq!(debouncer.take_due(start + Duration::from_millis(419)), None);
        assert_eq!(
            debouncer.take_due(start + Duration::from_millis(420)),
            Some("abc".to_string())
        );
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn test_debouncer_flush_ignores_deadline() {
        let mut debouncer = Debouncer::new(QUIET);
        debouncer.push("ma".into(), Instant::now());

        assert_eq!(debouncer.flush(), Some("ma".to_string()));
        assert_eq!(debouncer.flush(), None);
    }

    #[test]
    fn test_distinct_adjacent_only_compares_previous() {
        let mut distinct = DistinctAdjacent::new();

        assert!(distinct.admit("abc"));
        assert!(!distinct.admit("abc"));
        assert!(distinct.admit("abd"));
        assert!(distinct.admit("abc"));
    }

    #[test]
    fn test_distinct_adjacent_is_exact() {
        let mut distinct = DistinctAdjacent::new();

        assert!(distinct.admit("abc"));
        assert!(distinct.admit("abc "));
        assert!(distinct.admit("ABC"));
    }

    #[test]
    fn test_generation_guard() {
        let mut guard = GenerationGuard::new();
        let first = guard.advance();
        let second = guard.advance();

        assert!(second > first);
        assert!(!guard.is_current(first));
        assert!(guard.is_current(second));
        assert_eq!(guard.current(), second);
    }
}
