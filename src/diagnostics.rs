//! Diagnostic log: bounded buffer of recent compile failures.
//!
//! Failures never block rendering; they land here so an editor can show them
//! next to the fractal that is actually being drawn.

use std::collections::VecDeque;
use std::time::SystemTime;

use crate::equation::CompileError;

/// A timestamped compile failure.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub timestamp: SystemTime,
    /// Equation text that failed.
    pub source: String,
    pub error: CompileError,
}

/// Circular buffer of recent compile failures.
#[derive(Debug, Clone)]
pub struct DiagnosticLog {
    entries: VecDeque<Diagnostic>,
    capacity: usize,
}

impl DiagnosticLog {
    /// Create a new log with the given capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record a failure, evicting the oldest if at capacity.
    pub fn push(&mut self, source: &str, error: CompileError) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(Diagnostic {
            timestamp: SystemTime::now(),
            source: source.to_string(),
            error,
        });
    }

    /// Get the N most recent entries (newest last).
    pub fn recent(&self, n: usize) -> Vec<&Diagnostic> {
        let skip = self.entries.len().saturating_sub(n);
        self.entries.iter().skip(skip).collect()
    }

    pub fn latest(&self) -> Option<&Diagnostic> {
        self.entries.back()
    }

    pub fn entries(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl Default for DiagnosticLog {
    fn default() -> Self {
        Self::new(50)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn err(msg: &str) -> CompileError {
        CompileError::parse(msg, 0)
    }

    #[test]
    fn new_log_is_empty() {
        let log = DiagnosticLog::new(10);
        assert!(log.is_empty());
        assert_eq!(log.len(), 0);
        assert!(log.latest().is_none());
    }

    #[test]
    fn capacity_overflow_evicts_oldest() {
        let mut log = DiagnosticLog::new(3);
        for src in ["a", "b", "c", "d"] {
            log.push(src, err(src));
        }
        assert_eq!(log.len(), 3);
        let sources: Vec<&str> = log.entries().map(|d| d.source.as_str()).collect();
        assert_eq!(sources, vec!["b", "c", "d"]);
        assert_eq!(log.latest().unwrap().source, "d");
    }

    #[test]
    fn recent_returns_newest() {
        let mut log = DiagnosticLog::new(10);
        log.push("a", err("first"));
        log.push("b", err("second"));
        log.push("c", err("third"));

        let recent = log.recent(2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].error.message, "second");
        assert_eq!(recent[1].error.message, "third");
        assert_eq!(log.recent(10).len(), 3);
    }

    #[test]
    fn zero_capacity_keeps_nothing() {
        let mut log = DiagnosticLog::new(0);
        log.push("a", err("x"));
        assert!(log.is_empty());
    }

    #[test]
    fn clear_empties_log() {
        let mut log = DiagnosticLog::default();
        log.push("a", err("x"));
        log.clear();
        assert!(log.is_empty());
    }
}
