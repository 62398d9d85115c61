//! Bounded linear undo/redo over whole-document snapshots.

use crate::config::DEFAULT_HISTORY_DEPTH;
use std::collections::VecDeque;

/// Past and future snapshots around a current value that lives elsewhere.
///
/// `past` is ordered oldest to newest; `future` is ordered next to last.
/// `past` holds at most `capacity` entries and evicts its oldest first.
/// Redo pushes honor the same cap as [`History::record`].
#[derive(Debug, Clone)]
pub struct History<T> {
    past: VecDeque<T>,
    future: VecDeque<T>,
    capacity: usize,
}

impl<T> Default for History<T> {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_DEPTH)
    }
}

impl<T> History<T> {
    /// Create an empty history keeping at most `capacity` undo steps.
    pub fn new(capacity: usize) -> Self {
        Self {
            past: VecDeque::new(),
            future: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Record the state as it was before an edit. Clears the redo branch.
    pub fn record(&mut self, current: T) {
        self.push_past(current);
        self.future.clear();
    }

    /// Step back. Returns the previous state, or `None` when there is
    /// nothing to undo.
    pub fn undo(&mut self, current: T) -> Option<T> {
        let previous = self.past.pop_back()?;
        self.future.push_front(current);
        log::debug!("undo: {} past, {} future", self.past.len(), self.future.len());
        Some(previous)
    }

    /// Step forward. Returns the next state, or `None` when there is
    /// nothing to redo.
    pub fn redo(&mut self, current: T) -> Option<T> {
        let next = self.future.pop_front()?;
        self.push_past(current);
        log::debug!("redo: {} past, {} future", self.past.len(), self.future.len());
        Some(next)
    }

    fn push_past(&mut self, entry: T) {
        self.past.push_back(entry);
        while self.past.len() > self.capacity {
            self.past.pop_front();
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn past_len(&self) -> usize {
        self.past.len()
    }

    pub fn future_len(&self) -> usize {
        self.future.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Past snapshots, oldest first.
    pub fn past(&self) -> impl Iterator<Item = &T> {
        self.past.iter()
    }

    /// Future snapshots, next first.
    pub fn future(&self) -> impl Iterator<Item = &T> {
        self.future.iter()
    }

    /// Drop all snapshots.
    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_caps_and_evicts_oldest() {
        let mut history = History::new(30);
        for step in 0..31 {
            history.record(step);
            assert_eq!(history.future_len(), 0);
        }
        assert_eq!(history.past_len(), 30);
        assert_eq!(history.past().next(), Some(&1));
        assert_eq!(history.past().last(), Some(&30));
    }

    #[test]
    fn test_undo_empty_is_noop() {
        let mut history: History<&str> = History::default();
        assert_eq!(history.undo("current"), None);
        assert_eq!(history.past_len(), 0);
        assert_eq!(history.future_len(), 0);
    }

    #[test]
    fn test_redo_empty_is_noop() {
        let mut history: History<&str> = History::default();
        history.record("a");
        assert_eq!(history.redo("b"), None);
        assert_eq!(history.past_len(), 1);
        assert_eq!(history.future_len(), 0);
    }

    #[test]
    fn test_undo_redo_roundtrip() {
        let mut history = History::default();
        let mut current = vec!["a".to_string()];

        history.record(current.clone());
        current.push("b".to_string());
        let before_undo = current.clone();

        current = history.undo(current).unwrap();
        assert_eq!(current, vec!["a".to_string()]);
        assert!(history.can_redo());

        current = history.redo(current).unwrap();
        assert_eq!(current, before_undo);
        assert!(!history.can_redo());
        assert!(history.can_undo());
    }

    #[test]
    fn test_multi_step_order() {
        let mut history = History::default();
        history.record(1);
        history.record(2);
        // current = 3
        let a = history.undo(3).unwrap();
        let b = history.undo(a).unwrap();
        assert_eq!((a, b), (2, 1));
        assert_eq!(history.future().copied().collect::<Vec<_>>(), vec![2, 3]);

        assert_eq!(history.redo(b), Some(2));
        assert_eq!(history.redo(2), Some(3));
    }

    #[test]
    fn test_record_clears_future() {
        let mut history = History::default();
        history.record(1);
        let current = history.undo(2).unwrap();
        assert!(history.can_redo());
        history.record(current);
        assert!(!history.can_redo());
    }

    #[test]
    fn test_full_history_survives_undo_redo() {
        let mut history = History::new(2);
        for step in 0..5 {
            history.record(step);
        }
        // current = 5
        let cur = history.undo(5).unwrap();
        let cur = history.redo(cur).unwrap();
        assert_eq!(cur, 5);
        assert_eq!(history.past_len(), 2);
        assert_eq!(history.past().copied().collect::<Vec<_>>(), vec![3, 4]);
    }
}
