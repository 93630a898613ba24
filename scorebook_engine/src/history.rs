//! Linear undo/redo over full-state snapshots.
//!
//! Snapshots are complete `ScoreState` clones. The undo stack is bounded:
//! pushing past capacity evicts the oldest snapshot. Any new transition
//! clears the redo stack.

use std::collections::VecDeque;

use crate::domain::ScoreState;

pub const DEFAULT_UNDO_CAPACITY: usize = 50;

#[derive(Debug, Clone)]
pub struct UndoHistory {
    undo: VecDeque<ScoreState>,
    redo: Vec<ScoreState>,
    capacity: usize,
}

impl Default for UndoHistory {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_UNDO_CAPACITY)
    }
}

impl UndoHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            undo: VecDeque::with_capacity(capacity),
            redo: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    /// Record the pre-transition state of a new mutating transition.
    pub fn record(&mut self, before: ScoreState) {
        self.push_undo(before);
        self.redo.clear();
    }

    /// Swap `current` for the most recent undo snapshot. Returns `false`
    /// (and leaves `current` alone) when there is nothing to undo.
    pub fn undo(&mut self, current: &mut ScoreState) -> bool {
        let Some(previous) = self.undo.pop_back() else {
            return false;
        };
        let now = std::mem::replace(current, previous);
        self.redo.push(now);
        true
    }

    /// Mirror of `undo` over the redo stack.
    pub fn redo(&mut self, current: &mut ScoreState) -> bool {
        let Some(next) = self.redo.pop() else {
            return false;
        };
        let now = std::mem::replace(current, next);
        self.push_undo(now);
        true
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn push_undo(&mut self, state: ScoreState) {
        if self.undo.len() == self.capacity {
            self.undo.pop_front();
        }
        self.undo.push_back(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::create_initial_state;

    fn state_with_outs(outs: u8) -> ScoreState {
        let mut s = create_initial_state("g");
        s.outs = outs;
        s
    }

    #[test]
    fn empty_history_is_a_no_op() {
        let mut h = UndoHistory::default();
        let mut s = state_with_outs(1);
        assert!(!h.undo(&mut s));
        assert!(!h.redo(&mut s));
        assert_eq!(s.outs, 1);
    }

    #[test]
    fn undo_then_redo_is_identity() {
        let mut h = UndoHistory::default();
        let mut s = state_with_outs(0);
        h.record(s.clone());
        s.outs = 1;
        let before_undo = s.clone();
        assert!(h.undo(&mut s));
        assert_eq!(s.outs, 0);
        assert!(h.redo(&mut s));
        assert_eq!(s, before_undo);
    }

    #[test]
    fn oldest_snapshot_is_evicted() {
        let mut h = UndoHistory::with_capacity(2);
        let mut s = state_with_outs(2);
        h.record(state_with_outs(0));
        h.record(state_with_outs(1));
        h.record(state_with_outs(2));
        assert_eq!(h.undo_depth(), 2);
        assert!(h.undo(&mut s));
        assert!(h.undo(&mut s));
        assert_eq!(s.outs, 1);
        assert!(!h.undo(&mut s));
    }

    #[test]
    fn new_record_clears_redo() {
        let mut h = UndoHistory::default();
        let mut s = state_with_outs(1);
        h.record(state_with_outs(0));
        h.undo(&mut s);
        assert!(h.can_redo());
        h.record(s.clone());
        assert!(!h.can_redo());
    }
}
