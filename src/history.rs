// ============================================================================
// HISTORY — bounded snapshot stack for undo/redo
// ============================================================================
//
// Snapshots the entire serializable project state on every change. The stack
// is capped; the oldest entries fall off the front. A new snapshot taken
// after an undo truncates the redo tail. Pixels are never part of a snapshot
// — the state is configuration only, cheap to clone.
// ============================================================================

use std::collections::VecDeque;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::project::ProjectState;

const MAX_HISTORY_SIZE: usize = 50;

/// One labeled, timestamped state snapshot.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HistorySnapshot {
    /// Milliseconds since the unix epoch.
    pub timestamp: u64,
    pub label: String,
    pub state: ProjectState,
}

/// Undo/redo history over full-state snapshots.
pub struct SnapshotHistory {
    snapshots: VecDeque<HistorySnapshot>,
    /// Index of the snapshot representing the current state; `None` until
    /// `initialize` or the first `snapshot` call.
    current: Option<usize>,
    max_size: usize,
}

impl Default for SnapshotHistory {
    fn default() -> Self {
        Self::new(MAX_HISTORY_SIZE)
    }
}

impl SnapshotHistory {
    pub fn new(max_size: usize) -> Self {
        Self {
            snapshots: VecDeque::new(),
            current: None,
            max_size: max_size.max(1),
        }
    }

    /// Seed the history with the given state as its single entry.
    pub fn initialize(&mut self, state: &ProjectState) {
        self.snapshots.clear();
        self.snapshots.push_back(HistorySnapshot {
            timestamp: now_millis(),
            label: "Initial State".to_string(),
            state: state.clone(),
        });
        self.current = Some(0);
    }

    /// Record the current state. Discards any redo tail, then trims the
    /// front of the stack to stay within the size cap.
    pub fn snapshot(&mut self, state: &ProjectState, label: impl Into<String>) {
        if let Some(current) = self.current {
            self.snapshots.truncate(current + 1);
        } else {
            self.snapshots.clear();
        }

        self.snapshots.push_back(HistorySnapshot {
            timestamp: now_millis(),
            label: label.into(),
            state: state.clone(),
        });

        while self.snapshots.len() > self.max_size {
            self.snapshots.pop_front();
        }
        self.current = Some(self.snapshots.len() - 1);
    }

    /// Step back one snapshot. Returns the state to restore, or `None` when
    /// there is nothing to undo.
    pub fn undo(&mut self) -> Option<ProjectState> {
        let current = self.current?;
        if current == 0 {
            return None;
        }
        self.current = Some(current - 1);
        Some(self.snapshots[current - 1].state.clone())
    }

    /// Step forward one snapshot. Returns the state to restore, or `None`
    /// when there is nothing to redo.
    pub fn redo(&mut self) -> Option<ProjectState> {
        let current = self.current?;
        if current + 1 >= self.snapshots.len() {
            return None;
        }
        self.current = Some(current + 1);
        Some(self.snapshots[current + 1].state.clone())
    }

    /// Jump directly to snapshot `index` (0 = oldest).
    pub fn jump_to(&mut self, index: usize) -> Option<ProjectState> {
        if index >= self.snapshots.len() {
            return None;
        }
        self.current = Some(index);
        Some(self.snapshots[index].state.clone())
    }

    pub fn can_undo(&self) -> bool {
        matches!(self.current, Some(i) if i > 0)
    }

    pub fn can_redo(&self) -> bool {
        matches!(self.current, Some(i) if i + 1 < self.snapshots.len())
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    /// All snapshots, oldest first, for display.
    pub fn snapshots(&self) -> impl Iterator<Item = &HistorySnapshot> {
        self.snapshots.iter()
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
        self.current = None;
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::SourceConfig;

    fn state_with_brightness(brightness: f64) -> ProjectState {
        let mut state = ProjectState::default();
        state.set_source1(Some(SourceConfig::new("a.png", 4, 4)));
        state.update_source1(|s| s.brightness = brightness);
        state
    }

    #[test]
    fn initialize_seeds_one_entry() {
        let mut history = SnapshotHistory::default();
        history.initialize(&ProjectState::default());
        assert_eq!(history.len(), 1);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn undo_and_redo_walk_the_stack() {
        let mut history = SnapshotHistory::default();
        history.initialize(&state_with_brightness(0.0));
        history.snapshot(&state_with_brightness(10.0), "Brightness");
        history.snapshot(&state_with_brightness(20.0), "Brightness");

        let undone = history.undo().unwrap();
        assert_eq!(undone.source1.as_ref().unwrap().brightness, 10.0);
        let undone = history.undo().unwrap();
        assert_eq!(undone.source1.as_ref().unwrap().brightness, 0.0);
        assert!(history.undo().is_none());

        let redone = history.redo().unwrap();
        assert_eq!(redone.source1.as_ref().unwrap().brightness, 10.0);
        assert!(history.can_redo());
    }

    #[test]
    fn new_snapshot_after_undo_truncates_redo() {
        let mut history = SnapshotHistory::default();
        history.initialize(&state_with_brightness(0.0));
        history.snapshot(&state_with_brightness(10.0), "A");
        history.snapshot(&state_with_brightness(20.0), "B");

        history.undo();
        history.snapshot(&state_with_brightness(99.0), "C");

        assert!(!history.can_redo());
        assert_eq!(history.len(), 3); // initial, A, C
        let labels: Vec<_> = history.snapshots().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, ["Initial State", "A", "C"]);
    }

    #[test]
    fn stack_is_capped_and_drops_oldest() {
        let mut history = SnapshotHistory::new(5);
        history.initialize(&state_with_brightness(0.0));
        for i in 1..=10 {
            history.snapshot(&state_with_brightness(i as f64), format!("step {}", i));
        }
        assert_eq!(history.len(), 5);
        // Oldest remaining entry is step 6
        let first = history.snapshots().next().unwrap();
        assert_eq!(first.label, "step 6");
        // Current points at the newest entry
        assert_eq!(history.current_index(), Some(4));
    }

    #[test]
    fn jump_to_selects_arbitrary_snapshot() {
        let mut history = SnapshotHistory::default();
        history.initialize(&state_with_brightness(0.0));
        history.snapshot(&state_with_brightness(10.0), "A");
        history.snapshot(&state_with_brightness(20.0), "B");

        let state = history.jump_to(0).unwrap();
        assert_eq!(state.source1.as_ref().unwrap().brightness, 0.0);
        assert!(history.can_redo());
        assert!(history.jump_to(7).is_none());
    }

    #[test]
    fn clear_empties_everything() {
        let mut history = SnapshotHistory::default();
        history.initialize(&ProjectState::default());
        history.snapshot(&ProjectState::default(), "X");
        history.clear();
        assert!(history.is_empty());
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert_eq!(history.current_index(), None);
    }
}
