//! Two-level FIFO work queue of deferred deduction steps.

use std::collections::VecDeque;

use sudoku_core::{CellIndex, GroupId, Value};

use crate::coloring::ColoringId;

/// Scheduling priority of a queued [`Action`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Priority {
    /// Drained before any deferred work is considered.
    Immediate,
    /// Promoted into the immediate queue one item at a time, only when the
    /// immediate queue is empty.
    Deferred,
}

/// A deferred deduction step, captured as plain indices.
///
/// Every variant is re-validated when it executes: queue entries scheduled
/// earlier may have invalidated its precondition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Action {
    /// Reject `value` in `target` because it was asserted in a same-group
    /// cell.
    DirectExclusion {
        asserted: CellIndex,
        target: CellIndex,
        value: Value,
    },
    /// Assert `value` in the one remaining cell of `group` that can hold it.
    HiddenSingle { group: GroupId, value: Value },
    /// Assert the sole remaining candidate of `cell`.
    NakedSingle { cell: CellIndex },
    /// Look for a second cell sharing `cell`'s two candidates.
    NakedPairScan { cell: CellIndex },
    /// Look for two more cells confined to `cell`'s three candidates.
    NakedTripleScan { cell: CellIndex },
    /// Reject the pair's values in `target`.
    PairExclusion {
        pair: [CellIndex; 2],
        target: CellIndex,
        values: [Value; 2],
    },
    /// Reject the triple's values in `target`.
    TripleExclusion {
        triple: [CellIndex; 3],
        target: CellIndex,
        values: [Value; 3],
    },
    /// If all of `source`'s candidates for `value` lie in its intersection
    /// with `target`, reject `value` in the rest of `target`.
    ExcludeComplement {
        source: GroupId,
        target: GroupId,
        value: Value,
        count: u8,
    },
    /// Link the two remaining candidate cells of `group` for `value`.
    Color { group: GroupId, value: Value },
    /// Reject `value` in `cell`: it neighbours both polarities of the chain.
    ColoringConflict {
        cell: CellIndex,
        value: Value,
        coloring: ColoringId,
    },
}

/// The two FIFOs. Enqueue order is the sole tiebreaker within a priority.
#[derive(Debug, Default)]
pub(crate) struct WorkQueue {
    immediate: VecDeque<Action>,
    deferred: VecDeque<Action>,
}

impl WorkQueue {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, priority: Priority, action: Action) {
        match priority {
            Priority::Immediate => self.immediate.push_back(action),
            Priority::Deferred => self.deferred.push_back(action),
        }
    }

    pub(crate) fn pop_immediate(&mut self) -> Option<Action> {
        self.immediate.pop_front()
    }

    /// Moves the head of the deferred queue to the back of the immediate
    /// queue. Returns `false` if no deferred work exists.
    pub(crate) fn promote(&mut self) -> bool {
        match self.deferred.pop_front() {
            Some(action) => {
                self.immediate.push_back(action);
                true
            }
            None => false,
        }
    }

    pub(crate) fn clear(&mut self) {
        self.immediate.clear();
        self.deferred.clear();
    }
}
