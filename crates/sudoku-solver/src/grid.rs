//! Grid state and the canonical `assert`/`reject` transitions.

use std::collections::HashMap;
use std::fmt::{self, Display};
use std::sync::atomic::{AtomicU64, Ordering};

use log::debug;
use sudoku_core::{BitSet81, CandidateSet, CellIndex, GroupId, Puzzle, Value};

use crate::cell::{Cell, ValueState};
use crate::coloring::{Coloring, ColoringId};
use crate::error::{Contradiction, SolverError};
use crate::group::Group;
use crate::queue::{Action, Priority, WorkQueue};
use crate::reason::Reason;
use crate::solver::SolverOptions;

static NEXT_GRID_ID: AtomicU64 = AtomicU64::new(0);

/// A partially decided 9×9 grid together with its pending deduction work.
///
/// All mutation funnels through [`assert`] and [`reject`], which maintain the
/// derived state (candidate masks, per-group candidate sets, clue counters)
/// and enqueue follow-up deductions. Errors abort the currently executing
/// work item and surface out of [`propagate`]; the backtracking controller
/// catches [`Contradiction`]s at the speculation boundary.
///
/// [`assert`]: Grid::assert
/// [`reject`]: Grid::reject
/// [`propagate`]: Grid::propagate
#[derive(Debug)]
pub struct Grid {
    pub(crate) id: u64,
    pub(crate) cells: Box<[Cell; 81]>,
    pub(crate) groups: Box<[Group; 27]>,
    pub(crate) clues: u8,
    pub(crate) queue: WorkQueue,
    pub(crate) colorings: HashMap<ColoringId, Coloring>,
    pub(crate) next_coloring: u32,
    pub(crate) coloring_enabled: bool,
}

impl Grid {
    /// Creates an empty grid with the coloring layer enabled.
    #[must_use]
    pub fn new() -> Self {
        Self::with_coloring(true)
    }

    /// Creates an empty grid, optionally without the coloring layer.
    #[must_use]
    pub fn with_coloring(coloring_enabled: bool) -> Self {
        Self {
            id: NEXT_GRID_ID.fetch_add(1, Ordering::Relaxed),
            cells: Box::new(std::array::from_fn(|i| {
                Cell::new(CellIndex::from_grid_index(i))
            })),
            groups: Box::new(std::array::from_fn(|i| Group::new(GroupId::from_index(i)))),
            clues: 0,
            queue: WorkQueue::new(),
            colorings: HashMap::new(),
            next_coloring: 0,
            coloring_enabled,
        }
    }

    /// Creates a grid and asserts every clue of `puzzle` onto it.
    ///
    /// # Errors
    ///
    /// Returns [`Contradiction`] (as a [`SolverError`]) if the clues directly
    /// conflict.
    pub fn from_puzzle(puzzle: &Puzzle, options: &SolverOptions) -> Result<Self, SolverError> {
        let mut grid = Self::with_coloring(options.coloring);
        grid.load(puzzle)?;
        Ok(grid)
    }

    /// Asserts every clue of `puzzle` onto the grid.
    ///
    /// # Errors
    ///
    /// Returns [`Contradiction`] (as a [`SolverError`]) if a clue conflicts
    /// with an earlier one; the grid keeps the clues asserted so far.
    pub fn load(&mut self, puzzle: &Puzzle) -> Result<(), SolverError> {
        for (index, value) in puzzle.iter() {
            self.assert(index, value, Reason::InitialClue)?;
        }
        Ok(())
    }

    /// The grid's process-monotonic id, used in coloring log lines.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Number of decided cells (0-81).
    #[must_use]
    pub fn clues(&self) -> usize {
        self.clues as usize
    }

    /// Whether all 81 cells are decided.
    #[must_use]
    pub fn is_solved(&self) -> bool {
        self.clues == 81
    }

    /// The decided value of a cell, if any.
    #[must_use]
    pub fn value(&self, index: CellIndex) -> Option<Value> {
        self.cells[index.grid_index()].value
    }

    /// The candidate values of a cell. A decided cell has exactly its value.
    #[must_use]
    pub fn candidates(&self, index: CellIndex) -> CandidateSet {
        self.cells[index.grid_index()].candidates
    }

    /// The decided values of all 81 cells, once the grid is solved.
    #[must_use]
    pub fn solution(&self) -> Option<Solution> {
        let mut values = [Value::new(0); 81];
        for (slot, cell) in values.iter_mut().zip(self.cells.iter()) {
            *slot = cell.value?;
        }
        Some(Solution(values))
    }

    /// Decides a cell on `value`.
    ///
    /// A no-op if the cell is already decided on `value`. Otherwise the cell
    /// transitions every other Maybe to No, group and grid clue counters
    /// advance, per-group candidate sets are adjusted, and a direct-exclusion
    /// rejection is scheduled (Immediate) for every same-group cell that
    /// still holds `value` as a Maybe.
    ///
    /// # Errors
    ///
    /// Returns [`Contradiction`] if the cell is decided on a different value
    /// or `value` was previously rejected here.
    pub fn assert(
        &mut self,
        index: CellIndex,
        value: Value,
        reason: Reason,
    ) -> Result<(), SolverError> {
        debug!("assert: value={value}, cell={index}, reason={reason}");
        let cell = &self.cells[index.grid_index()];
        match cell.state(value) {
            ValueState::Yes => Ok(()),
            ValueState::No => {
                if let Some(existing) = cell.value {
                    Err(Contradiction::ConflictingAssertion {
                        cell: index,
                        existing,
                        value,
                    }
                    .into())
                } else {
                    Err(Contradiction::ValueRejected { cell: index, value }.into())
                }
            }
            ValueState::Maybe => {
                // The cell was undecided, so its candidate set is exactly its
                // Maybe values.
                let mut released = cell.candidates;
                released.remove(value);

                // State transition first, count adjustment second, so the
                // group counts always reflect the post-transition truth.
                {
                    let cell = &mut self.cells[index.grid_index()];
                    cell.value = Some(value);
                    cell.candidates = CandidateSet::from_elem(value);
                    cell.maybes = 1;
                    cell.states[value.index()] = ValueState::Yes;
                    for other in released.iter() {
                        cell.states[other.index()] = ValueState::No;
                    }
                }
                self.clues += 1;
                for group in index.groups() {
                    self.groups[group.index()].clues += 1;
                }

                self.adjust_value_counts(index, value);
                for other in released.iter() {
                    self.adjust_value_counts(index, other);
                }

                self.enqueue_direct_exclusions(index, value);
                Ok(())
            }
        }
    }

    /// Excludes `value` from a cell.
    ///
    /// A no-op if the value is already excluded. Otherwise the state
    /// transitions to No, per-group candidate sets are adjusted, and a
    /// follow-up is scheduled according to the cell's remaining candidate
    /// count: a naked single (Immediate) at one, a naked-pair scan (Deferred)
    /// at two, a naked-triple scan (Deferred) at three.
    ///
    /// # Errors
    ///
    /// Returns [`Contradiction`] if the cell is decided on `value`, or if the
    /// rejection leaves it without candidates.
    pub fn reject(
        &mut self,
        index: CellIndex,
        value: Value,
        reason: Reason,
    ) -> Result<(), SolverError> {
        debug!("reject: value={value}, cell={index}, reason={reason}");
        match self.cells[index.grid_index()].state(value) {
            ValueState::No => Ok(()),
            ValueState::Yes => Err(Contradiction::ValueAsserted { cell: index, value }.into()),
            ValueState::Maybe => {
                let maybes = {
                    let cell = &mut self.cells[index.grid_index()];
                    cell.states[value.index()] = ValueState::No;
                    cell.candidates.remove(value);
                    cell.maybes -= 1;
                    cell.maybes
                };
                self.adjust_value_counts(index, value);
                match maybes {
                    0 => Err(Contradiction::NoCandidates { cell: index }.into()),
                    1 => {
                        self.queue
                            .push(Priority::Immediate, Action::NakedSingle { cell: index });
                        Ok(())
                    }
                    2 => {
                        self.queue
                            .push(Priority::Deferred, Action::NakedPairScan { cell: index });
                        Ok(())
                    }
                    3 => {
                        self.queue
                            .push(Priority::Deferred, Action::NakedTripleScan { cell: index });
                        Ok(())
                    }
                    _ => Ok(()),
                }
            }
        }
    }

    /// Runs queued work until the grid is solved or both queues drain.
    ///
    /// The immediate queue is drained first; when it empties, the head of the
    /// deferred queue is promoted and draining continues.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by a work item, leaving the remaining
    /// queue contents in place.
    pub fn propagate(&mut self) -> Result<(), SolverError> {
        while self.clues < 81 {
            if let Some(action) = self.queue.pop_immediate() {
                self.dispatch(action)?;
            } else if !self.queue.promote() {
                break;
            }
        }
        Ok(())
    }

    /// Removes the cell from each of its groups' candidate sets for `value`
    /// and schedules whatever deductions the new counts enable.
    ///
    /// Called exactly once per (cell, value) transition out of Maybe.
    pub(crate) fn adjust_value_counts(&mut self, index: CellIndex, value: Value) {
        let grid_index = index.grid_index() as u8;
        for group in index.groups() {
            self.groups[group.index()].remove_value_cell(value, grid_index);
        }

        for group in index.groups() {
            match self.groups[group.index()].count(value) {
                1 => self
                    .queue
                    .push(Priority::Deferred, Action::HiddenSingle { group, value }),
                2 if self.coloring_enabled => self
                    .queue
                    .push(Priority::Deferred, Action::Color { group, value }),
                _ => {}
            }
        }

        // Block-line interaction: when the group with the smaller count has
        // 2 or 3 candidates and the other strictly more, the smaller side's
        // candidates may be confined to the intersection.
        let block = index.block_group();
        for line in [index.row_group(), index.column_group()] {
            let block_count = self.groups[block.index()].count(value);
            let line_count = self.groups[line.index()].count(value);
            let (source, target, count) = if block_count <= line_count {
                (block, line, block_count)
            } else {
                (line, block, line_count)
            };
            if matches!(count, 2 | 3) && count < block_count.max(line_count) {
                self.queue.push(
                    Priority::Deferred,
                    Action::ExcludeComplement {
                        source,
                        target,
                        value,
                        count: count as u8,
                    },
                );
            }
        }
    }

    /// Schedules an Immediate rejection of `value` for every other cell that
    /// shares a group with the asserted cell and still holds it as a Maybe.
    fn enqueue_direct_exclusions(&mut self, asserted: CellIndex, value: Value) {
        for group in asserted.groups() {
            for target in group.cells() {
                if target != asserted
                    && self.cells[target.grid_index()].state(value) == ValueState::Maybe
                {
                    self.queue.push(
                        Priority::Immediate,
                        Action::DirectExclusion {
                            asserted,
                            target,
                            value,
                        },
                    );
                }
            }
        }
    }

    /// The cells that could still take `value` and share a group with
    /// `index`, excluding `index` itself.
    pub(crate) fn neighbourhood(&self, index: CellIndex, value: Value) -> BitSet81 {
        let mut cells = BitSet81::new();
        for group in index.groups() {
            cells |= self.groups[group.index()].value_cells(value);
        }
        cells.remove(index.grid_index() as u8);
        cells
    }

    /// A copy of all grid state except the work queue, under a fresh id.
    pub(crate) fn speculative_clone(&self) -> Self {
        Self {
            id: NEXT_GRID_ID.fetch_add(1, Ordering::Relaxed),
            cells: self.cells.clone(),
            groups: self.groups.clone(),
            clues: self.clues,
            queue: WorkQueue::new(),
            colorings: self.colorings.clone(),
            next_coloring: self.next_coloring,
            coloring_enabled: self.coloring_enabled,
        }
    }

    /// Takes over a speculative clone's state, keeping this grid's id.
    pub(crate) fn adopt(&mut self, other: Self) {
        let Self {
            cells,
            groups,
            clues,
            colorings,
            next_coloring,
            ..
        } = other;
        self.cells = cells;
        self.groups = groups;
        self.clues = clues;
        self.colorings = colorings;
        self.next_coloring = next_coloring;
        self.queue.clear();
    }

    /// The most constrained undecided cell and its lowest Maybe value.
    ///
    /// The score of a cell is `(9 - maybes)` plus the clue counts of its
    /// three groups; ties break towards the lowest grid index.
    pub(crate) fn speculation_target(&self) -> Option<(CellIndex, Value)> {
        let mut best: Option<(usize, CellIndex, Value)> = None;
        for cell in self.cells.iter() {
            if cell.value.is_some() {
                continue;
            }
            let Some(value) = cell.candidates.iter().next() else {
                continue;
            };
            let mut score = 9 - cell.maybes as usize;
            for group in cell.index.groups() {
                score += self.groups[group.index()].clues as usize;
            }
            if best.is_none_or(|(best_score, _, _)| score > best_score) {
                best = Some((score, cell.index, value));
            }
        }
        best.map(|(_, index, value)| (index, value))
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}

/// The decided values of a solved grid, in row-major order.
///
/// Displays as 81 digits, the stream format's single-line rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution([Value; 81]);

impl Solution {
    /// The value of a cell.
    #[must_use]
    pub fn value(&self, index: CellIndex) -> Value {
        self.0[index.grid_index()]
    }
}

impl Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for value in &self.0 {
            write!(f, "{value}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    #[test]
    fn test_new_grid_is_open() {
        let grid = Grid::new();
        assert_eq!(grid.clues(), 0);
        assert!(!grid.is_solved());
        for index in CellIndex::all() {
            assert_eq!(grid.value(index), None);
            assert_eq!(grid.candidates(index), CandidateSet::FULL);
        }
        testing::assert_invariants(&grid);
    }

    #[test]
    fn test_assert_decides_cell_and_counts() {
        let mut grid = Grid::new();
        let index = CellIndex::new(0, 0);
        let value = Value::from_digit(5);
        grid.assert(index, value, Reason::InitialClue).unwrap();

        assert_eq!(grid.value(index), Some(value));
        assert_eq!(grid.clues(), 1);
        assert_eq!(grid.candidates(index), CandidateSet::from_elem(value));
        for group in index.groups() {
            assert_eq!(grid.groups[group.index()].clues, 1);
        }
        testing::assert_invariants(&grid);
    }

    #[test]
    fn test_assert_is_idempotent() {
        let mut grid = Grid::new();
        let index = CellIndex::new(3, 3);
        let value = Value::from_digit(1);
        grid.assert(index, value, Reason::InitialClue).unwrap();
        grid.assert(index, value, Reason::InitialClue).unwrap();

        assert_eq!(grid.clues(), 1);
        testing::assert_invariants(&grid);
    }

    #[test]
    fn test_conflicting_assertion_is_a_contradiction() {
        let mut grid = Grid::new();
        let index = CellIndex::new(2, 7);
        grid.assert(index, Value::from_digit(4), Reason::InitialClue)
            .unwrap();

        let err = grid
            .assert(index, Value::from_digit(5), Reason::InitialClue)
            .unwrap_err();
        assert!(matches!(
            err,
            SolverError::Contradiction(Contradiction::ConflictingAssertion { .. })
        ));
    }

    #[test]
    fn test_assert_after_reject_is_a_contradiction() {
        let mut grid = Grid::new();
        let index = CellIndex::new(5, 5);
        let value = Value::from_digit(9);
        grid.reject(index, value, Reason::NakedSingle).unwrap();

        let err = grid.assert(index, value, Reason::InitialClue).unwrap_err();
        assert!(matches!(
            err,
            SolverError::Contradiction(Contradiction::ValueRejected { .. })
        ));
    }

    #[test]
    fn test_reject_is_idempotent() {
        let mut grid = Grid::new();
        let index = CellIndex::new(1, 1);
        let value = Value::from_digit(2);
        grid.reject(index, value, Reason::NakedSingle).unwrap();
        grid.reject(index, value, Reason::NakedSingle).unwrap();

        assert_eq!(grid.candidates(index).len(), 8);
        testing::assert_invariants(&grid);
    }

    #[test]
    fn test_reject_of_asserted_value_is_a_contradiction() {
        let mut grid = Grid::new();
        let index = CellIndex::new(0, 8);
        let value = Value::from_digit(3);
        grid.assert(index, value, Reason::InitialClue).unwrap();

        let err = grid.reject(index, value, Reason::NakedSingle).unwrap_err();
        assert!(matches!(
            err,
            SolverError::Contradiction(Contradiction::ValueAsserted { .. })
        ));
    }

    #[test]
    fn test_rejecting_every_candidate_is_a_contradiction() {
        let mut grid = Grid::with_coloring(false);
        let index = CellIndex::new(4, 4);

        for value in Value::ALL.into_iter().take(8) {
            grid.reject(index, value, Reason::NakedSingle).unwrap();
        }
        let err = grid
            .reject(index, Value::from_digit(9), Reason::NakedSingle)
            .unwrap_err();
        assert!(matches!(
            err,
            SolverError::Contradiction(Contradiction::NoCandidates { .. })
        ));
    }

    #[test]
    fn test_direct_exclusion_propagates_from_assert() {
        let mut grid = Grid::new();
        let index = CellIndex::new(0, 0);
        let value = Value::from_digit(7);
        grid.assert(index, value, Reason::InitialClue).unwrap();
        grid.propagate().unwrap();

        // Every same-group cell lost the value as a candidate.
        for group in index.groups() {
            for cell in group.cells() {
                if cell != index {
                    assert!(!grid.candidates(cell).contains(value));
                }
            }
        }
        // Unrelated cells kept it.
        assert!(grid.candidates(CellIndex::new(4, 4)).contains(value));
        testing::assert_invariants(&grid);
    }

    #[test]
    fn test_clues_are_monotonic_under_propagation() {
        let mut grid = testing::parse_grid(
            "53..7....6..195....98....6.8...6...34..8.3..17...2...6.6....28....419..5....8..79",
        );
        let mut last = grid.clues();
        for _ in 0..200 {
            if let Some(action) = grid.queue.pop_immediate() {
                grid.dispatch(action).unwrap();
            } else if !grid.queue.promote() {
                break;
            }
            assert!(grid.clues() >= last, "clue count must never decrease");
            last = grid.clues();
        }
    }

    #[test]
    fn test_speculative_clone_tracks_operations_identically() {
        let mut grid = Grid::new();
        grid.assert(CellIndex::new(0, 0), Value::from_digit(1), Reason::InitialClue)
            .unwrap();
        let mut clone = grid.speculative_clone();
        assert_ne!(grid.id(), clone.id());

        for target in [&mut grid, &mut clone] {
            target
                .assert(CellIndex::new(1, 3), Value::from_digit(2), Reason::InitialClue)
                .unwrap();
            target
                .reject(CellIndex::new(8, 8), Value::from_digit(9), Reason::NakedSingle)
                .unwrap();
        }
        testing::assert_same_state(&grid, &clone);
    }

    #[test]
    fn test_speculation_target_prefers_constrained_cells() {
        let mut grid = Grid::with_coloring(false);
        let index = CellIndex::new(6, 2);
        // Leave {3, 5} in one cell; every other cell is untouched.
        for value in Value::ALL {
            if value != Value::from_digit(3) && value != Value::from_digit(5) {
                grid.reject(index, value, Reason::NakedSingle).unwrap();
            }
        }

        let (target, value) = grid.speculation_target().unwrap();
        assert_eq!(target, index);
        assert_eq!(value, Value::from_digit(3), "lowest Maybe value wins");
    }

    #[test]
    fn test_solution_requires_all_cells_decided() {
        let grid = Grid::new();
        assert_eq!(grid.solution(), None);
    }
}
