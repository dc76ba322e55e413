//! Execution of queued deduction work.
//!
//! Each routine re-checks its precondition before acting: queue entries
//! scheduled earlier may have decided or rejected the cells it was built
//! from, in which case it degrades to a no-op.

use sudoku_core::{CellIndex, GroupId, Value};

use crate::cell::ValueState;
use crate::error::SolverError;
use crate::grid::Grid;
use crate::queue::{Action, Priority};
use crate::reason::Reason;

impl Grid {
    /// Runs one dequeued work item.
    pub(crate) fn dispatch(&mut self, action: Action) -> Result<(), SolverError> {
        match action {
            Action::DirectExclusion {
                asserted,
                target,
                value,
            } => self.reject(target, value, Reason::DirectExclusion { asserted }),
            Action::HiddenSingle { group, value } => self.hidden_single(group, value),
            Action::NakedSingle { cell } => self.naked_single(cell),
            Action::NakedPairScan { cell } => self.naked_pair_scan(cell),
            Action::NakedTripleScan { cell } => self.naked_triple_scan(cell),
            Action::PairExclusion {
                pair,
                target,
                values,
            } => self.pair_exclusion(pair, target, values),
            Action::TripleExclusion {
                triple,
                target,
                values,
            } => self.triple_exclusion(triple, target, values),
            Action::ExcludeComplement {
                source,
                target,
                value,
                count,
            } => self.exclude_complement(source, target, value, count),
            Action::Color { group, value } => self.color_group(group, value),
            Action::ColoringConflict {
                cell,
                value,
                coloring,
            } => self.reject(cell, value, Reason::ColoringConflict { coloring }),
        }
    }

    /// Asserts `value` in whichever cells of the group still hold it as a
    /// Maybe. When the group's count was genuinely reduced to one, a single
    /// cell survives; asserting more than one surfaces as a contradiction
    /// through the queued direct exclusions.
    fn hidden_single(&mut self, group: GroupId, value: Value) -> Result<(), SolverError> {
        for cell in group.cells() {
            if self.cells[cell.grid_index()].state(value) == ValueState::Maybe {
                self.assert(cell, value, Reason::HiddenSingle { group })?;
            }
        }
        Ok(())
    }

    /// Asserts the sole remaining candidate of the cell. A no-op on decided
    /// cells (asserting their value again changes nothing).
    fn naked_single(&mut self, cell: CellIndex) -> Result<(), SolverError> {
        match self.cells[cell.grid_index()].candidates.single() {
            Some(value) => self.assert(cell, value, Reason::NakedSingle),
            None => Ok(()),
        }
    }

    /// Looks for a same-group cell restricted to the same two candidates as
    /// `cell`; every third cell of such a group gets a per-rejection
    /// Immediate exclusion so the pair is applied before further deferred
    /// work.
    fn naked_pair_scan(&mut self, cell: CellIndex) -> Result<(), SolverError> {
        let pivot = &self.cells[cell.grid_index()];
        if pivot.maybes != 2 {
            return Ok(());
        }
        let candidates = pivot.candidates;
        let pair: Vec<Value> = candidates.iter().collect();
        debug_assert_eq!(pair.len(), 2);

        for group in cell.groups() {
            for partner in group.cells() {
                if partner != cell && self.cells[partner.grid_index()].candidates == candidates {
                    for target in group.cells() {
                        if target != cell && target != partner {
                            self.queue.push(
                                Priority::Immediate,
                                Action::PairExclusion {
                                    pair: [cell, partner],
                                    target,
                                    values: [pair[0], pair[1]],
                                },
                            );
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn pair_exclusion(
        &mut self,
        pair: [CellIndex; 2],
        target: CellIndex,
        values: [Value; 2],
    ) -> Result<(), SolverError> {
        for value in values {
            if self.cells[target.grid_index()].state(value) == ValueState::Maybe {
                self.reject(
                    target,
                    value,
                    Reason::NakedPair {
                        values,
                        cells: pair,
                    },
                )?;
            }
        }
        Ok(())
    }

    /// Looks for groups in which exactly three undecided cells (including
    /// `cell`) are confined to `cell`'s three candidates; the rest of such a
    /// group gets per-rejection Immediate exclusions.
    fn naked_triple_scan(&mut self, cell: CellIndex) -> Result<(), SolverError> {
        let pivot = &self.cells[cell.grid_index()];
        if pivot.maybes != 3 {
            return Ok(());
        }
        let candidates = pivot.candidates;
        let values: Vec<Value> = candidates.iter().collect();
        debug_assert_eq!(values.len(), 3);

        for group in cell.groups() {
            let mut members = vec![cell];
            for other in group.cells() {
                let state = &self.cells[other.grid_index()];
                if other != cell && state.value.is_none() && state.candidates.is_subset(candidates)
                {
                    members.push(other);
                }
            }
            if members.len() == 3 {
                let triple = [members[0], members[1], members[2]];
                for target in group.cells() {
                    if !members.contains(&target) {
                        self.queue.push(
                            Priority::Immediate,
                            Action::TripleExclusion {
                                triple,
                                target,
                                values: [values[0], values[1], values[2]],
                            },
                        );
                    }
                }
            }
        }
        Ok(())
    }

    fn triple_exclusion(
        &mut self,
        triple: [CellIndex; 3],
        target: CellIndex,
        values: [Value; 3],
    ) -> Result<(), SolverError> {
        for value in values {
            if self.cells[target.grid_index()].state(value) == ValueState::Maybe {
                self.reject(
                    target,
                    value,
                    Reason::NakedTriple {
                        values,
                        cells: triple,
                    },
                )?;
            }
        }
        Ok(())
    }

    /// Block-line interaction. If exactly `count` of `source`'s candidates
    /// for `value` lie in its intersection with `target`, then `value` must
    /// land in the intersection, and the rest of `target` can drop it.
    ///
    /// `count` was `source`'s candidate count at scheduling time; counts only
    /// shrink, so a match at execution time proves the candidates are still
    /// confined to the intersection.
    fn exclude_complement(
        &mut self,
        source: GroupId,
        target: GroupId,
        value: Value,
        count: u8,
    ) -> Result<(), SolverError> {
        let source_cells = self.groups[source.index()].value_cells(value);
        let target_mask = self.groups[target.index()].mask;
        if (source_cells & target_mask).len() != count as usize {
            return Ok(());
        }

        let outside = self.groups[target.index()]
            .value_cells(value)
            .difference(self.groups[source.index()].mask);
        for grid_index in outside {
            self.reject(
                CellIndex::from_grid_index(grid_index as usize),
                value,
                Reason::ExcludeComplement {
                    group: target,
                    intersecting: source,
                },
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    fn reject_all_but(grid: &mut Grid, cell: CellIndex, keep: &[u8]) {
        for value in Value::ALL {
            if !keep.contains(&value.digit()) {
                grid.reject(cell, value, Reason::NakedSingle).unwrap();
            }
        }
    }

    #[test]
    fn test_hidden_single_asserts_last_candidate_in_row() {
        let mut grid = Grid::with_coloring(false);
        let value = Value::from_digit(7);

        // Remove 7 from every row-0 cell except the last.
        for column in 0..8 {
            grid.reject(CellIndex::new(0, column), value, Reason::NakedSingle)
                .unwrap();
        }
        grid.propagate().unwrap();

        assert_eq!(grid.value(CellIndex::new(0, 8)), Some(value));
        testing::assert_invariants(&grid);
    }

    #[test]
    fn test_naked_pair_excludes_pair_values_from_group() {
        let mut grid = Grid::with_coloring(false);
        let first = CellIndex::new(0, 0);
        let second = CellIndex::new(0, 4);
        let third = CellIndex::new(0, 8);

        // Two cells restricted to {1,2}; a third holds {1,3,4}.
        reject_all_but(&mut grid, first, &[1, 2]);
        reject_all_but(&mut grid, second, &[1, 2]);
        reject_all_but(&mut grid, third, &[1, 3, 4]);
        grid.propagate().unwrap();

        // The pair forces 1 out of the third cell before any speculation.
        let candidates = grid.candidates(third);
        assert!(!candidates.contains(Value::from_digit(1)));
        assert!(candidates.contains(Value::from_digit(3)));
        assert!(candidates.contains(Value::from_digit(4)));

        // And out of the rest of the row.
        for column in [1, 2, 3, 5, 6, 7] {
            let candidates = grid.candidates(CellIndex::new(0, column));
            assert!(!candidates.contains(Value::from_digit(1)));
            assert!(!candidates.contains(Value::from_digit(2)));
        }
        testing::assert_invariants(&grid);
    }

    #[test]
    fn test_naked_triple_excludes_triple_values_from_group() {
        let mut grid = Grid::with_coloring(false);
        let members = [
            CellIndex::new(0, 0),
            CellIndex::new(0, 4),
            CellIndex::new(0, 8),
        ];
        for member in members {
            reject_all_but(&mut grid, member, &[1, 2, 3]);
        }
        grid.propagate().unwrap();

        for column in [1, 2, 3, 5, 6, 7] {
            let candidates = grid.candidates(CellIndex::new(0, column));
            for digit in [1, 2, 3] {
                assert!(
                    !candidates.contains(Value::from_digit(digit)),
                    "column {column} must lose {digit}"
                );
            }
        }
        for member in members {
            assert_eq!(grid.candidates(member).len(), 3);
        }
        testing::assert_invariants(&grid);
    }

    #[test]
    fn test_exclude_complement_prunes_rest_of_line() {
        let mut grid = Grid::with_coloring(false);
        let value = Value::from_digit(5);

        // Confine block 0's candidates for 5 to its top row.
        for cell in [
            CellIndex::new(1, 0),
            CellIndex::new(1, 1),
            CellIndex::new(1, 2),
            CellIndex::new(2, 0),
            CellIndex::new(2, 1),
            CellIndex::new(2, 2),
        ] {
            grid.reject(cell, value, Reason::NakedSingle).unwrap();
        }
        // Dropping (0,0) leaves two candidates, both in row 0.
        grid.reject(CellIndex::new(0, 0), value, Reason::NakedSingle)
            .unwrap();
        grid.propagate().unwrap();

        // 5 in block 0 must be at (0,1) or (0,2), so the rest of row 0
        // cannot hold it.
        for column in 3..9 {
            assert!(
                !grid.candidates(CellIndex::new(0, column)).contains(value),
                "column {column} of row 0 must lose 5"
            );
        }
        assert!(grid.candidates(CellIndex::new(0, 1)).contains(value));
        assert!(grid.candidates(CellIndex::new(0, 2)).contains(value));
        // Cells outside block 0 and row 0 are untouched.
        assert!(grid.candidates(CellIndex::new(3, 0)).contains(value));
        testing::assert_invariants(&grid);
    }

    #[test]
    fn test_stale_scan_degrades_to_noop() {
        let mut grid = Grid::with_coloring(false);
        let cell = CellIndex::new(4, 4);
        reject_all_but(&mut grid, cell, &[1, 2]);

        // Decide the cell before its pair scan runs; the scan must no-op.
        grid.assert(cell, Value::from_digit(1), Reason::InitialClue)
            .unwrap();
        grid.propagate().unwrap();

        assert_eq!(grid.value(cell), Some(Value::from_digit(1)));
        testing::assert_invariants(&grid);
    }
}
