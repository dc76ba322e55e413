//! Coloring: chains of two-candidate links for a single value.
//!
//! Two cells are linked when they are the only two cells of one group that
//! can still hold the value; exactly one of them does. Links are transitive,
//! so a connected chain partitions into two polarities ("on" and "off"), of
//! which exactly one is true. Any cell whose neighbourhood intersects both
//! polarities can never hold the value, whichever polarity wins.

use log::debug;
use sudoku_core::{BitSet81, CellIndex, GroupId, Value};

use std::fmt::{self, Display};

use crate::error::{Contradiction, SolverError};
use crate::grid::Grid;
use crate::queue::{Action, Priority};

/// Identifier of a [`Coloring`], allocated per grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColoringId(u32);

impl ColoringId {
    pub(crate) const fn new(id: u32) -> Self {
        Self(id)
    }
}

impl Display for ColoringId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One connected chain of two-candidate links for a single value.
///
/// `on` and `off` are the two disjoint polarity sets. Each neighbourhood is
/// the union of its members' candidate-neighbourhoods for the chain's value;
/// a cell landing in both neighbourhoods is removed from the chain and
/// rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Coloring {
    pub(crate) id: ColoringId,
    pub(crate) on: BitSet81,
    pub(crate) off: BitSet81,
    pub(crate) on_neighbourhood: BitSet81,
    pub(crate) off_neighbourhood: BitSet81,
}

impl Coloring {
    pub(crate) fn is_on(&self, cell: CellIndex) -> bool {
        self.on.contains(cell.grid_index() as u8)
    }
}

impl Grid {
    /// Executes a queued `Color` action: links the two remaining candidate
    /// cells of `group` for `value`. A no-op unless exactly two remain.
    pub(crate) fn color_group(&mut self, group: GroupId, value: Value) -> Result<(), SolverError> {
        let cells = self.groups[group.index()].value_cells(value);
        if cells.len() != 2 {
            return Ok(());
        }
        let mut members = cells.iter();
        let (Some(first), Some(second)) = (members.next(), members.next()) else {
            unreachable!("a two-element set yields two indices");
        };
        self.color(
            CellIndex::from_grid_index(first as usize),
            CellIndex::from_grid_index(second as usize),
            value,
        )
    }

    /// Links `cell1` and `cell2` for `value`.
    ///
    /// Precondition: both cells belong to one group in which they are the
    /// only two possible holders of `value`.
    ///
    /// # Errors
    ///
    /// Returns [`Contradiction::ColoringInconsistency`] when the two cells
    /// already share a coloring with the same polarity.
    pub(crate) fn color(
        &mut self,
        cell1: CellIndex,
        cell2: CellIndex,
        value: Value,
    ) -> Result<(), SolverError> {
        let first = self.cells[cell1.grid_index()].coloring(value);
        let second = self.cells[cell2.grid_index()].coloring(value);
        let id = match (first, second) {
            (None, None) => self.new_coloring(cell1, cell2, value),
            (Some(existing), Some(other)) if existing == other => {
                let coloring = self.coloring(existing);
                if coloring.is_on(cell1) == coloring.is_on(cell2) {
                    debug!(
                        "coloring: contradiction grid={}, coloring={existing}, cell1={cell1}, \
                         cell2={cell2}, value={value}",
                        self.id
                    );
                    return Err(Contradiction::ColoringInconsistency {
                        cell1,
                        cell2,
                        value,
                    }
                    .into());
                }
                // Opposite polarities: the link is already consistent.
                existing
            }
            (Some(existing), None) => self.extend_coloring(existing, cell1, cell2, value),
            (None, Some(existing)) => self.extend_coloring(existing, cell2, cell1, value),
            (Some(kept), Some(discarded)) => {
                self.merge_colorings(kept, discarded, cell1, cell2, value)
            }
        };
        self.apply_conflicts(id, value);
        Ok(())
    }

    /// Detaches every cell that landed in both neighbourhoods and schedules
    /// an Immediate rejection for it: it shares a group with both polarities
    /// and therefore cannot hold the value.
    fn apply_conflicts(&mut self, id: ColoringId, value: Value) {
        let coloring = self.coloring(id);
        let conflicted = coloring.on_neighbourhood & coloring.off_neighbourhood;
        for grid_index in conflicted {
            self.remove_from_coloring(id, CellIndex::from_grid_index(grid_index as usize), value);
        }
    }

    fn remove_from_coloring(&mut self, id: ColoringId, cell: CellIndex, value: Value) {
        let grid_index = cell.grid_index() as u8;
        let coloring = self.coloring_mut(id);
        coloring.on.remove(grid_index);
        coloring.off.remove(grid_index);
        coloring.on_neighbourhood.remove(grid_index);
        coloring.off_neighbourhood.remove(grid_index);
        self.cells[cell.grid_index()].colorings[value.index()] = None;
        self.queue.push(
            Priority::Immediate,
            Action::ColoringConflict {
                cell,
                value,
                coloring: id,
            },
        );
    }

    fn new_coloring(&mut self, cell1: CellIndex, cell2: CellIndex, value: Value) -> ColoringId {
        let id = ColoringId::new(self.next_coloring);
        self.next_coloring += 1;

        let mut members = BitSet81::new();
        members.insert(cell1.grid_index() as u8);
        members.insert(cell2.grid_index() as u8);
        let mut on = BitSet81::new();
        on.insert(cell1.grid_index() as u8);
        let mut off = BitSet81::new();
        off.insert(cell2.grid_index() as u8);

        let coloring = Coloring {
            id,
            on,
            off,
            on_neighbourhood: self.neighbourhood(cell1, value).difference(members),
            off_neighbourhood: self.neighbourhood(cell2, value).difference(members),
        };
        self.colorings.insert(id, coloring);
        self.cells[cell1.grid_index()].colorings[value.index()] = Some(id);
        self.cells[cell2.grid_index()].colorings[value.index()] = Some(id);
        debug!(
            "coloring: new coloring grid={}, coloring={id}, cell1={cell1}, cell2={cell2}, \
             value={value}",
            self.id
        );
        id
    }

    /// Adds `added` to `colored`'s chain with the opposite polarity.
    fn extend_coloring(
        &mut self,
        id: ColoringId,
        colored: CellIndex,
        added: CellIndex,
        value: Value,
    ) -> ColoringId {
        let neighbourhood = self.neighbourhood(added, value);
        let grid_index = added.grid_index() as u8;
        let coloring = self.coloring_mut(id);
        if coloring.is_on(colored) {
            coloring.off.insert(grid_index);
            coloring.off_neighbourhood |= neighbourhood;
            coloring.on_neighbourhood.remove(grid_index);
        } else {
            coloring.on.insert(grid_index);
            coloring.on_neighbourhood |= neighbourhood;
            coloring.off_neighbourhood.remove(grid_index);
        }
        self.cells[added.grid_index()].colorings[value.index()] = Some(id);
        debug!(
            "coloring: extension grid={}, coloring={id}, cell1={colored}, cell2={added}, \
             value={value}",
            self.id
        );
        id
    }

    /// Merges `discarded` into `kept` after a link between `cell1` (in
    /// `kept`) and `cell2` (in `discarded`).
    ///
    /// The linked cells must end on opposite sides, so the discarded chain's
    /// polarities flip iff the two cells currently agree.
    fn merge_colorings(
        &mut self,
        kept_id: ColoringId,
        discarded_id: ColoringId,
        cell1: CellIndex,
        cell2: CellIndex,
        value: Value,
    ) -> ColoringId {
        let discarded = self
            .colorings
            .remove(&discarded_id)
            .expect("cell coloring ids resolve to registered colorings");
        let kept = self.coloring_mut(kept_id);

        if kept.is_on(cell1) == discarded.is_on(cell2) {
            kept.on |= discarded.off;
            kept.on_neighbourhood =
                (kept.on_neighbourhood | discarded.off_neighbourhood).difference(discarded.on);
            kept.off |= discarded.on;
            kept.off_neighbourhood =
                (kept.off_neighbourhood | discarded.on_neighbourhood).difference(discarded.off);
        } else {
            kept.on |= discarded.on;
            kept.on_neighbourhood =
                (kept.on_neighbourhood | discarded.on_neighbourhood).difference(discarded.off);
            kept.off |= discarded.off;
            kept.off_neighbourhood =
                (kept.off_neighbourhood | discarded.off_neighbourhood).difference(discarded.on);
        }

        for grid_index in discarded.on | discarded.off {
            self.cells[grid_index as usize].colorings[value.index()] = Some(kept_id);
        }
        debug!(
            "coloring: merge grid={}, kept={kept_id}, discarded={discarded_id}, cell1={cell1}, \
             cell2={cell2}, value={value}",
            self.id
        );
        kept_id
    }

    fn coloring(&self, id: ColoringId) -> &Coloring {
        self.colorings
            .get(&id)
            .expect("cell coloring ids resolve to registered colorings")
    }

    fn coloring_mut(&mut self, id: ColoringId) -> &mut Coloring {
        self.colorings
            .get_mut(&id)
            .expect("cell coloring ids resolve to registered colorings")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reason::Reason;
    use crate::testing;

    /// Removes `value` from every listed (row, column) cell.
    fn reject_cells(grid: &mut Grid, value: Value, cells: &[(u8, u8)]) {
        for &(row, column) in cells {
            grid.reject(CellIndex::new(row, column), value, Reason::NakedSingle)
                .unwrap();
        }
    }

    fn indices(cells: &[(u8, u8)]) -> BitSet81 {
        cells
            .iter()
            .map(|&(row, column)| CellIndex::new(row, column).grid_index() as u8)
            .collect()
    }

    #[test]
    fn test_new_coloring_assigns_opposite_polarities() {
        let mut grid = Grid::new();
        let value = Value::from_digit(5);
        // Row 0 keeps exactly (0,0) and (0,5) as candidates for 5.
        reject_cells(
            &mut grid,
            value,
            &[(0, 1), (0, 2), (0, 3), (0, 4), (0, 6), (0, 7), (0, 8)],
        );
        grid.propagate().unwrap();

        assert_eq!(grid.colorings.len(), 1);
        let coloring = grid.colorings.values().next().unwrap();
        let first = CellIndex::new(0, 0);
        let second = CellIndex::new(0, 5);
        assert_ne!(coloring.is_on(first), coloring.is_on(second));
        assert_eq!(grid.cells[first.grid_index()].coloring(value), Some(coloring.id));
        assert_eq!(grid.cells[second.grid_index()].coloring(value), Some(coloring.id));
        testing::assert_invariants(&grid);
    }

    #[test]
    fn test_merge_aligns_polarities_and_prunes_shared_neighbour() {
        let mut grid = Grid::new();
        let value = Value::from_digit(5);

        // Three two-candidate groups chain four cells together:
        //   row 0: (0,0)-(0,5), row 8: (8,0)-(8,5), column 0: (0,0)-(8,0).
        // Column 5 keeps a third candidate at (4,5).
        reject_cells(
            &mut grid,
            value,
            &[(0, 1), (0, 2), (0, 3), (0, 4), (0, 6), (0, 7), (0, 8)],
        );
        reject_cells(
            &mut grid,
            value,
            &[(8, 1), (8, 2), (8, 3), (8, 4), (8, 6), (8, 7), (8, 8)],
        );
        reject_cells(
            &mut grid,
            value,
            &[(1, 0), (2, 0), (3, 0), (4, 0), (5, 0), (6, 0), (7, 0)],
        );
        reject_cells(
            &mut grid,
            value,
            &[(1, 5), (2, 5), (3, 5), (5, 5), (6, 5), (7, 5)],
        );
        grid.propagate().unwrap();

        // The two chains merged into one, with the column-0 link forcing
        // (0,0) and (8,0) onto opposite sides.
        assert_eq!(grid.colorings.len(), 1);
        let coloring = grid.colorings.values().next().unwrap();
        let on = indices(&[(0, 0), (8, 5)]);
        let off = indices(&[(0, 5), (8, 0)]);
        assert!(
            (coloring.on == on && coloring.off == off)
                || (coloring.on == off && coloring.off == on),
            "unexpected polarity sets: on={:?} off={:?}",
            coloring.on,
            coloring.off
        );

        // (4,5) shares column 5 with both polarities, so it lost the value.
        let victim = CellIndex::new(4, 5);
        assert!(!grid.candidates(victim).contains(value));
        assert_eq!(grid.cells[victim.grid_index()].coloring(value), None);
        testing::assert_invariants(&grid);
    }

    #[test]
    fn test_same_polarity_link_is_a_contradiction() {
        let mut grid = Grid::new();
        let value = Value::from_digit(5);
        reject_cells(
            &mut grid,
            value,
            &[(0, 1), (0, 2), (0, 3), (0, 4), (0, 6), (0, 7), (0, 8)],
        );
        grid.propagate().unwrap();

        let first = CellIndex::new(0, 0);
        let second = CellIndex::new(0, 5);
        // Linking the pair again is consistent (opposite polarities).
        grid.color(first, second, value).unwrap();

        // Force both onto one side, then re-link: same polarity, so the
        // chain is inconsistent.
        let id = grid.cells[first.grid_index()].coloring(value).unwrap();
        let polarity = grid.coloring(id).is_on(first);
        {
            let coloring = grid.coloring_mut(id);
            let grid_index = second.grid_index() as u8;
            if polarity {
                coloring.off.remove(grid_index);
                coloring.on.insert(grid_index);
            } else {
                coloring.on.remove(grid_index);
                coloring.off.insert(grid_index);
            }
        }
        let err = grid.color(first, second, value).unwrap_err();
        assert!(matches!(
            err,
            SolverError::Contradiction(Contradiction::ColoringInconsistency { .. })
        ));
    }

    #[test]
    fn test_chain_conflict_rejects_cell_seeing_both_polarities() {
        let mut grid = Grid::new();
        let value = Value::from_digit(5);

        // Chain for 5: (0,0)-(0,6) in row 0, (0,0)-(7,0) in column 0,
        // (0,6)-(4,6) in column 6, (7,0)-(7,7) in row 7. The victim (1,7)
        // shares block 2 with (0,6) and column 7 with (7,7) -- opposite
        // polarities once the chain is threaded.
        reject_cells(
            &mut grid,
            value,
            &[(0, 1), (0, 2), (0, 3), (0, 4), (0, 5), (0, 7), (0, 8)],
        );
        reject_cells(&mut grid, value, &[(1, 6), (1, 8), (2, 6), (2, 7)]);
        reject_cells(
            &mut grid,
            value,
            &[(1, 0), (2, 0), (3, 0), (4, 0), (5, 0), (6, 0), (8, 0)],
        );
        reject_cells(&mut grid, value, &[(3, 6), (5, 6), (6, 6), (7, 6), (8, 6)]);
        reject_cells(
            &mut grid,
            value,
            &[(7, 1), (7, 2), (7, 3), (7, 4), (7, 5), (7, 8)],
        );
        reject_cells(&mut grid, value, &[(3, 7), (4, 7), (6, 7), (8, 7)]);
        grid.propagate().unwrap();

        // The victim was rejected with a coloring conflict and detached.
        let victim = CellIndex::new(1, 7);
        assert!(!grid.candidates(victim).contains(value));
        assert_eq!(grid.cells[victim.grid_index()].coloring(value), None);

        // One chain absorbed every link.
        assert_eq!(grid.colorings.len(), 1);
        let coloring = grid.colorings.values().next().unwrap();
        let on = indices(&[(0, 0), (4, 6), (7, 7), (2, 8)]);
        let off = indices(&[(0, 6), (7, 0), (5, 7)]);
        assert!(
            (coloring.on == on && coloring.off == off)
                || (coloring.on == off && coloring.off == on),
            "unexpected polarity sets: on={:?} off={:?}",
            coloring.on,
            coloring.off
        );

        // Follow-up waves: cells seeing both polarities through (5,7) and
        // (2,8) lost the value as well.
        for cell in [(4, 8), (3, 8), (5, 8)] {
            assert!(
                !grid
                    .candidates(CellIndex::new(cell.0, cell.1))
                    .contains(value),
                "{cell:?} must lose the value"
            );
        }
        testing::assert_invariants(&grid);
    }
}
