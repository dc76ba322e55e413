//! A puzzle: the clue values of a 9×9 grid, before any deduction.

use crate::{cell_index::CellIndex, value::Value};

/// The 81 optional clue values of a puzzle, in row-major order.
///
/// This is the interchange type between the stream reader and the solver: the
/// reader fills one in from the input stream, and the solver asserts each
/// clue onto a fresh grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Puzzle {
    cells: [Option<Value>; 81],
}

impl Puzzle {
    /// Creates an empty puzzle.
    #[must_use]
    pub const fn new() -> Self {
        Self { cells: [None; 81] }
    }

    /// Sets the clue at a cell.
    pub fn set(&mut self, index: CellIndex, value: Value) {
        self.cells[index.grid_index()] = Some(value);
    }

    /// Returns the clue at a cell, if any.
    #[must_use]
    pub const fn get(&self, index: CellIndex) -> Option<Value> {
        self.cells[index.grid_index()]
    }

    /// Returns the number of clues.
    #[must_use]
    pub fn clues(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }

    /// Iterates over the clues in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (CellIndex, Value)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(i, cell)| cell.map(|value| (CellIndex::from_grid_index(i), value)))
    }
}

impl Default for Puzzle {
    fn default() -> Self {
        Self::new()
    }
}
