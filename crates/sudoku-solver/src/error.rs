//! Engine error types.
//!
//! Only [`Contradiction`] is ever recovered from, and only by the
//! backtracking controller at the speculation boundary; everything else
//! surfaces to the caller.

use sudoku_core::{CellIndex, Value};
use thiserror::Error;

use crate::grid::Solution;

/// A logical inconsistency reached through propagation or an illegal
/// mutation.
///
/// The messages keep the 1-based rendering of values and cells used by the
/// log stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Contradiction {
    /// Asserting a value that was previously rejected in the cell.
    #[error("attempted to assert {value} @ {cell}, but this value was previously rejected")]
    ValueRejected {
        /// The cell being asserted.
        cell: CellIndex,
        /// The value being asserted.
        value: Value,
    },

    /// Asserting a value into a cell already decided differently.
    #[error(
        "contradictory assertion: already asserted {existing} @ {cell}, now trying to assert {value}"
    )]
    ConflictingAssertion {
        /// The cell being asserted.
        cell: CellIndex,
        /// The value the cell already holds.
        existing: Value,
        /// The value being asserted.
        value: Value,
    },

    /// Rejecting the value a cell is decided on.
    #[error("attempt to reject value={value} @ {cell}, but this value was previously asserted")]
    ValueAsserted {
        /// The cell being rejected.
        cell: CellIndex,
        /// The value being rejected.
        value: Value,
    },

    /// A rejection left the cell with no possible value.
    #[error("no candidate values remain @ {cell}")]
    NoCandidates {
        /// The emptied cell.
        cell: CellIndex,
    },

    /// Two cells of one coloring chain were linked with the same polarity.
    #[error("coloring inconsistency: {cell1} and {cell2} hold the same polarity for value={value}")]
    ColoringInconsistency {
        /// First linked cell.
        cell1: CellIndex,
        /// Second linked cell.
        cell2: CellIndex,
        /// The chain's value.
        value: Value,
    },
}

/// The two witness solutions of an ambiguous puzzle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ambiguity {
    /// The solution found by speculation.
    pub first: Solution,
    /// The distinct solution found by the uniqueness check.
    pub second: Solution,
}

/// Errors surfaced by the solver.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolverError {
    /// The grid is inconsistent; on the initial grid this means the puzzle is
    /// unsolvable.
    #[error(transparent)]
    Contradiction(#[from] Contradiction),

    /// Uniqueness verification found a second solution. Carries both
    /// witnesses.
    #[error("ambiguous puzzle: two distinct solutions exist")]
    Ambiguity(Box<Ambiguity>),

    /// Fewer than the minimum 17 clues; the solve is refused outright.
    #[error("too few clues ({clues}) to attempt a solution")]
    InsufficientClues {
        /// The number of clues present.
        clues: usize,
    },
}
