//! Why a value was asserted or rejected.

use std::fmt::{self, Display};

use sudoku_core::{CellIndex, GroupId, Value};

use crate::coloring::ColoringId;

/// The deduction (or external event) behind an `assert` or `reject`.
///
/// Rendered into every log line and into per-puzzle diagnostics; the wording
/// follows the original log stream, so "Hidden Single", "Naked Pair", and
/// "Coloring conflict" are greppable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    /// A clue from the input stream.
    InitialClue,
    /// A speculative assertion made by the backtracking controller.
    Guess,
    /// The controller refuted a guess on a clone of the grid.
    GuessRefuted,
    /// The value was asserted in a same-group cell.
    DirectExclusion {
        /// The cell that was asserted.
        asserted: CellIndex,
    },
    /// Only one cell of the group can still hold the value.
    HiddenSingle {
        /// The group scanned.
        group: GroupId,
    },
    /// The cell has a single remaining candidate.
    NakedSingle,
    /// Two same-group cells share the same two candidates.
    NakedPair {
        /// The pair of values.
        values: [Value; 2],
        /// The two cells restricted to the pair.
        cells: [CellIndex; 2],
    },
    /// Three same-group cells are confined to the same three candidates.
    NakedTriple {
        /// The triple of values.
        values: [Value; 3],
        /// The three cells confined to the triple.
        cells: [CellIndex; 3],
    },
    /// All of a group's candidates for the value lie in its intersection
    /// with another group.
    ExcludeComplement {
        /// The group being pruned.
        group: GroupId,
        /// The group whose candidates are confined to the intersection.
        intersecting: GroupId,
    },
    /// The cell neighbours both polarities of a coloring chain.
    ColoringConflict {
        /// The chain's id.
        coloring: ColoringId,
    },
}

impl Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InitialClue => write!(f, "initial state"),
            Self::Guess => write!(f, "guess"),
            Self::GuessRefuted => write!(f, "guess refuted"),
            Self::DirectExclusion { asserted } => {
                write!(f, "Direct Exclusion by {asserted}")
            }
            Self::HiddenSingle { group } => write!(f, "Hidden Single in {group}"),
            Self::NakedSingle => write!(f, "Naked Single"),
            Self::NakedPair { values, cells } => write!(
                f,
                "Naked Pair ({},{}) @ {}, {}",
                values[0], values[1], cells[0], cells[1]
            ),
            Self::NakedTriple { values, cells } => write!(
                f,
                "Naked Triple ({},{},{}) @ ({}, {}, {})",
                values[0], values[1], values[2], cells[0], cells[1], cells[2]
            ),
            Self::ExcludeComplement {
                group,
                intersecting,
            } => write!(
                f,
                "Exclude Complement of {group}'s intersection with {intersecting}"
            ),
            Self::ColoringConflict { coloring } => {
                write!(f, "Coloring conflict: coloring={coloring}")
            }
        }
    }
}
