//! Test support: grid construction from text and whole-grid consistency
//! checks.
//!
//! The checks implement the invariants the engine promises at every queue
//! boundary; tests call [`assert_invariants`] after driving a grid through
//! mutations to catch any drift between the materialised state and the
//! truth it mirrors.

use sudoku_core::{BitSet81, CandidateSet, CellIndex, Puzzle, Value};

use crate::cell::ValueState;
use crate::grid::{Grid, Solution};
use crate::solver::SolverOptions;

/// Parses an 81-cell puzzle line (`.` or `0` for blanks, whitespace ignored)
/// and asserts its clues onto a fresh grid with default options.
///
/// # Panics
///
/// Panics on malformed text or directly conflicting clues.
#[track_caller]
pub fn parse_grid(text: &str) -> Grid {
    parse_grid_with(text, &SolverOptions::default())
}

/// Like [`parse_grid`], with explicit options.
///
/// # Panics
///
/// Panics on malformed text or directly conflicting clues.
#[track_caller]
pub fn parse_grid_with(text: &str, options: &SolverOptions) -> Grid {
    let mut puzzle = Puzzle::new();
    let mut cells = 0;
    for ch in text.chars().filter(|ch| !ch.is_whitespace()) {
        assert!(cells < 81, "more than 81 cells in puzzle text");
        match ch {
            '.' | '0' => {}
            '1'..='9' => puzzle.set(
                CellIndex::from_grid_index(cells),
                Value::from_digit(ch as u8 - b'0'),
            ),
            _ => panic!("invalid cell character {ch:?}"),
        }
        cells += 1;
    }
    assert_eq!(cells, 81, "puzzle text must contain 81 cells");
    Grid::from_puzzle(&puzzle, options).expect("puzzle clues must not conflict")
}

/// Checks every invariant the engine maintains across queue boundaries:
/// per-cell counts and states, per-group candidate sets and clue counters,
/// the grid clue counter, and coloring membership.
///
/// # Panics
///
/// Panics on the first violated invariant.
#[track_caller]
pub fn assert_invariants(grid: &Grid) {
    let mut decided = 0;
    for cell in grid.cells.iter() {
        assert_eq!(
            cell.maybes as usize,
            cell.candidates.len(),
            "cell {}: maybes out of sync with candidates",
            cell.index
        );
        match cell.value {
            Some(value) => {
                decided += 1;
                assert_eq!(
                    cell.candidates,
                    CandidateSet::from_elem(value),
                    "decided cell {} must hold only its value",
                    cell.index
                );
                for v in Value::ALL {
                    let expected = if v == value {
                        ValueState::Yes
                    } else {
                        ValueState::No
                    };
                    assert_eq!(
                        cell.state(v),
                        expected,
                        "cell {}: state of {v} out of sync with value",
                        cell.index
                    );
                }
            }
            None => {
                for v in Value::ALL {
                    match cell.state(v) {
                        ValueState::Maybe => assert!(
                            cell.candidates.contains(v),
                            "cell {}: Maybe {v} missing from candidates",
                            cell.index
                        ),
                        ValueState::No => assert!(
                            !cell.candidates.contains(v),
                            "cell {}: rejected {v} still in candidates",
                            cell.index
                        ),
                        ValueState::Yes => {
                            panic!("undecided cell {} has a Yes state", cell.index)
                        }
                    }
                }
            }
        }
    }
    assert_eq!(grid.clues(), decided, "grid clue counter out of sync");

    for group in grid.groups.iter() {
        for value in Value::ALL {
            let mut expected = BitSet81::new();
            for cell in group.id.cells() {
                if grid.cells[cell.grid_index()].state(value) == ValueState::Maybe {
                    expected.insert(cell.grid_index() as u8);
                }
            }
            assert_eq!(
                group.value_cells(value),
                expected,
                "group {}: candidate set for {value} out of sync",
                group.id
            );
        }

        let clues = group
            .id
            .cells()
            .iter()
            .filter(|cell| grid.cells[cell.grid_index()].value.is_some())
            .count();
        assert_eq!(
            group.clues as usize, clues,
            "group {}: clue counter out of sync",
            group.id
        );
    }

    for (id, coloring) in &grid.colorings {
        assert!(
            (coloring.on & coloring.off).is_empty(),
            "coloring {id}: polarities overlap"
        );
        for grid_index in coloring.on | coloring.off {
            let cell = &grid.cells[grid_index as usize];
            assert!(
                cell.colorings.iter().any(|slot| *slot == Some(*id)),
                "coloring {id}: member {} does not point back",
                cell.index
            );
        }
    }
    for cell in grid.cells.iter() {
        for value in Value::ALL {
            if let Some(id) = cell.coloring(value) {
                let coloring = grid
                    .colorings
                    .get(&id)
                    .unwrap_or_else(|| panic!("cell {} references dropped coloring", cell.index));
                let grid_index = cell.index.grid_index() as u8;
                assert!(
                    coloring.on.contains(grid_index) || coloring.off.contains(grid_index),
                    "cell {}: colored for {value} but not a member",
                    cell.index
                );
            }
        }
    }
}

/// Asserts that two grids hold identical cell, group, clue, and coloring
/// state. Grid ids and queue contents are not compared.
///
/// # Panics
///
/// Panics when any compared state differs.
#[track_caller]
pub fn assert_same_state(a: &Grid, b: &Grid) {
    for (left, right) in a.cells.iter().zip(b.cells.iter()) {
        assert_eq!(left, right, "cell {} diverged", left.index);
    }
    for (left, right) in a.groups.iter().zip(b.groups.iter()) {
        assert_eq!(left, right, "group {} diverged", left.id);
    }
    assert_eq!(a.clues(), b.clues(), "clue counters diverged");
    assert_eq!(a.colorings, b.colorings, "colorings diverged");
}

/// Asserts that every row, column, and block of the solution is a
/// permutation of 1-9.
///
/// # Panics
///
/// Panics when any group misses a value.
#[track_caller]
pub fn assert_valid_solution(solution: &Solution) {
    for group in sudoku_core::GroupId::ALL {
        let values: CandidateSet = group.cells().iter().map(|cell| solution.value(*cell)).collect();
        assert_eq!(
            values,
            CandidateSet::FULL,
            "group {group} is not a permutation of 1-9"
        );
    }
}
