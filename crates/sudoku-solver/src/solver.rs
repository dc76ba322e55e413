//! The solver loop and the backtracking controller.

use log::info;
use sudoku_core::{CellIndex, Value};

use crate::error::{Ambiguity, SolverError};
use crate::grid::Grid;
use crate::reason::Reason;

/// A proper puzzle has at least this many clues; anything lower is refused
/// before any work is done.
const MIN_CLUES: usize = 17;

/// Engine configuration. Everything defaults to on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolverOptions {
    /// Thread two-candidate links into coloring chains.
    pub coloring: bool,
    /// Speculate on a cloned grid when deduction stalls.
    pub backtracking: bool,
    /// Verify that a speculative solution is the only one.
    pub verify_uniqueness: bool,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            coloring: true,
            backtracking: true,
            verify_uniqueness: true,
        }
    }
}

/// Drives a [`Grid`] to completion: drains deduction work, and when that
/// stalls, speculates on a clone and reconciles the outcome.
///
/// # Examples
///
/// ```
/// use sudoku_solver::{Solver, testing};
///
/// let solver = Solver::default();
/// let mut grid = testing::parse_grid(
///     "53..7....6..195....98....6.8...6...34..8.3..17...2...6.6....28....419..5....8..79",
/// );
/// assert!(solver.solve(&mut grid)?);
/// # Ok::<(), sudoku_solver::SolverError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Solver {
    options: SolverOptions,
}

impl Solver {
    /// Creates a solver with the given options.
    #[must_use]
    pub fn new(options: SolverOptions) -> Self {
        Self { options }
    }

    /// The solver's configuration.
    #[must_use]
    pub fn options(&self) -> &SolverOptions {
        &self.options
    }

    /// Solves the grid in place.
    ///
    /// Returns `Ok(true)` when all 81 cells are decided and `Ok(false)` when
    /// deduction stalls with backtracking disabled.
    ///
    /// # Errors
    ///
    /// - [`SolverError::InsufficientClues`] for grids with fewer than 17
    ///   clues, before any deduction is attempted.
    /// - [`SolverError::Contradiction`] when the grid itself is
    ///   inconsistent, meaning the puzzle is unsolvable.
    /// - [`SolverError::Ambiguity`] when uniqueness verification finds a
    ///   second solution.
    pub fn solve(&self, grid: &mut Grid) -> Result<bool, SolverError> {
        if grid.clues() < MIN_CLUES {
            return Err(SolverError::InsufficientClues {
                clues: grid.clues(),
            });
        }
        self.run(grid)
    }

    fn run(&self, grid: &mut Grid) -> Result<bool, SolverError> {
        loop {
            grid.propagate()?;
            if grid.is_solved() {
                return Ok(true);
            }
            if !self.options.backtracking {
                return Ok(false);
            }
            if self.speculate(grid)? {
                return Ok(true);
            }
            // The refuted guess was rejected on the live grid; keep draining.
        }
    }

    /// Asserts the best guess on a clone and reconciles the result: a solved
    /// clone is adopted (after optional uniqueness verification), a
    /// contradicted clone refutes the guess on the live grid.
    fn speculate(&self, grid: &mut Grid) -> Result<bool, SolverError> {
        let Some((cell, value)) = grid.speculation_target() else {
            unreachable!("an unsolved grid always has an undecided cell");
        };
        info!(
            "info: speculating value={value}, cell={cell}, grid={}",
            grid.id()
        );

        let mut trial = grid.speculative_clone();
        let outcome = match trial.assert(cell, value, Reason::Guess) {
            Ok(()) => self.run(&mut trial),
            Err(err) => Err(err),
        };
        match outcome {
            Ok(true) => {
                if self.options.verify_uniqueness {
                    self.verify_unique(grid, &trial, cell, value)?;
                }
                grid.adopt(trial);
                Ok(true)
            }
            Ok(false) => {
                unreachable!("speculative runs cannot stall while backtracking is enabled")
            }
            Err(SolverError::Contradiction(_)) => {
                info!(
                    "info: guess refuted value={value}, cell={cell}, grid={}",
                    grid.id()
                );
                grid.reject(cell, value, Reason::GuessRefuted)?;
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    /// Re-clones the pre-speculation state with the guess rejected and runs
    /// it to completion. A second solution surfaces as [`Ambiguity`] with
    /// both witnesses; a contradiction proves the trial solution unique.
    fn verify_unique(
        &self,
        grid: &Grid,
        trial: &Grid,
        cell: CellIndex,
        value: Value,
    ) -> Result<(), SolverError> {
        let mut counter = grid.speculative_clone();
        let outcome = match counter.reject(cell, value, Reason::GuessRefuted) {
            Ok(()) => self.run(&mut counter),
            Err(err) => Err(err),
        };
        match outcome {
            Ok(true) => {
                let (Some(first), Some(second)) = (trial.solution(), counter.solution()) else {
                    unreachable!("solved grids always render a solution");
                };
                Err(SolverError::Ambiguity(Box::new(Ambiguity { first, second })))
            }
            Ok(false) | Err(SolverError::Contradiction(_)) => Ok(()),
            Err(err) => Err(err),
        }
    }
}
