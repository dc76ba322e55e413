//! Queue-driven constraint propagation engine for 9×9 sudoku.
//!
//! The engine maintains a partially decided [`Grid`] whose two canonical
//! mutations, [`Grid::assert`] and [`Grid::reject`], enqueue deduction
//! heuristics on a two-level priority queue: direct exclusions, hidden and
//! naked singles, naked pairs and triples, block-line interactions, and an
//! optional coloring layer that threads chains of two-candidate links. When
//! deduction stalls, the [`Solver`] speculates on a cloned grid and, unless
//! disabled, verifies that the solution it finds is unique.
//!
//! # Example
//!
//! ```
//! use sudoku_solver::{Solver, testing};
//!
//! let solver = Solver::default();
//! let mut grid = testing::parse_grid(
//!     "53..7....6..195....98....6.8...6...34..8.3..17...2...6.6....28....419..5....8..79",
//! );
//! assert!(solver.solve(&mut grid)?);
//! assert_eq!(
//!     grid.solution().unwrap().to_string(),
//!     "534678912672195348198342567859761423426853791713924856961537284287419635345286179",
//! );
//! # Ok::<(), sudoku_solver::SolverError>(())
//! ```

mod cell;
mod coloring;
mod group;
mod heuristics;
mod queue;

pub mod error;
pub mod grid;
pub mod reason;
pub mod solver;
pub mod testing;

pub use self::coloring::ColoringId;
pub use self::error::{Ambiguity, Contradiction, SolverError};
pub use self::grid::{Grid, Solution};
pub use self::reason::Reason;
pub use self::solver::{Solver, SolverOptions};
