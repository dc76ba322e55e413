//! Core data structures for the sudoku solver.
//!
//! This crate provides the containers and the static grid topology shared by
//! the solver engine and its frontends.
//!
//! # Modules
//!
//! - [`bit_set_81`]: fixed 81-bit set over grid positions
//! - [`candidate_set`]: the candidate values of a single cell
//! - [`cell_index`]: cells, groups, and their membership arithmetic
//! - [`puzzle`]: the clue values of a puzzle
//! - [`value`]: cell value representation

pub mod bit_set_81;
pub mod candidate_set;
pub mod cell_index;
pub mod puzzle;
pub mod value;

pub use self::bit_set_81::{BitSet81, InvalidEncoding};
pub use self::candidate_set::CandidateSet;
pub use self::cell_index::{CellIndex, GroupId};
pub use self::puzzle::Puzzle;
pub use self::value::Value;
