//! Grid stream writer.

use std::io::{self, Write};
use std::str::FromStr;

use sudoku_core::CellIndex;
use sudoku_solver::Grid;
use thiserror::Error;

/// The error returned for an unknown output format code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("format must be one of: 9., 90, 1., 10")]
pub struct ConfigurationError;

/// Output format: columns per line and the empty-cell character.
///
/// Encoded as a 2-character code: `9` or `1` (nine columns or one line of
/// 81) followed by `.` or `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputFormat {
    columns: usize,
    empty: char,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self {
            columns: 9,
            empty: '.',
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ConfigurationError;

    fn from_str(code: &str) -> Result<Self, ConfigurationError> {
        let &[columns, empty] = code.as_bytes() else {
            return Err(ConfigurationError);
        };
        let columns = match columns {
            b'9' => 9,
            b'1' => 81,
            _ => return Err(ConfigurationError),
        };
        let empty = match empty {
            b'.' => '.',
            b'0' => '0',
            _ => return Err(ConfigurationError),
        };
        Ok(Self { columns, empty })
    }
}

/// Writes grids to the output stream in the configured format.
#[derive(Debug)]
pub struct GridWriter<W> {
    output: W,
    format: OutputFormat,
}

impl<W: Write> GridWriter<W> {
    /// Creates a writer over `output`.
    pub fn new(output: W, format: OutputFormat) -> Self {
        Self { output, format }
    }

    /// Writes the grid's 81 cells in row-major order, wrapping according to
    /// the format's column count. Undecided cells render as the format's
    /// empty-cell character.
    ///
    /// # Errors
    ///
    /// Any error of the underlying stream.
    pub fn write(&mut self, grid: &Grid) -> io::Result<()> {
        for (i, index) in CellIndex::all().enumerate() {
            match grid.value(index) {
                Some(value) => write!(self.output, "{value}")?,
                None => write!(self.output, "{}", self.format.empty)?,
            }
            if (i + 1) % self.format.columns == 0 {
                writeln!(self.output)?;
            }
        }
        Ok(())
    }

    /// Flushes the underlying stream.
    ///
    /// # Errors
    ///
    /// Any error of the underlying stream.
    pub fn flush(&mut self) -> io::Result<()> {
        self.output.flush()
    }
}
