//! Line-oriented puzzle stream reader.

use std::io::BufRead;

use sudoku_core::{CellIndex, Puzzle, Value};
use thiserror::Error;

/// Errors raised while reading the puzzle stream.
#[derive(Debug, Error)]
pub enum ReadError {
    /// End of input with a partial puzzle buffered.
    #[error("truncated input")]
    TruncatedInput,

    /// A character outside `1-9`, `.`, and `0`.
    #[error("invalid cell value: {puzzle}: {ch}")]
    InvalidCell {
        /// 1-based ordinal of the offending puzzle.
        puzzle: usize,
        /// The offending character.
        ch: char,
    },

    /// The underlying stream failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Reads puzzles from a line-oriented stream.
///
/// Cell characters accumulate across lines until 81 are buffered; residue
/// past 81 starts the next puzzle. Whitespace within a line is stripped,
/// lines starting with `#` are comments, and blank lines are skipped.
#[derive(Debug)]
pub struct PuzzleReader<R> {
    input: R,
    overflow: Vec<char>,
    puzzles: usize,
}

impl<R: BufRead> PuzzleReader<R> {
    /// Creates a reader over `input`.
    pub fn new(input: R) -> Self {
        Self {
            input,
            overflow: Vec::new(),
            puzzles: 0,
        }
    }

    /// Number of puzzles read so far.
    pub fn puzzles_read(&self) -> usize {
        self.puzzles
    }

    /// Reads the next puzzle, or `Ok(None)` at a clean end of input.
    ///
    /// # Errors
    ///
    /// [`ReadError::TruncatedInput`] when input ends mid-puzzle,
    /// [`ReadError::InvalidCell`] for characters outside the cell alphabet,
    /// and [`ReadError::Io`] when the stream fails.
    pub fn read(&mut self) -> Result<Option<Puzzle>, ReadError> {
        let mut buffer = std::mem::take(&mut self.overflow);
        let mut line = String::new();
        while buffer.len() < 81 {
            line.clear();
            if self.input.read_line(&mut line)? == 0 {
                if buffer.is_empty() {
                    return Ok(None);
                }
                return Err(ReadError::TruncatedInput);
            }
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            buffer.extend(trimmed.chars().filter(|ch| !ch.is_whitespace()));
        }

        self.puzzles += 1;
        self.overflow = buffer.split_off(81);

        let mut puzzle = Puzzle::new();
        for (i, ch) in buffer.into_iter().enumerate() {
            match ch {
                '.' | '0' => {}
                '1'..='9' => puzzle.set(
                    CellIndex::from_grid_index(i),
                    Value::from_digit(ch as u8 - b'0'),
                ),
                _ => {
                    return Err(ReadError::InvalidCell {
                        puzzle: self.puzzles,
                        ch,
                    });
                }
            }
        }
        Ok(Some(puzzle))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    const CLASSIC: &str =
        "53..7....6..195....98....6.8...6...34..8.3..17...2...6.6....28....419..5....8..79";

    fn reader(text: &str) -> PuzzleReader<Cursor<&str>> {
        PuzzleReader::new(Cursor::new(text))
    }

    #[test]
    fn test_reads_single_line_puzzle() {
        let mut reader = reader(CLASSIC);
        let puzzle = reader.read().unwrap().unwrap();
        assert_eq!(puzzle.clues(), 30);
        assert_eq!(
            puzzle.get(CellIndex::new(0, 0)),
            Some(Value::from_digit(5))
        );
        assert_eq!(puzzle.get(CellIndex::new(0, 2)), None);
        assert_eq!(reader.read().unwrap(), None);
        assert_eq!(reader.puzzles_read(), 1);
    }

    #[test]
    fn test_accumulates_across_lines_and_skips_comments() {
        let text = "\
# a puzzle, nine rows with inner spaces

53..7....
6..195...
.98....6.
8...6...3
4..8.3..1
7...2...6
.6....28.
...419..5
....8..79
";
        let mut reader = reader(text);
        let puzzle = reader.read().unwrap().unwrap();
        assert_eq!(puzzle.clues(), 30);
        assert_eq!(reader.read().unwrap(), None);
    }

    #[test]
    fn test_residue_past_81_starts_next_puzzle() {
        let doubled = format!("{CLASSIC}{CLASSIC}\n");
        let mut reader = reader(&doubled);
        let first = reader.read().unwrap().unwrap();
        let second = reader.read().unwrap().unwrap();
        assert_eq!(first, second);
        assert_eq!(reader.puzzles_read(), 2);
        assert_eq!(reader.read().unwrap(), None);
    }

    #[test]
    fn test_zero_and_dot_both_mean_unknown() {
        let text = format!("{}\n", CLASSIC.replace('.', "0"));
        let with_zeroes = reader(&text).read().unwrap().unwrap();
        let with_dots = reader(CLASSIC).read().unwrap().unwrap();
        assert_eq!(with_zeroes, with_dots);
    }

    #[test]
    fn test_truncated_input() {
        let mut reader = reader("53..7....\n");
        assert!(matches!(reader.read(), Err(ReadError::TruncatedInput)));
    }

    #[test]
    fn test_invalid_cell_character() {
        let text = format!("{}x\n", &CLASSIC[..80]);
        let mut reader = reader(&text);
        let err = reader.read().unwrap_err();
        assert!(matches!(
            err,
            ReadError::InvalidCell { puzzle: 1, ch: 'x' }
        ));
    }
}
