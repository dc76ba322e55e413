//! Static topology of the 9×9 grid.
//!
//! Eighty-one cells, addressed by row and column, each belonging to exactly
//! three of the 27 groups: its row, its column, and its 3×3 block. Groups
//! are numbered rows first (0-8), then columns (9-17), then blocks (18-26).

use std::fmt::{self, Display};

/// A cell position, addressed by row and column (both 0-8).
///
/// # Examples
///
/// ```
/// use sudoku_core::{CellIndex, GroupId};
///
/// let index = CellIndex::new(4, 7);
/// assert_eq!(index.grid_index(), 43);
/// assert_eq!(index.block_group(), GroupId::Block { index: 5 });
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellIndex {
    row: u8,
    column: u8,
}

impl CellIndex {
    /// Creates a cell index.
    ///
    /// # Panics
    ///
    /// Panics if `row` or `column` is 9 or greater.
    #[must_use]
    pub const fn new(row: u8, column: u8) -> Self {
        assert!(row < 9 && column < 9, "row and column must be 0-8");
        Self { row, column }
    }

    /// Creates a cell index from a row-major grid index (0-80).
    ///
    /// # Panics
    ///
    /// Panics if `index` is 81 or greater.
    #[must_use]
    pub const fn from_grid_index(index: usize) -> Self {
        assert!(index < 81, "grid index must be 0-80");
        Self {
            row: (index / 9) as u8,
            column: (index % 9) as u8,
        }
    }

    /// Iterates over all 81 cells in row-major order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..81).map(Self::from_grid_index)
    }

    /// Returns the row-major grid index (0-80).
    #[must_use]
    pub const fn grid_index(self) -> usize {
        self.row as usize * 9 + self.column as usize
    }

    /// Returns the row (0-8).
    #[must_use]
    pub const fn row(self) -> u8 {
        self.row
    }

    /// Returns the column (0-8).
    #[must_use]
    pub const fn column(self) -> u8 {
        self.column
    }

    /// Returns the cell's row group.
    #[must_use]
    pub const fn row_group(self) -> GroupId {
        GroupId::Row { index: self.row }
    }

    /// Returns the cell's column group.
    #[must_use]
    pub const fn column_group(self) -> GroupId {
        GroupId::Column { index: self.column }
    }

    /// Returns the cell's block group.
    #[must_use]
    pub const fn block_group(self) -> GroupId {
        GroupId::Block {
            index: (self.row / 3) * 3 + self.column / 3,
        }
    }

    /// Returns the three groups the cell belongs to, row first.
    #[must_use]
    pub const fn groups(self) -> [GroupId; 3] {
        [self.row_group(), self.column_group(), self.block_group()]
    }
}

impl Display for CellIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let block = (self.row / 3) * 3 + self.column / 3;
        write!(
            f,
            "(Row:{}, Column:{}, Block:{})",
            self.row + 1,
            self.column + 1,
            block + 1
        )
    }
}

/// One of the 27 constraint groups: a row, a column, or a 3×3 block.
///
/// Blocks are numbered 0-8 left to right, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupId {
    /// A row, identified by its row index (0-8).
    Row {
        /// Row index (0-8).
        index: u8,
    },
    /// A column, identified by its column index (0-8).
    Column {
        /// Column index (0-8).
        index: u8,
    },
    /// A 3×3 block, identified by its block index (0-8).
    Block {
        /// Block index (0-8).
        index: u8,
    },
}

impl GroupId {
    /// All 27 groups in numbering order: rows, then columns, then blocks.
    pub const ALL: [Self; 27] = {
        let mut all = [Self::Row { index: 0 }; 27];
        let mut i = 0;
        while i < 9 {
            let index = i as u8;
            all[i] = Self::Row { index };
            all[i + 9] = Self::Column { index };
            all[i + 18] = Self::Block { index };
            i += 1;
        }
        all
    };

    /// Returns the group's number: rows are 0-8, columns 9-17, blocks 18-26.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Row { index } => index as usize,
            Self::Column { index } => 9 + index as usize,
            Self::Block { index } => 18 + index as usize,
        }
    }

    /// Returns the group with the given number (0-26).
    ///
    /// # Panics
    ///
    /// Panics if `index` is 27 or greater.
    #[must_use]
    pub const fn from_index(index: usize) -> Self {
        assert!(index < 27, "group index must be 0-26");
        let i = (index % 9) as u8;
        match index / 9 {
            0 => Self::Row { index: i },
            1 => Self::Column { index: i },
            _ => Self::Block { index: i },
        }
    }

    /// Returns the group's nine cells in positional order.
    ///
    /// Rows are ordered by column, columns by row, and blocks row-major
    /// within the block.
    #[must_use]
    pub fn cells(self) -> [CellIndex; 9] {
        std::array::from_fn(|i| {
            let i = i as u8;
            match self {
                Self::Row { index } => CellIndex::new(index, i),
                Self::Column { index } => CellIndex::new(i, index),
                Self::Block { index } => {
                    CellIndex::new((index / 3) * 3 + i / 3, (index % 3) * 3 + i % 3)
                }
            }
        })
    }
}

impl Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Row { index } => write!(f, "Row:{}", index + 1),
            Self::Column { index } => write!(f, "Column:{}", index + 1),
            Self::Block { index } => write!(f, "Block:{}", index + 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_index_round_trip() {
        for index in CellIndex::all() {
            assert_eq!(CellIndex::from_grid_index(index.grid_index()), index);
        }
    }

    #[test]
    fn test_group_numbering() {
        let index = CellIndex::new(4, 7);
        assert_eq!(index.row_group().index(), 4);
        assert_eq!(index.column_group().index(), 16);
        assert_eq!(index.block_group().index(), 23);
    }

    #[test]
    fn test_every_cell_belongs_to_three_groups() {
        for cell in CellIndex::all() {
            let mut membership = 0;
            for group in GroupId::ALL {
                if group.cells().contains(&cell) {
                    membership += 1;
                }
            }
            assert_eq!(membership, 3, "cell {cell} must be in exactly 3 groups");
        }
    }

    #[test]
    fn test_group_index_round_trip() {
        for (i, group) in (0..).zip(GroupId::ALL) {
            assert_eq!(group.index(), i);
            assert_eq!(GroupId::from_index(i), group);
        }
    }

    #[test]
    fn test_block_cell_order_is_row_major() {
        let cells = GroupId::Block { index: 4 }.cells();
        assert_eq!(cells[0], CellIndex::new(3, 3));
        assert_eq!(cells[4], CellIndex::new(4, 4));
        assert_eq!(cells[8], CellIndex::new(5, 5));
    }

    #[test]
    fn test_display() {
        assert_eq!(
            CellIndex::new(0, 1).to_string(),
            "(Row:1, Column:2, Block:1)"
        );
        assert_eq!(GroupId::Column { index: 8 }.to_string(), "Column:9");
    }
}
