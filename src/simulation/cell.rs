use crate::config::NO_HIGHLIGHT;

/// A single grid unit addressed by `(col, row)`.
///
/// Cells are plain values: two cells are the same cell iff both components
/// match. Stores key them by their packed arena index (see
/// [`GridCoordinate::index_of`](crate::simulation::GridCoordinate::index_of)).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    pub col: u32,
    pub row: u32,
}

impl Cell {
    pub const fn new(col: u32, row: u32) -> Self {
        Self { col, row }
    }

    /// Manhattan distance to `other`, in cells
    pub fn manhattan(&self, other: Cell) -> u32 {
        self.col.abs_diff(other.col) + self.row.abs_diff(other.row)
    }
}

/// Encode an optional cell into a single u32 for the GPU:
/// - High 16 bits: col
/// - Low 16 bits: row
///
/// Returns NO_HIGHLIGHT for None
pub fn encode_cell(cell: Option<Cell>) -> u32 {
    match cell {
        Some(Cell { col, row }) => (col << 16) | (row & 0xFFFF),
        None => NO_HIGHLIGHT,
    }
}

/// Decode a cell packed by [`encode_cell`]
pub fn decode_cell(encoded: u32) -> Option<Cell> {
    if encoded == NO_HIGHLIGHT {
        None
    } else {
        Some(Cell::new(encoded >> 16, encoded & 0xFFFF))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_equality() {
        assert_eq!(Cell::new(3, 4), Cell { col: 3, row: 4 });
        assert_ne!(Cell::new(3, 4), Cell::new(4, 3));
    }

    #[test]
    fn test_manhattan() {
        let c = Cell::new(5, 5);
        assert_eq!(c.manhattan(Cell::new(5, 5)), 0);
        assert_eq!(c.manhattan(Cell::new(6, 5)), 1);
        assert_eq!(c.manhattan(Cell::new(4, 6)), 2);
        assert_eq!(c.manhattan(Cell::new(5, 3)), 2);
    }

    #[test]
    fn test_encode_decode() {
        let cell = Cell::new(49, 12);
        assert_eq!(encode_cell(Some(cell)), (49 << 16) | 12);
        assert_eq!(decode_cell(encode_cell(Some(cell))), Some(cell));
    }

    #[test]
    fn test_no_highlight() {
        let encoded = encode_cell(None);
        assert_eq!(encoded, NO_HIGHLIGHT);
        assert_eq!(decode_cell(encoded), None);
    }

    #[test]
    fn test_largest_addressable_cell() {
        // (0xFFFF, 0xFFFF) would collide with NO_HIGHLIGHT, which is why grids
        // are capped at MAX_GRID_CELLS cells per side
        let cell = Cell::new(0xFFFE, 0xFFFE);
        assert_eq!(decode_cell(encode_cell(Some(cell))), Some(cell));
    }
}
