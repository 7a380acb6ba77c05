use rand::Rng;

use crate::config::{FireConfig, FLAME_ANCHOR_Y};
use crate::simulation::cell::Cell;

/// Orthogonal neighbor offsets: up, down, left, right
const ORTHOGONAL: [(i64, i64); 4] = [(0, -1), (0, 1), (-1, 0), (1, 0)];

/// Conversions between world space (pixels) and grid cells.
///
/// Stateless apart from the grid dimensions; every method is pure.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridCoordinate {
    cells: u32,
    cell_size: f32,
    anchor_y: f32,
}

impl GridCoordinate {
    /// Grid of `cells` x `cells` squares, each `cell_size` world pixels wide
    pub fn new(cells: u32, cell_size: f32) -> Self {
        Self {
            cells,
            cell_size,
            anchor_y: FLAME_ANCHOR_Y,
        }
    }

    pub fn from_config(config: &FireConfig) -> Self {
        Self::new(config.grid_cells, config.cell_size)
    }

    /// Grid side length in cells
    pub fn cells(&self) -> u32 {
        self.cells
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Vertical anchor of cell centers as a fraction of the cell height
    pub fn anchor_y(&self) -> f32 {
        self.anchor_y
    }

    /// Grid extent in world pixels
    pub fn world_size(&self) -> f32 {
        self.cells as f32 * self.cell_size
    }

    pub fn cell_count(&self) -> usize {
        self.cells as usize * self.cells as usize
    }

    /// Cell containing the world point, or None when it lies off the grid
    pub fn world_to_cell(&self, world_x: f32, world_y: f32) -> Option<Cell> {
        let col = (world_x / self.cell_size).floor();
        let row = (world_y / self.cell_size).floor();
        let limit = self.cells as f32;

        // NaN fails both comparisons and falls through to None
        if col >= 0.0 && col < limit && row >= 0.0 && row < limit {
            Some(Cell::new(col as u32, row as u32))
        } else {
            None
        }
    }

    /// World position a cell's visual is anchored at
    pub fn cell_to_world_center(&self, cell: Cell) -> (f32, f32) {
        (
            cell.col as f32 * self.cell_size + self.cell_size / 2.0,
            cell.row as f32 * self.cell_size + self.cell_size * self.anchor_y,
        )
    }

    /// Bounds check against [0, world_size) on both axes
    pub fn contains_world(&self, world_x: f32, world_y: f32) -> bool {
        let size = self.world_size();
        (0.0..size).contains(&world_x) && (0.0..size).contains(&world_y)
    }

    pub fn contains(&self, cell: Cell) -> bool {
        cell.col < self.cells && cell.row < self.cells
    }

    /// Packed arena index (`row * cells + col`)
    pub fn index_of(&self, cell: Cell) -> usize {
        debug_assert!(self.contains(cell), "{:?} outside {}-cell grid", cell, self.cells);
        cell.row as usize * self.cells as usize + cell.col as usize
    }

    /// Inverse of [`index_of`](Self::index_of)
    pub fn cell_at(&self, index: usize) -> Cell {
        let side = self.cells as usize;
        Cell::new((index % side) as u32, (index / side) as u32)
    }

    /// In-bounds orthogonal neighbors of `cell`
    pub fn orthogonal_neighbors(&self, cell: Cell) -> impl Iterator<Item = Cell> + '_ {
        ORTHOGONAL.iter().filter_map(move |&(dx, dy)| {
            let col = cell.col as i64 + dx;
            let row = cell.row as i64 + dy;
            let side = self.cells as i64;
            if (0..side).contains(&col) && (0..side).contains(&row) {
                Some(Cell::new(col as u32, row as u32))
            } else {
                None
            }
        })
    }

    /// Uniformly random cell on the grid
    pub fn random_cell<R: Rng + ?Sized>(&self, rng: &mut R) -> Cell {
        Cell::new(rng.gen_range(0..self.cells), rng.gen_range(0..self.cells))
    }
}
