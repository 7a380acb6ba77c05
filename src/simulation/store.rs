use crate::simulation::cell::Cell;
use crate::simulation::grid::GridCoordinate;

/// Metadata recorded when a cell catches fire
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ignition {
    /// Spread tick during which the cell ignited (0 = before the first tick)
    pub tick: u64,
}

/// Set of currently burning cells.
///
/// Flattened into one slot per grid cell, so membership and ignition metadata
/// share a slot and can never disagree.
pub struct FireCellStore {
    grid: GridCoordinate,
    slots: Vec<Option<Ignition>>,
    burning: usize,
}

impl FireCellStore {
    pub fn new(grid: GridCoordinate) -> Self {
        Self {
            grid,
            slots: vec![None; grid.cell_count()],
            burning: 0,
        }
    }

    pub fn grid(&self) -> &GridCoordinate {
        &self.grid
    }

    /// Off-grid cells are never burning
    pub fn contains(&self, cell: Cell) -> bool {
        self.ignition(cell).is_some()
    }

    pub fn ignition(&self, cell: Cell) -> Option<Ignition> {
        if !self.grid.contains(cell) {
            return None;
        }
        self.slots[self.grid.index_of(cell)]
    }

    /// Mark `cell` as burning. Returns false if it was already burning or lies
    /// off the grid.
    pub fn ignite(&mut self, cell: Cell, tick: u64) -> bool {
        if !self.grid.contains(cell) {
            return false;
        }
        let slot = &mut self.slots[self.grid.index_of(cell)];
        if slot.is_some() {
            return false;
        }
        *slot = Some(Ignition { tick });
        self.burning += 1;
        true
    }

    /// Put out `cell`. Returns false if it was not burning.
    pub fn extinguish(&mut self, cell: Cell) -> bool {
        if !self.grid.contains(cell) {
            return false;
        }
        match self.slots[self.grid.index_of(cell)].take() {
            Some(_) => {
                self.burning -= 1;
                true
            }
            None => false,
        }
    }

    /// Burning cells in arena order.
    ///
    /// The iterator borrows the store, so it reflects exactly the state at the
    /// moment it was created; clone it to walk the same snapshot again.
    pub fn all_burning(&self) -> impl Iterator<Item = Cell> + Clone + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .map(|(index, _)| self.grid.cell_at(index))
    }

    pub fn len(&self) -> usize {
        self.burning
    }

    pub fn is_empty(&self) -> bool {
        self.burning == 0
    }

    /// Upper bound on `len`
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn clear(&mut self) {
        self.slots.fill(None);
        self.burning = 0;
    }
}
