mod cell;
mod engine;
mod grid;
mod scheduler;
mod store;

pub use cell::{decode_cell, encode_cell, Cell};
pub use engine::{SpreadEngine, SpreadReport};
pub use grid::GridCoordinate;
pub use scheduler::SpreadScheduler;
pub use store::{FireCellStore, Ignition};
