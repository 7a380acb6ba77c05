//! Fire spread on a square grid, viewed through a pannable, zoomable camera.
//!
//! The crate holds the simulation core: the burning-cell store, the
//! interval-gated spread engine, the screen/world/grid coordinate mapping and
//! the pointer interaction glue. Rendering is left to a [`Renderer`]
//! implementation supplied by the host.
//!
//! Per frame the host dispatches pending input to the
//! [`InteractionController`] in delivery order, then calls
//! [`SpreadEngine::update`] once.

pub mod config;
pub mod interaction;
pub mod renderer;
pub mod simulation;
pub mod viewport;

pub use config::{ConfigError, FireConfig};
pub use interaction::{InteractionController, PointerButton, PointerDown, PointerMotion, PointerMove, Wheel};
pub use renderer::Renderer;
pub use simulation::{Cell, FireCellStore, GridCoordinate, SpreadEngine, SpreadReport, SpreadScheduler};
pub use viewport::{ViewportMapper, ViewportState};
