use std::time::Duration;

use thiserror::Error;

/// Grid side length in cells (50x50 = 2500 cells)
pub const GRID_CELLS: u32 = 50;

/// Cell edge length in world pixels (grid extent 3000x3000)
pub const CELL_SIZE: f32 = 60.0;

/// Simulation parameters
pub const SPREAD_INTERVAL_MS: u64 = 500;
pub const SPREAD_CHANCE: f64 = 0.2;
pub const INITIAL_FIRE_CELLS: usize = 10;

// ============================================
// Camera
// ============================================

pub const MIN_ZOOM: f32 = 0.3;
pub const MAX_ZOOM: f32 = 1.5;
pub const ZOOM_STEP: f32 = 0.1;
pub const INITIAL_ZOOM: f32 = 1.0;

/// Fraction of the pointer's travel the smoothed pointer covers per move event
pub const POINTER_MOTION_FACTOR: f32 = 0.5;

// ============================================
// Flame visuals
// ============================================

/// Vertical anchor of a flame inside its cell, as a fraction of the cell height.
/// Flames sit above the geometric center so the sprite base lines up with the cell.
pub const FLAME_ANCHOR_Y: f32 = 1.0 / 3.0;

/// Flame animation rate (frames per second)
pub const FLAME_FPS: f32 = 8.0;

/// No highlight marker (all bits set)
pub const NO_HIGHLIGHT: u32 = 0xFFFFFFFF;

/// Largest grid side the app will allocate. The cell-state buffer holds one
/// u32 per cell and must fit the 128 MiB storage binding limit of
/// `wgpu::Limits::downlevel_defaults()`; the packed (col << 16 | row)
/// encoding stays clear of NO_HIGHLIGHT well below this.
pub const MAX_GRID_CELLS: u32 = 4096;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("grid must be between 1 and {max} cells wide, got {actual}")]
    GridSize { actual: u32, max: u32 },
    #[error("cell size must be a positive finite number, got {0}")]
    CellSize(f32),
    #[error("spread chance must be between 0.0 and 1.0, got {0}")]
    SpreadChance(f64),
    #[error("spread interval must be non-zero")]
    ZeroInterval,
    #[error("zoom bounds must satisfy 0 < min <= max, got [{min}, {max}]")]
    ZoomBounds { min: f32, max: f32 },
    #[error("zoom step must be positive, got {0}")]
    ZoomStep(f32),
    #[error("initial zoom {zoom} lies outside [{min}, {max}]")]
    InitialZoom { zoom: f32, min: f32, max: f32 },
    #[error("cannot seed {requested} fires on a grid of {capacity} cells")]
    TooManyFires { requested: usize, capacity: usize },
    #[error("pointer motion factor must be in (0.0, 1.0], got {0}")]
    MotionFactor(f32),
    #[error("invalid value {value:?} for {var}")]
    InvalidEnv { var: &'static str, value: String },
}

/// Session configuration, fixed once the simulation starts.
#[derive(Clone, Debug, PartialEq)]
pub struct FireConfig {
    pub grid_cells: u32,
    pub cell_size: f32,
    pub spread_interval: Duration,
    pub spread_chance: f64,
    pub initial_fire_cells: usize,
    pub min_zoom: f32,
    pub max_zoom: f32,
    pub zoom_step: f32,
    pub initial_zoom: f32,
    pub pointer_motion_factor: f32,
    /// Fixed RNG seed; `None` draws one from the OS
    pub seed: Option<u64>,
}

impl Default for FireConfig {
    fn default() -> Self {
        Self {
            grid_cells: GRID_CELLS,
            cell_size: CELL_SIZE,
            spread_interval: Duration::from_millis(SPREAD_INTERVAL_MS),
            spread_chance: SPREAD_CHANCE,
            initial_fire_cells: INITIAL_FIRE_CELLS,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            zoom_step: ZOOM_STEP,
            initial_zoom: INITIAL_ZOOM,
            pointer_motion_factor: POINTER_MOTION_FACTOR,
            seed: None,
        }
    }
}

impl FireConfig {
    /// Defaults with `FIRE_*` environment overrides applied, then validated.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Like `from_env`, reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(seed) = parse_var(&lookup, "FIRE_SEED")? {
            config.seed = Some(seed);
        }
        if let Some(chance) = parse_var(&lookup, "FIRE_SPREAD_CHANCE")? {
            config.spread_chance = chance;
        }
        if let Some(ms) = parse_var::<u64, _>(&lookup, "FIRE_SPREAD_INTERVAL_MS")? {
            config.spread_interval = Duration::from_millis(ms);
        }
        if let Some(count) = parse_var(&lookup, "FIRE_INITIAL_CELLS")? {
            config.initial_fire_cells = count;
        }
        if let Some(cells) = parse_var(&lookup, "FIRE_GRID_CELLS")? {
            config.grid_cells = cells;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_cells == 0 || self.grid_cells > MAX_GRID_CELLS {
            return Err(ConfigError::GridSize {
                actual: self.grid_cells,
                max: MAX_GRID_CELLS,
            });
        }
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(ConfigError::CellSize(self.cell_size));
        }
        if !(0.0..=1.0).contains(&self.spread_chance) {
            return Err(ConfigError::SpreadChance(self.spread_chance));
        }
        if self.spread_interval.is_zero() {
            return Err(ConfigError::ZeroInterval);
        }
        if !(self.min_zoom > 0.0 && self.min_zoom <= self.max_zoom) {
            return Err(ConfigError::ZoomBounds {
                min: self.min_zoom,
                max: self.max_zoom,
            });
        }
        if !(self.zoom_step > 0.0) {
            return Err(ConfigError::ZoomStep(self.zoom_step));
        }
        if !(self.min_zoom..=self.max_zoom).contains(&self.initial_zoom) {
            return Err(ConfigError::InitialZoom {
                zoom: self.initial_zoom,
                min: self.min_zoom,
                max: self.max_zoom,
            });
        }
        let capacity = self.cell_count();
        if self.initial_fire_cells > capacity {
            return Err(ConfigError::TooManyFires {
                requested: self.initial_fire_cells,
                capacity,
            });
        }
        if !(self.pointer_motion_factor > 0.0 && self.pointer_motion_factor <= 1.0) {
            return Err(ConfigError::MotionFactor(self.pointer_motion_factor));
        }
        Ok(())
    }

    /// Total number of cells in the grid
    pub fn cell_count(&self) -> usize {
        self.grid_cells as usize * self.grid_cells as usize
    }

}

fn parse_var<T, F>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv { var, value }),
    }
}
