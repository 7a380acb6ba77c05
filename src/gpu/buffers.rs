use wgpu::{Buffer, BufferUsages, Device, Queue};

use fire_spread::config::FLAME_FPS;
use fire_spread::simulation::encode_cell;
use fire_spread::{Cell, GridCoordinate, Renderer, ViewportState};

/// Per-cell visual state as stored in the GPU cell buffer
pub const CELL_UNBURNT: u32 = 0;
pub const CELL_BURNING: u32 = 1;

/// Above this share of dirty cells the whole buffer is rewritten at once
const FULL_UPLOAD_DIVISOR: usize = 8;

/// Render parameters passed to the fragment shader (48 bytes, aligned to 16)
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct RenderParams {
    // Grid (16 bytes)
    pub grid_cells: u32,
    pub highlight: u32, // packed cell or NO_HIGHLIGHT
    pub cell_size: f32,
    pub flame_anchor_y: f32,

    // Camera (16 bytes) - same terms as ViewportState::screen_to_world
    pub zoom: f32,
    pub scroll_x: f32,
    pub scroll_y: f32,
    pub viewport_width: f32,

    // Animation (16 bytes)
    pub viewport_height: f32,
    pub time: f32,
    pub flame_fps: f32,
    pub _padding: f32,
}

/// CPU-side copy of what each cell looks like, kept in step with the engine
/// through [`Renderer`] events and uploaded lazily.
pub struct CellVisuals {
    grid: GridCoordinate,
    states: Vec<u32>,
    dirty: Vec<usize>,
    highlight: Option<Cell>,
}

impl CellVisuals {
    pub fn new(grid: GridCoordinate) -> Self {
        Self {
            grid,
            states: vec![CELL_UNBURNT; grid.cell_count()],
            dirty: Vec::new(),
            highlight: None,
        }
    }

    pub fn states(&self) -> &[u32] {
        &self.states
    }

    pub fn highlight(&self) -> Option<Cell> {
        self.highlight
    }

    pub fn burning_count(&self) -> usize {
        self.states.iter().filter(|s| **s == CELL_BURNING).count()
    }

    fn set(&mut self, cell: Cell, state: u32) {
        let index = self.grid.index_of(cell);
        self.states[index] = state;
        self.dirty.push(index);
    }
}

impl Renderer for CellVisuals {
    fn on_ignite(&mut self, cell: Cell) {
        self.set(cell, CELL_BURNING);
    }

    fn on_extinguish(&mut self, cell: Cell) {
        self.set(cell, CELL_UNBURNT);
    }

    fn on_highlight_move(&mut self, cell: Option<Cell>) {
        self.highlight = cell;
    }
}

/// GPU buffers for the cell states and render parameters
pub struct FireBuffers {
    pub cells_buffer: Buffer,
    pub params_buffer: Buffer,
    pub visuals: CellVisuals,
}

impl FireBuffers {
    /// Create buffers for `grid`; every cell starts unburnt
    pub fn new(device: &Device, grid: GridCoordinate) -> Self {
        let visuals = CellVisuals::new(grid);

        // wgpu zero-initializes buffers, which matches CELL_UNBURNT
        let cells_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("cell-state-buffer"),
            size: std::mem::size_of_val(visuals.states()) as u64,
            usage: BufferUsages::STORAGE | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let params_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("render-params-buffer"),
            size: std::mem::size_of::<RenderParams>() as u64,
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            cells_buffer,
            params_buffer,
            visuals,
        }
    }

    /// Push cell changes since the last upload
    pub fn upload_cells(&mut self, queue: &Queue) {
        if self.visuals.dirty.is_empty() {
            return;
        }

        let states = &self.visuals.states;
        if self.visuals.dirty.len() > states.len() / FULL_UPLOAD_DIVISOR {
            queue.write_buffer(&self.cells_buffer, 0, bytemuck::cast_slice(states));
        } else {
            for &index in &self.visuals.dirty {
                let offset = (index * std::mem::size_of::<u32>()) as u64;
                queue.write_buffer(&self.cells_buffer, offset, bytemuck::bytes_of(&states[index]));
            }
        }
        self.visuals.dirty.clear();
    }

    /// Update render parameters from the camera shared with pointer mapping
    pub fn update_params(&self, queue: &Queue, camera: &ViewportState, time: f32) {
        let params = render_params(&self.visuals.grid, camera, self.visuals.highlight(), time);
        queue.write_buffer(&self.params_buffer, 0, bytemuck::bytes_of(&params));
    }
}

impl Renderer for FireBuffers {
    fn on_ignite(&mut self, cell: Cell) {
        self.visuals.on_ignite(cell);
    }

    fn on_extinguish(&mut self, cell: Cell) {
        self.visuals.on_extinguish(cell);
    }

    fn on_highlight_move(&mut self, cell: Option<Cell>) {
        self.visuals.on_highlight_move(cell);
    }
}

fn render_params(
    grid: &GridCoordinate,
    camera: &ViewportState,
    highlight: Option<Cell>,
    time: f32,
) -> RenderParams {
    RenderParams {
        grid_cells: grid.cells(),
        highlight: encode_cell(highlight),
        cell_size: grid.cell_size(),
        flame_anchor_y: grid.anchor_y(),
        zoom: camera.zoom,
        scroll_x: camera.scroll_x,
        scroll_y: camera.scroll_y,
        viewport_width: camera.width,
        viewport_height: camera.height,
        time,
        flame_fps: FLAME_FPS,
        _padding: 0.0,
    }
}
