use crate::config::FireConfig;
use crate::simulation::{Cell, GridCoordinate};

/// Camera pan/zoom state, in the same terms the GPU shader consumes.
///
/// A screen point maps to world space as
/// `world = scroll + half + (screen - half) / zoom`, where `half` is half the
/// viewport size: zoom scales around the middle of the viewport, and `scroll`
/// is the world position of the top-left corner at zoom 1.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportState {
    pub zoom: f32,
    pub scroll_x: f32,
    pub scroll_y: f32,
    /// Viewport size in physical pixels
    pub width: f32,
    pub height: f32,
}

impl ViewportState {
    pub fn new(width: f32, height: f32, zoom: f32) -> Self {
        Self {
            zoom,
            scroll_x: 0.0,
            scroll_y: 0.0,
            width,
            height,
        }
    }

    pub fn screen_to_world(&self, screen_x: f32, screen_y: f32) -> (f32, f32) {
        let half_w = self.width / 2.0;
        let half_h = self.height / 2.0;
        (
            self.scroll_x + half_w + (screen_x - half_w) / self.zoom,
            self.scroll_y + half_h + (screen_y - half_h) / self.zoom,
        )
    }

    /// Scroll so the world point sits in the middle of the viewport
    pub fn center_on(&mut self, world_x: f32, world_y: f32) {
        self.scroll_x = world_x - self.width / 2.0;
        self.scroll_y = world_y - self.height / 2.0;
    }

    /// Visible width in world pixels
    pub fn display_width(&self) -> f32 {
        self.width / self.zoom
    }

    pub fn display_height(&self) -> f32 {
        self.height / self.zoom
    }
}

/// World rectangle the camera may not scroll past
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraBounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl CameraBounds {
    /// Half a grid of margin on every side
    pub fn around_grid(grid: &GridCoordinate) -> Self {
        let size = grid.world_size();
        Self {
            x: -size / 2.0,
            y: -size / 2.0,
            width: size * 2.0,
            height: size * 2.0,
        }
    }

    /// Keep the visible area inside the bounds. When the view is larger than
    /// the bounds it pins to the left/top edge.
    pub fn clamp(&self, camera: &mut ViewportState) {
        camera.scroll_x = clamp_axis(camera.scroll_x, self.x, self.width, camera.width, camera.display_width());
        camera.scroll_y = clamp_axis(camera.scroll_y, self.y, self.height, camera.height, camera.display_height());
    }
}

fn pixel_center(screen: f32) -> f32 {
    screen.floor() + 0.5
}

fn clamp_axis(scroll: f32, origin: f32, extent: f32, viewport: f32, display: f32) -> f32 {
    let min = origin + (display - viewport) / 2.0;
    let max = min.max(min + extent - display);
    scroll.clamp(min, max)
}

/// Translates pointer positions into world and grid coordinates, and applies
/// wheel zoom steps to the camera.
pub struct ViewportMapper {
    camera: ViewportState,
    grid: GridCoordinate,
    bounds: CameraBounds,
    min_zoom: f32,
    max_zoom: f32,
    zoom_step: f32,
    initial_zoom: f32,
}

impl ViewportMapper {
    /// Camera centered on the grid at the configured initial zoom
    pub fn new(config: &FireConfig, viewport_width: f32, viewport_height: f32) -> Self {
        let grid = GridCoordinate::from_config(config);
        let mut mapper = Self {
            camera: ViewportState::new(viewport_width, viewport_height, config.initial_zoom),
            grid,
            bounds: CameraBounds::around_grid(&grid),
            min_zoom: config.min_zoom,
            max_zoom: config.max_zoom,
            zoom_step: config.zoom_step,
            initial_zoom: config.initial_zoom,
        };
        mapper.reset();
        mapper
    }

    pub fn camera(&self) -> &ViewportState {
        &self.camera
    }

    pub fn grid(&self) -> &GridCoordinate {
        &self.grid
    }

    pub fn zoom(&self) -> f32 {
        self.camera.zoom
    }

    pub fn screen_to_world(&self, screen_x: f32, screen_y: f32) -> (f32, f32) {
        self.camera.screen_to_world(screen_x, screen_y)
    }

    /// Cell drawn under a screen point, or None off the grid.
    ///
    /// Samples the centre of the pixel containing the point, the same sample
    /// the fragment shader shades that pixel with.
    pub fn screen_to_cell(&self, screen_x: f32, screen_y: f32) -> Option<Cell> {
        let (world_x, world_y) =
            self.screen_to_world(pixel_center(screen_x), pixel_center(screen_y));
        if !self.is_within_grid(world_x, world_y) {
            return None;
        }
        self.grid.world_to_cell(world_x, world_y)
    }

    pub fn is_within_grid(&self, world_x: f32, world_y: f32) -> bool {
        self.grid.contains_world(world_x, world_y)
    }

    /// Step zoom once in the direction of `delta`, regardless of its
    /// magnitude. Returns the new zoom.
    pub fn apply_zoom_delta(&mut self, delta: f32) -> f32 {
        let step = if delta > 0.0 {
            self.zoom_step
        } else if delta < 0.0 {
            -self.zoom_step
        } else {
            return self.camera.zoom;
        };

        self.camera.zoom = (self.camera.zoom + step).clamp(self.min_zoom, self.max_zoom);
        self.bounds.clamp(&mut self.camera);
        log::debug!("Zoom: {:.1}", self.camera.zoom);
        self.camera.zoom
    }

    /// Move the camera by a world-space offset
    pub fn scroll_by(&mut self, dx: f32, dy: f32) {
        self.camera.scroll_x += dx;
        self.camera.scroll_y += dy;
        self.bounds.clamp(&mut self.camera);
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.camera.width = width;
        self.camera.height = height;
        self.bounds.clamp(&mut self.camera);
    }

    /// Back to the initial zoom, centered on the grid
    pub fn reset(&mut self) {
        let center = self.grid.world_size() / 2.0;
        self.camera.zoom = self.initial_zoom;
        self.camera.center_on(center, center);
        self.bounds.clamp(&mut self.camera);
    }
}
