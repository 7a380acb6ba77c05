use rand::Rng;

use crate::renderer::Renderer;
use crate::simulation::{Cell, SpreadEngine};
use crate::viewport::ViewportMapper;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
    Other,
}

/// Pointer moved, possibly while a button is held (drag)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerMove {
    pub screen_x: f32,
    pub screen_y: f32,
    pub is_down: bool,
    /// Smoothed screen-space movement since the previous event
    pub velocity: (f32, f32),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerDown {
    pub screen_x: f32,
    pub screen_y: f32,
    pub button: PointerButton,
}

/// Wheel scrolled; positive `delta_y` scrolls down (zooms out)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Wheel {
    pub delta_y: f32,
}

/// Smooths raw pointer positions into a velocity.
///
/// A tracked midpoint moves `motion_factor` of the way toward each new
/// position; the velocity is how far the midpoint moved.
pub struct PointerMotion {
    midpoint: Option<(f32, f32)>,
    motion_factor: f32,
}

impl PointerMotion {
    pub fn new(motion_factor: f32) -> Self {
        Self {
            midpoint: None,
            motion_factor,
        }
    }

    /// Feed a new pointer position, returning the smoothed velocity
    pub fn update(&mut self, x: f32, y: f32) -> (f32, f32) {
        let Some((mx, my)) = self.midpoint else {
            self.midpoint = Some((x, y));
            return (0.0, 0.0);
        };
        let next = (
            mx + (x - mx) * self.motion_factor,
            my + (y - my) * self.motion_factor,
        );
        self.midpoint = Some(next);
        (next.0 - mx, next.1 - my)
    }

    /// Forget the previous position (pointer left the window)
    pub fn reset(&mut self) {
        self.midpoint = None;
    }
}

/// Routes pointer and wheel events to the camera and the fire engine.
///
/// Events are handled synchronously in the order the host delivers them.
pub struct InteractionController {
    mapper: ViewportMapper,
    hover: Option<Cell>,
    pointer: Option<(f32, f32)>,
}

impl InteractionController {
    pub fn new(mapper: ViewportMapper) -> Self {
        Self {
            mapper,
            hover: None,
            pointer: None,
        }
    }

    pub fn mapper(&self) -> &ViewportMapper {
        &self.mapper
    }

    /// Direct camera access for host-level actions (resize, reset). Call
    /// [`refresh_hover`](Self::refresh_hover) afterwards.
    pub fn mapper_mut(&mut self) -> &mut ViewportMapper {
        &mut self.mapper
    }

    /// Cell currently highlighted under the pointer
    pub fn hover(&self) -> Option<Cell> {
        self.hover
    }

    pub fn pointer_move(&mut self, event: PointerMove, renderer: &mut impl Renderer) {
        if event.is_down {
            // Divide by zoom so a drag moves the grid at pointer speed at any zoom
            let zoom = self.mapper.zoom();
            self.mapper
                .scroll_by(-event.velocity.0 / zoom, -event.velocity.1 / zoom);
        }
        self.pointer = Some((event.screen_x, event.screen_y));
        self.refresh_hover(renderer);
    }

    /// Extinguish the cell under the pointer. Returns true if a fire was put out.
    pub fn pointer_down<R: Rng>(
        &mut self,
        event: PointerDown,
        engine: &mut SpreadEngine<R>,
        renderer: &mut impl Renderer,
    ) -> bool {
        self.pointer = Some((event.screen_x, event.screen_y));
        if event.button != PointerButton::Primary {
            return false;
        }
        match self.mapper.screen_to_cell(event.screen_x, event.screen_y) {
            Some(cell) => engine.extinguish(cell, renderer),
            None => false,
        }
    }

    pub fn wheel(&mut self, event: Wheel, renderer: &mut impl Renderer) {
        self.mapper.apply_zoom_delta(-event.delta_y);
        // The cell under a stationary pointer changes with zoom
        self.refresh_hover(renderer);
    }

    /// Pointer left the window: drop the highlight
    pub fn pointer_leave(&mut self, renderer: &mut impl Renderer) {
        self.pointer = None;
        self.set_hover(None, renderer);
    }

    /// Recompute the highlighted cell at the last known pointer position
    pub fn refresh_hover(&mut self, renderer: &mut impl Renderer) {
        let cell = self
            .pointer
            .and_then(|(x, y)| self.mapper.screen_to_cell(x, y));
        self.set_hover(cell, renderer);
    }

    fn set_hover(&mut self, cell: Option<Cell>, renderer: &mut impl Renderer) {
        if cell != self.hover {
            self.hover = cell;
            renderer.on_highlight_move(cell);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FireConfig, MAX_ZOOM};
    use crate::renderer::{RecordingRenderer, RenderEvent};
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::time::Instant;

    // 800x600 viewport centered on the 3000x3000 grid: screen (0, 0) is world (1100, 1200)
    fn controller() -> InteractionController {
        InteractionController::new(ViewportMapper::new(&FireConfig::default(), 800.0, 600.0))
    }

    fn engine() -> SpreadEngine {
        SpreadEngine::new(&FireConfig::default(), StdRng::seed_from_u64(1), Instant::now()).unwrap()
    }

    fn hover_at(x: f32, y: f32) -> PointerMove {
        PointerMove {
            screen_x: x,
            screen_y: y,
            is_down: false,
            velocity: (0.0, 0.0),
        }
    }

    fn click_at(x: f32, y: f32) -> PointerDown {
        PointerDown {
            screen_x: x,
            screen_y: y,
            button: PointerButton::Primary,
        }
    }

    #[test]
    fn test_hover_highlights_cell() {
        let mut controller = controller();
        let mut renderer = RecordingRenderer::default();
        controller.pointer_move(hover_at(400.0, 300.0), &mut renderer);
        assert_eq!(controller.hover(), Some(Cell::new(25, 25)));
        assert_eq!(renderer.last_highlight(), Some(Some(Cell::new(25, 25))));
    }

    #[test]
    fn test_hover_is_only_forwarded_on_change() {
        let mut controller = controller();
        let mut renderer = RecordingRenderer::default();
        controller.pointer_move(hover_at(400.0, 300.0), &mut renderer);
        controller.pointer_move(hover_at(405.0, 302.0), &mut renderer);
        assert_eq!(renderer.events.len(), 1);
    }

    #[test]
    fn test_hover_hidden_off_grid() {
        let mut controller = controller();
        let mut renderer = RecordingRenderer::default();
        controller.pointer_move(hover_at(400.0, 300.0), &mut renderer);
        controller.mapper_mut().scroll_by(-3000.0, 0.0);
        controller.pointer_move(hover_at(10.0, 10.0), &mut renderer);
        assert_eq!(controller.hover(), None);
        assert_eq!(renderer.last_highlight(), Some(None));
    }

    #[test]
    fn test_drag_pans_by_velocity_over_zoom() {
        let mut controller = controller();
        let mut renderer = RecordingRenderer::default();
        let before = *controller.mapper().camera();
        controller.pointer_move(
            PointerMove {
                screen_x: 400.0,
                screen_y: 300.0,
                is_down: true,
                velocity: (10.0, -20.0),
            },
            &mut renderer,
        );
        let after = *controller.mapper().camera();
        assert_relative_eq!(after.scroll_x - before.scroll_x, -10.0);
        assert_relative_eq!(after.scroll_y - before.scroll_y, 20.0);

        for _ in 0..10 {
            controller.wheel(Wheel { delta_y: -1.0 }, &mut renderer);
        }
        assert_eq!(controller.mapper().zoom(), MAX_ZOOM);
        let before = *controller.mapper().camera();
        controller.pointer_move(
            PointerMove {
                screen_x: 400.0,
                screen_y: 300.0,
                is_down: true,
                velocity: (15.0, 0.0),
            },
            &mut renderer,
        );
        let after = *controller.mapper().camera();
        assert_relative_eq!(after.scroll_x - before.scroll_x, -10.0, epsilon = 1e-3);
    }

    #[test]
    fn test_hover_without_button_does_not_pan() {
        let mut controller = controller();
        let mut renderer = RecordingRenderer::default();
        let before = *controller.mapper().camera();
        controller.pointer_move(
            PointerMove {
                velocity: (50.0, 50.0),
                ..hover_at(400.0, 300.0)
            },
            &mut renderer,
        );
        assert_eq!(*controller.mapper().camera(), before);
    }

    #[test]
    fn test_click_extinguishes_burning_cell() {
        let mut controller = controller();
        let mut engine = engine();
        let mut renderer = RecordingRenderer::default();
        let cell = Cell::new(25, 25);
        engine.ignite(cell, &mut renderer);

        assert!(controller.pointer_down(click_at(400.0, 300.0), &mut engine, &mut renderer));
        assert!(!engine.is_burning(cell));
        assert_eq!(renderer.events.last(), Some(&RenderEvent::Extinguish(cell)));

        // Clicking the now unburnt cell again does nothing
        let count = renderer.events.len();
        assert!(!controller.pointer_down(click_at(400.0, 300.0), &mut engine, &mut renderer));
        assert_eq!(renderer.events.len(), count);
    }

    #[test]
    fn test_click_ignores_other_buttons_and_off_grid() {
        let mut controller = controller();
        let mut engine = engine();
        let mut renderer = RecordingRenderer::default();
        let cell = Cell::new(25, 25);
        engine.ignite(cell, &mut renderer);

        let right_click = PointerDown {
            button: PointerButton::Secondary,
            ..click_at(400.0, 300.0)
        };
        assert!(!controller.pointer_down(right_click, &mut engine, &mut renderer));
        assert!(engine.is_burning(cell));

        controller.mapper_mut().scroll_by(-3000.0, -3000.0);
        assert!(!controller.pointer_down(click_at(5.0, 5.0), &mut engine, &mut renderer));
        assert_eq!(engine.store().len(), 1);
    }

    #[test]
    fn test_wheel_zooms_and_refreshes_hover() {
        let mut controller = controller();
        let mut renderer = RecordingRenderer::default();
        // Pixel (0, 0) samples world (1100.5, 1200.5) at zoom 1: cell (18, 20)
        controller.pointer_move(hover_at(0.0, 0.0), &mut renderer);
        assert_eq!(controller.hover(), Some(Cell::new(18, 20)));

        controller.wheel(Wheel { delta_y: -120.0 }, &mut renderer);
        assert_relative_eq!(controller.mapper().zoom(), 1.1, epsilon = 1e-6);
        // Zooming in pulls the corner toward the center: world (1136.8, 1227.7)
        assert_eq!(controller.hover(), Some(Cell::new(18, 20)));

        controller.wheel(Wheel { delta_y: 3.0 }, &mut renderer);
        controller.wheel(Wheel { delta_y: 3.0 }, &mut renderer);
        controller.wheel(Wheel { delta_y: 3.0 }, &mut renderer);
        // Zoom 0.8: world (1000.6, 1125.6)
        assert_eq!(controller.hover(), Some(Cell::new(16, 18)));
        assert_eq!(renderer.last_highlight(), Some(Some(Cell::new(16, 18))));
    }

    #[test]
    fn test_pointer_leave_hides_highlight() {
        let mut controller = controller();
        let mut renderer = RecordingRenderer::default();
        controller.pointer_move(hover_at(400.0, 300.0), &mut renderer);
        controller.pointer_leave(&mut renderer);
        assert_eq!(controller.hover(), None);
        assert_eq!(renderer.last_highlight(), Some(None));

        // Without a pointer position, zoom has nothing to highlight
        controller.wheel(Wheel { delta_y: 1.0 }, &mut renderer);
        assert_eq!(controller.hover(), None);
    }

    #[test]
    fn test_pointer_motion_smoothing() {
        let mut motion = PointerMotion::new(0.5);
        assert_eq!(motion.update(100.0, 100.0), (0.0, 0.0));
        assert_eq!(motion.update(110.0, 100.0), (5.0, 0.0));
        assert_eq!(motion.update(110.0, 100.0), (2.5, 0.0));
        motion.reset();
        assert_eq!(motion.update(0.0, 0.0), (0.0, 0.0));
    }
}
