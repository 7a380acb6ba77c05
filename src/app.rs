use std::sync::Arc;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use fire_spread::{
    ConfigError, FireConfig, GridCoordinate, InteractionController, PointerButton, PointerDown,
    PointerMotion, PointerMove, SpreadEngine, ViewportMapper, Wheel,
};

use crate::gpu::{FireBuffers, GpuContext, RenderPipeline};

/// Initial window size in logical pixels
const WINDOW_SIZE: (u32, u32) = (1024, 768);

/// Application state
pub struct App {
    config: FireConfig,
    window: Option<Arc<Window>>,
    gpu: Option<GpuContext>,
    buffers: Option<FireBuffers>,
    render_pipeline: Option<RenderPipeline>,
    engine: SpreadEngine,
    controller: InteractionController,
    motion: PointerMotion,
    cursor: Option<(f32, f32)>,
    primary_down: bool,
    started: Instant,
    fps_counter: FpsCounter,
}

impl App {
    pub fn new(config: FireConfig) -> Result<Self, ConfigError> {
        let seed = config.seed.unwrap_or_else(rand::random);
        log::info!("Simulation seed: {}", seed);

        let started = Instant::now();
        let engine = SpreadEngine::new(&config, StdRng::seed_from_u64(seed), started)?;
        let mapper = ViewportMapper::new(&config, WINDOW_SIZE.0 as f32, WINDOW_SIZE.1 as f32);

        Ok(Self {
            motion: PointerMotion::new(config.pointer_motion_factor),
            config,
            window: None,
            gpu: None,
            buffers: None,
            render_pipeline: None,
            engine,
            controller: InteractionController::new(mapper),
            cursor: None,
            primary_down: false,
            started,
            fps_counter: FpsCounter::new(),
        })
    }

    /// One frame: input for this frame has already been dispatched, so run at
    /// most one spread tick, then draw.
    fn render(&mut self) {
        let (Some(gpu), Some(buffers), Some(pipeline)) = (
            self.gpu.as_ref(),
            self.buffers.as_mut(),
            self.render_pipeline.as_ref(),
        ) else {
            return;
        };

        self.engine.update(Instant::now(), buffers);

        buffers.upload_cells(&gpu.queue);
        buffers.update_params(
            &gpu.queue,
            self.controller.mapper().camera(),
            self.started.elapsed().as_secs_f32(),
        );

        let output = match gpu.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.device, &gpu.config);
                return;
            }
            Err(e) => {
                log::error!("Surface error: {:?}", e);
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame-encoder"),
            });
        pipeline.draw(&mut encoder, &view);
        gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        if let Some(fps) = self.fps_counter.tick() {
            if let Some(window) = &self.window {
                window.set_title(&format!(
                    "Wildfire - {:.0} FPS - {} burning",
                    fps,
                    buffers.visuals.burning_count()
                ));
            }
        }
    }

    fn handle_key(&mut self, key_code: KeyCode) {
        let Some(buffers) = self.buffers.as_mut() else {
            return;
        };
        match key_code {
            KeyCode::KeyR => {
                self.controller.mapper_mut().reset();
                self.controller.refresh_hover(buffers);
                log::info!("View reset");
            }
            KeyCode::KeyN => {
                self.engine.restart(Instant::now(), buffers);
                self.engine
                    .seed_random(self.config.initial_fire_cells, buffers);
            }
            _ => {}
        }
    }

    fn handle_cursor_moved(&mut self, x: f32, y: f32) {
        let Some(buffers) = self.buffers.as_mut() else {
            return;
        };
        self.cursor = Some((x, y));
        let velocity = self.motion.update(x, y);
        self.controller.pointer_move(
            PointerMove {
                screen_x: x,
                screen_y: y,
                is_down: self.primary_down,
                velocity,
            },
            buffers,
        );
    }

    fn handle_mouse_button(&mut self, state: ElementState, button: MouseButton) {
        let Some(buffers) = self.buffers.as_mut() else {
            return;
        };
        let button = match button {
            MouseButton::Left => PointerButton::Primary,
            MouseButton::Right => PointerButton::Secondary,
            MouseButton::Middle => PointerButton::Middle,
            _ => PointerButton::Other,
        };

        if button == PointerButton::Primary {
            self.primary_down = state.is_pressed();
        }
        if !state.is_pressed() {
            return;
        }
        if let Some((x, y)) = self.cursor {
            let event = PointerDown {
                screen_x: x,
                screen_y: y,
                button,
            };
            if self.controller.pointer_down(event, &mut self.engine, buffers) {
                log::debug!("Extinguished fire at ({:.0}, {:.0})", x, y);
            }
        }
    }

    fn handle_wheel(&mut self, delta: MouseScrollDelta) {
        let Some(buffers) = self.buffers.as_mut() else {
            return;
        };
        // winit reports scrolling up (away from the user) as positive
        let delta_y = match delta {
            MouseScrollDelta::LineDelta(_, y) => -y,
            MouseScrollDelta::PixelDelta(position) => -(position.y as f32),
        };
        self.controller.wheel(Wheel { delta_y }, buffers);
    }

    fn handle_cursor_left(&mut self) {
        let Some(buffers) = self.buffers.as_mut() else {
            return;
        };
        self.cursor = None;
        self.primary_down = false;
        self.motion.reset();
        self.controller.pointer_leave(buffers);
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        log::info!("Initializing fire spread simulation...");
        log::info!(
            "Grid: {}x{} cells of {} px, spread chance {} every {:?}",
            self.config.grid_cells,
            self.config.grid_cells,
            self.config.cell_size,
            self.config.spread_chance,
            self.config.spread_interval
        );

        let window_attrs = Window::default_attributes()
            .with_title("Wildfire - Initializing...")
            .with_inner_size(winit::dpi::LogicalSize::new(WINDOW_SIZE.0, WINDOW_SIZE.1));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        log::info!("Creating GPU context...");
        let gpu = match pollster::block_on(GpuContext::new(window.clone())) {
            Ok(gpu) => gpu,
            Err(e) => {
                log::error!("GPU initialization failed: {}", e);
                event_loop.exit();
                return;
            }
        };

        let grid = GridCoordinate::from_config(&self.config);
        let mut buffers = FireBuffers::new(&gpu.device, grid);
        let render_pipeline = RenderPipeline::new(&gpu.device, gpu.format(), &buffers);

        let (width, height) = gpu.size();
        self.controller.mapper_mut().resize(width, height);

        self.engine
            .seed_random(self.config.initial_fire_cells, &mut buffers);

        log::info!("Initialization complete!");
        log::info!("Controls:");
        log::info!("  Left click: Extinguish fire");
        log::info!("  Left drag: Pan view");
        log::info!("  Wheel: Zoom in/out");
        log::info!("  R: Reset view");
        log::info!("  N: New fires");
        log::info!("  Escape: Quit");

        window.request_redraw();
        self.window = Some(window);
        self.gpu = Some(gpu);
        self.buffers = Some(buffers);
        self.render_pipeline = Some(render_pipeline);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting...");
                event_loop.exit();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state.is_pressed() {
                    if let PhysicalKey::Code(key_code) = event.physical_key {
                        if key_code == KeyCode::Escape {
                            log::info!("Escape pressed, exiting...");
                            event_loop.exit();
                        } else {
                            self.handle_key(key_code);
                        }
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.handle_cursor_moved(position.x as f32, position.y as f32);
            }
            WindowEvent::CursorLeft { .. } => self.handle_cursor_left(),
            WindowEvent::MouseInput { state, button, .. } => {
                self.handle_mouse_button(state, button);
            }
            WindowEvent::MouseWheel { delta, .. } => self.handle_wheel(delta),
            WindowEvent::Resized(new_size) => {
                if let (Some(gpu), Some(buffers)) = (&mut self.gpu, &mut self.buffers) {
                    if gpu.resize(new_size) {
                        log::info!("Window resized to {}x{}", new_size.width, new_size.height);
                        let (width, height) = gpu.size();
                        self.controller.mapper_mut().resize(width, height);
                        self.controller.refresh_hover(buffers);
                    }
                }
            }
            WindowEvent::RedrawRequested => {
                self.render();
                // Request another frame immediately
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}

/// Simple FPS counter
struct FpsCounter {
    last_update: Instant,
    frame_count: u32,
}

impl FpsCounter {
    fn new() -> Self {
        Self {
            last_update: Instant::now(),
            frame_count: 0,
        }
    }

    /// Tick the counter, returns Some(fps) every second
    fn tick(&mut self) -> Option<f64> {
        self.frame_count += 1;
        let elapsed = self.last_update.elapsed();

        if elapsed.as_secs_f64() >= 1.0 {
            let fps = self.frame_count as f64 / elapsed.as_secs_f64();
            self.frame_count = 0;
            self.last_update = Instant::now();
            Some(fps)
        } else {
            None
        }
    }
}
