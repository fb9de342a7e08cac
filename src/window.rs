//! Window shell driving the particle field.
//!
//! A winit application in the usual shape: `resumed` creates the
//! window and GPU state, `window_event` routes pointer and resize
//! notifications into the tracker and renders on `RedrawRequested`,
//! rescheduling itself every frame.

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::config::FieldConfig;
use crate::error::AppError;
use crate::field::ParticleField;
use crate::gpu::GpuState;
use crate::input::PointerTracker;
use crate::time::FrameClock;

const WINDOW_TITLE: &str = "plexus";
const DEFAULT_WIDTH: u32 = 1280;
const DEFAULT_HEIGHT: u32 = 720;

pub struct App {
    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    field: Option<ParticleField>,
    pointer: PointerTracker,
    clock: FrameClock,
    fatal: Option<AppError>,
}

impl App {
    pub fn new() -> Self {
        Self {
            window: None,
            gpu: None,
            field: None,
            pointer: PointerTracker::new(DEFAULT_WIDTH as f32, DEFAULT_HEIGHT as f32),
            clock: FrameClock::new(),
            fatal: None,
        }
    }

    fn scale_factor(&self) -> f64 {
        self.window.as_ref().map_or(1.0, |w| w.scale_factor())
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title(WINDOW_TITLE)
            .with_inner_size(winit::dpi::LogicalSize::new(DEFAULT_WIDTH, DEFAULT_HEIGHT));

        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                self.fatal = Some(AppError::Window(e));
                event_loop.exit();
                return;
            }
        };

        let logical = window.inner_size().to_logical::<f32>(window.scale_factor());
        self.pointer.viewport_resized(logical.width, logical.height);
        let field = ParticleField::new(FieldConfig::for_viewport(logical.width));

        match pollster::block_on(GpuState::new(window.clone(), &field)) {
            Ok(gpu) => {
                self.window = Some(window);
                self.gpu = Some(gpu);
                self.field = Some(field);
            }
            Err(e) => {
                self.fatal = Some(AppError::Gpu(e));
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                let logical = physical_size.to_logical::<f32>(self.scale_factor());
                self.pointer.viewport_resized(logical.width, logical.height);
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(physical_size);
                }
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.set_scale_factor(scale_factor);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                let logical = position.to_logical::<f32>(self.scale_factor());
                self.pointer.pointer_moved(logical.x, logical.y);
            }
            WindowEvent::RedrawRequested => {
                if let (Some(gpu), Some(field)) = (&mut self.gpu, &mut self.field) {
                    let snapshot = self.pointer.snapshot();
                    field.step(&snapshot);
                    let (time, delta) = self.clock.update();
                    match gpu.render(field, time, delta) {
                        Ok(_) => {}
                        Err(wgpu::SurfaceError::Lost) => gpu.resize(winit::dpi::PhysicalSize {
                            width: gpu.config.width,
                            height: gpu.config.height,
                        }),
                        Err(wgpu::SurfaceError::OutOfMemory) => event_loop.exit(),
                        Err(e) => eprintln!("Render error: {:?}", e),
                    }
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}

/// Run the particle background until the window closes.
pub fn run() -> Result<(), AppError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new();
    event_loop.run_app(&mut app)?;

    match app.fatal {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
