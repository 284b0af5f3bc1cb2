use anyhow::Result;
use clap::Parser;
use orb_viewport::{Renderer, ViewportOptions};
use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

mod cli;

use cli::Args;

/// Application state
struct App {
    options: ViewportOptions,
    window: Option<std::sync::Arc<Window>>,
    renderer: Option<Renderer>,
}

impl App {
    fn new(options: ViewportOptions) -> Self {
        Self {
            options,
            window: None,
            renderer: None,
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(renderer) = &mut self.renderer else {
            return;
        };

        if let Err(e) = renderer.render() {
            // Check if it's a surface error we can handle
            if let Some(surface_err) = e.downcast_ref::<wgpu::SurfaceError>() {
                match surface_err {
                    wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
                        // Surface lost, reconfigure; the frame is dropped and redone
                        let size = renderer.size;
                        if let Err(e) = renderer.resize(size) {
                            log::error!("Failed to reconfigure surface: {:?}", e);
                        }
                    }
                    wgpu::SurfaceError::OutOfMemory => {
                        log::error!("Out of memory!");
                        event_loop.exit();
                    }
                    _ => {
                        log::warn!("Surface error: {:?}", surface_err);
                    }
                }
            } else {
                log::error!("Render error: {:?}", e);
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attrs = Window::default_attributes()
            .with_title("Orb Viewer")
            .with_inner_size(winit::dpi::PhysicalSize::new(
                self.options.camera.image_width,
                self.options.camera.image_height,
            ));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => std::sync::Arc::new(window),
            Err(e) => {
                log::error!("Failed to create window: {:?}", e);
                event_loop.exit();
                return;
            }
        };

        // Initialize renderer (async in pollster block)
        match pollster::block_on(Renderer::new(window.clone(), self.options.clone())) {
            Ok(renderer) => {
                self.renderer = Some(renderer);
                window.request_redraw();
                self.window = Some(window);
                log::info!("Window and renderer initialized");
            }
            Err(e) => {
                log::error!("Failed to initialize renderer: {:?}", e);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                log::info!("Close requested");
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(renderer) = &mut self.renderer {
                    match renderer.resize((physical_size.width, physical_size.height)) {
                        Ok(()) => log::info!(
                            "Resized to {}x{}",
                            physical_size.width,
                            physical_size.height
                        ),
                        Err(e) => log::error!("Resize failed: {:?}", e),
                    }
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);

                // Request next frame
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}

/// Render one CPU frame straight to a PNG.
fn render_headless(args: &Args, path: &std::path::Path) -> Result<()> {
    let settings = args.camera_settings()?;
    let camera = settings.to_camera()?;

    log::info!(
        "Rendering {}x{} to {}",
        settings.image_width,
        settings.image_height,
        path.display()
    );
    let image = orb_renderer::render(
        &camera,
        &orb_renderer::SCENE_SPHERE,
        settings.image_width,
        settings.image_height,
    )?;
    image.save_png(path)?;

    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(args.log_level.into())
        .init();

    log::info!("Starting Orb Viewer");

    if let Some(path) = &args.output {
        return render_headless(&args, path);
    }

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(args.viewport_options()?);

    log::info!("Running event loop");
    event_loop.run_app(&mut app)?;

    Ok(())
}
