use std::env;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, ensure, Context, Result};
use log::info;
use pollster::block_on;
use thiserror::Error;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode as WinitKey, PhysicalKey};
use winit::window::{CursorGrabMode, Window, WindowId};

use glint_viewer::{
    CameraController, FrameClock, InputState, KeyCode, NamedKey, Renderer, Scene,
};

const WINDOW_TITLE: &str = "Glint Viewer";

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = CliOptions::parse()?;
    let mut scene = Scene::demo();
    if let Some(thickness) = options.outline {
        scene.outline.thickness = thickness;
    }

    println!("{}", scene.summary());
    if options.summary_only {
        return Ok(());
    }

    match run_interactive(scene) {
        Ok(()) => Ok(()),
        Err(err) if err.downcast_ref::<SetupError>().is_some() => {
            eprintln!(
                "{err}. Scene summary printed above; set DISPLAY or install GPU drivers to enable rendering."
            );
            Ok(())
        }
        Err(err) => Err(err),
    }
}

fn run_interactive(scene: Scene) -> Result<()> {
    let event_loop = EventLoop::new().map_err(|err| SetupError::EventLoop(err.to_string()))?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(scene);
    event_loop
        .run_app(&mut app)
        .map_err(|err| SetupError::EventLoop(err.to_string()))?;

    match app.outcome {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Fatal failures during window or graphics setup. They abort before the
/// frame loop starts; the CLI falls back to the summary printout.
#[derive(Debug, Error)]
enum SetupError {
    #[error("failed to initialize event loop: {0}")]
    EventLoop(String),
    #[error("failed to create window: {0}")]
    Window(String),
    #[error("failed to initialize graphics: {0}")]
    Graphics(String),
}

struct App {
    scene: Scene,
    input: InputState,
    camera: CameraController,
    clock: FrameClock,
    start: Instant,
    renderer: Option<Renderer>,
    outcome: Option<anyhow::Error>,
}

impl App {
    fn new(scene: Scene) -> Self {
        Self {
            scene,
            input: InputState::new(),
            camera: CameraController::new(),
            clock: FrameClock::new(),
            start: Instant::now(),
            renderer: None,
            outcome: None,
        }
    }

    fn init_graphics(&self, event_loop: &ActiveEventLoop) -> Result<Renderer, SetupError> {
        let window = event_loop
            .create_window(
                Window::default_attributes()
                    .with_title(WINDOW_TITLE)
                    .with_inner_size(LogicalSize::new(1280.0, 720.0)),
            )
            .map_err(|err| SetupError::Window(err.to_string()))?;
        let window = Arc::new(window);

        // Capture the pointer for free-look; not every platform supports
        // both grab modes, so fall back before giving up.
        if window.set_cursor_grab(CursorGrabMode::Confined).is_err() {
            let _ = window.set_cursor_grab(CursorGrabMode::Locked);
        }
        window.set_cursor_visible(false);

        block_on(Renderer::new(Arc::clone(&window), &self.scene))
            .map_err(|err| SetupError::Graphics(format!("{err:#}")))
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };

        let now = self.start.elapsed().as_secs_f64();
        let delta = self.clock.tick(now);
        self.camera.tick(&self.input, delta);

        if let Some(fps) = self.clock.take_fps_sample() {
            renderer
                .window()
                .set_title(&format!("{WINDOW_TITLE} | FPS : {fps}"));
        }

        let snapshot = self.camera.snapshot();
        match renderer.render(&self.scene, &snapshot) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let size = renderer.window().inner_size();
                renderer.resize(size);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                self.outcome = Some(anyhow!("GPU is out of memory"));
                event_loop.exit();
            }
            Err(wgpu::SurfaceError::Timeout) => {
                info!("surface timeout; retrying next frame");
            }
            Err(err) => {
                self.outcome = Some(anyhow!("unrecoverable surface error: {err}"));
                event_loop.exit();
            }
        }
    }

    fn handle_key(&self, event_loop: &ActiveEventLoop, key: WinitKey, state: ElementState) {
        if key == WinitKey::Escape && state == ElementState::Pressed {
            event_loop.exit();
            return;
        }
        let Some(key) = map_keycode(key) else {
            return;
        };
        match state {
            ElementState::Pressed => self.input.set_key_down(key),
            ElementState::Released => self.input.set_key_up(key),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.renderer.is_some() {
            return;
        }
        match self.init_graphics(event_loop) {
            Ok(renderer) => self.renderer = Some(renderer),
            Err(err) => {
                self.outcome = Some(err.into());
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if self
            .renderer
            .as_ref()
            .is_some_and(|renderer| renderer.window_id() != window_id)
        {
            return;
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let Some(renderer) = self.renderer.as_mut() {
                    renderer.resize(size);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(code) = event.physical_key {
                    self.handle_key(event_loop, code, event.state);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.camera
                    .cursor_moved(position.x as f32, position.y as f32);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let dy = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(position) => position.y as f32 / 20.0,
                };
                self.camera.scroll(dy);
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(renderer) = &self.renderer {
            renderer.window().request_redraw();
        }
    }
}

fn map_keycode(code: WinitKey) -> Option<KeyCode> {
    Some(match code {
        WinitKey::KeyW => KeyCode::Character('W'),
        WinitKey::KeyA => KeyCode::Character('A'),
        WinitKey::KeyS => KeyCode::Character('S'),
        WinitKey::KeyD => KeyCode::Character('D'),
        WinitKey::Space => KeyCode::Named(NamedKey::Space),
        WinitKey::Escape => KeyCode::Named(NamedKey::Escape),
        WinitKey::ShiftLeft => KeyCode::Named(NamedKey::LeftShift),
        WinitKey::ShiftRight => KeyCode::Named(NamedKey::RightShift),
        _ => return None,
    })
}

struct CliOptions {
    outline: Option<f32>,
    summary_only: bool,
}

impl CliOptions {
    fn parse() -> Result<Self> {
        let mut args = env::args().skip(1);
        let mut outline = None;
        let mut summary_only = false;
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--outline" => {
                    let value = args
                        .next()
                        .ok_or_else(|| anyhow!("--outline requires a value"))?;
                    let value: f32 = value
                        .parse()
                        .with_context(|| format!("invalid outline thickness: {value}"))?;
                    ensure!(value >= 0.0, "outline thickness must be non-negative");
                    outline = Some(value);
                }
                "--summary-only" => summary_only = true,
                other => {
                    return Err(anyhow!(
                        "Unknown argument: {other}. Usage: glint-viewer [--outline <thickness>] [--summary-only]"
                    ));
                }
            }
        }
        Ok(Self {
            outline,
            summary_only,
        })
    }
}
