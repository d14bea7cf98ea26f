use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use parametric_scene::cli::Cli;
use parametric_scene::config::Preset;
use parametric_scene::frame::{FpsCounter, FrameTimer};
use parametric_scene::input::PointerTracker;
use parametric_scene::panel::{ControlPanel, PanelStats};
use parametric_scene::regen::RegenerationController;
use parametric_scene::renderer::MeshRenderer;
use parametric_scene::scenes::SceneSetup;
use parametric_scene::traits::RenderSurface;

const INITIAL_WINDOW_WIDTH: u32 = 1280;
const INITIAL_WINDOW_HEIGHT: u32 = 800;

struct App {
    setup: SceneSetup,
    show_ui: bool,
    window: Option<Arc<Window>>,
    renderer: Option<MeshRenderer>,
    pointer: PointerTracker,
    panel: ControlPanel,
    frames: FrameTimer,
    fps: FpsCounter,
}

impl App {
    fn new(setup: SceneSetup, show_ui: bool) -> Self {
        Self {
            setup,
            show_ui,
            window: None,
            renderer: None,
            pointer: PointerTracker::new(),
            panel: ControlPanel::new(),
            frames: FrameTimer::new(),
            fps: FpsCounter::new(),
        }
    }

    fn redraw(&mut self) {
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };
        if let Some(frame) = self.frames.next() {
            self.fps.record(frame.delta);
        }

        let camera = &mut self.setup.camera;
        let (dx, dy) = self.pointer.take_drag();
        if dx != 0.0 || dy != 0.0 {
            camera.orbit(dx, dy);
        }
        let scroll = self.pointer.take_scroll();
        if scroll != 0.0 {
            camera.zoom(scroll);
        }
        camera.update();

        let stats = PanelStats {
            scene: self.setup.kind.name(),
            fps: self.fps.fps(),
            nodes: self.setup.scene.node_count(),
            geometries: self.setup.scene.live_geometry_count(),
        };
        let config = &mut self.setup.config;
        let panel = &mut self.panel;
        renderer.run_ui(|ctx| panel.show(ctx, config, stats));

        let changes = self.setup.config.drain_changes();
        if !changes.is_empty() {
            RegenerationController::new(&mut self.setup.scene, &self.setup.config)
                .apply_all(&changes);
        }

        let SceneSetup {
            scene,
            config,
            driver,
            camera,
            ..
        } = &mut self.setup;
        driver.tick(scene, config, renderer, camera);
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let window = match event_loop.create_window(
            Window::default_attributes()
                .with_title(format!("Parametric Scene - {}", self.setup.kind.name()))
                .with_inner_size(winit::dpi::LogicalSize::new(
                    INITIAL_WINDOW_WIDTH,
                    INITIAL_WINDOW_HEIGHT,
                )),
        ) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                error!("failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let renderer = match pollster::block_on(MeshRenderer::new(window.clone(), self.show_ui)) {
            Ok(r) => r,
            Err(e) => {
                error!("failed to initialize renderer: {e:#}");
                event_loop.exit();
                return;
            }
        };

        let size = window.inner_size();
        self.setup.camera.set_viewport(size.width, size.height);
        self.window = Some(window);
        self.renderer = Some(renderer);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        // the panel gets the event first
        if let Some(renderer) = &mut self.renderer {
            if renderer.handle_event(&event) {
                return;
            }
        }
        if self.pointer.process_event(&event) {
            self.setup.driver.signal_activity();
        }

        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => event_loop.exit(),
            WindowEvent::KeyboardInput { event, .. } => self.setup.camera.process_keyboard(&event),
            WindowEvent::Resized(size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(size.width, size.height);
                }
                self.setup.camera.set_viewport(size.width, size.height);
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = cli.scene.default_config();
    if let Some(path) = &cli.preset {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read preset {}", path.display()))?;
        let preset = Preset::from_json(&text)
            .with_context(|| format!("invalid preset {}", path.display()))?;
        let applied = config
            .apply_preset(&preset)
            .with_context(|| format!("preset {} does not fit the {} scene", path.display(), cli.scene.name()))?;
        // the scene is built from the full snapshot below
        config.drain_changes();
        info!("applied {applied} values from {}", path.display());
    }

    if cli.dump_preset {
        println!("{}", config.snapshot().to_json()?);
        return Ok(());
    }

    let setup = cli.scene.build(config).context("failed to build scene")?;
    let event_loop = EventLoop::new()?;
    let mut app = App::new(setup, !cli.no_ui);

    info!("controls: drag to orbit, wheel or W/S to zoom, A/D and Q/E to turn, Escape to quit");
    event_loop.run_app(&mut app)?;

    Ok(())
}
