use anyhow::{Context as _, Result, anyhow};
use clap::Parser;
use egui::Context as EguiContext;
use karting_input::{Action, InputFrame};
use karting_kernel::{Clock, RaceConfig, RaceSim, SimError, SystemClock};
use karting_render::{CameraMode, ChaseCamera, SceneFrame};
use karting_render_wgpu::WgpuRenderer;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, KeyEvent, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

/// Pixels of trackpad scroll that count as one wheel line.
const PIXELS_PER_SCROLL_LINE: f64 = 40.0;

#[derive(Parser)]
#[command(name = "karting-desktop", about = "Kart racing demo")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Race configuration (YAML); built-in defaults when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn key_action(key: KeyCode) -> Option<Action> {
    Some(match key {
        KeyCode::KeyA => Action::SteerLeft,
        KeyCode::KeyD => Action::SteerRight,
        KeyCode::KeyW => Action::Throttle,
        KeyCode::KeyS => Action::Brake,
        KeyCode::KeyZ => Action::ToggleCamera,
        KeyCode::KeyQ => Action::DayMode,
        KeyCode::KeyE => Action::NightMode,
        KeyCode::Space => Action::TogglePause,
        KeyCode::Escape | KeyCode::KeyF => Action::Quit,
        _ => return None,
    })
}

/// Application state.
struct AppState {
    sim: RaceSim,
    camera: ChaseCamera,
    clock: SystemClock,
    input: InputFrame,
    show_hud: bool,
    last_cursor: Option<PhysicalPosition<f64>>,
    last_frame: Instant,
    // Fixed timestep
    tick_accumulator: f64,
    tick_rate: f64,
}

impl AppState {
    fn new(config: RaceConfig) -> Self {
        let tick_rate = config.tick_seconds();
        let clock = SystemClock::new();
        Self {
            sim: RaceSim::new(config),
            camera: ChaseCamera::new(clock.now()),
            clock,
            input: InputFrame::new(),
            show_hud: true,
            last_cursor: None,
            last_frame: Instant::now(),
            tick_accumulator: 0.0,
            tick_rate,
        }
    }

    fn handle_key(&mut self, key: KeyCode, pressed: bool) {
        if key == KeyCode::F1 && pressed {
            self.show_hud = !self.show_hud;
            return;
        }
        let Some(action) = key_action(key) else {
            return;
        };
        if pressed {
            self.input.press(action);
        } else {
            self.input.release(action);
        }
    }

    fn handle_cursor(&mut self, position: PhysicalPosition<f64>) {
        if let Some(last) = self.last_cursor {
            self.input
                .add_pointer_delta((position.x - last.x) as f32, (position.y - last.y) as f32);
        }
        self.last_cursor = Some(position);
    }

    /// Advance the race by however many fixed ticks fit in `dt`, then re-aim
    /// the camera.
    fn update(&mut self, dt: f64, width: u32, height: u32) -> Result<(), SimError> {
        let now = self.clock.now();
        self.camera.handle_input(&self.input, now);
        self.input.consume_motion();

        self.tick_accumulator += dt;
        while self.tick_accumulator >= self.tick_rate {
            self.tick_accumulator -= self.tick_rate;
            self.sim.tick(now, &self.input)?;
            // Edges are seen by exactly one tick.
            self.input.consume_edges();
        }

        for event in self.sim.drain_events() {
            if event.is_console() {
                println!("{event}");
            } else {
                tracing::debug!("{event}");
            }
        }

        self.camera.follow(self.sim.player(), width, height);
        Ok(())
    }

    fn draw_ui(&self, ctx: &EguiContext) {
        if !self.show_hud {
            return;
        }

        let scene = SceneFrame::capture(&self.sim);
        let hud = &scene.hud;

        egui::Window::new("Race")
            .default_pos([12.0, 12.0])
            .resizable(false)
            .show(ctx, |ui| {
                ui.label(format!("Lights: {}", hud.phase));
                ui.label(format!("Speed: {:.4}", hud.player_speed));
                ui.label(format!(
                    "Ghosts: {}",
                    if hud.paused { "paused" } else { "running" }
                ));
                ui.label(format!(
                    "Camera: {}",
                    match self.camera.mode {
                        CameraMode::Orbit => "orbit",
                        CameraMode::Cockpit => "cockpit",
                    }
                ));
                if !hud.race_started {
                    ui.label("Waiting for green...");
                }

                if !hud.results.is_empty() {
                    ui.separator();
                    ui.heading("Results");
                    for record in &hud.results {
                        ui.label(format!("{}. {}  {:.2}s", record.rank, record.name, record.time));
                    }
                }

                ui.separator();
                ui.small("W/S: Throttle/Brake | A/D: Steer | Z: Camera");
                ui.small("Space: Pause ghosts | Q/E: Day/Night | Esc/F: Quit | F1: HUD");
            });
    }
}

/// Window plus everything that renders into it.
struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: WgpuRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl Gpu {
    fn new(
        event_loop: &ActiveEventLoop,
        egui_ctx: &EguiContext,
        size: PhysicalSize<u32>,
    ) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title("Karting")
            .with_inner_size(size);
        let window = Arc::new(event_loop.create_window(attrs).context("create window")?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("create surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or_else(|| anyhow!("no suitable GPU adapter"))?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("karting_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("create device")?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or_else(|| anyhow!("surface reports no formats"))?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let renderer = WgpuRenderer::new(&device, surface_format, config.width, config.height);

        let egui_winit = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            renderer,
            egui_winit,
            egui_renderer,
        })
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.config.width = size.width.max(1);
        self.config.height = size.height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.renderer
            .resize(&self.device, self.config.width, self.config.height);
    }

    fn draw(&mut self, state: &AppState, egui_ctx: &EguiContext) {
        let output = match self.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let scene = SceneFrame::capture(&state.sim);
        self.renderer
            .render(&self.device, &self.queue, &view, &state.camera, &scene);

        let raw_input = self.egui_winit.take_egui_input(&self.window);
        let full_output = egui_ctx.run(raw_input, |ctx| {
            state.draw_ui(ctx);
        });
        self.egui_winit
            .handle_platform_output(&self.window, full_output.platform_output);

        let paint_jobs = egui_ctx.tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, image_delta);
        }
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            self.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        output.present();
    }
}

struct GpuApp {
    state: AppState,
    window_size: PhysicalSize<u32>,
    gpu: Option<Gpu>,
    egui_ctx: EguiContext,
    /// Why the loop stopped, if it was not a clean exit.
    failure: Option<anyhow::Error>,
}

impl GpuApp {
    fn new(config: RaceConfig) -> Self {
        Self {
            window_size: PhysicalSize::new(config.window.width, config.window.height),
            state: AppState::new(config),
            gpu: None,
            egui_ctx: EguiContext::default(),
            failure: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        tracing::error!("{error:#}");
        self.failure = Some(error);
        event_loop.exit();
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        let dt = (now - self.state.last_frame).as_secs_f64().min(0.1);
        self.state.last_frame = now;

        let Some(gpu) = &mut self.gpu else {
            return;
        };
        let (width, height) = (gpu.config.width, gpu.config.height);
        if let Err(e) = self.state.update(dt, width, height) {
            self.fail(event_loop, e.into());
            return;
        }
        if self.state.sim.exit_requested() {
            tracing::info!("race closed");
            event_loop.exit();
            return;
        }

        gpu.draw(&self.state, &self.egui_ctx);
        gpu.window.request_redraw();
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        match Gpu::new(event_loop, &self.egui_ctx, self.window_size) {
            Ok(gpu) => self.gpu = Some(gpu),
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(gpu) = &mut self.gpu {
            let response = gpu.egui_winit.on_window_event(&gpu.window, &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(new_size);
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: key_state,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                self.state
                    .handle_key(key, key_state == ElementState::Pressed);
            }
            WindowEvent::Focused(false) => {
                self.state.input.release_all();
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.state.handle_cursor(position);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => (p.y / PIXELS_PER_SCROLL_LINE) as f32,
                };
                self.state.input.add_scroll(lines);
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = match &cli.config {
        Some(path) => RaceConfig::load(path)
            .with_context(|| format!("loading race config {}", path.display()))?,
        None => RaceConfig::default(),
    };

    tracing::info!("karting-desktop starting");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(config);
    event_loop.run_app(&mut app)?;

    match app.failure {
        Some(error) => Err(error),
        None => Ok(()),
    }
}
