use anyhow::Context;
use cgmath::Vector2;
use web_time::Instant;
use winit::{
    event::*,
    event_loop::{ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowBuilder},
};

pub mod audio;
pub mod graphics;
pub mod hud;
pub mod session;
pub mod settings;
pub mod target;
pub mod timer;

use graphics::Shape;
use session::{PlayArea, Session, SessionEvent};
use settings::Settings;
use timer::{FrameClock, SpawnTimer};

const TITLE: &str = "Aim Trainer";

fn play_area(settings: &Settings, size: winit::dpi::PhysicalSize<u32>) -> PlayArea {
    PlayArea::new(
        size.width as f32,
        size.height as f32,
        settings.target_padding,
        settings.top_bar_height,
    )
}

struct State<'a> {
    surface: wgpu::Surface<'a>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    size: winit::dpi::PhysicalSize<u32>,
    shapes: graphics::ShapePipeline,

    settings: Settings,
    session: Session,
    /// Input collected since the last tick
    pending: Vec<SessionEvent>,
    cursor_position: winit::dpi::PhysicalPosition<f64>,
    start_time: Instant,
    spawn_timer: SpawnTimer,
    frame_clock: FrameClock,

    hud: Option<hud::Hud>,
    /// What the title bar shows when there is no font for the HUD
    title: String,
    sfx: Option<audio::Sfx>,

    // Declaring window after surface is important to ensure surface is dropped first (as it contains unsafe references to the window's resources)
    window: &'a Window,
}

impl<'a> State<'a> {
    async fn new(window: &'a Window, settings: Settings) -> anyhow::Result<State<'a>> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window)
            .context("failed to create surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no compatible graphics adapter")?;
        log::info!("using adapter {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: None,
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await
            .context("failed to open graphics device")?;

        let surface_capabilities = surface.get_capabilities(&adapter);
        let surface_format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_capabilities.formats.first().copied())
            .context("surface reports no formats")?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            // Fifo is always supported and the frame clock does the pacing anyway
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_capabilities
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shapes = graphics::ShapePipeline::new(&device, config.format);

        let hud = match hud::load_font(settings.font_path.as_deref()) {
            Some(font) => Some(hud::Hud::new(
                &device,
                &config,
                font,
                settings.label_font_size,
            )),
            None => {
                log::warn!(
                    "no usable font found (set {} to a .ttf file), stats will show in the title bar",
                    settings::FONT_ENV_VAR
                );
                None
            }
        };

        let sfx = match audio::Sfx::new() {
            Ok(sfx) => Some(sfx),
            Err(err) => {
                log::warn!("audio disabled: {:#}", err);
                None
            }
        };

        let session = Session::new(play_area(&settings, size), settings.lives);
        let start_time = Instant::now();
        let spawn_timer = SpawnTimer::new(settings.spawn_interval, start_time);
        let frame_clock = FrameClock::new(settings.frame_period(), start_time);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
            shapes,

            settings,
            session,
            pending: Vec::new(),
            cursor_position: winit::dpi::PhysicalPosition::new(0.0, 0.0),
            start_time,
            spawn_timer,
            frame_clock,

            hud,
            title: TITLE.to_string(),
            sfx,

            window,
        })
    }

    pub fn window(&self) -> &Window {
        self.window
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);

            if let Some(hud) = &mut self.hud {
                hud.resize(new_size.width, new_size.height, &self.queue);
            }
            self.session
                .set_play_area(play_area(&self.settings, new_size));
        }
    }

    fn play(&self, cue: audio::Cue) {
        if let Some(sfx) = &self.sfx {
            sfx.play(cue);
        }
    }

    /// Returns true if the event was consumed, false lets the main loop handle it
    fn input(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor_position = *position;
                true
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => {
                if self.session.is_running() {
                    self.pending.push(SessionEvent::Click {
                        x: self.cursor_position.x as f32,
                        y: self.cursor_position.y as f32,
                    });
                    self.play(audio::Cue::Click);
                }
                true
            }
            _ => false,
        }
    }

    fn update(&mut self) {
        let now = Instant::now();
        if self.session.is_running() && self.spawn_timer.poll(now) {
            self.pending.push(SessionEvent::Spawn);
        }

        let report = self
            .session
            .tick(now - self.start_time, self.pending.drain(..));

        if report.hits > 0 {
            self.play(audio::Cue::Hit);
        }
        if report.ended {
            let stats = self.session.stats();
            log::info!(
                "session over after {:.1}s: {} hits, {} clicks, {:.1}% accuracy",
                stats.elapsed.as_secs_f32(),
                stats.hits,
                stats.clicks,
                stats.accuracy()
            );
            self.play(audio::Cue::GameOver);
        } else if report.misses > 0 {
            self.play(audio::Cue::Miss);
        }

        let stats = self.session.stats();
        let running = self.session.is_running();
        let labels = if running {
            hud::status_labels(&stats, self.session.lives_remaining())
        } else {
            hud::summary_labels(&stats)
        };

        match &mut self.hud {
            Some(hud) if running => hud.set_status(labels),
            Some(hud) => hud.set_summary(labels),
            None => {
                let title = format!("{} | {}", TITLE, labels.join(" | "));
                if title != self.title {
                    self.window.set_title(&title);
                    self.title = title;
                }
            }
        }
    }

    fn frame_shapes(&self) -> Vec<Shape> {
        if !self.session.is_running() {
            return Vec::new();
        }

        let mut shapes = self
            .session
            .targets()
            .iter()
            .map(|target| Shape::Target {
                center: target.position(),
                radius: target.size(),
            })
            .collect::<Vec<_>>();

        // Drawn last so targets slide underneath it
        shapes.push(Shape::Bar {
            origin: Vector2::new(0.0, 0.0),
            size: Vector2::new(self.size.width as f32, self.settings.top_bar_height),
            color: graphics::status_bar(),
        });
        shapes
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let instances = self
            .frame_shapes()
            .iter()
            .map(|shape| shape.to_raw(self.config.width, self.config.height))
            .collect::<Vec<_>>();
        self.shapes.prepare(&self.device, &self.queue, &instances);

        let ended = !self.session.is_running();
        if let Some(hud) = &mut self.hud {
            hud.prepare(&self.device, &self.queue, ended);
        }

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        // This block is required so that a mutable borrow on `encoder` ends so we can call `finish()` on it later
        {
            let [r, g, b, a] = graphics::background();
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: r as f64,
                            g: g as f64,
                            b: b as f64,
                            a: a as f64,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            self.shapes.draw(&mut render_pass);
            if let Some(hud) = &self.hud {
                hud.draw(&mut render_pass);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

pub async fn run() -> anyhow::Result<()> {
    // When wgpu hits an error, it panics with a generic message and logs the real error via the log crate.
    // Enabling logging like this will prevent wgpu from failing silently.
    env_logger::init();

    let settings = Settings::from_env();

    let event_loop = EventLoop::new().context("failed to create event loop")?;
    let icon = graphics::target_icon(64)?;
    let window = WindowBuilder::new()
        .with_inner_size(winit::dpi::PhysicalSize::new(
            settings.window_width,
            settings.window_height,
        ))
        .with_title(TITLE)
        .with_window_icon(Some(icon))
        .build(&event_loop)
        .context("failed to create window")?;
    log::info!("window size: {:?}", window.inner_size());

    let mut state = State::new(&window, settings).await?;

    event_loop.run(move |event, control_flow| match event {
        Event::WindowEvent {
            ref event,
            window_id,
        } if window_id == state.window().id() => {
            if !state.input(event) {
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
                    } => control_flow.exit(),
                    // Any key dismisses the end screen
                    WindowEvent::KeyboardInput {
                        event:
                            KeyEvent {
                                state: ElementState::Pressed,
                                ..
                            },
                        ..
                    } if !state.session.is_running() => control_flow.exit(),
                    WindowEvent::Resized(physical_size) => {
                        log::info!("physical_size: {:?}", physical_size);
                        state.resize(*physical_size);
                    }
                    WindowEvent::RedrawRequested => {
                        if state.frame_clock.take_tick() {
                            state.update();
                        }
                        match state.render() {
                            Ok(_) => {}
                            // Reconfigure the surface if lost
                            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                                state.resize(state.size)
                            }
                            // Out of memory, probably best to exit
                            Err(wgpu::SurfaceError::OutOfMemory) => {
                                log::error!("OutOfMemory");
                                control_flow.exit();
                            }
                            Err(wgpu::SurfaceError::Timeout) => {
                                // This happens when a frame takes too long to present
                                log::warn!("Surface timeout")
                            }
                        }
                    }
                    _ => {}
                }
            }
        }
        Event::AboutToWait => {
            if state.frame_clock.poll(Instant::now()) {
                state.window().request_redraw();
            }
            control_flow.set_control_flow(ControlFlow::WaitUntil(state.frame_clock.deadline()));
        }
        _ => {}
    })?;

    Ok(())
}
