//! Jointlab - fixed-joint collision-filter diagnostic
//!
//! Reproduces an engine quirk where creating a fixed joint between two
//! dynamic bodies can reset the collision filter words on the joint's
//! second body. The scene is a ground slab, two welded planks, and a probe
//! cube that gets welded to the upper plank a few seconds into the run,
//! with filter words logged immediately before and after for comparison.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::{Duration, Instant};

use glam::Vec3;
use winit::{
    application::ApplicationHandler,
    event::{ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use jointlab_core::{EntityKey, Material, World};
use jointlab_physics::PhysicsError;
use jointlab_render::{BoxPipeline, Camera, RenderContext};

use jointlab::config::AppConfig;

/// Simulation step per tick.
const FIXED_STEP: f32 = 1.0 / 60.0;

/// Lifecycle phase of the application.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    /// Window and GPU not created yet
    Uninitialized,
    /// Ticking: step, sync, draw
    Running,
    /// Resources released, waiting for the event loop to unwind
    ShuttingDown,
}

/// Main application state
struct App {
    config: AppConfig,
    phase: Phase,
    window: Option<Arc<Window>>,
    render_context: Option<RenderContext>,
    box_pipeline: Option<BoxPipeline>,
    camera: Camera,
    world: World,
    /// The probe cube welded onto the plank by the trigger (body A)
    probe: EntityKey,
    /// The plank the probe is welded to (body B)
    upper_plank: EntityKey,
    /// Loop start, the reference point for the one-shot trigger
    started: Instant,
    joint_created: bool,
    /// Set when windowing or graphics failed; maps to exit code 1
    fatal: bool,
}

impl App {
    fn new(config: AppConfig) -> Result<Self, PhysicsError> {
        let mut world = World::new();
        world.init_physics(&config.physics.to_session_config())?;

        world.spawn_ground(
            "ground",
            Vec3::new(90.0, 0.5, 90.0),
            Vec3::ZERO,
            Material::BLUE,
        )?;

        // The lower plank keeps the upper one clear of the ground, so the
        // ground cannot interfere with the probe once it is welded on.
        let lower_plank = world.spawn_box(
            "lower-plank",
            1000.0,
            Vec3::new(8.0, 0.25, 1.5),
            Vec3::new(0.0, 2.0, 0.0),
            Material::RED,
        )?;
        let upper_plank = world.spawn_box(
            "upper-plank",
            1000.0,
            Vec3::new(8.0, 0.25, 1.5),
            Vec3::new(0.0, 4.0, 0.0),
            Material::RED,
        )?;
        world.attach_fixed_joint(
            lower_plank,
            Vec3::new(0.0, 1.0, 0.0),
            upper_plank,
            Vec3::new(0.0, -1.0, 0.0),
            false,
        )?;

        let probe = world.spawn_box(
            "probe",
            50.0,
            Vec3::splat(0.5),
            Vec3::new(0.0, 5.0, 0.0),
            Material::GREEN,
        )?;

        log::info!("scene ready: {} entities", world.entity_count());

        let camera = Camera {
            eye: config.camera.eye.into(),
            target: config.camera.target.into(),
            fov_y: config.camera.fov,
            near: config.camera.near,
            far: config.camera.far,
            ..Camera::default()
        };

        Ok(Self {
            config,
            phase: Phase::Uninitialized,
            window: None,
            render_context: None,
            box_pipeline: None,
            camera,
            world,
            probe,
            upper_plank,
            started: Instant::now(),
            joint_created: false,
            fatal: false,
        })
    }

    /// Abort startup: windowing or graphics could not be brought up.
    fn fail_startup(&mut self, event_loop: &ActiveEventLoop, message: &str) {
        log::error!("{message}");
        self.fatal = true;
        event_loop.exit();
    }

    /// Fire the one-shot joint creation once the trigger time has elapsed,
    /// logging filter words on both sides of the call.
    fn run_trigger(&mut self) {
        if self.joint_created
            || self.started.elapsed().as_secs_f32() < self.config.repro.trigger_seconds
        {
            return;
        }
        self.joint_created = true;

        log::info!("filter words before joint creation:");
        self.world.log_filter_data(self.probe);
        self.world.log_filter_data(self.upper_plank);

        log::info!(
            "welding probe to upper plank (workaround: {})",
            self.config.repro.use_workaround
        );
        if let Err(e) = self.world.attach_fixed_joint(
            self.probe,
            Vec3::ZERO,
            self.upper_plank,
            Vec3::ZERO,
            self.config.repro.use_workaround,
        ) {
            log::warn!("joint creation failed: {e}");
        }

        log::info!("filter words after joint creation:");
        self.world.log_filter_data(self.probe);
        self.world.log_filter_data(self.upper_plank);
    }

    /// One tick: trigger check, fixed step, state sync, draw, present.
    fn tick(&mut self, event_loop: &ActiveEventLoop) {
        self.run_trigger();

        // The step blocks until the engine has the results ready.
        self.world.update(FIXED_STEP);

        let (Some(ctx), Some(pipeline)) = (&self.render_context, &mut self.box_pipeline) else {
            return;
        };

        pipeline.clear();
        for entity in self.world.iter() {
            pipeline.draw_box(entity.transform.model_matrix(), entity.material.base_color);
        }

        pipeline.update_frame(
            &ctx.queue,
            self.camera.view_proj(ctx.aspect_ratio()),
            self.config.rendering.light_dir,
            self.config.rendering.ambient_strength,
        );

        let output = match ctx.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost) => {
                if let Some(ctx) = &mut self.render_context {
                    ctx.resize(ctx.size);
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
                return;
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                self.fail_startup(event_loop, "surface out of memory");
                return;
            }
            Err(e) => {
                log::warn!("surface error: {e:?}");
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        let bg = self.config.rendering.background_color;
        pipeline.render(
            &ctx.device,
            &ctx.queue,
            &mut encoder,
            &view,
            wgpu::Color {
                r: bg[0] as f64,
                g: bg[1] as f64,
                b: bg[2] as f64,
                a: bg[3] as f64,
            },
        );

        ctx.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        if let Some(window) = &self.window {
            window.request_redraw();
        }
        // Yield briefly so the poll loop does not peg a core.
        std::thread::sleep(Duration::from_millis(1));
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attributes = Window::default_attributes()
            .with_title(&self.config.window.title)
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                self.fail_startup(event_loop, &format!("failed to create window: {e}"));
                return;
            }
        };

        let render_context =
            match pollster::block_on(RenderContext::new(window.clone(), self.config.window.vsync)) {
                Ok(ctx) => ctx,
                Err(e) => {
                    self.fail_startup(event_loop, &format!("failed to initialize graphics: {e}"));
                    return;
                }
            };

        let mut box_pipeline = BoxPipeline::new(&render_context.device, render_context.config.format);
        box_pipeline.ensure_depth_texture(
            &render_context.device,
            render_context.config.width,
            render_context.config.height,
        );

        window.request_redraw();
        self.window = Some(window);
        self.render_context = Some(render_context);
        self.box_pipeline = Some(box_pipeline);

        // The trigger clock runs from loop start, not process start.
        self.started = Instant::now();
        self.phase = Phase::Running;
        log::info!("entering run loop");
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(KeyCode::Escape) = event.physical_key {
                    if event.state == ElementState::Pressed {
                        event_loop.exit();
                    }
                }
            }

            WindowEvent::Resized(physical_size) => {
                if let Some(ctx) = &mut self.render_context {
                    ctx.resize(physical_size);
                }
                if let (Some(ctx), Some(pipeline)) = (&self.render_context, &mut self.box_pipeline)
                {
                    pipeline.ensure_depth_texture(
                        &ctx.device,
                        physical_size.width.max(1),
                        physical_size.height.max(1),
                    );
                }
            }

            WindowEvent::RedrawRequested => {
                if self.phase == Phase::Running {
                    self.tick(event_loop);
                }
            }

            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if self.phase == Phase::ShuttingDown {
            return;
        }
        self.phase = Phase::ShuttingDown;

        // Graphics first, then the physics session; the platform layer
        // unwinds when the event loop returns.
        self.box_pipeline = None;
        self.render_context = None;
        self.window = None;
        self.world.deinit_physics();
        log::info!("shutdown complete");
    }
}

fn main() -> ExitCode {
    env_logger::init();
    log::info!("starting jointlab");

    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("failed to load config: {e}; using defaults");
        AppConfig::default()
    });

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            log::error!("failed to initialize windowing: {e}");
            return ExitCode::from(1);
        }
    };
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = match App::new(config) {
        Ok(app) => app,
        Err(PhysicsError::AlreadyInitialized) => {
            // A live session means another init beat us to it; treat it as
            // nothing to do rather than a crash.
            log::info!("physics session already initialized; nothing to do");
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            log::error!("failed to build scene: {e}");
            return ExitCode::from(1);
        }
    };

    if let Err(e) = event_loop.run_app(&mut app) {
        log::error!("event loop error: {e}");
        return ExitCode::from(1);
    }

    if app.fatal {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}
