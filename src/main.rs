use clap::Parser;
use followers::render::{GpuContext, PainterCanvas};
use followers::{logging, FollowerRegistry, FollowerSettings, FrameClock, Vec2};
use std::path::PathBuf;
use std::sync::Arc;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

/// Screen-space creatures that chase the mouse pointer
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Settings file holding the enabled flag and selected follower
    #[arg(short, long, default_value = "followers.json")]
    config: PathBuf,

    /// Follower to show, overriding the settings file
    #[arg(short, long)]
    follower: Option<String>,

    /// Seed for reproducible creatures
    #[arg(short, long)]
    seed: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

const BACKGROUND: wgpu::Color = wgpu::Color {
    r: 0.02,
    g: 0.02,
    b: 0.03,
    a: 1.0,
};

struct App {
    window: Option<Arc<Window>>,
    context: Option<GpuContext<'static>>,
    egui_state: Option<egui_winit::State>,
    egui_renderer: Option<egui_wgpu::Renderer>,
    registry: FollowerRegistry,
    settings: FollowerSettings,
    settings_path: PathBuf,
    clock: FrameClock,
    pointer: Vec2,
}

impl App {
    fn new(args: &Args) -> Self {
        let mut settings = FollowerSettings::load(&args.config).unwrap_or_else(|err| {
            log::warn!("{err}; starting with default settings");
            FollowerSettings::default()
        });
        if let Some(name) = &args.follower {
            settings.enabled = true;
            settings.selected_follower = Some(name.clone());
        }

        let viewport = Vec2::new(1280.0, 720.0);
        let registry = match args.seed {
            Some(seed) => FollowerRegistry::with_seed(viewport, seed),
            None => FollowerRegistry::new(viewport),
        };

        Self {
            window: None,
            context: None,
            egui_state: None,
            egui_renderer: None,
            registry,
            settings,
            settings_path: args.config.clone(),
            clock: FrameClock::new(),
            pointer: viewport / 2.0,
        }
    }

    fn persist(&mut self) {
        self.settings = self.registry.settings();
        if let Err(err) = self.settings.save(&self.settings_path) {
            log::warn!("{err}");
        }
    }

    fn render(&mut self) {
        let (Some(window), Some(context), Some(egui_state)) =
            (&self.window, &self.context, &mut self.egui_state)
        else {
            return;
        };

        let output = match context.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                context.reconfigure();
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

        let raw_input = egui_state.take_egui_input(window);
        let egui_ctx = egui_state.egui_ctx().clone();
        let dt = self.clock.tick();

        let registry = &mut self.registry;
        let pointer = &mut self.pointer;
        let mut settings_changed = false;

        let full_output = egui_ctx.run(raw_input, |ctx| {
            let screen = ctx.screen_rect().size();
            registry.set_viewport(Vec2::new(screen.x, screen.y));

            egui::Window::new("Followers")
                .default_pos([10.0, 10.0])
                .resizable(false)
                .collapsible(false)
                .show(ctx, |ui| {
                    let mut enabled = registry.is_enabled();
                    if ui.checkbox(&mut enabled, "Enable Followers").changed() {
                        registry.set_enabled(enabled, None);
                        settings_changed = true;
                    }

                    let names = registry.list_variant_names();
                    let current = registry
                        .selected_name()
                        .map(str::to_owned)
                        .unwrap_or_else(|| names[0].to_owned());
                    let mut picked = None;
                    egui::ComboBox::from_label("Follower Type")
                        .selected_text(current.as_str())
                        .show_ui(ui, |ui| {
                            for name in &names {
                                if ui.selectable_label(current == *name, *name).clicked() {
                                    picked = Some(*name);
                                }
                            }
                        });
                    if let Some(name) = picked {
                        registry.select_variant(Some(name));
                        settings_changed = true;
                    }

                    if registry.can_regenerate_active() {
                        ui.horizontal(|ui| {
                            if ui.button("Regenerate Follower").clicked() {
                                registry.regenerate_active();
                            }
                            ui.weak("(Procedural)");
                        });
                    }

                    ui.separator();
                    ui.small("R: regenerate, Esc: quit");
                });

            if let Some(pos) = ctx.input(|i| i.pointer.latest_pos()) {
                *pointer = Vec2::new(pos.x, pos.y);
            }
            registry.update(*pointer, dt);

            let painter = ctx.layer_painter(egui::LayerId::new(
                egui::Order::Foreground,
                egui::Id::new("followers"),
            ));
            registry.draw(&mut PainterCanvas::new(&painter));
        });

        egui_state.handle_platform_output(window, full_output.platform_output);
        let clipped_primitives = egui_ctx.tessellate(full_output.shapes, full_output.pixels_per_point);

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [context.size.width, context.size.height],
            pixels_per_point: full_output.pixels_per_point,
        };
        self.render_egui(
            &view,
            clipped_primitives,
            screen_descriptor,
            full_output.textures_delta,
        );
        output.present();

        if settings_changed {
            self.persist();
        }
    }

    fn render_egui(
        &mut self,
        view: &wgpu::TextureView,
        clipped_primitives: Vec<egui::ClippedPrimitive>,
        screen_descriptor: egui_wgpu::ScreenDescriptor,
        textures: egui::TexturesDelta,
    ) {
        let (Some(context), Some(egui_renderer)) = (&self.context, &mut self.egui_renderer) else {
            return;
        };

        for (id, delta) in &textures.set {
            egui_renderer.update_texture(&context.device, &context.queue, *id, delta);
        }

        let mut encoder = context.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Followers Encoder"),
        });

        egui_renderer.update_buffers(
            &context.device,
            &context.queue,
            &mut encoder,
            &clipped_primitives,
            &screen_descriptor,
        );

        {
            let render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Followers Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(BACKGROUND),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            let mut render_pass = render_pass.forget_lifetime();
            egui_renderer.render(&mut render_pass, &clipped_primitives, &screen_descriptor);
        }

        context.queue.submit(std::iter::once(encoder.finish()));

        for id in &textures.free {
            egui_renderer.free_texture(id);
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let window_attrs = Window::default_attributes()
            .with_title("Followers")
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                log::error!("cannot open window: {err}");
                event_loop.exit();
                return;
            }
        };

        let context = match pollster::block_on(GpuContext::new(window.clone())) {
            Ok(context) => context,
            Err(err) => {
                log::error!("{err}");
                event_loop.exit();
                return;
            }
        };

        let scale = window.scale_factor() as f32;
        let egui_state = egui_winit::State::new(
            egui::Context::default(),
            egui::ViewportId::ROOT,
            &window,
            Some(scale),
            None,
            None,
        );
        let egui_renderer =
            egui_wgpu::Renderer::new(&context.device, context.config.format, None, 1, false);

        let logical = window.inner_size().to_logical::<f32>(f64::from(scale));
        self.registry
            .set_viewport(Vec2::new(logical.width, logical.height));
        self.pointer = self.registry.viewport() / 2.0;
        let settings = self.settings.clone();
        self.registry.apply_settings(&settings);
        log::info!(
            "followers {} ({:?})",
            if settings.enabled { "enabled" } else { "disabled" },
            self.registry.selected_name()
        );

        self.window = Some(window);
        self.context = Some(context);
        self.egui_state = Some(egui_state);
        self.egui_renderer = Some(egui_renderer);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if let (Some(egui_state), Some(window)) = (&mut self.egui_state, &self.window) {
            let response = egui_state.on_window_event(window, &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                self.persist();
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(context) = &mut self.context {
                    context.resize(size);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed {
                    match event.physical_key {
                        PhysicalKey::Code(KeyCode::Escape) => {
                            self.persist();
                            event_loop.exit();
                        }
                        PhysicalKey::Code(KeyCode::KeyR) => self.registry.regenerate_active(),
                        _ => {}
                    }
                }
            }
            WindowEvent::RedrawRequested => {
                self.render();
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(&args);
    event_loop.run_app(&mut app)?;
    Ok(())
}
