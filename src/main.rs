use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, info, warn};
use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    window::{CursorGrabMode, Window, WindowId},
};

// Import from the library crate
use mini_solar::{
    config::AppConfig,
    controller::{input::native, FrameLoopContext, InputEvent, KeyBindings, VirtualCursor},
    error::StartupError,
    logging,
    model::solar_system,
    ui::{DebugOverlay, OverlayStats},
    view::{GpuContext, RenderState},
};

/// Everything that only exists once the window is up
struct Running {
    window: Arc<Window>,
    gpu: GpuContext,
    render_state: RenderState,
    overlay: DebugOverlay,
    frame: FrameLoopContext,
    cursor: VirtualCursor,
}

impl Running {
    fn start(event_loop: &ActiveEventLoop, config: &AppConfig) -> Result<Self, StartupError> {
        let attributes = Window::default_attributes()
            .with_title(config.window.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(config.window.width, config.window.height));
        let window = Arc::new(event_loop.create_window(attributes)?);

        // Capture the mouse; not every platform supports Locked
        window.set_cursor_visible(false);
        if let Err(e) = window
            .set_cursor_grab(CursorGrabMode::Locked)
            .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined))
        {
            warn!("could not grab cursor: {e}");
        }

        let size = window.inner_size();
        let gpu = pollster::block_on(GpuContext::new_native(window.clone(), size.width, size.height))?;
        let bodies = solar_system();
        let render_state = RenderState::new(
            &gpu.device,
            &gpu.queue,
            gpu.format,
            gpu.config.width,
            gpu.config.height,
            &bodies,
            config,
        )?;
        let overlay = DebugOverlay::new(&window, &gpu.device, gpu.format);

        let mut frame = FrameLoopContext::new(config, bodies, Instant::now());
        frame.resize(gpu.config.width, gpu.config.height);
        let cursor = VirtualCursor::new(config.window.width as f64 / 2.0, config.window.height as f64 / 2.0);

        info!(
            width = gpu.config.width,
            height = gpu.config.height,
            bodies = render_state.body_count(),
            "window ready"
        );

        Ok(Self { window, gpu, render_state, overlay, frame, cursor })
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        debug!(width, height, "resize");
        self.gpu.resize(width, height);
        self.render_state.resize(&self.gpu.device, width, height);
        self.frame.resize(width, height);
    }

    /// Update and draw one frame. Returns false once the loop should stop.
    fn redraw(&mut self) -> bool {
        let output = self.frame.update(Instant::now());
        if output.exit_requested {
            info!(frame = output.frame, "quit requested");
            return false;
        }

        self.render_state.write_uniforms(&self.gpu.queue, &output);

        let surface_texture = match self.gpu.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.gpu.reconfigure();
                return true;
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                error!("surface out of memory");
                return false;
            }
            Err(e) => {
                warn!("skipping frame: {e:?}");
                return true;
            }
        };
        let view = surface_texture.texture.create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self.gpu.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("frame_encoder"),
        });
        self.render_state.draw_frame(&mut encoder, &view);

        let fps = self.overlay.fps.update(output.delta);
        let stats = OverlayStats::new(fps, &output, &self.frame.camera);
        let size = [self.gpu.config.width, self.gpu.config.height];
        let overlay_buffers = self.overlay.draw(
            &self.window,
            &self.gpu.device,
            &self.gpu.queue,
            &mut encoder,
            &view,
            size,
            &stats,
        );

        self.gpu
            .queue
            .submit(overlay_buffers.into_iter().chain(std::iter::once(encoder.finish())));
        surface_texture.present();
        true
    }
}

struct App {
    config: AppConfig,
    bindings: KeyBindings,
    state: Option<Running>,
    exit_code: i32,
}

impl App {
    fn new(config: AppConfig) -> Self {
        Self { config, bindings: KeyBindings::default(), state: None, exit_code: 0 }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        match Running::start(event_loop, &self.config) {
            Ok(running) => self.state = Some(running),
            Err(e) => {
                error!("startup failed: {e}");
                self.exit_code = e.exit_code();
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(state) = self.state.as_mut() else { return };
        if window_id != state.window.id() {
            return;
        }
        state.overlay.on_window_event(&state.window, &event);

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => state.resize(size.width, size.height),
            WindowEvent::KeyboardInput { event, .. } => {
                if let Some(input) = native::keyboard_event_to_input(&event, &self.bindings) {
                    state.frame.push_event(input);
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                state.frame.push_event(native::mouse_wheel_to_input(&delta));
            }
            WindowEvent::Focused(false) => state.frame.push_event(InputEvent::FocusLost),
            WindowEvent::RedrawRequested => {
                if !state.redraw() {
                    event_loop.exit();
                }
            }
            _ => {}
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        if let (Some(state), DeviceEvent::MouseMotion { delta }) = (self.state.as_mut(), event) {
            let moved = state.cursor.apply_motion(delta.0, delta.1);
            state.frame.push_event(moved);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &self.state {
            state.window.request_redraw();
        }
    }
}

fn main() {
    logging::init();

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            error!("failed to create event loop: {e}");
            std::process::exit(-1);
        }
    };

    let mut app = App::new(AppConfig::default());
    if let Err(e) = event_loop.run_app(&mut app) {
        error!("event loop error: {e}");
        std::process::exit(-1);
    }

    if app.exit_code != 0 {
        std::process::exit(app.exit_code);
    }
}
