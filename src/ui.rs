use egui::Context;
use glam::Vec3;
use winit::event::WindowEvent;
use winit::window::Window;

use crate::controller::FrameOutput;
use crate::model::Camera;

/// Numbers shown in the debug window
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayStats {
    pub fps: f32,
    pub frame: u32,
    pub eye: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub zoom: f32,
    pub orbits_running: bool,
}

impl OverlayStats {
    pub fn new(fps: f32, frame: &FrameOutput, camera: &Camera) -> Self {
        Self {
            fps,
            frame: frame.frame,
            eye: camera.eye,
            yaw: camera.yaw,
            pitch: camera.pitch,
            zoom: camera.zoom,
            orbits_running: frame.movement,
        }
    }
}

/// Frames per second averaged over roughly one second
#[derive(Debug, Default)]
pub struct FpsCounter {
    pub fps: f32,
    frame_count: u32,
    timer: f32,
}

impl FpsCounter {
    pub fn update(&mut self, dt: f32) -> f32 {
        self.frame_count += 1;
        self.timer += dt;
        if self.timer >= 1.0 {
            self.fps = self.frame_count as f32 / self.timer;
            self.frame_count = 0;
            self.timer = 0.0;
        }
        self.fps
    }
}

/// Build the debug window
pub fn build_ui(ctx: &Context, stats: &OverlayStats) {
    egui::Window::new("Debug")
        .default_pos([8.0, 8.0])
        .resizable(false)
        .show(ctx, |ui| {
            ui.label(egui::RichText::new(format!("FPS: {:.0}", stats.fps)).small());
            ui.label(egui::RichText::new(format!("Frame: {}", stats.frame)).small());
            ui.label(egui::RichText::new(format!("Pos: x: {:.1} y: {:.1} z: {:.1}", stats.eye.x, stats.eye.y, stats.eye.z)).small());
            ui.label(egui::RichText::new(format!("Yaw: {:.1} Pitch: {:.1} Zoom: {:.1}", stats.yaw, stats.pitch, stats.zoom)).small());
            let orbit = if stats.orbits_running { "running" } else { "paused" };
            ui.label(egui::RichText::new(format!("Orbits: {orbit}")).small());
            ui.separator();
            ui.label(egui::RichText::new("Controls:").small());
            ui.label(egui::RichText::new("WASD - Move").small());
            ui.label(egui::RichText::new("Mouse - Look, wheel - Zoom").small());
            ui.label(egui::RichText::new("P - Pause orbits").small());
            ui.label(egui::RichText::new("C - Resume orbits").small());
            ui.label(egui::RichText::new("Esc - Quit").small());
        });
}

/// egui state, input adapter and renderer for the debug window
pub struct DebugOverlay {
    ctx: egui::Context,
    state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
    pub fps: FpsCounter,
}

impl DebugOverlay {
    pub fn new(window: &Window, device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let ctx = egui::Context::default();
        let state = egui_winit::State::new(
            ctx.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let renderer = egui_wgpu::Renderer::new(device, format, egui_wgpu::RendererOptions::default());

        Self { ctx, state, renderer, fps: FpsCounter::default() }
    }

    /// Feed a window event to egui. The overlay is display-only, so the
    /// event is never reported as consumed.
    pub fn on_window_event(&mut self, window: &Window, event: &WindowEvent) {
        let _ = self.state.on_window_event(window, event);
    }

    /// Lay out, upload and record the overlay on top of `view`.
    /// Returns command buffers egui needs submitted before `encoder`.
    pub fn draw(
        &mut self,
        window: &Window,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        size_in_pixels: [u32; 2],
        stats: &OverlayStats,
    ) -> Vec<wgpu::CommandBuffer> {
        let raw_input = self.state.take_egui_input(window);
        let output = self.ctx.run(raw_input, |ctx| build_ui(ctx, stats));
        self.state.handle_platform_output(window, output.platform_output);

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels,
            pixels_per_point: output.pixels_per_point,
        };
        let primitives = self.ctx.tessellate(output.shapes, output.pixels_per_point);

        for (id, image_delta) in &output.textures_delta.set {
            self.renderer.update_texture(device, queue, *id, image_delta);
        }
        let user_buffers = self.renderer.update_buffers(device, queue, encoder, &primitives, &screen_descriptor);

        {
            let egui_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("egui_render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.renderer.render(&mut egui_pass.forget_lifetime(), &primitives, &screen_descriptor);
        }

        // Cleanup egui textures
        for id in &output.textures_delta.free {
            self.renderer.free_texture(id);
        }

        user_buffers
    }
}
