//! Rendering functionality.

use crate::camera::Camera3d;
use crate::context::Context;
use crate::error::Result;
use crate::renderer::Renderer;
use crate::scene::Scene;

use super::Window;

impl Renderer for Window {
    fn set_pixel_ratio(&mut self, ratio: f64) {
        if ratio > 0.0 && ratio != self.pixel_ratio {
            self.pixel_ratio = ratio;
            self.apply_size();
        }
    }

    fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.size = (width, height);
        self.apply_size();
    }

    fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Draws `scene` in a single pass: clear to the background, opaque meshes, then
    /// blended point clouds. The frame is skipped if the surface is not ready.
    fn render(&mut self, scene: &Scene, camera: &dyn Camera3d) -> Result<()> {
        let ctxt = Context::get()?;
        let Some(frame) = self.canvas.acquire_frame()? else {
            return Ok(());
        };

        let lights = scene.collect_lights();
        self.mesh_renderer.prepare(&ctxt, scene, camera, &lights);
        self.point_renderer.prepare(
            &ctxt,
            scene,
            camera,
            self.canvas.size(),
            self.pixel_ratio,
        );

        let frame_view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        // Draw into the multisampled target and resolve into the frame when MSAA is on.
        let (color_view, resolve_target) = match self.canvas.msaa_view() {
            Some(msaa_view) => (msaa_view, Some(&frame_view)),
            None => (&frame_view, None),
        };

        let bg = scene.background;
        let mut encoder = ctxt.create_command_encoder(Some("frame_encoder"));
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: color_view,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: bg.r as f64,
                            g: bg.g as f64,
                            b: bg.b as f64,
                            a: bg.a as f64,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: self.canvas.depth_view(),
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.mesh_renderer.draw(&mut pass);
            self.point_renderer.draw(&mut pass);
        }

        ctxt.submit(std::iter::once(encoder.finish()));
        frame.present();

        Ok(())
    }
}
