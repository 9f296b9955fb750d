//! The window the application renders into.

use crate::config::WindowConfig;
use crate::context::Context;
use crate::error::Result;
use crate::event::{Action, Key, WindowEvent};
use crate::renderer::{MeshRenderer, PointRenderer};
use crate::window::WgpuCanvas;

/// Structure representing a window and a 3D scene.
///
/// This is the main interface with the windowing system. It owns the surface and the
/// renderers, and implements [`Renderer`](crate::renderer::Renderer).
pub struct Window {
    pub(super) canvas: WgpuCanvas,
    /// Logical size requested by the application.
    pub(super) size: (u32, u32),
    pub(super) pixel_ratio: f64,
    should_close: bool,
    pub(super) mesh_renderer: MeshRenderer,
    pub(super) point_renderer: PointRenderer,
}

impl Window {
    /// Opens a window described by `config`.
    pub async fn open(config: &WindowConfig) -> Result<Window> {
        let canvas = WgpuCanvas::open(config).await?;
        let ctxt = Context::get()?;
        let sample_count = canvas.sample_count();

        let window = Window {
            pixel_ratio: canvas.scale_factor(),
            size: (config.width, config.height),
            should_close: false,
            mesh_renderer: MeshRenderer::new(&ctxt, sample_count),
            point_renderer: PointRenderer::new(&ctxt, sample_count),
            canvas,
        };

        log::info!(
            "Opened a {}x{} window (pixel ratio {}, {}x MSAA).",
            config.width,
            config.height,
            window.pixel_ratio,
            sample_count
        );
        Ok(window)
    }

    /// Returns the events received since the last call.
    ///
    /// A close request or a release of the escape key marks the window for closing.
    pub fn poll_events(&mut self) -> Vec<WindowEvent> {
        let events = self.canvas.poll_events();

        for event in &events {
            match event {
                WindowEvent::Close | WindowEvent::Key(Key::Escape, Action::Release, _) => {
                    self.close()
                }
                _ => {}
            }
        }

        events
    }

    /// Indicates whether this window should be closed.
    #[inline]
    pub fn should_close(&self) -> bool {
        self.should_close
    }

    /// Marks the window for closing.
    pub fn close(&mut self) {
        self.should_close = true;
    }

    /// The current scale factor of the window.
    pub fn scale_factor(&self) -> f64 {
        self.canvas.scale_factor()
    }

    /// Resizes the surface to match the logical size and pixel ratio.
    pub(super) fn apply_size(&mut self) {
        let (width, height) = physical_size(self.size, self.pixel_ratio, self.canvas.inner_size());
        self.canvas.resize(width, height);
    }
}

/// The physical size of `logical` pixels at `ratio`, snapped to `inner` when they differ
/// by rounding only.
pub(crate) fn physical_size(logical: (u32, u32), ratio: f64, inner: (u32, u32)) -> (u32, u32) {
    let snap = |logical: u32, inner: u32| {
        let physical = (logical as f64 * ratio).round() as u32;
        if physical.abs_diff(inner) <= 1 {
            inner
        } else {
            physical
        }
    };

    (snap(logical.0, inner.0), snap(logical.1, inner.1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn physical_size_follows_the_ratio() {
        assert_eq!(physical_size((800, 600), 2.0, (1600, 1200)), (1600, 1200));
        assert_eq!(physical_size((800, 600), 1.0, (1600, 1200)), (800, 600));
    }

    #[test]
    fn fractional_ratios_snap_to_the_window() {
        // 1.25 * 801 = 1001.25
        assert_eq!(physical_size((801, 601), 1.25, (1002, 751)), (1002, 751));
        assert_eq!(physical_size((801, 601), 1.25, (1100, 900)), (1001, 751));
    }
}
