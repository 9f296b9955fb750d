//! The window, and things to handle the rendering loop and events.

mod rendering;
mod wgpu_canvas;
mod window;

pub use wgpu_canvas::WgpuCanvas;
pub use window::Window;
