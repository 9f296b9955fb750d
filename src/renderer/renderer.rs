use crate::camera::Camera3d;
use crate::error::Result;
use crate::scene::Scene;

/// Something that draws a [`Scene`] through a camera into an output of known size.
///
/// Sizes are in logical pixels; the output holds `size * pixel_ratio` physical pixels.
pub trait Renderer {
    /// Sets the ratio between physical and logical pixels.
    fn set_pixel_ratio(&mut self, ratio: f64);

    /// The ratio between physical and logical pixels.
    fn pixel_ratio(&self) -> f64;

    /// Resizes the output to `width` x `height` logical pixels.
    fn set_size(&mut self, width: u32, height: u32);

    /// The size of the output, in logical pixels.
    fn size(&self) -> (u32, u32);

    /// Draws one frame of `scene` as seen by `camera`.
    fn render(&mut self, scene: &Scene, camera: &dyn Camera3d) -> Result<()>;
}
